use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mmo_ecs::prelude::*;

fn bench_empty_tick(c: &mut Criterion) {
    c.bench_function("tick_loop_1000_entities_no_systems", |b| {
        b.iter(|| {
            let mut world = World::new();
            for _ in 0..1000 {
                let id = world.create();
                let _ = world.add(id, Health::new(100, 50));
            }
            let mut tl = TickLoop::new(world, TickConfig::default());
            tl.run_ticks(black_box(60));
            black_box(tl.tick_count())
        })
    });
}

criterion_group!(benches, bench_empty_tick);
criterion_main!(benches);
