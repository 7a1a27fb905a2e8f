use mmo_ecs::prelude::*;

fn decay_mana(world: &mut World, _dt: f64) {
    let mut to_update = Vec::new();
    for (id, health) in world.iter::<Health>() {
        if health.current_mp > 0 {
            to_update.push(id);
        }
    }
    for id in to_update {
        if let Ok(health) = world.get_mut::<Health>(id) {
            health.current_mp -= 1;
        }
    }
}

#[test]
fn determinism_across_repeated_runs() {
    let run = || {
        let mut world = World::new();
        let id = world.create();
        world.add(id, Health::new(100, 50)).unwrap();
        let mut tl = TickLoop::new(world, TickConfig::default());
        tl.add_system("decay_mana", TickStage::Update, 0, Box::new(decay_mana));
        tl.run_ticks(100);
        tl.world().get::<Health>(id).unwrap().current_mp
    };

    assert_eq!(run(), run());
}

#[test]
fn destroy_during_tick_is_deferred_to_stage_end() {
    let mut world = World::new();
    let id = world.create();
    world.add(id, Health::new(1, 1)).unwrap();

    fn kill_dead(world: &mut World, _dt: f64) {
        let mut dead = Vec::new();
        for (id, health) in world.iter::<Health>() {
            if health.dead {
                dead.push(id);
            }
        }
        for id in dead {
            world.command_buffer.destroy(id);
        }
    }

    let mut tl = TickLoop::new(world, TickConfig::default());
    tl.add_system("kill_dead", TickStage::Update, 0, Box::new(kill_dead));
    tl.world_mut().get_mut::<Health>(id).unwrap().apply_damage(1, 0);
    tl.tick();
    assert!(!tl.world().is_alive(id));
}
