use crate::command::CommandBuffer;
use crate::components::*;
use crate::entity::{EntityAllocator, EntityId};
use crate::error::EcsError;
use crate::storage::{Component, ComponentStore};

/// Generic accessor trait mapping a concrete component type to its store in
/// `World`. Implemented once per component type via the `impl_store_access!`
/// macro below; callers use the ergonomic `World::get::<Health>(id)` form
/// instead of reaching for a field directly.
pub trait StoreAccess: Component + Sized {
    fn store(world: &World) -> &ComponentStore<Self>;
    fn store_mut(world: &mut World) -> &mut ComponentStore<Self>;
    /// Splits the world into the allocator and this component's store so a
    /// caller can look up generations while holding a mutable borrow of the
    /// store, which a single `store_mut(&mut World)` call can't express.
    fn store_mut_with_allocator(world: &mut World) -> (&EntityAllocator, &mut ComponentStore<Self>);
}

macro_rules! impl_store_access {
    ($ty:ty, $field:ident) => {
        impl StoreAccess for $ty {
            fn store(world: &World) -> &ComponentStore<Self> {
                &world.$field
            }
            fn store_mut(world: &mut World) -> &mut ComponentStore<Self> {
                &mut world.$field
            }
            fn store_mut_with_allocator(world: &mut World) -> (&EntityAllocator, &mut ComponentStore<Self>) {
                (&world.allocator, &mut world.$field)
            }
        }
    };
}

/// The world owns entity identity and one dense store per component type.
/// Structural mutation (spawn, despawn, add/remove component) is deferred
/// through `command_buffer` and applied at the end of a tick stage; direct
/// component value mutation happens in place through `get_mut`.
#[derive(Debug, Default)]
pub struct World {
    allocator: EntityAllocator,
    pub command_buffer: CommandBuffer,

    transform: ComponentStore<Transform>,
    movement: ComponentStore<Movement>,
    health: ComponentStore<Health>,
    combat_stats: ComponentStore<CombatStats>,
    target: ComponentStore<Target>,
    skills: ComponentStore<Skills>,
    crowd_control: ComponentStore<CrowdControl>,
    damage_over_time: ComponentStore<DamageOverTime>,
    healing_over_time: ComponentStore<HealingOverTime>,
    absorb: ComponentStore<Absorb>,
    threat: ComponentStore<Threat>,
    ai: ComponentStore<Ai>,
    projectile: ComponentStore<Projectile>,
    dodge: ComponentStore<Dodge>,
    match_membership: ComponentStore<MatchMembership>,
}

impl_store_access!(Transform, transform);
impl_store_access!(Movement, movement);
impl_store_access!(Health, health);
impl_store_access!(CombatStats, combat_stats);
impl_store_access!(Target, target);
impl_store_access!(Skills, skills);
impl_store_access!(CrowdControl, crowd_control);
impl_store_access!(DamageOverTime, damage_over_time);
impl_store_access!(HealingOverTime, healing_over_time);
impl_store_access!(Absorb, absorb);
impl_store_access!(Threat, threat);
impl_store_access!(Ai, ai);
impl_store_access!(Projectile, projectile);
impl_store_access!(Dodge, dodge);
impl_store_access!(MatchMembership, match_membership);

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an entity immediately. Per spec.md's two-phase lifecycle,
    /// callers performing structural spawns mid-system should instead queue
    /// through `command_buffer.spawn(..)`; this direct path exists for
    /// world bootstrap and tests.
    pub fn create(&mut self) -> EntityId {
        self.allocator.allocate()
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    pub fn alive_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Destroys immediately; per spec.md §3 this is a no-op for an
    /// already-dead id. Prefer `command_buffer.destroy(..)` from inside a
    /// system so iteration stays valid.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.allocator.deallocate(id) {
            return false;
        }
        let index = id.index();
        self.transform.remove(index);
        self.movement.remove(index);
        self.health.remove(index);
        self.combat_stats.remove(index);
        self.target.remove(index);
        self.skills.remove(index);
        self.crowd_control.remove(index);
        self.damage_over_time.remove(index);
        self.healing_over_time.remove(index);
        self.absorb.remove(index);
        self.threat.remove(index);
        self.ai.remove(index);
        self.projectile.remove(index);
        self.dodge.remove(index);
        self.match_membership.remove(index);
        true
    }

    pub fn has<C: StoreAccess>(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id) && C::store(self).contains(id.index())
    }

    pub fn get<C: StoreAccess>(&self, id: EntityId) -> Result<&C, EcsError> {
        if !self.allocator.is_alive(id) {
            return Err(EcsError::StaleEntity { entity: id });
        }
        C::store(self).get(id.index()).ok_or(EcsError::MissingComponent {
            entity: id,
            component: C::NAME,
        })
    }

    pub fn get_mut<C: StoreAccess>(&mut self, id: EntityId) -> Result<&mut C, EcsError> {
        if !self.allocator.is_alive(id) {
            return Err(EcsError::StaleEntity { entity: id });
        }
        let index = id.index();
        C::store_mut(self).get_mut(index).ok_or(EcsError::MissingComponent {
            entity: id,
            component: C::NAME,
        })
    }

    pub fn add<C: StoreAccess>(&mut self, id: EntityId, value: C) -> Result<(), EcsError> {
        if !self.allocator.is_alive(id) {
            return Err(EcsError::StaleEntity { entity: id });
        }
        if C::store(self).contains(id.index()) {
            return Err(EcsError::DuplicateComponent {
                entity: id,
                component: C::NAME,
            });
        }
        C::store_mut(self).insert(id.index(), value);
        Ok(())
    }

    pub fn remove<C: StoreAccess>(&mut self, id: EntityId) -> Result<C, EcsError> {
        if !self.allocator.is_alive(id) {
            return Err(EcsError::StaleEntity { entity: id });
        }
        C::store_mut(self).remove(id.index()).ok_or(EcsError::MissingComponent {
            entity: id,
            component: C::NAME,
        })
    }

    pub fn iter<C: StoreAccess>(&self) -> impl Iterator<Item = (EntityId, &C)> {
        let gen_lookup = &self.allocator;
        C::store(self)
            .iter()
            .filter_map(move |(index, value)| gen_lookup.id_for_alive_index(index).map(|id| (id, value)))
    }

    pub fn iter_mut<C: StoreAccess>(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        let (gen_lookup, store) = C::store_mut_with_allocator(self);
        store
            .iter_mut()
            .filter_map(move |(index, value)| gen_lookup.id_for_alive_index(index).map(|id| (id, value)))
    }

    /// Applies every command queued in `command_buffer` in FIFO order, then
    /// clears the buffer. Called by the tick scheduler at the end of each
    /// stage.
    pub fn apply_deferred(&mut self) {
        let commands = self.command_buffer.drain();
        for command in commands {
            command(self);
        }
    }
}
