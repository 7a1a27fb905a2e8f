//! Deferred structural mutation. Per spec.md §4.1, only structural changes
//! (spawn, destroy, add/remove component) are deferred to the end of a
//! stage; direct component value mutation happens in place via
//! `World::get_mut` while a system runs. Each queued command is a boxed
//! closure rather than a tagged enum of every component type, the same
//! command-queue-of-thunks shape the teacher uses for its own deferred
//! command application, but narrowed to structural ops only.

use crate::entity::EntityId;
use crate::world::{StoreAccess, World};

type Thunk = Box<dyn FnOnce(&mut World) + Send>;

#[derive(Default)]
pub struct CommandBuffer {
    commands: Vec<Thunk>,
}

impl std::fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("pending", &self.commands.len())
            .finish()
    }
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn push(&mut self, cmd: impl FnOnce(&mut World) + Send + 'static) {
        self.commands.push(Box::new(cmd));
    }

    /// Queues entity creation; `build` runs against the freshly allocated id
    /// once the buffer is applied, so callers can attach initial components
    /// in the same deferred step.
    pub fn spawn(&mut self, build: impl FnOnce(&mut World, EntityId) + Send + 'static) {
        self.push(move |world| {
            let id = world.create();
            build(world, id);
        });
    }

    pub fn destroy(&mut self, entity: EntityId) {
        self.push(move |world| {
            world.destroy(entity);
        });
    }

    pub fn add_component<C: StoreAccess>(&mut self, entity: EntityId, value: C) {
        self.push(move |world| {
            if let Err(err) = world.add(entity, value) {
                tracing::warn!(%entity, error = %err, "deferred add_component failed");
            }
        });
    }

    pub fn remove_component<C: StoreAccess>(&mut self, entity: EntityId) {
        self.push(move |world| {
            let _ = world.remove::<C>(entity);
        });
    }

    pub fn drain(&mut self) -> Vec<Thunk> {
        std::mem::take(&mut self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Health;

    #[test]
    fn spawn_is_deferred_until_apply() {
        let mut world = World::new();
        world.command_buffer.spawn(|world, id| {
            world.add(id, Health::new(10, 5)).unwrap();
        });
        assert_eq!(world.alive_count(), 0);
        world.apply_deferred();
        assert_eq!(world.alive_count(), 1);
    }

    #[test]
    fn destroy_is_deferred_until_apply() {
        let mut world = World::new();
        let id = world.create();
        world.command_buffer.destroy(id);
        assert!(world.is_alive(id));
        world.apply_deferred();
        assert!(!world.is_alive(id));
    }

    #[test]
    fn commands_apply_in_fifo_order() {
        let mut world = World::new();
        let id = world.create();
        world.command_buffer.add_component(id, Health::new(10, 5));
        world.command_buffer.remove_component::<Health>(id);
        world.apply_deferred();
        assert!(!world.has::<Health>(id));
    }
}
