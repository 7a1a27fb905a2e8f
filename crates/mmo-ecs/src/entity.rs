//! Entity identity: a generational index stable for the lifetime of the
//! entity and never reused within the tick it was freed.

use std::collections::VecDeque;
use std::fmt;

/// Opaque handle to an entity. The high 32 bits are the generation, the low
/// 32 bits are the slot index into the allocator's tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub fn new(index: u32, generation: u32) -> Self {
        EntityId(((generation as u64) << 32) | index as u64)
    }

    pub fn index(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        EntityId(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

impl serde::Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = u64::deserialize(deserializer)?;
        Ok(EntityId(raw))
    }
}

/// Snapshot of allocator state, used by tests and by save/restore of a
/// deterministic run.
#[derive(Clone, Debug)]
pub struct AllocatorSnapshot {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_indices: Vec<u32>,
}

/// Allocates and recycles entity slots. A freed slot's generation is bumped
/// so any `EntityId` referencing the old occupant reads as stale (`is_alive`
/// returns false) rather than aliasing the new occupant.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_indices: VecDeque<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> EntityId {
        if let Some(index) = self.free_indices.pop_front() {
            self.alive[index as usize] = true;
            EntityId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            EntityId::new(index, 0)
        }
    }

    /// Frees the slot if `id` is currently alive. Returns false for a stale
    /// or already-dead id (a no-op per the destroy-is-idempotent contract).
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        let index = id.index() as usize;
        if index >= self.alive.len() || !self.alive[index] || self.generations[index] != id.generation() {
            return false;
        }
        self.alive[index] = false;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free_indices.push_back(index as u32);
        true
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        let index = id.index() as usize;
        index < self.alive.len() && self.alive[index] && self.generations[index] == id.generation()
    }

    /// Reconstructs the current `EntityId` for an allocator slot index, if
    /// that slot is currently occupied. Used by `World::iter` to pair
    /// stored components back up with their owning id.
    pub fn id_for_alive_index(&self, index: u32) -> Option<EntityId> {
        let i = index as usize;
        if i < self.alive.len() && self.alive[i] {
            Some(EntityId::new(index, self.generations[i]))
        } else {
            None
        }
    }

    pub fn alive_count(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    pub fn capacity(&self) -> usize {
        self.generations.len()
    }

    pub fn snapshot_state(&self) -> AllocatorSnapshot {
        AllocatorSnapshot {
            generations: self.generations.clone(),
            alive: self.alive.clone(),
            free_indices: self.free_indices.iter().copied().collect(),
        }
    }

    pub fn restore_from_snapshot(&mut self, snapshot: &AllocatorSnapshot) {
        self.generations = snapshot.generations.clone();
        self.alive = snapshot.alive.clone();
        self.free_indices = snapshot.free_indices.iter().copied().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_assigns_increasing_indices() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(a.generation(), 0);
    }

    #[test]
    fn deallocate_then_reallocate_bumps_generation() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        assert!(alloc.deallocate(a));
        let b = alloc.allocate();
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(!alloc.is_alive(a));
        assert!(alloc.is_alive(b));
    }

    #[test]
    fn deallocate_is_idempotent() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        assert!(alloc.deallocate(a));
        assert!(!alloc.deallocate(a));
    }

    #[test]
    fn deallocate_stale_id_is_noop() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        alloc.deallocate(a);
        let _b = alloc.allocate();
        assert!(!alloc.deallocate(a));
    }

    #[test]
    fn alive_count_tracks_allocations() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let _b = alloc.allocate();
        assert_eq!(alloc.alive_count(), 2);
        alloc.deallocate(a);
        assert_eq!(alloc.alive_count(), 1);
    }

    #[test]
    fn snapshot_round_trips() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        alloc.deallocate(a);
        let snap = alloc.snapshot_state();
        let mut restored = EntityAllocator::new();
        restored.restore_from_snapshot(&snap);
        assert!(!restored.is_alive(a));
        assert!(restored.is_alive(b));
    }

    #[test]
    fn display_format() {
        let id = EntityId::new(3, 1);
        assert_eq!(format!("{}", id), "3v1");
    }
}
