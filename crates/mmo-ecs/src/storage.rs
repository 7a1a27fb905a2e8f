//! Generic dense-columnar storage for a single component type, indexed by
//! entity slot index. Liveness is tracked by the allocator; a store entry
//! surviving past its owner's generation is simply never looked at again
//! because `World` gates every access through `EntityAllocator::is_alive`.

/// Marker trait for types that can be stored as components. Kept separate
/// from any behavior so the store stays a dumb container; dispatch and
/// invariants live in the systems that touch each component.
pub trait Component: 'static + Send + Sync {
    const NAME: &'static str;
}

#[derive(Debug)]
pub struct ComponentStore<T: Component> {
    slots: Vec<Option<T>>,
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T: Component> ComponentStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_capacity(&mut self, index: usize) {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
    }

    pub fn insert(&mut self, index: u32, value: T) -> Option<T> {
        self.ensure_capacity(index as usize);
        self.slots[index as usize].replace(value)
    }

    pub fn remove(&mut self, index: u32) -> Option<T> {
        self.slots.get_mut(index as usize).and_then(Option::take)
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.slots.get(index as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.slots.get_mut(index as usize).and_then(Option::as_mut)
    }

    pub fn contains(&self, index: u32) -> bool {
        self.slots.get(index as usize).map(Option::is_some).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i as u32, v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|v| (i as u32, v)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(u32);
    impl Component for Dummy {
        const NAME: &'static str = "Dummy";
    }

    #[test]
    fn insert_then_get() {
        let mut store = ComponentStore::<Dummy>::new();
        store.insert(2, Dummy(42));
        assert_eq!(store.get(2).unwrap().0, 42);
        assert!(store.get(0).is_none());
    }

    #[test]
    fn remove_clears_slot() {
        let mut store = ComponentStore::<Dummy>::new();
        store.insert(0, Dummy(1));
        assert!(store.remove(0).is_some());
        assert!(store.get(0).is_none());
    }

    #[test]
    fn insert_replaces_existing() {
        let mut store = ComponentStore::<Dummy>::new();
        store.insert(0, Dummy(1));
        let prev = store.insert(0, Dummy(2));
        assert_eq!(prev.unwrap().0, 1);
        assert_eq!(store.get(0).unwrap().0, 2);
    }

    #[test]
    fn iter_skips_empty_slots() {
        let mut store = ComponentStore::<Dummy>::new();
        store.insert(5, Dummy(9));
        let items: Vec<_> = store.iter().collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].0, 5);
    }
}
