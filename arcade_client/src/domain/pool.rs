// Fixed-capacity entity pools.
//
// Entities are allocated once at scene start and recycled through an alive flag.
// A pool never grows: when every slot is alive, spawning is skipped.

/// Behaviour an entity needs to live in a [`Pool`].
pub trait Poolable {
    fn is_alive(&self) -> bool;
    fn set_alive(&mut self, alive: bool);
    /// Clears per-life state (timers, animation frames). Type-defining fields stay.
    fn reset_transient(&mut self);
}

#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<T>,
}

impl<T: Poolable> Pool<T> {
    /// Builds `capacity` dead entities with `factory`.
    pub fn with_capacity(capacity: usize, mut factory: impl FnMut() -> T) -> Self {
        let slots = (0..capacity)
            .map(|_| {
                let mut item = factory();
                item.set_alive(false);
                item
            })
            .collect();
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Revives the first dead slot in pool order, or `None` when every slot is alive.
    pub fn acquire(&mut self) -> Option<&mut T> {
        let slot = self.slots.iter_mut().find(|item| !item.is_alive())?;
        slot.reset_transient();
        slot.set_alive(true);
        Some(slot)
    }

    /// Index-returning variant of [`Pool::acquire`].
    pub fn acquire_index(&mut self) -> Option<usize> {
        let index = self.slots.iter().position(|item| !item.is_alive())?;
        let slot = &mut self.slots[index];
        slot.reset_transient();
        slot.set_alive(true);
        Some(index)
    }

    pub fn release(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.set_alive(false);
            slot.reset_transient();
        }
    }

    pub fn kill_all(&mut self) {
        for slot in &mut self.slots {
            slot.set_alive(false);
        }
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|item| item.is_alive()).count()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut()
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|item| item.is_alive())
    }

    pub fn iter_alive_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter(|item| item.is_alive())
    }
}
