use super::Handle;
use std::collections::HashMap;

/// Name-keyed store with stable handles.
///
/// Slots are only ever appended or overwritten in place, so a handle keeps
/// pointing at the same entry until [`Registry::clear`]. Clearing bumps the
/// generation and every handle issued before it stops resolving.
pub struct Registry<T> {
    items: Vec<T>,
    names: HashMap<String, Handle<T>>,
    generation: u32,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            names: HashMap::new(),
            generation: 0,
        }
    }

    /// Store `item` under `name`. An existing entry with the same name is
    /// replaced in its slot and keeps its handle.
    pub fn insert(&mut self, name: impl Into<String>, item: T) -> Handle<T> {
        let name = name.into();
        if let Some(&handle) = self.names.get(&name) {
            self.items[handle.index()] = item;
            return handle;
        }

        let handle = Handle::new(self.items.len() as u32, self.generation);
        self.items.push(item);
        self.names.insert(name, handle);
        handle
    }

    pub fn lookup(&self, name: &str) -> Option<Handle<T>> {
        self.names.get(name).copied()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if handle.generation() != self.generation {
            return None;
        }
        self.items.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if handle.generation() != self.generation {
            return None;
        }
        self.items.get_mut(handle.index())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&T> {
        self.lookup(name).and_then(|handle| self.get(handle))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        let generation = self.generation;
        self.items
            .iter()
            .enumerate()
            .map(move |(index, item)| (Handle::new(index as u32, generation), item))
    }

    pub fn names(&self) -> impl Iterator<Item = (&str, Handle<T>)> {
        self.names.iter().map(|(name, handle)| (name.as_str(), *handle))
    }

    /// Remove every entry and hand them back for resource release.
    pub fn drain(&mut self) -> Vec<T> {
        self.names.clear();
        self.generation = self.generation.wrapping_add(1);
        std::mem::take(&mut self.items)
    }

    pub fn clear(&mut self) {
        self.drain();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
