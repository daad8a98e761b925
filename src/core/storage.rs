use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::Result;

/// Generic storage trait for simulated objects
pub trait Storage<T, H> {
    /// Creates a new empty storage
    fn new() -> Self;

    /// Adds an item to the storage and returns its handle
    fn add(&mut self, item: T) -> H;

    /// Gets a reference to an item by its handle
    fn get(&self, handle: H) -> Option<&T>;

    /// Gets a mutable reference to an item by its handle
    fn get_mut(&mut self, handle: H) -> Option<&mut T>;

    /// Removes an item from the storage
    fn remove(&mut self, handle: H) -> Option<T>;

    /// Returns the number of items in the storage
    fn len(&self) -> usize;

    /// Returns whether the storage is empty
    fn is_empty(&self) -> bool;

    /// Clears all items from the storage
    fn clear(&mut self);

    /// Returns all handles in registration order
    fn handles(&self) -> Vec<H>;

    /// Returns an iterator over all items in registration order
    fn iter<'a>(&'a self) -> impl Iterator<Item = (H, &'a T)> + 'a where T: 'a;

    /// Returns a mutable iterator over all items in registration order
    fn iter_mut<'a>(&'a mut self) -> impl Iterator<Item = (H, &'a mut T)> + 'a where T: 'a;
}

/// Storage for bodies.
///
/// Items are kept sorted by handle, and handles only grow, so iteration
/// always follows registration order.
#[derive(Debug, Clone)]
pub struct BodyStorage<T> {
    items: Vec<(BodyHandle, T)>,
    next_id: u32,
}

impl<T> Storage<T, BodyHandle> for BodyStorage<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1, // Start at 1, so 0 can represent invalid handle
        }
    }

    fn add(&mut self, item: T) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.items.push((handle, item));
        handle
    }

    fn get(&self, handle: BodyHandle) -> Option<&T> {
        let index = self.position(handle)?;
        Some(&self.items[index].1)
    }

    fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut T> {
        let index = self.position(handle)?;
        Some(&mut self.items[index].1)
    }

    fn remove(&mut self, handle: BodyHandle) -> Option<T> {
        let index = self.position(handle)?;
        Some(self.items.remove(index).1)
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn handles(&self) -> Vec<BodyHandle> {
        self.items.iter().map(|(h, _)| *h).collect()
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = (BodyHandle, &'a T)> + 'a where T: 'a {
        self.items.iter().map(|(h, item)| (*h, item))
    }

    fn iter_mut<'a>(&'a mut self) -> impl Iterator<Item = (BodyHandle, &'a mut T)> + 'a where T: 'a {
        self.items.iter_mut().map(|(h, item)| (*h, item))
    }
}

impl<T> Default for BodyStorage<T> {
    fn default() -> Self {
        <Self as Storage<T, BodyHandle>>::new()
    }
}

impl<T> BodyStorage<T> {
    fn position(&self, handle: BodyHandle) -> Option<usize> {
        self.items.binary_search_by_key(&handle, |(h, _)| *h).ok()
    }

    /// Gets a body by its handle, returning an error if not found
    pub fn get_body(&self, handle: BodyHandle) -> Result<&T> {
        self.get(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle)))
    }

    /// Gets a mutable reference to a body by its handle, returning an error if not found
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut T> {
        self.get_mut(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle)))
    }

    /// Mutable access to two distinct bodies at once
    pub fn get_pair_mut(&mut self, a: BodyHandle, b: BodyHandle) -> Option<(&mut T, &mut T)> {
        let ia = self.position(a)?;
        let ib = self.position(b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (left, right) = self.items.split_at_mut(ib);
            Some((&mut left[ia].1, &mut right[0].1))
        } else {
            let (left, right) = self.items.split_at_mut(ia);
            Some((&mut right[0].1, &mut left[ib].1))
        }
    }
}
