//! Sparse per-body storage
//!
//! `BodySlots<T>` maps body slots to data. Each slot remembers the handle
//! that filled it, so a lookup with a stale `BodyId` returns `None` even if
//! the slot has since been reused by another body.

use super::handle::BodyId;

pub struct BodySlots<T> {
    data: Vec<Option<(BodyId, T)>>,
}

impl<T> BodySlots<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn ensure_capacity(&mut self, index: usize) {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, || None);
        }
    }

    /// Insert or replace the value for `id`.
    pub fn insert(&mut self, id: BodyId, value: T) {
        let idx = id.index() as usize;
        self.ensure_capacity(idx);
        self.data[idx] = Some((id, value));
    }

    /// Remove the value for `id`. Stale handles remove nothing.
    pub fn remove(&mut self, id: BodyId) -> Option<T> {
        let slot = self.data.get_mut(id.index() as usize)?;
        match slot {
            Some((owner, _)) if *owner == id => slot.take().map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn get(&self, id: BodyId) -> Option<&T> {
        match self.data.get(id.index() as usize)? {
            Some((owner, value)) if *owner == id => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut T> {
        match self.data.get_mut(id.index() as usize)? {
            Some((owner, value)) if *owner == id => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over live (handle, value) pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &T)> {
        self.data
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(id, v)| (*id, v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut T)> {
        self.data
            .iter_mut()
            .filter_map(|slot| slot.as_mut().map(|(id, v)| (*id, v)))
    }

    /// Handles of every stored value, in slot order.
    pub fn ids(&self) -> Vec<BodyId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Mutable access to two distinct bodies at once.
    pub fn get_pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut T, &mut T)> {
        let (ia, ib) = (a.index() as usize, b.index() as usize);
        if ia == ib || !self.contains(a) || !self.contains(b) {
            return None;
        }

        let (low, high, swapped) = if ia < ib { (ia, ib, false) } else { (ib, ia, true) };
        let (head, tail) = self.data.split_at_mut(high);
        let first = head[low].as_mut().map(|(_, v)| v)?;
        let second = tail[0].as_mut().map(|(_, v)| v)?;
        if swapped {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|slot| slot.is_some()).count()
    }
}

impl<T> Default for BodySlots<T> {
    fn default() -> Self {
        Self::new()
    }
}
