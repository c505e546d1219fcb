use crate::collision::BodyHandle;

use super::rigid_body::RigidBody;

/// Arena of rigid bodies addressed by [`BodyHandle`].
///
/// Handles are never reused: removing a body leaves an empty slot, so
/// iteration always follows insertion order and a stale handle simply
/// resolves to `None`. Empty slots are only reclaimed by [`BodySet::clear`],
/// so a host that keeps adding and removing bodies should clear between
/// scenes.
#[derive(Debug, Clone, Default)]
pub struct BodySet {
    slots: Vec<Option<RigidBody>>,
    len: usize,
}

impl BodySet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `body` and returns its handle
    pub fn insert(&mut self, body: RigidBody) -> BodyHandle {
        let handle = BodyHandle::new(self.slots.len() as u32);
        self.slots.push(Some(body));
        self.len += 1;
        handle
    }

    /// Removes and returns the body behind `handle`
    pub fn remove(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let body = self.slots.get_mut(handle.index())?.take()?;
        self.len -= 1;
        Some(body)
    }

    /// Returns true if `handle` refers to a live body
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Gets a reference to a body
    pub fn get(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.slots.get(handle.index()).and_then(Option::as_ref)
    }

    /// Gets a mutable reference to a body
    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.slots.get_mut(handle.index()).and_then(Option::as_mut)
    }

    /// Mutable references to two distinct bodies
    pub fn pair_mut(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Option<(&mut RigidBody, &mut RigidBody)> {
        let (ia, ib) = (a.index(), b.index());
        if ia == ib || ia.max(ib) >= self.slots.len() {
            return None;
        }

        let (before, after) = self.slots.split_at_mut(ia.max(ib));
        let (slot_a, slot_b) = if ia < ib {
            (&mut before[ia], &mut after[0])
        } else {
            (&mut after[0], &mut before[ib])
        };
        Some((slot_a.as_mut()?, slot_b.as_mut()?))
    }

    /// Number of live bodies
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the set holds no bodies
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over live bodies in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|body| (BodyHandle::new(i as u32), body)))
    }

    /// Iterates mutably over live bodies in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut RigidBody)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|body| (BodyHandle::new(i as u32), body)))
    }

    /// Removes every body. Handles issued afterwards start from zero again.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    #[test]
    fn test_insert_and_get() {
        let mut set = BodySet::new();
        let a = set.insert(RigidBody::circle(1.0));
        let b = set.insert(RigidBody::circle(2.0).with_position(Vec2::X));

        assert_eq!(set.len(), 2);
        assert_eq!(a, BodyHandle::new(0));
        assert_eq!(set.get(b).unwrap().position(), Vec2::X);
    }

    #[test]
    fn test_handles_not_reused() {
        let mut set = BodySet::new();
        let a = set.insert(RigidBody::circle(1.0));
        assert!(set.remove(a).is_some());
        assert!(set.remove(a).is_none());

        let b = set.insert(RigidBody::circle(1.0));
        assert_ne!(a, b);
        assert!(set.get(a).is_none());
        assert!(!set.contains(a));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_iteration_order() {
        let mut set = BodySet::new();
        let handles: Vec<_> = (0..5).map(|_| set.insert(RigidBody::circle(1.0))).collect();
        set.remove(handles[2]);

        let seen: Vec<_> = set.iter().map(|(h, _)| h).collect();
        assert_eq!(seen, vec![handles[0], handles[1], handles[3], handles[4]]);
    }

    #[test]
    fn test_pair_mut() {
        let mut set = BodySet::new();
        let a = set.insert(RigidBody::circle(1.0));
        let b = set.insert(RigidBody::circle(1.0));

        {
            let (body_b, body_a) = set.pair_mut(b, a).unwrap();
            body_a.linear_velocity = Vec2::X;
            body_b.linear_velocity = Vec2::Y;
        }
        assert_eq!(set.get(a).unwrap().linear_velocity, Vec2::X);
        assert_eq!(set.get(b).unwrap().linear_velocity, Vec2::Y);

        assert!(set.pair_mut(a, a).is_none());
        assert!(set.pair_mut(a, BodyHandle::new(9)).is_none());
        set.remove(b);
        assert!(set.pair_mut(a, b).is_none());
    }
}
