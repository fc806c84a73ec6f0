//! Clean/dirty snapshots and value comparison
//!
//! Every piece of change tracking in a session goes through here: the
//! session keeps the last persisted value as `clean` and edits an
//! independent copy, `dirty`. "Unsaved changes" is always answered by
//! comparing the two whole values, never by tracking individual edits.

/// Deep structural comparison.
pub fn is_equal<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

/// An independent deep copy. Records own all of their data, so the copy
/// shares nothing mutable with the source.
pub fn detach<T: Clone>(value: &T) -> T {
    value.clone()
}

/// sha256 digest of the value's CBOR encoding
pub fn fingerprint<T: minicbor::Encode<()>>(value: &T) -> anyhow::Result<String> {
    let cbor = minicbor::to_vec(value)?;
    Ok(sha256::digest(&cbor))
}

#[derive(Debug, Clone)]
pub struct CleanDirty<T> {
    clean: T,
    dirty: T,
}

impl<T: Clone + PartialEq> CleanDirty<T> {
    pub fn new(clean: T) -> Self {
        let dirty = detach(&clean);
        Self { clean, dirty }
    }
    pub fn clean(&self) -> &T {
        &self.clean
    }
    pub fn dirty(&self) -> &T {
        &self.dirty
    }
    pub fn dirty_mut(&mut self) -> &mut T {
        &mut self.dirty
    }
    pub fn is_clean(&self) -> bool {
        is_equal(&self.dirty, &self.clean)
    }
    /// The working copy has been persisted and becomes the new baseline.
    pub fn commit(&mut self) {
        self.clean = detach(&self.dirty);
    }
    /// Discard the working copy.
    pub fn revert(&mut self) {
        self.dirty = detach(&self.clean);
    }
    /// Replace both sides with a fresh baseline.
    pub fn rebase(&mut self, value: T) {
        self.dirty = detach(&value);
        self.clean = value;
    }
    /// Apply an already persisted change to both sides, leaving the
    /// unsaved-change state as it was.
    pub fn apply_both(&mut self, mut f: impl FnMut(&mut T)) {
        f(&mut self.clean);
        f(&mut self.dirty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Order, SubResource};

    fn order() -> Order {
        Order::new("order_1", "invite_1").with_entries(
            "education",
            vec![SubResource::new("e1").set("schoolName", "MIT")],
        )
    }

    #[test]
    fn pair_starts_clean() {
        let pair = CleanDirty::new(order());
        assert!(pair.is_clean());
        assert!(is_equal(pair.clean(), pair.dirty()));
    }

    #[test]
    fn editing_dirty_leaves_clean_alone() {
        let mut pair = CleanDirty::new(order());
        pair.dirty_mut()
            .push_entry("education", SubResource::new("e2"))
            .unwrap();

        assert!(!pair.is_clean());
        assert_eq!(pair.clean().entry_count("education"), 1);

        pair.revert();
        assert!(pair.is_clean());
        assert_eq!(pair.dirty().entry_count("education"), 1);
    }

    #[test]
    fn commit_moves_the_baseline() {
        let mut pair = CleanDirty::new(order());
        pair.dirty_mut().set_confirmed_gaps("education", true);
        pair.commit();

        assert!(pair.is_clean());
        assert!(pair.clean().confirmed_gaps("education"));
    }

    #[test]
    fn apply_both_keeps_dirty_state() {
        let mut pair = CleanDirty::new(order());
        pair.dirty_mut()
            .push_entry("education", SubResource::new("e2"))
            .unwrap();
        pair.apply_both(|o| o.set_confirmed_gaps("education", true));

        assert!(!pair.is_clean());
        assert!(pair.clean().confirmed_gaps("education"));
        assert!(pair.dirty().confirmed_gaps("education"));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = order();
        let mut b = order();
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());

        b.set_confirmed_gaps("education", true);
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }
}
