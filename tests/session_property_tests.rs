//! Property-based tests for change tracking, error merging and ranges
//!
//! These use proptest to check the laws the session relies on across many
//! generated records, error sets and requirement limits rather than a few
//! hand-picked cases.

use proptest::prelude::*;
use std::collections::BTreeSet;
use order_session::{
    order::{FieldPath, FieldValue, Order, SubResource},
    range::{Introduction, RangeType, compute},
    requirements::{Component, Requirements},
    snapshot::CleanDirty,
    validation::{ErrorBag, Origin, ValidationOrchestrator},
};

// PROPERTY TEST STRATEGIES

/// Strategy to generate short free-text values, blanks included
fn text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z ]{0,12}"
}

/// Strategy to generate an order with a handful of education entries
fn order_strategy() -> impl Strategy<Value = Order> {
    prop::collection::vec(text_strategy(), 1..5).prop_map(|names| {
        let entries = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| SubResource::new(format!("edu_{i}")).set("schoolName", name))
            .collect();
        Order::new("order_1", "invite_1").with_entries("education", entries)
    })
}

/// Strategy to generate record-style field paths
fn path_strategy() -> impl Strategy<Value = String> {
    (0usize..4, prop::sample::select(vec!["schoolName", "startDate", "endDate", "city"]))
        .prop_map(|(i, field)| format!("education.{i}.{field}"))
}

/// Strategy to generate an error bag over a few paths
fn bag_strategy() -> impl Strategy<Value = ErrorBag> {
    prop::collection::btree_map(path_strategy(), "[a-z ]{1,10}", 0..8).prop_map(|errors| {
        let mut bag = ErrorBag::new();
        for (path, message) in errors {
            bag.add(path, message);
        }
        bag
    })
}

proptest! {
    /// Edits to the working copy never reach the clean copy
    #[test]
    fn dirty_edits_leave_clean_untouched(order in order_strategy(), value in text_strategy()) {
        let mut pair = CleanDirty::new(order.clone());
        let path = FieldPath::parse("education.0.schoolName").unwrap();

        pair.dirty_mut().set_field(&path, FieldValue::from(value)).unwrap();

        prop_assert_eq!(pair.clean(), &order);
    }

    /// Writing a different value dirties the pair; writing the old one back cleans it
    #[test]
    fn clean_flag_follows_value_equality(order in order_strategy(), value in text_strategy()) {
        let mut pair = CleanDirty::new(order);
        let path = FieldPath::parse("education.0.schoolName").unwrap();
        let original = pair.clean().field(&path).cloned().unwrap();

        pair.dirty_mut().set_field(&path, FieldValue::from(value.clone())).unwrap();
        prop_assert_eq!(pair.is_clean(), original == FieldValue::from(value));

        pair.dirty_mut().set_field(&path, original).unwrap();
        prop_assert!(pair.is_clean());
    }

    /// Revert and commit both leave a clean pair behind
    #[test]
    fn revert_and_commit_restore_clean(order in order_strategy(), value in text_strategy()) {
        let path = FieldPath::parse("education.0.city").unwrap();

        let mut reverted = CleanDirty::new(order.clone());
        reverted.dirty_mut().set_field(&path, FieldValue::from(value.clone())).unwrap();
        reverted.revert();
        prop_assert!(reverted.is_clean());
        prop_assert_eq!(reverted.dirty(), &order);

        let mut committed = CleanDirty::new(order);
        committed.dirty_mut().set_field(&path, FieldValue::from(value.clone())).unwrap();
        committed.commit();
        prop_assert!(committed.is_clean());
        prop_assert_eq!(committed.clean().field(&path), Some(&FieldValue::from(value)));
    }

    /// A partial pass only touches the paths it examined
    #[test]
    fn partial_merge_preserves_unexamined_paths(
        standing in bag_strategy(),
        found in bag_strategy(),
        examined in prop::collection::btree_set(path_strategy(), 0..6),
    ) {
        // a pass never reports paths it did not examine
        let mut scoped = ErrorBag::new();
        for (path, messages) in found.iter().filter(|(p, _)| examined.contains(*p)) {
            for message in messages {
                scoped.add(path, message.clone());
            }
        }

        let mut merged = standing.clone();
        merged.replace_paths(&examined, scoped.clone());

        for path in standing.paths().filter(|p| !examined.contains(*p)) {
            prop_assert_eq!(merged.get(path), standing.get(path));
        }
        for path in &examined {
            prop_assert_eq!(merged.get(path), scoped.get(path));
        }
    }

    /// Draft errors survive record passes and appear under the draft prefix
    #[test]
    fn draft_errors_survive_record_merges(
        record in bag_strategy(),
        examined in prop::collection::btree_set(path_strategy(), 0..4),
    ) {
        let mut validation = ValidationOrchestrator::new("newEntry");
        let draft_paths: BTreeSet<String> = ["schoolName".to_string()].into();
        let mut draft = ErrorBag::new();
        draft.add("schoolName", "The schoolName field is required.");

        validation.merge_partial(Origin::Draft, &draft_paths, draft);
        validation.merge_partial(Origin::Record, &examined, record);

        let errors = validation.errors();
        prop_assert!(errors.has("newEntry.schoolName"));
        prop_assert_eq!(validation.draft_errors().len(), 1);
    }

    /// Max is met exactly when a positive max has been reached
    #[test]
    fn max_met_iff_count_reaches_max(min in 0u32..5, max in 0u32..6, count in 0usize..8) {
        let requirements = Requirements::new("invite_1")
            .with_component(Component::new("education").with_min(min).with_max(max));

        let state = compute(&requirements, "education", count, RangeType::MinMax);

        prop_assert_eq!(state.max_met, max > 0 && count >= max as usize);
        prop_assert_eq!(state.introduction.is_empty(), min == 0 && max == 0);
    }

    /// Years sections introduce themselves by the span of history wanted
    #[test]
    fn years_mode_uses_min_as_span(min in 1u32..10, max in 0u32..6, count in 0usize..8) {
        let requirements = Requirements::new("invite_1")
            .with_component(Component::new("addresses").with_min(min).with_max(max));

        let state = compute(&requirements, "addresses", count, RangeType::Years);

        prop_assert_eq!(state.introduction, Introduction::Years { years: min });
    }
}
