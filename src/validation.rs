//! Requirement-driven validation of orders and single entries.
//!
//! Validation results are display state: a map from field path to messages.
//! Two kinds of pass feed the standing state held by the orchestrator:
//!
//! * a partial pass after a single field edit, which replaces the errors of
//!   the paths it examined and leaves every other path alone;
//! * a full pass over the working record at render time, which replaces the
//!   record's errors wholesale.
//!
//! Errors raised by the draft-new-entry form are kept apart from the
//! record's, since the draft is not part of the record and a full pass
//! cannot see it. They are folded back into the exposed view under the
//! draft prefix.
use super::error::Violation;
use super::order::{FieldPath, FieldValue, Order, SubResource};
use super::requirements::{Component, Requirements, Rule};
use super::snapshot::fingerprint;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBag {
    messages: BTreeMap<String, Vec<String>>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.messages
            .entry(path.into())
            .or_default()
            .push(message.into());
    }
    pub fn get(&self, path: &str) -> &[String] {
        self.messages
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
    pub fn has(&self, path: &str) -> bool {
        self.messages.contains_key(path)
    }
    /// Number of failing fields below an entry path such as `education.0`
    pub fn count_under(&self, prefix: &str) -> usize {
        let prefix = format!("{prefix}.");
        self.messages
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .count()
    }
    pub fn len(&self) -> usize {
        self.messages.len()
    }
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.messages
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
    /// Per-path replace: every examined path takes exactly what `found`
    /// reports for it (possibly nothing); paths outside `examined` keep
    /// their errors.
    pub fn replace_paths(&mut self, examined: &BTreeSet<String>, found: ErrorBag) {
        for path in examined {
            self.messages.remove(path);
        }
        for (path, messages) in found.messages {
            if examined.contains(&path) {
                self.messages.insert(path, messages);
            }
        }
    }
    /// Adds the other bag's messages without removing any of ours
    pub fn union(&mut self, other: &ErrorBag) {
        for (path, messages) in &other.messages {
            let ours = self.messages.entry(path.clone()).or_default();
            for m in messages {
                if !ours.contains(m) {
                    ours.push(m.clone());
                }
            }
        }
    }
    pub fn prefixed(&self, prefix: &str) -> ErrorBag {
        let messages = self
            .messages
            .iter()
            .map(|(k, v)| (format!("{prefix}.{k}"), v.clone()))
            .collect();
        ErrorBag { messages }
    }
}

/// What a pass is validating: the whole record (paths like
/// `education.0.startDate`) or a single entry of a section (bare field names).
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Record(&'a Order),
    Entry {
        section: &'a str,
        entry: &'a SubResource,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Record,
    Draft,
}

fn check(rule: &Rule, field: &str, entry: &SubResource) -> Option<Violation> {
    let value = entry.get(field).unwrap_or(&FieldValue::Empty);
    let field = field.to_string();

    match rule {
        Rule::Required => value.is_empty().then_some(Violation::Required { field }),
        Rule::RequiredUnless { field: other } => {
            let excused = entry.get(other).is_some_and(FieldValue::is_truthy);
            (value.is_empty() && !excused).then(|| Violation::RequiredUnless {
                field,
                other: other.clone(),
            })
        }
        Rule::MaxLength { max } => value
            .as_str()
            .filter(|s| s.chars().count() > *max as usize)
            .map(|_| Violation::TooLong { field, max: *max }),
        Rule::Date => (!value.is_empty() && value.as_date().is_none())
            .then_some(Violation::NotADate { field }),
        Rule::AfterOrEqual { field: other } => {
            let this = value.as_date()?;
            let that = entry.get(other)?.as_date()?;
            (this < that).then(|| Violation::BeforeOther {
                field,
                other: other.clone(),
            })
        }
        Rule::OneOf { values } => {
            let s = value.as_str()?.trim();
            (!s.is_empty() && !values.iter().any(|v| v == s))
                .then_some(Violation::NotAllowed { field })
        }
        Rule::Boolean => match value {
            FieldValue::Empty | FieldValue::Flag(_) => None,
            FieldValue::Text(s) | FieldValue::Code(s)
                if matches!(s.trim(), "" | "0" | "1" | "true" | "false") =>
            {
                None
            }
            _ => Some(Violation::NotBoolean { field }),
        },
    }
}

fn check_field(rules: &[Rule], field: &str, entry: &SubResource) -> Vec<String> {
    rules
        .iter()
        .filter_map(|rule| check(rule, field, entry))
        .map(|v| v.to_string())
        .collect()
}

fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn check_entry(component: &Component, entry: &SubResource, prefix: &str, bag: &mut ErrorBag) {
    for (field, rules) in component.rules() {
        let path = join(prefix, field);
        for message in check_field(rules, field, entry) {
            bag.add(path.clone(), message);
        }
    }
}

// section, entry and field name addressed by a path of the target
fn resolve<'a>(target: Target<'a>, path: &str) -> Option<(String, &'a SubResource, String)> {
    match target {
        Target::Record(order) => {
            let p = FieldPath::parse(path).ok()?;
            let entry = order.entry(&p.section, p.index)?;
            Some((p.section, entry, p.field))
        }
        Target::Entry { section, entry } => Some((section.to_string(), entry, path.to_string())),
    }
}

/// Validates only the listed paths. Paths that address nothing, or fields
/// without rules, produce no errors.
pub fn validate_fields(
    target: Target<'_>,
    requirements: &Requirements,
    paths: &BTreeSet<String>,
) -> ErrorBag {
    let mut bag = ErrorBag::new();

    for path in paths {
        let Some((section, entry, field)) = resolve(target, path) else {
            continue;
        };
        let Some(component) = requirements.component(&section) else {
            continue;
        };
        for message in check_field(component.rules_for(&field), &field, entry) {
            bag.add(path.clone(), message);
        }
    }

    bag
}

/// Validates every rule of every entry the target holds
pub fn validate_all(target: Target<'_>, requirements: &Requirements) -> ErrorBag {
    let mut bag = ErrorBag::new();

    match target {
        Target::Record(order) => {
            for (key, section) in order.sections() {
                let Some(component) = requirements.component(key) else {
                    continue;
                };
                for (i, entry) in section.entries().iter().enumerate() {
                    let prefix = if section.is_collection() {
                        format!("{key}.{i}")
                    } else {
                        key.to_string()
                    };
                    check_entry(component, entry, &prefix, &mut bag);
                }
            }
        }
        Target::Entry { section, entry } => {
            if let Some(component) = requirements.component(section) {
                check_entry(component, entry, "", &mut bag);
            }
        }
    }

    bag
}

/// Every non-empty field of the entry plus the edited one, which may itself
/// have just been emptied.
pub fn touched_paths(entry: &SubResource, prefix: &str, edited_field: &str) -> BTreeSet<String> {
    let mut paths: BTreeSet<String> = entry
        .non_empty_fields()
        .map(|f| join(prefix, f))
        .collect();
    paths.insert(join(prefix, edited_field));
    paths
}

#[derive(Debug, Clone, Default)]
pub struct ValidationOrchestrator {
    record: ErrorBag,
    draft: ErrorBag,
    draft_prefix: String,
    last_full_pass: Option<String>,
}

impl ValidationOrchestrator {
    pub fn new(draft_prefix: impl Into<String>) -> Self {
        Self {
            draft_prefix: draft_prefix.into(),
            ..Self::default()
        }
    }

    /// Live validation after `edited` changed. For a record target `edited`
    /// is a full path; for an entry target it is the field name.
    pub fn validate_edit(
        &mut self,
        origin: Origin,
        target: Target<'_>,
        requirements: &Requirements,
        edited: &str,
    ) {
        let Some((_, entry, field)) = resolve(target, edited) else {
            return;
        };
        let prefix = match target {
            Target::Record(_) => match FieldPath::parse(edited) {
                Ok(p) => p.entry_prefix(),
                Err(_) => return,
            },
            Target::Entry { .. } => String::new(),
        };

        let examined = touched_paths(entry, &prefix, &field);
        let found = validate_fields(target, requirements, &examined);
        debug!(
            path = edited,
            examined = examined.len(),
            errors = found.len(),
            "partial validation"
        );
        self.merge_partial(origin, &examined, found);
    }

    pub fn merge_partial(&mut self, origin: Origin, examined: &BTreeSet<String>, found: ErrorBag) {
        match origin {
            Origin::Record => {
                self.record.replace_paths(examined, found);
                self.last_full_pass = None;
            }
            Origin::Draft => self.draft.replace_paths(examined, found),
        }
    }

    /// Full pass over the working record. Record errors are replaced;
    /// draft errors are not produced by this pass and are kept as they are.
    pub fn validate_full(&mut self, order: &Order, requirements: &Requirements) {
        self.record = validate_all(Target::Record(order), requirements);
        self.last_full_pass = pass_key(order, requirements);
        debug!(
            order_id = order.order_id(),
            errors = self.record.len(),
            "full validation"
        );
    }

    /// Runs the full pass only when the record or requirements changed
    /// since the last one. Returns whether a pass ran.
    pub fn validate_full_if_changed(&mut self, order: &Order, requirements: &Requirements) -> bool {
        let key = pass_key(order, requirements);
        if key.is_some() && key == self.last_full_pass {
            return false;
        }
        self.validate_full(order, requirements);
        true
    }

    /// Record errors with the draft's folded in under the draft prefix
    pub fn errors(&self) -> ErrorBag {
        let mut bag = self.record.clone();
        bag.union(&self.draft.prefixed(&self.draft_prefix));
        bag
    }
    pub fn record_errors(&self) -> &ErrorBag {
        &self.record
    }
    pub fn draft_errors(&self) -> &ErrorBag {
        &self.draft
    }
    pub fn clear_draft(&mut self) {
        self.draft = ErrorBag::new();
    }
}

fn pass_key(order: &Order, requirements: &Requirements) -> Option<String> {
    let order = fingerprint(order).ok()?;
    let requirements = fingerprint(requirements).ok()?;
    Some(format!("{order}:{requirements}"))
}
