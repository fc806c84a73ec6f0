//! The not-yet-saved entry behind a section's "add new" form
use super::order::{FieldValue, SubResource};
use super::snapshot::CleanDirty;
use super::utils::new_entry_id;

/// Its clean side is always an empty entry with the draft's own id, so any
/// typed value makes the draft dirty.
#[derive(Debug, Clone)]
pub struct DraftEntry {
    section: String,
    id_prefix: String,
    pair: CleanDirty<SubResource>,
}

impl DraftEntry {
    pub fn new(section: &str, id_prefix: &str) -> anyhow::Result<Self> {
        Ok(Self {
            section: section.to_string(),
            id_prefix: id_prefix.to_string(),
            pair: CleanDirty::new(SubResource::new(new_entry_id(id_prefix)?)),
        })
    }
    pub fn section(&self) -> &str {
        &self.section
    }
    pub fn entry(&self) -> &SubResource {
        self.pair.dirty()
    }
    pub fn id(&self) -> &str {
        self.pair.dirty().id()
    }
    pub fn set_field(&mut self, field: &str, value: FieldValue) {
        self.pair.dirty_mut().set_field(field, value);
    }
    pub fn is_clean(&self) -> bool {
        self.pair.is_clean()
    }
    /// Replace with an empty entry under a new id
    pub fn reset(&mut self) -> anyhow::Result<()> {
        self.pair
            .rebase(SubResource::new(new_entry_id(&self.id_prefix)?));
        Ok(())
    }
}
