//! Order records, their sections and the sub-resources inside them
use super::error::{SessionError, SessionResult};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;

/// A calendar date as entered on a form (start/end dates, graduation dates...)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Date)
    }
    /// Accepts the `YYYY-MM-DD` form used by date inputs
    pub fn parse(value: &str) -> Option<Self> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .ok()
            .map(Date)
    }
    pub fn to_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for Date {
    fn from(value: NaiveDate) -> Self {
        Date(value)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl<C> minicbor::Encode<C> for Date {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.i32(self.0.num_days_from_ce())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Date {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let days = d.i32()?;

        NaiveDate::from_num_days_from_ce_opt(days)
            .map(Date)
            .ok_or(minicbor::decode::Error::message(
                "failed to convert day count to a calendar date",
            ))
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    #[n(0)]
    #[default]
    Empty,
    #[n(1)]
    Text(#[n(0)] String),
    #[n(2)]
    Date(#[n(0)] Date),
    #[n(3)]
    Flag(#[n(0)] bool),
    #[n(4)]
    Code(#[n(0)] String), // enumerated codes, e.g. country or degree
}

impl FieldValue {
    /// Blank text counts as empty; a flag is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) | FieldValue::Code(s) => s.trim().is_empty(),
            FieldValue::Date(_) | FieldValue::Flag(_) => false,
        }
    }
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Flag(b) => *b,
            FieldValue::Text(s) | FieldValue::Code(s) => {
                matches!(s.trim(), "1" | "true" | "yes")
            }
            FieldValue::Date(_) => true,
            FieldValue::Empty => false,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Code(s) => Some(s.as_str()),
            _ => None,
        }
    }
    pub fn as_date(&self) -> Option<Date> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Text(s) => Date::parse(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<Date> for FieldValue {
    fn from(value: Date) -> Self {
        FieldValue::Date(value)
    }
}

/// One entry of a section, e.g. a single school attended
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct SubResource {
    #[n(0)]
    id: String, // unique within its section
    #[n(1)]
    fields: BTreeMap<String, FieldValue>,
}

impl SubResource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }
    pub fn set(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }
    pub fn set_field(&mut self, field: &str, value: FieldValue) {
        self.fields.insert(field.to_string(), value);
    }
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
    pub fn non_empty_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.as_str())
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub enum Section {
    #[n(0)]
    Single(#[n(0)] SubResource),
    #[n(1)]
    Many(#[n(0)] Vec<SubResource>),
}

impl Section {
    pub fn count(&self) -> usize {
        match self {
            Section::Single(_) => 1,
            Section::Many(entries) => entries.len(),
        }
    }
    pub fn entries(&self) -> &[SubResource] {
        match self {
            Section::Single(entry) => std::slice::from_ref(entry),
            Section::Many(entries) => entries,
        }
    }
    pub fn is_collection(&self) -> bool {
        matches!(self, Section::Many(_))
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceInfo {
    #[n(0)]
    pub confirmed_gaps: bool,
}

/// The aggregate being edited across the wizard
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct Order {
    #[n(0)]
    order_id: String,
    #[n(1)]
    invite_id: String,
    #[n(2)]
    sections: BTreeMap<String, Section>,
    #[n(3)]
    service_info: BTreeMap<String, ServiceInfo>,
}

impl Order {
    pub fn new(order_id: impl Into<String>, invite_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            invite_id: invite_id.into(),
            ..Self::default()
        }
    }
    pub fn with_section(mut self, key: &str, section: Section) -> Self {
        self.sections.insert(key.to_string(), section);
        self
    }
    pub fn with_entries(self, key: &str, entries: Vec<SubResource>) -> Self {
        self.with_section(key, Section::Many(entries))
    }
    pub fn order_id(&self) -> &str {
        &self.order_id
    }
    pub fn invite_id(&self) -> &str {
        &self.invite_id
    }
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }
    pub fn sections_mut(&mut self) -> impl Iterator<Item = (&str, &mut Section)> {
        self.sections.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.get(key)
    }
    pub fn section_mut(&mut self, key: &str) -> Option<&mut Section> {
        self.sections.get_mut(key)
    }
    pub fn entry_count(&self, key: &str) -> usize {
        self.sections.get(key).map_or(0, Section::count)
    }
    pub fn entry(&self, key: &str, index: Option<usize>) -> Option<&SubResource> {
        match (self.sections.get(key)?, index) {
            (Section::Single(entry), None) => Some(entry),
            (Section::Many(entries), Some(i)) => entries.get(i),
            _ => None,
        }
    }
    pub fn entry_mut(&mut self, key: &str, index: Option<usize>) -> Option<&mut SubResource> {
        match (self.sections.get_mut(key)?, index) {
            (Section::Single(entry), None) => Some(entry),
            (Section::Many(entries), Some(i)) => entries.get_mut(i),
            _ => None,
        }
    }
    pub fn field(&self, path: &FieldPath) -> Option<&FieldValue> {
        self.entry(&path.section, path.index)?.get(&path.field)
    }
    pub fn set_field(&mut self, path: &FieldPath, value: FieldValue) -> SessionResult<()> {
        let entry = self
            .entry_mut(&path.section, path.index)
            .ok_or_else(|| SessionError::InvalidPath(path.to_string()))?;
        entry.set_field(&path.field, value);
        Ok(())
    }
    /// Appends to a collection section, creating it when the order has none yet
    pub fn push_entry(&mut self, key: &str, entry: SubResource) -> SessionResult<()> {
        match self.sections.get_mut(key) {
            None => {
                self.sections
                    .insert(key.to_string(), Section::Many(vec![entry]));
                Ok(())
            }
            Some(Section::Many(entries)) => {
                entries.push(entry);
                Ok(())
            }
            Some(Section::Single(_)) => Err(SessionError::NotACollection(key.to_string())),
        }
    }
    /// Removes an entry by id, keeping the order of the remaining entries
    pub fn remove_entry(&mut self, key: &str, id: &str) -> Option<SubResource> {
        match self.sections.get_mut(key)? {
            Section::Many(entries) => {
                let pos = entries.iter().position(|e| e.id == id)?;
                Some(entries.remove(pos))
            }
            Section::Single(_) => None,
        }
    }
    pub fn confirmed_gaps(&self, key: &str) -> bool {
        self.service_info
            .get(key)
            .is_some_and(|info| info.confirmed_gaps)
    }
    pub fn set_confirmed_gaps(&mut self, key: &str, value: bool) {
        self.service_info
            .entry(key.to_string())
            .or_default()
            .confirmed_gaps = value;
    }
}

/// Dot-addressed location of a field: `section.index.field` or `section.field`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldPath {
    pub section: String,
    pub index: Option<usize>,
    pub field: String,
}

impl FieldPath {
    pub fn parse(path: &str) -> SessionResult<Self> {
        let invalid = || SessionError::InvalidPath(path.to_string());
        let parts: Vec<&str> = path.split('.').collect();

        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid());
        }

        match parts.as_slice() {
            [section, field] => Ok(Self {
                section: section.to_string(),
                index: None,
                field: field.to_string(),
            }),
            [section, index, field] => Ok(Self {
                section: section.to_string(),
                index: Some(index.parse().map_err(|_| invalid())?),
                field: field.to_string(),
            }),
            _ => Err(invalid()),
        }
    }
    /// Path of the entry that holds this field
    pub fn entry_prefix(&self) -> String {
        match self.index {
            Some(i) => format!("{}.{}", self.section, i),
            None => self.section.clone(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entry_prefix(), self.field)
    }
}
