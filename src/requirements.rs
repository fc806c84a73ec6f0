//! Per-invitation requirement metadata: collection ranges and field rules
use std::collections::BTreeMap;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    #[n(0)]
    Required,
    #[n(1)]
    RequiredUnless {
        #[n(0)]
        field: String, // e.g. endDate is required unless `current` is set
    },
    #[n(2)]
    MaxLength {
        #[n(0)]
        max: u32,
    },
    #[n(3)]
    Date,
    #[n(4)]
    AfterOrEqual {
        #[n(0)]
        field: String,
    },
    #[n(5)]
    OneOf {
        #[n(0)]
        values: Vec<String>,
    },
    #[n(6)]
    Boolean,
}

/// Settings for one service/section of the order
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct Component {
    #[n(0)]
    name: String,
    #[n(1)]
    min: Option<u32>,
    #[n(2)]
    max: Option<u32>,
    #[n(3)]
    rules: BTreeMap<String, Vec<Rule>>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
    pub fn with_min(mut self, min: u32) -> Self {
        self.min = Some(min);
        self
    }
    pub fn with_max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }
    pub fn with_rule(mut self, field: &str, rule: Rule) -> Self {
        self.rules.entry(field.to_string()).or_default().push(rule);
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn min(&self) -> Option<u32> {
        self.min
    }
    pub fn max(&self) -> Option<u32> {
        self.max
    }
    pub fn rules(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
    pub fn rules_for(&self, field: &str) -> &[Rule] {
        self.rules.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct Requirements {
    #[n(0)]
    invitation_id: String,
    #[n(1)]
    components: Vec<Component>,
}

impl Requirements {
    pub fn new(invitation_id: impl Into<String>) -> Self {
        Self {
            invitation_id: invitation_id.into(),
            components: vec![],
        }
    }
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }
    pub fn invitation_id(&self) -> &str {
        &self.invitation_id
    }
    /// First component whose name matches the section key
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Invitation details shown in the page header
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct Invitation {
    #[n(0)]
    pub invite_id: String,
    #[n(1)]
    pub company_name: String,
    #[n(2)]
    pub header_title: String,
    #[n(3)]
    pub introduction: String,
}
