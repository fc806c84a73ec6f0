//! Dropdown option sets handed to the presentation layer
use std::collections::BTreeMap;

/// A row as the options service returns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRow {
    pub code: String,
    pub label: String,
}

impl OptionRow {
    pub fn new(code: &str, label: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
        }
    }
}

/// Which subset of states a page offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateListVariant {
    #[default]
    Default,
    /// Addresses and criminal history
    Residence,
    ProfessionalLicense,
}

pub trait OptionsProvider {
    fn country_list(&self) -> anyhow::Result<Vec<OptionRow>>;
    fn degree_list(&self) -> anyhow::Result<Vec<OptionRow>>;
    fn major_list(&self) -> anyhow::Result<Vec<OptionRow>>;
    fn minor_list(&self) -> anyhow::Result<Vec<OptionRow>>;
    fn state_list(&self, variant: StateListVariant) -> anyhow::Result<Vec<OptionRow>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionList {
    Countries,
    Degrees,
    Majors,
    Minors,
    States(StateListVariant),
}

impl OptionList {
    pub fn name(&self) -> &'static str {
        match self {
            OptionList::Countries => "countries",
            OptionList::Degrees => "degrees",
            OptionList::Majors => "majors",
            OptionList::Minors => "minors",
            OptionList::States(_) => "states",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub value: String,
    pub display: String,
}

#[derive(Debug, Clone, Default)]
pub struct Dropdowns {
    lists: BTreeMap<&'static str, Vec<DropdownOption>>,
}

impl Dropdowns {
    pub fn load(provider: &dyn OptionsProvider, lists: &[OptionList]) -> anyhow::Result<Self> {
        let mut dropdowns = Dropdowns::default();

        for list in lists {
            let options = match list {
                OptionList::Countries => coded(provider.country_list()?),
                OptionList::Degrees => labelled(provider.degree_list()?),
                OptionList::Majors => labelled(provider.major_list()?),
                OptionList::Minors => labelled(provider.minor_list()?),
                OptionList::States(variant) => coded(provider.state_list(*variant)?),
            };
            dropdowns.lists.insert(list.name(), options);
        }

        Ok(dropdowns)
    }

    pub fn get(&self, name: &str) -> &[DropdownOption] {
        self.lists.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The list plus the current value when it was typed in rather than picked
    pub fn with_custom(&self, name: &str, current: &str) -> Vec<DropdownOption> {
        let mut options = self.get(name).to_vec();
        let current = current.trim();
        if !current.is_empty() && !options.iter().any(|o| o.value == current) {
            options.push(DropdownOption {
                value: current.to_string(),
                display: current.to_string(),
            });
        }
        options
    }
}

// "US: United States", valued by code
fn coded(rows: Vec<OptionRow>) -> Vec<DropdownOption> {
    rows.into_iter()
        .map(|r| DropdownOption {
            display: format!("{}: {}", r.code, r.label),
            value: r.code,
        })
        .collect()
}

fn labelled(rows: Vec<OptionRow>) -> Vec<DropdownOption> {
    rows.into_iter()
        .map(|r| DropdownOption {
            value: r.label.clone(),
            display: r.label,
        })
        .collect()
}

/// Fixed lists, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    pub countries: Vec<OptionRow>,
    pub degrees: Vec<OptionRow>,
    pub majors: Vec<OptionRow>,
    pub minors: Vec<OptionRow>,
    pub states: BTreeMap<&'static str, Vec<OptionRow>>,
}

fn variant_key(variant: StateListVariant) -> &'static str {
    match variant {
        StateListVariant::Default => "default",
        StateListVariant::Residence => "residence",
        StateListVariant::ProfessionalLicense => "professional_license",
    }
}

impl StaticOptions {
    pub fn with_states(mut self, variant: StateListVariant, rows: Vec<OptionRow>) -> Self {
        self.states.insert(variant_key(variant), rows);
        self
    }
}

impl OptionsProvider for StaticOptions {
    fn country_list(&self) -> anyhow::Result<Vec<OptionRow>> {
        Ok(self.countries.clone())
    }
    fn degree_list(&self) -> anyhow::Result<Vec<OptionRow>> {
        Ok(self.degrees.clone())
    }
    fn major_list(&self) -> anyhow::Result<Vec<OptionRow>> {
        Ok(self.majors.clone())
    }
    fn minor_list(&self) -> anyhow::Result<Vec<OptionRow>> {
        Ok(self.minors.clone())
    }
    fn state_list(&self, variant: StateListVariant) -> anyhow::Result<Vec<OptionRow>> {
        Ok(self
            .states
            .get(variant_key(variant))
            .cloned()
            .unwrap_or_default())
    }
}
