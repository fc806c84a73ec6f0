//! Session configuration.
//!
//! Which services exist, which route edits each of them and where the
//! wizard falls back to. The mapping is handed to a session when it is
//! loaded, instead of being looked up from a global table.

use super::range::RangeType;
use serde::{Deserialize, Serialize};

/// A page of the wizard with a fixed position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub route: String,
    pub title: String,
}

/// A service of the order and the page that edits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRoute {
    /// Section key in the order and component name in the requirements.
    pub key: String,
    pub route: String,
    pub title: String,

    #[serde(default)]
    pub range_type: RangeType,

    /// bech32 prefix for ids of new entries.
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
}

fn default_id_prefix() -> String {
    "entry_".to_string()
}

impl ServiceRoute {
    pub fn new(key: &str, route: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            route: route.to_string(),
            title: title.to_string(),
            range_type: RangeType::default(),
            id_prefix: default_id_prefix(),
        }
    }
    pub fn with_range_type(mut self, range_type: RangeType) -> Self {
        self.range_type = range_type;
        self
    }
    pub fn with_id_prefix(mut self, prefix: &str) -> Self {
        self.id_prefix = prefix.to_string();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Services in wizard order.
    pub services: Vec<ServiceRoute>,

    /// Where navigation lands past either end of the services.
    pub summary: PageRef,

    /// Routes that are not service pages (summary, review, consent,
    /// completion); they keep their own adjacent links.
    pub fixed_pages: Vec<String>,

    /// URL for a route, with `{order}` and `{route}` placeholders.
    pub url_template: String,

    /// Path prefix for errors of the new-entry form.
    pub draft_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            services: vec![
                ServiceRoute::new("personal", "order.personal", "Personal Information"),
                ServiceRoute::new("addresses", "order.addresses", "Addresses")
                    .with_range_type(RangeType::Years)
                    .with_id_prefix("addr_"),
                ServiceRoute::new("education", "order.education", "Education")
                    .with_id_prefix("edu_"),
                ServiceRoute::new("employment", "order.employment", "Employment")
                    .with_range_type(RangeType::Years)
                    .with_id_prefix("emp_"),
            ],
            summary: PageRef {
                route: "order.application-summary".to_string(),
                title: "Summary".to_string(),
            },
            fixed_pages: vec![
                "order.application-summary".to_string(),
                "order.services-review".to_string(),
                "order.consent".to_string(),
                "order.complete".to_string(),
            ],
            url_template: "/order/{order}/{route}".to_string(),
            draft_prefix: "newEntry".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
    pub fn service(&self, key: &str) -> Option<&ServiceRoute> {
        self.services.iter().find(|s| s.key == key)
    }
    pub fn service_for_route(&self, route: &str) -> Option<&ServiceRoute> {
        self.services.iter().find(|s| s.route == route)
    }
    pub fn is_fixed_page(&self, route: &str) -> bool {
        self.fixed_pages.iter().any(|r| r == route)
    }
    pub fn url(&self, route: &str, order_id: &str) -> String {
        self.url_template
            .replace("{order}", order_id)
            .replace("{route}", route)
    }
}
