//! Previous/next navigation across the service pages of an order.
use super::config::{PageRef, SessionConfig};
use super::order::{Order, Section};
use super::validation::ErrorBag;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEntry {
    pub service_key: String,
    pub step: usize,
    pub route_id: String,
    pub title: String,
    pub completed_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub route: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLinks {
    pub previous: NavLink,
    pub next: NavLink,
}

/// The page one step away from `current_route`. Past either end of the
/// services the summary page is the destination.
pub fn plan(
    pages: &[NavigationEntry],
    current_route: &str,
    direction: Direction,
    summary: &PageRef,
) -> PageTarget {
    let fallback = || PageTarget {
        route: summary.route.clone(),
        title: summary.title.clone(),
    };

    let Some(current) = pages.iter().find(|p| p.route_id == current_route) else {
        warn!(route = current_route, "route is not one of the order's service pages");
        return fallback();
    };

    let step = match direction {
        Direction::Next => current.step.checked_add(1),
        Direction::Previous => current.step.checked_sub(1),
    };

    step.and_then(|step| pages.iter().find(|p| p.step == step))
        .map(|p| PageTarget {
            route: p.route_id.clone(),
            title: p.title.clone(),
        })
        .unwrap_or_else(fallback)
}

// entries of the section with no errors below them
fn completed(key: &str, section: &Section, errors: &ErrorBag) -> usize {
    match section {
        Section::Single(_) => usize::from(errors.count_under(key) == 0),
        Section::Many(entries) => (0..entries.len())
            .filter(|i| errors.count_under(&format!("{key}.{i}")) == 0)
            .count(),
    }
}

#[derive(Debug, Clone)]
pub struct NavigationPlanner {
    pages: Vec<NavigationEntry>,
    summary: PageRef,
}

impl NavigationPlanner {
    /// Pages for the services the order exercises, in configured order
    pub fn assemble(order: &Order, config: &SessionConfig, errors: &ErrorBag) -> Self {
        let pages = config
            .services
            .iter()
            .filter_map(|s| order.section(&s.key).map(|section| (s, section)))
            .enumerate()
            .map(|(step, (service, section))| NavigationEntry {
                service_key: service.key.clone(),
                step,
                route_id: service.route.clone(),
                title: service.title.clone(),
                completed_count: completed(&service.key, section, errors),
                total_count: section.count(),
            })
            .collect();

        Self {
            pages,
            summary: config.summary.clone(),
        }
    }

    pub fn pages(&self) -> &[NavigationEntry] {
        &self.pages
    }

    pub fn plan(&self, current_route: &str, direction: Direction) -> PageTarget {
        plan(&self.pages, current_route, direction, &self.summary)
    }

    /// Both links for a page. Fixed pages get `None`; their links are not
    /// derived from the services.
    pub fn links(&self, config: &SessionConfig, order_id: &str, route: &str) -> Option<StepLinks> {
        if config.is_fixed_page(route) {
            return None;
        }

        let link = |direction| {
            let target = self.plan(route, direction);
            NavLink {
                url: config.url(&target.route, order_id),
                title: target.title,
            }
        };

        Some(StepLinks {
            previous: link(Direction::Previous),
            next: link(Direction::Next),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::SubResource;

    fn page(step: usize, route: &str) -> NavigationEntry {
        NavigationEntry {
            service_key: route.to_lowercase(),
            step,
            route_id: route.to_string(),
            title: format!("Title {route}"),
            completed_count: 0,
            total_count: 0,
        }
    }

    fn summary() -> PageRef {
        PageRef {
            route: "summary".into(),
            title: "Summary".into(),
        }
    }

    #[test]
    fn next_from_first_page() {
        let pages = [page(0, "A"), page(1, "B")];
        let target = plan(&pages, "A", Direction::Next, &summary());
        assert_eq!(target.route, "B");
        assert_eq!(target.title, "Title B");
    }

    #[test]
    fn ends_fall_back_to_summary() {
        let pages = [page(0, "A"), page(1, "B")];
        assert_eq!(plan(&pages, "B", Direction::Next, &summary()).route, "summary");
        assert_eq!(plan(&pages, "A", Direction::Previous, &summary()).route, "summary");
        assert_eq!(plan(&pages, "Z", Direction::Next, &summary()).route, "summary");
    }

    #[test]
    fn assemble_follows_config_order() {
        let config = SessionConfig::default();
        let order = crate::order::Order::new("order_1", "invite_1")
            .with_entries(
                "employment",
                vec![SubResource::new("j1"), SubResource::new("j2")],
            )
            .with_entries("education", vec![SubResource::new("e1")]);

        let mut errors = ErrorBag::new();
        errors.add("employment.1.employer", "The employer field is required.");

        let planner = NavigationPlanner::assemble(&order, &config, &errors);
        let keys: Vec<_> = planner.pages().iter().map(|p| p.service_key.as_str()).collect();
        assert_eq!(keys, ["education", "employment"]);

        let emp = &planner.pages()[1];
        assert_eq!((emp.step, emp.completed_count, emp.total_count), (1, 1, 2));
    }

    #[test]
    fn fixed_pages_have_no_links() {
        let config = SessionConfig::default();
        let order = crate::order::Order::new("order_1", "invite_1")
            .with_entries("education", vec![]);
        let planner = NavigationPlanner::assemble(&order, &config, &ErrorBag::new());

        assert!(planner.links(&config, "order_1", "order.consent").is_none());

        let links = planner.links(&config, "order_1", "order.education").unwrap();
        assert_eq!(links.next.url, "/order/order_1/order.application-summary");
        assert_eq!(links.previous.title, "Summary");
    }
}
