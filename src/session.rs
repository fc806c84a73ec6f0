//! Editing sessions over a single order
//!
//! A session owns the clean/dirty pair of the order it loaded, the draft
//! behind the page's "add new" form, and the validation, range and
//! navigation state derived from them. Persistence and requirement lookups
//! go through the injected collaborators; one message may be in flight at
//! a time.
use super::config::{ServiceRoute, SessionConfig};
use super::draft::DraftEntry;
use super::error::{SessionError, SessionResult};
use super::gate::{InFlight, MessageGate};
use super::navigation::{Direction, NavLink, NavigationPlanner, StepLinks};
use super::options::{Dropdowns, OptionList, OptionsProvider};
use super::order::{FieldPath, FieldValue, Order, Section, SubResource};
use super::range::{CollectionRangeGuard, CollectionRangeState};
use super::requirements::{Invitation, Requirements};
use super::snapshot::CleanDirty;
use super::store::{InsertionOrder, OrderStore, RequirementsProvider, ResourceSorter};
use super::validation::{ErrorBag, Origin, Target, ValidationOrchestrator};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Message key of the notice emitted when the store rejects a save
pub const SAVE_FAILED: &str = "order.errors.saveOrder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Ready,
    Validating,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A named event for the UI to surface, e.g. a toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub event: String,
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn toast(message: &str, severity: Severity) -> Self {
        Self {
            event: "toast".to_string(),
            message: message.to_string(),
            severity,
        }
    }
}

#[derive(Clone)]
pub struct Collaborators {
    pub orders: Arc<dyn OrderStore>,
    pub requirements: Arc<dyn RequirementsProvider>,
    pub sorter: Arc<dyn ResourceSorter>,
    /// Lists to load for the page and where they come from
    pub options: Option<(Arc<dyn OptionsProvider>, Vec<OptionList>)>,
}

impl Collaborators {
    pub fn new(orders: Arc<dyn OrderStore>, requirements: Arc<dyn RequirementsProvider>) -> Self {
        Self {
            orders,
            requirements,
            sorter: Arc::new(InsertionOrder),
            options: None,
        }
    }
    pub fn with_sorter(mut self, sorter: Arc<dyn ResourceSorter>) -> Self {
        self.sorter = sorter;
        self
    }
    pub fn with_options(mut self, options: Arc<dyn OptionsProvider>, lists: &[OptionList]) -> Self {
        self.options = Some((options, lists.to_vec()));
        self
    }
}

/// What a page needs to draw itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub order_clean: bool,
    pub errors: ErrorBag,
    pub range: Option<CollectionRangeState>,
    pub links: Option<StepLinks>,
}

fn find_requirements(
    provider: &dyn RequirementsProvider,
    invite_id: &str,
) -> SessionResult<Requirements> {
    provider
        .find_requirements(invite_id)?
        .ok_or_else(|| SessionError::RequirementsNotFound(invite_id.to_string()))
}

pub struct OrderSession {
    collaborators: Collaborators,
    config: SessionConfig,
    route: String,
    service: Option<ServiceRoute>, // None on fixed pages
    phase: SessionPhase,
    order: CleanDirty<Order>,
    invitation: Invitation,
    draft: Option<DraftEntry>,
    validation: ValidationOrchestrator,
    range: Option<CollectionRangeGuard>,
    navigation: NavigationPlanner,
    order_clean: bool,
    notices: Vec<Notice>,
    gate: MessageGate,
    dropdowns: Dropdowns,
}

impl OrderSession {
    /// Load an order for editing on the page at `route`. A missing order,
    /// invitation or requirements aborts the session.
    pub fn load(
        collaborators: Collaborators,
        config: SessionConfig,
        order_id: &str,
        route: &str,
    ) -> SessionResult<Self> {
        debug!(order_id, route, "loading order session");

        let mut order = collaborators
            .orders
            .find(order_id)?
            .ok_or_else(|| SessionError::OrderNotFound(order_id.to_string()))?;
        collaborators.sorter.sort(&mut order);

        let invite_id = order.invite_id().to_string();
        let invitation = collaborators
            .requirements
            .find_invitation(&invite_id)?
            .ok_or_else(|| SessionError::InvitationNotFound(invite_id.clone()))?;
        let requirements = find_requirements(collaborators.requirements.as_ref(), &invite_id)?;

        let service = config.service_for_route(route).cloned();

        let range = service.as_ref().map(|s| {
            let mut guard =
                CollectionRangeGuard::new(&s.key, s.range_type, order.confirmed_gaps(&s.key));
            guard.refresh(&requirements, order.entry_count(&s.key));
            guard
        });

        let draft = match &service {
            Some(s) if order.section(&s.key).is_none_or(Section::is_collection) => {
                Some(DraftEntry::new(&s.key, &s.id_prefix)?)
            }
            _ => None,
        };

        let mut validation = ValidationOrchestrator::new(&config.draft_prefix);
        validation.validate_full(&order, &requirements);
        let navigation = NavigationPlanner::assemble(&order, &config, validation.record_errors());

        let mut session = Self {
            collaborators,
            config,
            route: route.to_string(),
            service,
            phase: SessionPhase::Loading,
            order: CleanDirty::new(order),
            invitation,
            draft,
            validation,
            range,
            navigation,
            order_clean: true,
            notices: vec![],
            gate: MessageGate::new(),
            dropdowns: Dropdowns::default(),
        };

        if let Some((provider, lists)) = &session.collaborators.options {
            session.dropdowns = Dropdowns::load(provider.as_ref(), lists)?;
        }

        session.phase = SessionPhase::Ready;
        info!(
            order_id,
            route,
            pages = session.navigation.pages().len(),
            "order session ready"
        );
        Ok(session)
    }

    /// Last persisted state of the order
    pub fn order(&self) -> &Order {
        self.order.clean()
    }
    /// Working copy the page edits
    pub fn dirty(&self) -> &Order {
        self.order.dirty()
    }
    pub fn is_clean(&self) -> bool {
        self.order_clean
    }
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }
    /// A handle on the session's in-flight flag
    pub fn gate(&self) -> MessageGate {
        self.gate.clone()
    }
    pub fn route(&self) -> &str {
        &self.route
    }
    pub fn service(&self) -> Option<&ServiceRoute> {
        self.service.as_ref()
    }
    pub fn invitation(&self) -> &Invitation {
        &self.invitation
    }
    pub fn range_state(&self) -> Option<&CollectionRangeState> {
        self.range.as_ref().map(CollectionRangeGuard::state)
    }
    pub fn new_entry(&self) -> Option<&SubResource> {
        self.draft.as_ref().map(DraftEntry::entry)
    }
    pub fn navigation(&self) -> &NavigationPlanner {
        &self.navigation
    }
    pub fn links(&self) -> Option<StepLinks> {
        self.navigation
            .links(&self.config, self.order.clean().order_id(), &self.route)
    }
    pub fn dropdowns(&self) -> &Dropdowns {
        &self.dropdowns
    }
    /// Standing errors as last computed, draft errors included
    pub fn errors(&self) -> ErrorBag {
        self.validation.errors()
    }
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn requirements(&self) -> SessionResult<Requirements> {
        find_requirements(
            self.collaborators.requirements.as_ref(),
            self.order.clean().invite_id(),
        )
    }

    fn begin(&self) -> SessionResult<InFlight> {
        self.gate.try_begin().ok_or(SessionError::Busy)
    }

    fn no_draft(&self) -> SessionError {
        let section = self
            .service
            .as_ref()
            .map_or_else(|| self.route.clone(), |s| s.key.clone());
        SessionError::NotACollection(section)
    }

    // any unsaved change, in the record or in the new-entry form
    fn recompute_clean(&mut self) {
        self.order_clean =
            self.order.is_clean() && self.draft.as_ref().is_none_or(DraftEntry::is_clean);
    }

    fn refresh_range(&mut self) {
        let Some(guard) = self.range.as_mut() else {
            return;
        };
        let count = self.order.clean().entry_count(guard.section());
        match find_requirements(
            self.collaborators.requirements.as_ref(),
            self.order.clean().invite_id(),
        ) {
            Ok(requirements) => guard.refresh(&requirements, count),
            Err(err) => warn!(error = %err, "collection range not refreshed"),
        }
    }

    /// Write a value into the working copy, e.g. `education.0.startDate`,
    /// and validate the fields it touches
    pub fn mutate(&mut self, path: &str, value: impl Into<FieldValue>) -> SessionResult<()> {
        let parsed = FieldPath::parse(path)?;
        self.order.dirty_mut().set_field(&parsed, value.into())?;
        self.recompute_clean();
        debug!(path, clean = self.order_clean, "field updated");

        let requirements = self.requirements()?;
        self.validation.validate_edit(
            Origin::Record,
            Target::Record(self.order.dirty()),
            &requirements,
            path,
        );
        Ok(())
    }

    /// Arbitrary edits to the working copy
    pub fn edit_dirty(&mut self, f: impl FnOnce(&mut Order)) {
        f(self.order.dirty_mut());
        self.recompute_clean();
    }

    /// Validate the working copy and collect everything the page shows.
    /// The full pass is skipped when neither the record nor the
    /// requirements changed since the last one.
    pub fn render(&mut self) -> SessionResult<SessionView> {
        let requirements = self.requirements()?;

        self.phase = SessionPhase::Validating;
        self.validation
            .validate_full_if_changed(self.order.dirty(), &requirements);
        self.phase = SessionPhase::Ready;

        Ok(SessionView {
            order_clean: self.order_clean,
            errors: self.validation.errors(),
            range: self.range_state().cloned(),
            links: self.links(),
        })
    }

    // send the working copy to the store; the caller holds the gate
    fn persist(&mut self) -> bool {
        self.phase = SessionPhase::Saving;
        let order_id = self.order.clean().order_id().to_string();

        let saved = match self.collaborators.orders.update(self.order.dirty()) {
            Ok(()) => {
                self.collaborators.sorter.sort(self.order.dirty_mut());
                self.order.commit();
                self.refresh_range();
                // a saved page is clean even with typed input in the new-entry form
                self.order_clean = true;
                info!(order_id, "order saved");
                true
            }
            Err(err) => {
                warn!(order_id, error = %err, "order save failed");
                self.notices
                    .push(Notice::toast(SAVE_FAILED, Severity::Error));
                self.recompute_clean();
                false
            }
        };

        self.phase = SessionPhase::Ready;
        saved
    }

    /// Persist the working copy. `Ok(false)` when the store rejected it;
    /// the working copy is then kept as it was.
    pub fn save(&mut self) -> SessionResult<bool> {
        let _flight = self.begin()?;

        if self.order.is_clean() {
            debug!("order already clean, nothing to save");
            self.order_clean = true;
            return Ok(true);
        }

        Ok(self.persist())
    }

    /// Drop every unsaved change, including the new-entry form
    pub fn cancel(&mut self) -> SessionResult<bool> {
        let _flight = self.begin()?;

        self.reset_draft()?;
        self.order.revert();
        self.recompute_clean();

        debug!(clean = self.order_clean, "changes cancelled");
        Ok(true)
    }

    /// Remove an entry from the working copy and save. `Ok(false)` without
    /// touching anything when no entry has that id.
    pub fn delete_sub_resource(&mut self, section: &str, id: &str) -> SessionResult<bool> {
        let _flight = self.begin()?;

        if self.order.dirty_mut().remove_entry(section, id).is_none() {
            debug!(section, id, "entry to delete not found");
            return Ok(false);
        }

        Ok(self.persist())
    }

    /// Store the user's confirmation that gaps in the section's history are
    /// intended. The stored order is updated directly; when that fails the
    /// local flag goes back to its previous value.
    pub fn set_gaps_confirmed(&mut self, value: bool) -> SessionResult<bool> {
        let _flight = self.begin()?;

        let Some(guard) = self.range.as_mut() else {
            return Ok(false);
        };
        let section = guard.section().to_string();
        let order_id = self.order.clean().order_id().to_string();

        let mut stored = self
            .collaborators
            .orders
            .find(&order_id)?
            .ok_or_else(|| SessionError::OrderNotFound(order_id.clone()))?;

        let previous = guard.set_gaps_confirmed(value);
        stored.set_confirmed_gaps(&section, value);

        self.phase = SessionPhase::Saving;
        let result = self.collaborators.orders.update(&stored);
        self.phase = SessionPhase::Ready;

        match result {
            Ok(()) => {
                self.order
                    .apply_both(|o| o.set_confirmed_gaps(&section, value));
                info!(order_id, section, value, "gap confirmation saved");
                Ok(true)
            }
            Err(err) => {
                guard.rollback_gaps(previous);
                warn!(order_id, section, error = %err, "gap confirmation not saved");
                self.notices
                    .push(Notice::toast(SAVE_FAILED, Severity::Error));
                Ok(false)
            }
        }
    }

    fn reset_draft(&mut self) -> SessionResult<()> {
        if let Some(draft) = self.draft.as_mut() {
            draft.reset()?;
        }
        self.validation.clear_draft();
        Ok(())
    }

    /// Empty the new-entry form under a new id, dropping its errors
    pub fn reset_new_entry(&mut self) -> SessionResult<bool> {
        self.reset_draft()?;
        self.recompute_clean();
        Ok(true)
    }

    /// Edit a field of the new-entry form and validate it live
    pub fn mutate_new_entry(&mut self, field: &str, value: impl Into<FieldValue>) -> SessionResult<()> {
        let Some(draft) = self.draft.as_mut() else {
            return Err(self.no_draft());
        };
        draft.set_field(field, value.into());
        self.recompute_clean();

        let requirements = self.requirements()?;
        if let Some(draft) = &self.draft {
            self.validation.validate_edit(
                Origin::Draft,
                Target::Entry {
                    section: draft.section(),
                    entry: draft.entry(),
                },
                &requirements,
                field,
            );
        }
        Ok(())
    }

    /// Append the new entry to its section and save. On failure the working
    /// copy goes back to what it was and the form keeps its values.
    pub fn save_new_entry(&mut self) -> SessionResult<bool> {
        let _flight = self.begin()?;

        let Some(draft) = &self.draft else {
            return Err(self.no_draft());
        };
        let section = draft.section().to_string();
        let entry = draft.entry().clone();
        let id = entry.id().to_string();

        // the push may also create the section
        let before = self.order.dirty().clone();
        self.order.dirty_mut().push_entry(&section, entry)?;

        if self.persist() {
            self.reset_draft()?;
            self.recompute_clean();
            debug!(section, id, "new entry saved");
            Ok(true)
        } else {
            *self.order.dirty_mut() = before;
            self.recompute_clean();
            debug!(section, id, "new entry taken back after failed save");
            Ok(false)
        }
    }

    /// Link for a previous/next click. `None` on fixed pages.
    pub fn navigate(&self, direction: Direction) -> SessionResult<Option<NavLink>> {
        if self.gate.is_sending() {
            return Err(SessionError::Busy);
        }

        Ok(self.links().map(|links| match direction {
            Direction::Previous => links.previous,
            Direction::Next => links.next,
        }))
    }
}
