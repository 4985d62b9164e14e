use std::{
    collections::HashSet,
    hash::Hash,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError, Weak,
    },
};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use shared::{
    content::{FooterLink, FooterLinkDraft, FooterSection, NavbarItem, NavbarItemDraft},
    domain::{FooterLinkId, NavbarItemId},
    protocol::{CommandAck, DeleteCommand, WithId},
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    entity::{Endpoint, ListEntity, Section},
    error::{ClientError, ValidationError},
    notices::Notices,
    transport::ApiClient,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
struct Tickets {
    issued: u64,
    applied: u64,
}

impl Tickets {
    fn issue(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    fn claim(&mut self, ticket: LoadTicket) -> bool {
        if ticket.0 > self.applied {
            self.applied = ticket.0;
            true
        } else {
            false
        }
    }

    // Local mutations outrank every load issued before them.
    fn supersede(&mut self) {
        let ticket = self.issue();
        self.applied = ticket.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    Clear,
    Keep,
}

#[async_trait]
pub trait Reconcile: Send + Sync {
    async fn reconcile(&self);
}

#[async_trait]
pub trait DraftCheck<E: ListEntity>: Send + Sync {
    async fn check(
        &self,
        draft: &E::Draft,
        target: Option<E::Id>,
        current: &[E],
    ) -> Result<(), ValidationError>;
}

#[derive(Debug)]
struct InFlight<I> {
    creating: bool,
    ids: HashSet<I>,
}

impl<I> Default for InFlight<I> {
    fn default() -> Self {
        Self {
            creating: false,
            ids: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Claim<I> {
    Create,
    Record(I),
}

struct InFlightGuard<'a, I: Eq + Hash + Copy> {
    slot: &'a Mutex<InFlight<I>>,
    claim: Claim<I>,
}

impl<'a, I: Eq + Hash + Copy> InFlightGuard<'a, I> {
    fn acquire(
        slot: &'a Mutex<InFlight<I>>,
        claim: Claim<I>,
        entity: &'static str,
        operation: &'static str,
    ) -> Result<Self, ClientError> {
        let mut in_flight = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let free = match claim {
            Claim::Create => !std::mem::replace(&mut in_flight.creating, true),
            Claim::Record(id) => in_flight.ids.insert(id),
        };
        if !free {
            return Err(ClientError::Busy { entity, operation });
        }
        Ok(Self { slot, claim })
    }
}

impl<I: Eq + Hash + Copy> Drop for InFlightGuard<'_, I> {
    fn drop(&mut self) {
        let mut in_flight = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match self.claim {
            Claim::Create => in_flight.creating = false,
            Claim::Record(id) => {
                in_flight.ids.remove(&id);
            }
        }
    }
}

struct ListState<E> {
    items: Vec<E>,
    tickets: Tickets,
}

pub struct ListFlow<E: ListEntity> {
    api: Arc<ApiClient>,
    notices: Arc<Notices>,
    state: RwLock<ListState<E>>,
    in_flight: Mutex<InFlight<E::Id>>,
    checks: Vec<Arc<dyn DraftCheck<E>>>,
    dependents: std::sync::RwLock<Vec<Weak<dyn Reconcile>>>,
}

impl<E: ListEntity> ListFlow<E> {
    pub fn new(api: Arc<ApiClient>, notices: Arc<Notices>) -> Self {
        Self {
            api,
            notices,
            state: RwLock::new(ListState {
                items: Vec::new(),
                tickets: Tickets::default(),
            }),
            in_flight: Mutex::new(InFlight::default()),
            checks: Vec::new(),
            dependents: std::sync::RwLock::new(Vec::new()),
        }
    }

    pub fn with_check(mut self, check: Arc<dyn DraftCheck<E>>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn add_dependent(&self, dependent: Weak<dyn Reconcile>) {
        self.dependents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(dependent);
    }

    pub async fn items(&self) -> Vec<E> {
        let mut items = self.state.read().await.items.clone();
        if items.iter().any(|item| item.display_order().is_some()) {
            items.sort_by_key(|item| item.display_order().unwrap_or_default());
        }
        items
    }

    pub async fn get(&self, id: E::Id) -> Option<E> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.items.is_empty()
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        self.fetch(Fallback::Clear).await
    }

    pub async fn refresh(&self) -> Result<(), ClientError> {
        self.fetch(Fallback::Keep).await
    }

    async fn fetch(&self, fallback: Fallback) -> Result<(), ClientError> {
        let ticket = self.begin_load().await;
        match self.api.get::<E::Listing>(E::ENDPOINT.list_path()).await {
            Ok(listing) => self.install_listing(ticket, listing, fallback).await,
            Err(err) => {
                self.install_failure(ticket, &err, fallback).await;
                Err(err)
            }
        }
    }

    pub async fn begin_load(&self) -> LoadTicket {
        self.state.write().await.tickets.issue()
    }

    pub async fn apply_listing(
        &self,
        ticket: LoadTicket,
        listing: E::Listing,
    ) -> Result<(), ClientError> {
        self.install_listing(ticket, listing, Fallback::Clear).await
    }

    pub async fn apply_failure(&self, ticket: LoadTicket, err: &ClientError) {
        self.install_failure(ticket, err, Fallback::Clear).await;
    }

    async fn install_listing(
        &self,
        ticket: LoadTicket,
        listing: E::Listing,
        fallback: Fallback,
    ) -> Result<(), ClientError> {
        let items = match E::unpack(listing) {
            Ok(items) => items,
            Err(err) => {
                self.install_failure(ticket, &err, fallback).await;
                return Err(err);
            }
        };

        let mut state = self.state.write().await;
        if state.tickets.claim(ticket) {
            debug!(entity = E::LABEL, count = items.len(), "installed listing");
            state.items = items;
        } else {
            debug!(entity = E::LABEL, ?ticket, "discarded stale listing");
        }
        Ok(())
    }

    async fn install_failure(&self, ticket: LoadTicket, err: &ClientError, fallback: Fallback) {
        warn!(entity = E::LABEL, error = %err, "failed to load listing");
        let mut state = self.state.write().await;
        if state.tickets.claim(ticket) && fallback == Fallback::Clear {
            state.items.clear();
        }
    }

    pub async fn restore(&self, items: Vec<E>) {
        let mut state = self.state.write().await;
        state.tickets.supersede();
        state.items = items;
    }

    pub async fn reset(&self) {
        self.restore(Vec::new()).await;
    }

    pub async fn create(&self, draft: E::Draft) -> Result<E::Id, ClientError> {
        let draft = self.prepare(draft, None).await?;
        let _guard = InFlightGuard::acquire(&self.in_flight, Claim::Create, E::LABEL, "create")?;

        let outcome = match E::ENDPOINT {
            Endpoint::Resource { collection } => {
                match self.api.post::<_, E>(collection, &draft).await {
                    Ok(record) => {
                        let id = record.id();
                        let mut state = self.state.write().await;
                        state.tickets.supersede();
                        state.items.push(record);
                        Ok(id)
                    }
                    Err(err) => Err(err),
                }
            }
            Endpoint::Command { save, ack_key, .. } => {
                let known = self.ids().await;
                match self.command(save, &draft).await {
                    Ok(ack) => {
                        self.reconcile_after_command().await;
                        match ack.record_id::<E::Id>(ack_key) {
                            Some(id) => Ok(id),
                            None => self.created_since(&known).await.ok_or_else(|| {
                                ClientError::Refused(format!(
                                    "{} was saved but its id could not be determined",
                                    E::LABEL
                                ))
                            }),
                        }
                    }
                    Err(err) => Err(err),
                }
            }
        };

        match outcome {
            Ok(id) => {
                info!(entity = E::LABEL, %id, "created");
                self.notices
                    .success(format!("{} created", capitalized(E::LABEL)))
                    .await;
                Ok(id)
            }
            Err(err) => {
                self.report_failure("create", &err).await;
                Err(err)
            }
        }
    }

    pub async fn update(&self, id: E::Id, draft: E::Draft) -> Result<(), ClientError> {
        let draft = self.prepare(draft, Some(id)).await?;
        let _guard =
            InFlightGuard::acquire(&self.in_flight, Claim::Record(id), E::LABEL, "update")?;

        let outcome = match E::ENDPOINT {
            Endpoint::Resource { collection } => {
                let path = format!("{collection}{id}/");
                match self.api.put::<_, E>(&path, &draft).await {
                    Ok(record) => {
                        let mut state = self.state.write().await;
                        state.tickets.supersede();
                        match state.items.iter_mut().find(|item| item.id() == id) {
                            Some(slot) => *slot = record,
                            None => state.items.push(record),
                        }
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
            Endpoint::Command { save, .. } => {
                let body = WithId { id, draft: &draft };
                match self.command(save, &body).await {
                    Ok(_) => {
                        self.reconcile_after_command().await;
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
        };

        match outcome {
            Ok(()) => {
                info!(entity = E::LABEL, %id, "updated");
                self.notify_dependents().await;
                self.notices
                    .success(format!("{} updated", capitalized(E::LABEL)))
                    .await;
                Ok(())
            }
            Err(err) => {
                self.report_failure("update", &err).await;
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: E::Id) -> Result<(), ClientError> {
        let _guard =
            InFlightGuard::acquire(&self.in_flight, Claim::Record(id), E::LABEL, "delete")?;

        let outcome = match E::ENDPOINT {
            Endpoint::Resource { collection } => {
                let path = format!("{collection}{id}/");
                match self.api.delete(&path).await {
                    Ok(()) => {
                        let mut state = self.state.write().await;
                        state.tickets.supersede();
                        state.items.retain(|item| item.id() != id);
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
            Endpoint::Command { delete, .. } => {
                match self.command(delete, &DeleteCommand { id }).await {
                    Ok(_) => {
                        self.reconcile_after_command().await;
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
        };

        match outcome {
            Ok(()) => {
                info!(entity = E::LABEL, %id, "deleted");
                self.notify_dependents().await;
                self.notices
                    .success(format!("{} deleted", capitalized(E::LABEL)))
                    .await;
                Ok(())
            }
            Err(err) => {
                self.report_failure("delete", &err).await;
                Err(err)
            }
        }
    }

    async fn prepare(
        &self,
        draft: E::Draft,
        target: Option<E::Id>,
    ) -> Result<E::Draft, ClientError> {
        E::validate(&draft)?;
        if !self.checks.is_empty() {
            let current = self.state.read().await.items.clone();
            for check in &self.checks {
                check.check(&draft, target, &current).await?;
            }
        }
        Ok(E::sanitize(draft))
    }

    async fn command<B>(&self, path: &str, body: &B) -> Result<CommandAck, ClientError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let ack: CommandAck = self.api.post(path, body).await?;
        if ack.success {
            Ok(ack)
        } else {
            Err(ClientError::Refused(ack.error.or(ack.message).unwrap_or_else(
                || format!("the server did not accept the {} change", E::LABEL),
            )))
        }
    }

    async fn ids(&self) -> HashSet<E::Id> {
        self.state.read().await.items.iter().map(E::id).collect()
    }

    async fn created_since(&self, known: &HashSet<E::Id>) -> Option<E::Id> {
        let mut fresh = self
            .state
            .read()
            .await
            .items
            .iter()
            .map(E::id)
            .filter(|id| !known.contains(id))
            .collect::<Vec<_>>();
        if fresh.len() == 1 {
            fresh.pop()
        } else {
            warn!(
                entity = E::LABEL,
                candidates = fresh.len(),
                "saved record has no id in the acknowledgement"
            );
            None
        }
    }

    async fn reconcile_after_command(&self) {
        if let Err(err) = self.refresh().await {
            warn!(entity = E::LABEL, error = %err, "reconcile after command failed");
        }
    }

    async fn notify_dependents(&self) {
        let dependents: Vec<Arc<dyn Reconcile>> = {
            let mut registered = self
                .dependents
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            registered.retain(|weak| weak.strong_count() > 0);
            registered.iter().filter_map(Weak::upgrade).collect()
        };
        for dependent in dependents {
            dependent.reconcile().await;
        }
    }

    async fn report_failure(&self, action: &str, err: &ClientError) {
        warn!(entity = E::LABEL, action, error = %err, "content mutation failed");
        self.notices
            .error(failure_message(action, E::LABEL, err))
            .await;
    }
}

#[async_trait]
impl<E: ListEntity> Reconcile for ListFlow<E> {
    async fn reconcile(&self) {
        if let Err(err) = self.refresh().await {
            debug!(entity = E::LABEL, error = %err, "dependent refresh failed");
        }
    }
}

struct SectionState<S> {
    committed: S,
    draft: Option<S>,
    tickets: Tickets,
}

pub struct SectionFlow<S: Section> {
    api: Arc<ApiClient>,
    notices: Arc<Notices>,
    state: RwLock<SectionState<S>>,
    saving: AtomicBool,
}

struct SavingGuard<'a>(&'a AtomicBool);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: Section> SectionFlow<S> {
    pub fn new(api: Arc<ApiClient>, notices: Arc<Notices>) -> Self {
        Self {
            api,
            notices,
            state: RwLock::new(SectionState {
                committed: S::default(),
                draft: None,
                tickets: Tickets::default(),
            }),
            saving: AtomicBool::new(false),
        }
    }

    pub async fn current(&self) -> S {
        self.state.read().await.committed.clone()
    }

    pub async fn draft(&self) -> S {
        let state = self.state.read().await;
        state
            .draft
            .clone()
            .unwrap_or_else(|| state.committed.clone())
    }

    pub async fn has_unsaved_draft(&self) -> bool {
        self.state.read().await.draft.is_some()
    }

    pub async fn discard_draft(&self) {
        self.state.write().await.draft = None;
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        let ticket = self.state.write().await.tickets.issue();
        match self.api.get::<S>(S::PATH).await {
            Ok(section) => {
                let mut state = self.state.write().await;
                if state.tickets.claim(ticket) {
                    debug!(
                        section = S::LABEL,
                        configured = section.is_configured(),
                        "installed section"
                    );
                    state.committed = section;
                } else {
                    debug!(section = S::LABEL, ?ticket, "discarded stale section");
                }
                Ok(())
            }
            Err(err) => {
                warn!(section = S::LABEL, error = %err, "failed to load section");
                Err(err)
            }
        }
    }

    pub async fn save(&self, fields: S) -> Result<S, ClientError> {
        if self.saving.swap(true, Ordering::AcqRel) {
            return Err(ClientError::Busy {
                entity: S::LABEL,
                operation: "save",
            });
        }
        let _guard = SavingGuard(&self.saving);

        let body = fields.clone().sanitize();
        match self.api.put::<_, S>(S::PATH, &body).await {
            Ok(saved) => {
                {
                    let mut state = self.state.write().await;
                    state.tickets.supersede();
                    state.committed = saved.clone();
                    state.draft = None;
                }
                info!(section = S::LABEL, "saved");
                self.notices
                    .success(format!("{} saved", capitalized(S::LABEL)))
                    .await;
                Ok(saved)
            }
            Err(err) => {
                warn!(section = S::LABEL, error = %err, "failed to save section");
                self.state.write().await.draft = Some(fields);
                self.notices
                    .error(failure_message("save", S::LABEL, &err))
                    .await;
                Err(err)
            }
        }
    }

    pub async fn save_changes(&self, changes: Value) -> Result<S, ClientError> {
        let Value::Object(changes) = changes else {
            return Err(ValidationError::InvalidFields {
                entity: S::LABEL,
                detail: "expected a JSON object".to_string(),
            }
            .into());
        };
        let mut merged = serde_json::to_value(self.current().await).map_err(|err| {
            ValidationError::InvalidFields {
                entity: S::LABEL,
                detail: err.to_string(),
            }
        })?;
        if let Value::Object(fields) = &mut merged {
            fields.extend(changes);
        }
        let fields: S = serde_json::from_value(merged).map_err(|err| {
            ValidationError::InvalidFields {
                entity: S::LABEL,
                detail: err.to_string(),
            }
        })?;
        self.save(fields).await
    }

    pub async fn restore(&self, section: S) {
        let mut state = self.state.write().await;
        state.tickets.supersede();
        state.committed = section;
        state.draft = None;
    }

    pub async fn reset(&self) {
        self.restore(S::default()).await;
    }
}

pub struct NavbarParentCheck;

#[async_trait]
impl DraftCheck<NavbarItem> for NavbarParentCheck {
    async fn check(
        &self,
        draft: &NavbarItemDraft,
        target: Option<NavbarItemId>,
        current: &[NavbarItem],
    ) -> Result<(), ValidationError> {
        let Some(parent) = draft.parent_id else {
            return Ok(());
        };
        if target == Some(parent) {
            return Err(ValidationError::SelfParent { id: parent.0 });
        }
        if !current.iter().any(|item| item.id == parent) {
            return Err(ValidationError::UnknownParent {
                parent_id: parent.0,
            });
        }
        Ok(())
    }
}

pub struct LinkableSectionCheck {
    sections: Arc<ListFlow<FooterSection>>,
}

impl LinkableSectionCheck {
    pub fn new(sections: Arc<ListFlow<FooterSection>>) -> Self {
        Self { sections }
    }
}

#[async_trait]
impl DraftCheck<FooterLink> for LinkableSectionCheck {
    async fn check(
        &self,
        draft: &FooterLinkDraft,
        _target: Option<FooterLinkId>,
        _current: &[FooterLink],
    ) -> Result<(), ValidationError> {
        let Some(section_id) = draft.section_id else {
            return Ok(());
        };
        match self.sections.get(section_id).await {
            None => Err(ValidationError::UnknownFooterSection {
                section_id: section_id.0,
            }),
            Some(section) if !section.column_type.carries_links() => {
                Err(ValidationError::SectionTakesNoLinks {
                    section_id: section_id.0,
                })
            }
            Some(_) => Ok(()),
        }
    }
}

pub(crate) fn failure_message(action: &str, label: &str, err: &ClientError) -> String {
    match err.server_detail() {
        Some(detail) if !detail.trim().is_empty() => {
            format!("Failed to {action} {label}: {detail}")
        }
        _ => format!("Failed to {action} {label}. Please try again."),
    }
}

pub(crate) fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "tests/flow_tests.rs"]
mod tests;
