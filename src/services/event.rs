//! Event service implementation
//!
//! Event creation and moderation, the camp requests an event receives, and
//! attendee registrations.

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::{
    AssociationStatus, CampEventAssociation, Event, EventCampRequests, EventRegistration, EventRequest,
    RegisterForEventRequest,
};
use crate::utils::errors::{CampHubError, Result};
use crate::utils::logging::{log_user_action, log_workflow_transition};
use crate::utils::validation::validate_event_request;
use crate::workflow::permissions::{
    can_view_event, ensure_can_cancel_event, ensure_can_create_event, ensure_can_decide_associations,
    ensure_can_edit_event, ensure_can_moderate_events, event_visibility,
};
use crate::workflow::transitions::event_transition;
use crate::workflow::{Actor, EventAction};

#[derive(Clone, Debug)]
pub struct EventService {
    db: DatabaseService,
}

impl EventService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Events the viewer may see; `None` is an anonymous visitor
    pub async fn list(&self, actor: Option<&Actor>) -> Result<Vec<Event>> {
        let visibility = event_visibility(actor.filter(|a| a.is_active));
        self.db.events.list_visible(visibility).await
    }

    pub async fn get(&self, actor: Option<&Actor>, event_id: i64) -> Result<Event> {
        let event = self.db.events.get(event_id).await?;
        if !can_view_event(actor.filter(|a| a.is_active), &event) {
            return Err(CampHubError::PermissionDenied(
                "This event is not available".to_string(),
            ));
        }
        Ok(event)
    }

    /// New events wait for a site admin
    pub async fn create(&self, actor: &Actor, request: EventRequest) -> Result<Event> {
        ensure_can_create_event(actor)?;
        validate_event_request(&request)?;

        let event = self.db.events.create(actor.user_id, &request).await?;
        info!(event_id = event.id, creator_id = actor.user_id, title = %event.title, "Event created");
        Ok(event)
    }

    /// Editing never changes the status
    pub async fn update(&self, actor: &Actor, event_id: i64, request: EventRequest) -> Result<Event> {
        let event = self.db.events.get(event_id).await?;
        ensure_can_edit_event(actor, &event)?;
        validate_event_request(&request)?;

        let updated = self.db.events.update(event_id, &request).await?;
        log_user_action(actor.user_id, "update_event", Some(&event_id.to_string()));
        Ok(updated)
    }

    async fn apply(&self, actor: &Actor, event: Event, action: EventAction) -> Result<Event> {
        let to = event_transition(event.status, action)?;
        let updated = self
            .db
            .events
            .transition(event.id, event.status, to)
            .await?
            .ok_or_else(|| CampHubError::InvalidStateTransition {
                from: event.status.to_string(),
                to: to.to_string(),
            })?;
        log_workflow_transition("event", event.id, event.status.as_str(), to.as_str(), actor.user_id);
        Ok(updated)
    }

    pub async fn approve(&self, actor: &Actor, event_id: i64) -> Result<Event> {
        ensure_can_moderate_events(actor)?;
        let event = self.db.events.get(event_id).await?;
        self.apply(actor, event, EventAction::Approve).await
    }

    pub async fn reject(&self, actor: &Actor, event_id: i64) -> Result<Event> {
        ensure_can_moderate_events(actor)?;
        let event = self.db.events.get(event_id).await?;
        self.apply(actor, event, EventAction::Reject).await
    }

    pub async fn cancel(&self, actor: &Actor, event_id: i64) -> Result<Event> {
        let event = self.db.events.get(event_id).await?;
        ensure_can_cancel_event(actor, &event)?;
        self.apply(actor, event, EventAction::Cancel).await
    }

    /// Camp requests for one event, split by status
    pub async fn camp_requests(&self, actor: &Actor, event_id: i64) -> Result<EventCampRequests> {
        let event = self.db.events.get(event_id).await?;
        ensure_can_decide_associations(actor, &event)?;

        let mut grouped = EventCampRequests::default();
        for association in self.db.associations.list_for_event(event_id).await? {
            match association.status {
                AssociationStatus::Pending => grouped.pending.push(association),
                AssociationStatus::Approved => grouped.approved.push(association),
                AssociationStatus::Rejected => grouped.rejected.push(association),
            }
        }
        Ok(grouped)
    }

    /// Pending camp requests across every event the actor created
    pub async fn pending_camp_requests(&self, actor: &Actor) -> Result<Vec<CampEventAssociation>> {
        actor.ensure_active()?;
        self.db.associations.pending_for_event_creator(actor.user_id).await
    }

    pub async fn list_own(&self, actor: &Actor) -> Result<Vec<Event>> {
        actor.ensure_active()?;
        self.db.events.list_by_creator(actor.user_id).await
    }

    /// Sign up for an approved event. Opt-ins must match what the event offers.
    pub async fn register(
        &self,
        actor: &Actor,
        event_id: i64,
        request: RegisterForEventRequest,
    ) -> Result<EventRegistration> {
        actor.ensure_active()?;
        let event = self.db.events.get(event_id).await?;
        if !event.is_approved() {
            return Err(CampHubError::InvalidInput(
                "You can only register for approved events".to_string(),
            ));
        }

        let unavailable = [
            (request.opted_early_arrival, event.has_early_arrival, "Early arrival"),
            (request.opted_late_departure, event.has_late_departure, "Late departure"),
            (request.opted_vehicle_access, event.has_vehicle_access, "Vehicle access"),
        ]
        .into_iter()
        .find(|(opted, offered, _)| *opted && !*offered);
        if let Some((_, _, label)) = unavailable {
            return Err(CampHubError::InvalidInput(format!(
                "{} is not offered for this event",
                label
            )));
        }

        if self.db.registrations.find(event_id, actor.user_id).await?.is_some() {
            return Err(CampHubError::Conflict(
                "You are already registered for this event".to_string(),
            ));
        }

        let registration = self.db.registrations.create(event_id, actor.user_id, &request).await?;
        log_user_action(actor.user_id, "register_for_event", Some(&event_id.to_string()));
        Ok(registration)
    }

    pub async fn cancel_registration(&self, actor: &Actor, event_id: i64) -> Result<()> {
        actor.ensure_active()?;
        if !self.db.registrations.delete(event_id, actor.user_id).await? {
            return Err(CampHubError::RegistrationNotFound {
                event_id,
                user_id: actor.user_id,
            });
        }
        debug!(event_id = event_id, user_id = actor.user_id, "Registration cancelled");
        Ok(())
    }

    /// Attendee list, for the event creator and site admins
    pub async fn registrations(&self, actor: &Actor, event_id: i64) -> Result<Vec<EventRegistration>> {
        let event = self.db.events.get(event_id).await?;
        ensure_can_decide_associations(actor, &event)?;
        self.db.registrations.list_for_event(event_id).await
    }

    pub async fn my_registrations(&self, actor: &Actor) -> Result<Vec<EventRegistration>> {
        actor.ensure_active()?;
        self.db.registrations.list_for_user(actor.user_id).await
    }
}
