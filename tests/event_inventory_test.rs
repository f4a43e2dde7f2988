//! Event visibility, registrations and personal inventory against Postgres

mod helpers;

use assert_matches::assert_matches;
use serial_test::serial;

use camphub::models::{
    BulkInventoryUpdate, EventStatus, InventoryItemRequest, InventoryItemUpdate, QuickAddItem,
    RegisterForEventRequest, UserRole,
};
use camphub::services::{AdminService, EventService, InventoryService};
use camphub::CampHubError;

use helpers::*;

#[tokio::test]
#[serial]
async fn test_pending_events_are_hidden_from_members() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let db = test_db.service();
    let events = EventService::new(db.clone());

    let organizer = create_actor(&db, "organizer@example.com", UserRole::EventManager).await;
    let member = create_actor(&db, "member@example.com", UserRole::Member).await;
    let admin = create_actor(&db, "admin@example.com", UserRole::SiteAdmin).await;

    assert_matches!(
        events.create(&member, event_request("Not allowed")).await,
        Err(CampHubError::PermissionDenied(_))
    );

    let event = events.create(&organizer, event_request("Quiet Weekend")).await.unwrap();
    assert!(events.list(Some(&member)).await.unwrap().is_empty());
    assert!(events.list(None).await.unwrap().is_empty());
    assert_eq!(events.list(Some(&organizer)).await.unwrap().len(), 1);
    assert!(events.get(Some(&member), event.id).await.is_err());

    events.approve(&admin, event.id).await.unwrap();
    assert_eq!(events.list(Some(&member)).await.unwrap().len(), 1);

    let cancelled = events.cancel(&organizer, event.id).await.unwrap();
    assert_eq!(cancelled.status, EventStatus::Cancelled);
    assert_matches!(
        events.cancel(&organizer, event.id).await,
        Err(CampHubError::InvalidStateTransition { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_registration_respects_event_options() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let db = test_db.service();
    let events = EventService::new(db.clone());

    let organizer = create_actor(&db, "organizer@example.com", UserRole::EventManager).await;
    let admin = create_actor(&db, "admin@example.com", UserRole::SiteAdmin).await;
    let attendee = create_actor(&db, "attendee@example.com", UserRole::Member).await;

    let mut request = event_request("Build Week");
    request.has_early_arrival = true;
    request.early_arrival_days = Some(3);
    let event = events.create(&organizer, request).await.unwrap();

    let signup = RegisterForEventRequest {
        has_ticket: true,
        opted_early_arrival: true,
        opted_late_departure: false,
        opted_vehicle_access: false,
    };
    assert_matches!(
        events.register(&attendee, event.id, signup.clone()).await,
        Err(CampHubError::InvalidInput(_))
    );

    events.approve(&admin, event.id).await.unwrap();
    assert_matches!(
        events
            .register(
                &attendee,
                event.id,
                RegisterForEventRequest {
                    opted_vehicle_access: true,
                    ..signup.clone()
                },
            )
            .await,
        Err(CampHubError::InvalidInput(_))
    );

    let registration = events.register(&attendee, event.id, signup.clone()).await.unwrap();
    assert!(registration.opted_early_arrival);
    assert_matches!(
        events.register(&attendee, event.id, signup).await,
        Err(CampHubError::Conflict(_))
    );

    assert_eq!(events.registrations(&organizer, event.id).await.unwrap().len(), 1);
    assert_matches!(
        events.registrations(&attendee, event.id).await,
        Err(CampHubError::PermissionDenied(_))
    );

    events.cancel_registration(&attendee, event.id).await.unwrap();
    assert_matches!(
        events.cancel_registration(&attendee, event.id).await,
        Err(CampHubError::RegistrationNotFound { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_inventory_is_private_and_bulk_updates_skip_bad_entries() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let db = test_db.service();
    let inventory = InventoryService::new(db.clone());

    let owner = create_actor(&db, "owner@example.com", UserRole::Member).await;
    let other = create_actor(&db, "other@example.com", UserRole::Member).await;

    let tent = inventory.create(&owner, InventoryItemRequest::new("Tent", 1)).await.unwrap();
    let chairs = inventory.quick_add(&owner, QuickAddItem::Chairs).await.unwrap();
    assert_eq!(chairs.quantity, 1);
    assert!(!chairs.is_shared_gear);

    assert_matches!(
        inventory.get(&other, tent.id).await,
        Err(CampHubError::PermissionDenied(_))
    );
    assert_matches!(
        inventory.create(&owner, InventoryItemRequest::new("Broken", -1)).await,
        Err(CampHubError::InvalidInput(_))
    );

    let outcome = inventory
        .bulk_update(
            &owner,
            BulkInventoryUpdate {
                new_item: Some(InventoryItemRequest::new("   ", 2)),
                updates: vec![
                    InventoryItemUpdate {
                        id: tent.id,
                        quantity: Some(2),
                        is_shared_gear: Some(true),
                    },
                    InventoryItemUpdate {
                        id: chairs.id,
                        quantity: Some(1),
                        is_shared_gear: None,
                    },
                    InventoryItemUpdate {
                        id: chairs.id,
                        quantity: Some(-4),
                        is_shared_gear: None,
                    },
                ],
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.creates_count, 0);
    assert_eq!(outcome.updates_count, 1);

    let tent = inventory.get(&owner, tent.id).await.unwrap();
    assert_eq!(tent.quantity, 2);
    assert!(tent.is_shared_gear);

    let foreign = inventory
        .bulk_update(
            &other,
            BulkInventoryUpdate {
                new_item: None,
                updates: vec![InventoryItemUpdate {
                    id: tent.id,
                    quantity: Some(9),
                    is_shared_gear: None,
                }],
            },
        )
        .await
        .unwrap();
    assert_eq!(foreign.updates_count, 0);

    inventory.delete(&owner, chairs.id).await.unwrap();
    assert_eq!(inventory.list(&owner).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_creators_cancel_and_admins_override_event_status() {
    let Some(test_db) = TestDatabase::new().await else { return };
    let db = test_db.service();
    let events = EventService::new(db.clone());
    let admin_service = AdminService::new(db.clone(), Default::default());

    let organizer = create_actor(&db, "organizer@example.com", UserRole::EventManager).await;
    let other_organizer = create_actor(&db, "other@example.com", UserRole::EventManager).await;
    let admin = create_actor(&db, "admin@example.com", UserRole::SiteAdmin).await;

    let event = events.create(&organizer, event_request("Burn Night")).await.unwrap();

    // Only approved events can be cancelled, and only by their creator or an admin
    assert_matches!(
        events.cancel(&organizer, event.id).await,
        Err(CampHubError::InvalidStateTransition { .. })
    );
    events.approve(&admin, event.id).await.unwrap();
    assert_matches!(
        events.cancel(&other_organizer, event.id).await,
        Err(CampHubError::PermissionDenied(_))
    );
    let cancelled = events.cancel(&organizer, event.id).await.unwrap();
    assert_eq!(cancelled.status, EventStatus::Cancelled);
    assert_eq!(db.events.get(event.id).await.unwrap().status, EventStatus::Cancelled);

    assert_matches!(
        admin_service
            .override_event_status(&organizer, event.id, EventStatus::Approved, None)
            .await,
        Err(CampHubError::PermissionDenied(_))
    );

    // Overrides skip the state machine in either direction
    let revived = admin_service
        .override_event_status(&admin, event.id, EventStatus::Pending, Some("  re-review  "))
        .await
        .unwrap();
    assert_eq!(revived.status, EventStatus::Pending);

    let rejected = admin_service
        .override_event_status(&admin, event.id, EventStatus::Rejected, None)
        .await
        .unwrap();
    assert_eq!(rejected.status, EventStatus::Rejected);

    let same = admin_service
        .override_event_status(&admin, event.id, EventStatus::Rejected, Some(""))
        .await
        .unwrap();
    assert_eq!(same.status, EventStatus::Rejected);
    assert_eq!(db.events.get(event.id).await.unwrap().status, EventStatus::Rejected);
}
