use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use pitstop::entities::{
    Bid, BidStatus, Coordinates, LifecycleEventKind, Location, Rating, RequestStatus, Role,
    ServiceRequest, Transition, Urgency,
};
use pitstop::notify::Dispatcher;
use pitstop::realtime::{Event, Hub, Room};

fn new_request(customer_id: Uuid) -> ServiceRequest {
    ServiceRequest::new(
        customer_id,
        "225/45R17".into(),
        "2014 Accord".into(),
        "flat on the rear passenger side".into(),
        Location {
            address: "41 Spring St".into(),
            coordinates: Coordinates {
                latitude: 40.72,
                longitude: -74.0,
            },
        },
        100.0,
        Urgency::Urgent,
    )
}

#[test]
fn auction_selects_one_winner_and_expires_the_rest() {
    let customer_id = Uuid::new_v4();
    let mut request = new_request(customer_id);

    assert!(request.is_open_for_bids());

    let mut bid_a = Bid::new(
        request.id,
        Uuid::new_v4(),
        85.0,
        "30 minutes".into(),
        None,
    )
    .unwrap();

    let mut bid_b = Bid::new(
        request.id,
        Uuid::new_v4(),
        75.0,
        "25 minutes".into(),
        None,
    )
    .unwrap();
    bid_b.submitted_at = bid_a.submitted_at + Duration::seconds(20);

    // newest first, as the customer's list prepends on arrival
    let mut listed = vec![bid_a.clone(), bid_b.clone()];
    listed.sort_by(|x, y| y.submitted_at.cmp(&x.submitted_at));
    assert_eq!(listed[0].id, bid_b.id);

    // customer picks provider B
    request.accept_bid(bid_b.id, bid_b.provider_id).unwrap();
    bid_b.accept().unwrap();
    bid_a.expire();

    assert_eq!(request.status, RequestStatus::Accepted);
    assert_eq!(request.accepted_bid_id, Some(bid_b.id));
    assert_eq!(bid_b.status, BidStatus::Accepted);
    assert_eq!(bid_a.status, BidStatus::Expired);

    // a second acceptance for the same request is rejected outright
    assert!(request.accept_bid(bid_a.id, bid_a.provider_id).is_err());
}

#[test]
fn expired_auction_refuses_further_bidding() {
    let mut request = new_request(Uuid::new_v4());

    request.status = RequestStatus::BidsOpen {
        deadline: Utc::now() - Duration::seconds(1),
    };

    assert!(!request.is_open_for_bids());
    assert_eq!(request.expire(), Transition::Applied);
    assert_eq!(request.status.name(), "Time Expired");
    assert!(request.accept_bid(Uuid::new_v4(), Uuid::new_v4()).is_err());
}

#[test]
fn ordered_lifecycle_reaches_service_completed() {
    let mut request = new_request(Uuid::new_v4());
    request
        .accept_bid(Uuid::new_v4(), Uuid::new_v4())
        .unwrap();

    assert_eq!(
        request.apply(LifecycleEventKind::Arrived, Utc::now()),
        Transition::Applied
    );
    assert_eq!(
        request.apply(LifecycleEventKind::JobCompleted, Utc::now()),
        Transition::Applied
    );
    assert_eq!(
        request.apply(LifecycleEventKind::JobConfirmed, Utc::now()),
        Transition::Applied
    );

    // the label the backend persists as tire_status
    assert_eq!(request.status.name(), "Service Completed");

    request.record_payment().unwrap();
    request
        .record_rating(Rating {
            stars: 5,
            comment: Some("quick and tidy".into()),
        })
        .unwrap();
    assert_eq!(request.status, RequestStatus::Rated);
}

#[test]
fn lifecycle_reports_are_refused_from_the_wrong_party() {
    let customer_id = Uuid::new_v4();
    let provider_id = Uuid::new_v4();

    let mut request = new_request(customer_id);
    request.accept_bid(Uuid::new_v4(), provider_id).unwrap();

    // the customer cannot report the provider's arrival
    assert!(request
        .verify_reporter(LifecycleEventKind::Arrived, customer_id, Role::Customer)
        .is_err());

    // a stranger claiming the provider role is refused as well
    assert!(request
        .verify_reporter(LifecycleEventKind::Arrived, Uuid::new_v4(), Role::Provider)
        .is_err());

    // the provider cannot confirm on the customer's behalf
    assert!(request
        .verify_reporter(LifecycleEventKind::JobConfirmed, provider_id, Role::Provider)
        .is_err());

    // the rightful reporters pass, and only then does the machine advance
    request
        .verify_reporter(LifecycleEventKind::Arrived, provider_id, Role::Provider)
        .unwrap();
    assert_eq!(
        request.apply(LifecycleEventKind::Arrived, Utc::now()),
        Transition::Applied
    );

    assert_eq!(request.status.name(), "Arrived");
}

#[test]
fn replayed_and_reordered_events_cannot_corrupt_state() {
    let mut request = new_request(Uuid::new_v4());
    request
        .accept_bid(Uuid::new_v4(), Uuid::new_v4())
        .unwrap();

    // completion before arrival is ignored
    assert_eq!(
        request.apply(LifecycleEventKind::JobCompleted, Utc::now()),
        Transition::Ignored
    );
    assert_eq!(request.status, RequestStatus::Accepted);

    request.apply(LifecycleEventKind::Arrived, Utc::now());
    let after_arrival = request.status;

    // a duplicate delivery leaves the state byte-identical
    assert_eq!(
        request.apply(LifecycleEventKind::Arrived, Utc::now()),
        Transition::Ignored
    );
    assert_eq!(request.status, after_arrival);
}

#[tokio::test]
async fn cancellation_notifies_the_provider_and_ends_the_job() {
    let hub = Arc::new(Hub::new());
    let dispatcher = Dispatcher::new(hub.clone());

    let customer_id = Uuid::new_v4();
    let provider_id = Uuid::new_v4();

    let mut provider_room = hub
        .join(Room::User {
            role: Role::Provider,
            user_id: provider_id,
        })
        .await;

    let mut request = new_request(customer_id);
    request.accept_bid(Uuid::new_v4(), provider_id).unwrap();

    assert_eq!(
        request.apply(LifecycleEventKind::CustomerCanceled, Utc::now()),
        Transition::Applied
    );

    dispatcher
        .dispatch(Event::CustomerCanceled {
            request_id: request.id,
            provider_id,
            customer_id,
            timestamp: Utc::now(),
        })
        .await;

    let notified = provider_room.recv().await.unwrap();
    assert_eq!(notified.name(), "customer_canceled");

    // no further transitions are accepted
    assert_eq!(
        request.apply(LifecycleEventKind::Arrived, Utc::now()),
        Transition::Ignored
    );
    assert_eq!(
        request.status,
        RequestStatus::Canceled {
            canceled_by: Role::Customer
        }
    );
}

#[tokio::test]
async fn accepted_bid_is_announced_to_the_winner() {
    let hub = Arc::new(Hub::new());
    let dispatcher = Dispatcher::new(hub.clone());

    let customer_id = Uuid::new_v4();
    let provider_id = Uuid::new_v4();

    let mut provider_room = hub
        .join(Room::User {
            role: Role::Provider,
            user_id: provider_id,
        })
        .await;

    let mut request = new_request(customer_id);
    let bid = Bid::new(request.id, provider_id, 75.0, "25 minutes".into(), None).unwrap();

    request.accept_bid(bid.id, bid.provider_id).unwrap();

    dispatcher
        .dispatch(Event::BidSelected {
            request_id: request.id,
            bid_id: bid.id,
            provider_id,
            customer_id,
        })
        .await;

    let announced = provider_room.recv().await.unwrap();
    assert_eq!(announced.name(), "bid_selected");
}
