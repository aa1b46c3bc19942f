use frontdesk::db;
use frontdesk::domain::{
    DomainError, GuestFields, NewPayment, ReservationInput, ReservationStatus, RoomInput,
    UpdateGuestInput, UpdateReservationInput,
};
use frontdesk::infrastructure::AppState;
use frontdesk::services::reservation_service::ReservationDeps;
use frontdesk::services::{guest_service, payment_service, reservation_service, room_service};

async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db)
}

fn deps(state: &AppState) -> ReservationDeps<'_> {
    ReservationDeps {
        guests: state.guest_repo.as_ref(),
        rooms: state.room_repo.as_ref(),
        reservations: state.reservation_repo.as_ref(),
    }
}

async fn guest(state: &AppState, name: &str, email: &str) -> String {
    guest_service::create_guest(
        state.guest_repo.as_ref(),
        GuestFields {
            full_name: name.to_string(),
            email: email.to_string(),
            phone_number: None,
            address: None,
        },
    )
    .await
    .expect("create guest")
    .id
}

async fn room(state: &AppState, number: &str) -> String {
    room_service::create_room(
        state.room_repo.as_ref(),
        RoomInput {
            room_number: number.to_string(),
            room_type: "Double".to_string(),
            rate: 120.0,
            is_active: true,
        },
    )
    .await
    .expect("create room")
    .id
}

async fn book(state: &AppState, guest_id: &str, room_id: &str, start: &str, end: &str) -> String {
    reservation_service::create_reservation(
        deps(state),
        ReservationInput {
            guest_id: guest_id.to_string(),
            room_id: room_id.to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            status: ReservationStatus::Pending,
        },
    )
    .await
    .expect("create reservation")
    .reservation
    .id
}

#[tokio::test]
async fn test_guest_with_reservations_cannot_be_deleted() {
    let state = setup_test_state().await;
    let guest_id = guest(&state, "Jane Doe", "jane@x.com").await;
    let room_id = room(&state, "101").await;
    let reservation_id = book(&state, &guest_id, &room_id, "2024-06-01", "2024-06-03").await;

    let err = guest_service::delete_guest(
        state.guest_repo.as_ref(),
        state.reservation_repo.as_ref(),
        &guest_id,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    // A finished stay with payments is history and keeps the guest in place
    payment_service::add_payment(
        state.payment_repo.as_ref(),
        state.reservation_repo.as_ref(),
        NewPayment {
            reservation_id: reservation_id.clone(),
            amount: 240.0,
            payment_date: None,
            payment_method: Some("card".to_string()),
            notes: None,
        },
    )
    .await
    .unwrap();
    reservation_service::check_in(state.reservation_repo.as_ref(), &reservation_id)
        .await
        .unwrap();
    reservation_service::check_out(state.reservation_repo.as_ref(), &reservation_id)
        .await
        .unwrap();

    let err = guest_service::delete_guest(
        state.guest_repo.as_ref(),
        state.reservation_repo.as_ref(),
        &guest_id,
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        DomainError::Conflict("Cannot delete guest with reservation history".to_string())
    );

    let err = reservation_service::delete_reservation(
        state.reservation_repo.as_ref(),
        state.payment_repo.as_ref(),
        &reservation_id,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let summary = payment_service::list_payments(
        state.payment_repo.as_ref(),
        state.reservation_repo.as_ref(),
        &reservation_id,
    )
    .await
    .unwrap();
    assert_eq!(summary.payments.len(), 1);
    assert_eq!(summary.total_paid, 240.0);

    // A guest who never booked can be deleted
    let walk_in = guest(&state, "Sam Walker", "sam@x.com").await;
    guest_service::delete_guest(
        state.guest_repo.as_ref(),
        state.reservation_repo.as_ref(),
        &walk_in,
    )
    .await
    .expect("delete guest without reservations");
}

#[tokio::test]
async fn test_unpaid_reservation_can_be_deleted() {
    let state = setup_test_state().await;
    let guest_id = guest(&state, "Jane Doe", "jane@x.com").await;
    let room_id = room(&state, "101").await;
    let reservation_id = book(&state, &guest_id, &room_id, "2024-06-01", "2024-06-03").await;

    reservation_service::delete_reservation(
        state.reservation_repo.as_ref(),
        state.payment_repo.as_ref(),
        &reservation_id,
    )
    .await
    .expect("delete reservation");

    assert_eq!(
        reservation_service::get_reservation(state.reservation_repo.as_ref(), &reservation_id)
            .await
            .unwrap_err(),
        DomainError::NotFound
    );
    guest_service::delete_guest(
        state.guest_repo.as_ref(),
        state.reservation_repo.as_ref(),
        &guest_id,
    )
    .await
    .expect("guest is free once the booking is gone");
}

#[tokio::test]
async fn test_booked_room_cannot_be_deleted() {
    let state = setup_test_state().await;
    let guest_id = guest(&state, "Jane Doe", "jane@x.com").await;
    let room_id = room(&state, "101").await;
    book(&state, &guest_id, &room_id, "2024-06-01", "2024-06-03").await;

    let err = room_service::delete_room(
        state.room_repo.as_ref(),
        state.reservation_repo.as_ref(),
        &room_id,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)));

    // Checked out and cancelled stays still pin the room
    let id = book(&state, &guest_id, &room_id, "2024-07-01", "2024-07-03").await;
    reservation_service::update_reservation(
        deps(&state),
        &id,
        UpdateReservationInput {
            status: Some(ReservationStatus::Cancelled),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let first = reservation_service::list_reservations_in_range(
        state.reservation_repo.as_ref(),
        "2024-06-01",
        "2024-06-30",
    )
    .await
    .unwrap();
    reservation_service::check_in(state.reservation_repo.as_ref(), &first[0].reservation.id)
        .await
        .unwrap();
    reservation_service::check_out(state.reservation_repo.as_ref(), &first[0].reservation.id)
        .await
        .unwrap();

    let err = room_service::delete_room(
        state.room_repo.as_ref(),
        state.reservation_repo.as_ref(),
        &room_id,
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        DomainError::Conflict("Cannot delete room with reservation history".to_string())
    );
}

#[tokio::test]
async fn test_duplicate_room_number_is_rejected() {
    let state = setup_test_state().await;
    room(&state, "101").await;

    let err = room_service::create_room(
        state.room_repo.as_ref(),
        RoomInput {
            room_number: "101".to_string(),
            room_type: "Suite".to_string(),
            rate: 300.0,
            is_active: true,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_reservation_must_end_after_it_starts() {
    let state = setup_test_state().await;
    let guest_id = guest(&state, "Jane Doe", "jane@x.com").await;
    let room_id = room(&state, "101").await;

    let err = reservation_service::create_reservation(
        deps(&state),
        ReservationInput {
            guest_id: guest_id.clone(),
            room_id: room_id.clone(),
            start_date: "2024-06-03".to_string(),
            end_date: "2024-06-03".to_string(),
            status: ReservationStatus::Pending,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    // A partial update is checked against the stored start date
    let id = book(&state, &guest_id, &room_id, "2024-06-03", "2024-06-05").await;
    let err = reservation_service::update_reservation(
        deps(&state),
        &id,
        UpdateReservationInput {
            end_date: Some("2024-06-01".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_reservation_requires_existing_guest_and_room() {
    let state = setup_test_state().await;
    let room_id = room(&state, "101").await;

    let err = reservation_service::create_reservation(
        deps(&state),
        ReservationInput {
            guest_id: "missing".to_string(),
            room_id,
            start_date: "2024-06-01".to_string(),
            end_date: "2024-06-02".to_string(),
            status: ReservationStatus::Pending,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(
        err,
        DomainError::Validation("guest_id: guest does not exist".to_string())
    );
}

#[tokio::test]
async fn test_stay_lifecycle_transitions() {
    let state = setup_test_state().await;
    let guest_id = guest(&state, "Jane Doe", "jane@x.com").await;
    let room_id = room(&state, "101").await;
    let id = book(&state, &guest_id, &room_id, "2024-06-01", "2024-06-03").await;
    let repo = state.reservation_repo.as_ref();

    // Cannot check out before checking in
    assert!(matches!(
        reservation_service::check_out(repo, &id).await,
        Err(DomainError::Conflict(_))
    ));

    let checked_in = reservation_service::check_in(repo, &id).await.unwrap();
    assert_eq!(checked_in.reservation.status, ReservationStatus::CheckedIn);
    assert_eq!(checked_in.guest.map(|g| g.id), Some(guest_id));

    assert!(matches!(
        reservation_service::check_in(repo, &id).await,
        Err(DomainError::Conflict(_))
    ));

    let checked_out = reservation_service::check_out(repo, &id).await.unwrap();
    assert_eq!(checked_out.reservation.status, ReservationStatus::CheckedOut);
}

#[tokio::test]
async fn test_range_lists_only_contained_stays() {
    let state = setup_test_state().await;
    let guest_id = guest(&state, "Jane Doe", "jane@x.com").await;
    let room_id = room(&state, "101").await;
    book(&state, &guest_id, &room_id, "2024-06-01", "2024-06-03").await;
    book(&state, &guest_id, &room_id, "2024-06-28", "2024-07-02").await;
    book(&state, &guest_id, &room_id, "2024-07-10", "2024-07-12").await;

    let june = reservation_service::list_reservations_in_range(
        state.reservation_repo.as_ref(),
        "2024-06-01",
        "2024-06-30",
    )
    .await
    .unwrap();

    assert_eq!(june.len(), 1);
    assert_eq!(june[0].reservation.start_date, "2024-06-01");
    assert!(june[0].room.is_some());
}

#[tokio::test]
async fn test_payments_are_validated_and_totalled() {
    let state = setup_test_state().await;
    let guest_id = guest(&state, "Jane Doe", "jane@x.com").await;
    let room_id = room(&state, "101").await;
    let reservation_id = book(&state, &guest_id, &room_id, "2024-06-01", "2024-06-03").await;

    let payment = |amount: f64| NewPayment {
        reservation_id: reservation_id.clone(),
        amount,
        payment_date: None,
        payment_method: Some("card".to_string()),
        notes: Some(" ".to_string()),
    };

    let err = payment_service::add_payment(
        state.payment_repo.as_ref(),
        state.reservation_repo.as_ref(),
        payment(10.125),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let first = payment_service::add_payment(
        state.payment_repo.as_ref(),
        state.reservation_repo.as_ref(),
        payment(100.10),
    )
    .await
    .unwrap();
    assert_eq!(first.notes, None);
    payment_service::add_payment(
        state.payment_repo.as_ref(),
        state.reservation_repo.as_ref(),
        payment(20.20),
    )
    .await
    .unwrap();

    let summary = payment_service::list_payments(
        state.payment_repo.as_ref(),
        state.reservation_repo.as_ref(),
        &reservation_id,
    )
    .await
    .unwrap();
    assert_eq!(summary.payments.len(), 2);
    assert_eq!(summary.total_paid, 120.3);

    let err = payment_service::add_payment(
        state.payment_repo.as_ref(),
        state.reservation_repo.as_ref(),
        NewPayment {
            reservation_id: "missing".to_string(),
            ..payment(5.0)
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err, DomainError::NotFound);
}

#[tokio::test]
async fn test_guest_search_and_partial_update() {
    let state = setup_test_state().await;
    let jane = guest(&state, "Jane Doe", "jane@x.com").await;
    guest(&state, "Bob Stone", "bob@stone.org").await;

    let found = guest_service::search_guests(state.guest_repo.as_ref(), "DOE")
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, jane);

    let by_email = guest_service::search_guests(state.guest_repo.as_ref(), "stone.org")
        .await
        .unwrap();
    assert_eq!(by_email.len(), 1);

    let updated = guest_service::update_guest(
        state.guest_repo.as_ref(),
        &jane,
        UpdateGuestInput {
            phone_number: Some(Some("+44 20 7946 0958".to_string())),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.full_name, "Jane Doe");
    assert_eq!(updated.phone_number.as_deref(), Some("+44 20 7946 0958"));

    let err = guest_service::update_guest(
        state.guest_repo.as_ref(),
        &jane,
        UpdateGuestInput {
            email: Some("bob@stone.org".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_duplicates_surface_merge_candidates() {
    let state = setup_test_state().await;
    guest(&state, "Jonathan Smith", "jon@x.com").await;
    guest(&state, "Jonathon Smith", "jsmith@y.com").await;
    guest(&state, "Maria Garcia", "maria@x.com").await;

    let groups = guest_service::find_duplicates(state.guest_repo.as_ref())
        .await
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].guests.len(), 2);
}
