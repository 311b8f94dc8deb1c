//! The booking engine reducer.
//!
//! Orchestrates the session registry and the entitlement ledger to perform
//! book, cancel, move, purchase, and payment-settlement operations under the
//! capacity and cancellation-window rules.
//!
//! Commands validate fully before any mutation, then produce a single event
//! that is applied to state in one step - a denied command applies nothing
//! but the typed rejection. The reducer itself is pure; timestamps come from
//! the injected [`Clock`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use studio_core::effect::Effect;
use studio_core::environment::Clock;
use studio_core::reducer::Reducer;
use studio_core::{SmallVec, smallvec};

use crate::returns::processed_marker;
use crate::state::{StudioAction, StudioState};
use crate::types::{
    Booking, BookingId, BookingStatus, ClassSession, PackageId, PaymentStatus, RejectionReason,
    SessionId, SessionSnapshot, UserPackage, UserPackageId,
};

/// Minimum lead time, in hours, required to cancel or move a booking
pub const CANCELLATION_WINDOW_HOURS: i64 = 12;

/// Environment dependencies for the booking reducer
#[derive(Clone)]
pub struct StudioEnvironment {
    /// Clock for timestamps and window checks
    pub clock: Arc<dyn Clock>,
}

impl StudioEnvironment {
    /// Creates a new `StudioEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

/// Reducer for the booking engine
#[derive(Clone, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Whether the snapshotted session start is at least the cancellation
    /// window away from `now`; exactly at the boundary is permitted
    fn outside_cancellation_window(snapshot: &SessionSnapshot, now: DateTime<Utc>) -> bool {
        snapshot.starts_at() - now >= Duration::hours(CANCELLATION_WINDOW_HOURS)
    }

    /// The session as it will look once one more seat is taken
    fn after_taking_seat(session: &ClassSession) -> ClassSession {
        let booked = (session.booked_count + 1).min(session.max_capacity);
        let mut updated = session.clone();
        updated.booked_count = booked;
        updated.is_full = booked >= updated.max_capacity;
        updated
    }

    /// Validates a `BookClass` command and builds its event
    fn handle_book(
        state: &StudioState,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<StudioAction, RejectionReason> {
        let session = state
            .registry
            .find(session_id)
            .ok_or(RejectionReason::SessionNotFound)?;

        if session.booked_count >= session.max_capacity || session.is_full {
            return Err(RejectionReason::SessionFull);
        }

        if state.has_confirmed_booking(&state.user.id, session_id) {
            return Err(RejectionReason::DuplicateBooking);
        }

        let funding = state
            .ledger
            .find_consumable(now)
            .ok_or(RejectionReason::NoUsableCredit)?;
        let funded_by: Option<UserPackageId> = if funding.package.is_unlimited {
            None
        } else {
            Some(funding.id.clone())
        };

        // The snapshot reflects the session with this booking's seat taken
        let updated = Self::after_taking_seat(session);
        let booking = Booking {
            id: BookingId::new(),
            user_id: state.user.id.clone(),
            session_id: session_id.clone(),
            booked_at: now,
            status: BookingStatus::Confirmed,
            funded_by,
            session: SessionSnapshot::of(&updated, now),
        };

        Ok(StudioAction::ClassBooked { booking })
    }

    /// Validates a `CancelBooking` command and builds its event
    fn handle_cancel(
        state: &StudioState,
        booking_id: &BookingId,
        now: DateTime<Utc>,
    ) -> Result<StudioAction, RejectionReason> {
        let booking = state
            .booking(booking_id)
            .ok_or(RejectionReason::BookingNotFound)?;

        if booking.status != BookingStatus::Confirmed {
            return Err(RejectionReason::BookingNotConfirmed);
        }

        // The window is evaluated against the booking's own snapshot; the
        // session's time fields never change after creation
        if !Self::outside_cancellation_window(&booking.session, now) {
            return Err(RejectionReason::CancellationWindowClosed);
        }

        Ok(StudioAction::BookingCancelled {
            booking_id: booking_id.clone(),
            session_id: booking.session_id.clone(),
            refund: booking.funded_by.clone(),
        })
    }

    /// Validates a `MoveBooking` command and builds its event
    fn handle_move(
        state: &StudioState,
        booking_id: &BookingId,
        new_session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<StudioAction, RejectionReason> {
        let booking = state
            .booking(booking_id)
            .ok_or(RejectionReason::BookingNotFound)?;

        if booking.status != BookingStatus::Confirmed {
            return Err(RejectionReason::BookingNotConfirmed);
        }

        if &booking.session_id == new_session_id {
            return Err(RejectionReason::SameSession);
        }

        let target = state
            .registry
            .find(new_session_id)
            .ok_or(RejectionReason::SessionNotFound)?;

        if target.booked_count >= target.max_capacity || target.is_full {
            return Err(RejectionReason::SessionFull);
        }

        // Same rule as cancellation, evaluated against the original session
        if !Self::outside_cancellation_window(&booking.session, now) {
            return Err(RejectionReason::CancellationWindowClosed);
        }

        let updated = Self::after_taking_seat(target);
        Ok(StudioAction::BookingMoved {
            booking_id: booking_id.clone(),
            from_session: booking.session_id.clone(),
            to_session: new_session_id.clone(),
            snapshot: SessionSnapshot::of(&updated, now),
            moved_at: now,
        })
    }

    /// Validates a `PurchasePackage` command and builds its event
    fn handle_purchase(
        state: &StudioState,
        package_id: &PackageId,
        now: DateTime<Utc>,
    ) -> Result<StudioAction, RejectionReason> {
        let package = state
            .catalog
            .find_package(package_id)
            .ok_or(RejectionReason::UnknownPackage)?;

        let entitlement =
            UserPackage::allocate(UserPackageId::new(), state.user.id.clone(), package, now);

        Ok(StudioAction::PackagePurchased { entitlement })
    }

    /// Validates a `CompletePayment` command and builds its event
    ///
    /// The reference is marked processed only when the purchase goes
    /// through; an unknown package leaves the reference unsettled.
    fn handle_complete_payment(
        state: &StudioState,
        reference: &str,
        package_id: &PackageId,
        status: &PaymentStatus,
        now: DateTime<Utc>,
    ) -> Result<StudioAction, RejectionReason> {
        if !status.is_success() {
            return Err(RejectionReason::PaymentIncomplete);
        }

        if state.payment_processed(reference) {
            return Err(RejectionReason::PaymentAlreadyProcessed);
        }

        let package = state
            .catalog
            .find_package(package_id)
            .ok_or(RejectionReason::UnknownPackage)?;

        let entitlement =
            UserPackage::allocate(UserPackageId::new(), state.user.id.clone(), package, now);

        Ok(StudioAction::PaymentSettled {
            reference: reference.to_string(),
            entitlement,
        })
    }

    /// Applies an event to state
    fn apply_event(state: &mut StudioState, action: &StudioAction) {
        match action {
            StudioAction::ClassBooked { booking } => {
                state.registry.adjust_occupancy(&booking.session_id, 1);
                if let Some(funded_by) = &booking.funded_by {
                    state.ledger.debit(funded_by);
                }
                state.bookings.push(booking.clone());
                state.last_rejection = None;
            },
            StudioAction::BookingCancelled {
                booking_id,
                session_id,
                refund,
            } => {
                if let Some(booking) = state.bookings.iter_mut().find(|b| &b.id == booking_id) {
                    booking.status = BookingStatus::Cancelled;
                }
                state.registry.adjust_occupancy(session_id, -1);
                if let Some(refund) = refund {
                    state.ledger.credit(refund);
                }
                state.last_rejection = None;
            },
            StudioAction::BookingMoved {
                booking_id,
                from_session,
                to_session,
                snapshot,
                moved_at,
            } => {
                state.registry.adjust_occupancy(from_session, -1);
                state.registry.adjust_occupancy(to_session, 1);
                if let Some(booking) = state.bookings.iter_mut().find(|b| &b.id == booking_id) {
                    booking.session_id = to_session.clone();
                    booking.session = snapshot.clone();
                    booking.booked_at = *moved_at;
                }
                state.last_rejection = None;
            },
            StudioAction::PackagePurchased { entitlement } => {
                state.user.active_packages.push(entitlement.id.clone());
                state.ledger.insert(entitlement.clone());
                state.last_rejection = None;
            },
            StudioAction::PaymentSettled {
                reference,
                entitlement,
            } => {
                state.processed_payments.insert(processed_marker(reference));
                state.user.active_packages.push(entitlement.id.clone());
                state.ledger.insert(entitlement.clone());
                state.last_rejection = None;
            },
            StudioAction::CommandRejected { reason } => {
                state.last_rejection = Some(reason.clone());
            },
            // Commands are not applied to state
            StudioAction::BookClass { .. }
            | StudioAction::CancelBooking { .. }
            | StudioAction::MoveBooking { .. }
            | StudioAction::PurchasePackage { .. }
            | StudioAction::CompletePayment { .. } => {},
        }
    }

    /// Applies a command outcome: the built event, or a typed rejection
    fn settle(
        state: &mut StudioState,
        outcome: Result<StudioAction, RejectionReason>,
    ) -> SmallVec<[Effect<StudioAction>; 4]> {
        match outcome {
            Ok(event) => Self::apply_event(state, &event),
            Err(reason) => {
                Self::apply_event(state, &StudioAction::CommandRejected { reason });
            },
        }
        smallvec![Effect::None]
    }
}

impl Reducer for BookingReducer {
    type State = StudioState;
    type Action = StudioAction;
    type Environment = StudioEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            StudioAction::BookClass { session_id } => {
                let outcome = Self::handle_book(state, &session_id, env.clock.now());
                Self::settle(state, outcome)
            },

            StudioAction::CancelBooking { booking_id } => {
                let outcome = Self::handle_cancel(state, &booking_id, env.clock.now());
                Self::settle(state, outcome)
            },

            StudioAction::MoveBooking {
                booking_id,
                new_session_id,
            } => {
                let outcome =
                    Self::handle_move(state, &booking_id, &new_session_id, env.clock.now());
                Self::settle(state, outcome)
            },

            StudioAction::PurchasePackage { package_id } => {
                let outcome = Self::handle_purchase(state, &package_id, env.clock.now());
                Self::settle(state, outcome)
            },

            StudioAction::CompletePayment {
                reference,
                package_id,
                status,
            } => {
                let outcome = Self::handle_complete_payment(
                    state,
                    &reference,
                    &package_id,
                    &status,
                    env.clock.now(),
                );
                Self::settle(state, outcome)
            },

            // ========== Events ==========
            StudioAction::ClassBooked { .. }
            | StudioAction::BookingCancelled { .. }
            | StudioAction::BookingMoved { .. }
            | StudioAction::PackagePurchased { .. }
            | StudioAction::PaymentSettled { .. }
            | StudioAction::CommandRejected { .. } => {
                // Events are applied directly (for replay or external events)
                Self::apply_event(state, &action);
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::types::{ClassTypeId, InstructorId, User, UserId};
    use studio_testing::{ReducerTest, assertions, test_clock};

    // test_clock() pins "now" to 2025-01-01T00:00:00Z
    fn now() -> DateTime<Utc> {
        test_clock().now()
    }

    fn test_env() -> StudioEnvironment {
        StudioEnvironment::new(Arc::new(test_clock()))
    }

    fn sample_user() -> User {
        User {
            id: UserId::new("user-1"),
            name: "Maya Quintero".to_string(),
            email: "maya@example.com".to_string(),
            phone: None,
            active_packages: Vec::new(),
        }
    }

    /// A session starting `hours_ahead` hours after the test clock's "now"
    fn session_in(id: &str, hours_ahead: i64, booked: u32) -> ClassSession {
        let starts = now() + Duration::hours(hours_ahead);
        ClassSession::new(
            SessionId::new(id),
            ClassTypeId::new("reformer"),
            InstructorId::new("ava"),
            starts.date_naive(),
            starts.time(),
            starts.time() + Duration::minutes(50),
            8,
            booked,
        )
    }

    fn state_with_sessions(sessions: Vec<ClassSession>) -> StudioState {
        StudioState::new(Catalog::standard(), sessions, sample_user())
    }

    fn add_package(state: &mut StudioState, slug: &str) -> UserPackageId {
        let package = state
            .catalog
            .find_package(&PackageId::new(slug))
            .unwrap()
            .clone();
        let entitlement =
            UserPackage::allocate(UserPackageId::new(), state.user.id.clone(), &package, now());
        let id = entitlement.id.clone();
        state.user.active_packages.push(id.clone());
        state.ledger.insert(entitlement);
        id
    }

    fn book(state: &mut StudioState, session_id: &str) -> BookingId {
        BookingReducer::new().reduce(
            state,
            StudioAction::BookClass {
                session_id: SessionId::new(session_id),
            },
            &test_env(),
        );
        assert_eq!(state.last_rejection, None, "booking fixture was rejected");
        state.bookings.last().unwrap().id.clone()
    }

    #[test]
    fn book_takes_seat_and_debits_credit() {
        let mut state = state_with_sessions(vec![session_in("a", 48, 3)]);
        let package_id = add_package(&mut state, "pack-5");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::BookClass {
                session_id: SessionId::new("a"),
            })
            .then_state(move |state| {
                assert_eq!(state.last_rejection, None);
                assert_eq!(state.bookings.len(), 1);

                let booking = &state.bookings[0];
                assert_eq!(booking.status, BookingStatus::Confirmed);
                assert_eq!(booking.funded_by, Some(package_id.clone()));
                assert_eq!(booking.session.booked_count, 4);

                let session = state.registry.find(&SessionId::new("a")).unwrap();
                assert_eq!(session.booked_count, 4);

                let entitlement = state.ledger.get(&package_id).unwrap();
                assert_eq!(entitlement.classes_remaining, 4);
                assert_eq!(entitlement.classes_used, 1);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn book_fills_last_seat() {
        let mut state = state_with_sessions(vec![session_in("a", 48, 7)]);
        add_package(&mut state, "pack-5");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::BookClass {
                session_id: SessionId::new("a"),
            })
            .then_state(|state| {
                let session = state.registry.find(&SessionId::new("a")).unwrap();
                assert_eq!(session.booked_count, 8);
                assert!(session.is_full);
            })
            .run();
    }

    #[test]
    fn book_full_session_is_rejected() {
        let mut state = state_with_sessions(vec![session_in("a", 48, 8)]);
        add_package(&mut state, "pack-5");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::BookClass {
                session_id: SessionId::new("a"),
            })
            .then_state(|state| {
                assert_eq!(state.last_rejection, Some(RejectionReason::SessionFull));
                assert!(state.bookings.is_empty());
                assert_eq!(state.total_classes_remaining(test_clock().now()), 5);
            })
            .run();
    }

    #[test]
    fn book_unknown_session_is_rejected() {
        let mut state = state_with_sessions(Vec::new());
        add_package(&mut state, "pack-5");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::BookClass {
                session_id: SessionId::new("missing"),
            })
            .then_state(|state| {
                assert_eq!(state.last_rejection, Some(RejectionReason::SessionNotFound));
            })
            .run();
    }

    #[test]
    fn book_twice_on_same_session_is_rejected() {
        let mut state = state_with_sessions(vec![session_in("a", 48, 0)]);
        add_package(&mut state, "pack-5");
        book(&mut state, "a");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::BookClass {
                session_id: SessionId::new("a"),
            })
            .then_state(|state| {
                assert_eq!(
                    state.last_rejection,
                    Some(RejectionReason::DuplicateBooking)
                );
                assert_eq!(state.bookings.len(), 1);
                assert_eq!(
                    state.registry.find(&SessionId::new("a")).unwrap().booked_count,
                    1
                );
            })
            .run();
    }

    #[test]
    fn book_without_credit_is_rejected() {
        let state = state_with_sessions(vec![session_in("a", 48, 0)]);

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::BookClass {
                session_id: SessionId::new("a"),
            })
            .then_state(|state| {
                assert_eq!(state.last_rejection, Some(RejectionReason::NoUsableCredit));
                assert!(state.bookings.is_empty());
                assert_eq!(
                    state.registry.find(&SessionId::new("a")).unwrap().booked_count,
                    0
                );
            })
            .run();
    }

    #[test]
    fn unlimited_package_funds_without_debit() {
        let mut state = state_with_sessions(vec![session_in("a", 48, 0)]);
        let package_id = add_package(&mut state, "monthly-unlimited");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::BookClass {
                session_id: SessionId::new("a"),
            })
            .then_state(move |state| {
                assert_eq!(state.last_rejection, None);
                assert_eq!(state.bookings[0].funded_by, None);

                let entitlement = state.ledger.get(&package_id).unwrap();
                assert_eq!(entitlement.classes_used, 0);
            })
            .run();
    }

    #[test]
    fn cancel_releases_seat_and_refunds_funding_package() {
        let mut state = state_with_sessions(vec![session_in("a", 48, 0)]);
        let package_id = add_package(&mut state, "pack-5");
        let booking_id = book(&mut state, "a");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::CancelBooking { booking_id })
            .then_state(move |state| {
                assert_eq!(state.last_rejection, None);
                assert_eq!(state.bookings[0].status, BookingStatus::Cancelled);
                assert_eq!(
                    state.registry.find(&SessionId::new("a")).unwrap().booked_count,
                    0
                );

                let entitlement = state.ledger.get(&package_id).unwrap();
                assert_eq!(entitlement.classes_remaining, 5);
                assert_eq!(entitlement.classes_used, 0);
            })
            .run();
    }

    #[test]
    fn cancel_inside_window_is_rejected() {
        let mut state = state_with_sessions(vec![session_in("a", 10, 0)]);
        let package_id = add_package(&mut state, "pack-5");
        let booking_id = book(&mut state, "a");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::CancelBooking { booking_id })
            .then_state(move |state| {
                assert_eq!(
                    state.last_rejection,
                    Some(RejectionReason::CancellationWindowClosed)
                );
                assert_eq!(state.bookings[0].status, BookingStatus::Confirmed);
                assert_eq!(
                    state.registry.find(&SessionId::new("a")).unwrap().booked_count,
                    1
                );
                assert_eq!(state.ledger.get(&package_id).unwrap().classes_used, 1);
            })
            .run();
    }

    #[test]
    fn cancel_at_exactly_twelve_hours_succeeds() {
        let mut state = state_with_sessions(vec![session_in("a", CANCELLATION_WINDOW_HOURS, 0)]);
        add_package(&mut state, "pack-5");
        let booking_id = book(&mut state, "a");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::CancelBooking { booking_id })
            .then_state(|state| {
                assert_eq!(state.last_rejection, None);
                assert_eq!(state.bookings[0].status, BookingStatus::Cancelled);
            })
            .run();
    }

    #[test]
    fn cancel_cancelled_booking_is_rejected() {
        let mut state = state_with_sessions(vec![session_in("a", 48, 0)]);
        add_package(&mut state, "pack-5");
        let booking_id = book(&mut state, "a");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::CancelBooking {
                booking_id: booking_id.clone(),
            })
            .when_action(StudioAction::CancelBooking { booking_id })
            .then_state(|state| {
                assert_eq!(
                    state.last_rejection,
                    Some(RejectionReason::BookingNotConfirmed)
                );
                // The seat was released exactly once
                assert_eq!(
                    state.registry.find(&SessionId::new("a")).unwrap().booked_count,
                    0
                );
            })
            .run();
    }

    #[test]
    fn unlimited_funded_cancel_refunds_nothing() {
        let mut state = state_with_sessions(vec![session_in("a", 48, 0)]);
        let package_id = add_package(&mut state, "monthly-unlimited");
        let booking_id = book(&mut state, "a");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::CancelBooking { booking_id })
            .then_state(move |state| {
                assert_eq!(state.last_rejection, None);
                let entitlement = state.ledger.get(&package_id).unwrap();
                assert_eq!(entitlement.classes_used, 0);
                assert_eq!(
                    entitlement.classes_remaining,
                    entitlement.package.class_count
                );
            })
            .run();
    }

    #[test]
    fn move_relocates_seat_without_ledger_change() {
        let mut state = state_with_sessions(vec![
            session_in("a", 48, 0),
            session_in("b", 72, 0),
        ]);
        let package_id = add_package(&mut state, "pack-5");
        let booking_id = book(&mut state, "a");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::MoveBooking {
                booking_id,
                new_session_id: SessionId::new("b"),
            })
            .then_state(move |state| {
                assert_eq!(state.last_rejection, None);
                assert_eq!(
                    state.registry.find(&SessionId::new("a")).unwrap().booked_count,
                    0
                );
                assert_eq!(
                    state.registry.find(&SessionId::new("b")).unwrap().booked_count,
                    1
                );

                let booking = &state.bookings[0];
                assert_eq!(booking.session_id, SessionId::new("b"));
                assert_eq!(booking.session.session_id, SessionId::new("b"));
                assert_eq!(booking.status, BookingStatus::Confirmed);
                // Move consumes no new credit and refunds none
                let entitlement = state.ledger.get(&package_id).unwrap();
                assert_eq!(entitlement.classes_used, 1);
                assert_eq!(entitlement.classes_remaining, 4);
            })
            .run();
    }

    #[test]
    fn move_restamps_booking_date() {
        let mut state = state_with_sessions(vec![
            session_in("a", 48, 0),
            session_in("b", 72, 0),
        ]);
        add_package(&mut state, "pack-5");
        let booking_id = book(&mut state, "a");
        // Pretend the original booking happened earlier
        state.bookings[0].booked_at = now() - Duration::days(1);

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::MoveBooking {
                booking_id,
                new_session_id: SessionId::new("b"),
            })
            .then_state(|state| {
                assert_eq!(state.bookings[0].booked_at, test_clock().now());
            })
            .run();
    }

    #[test]
    fn move_to_same_session_is_rejected() {
        let mut state = state_with_sessions(vec![session_in("a", 48, 0)]);
        add_package(&mut state, "pack-5");
        let booking_id = book(&mut state, "a");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::MoveBooking {
                booking_id,
                new_session_id: SessionId::new("a"),
            })
            .then_state(|state| {
                assert_eq!(state.last_rejection, Some(RejectionReason::SameSession));
            })
            .run();
    }

    #[test]
    fn move_to_full_session_is_rejected() {
        let mut state = state_with_sessions(vec![
            session_in("a", 48, 0),
            session_in("b", 72, 8),
        ]);
        add_package(&mut state, "pack-5");
        let booking_id = book(&mut state, "a");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::MoveBooking {
                booking_id,
                new_session_id: SessionId::new("b"),
            })
            .then_state(|state| {
                assert_eq!(state.last_rejection, Some(RejectionReason::SessionFull));
                assert_eq!(state.bookings[0].session_id, SessionId::new("a"));
                assert_eq!(
                    state.registry.find(&SessionId::new("a")).unwrap().booked_count,
                    1
                );
            })
            .run();
    }

    #[test]
    fn move_inside_original_window_is_rejected() {
        // Original session is 10h away; the target being far out does not help
        let mut state = state_with_sessions(vec![
            session_in("a", 10, 0),
            session_in("b", 72, 0),
        ]);
        add_package(&mut state, "pack-5");
        let booking_id = book(&mut state, "a");

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::MoveBooking {
                booking_id,
                new_session_id: SessionId::new("b"),
            })
            .then_state(|state| {
                assert_eq!(
                    state.last_rejection,
                    Some(RejectionReason::CancellationWindowClosed)
                );
                assert_eq!(state.bookings[0].session_id, SessionId::new("a"));
            })
            .run();
    }

    #[test]
    fn purchase_appends_to_ledger_and_user() {
        let state = state_with_sessions(Vec::new());

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::PurchasePackage {
                package_id: PackageId::new("pack-10"),
            })
            .then_state(|state| {
                assert_eq!(state.last_rejection, None);
                assert_eq!(state.ledger.packages().len(), 1);

                let entitlement = &state.ledger.packages()[0];
                assert_eq!(entitlement.classes_remaining, 10);
                assert_eq!(
                    entitlement.expiry_date,
                    test_clock().now() + Duration::days(180)
                );
                assert_eq!(state.user.active_packages, vec![entitlement.id.clone()]);
            })
            .run();
    }

    #[test]
    fn purchase_unknown_package_is_rejected() {
        let state = state_with_sessions(Vec::new());

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::PurchasePackage {
                package_id: PackageId::new("gift-card"),
            })
            .then_state(|state| {
                assert_eq!(state.last_rejection, Some(RejectionReason::UnknownPackage));
                assert!(state.ledger.packages().is_empty());
            })
            .run();
    }

    #[test]
    fn payment_settles_once_and_marks_reference() {
        let state = state_with_sessions(Vec::new());

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::CompletePayment {
                reference: "cs_123".to_string(),
                package_id: PackageId::new("pack-5"),
                status: PaymentStatus::Success,
            })
            .then_state(|state| {
                assert_eq!(state.last_rejection, None);
                assert_eq!(state.ledger.packages().len(), 1);
                assert!(state.payment_processed("cs_123"));
            })
            .run();
    }

    #[test]
    fn replayed_payment_reference_is_rejected() {
        let state = state_with_sessions(Vec::new());
        let complete = StudioAction::CompletePayment {
            reference: "cs_123".to_string(),
            package_id: PackageId::new("pack-5"),
            status: PaymentStatus::Success,
        };

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(complete.clone())
            .when_action(complete)
            .then_state(|state| {
                assert_eq!(
                    state.last_rejection,
                    Some(RejectionReason::PaymentAlreadyProcessed)
                );
                // Only one entitlement was granted
                assert_eq!(state.ledger.packages().len(), 1);
            })
            .run();
    }

    #[test]
    fn incomplete_payment_is_rejected_and_leaves_reference_open() {
        let state = state_with_sessions(Vec::new());

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::CompletePayment {
                reference: "cs_123".to_string(),
                package_id: PackageId::new("pack-5"),
                status: PaymentStatus::Other("cancelled".to_string()),
            })
            .then_state(|state| {
                assert_eq!(
                    state.last_rejection,
                    Some(RejectionReason::PaymentIncomplete)
                );
                assert!(state.ledger.packages().is_empty());
                assert!(!state.payment_processed("cs_123"));
            })
            .run();
    }

    #[test]
    fn unknown_package_payment_leaves_reference_unsettled() {
        let state = state_with_sessions(Vec::new());

        ReducerTest::new(BookingReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(StudioAction::CompletePayment {
                reference: "cs_123".to_string(),
                package_id: PackageId::new("gift-card"),
                status: PaymentStatus::Success,
            })
            .then_state(|state| {
                assert_eq!(state.last_rejection, Some(RejectionReason::UnknownPackage));
                assert!(!state.payment_processed("cs_123"));
            })
            .run();
    }
}
