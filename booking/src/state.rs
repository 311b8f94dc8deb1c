//! Engine state and actions.
//!
//! [`StudioState`] composes the catalog, the session registry, the
//! entitlement ledger, and the booking records into the single state value
//! the booking reducer operates on. [`StudioAction`] is the unified input
//! type: commands (requests to change state) and events (facts applied to
//! state).

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::ledger::EntitlementLedger;
use crate::registry::SessionRegistry;
use crate::returns::processed_marker;
use crate::types::{
    Booking, BookingId, BookingStatus, ClassSession, PackageId, PaymentStatus, RejectionReason,
    SessionId, SessionSnapshot, User, UserId, UserPackage, UserPackageId,
};

/// The full state of the booking engine
///
/// One logical actor (the signed-in user) drives all mutations; every
/// command computes its complete next state before anything else can
/// observe it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioState {
    /// Immutable catalog reference data
    pub catalog: Catalog,
    /// Session records and occupancy
    pub registry: SessionRegistry,
    /// Entitlement records and credit counters
    pub ledger: EntitlementLedger,
    /// The signed-in user
    pub user: User,
    /// All bookings ever made, newest last
    pub bookings: Vec<Booking>,
    /// Settled payment references (`processed:<reference>` markers)
    pub processed_payments: HashSet<String>,
    /// Why the last command was denied; cleared by every accepted command
    pub last_rejection: Option<RejectionReason>,
}

impl StudioState {
    /// Creates engine state over catalog-provided data
    #[must_use]
    pub fn new(catalog: Catalog, sessions: Vec<ClassSession>, user: User) -> Self {
        Self {
            catalog,
            registry: SessionRegistry::new(sessions),
            ledger: EntitlementLedger::new(),
            user,
            bookings: Vec::new(),
            processed_payments: HashSet::new(),
            last_rejection: None,
        }
    }

    /// Grants the starter entitlement new users begin with (the unlimited
    /// monthly package, or the first catalog package as a fallback)
    pub fn grant_starter_package(&mut self, now: DateTime<Utc>) {
        let starter = self
            .catalog
            .find_package(&PackageId::new("monthly-unlimited"))
            .or_else(|| self.catalog.packages.first())
            .cloned();

        if let Some(package) = starter {
            let entitlement =
                UserPackage::allocate(UserPackageId::new(), self.user.id.clone(), &package, now);
            self.user.active_packages.push(entitlement.id.clone());
            self.ledger.insert(entitlement);
        }
    }

    /// Looks up a booking by id
    #[must_use]
    pub fn booking(&self, id: &BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| &b.id == id)
    }

    /// Whether a confirmed booking exists for this user and session
    #[must_use]
    pub fn has_confirmed_booking(&self, user_id: &UserId, session_id: &SessionId) -> bool {
        self.bookings.iter().any(|b| {
            b.status == BookingStatus::Confirmed
                && &b.user_id == user_id
                && &b.session_id == session_id
        })
    }

    /// Confirmed bookings ordered by session start, soonest first
    #[must_use]
    pub fn confirmed_bookings(&self) -> Vec<&Booking> {
        let mut confirmed: Vec<&Booking> = self
            .bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .collect();
        confirmed.sort_by_key(|b| b.session.starts_at());
        confirmed
    }

    /// Past bookings (cancelled or attended), most recent action first
    #[must_use]
    pub fn booking_history(&self) -> Vec<&Booking> {
        let mut history: Vec<&Booking> = self
            .bookings
            .iter()
            .filter(|b| b.status != BookingStatus::Confirmed)
            .collect();
        history.sort_by_key(|b| std::cmp::Reverse(b.booked_at));
        history
    }

    /// Sessions on a given calendar day
    #[must_use]
    pub fn classes_for_date(&self, date: NaiveDate) -> Vec<&ClassSession> {
        self.registry.for_date(date)
    }

    /// Whether any entitlement can fund a booking at `now`
    #[must_use]
    pub fn has_available_credit(&self, now: DateTime<Utc>) -> bool {
        self.ledger.has_available_credit(now)
    }

    /// Aggregate remaining credits for display (999 per unlimited package)
    #[must_use]
    pub fn total_classes_remaining(&self, now: DateTime<Utc>) -> u32 {
        self.ledger.total_remaining(now)
    }

    /// Whether a payment reference has already been settled
    #[must_use]
    pub fn payment_processed(&self, reference: &str) -> bool {
        self.processed_payments.contains(&processed_marker(reference))
    }
}

/// Actions for the booking engine (commands and events)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum StudioAction {
    // ========== Commands ==========
    /// Command: Reserve a seat on a session
    BookClass {
        /// Session to book
        session_id: SessionId,
    },

    /// Command: Cancel a confirmed booking
    CancelBooking {
        /// Booking to cancel
        booking_id: BookingId,
    },

    /// Command: Move a confirmed booking to another session
    MoveBooking {
        /// Booking to move
        booking_id: BookingId,
        /// Target session
        new_session_id: SessionId,
    },

    /// Command: Purchase a catalog package
    PurchasePackage {
        /// Package to purchase
        package_id: PackageId,
    },

    /// Command: Settle a checkout return trip (one-shot per reference)
    CompletePayment {
        /// Unique payment reference
        reference: String,
        /// Package the payment was for
        package_id: PackageId,
        /// Status flag reported by the checkout
        status: PaymentStatus,
    },

    // ========== Events ==========
    /// Event: A seat was reserved
    ClassBooked {
        /// The booking created, snapshot included
        booking: Booking,
    },

    /// Event: A booking was cancelled and its seat released
    BookingCancelled {
        /// The cancelled booking
        booking_id: BookingId,
        /// Session whose seat was released
        session_id: SessionId,
        /// Entitlement refunded, if the booking was credit-funded
        refund: Option<UserPackageId>,
    },

    /// Event: A booking was relocated to another session
    BookingMoved {
        /// The moved booking
        booking_id: BookingId,
        /// Session the seat was released on
        from_session: SessionId,
        /// Session the seat was taken on
        to_session: SessionId,
        /// Snapshot of the target session after the move
        snapshot: SessionSnapshot,
        /// Re-booking timestamp
        moved_at: DateTime<Utc>,
    },

    /// Event: A package was purchased
    PackagePurchased {
        /// The entitlement allocated
        entitlement: UserPackage,
    },

    /// Event: A payment reference was settled exactly once
    PaymentSettled {
        /// Unique payment reference
        reference: String,
        /// The entitlement allocated
        entitlement: UserPackage,
    },

    /// Event: Command validation failed
    CommandRejected {
        /// Why the command was denied
        reason: RejectionReason,
    },
}
