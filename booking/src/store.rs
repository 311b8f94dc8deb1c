//! Store for the booking engine.
//!
//! A thin domain facade over the generic runtime store: dispatches commands,
//! exposes state snapshots and the queries the presentation layer renders
//! from, and drives the checkout return-trip flow.

use std::sync::Arc;

use chrono::NaiveDate;
use studio_core::environment::Clock;
use studio_runtime::{Store, StoreError};
use url::Url;

use crate::engine::{BookingReducer, StudioEnvironment};
use crate::returns::{self, PaymentReturn};
use crate::state::{StudioAction, StudioState};
use crate::types::{Booking, ClassSession, RejectionReason};

/// Store for the studio booking engine
///
/// All mutations flow through [`StudioStore::dispatch`]; queries observe
/// consistent snapshots because dispatches are serialized by the runtime.
pub struct StudioStore {
    inner: Store<StudioState, StudioAction, StudioEnvironment, BookingReducer>,
    clock: Arc<dyn Clock>,
}

impl StudioStore {
    /// Creates a store over seeded engine state
    #[must_use]
    pub fn new(state: StudioState, environment: StudioEnvironment) -> Self {
        let clock = Arc::clone(&environment.clock);
        Self {
            inner: Store::new(state, BookingReducer::new(), environment),
            clock,
        }
    }

    /// Dispatches an action through the reducer
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if effect execution fails.
    pub async fn dispatch(&self, action: StudioAction) -> Result<(), StoreError> {
        self.inner.send(action).await
    }

    /// A snapshot of the current state
    pub async fn state(&self) -> StudioState {
        self.inner.state(Clone::clone).await
    }

    /// Why the most recent command was denied, if it was
    pub async fn last_rejection(&self) -> Option<RejectionReason> {
        self.inner.state(|s| s.last_rejection.clone()).await
    }

    /// Confirmed bookings ordered by session start, soonest first
    pub async fn confirmed_bookings(&self) -> Vec<Booking> {
        self.inner
            .state(|s| s.confirmed_bookings().into_iter().cloned().collect())
            .await
    }

    /// Past bookings (cancelled or attended), most recent action first
    pub async fn booking_history(&self) -> Vec<Booking> {
        self.inner
            .state(|s| s.booking_history().into_iter().cloned().collect())
            .await
    }

    /// Sessions on a given calendar day
    pub async fn classes_for_date(&self, date: NaiveDate) -> Vec<ClassSession> {
        self.inner
            .state(|s| s.classes_for_date(date).into_iter().cloned().collect())
            .await
    }

    /// Whether any entitlement can fund a booking right now
    pub async fn has_available_credit(&self) -> bool {
        let now = self.clock.now();
        self.inner.state(|s| s.has_available_credit(now)).await
    }

    /// Aggregate remaining credits for display (999 per unlimited package)
    pub async fn total_classes_remaining(&self) -> u32 {
        let now = self.clock.now();
        self.inner.state(|s| s.total_classes_remaining(now)).await
    }

    /// Consumes a checkout landing address
    ///
    /// A successful payment return is settled through the engine (at most
    /// once per reference) and the recognized query parameters are stripped
    /// from the address. Any other address is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the settlement dispatch fails.
    pub async fn process_return_url(&self, url: &Url) -> Result<Url, StoreError> {
        match PaymentReturn::from_url(url) {
            Some(payment_return) if payment_return.status.is_success() => {
                self.dispatch(payment_return.into_action()).await?;
                Ok(returns::scrub(url))
            },
            _ => Ok(url.clone()),
        }
    }
}
