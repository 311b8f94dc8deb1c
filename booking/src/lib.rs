//! # Studio Booking
//!
//! Booking-management core for a boutique fitness studio: class sessions,
//! package entitlements, and bookings, under capacity limits, credit
//! consumption, and a 12-hour cancellation/move policy.
//!
//! The engine is a pure reducer over [`state::StudioState`]: commands
//! validate fully, then apply a single event, so every operation is atomic
//! and a denied command changes nothing but the typed rejection. External
//! collaborators stay at the boundary: the catalog provider seeds sessions
//! and packages, and the checkout gateway only resolves redirect URLs.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use studio_booking::catalog::Catalog;
//! use studio_booking::engine::StudioEnvironment;
//! use studio_booking::state::{StudioAction, StudioState};
//! use studio_booking::store::StudioStore;
//! use studio_booking::types::{User, UserId};
//! use studio_core::environment::{Clock, SystemClock};
//!
//! # async fn example() -> Result<(), studio_runtime::StoreError> {
//! let clock = Arc::new(SystemClock);
//! let catalog = Catalog::standard();
//! let sessions = catalog.generate_sessions(clock.now().date_naive(), 14);
//! let user = User {
//!     id: UserId::new("user-1"),
//!     name: "Maya Quintero".to_string(),
//!     email: "maya@example.com".to_string(),
//!     phone: None,
//!     active_packages: Vec::new(),
//! };
//!
//! let mut state = StudioState::new(catalog, sessions, user);
//! state.grant_starter_package(clock.now());
//!
//! let store = StudioStore::new(state, StudioEnvironment::new(clock));
//! let session_id = store.state().await.registry.sessions()[0].id.clone();
//! store.dispatch(StudioAction::BookClass { session_id }).await?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod checkout;
pub mod engine;
pub mod ledger;
pub mod registry;
pub mod returns;
pub mod state;
pub mod store;
pub mod types;

pub use engine::{BookingReducer, CANCELLATION_WINDOW_HOURS, StudioEnvironment};
pub use state::{StudioAction, StudioState};
pub use store::StudioStore;
