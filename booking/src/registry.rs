//! Session registry.
//!
//! Owns the `ClassSession` records and their occupancy. The registry never
//! creates or deletes sessions after construction; the catalog provider
//! seeds it and the booking engine is its only writer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{ClassSession, SessionId};

/// Owns session records and tracks capacity and occupancy
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRegistry {
    sessions: Vec<ClassSession>,
}

impl SessionRegistry {
    /// Creates a registry over the catalog-provided calendar
    #[must_use]
    pub const fn new(sessions: Vec<ClassSession>) -> Self {
        Self { sessions }
    }

    /// Looks up a session by id
    #[must_use]
    pub fn find(&self, id: &SessionId) -> Option<&ClassSession> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    /// All sessions, in calendar order
    #[must_use]
    pub fn sessions(&self) -> &[ClassSession] {
        &self.sessions
    }

    /// Sessions on a given calendar day
    #[must_use]
    pub fn for_date(&self, date: NaiveDate) -> Vec<&ClassSession> {
        self.sessions.iter().filter(|s| s.date == date).collect()
    }

    /// Number of sessions held
    #[must_use]
    pub const fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the registry holds no sessions
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Adjusts a session's occupancy by `delta`, saturating at
    /// `[0, max_capacity]`, and recomputes `is_full`
    ///
    /// The engine is expected never to call this out of range; the clamp
    /// holds the capacity invariant regardless and never reports an error.
    /// Returns the updated session, or `None` (no-op) for an unknown id.
    pub fn adjust_occupancy(&mut self, id: &SessionId, delta: i64) -> Option<ClassSession> {
        let session = self.sessions.iter_mut().find(|s| &s.id == id)?;

        let requested = i64::from(session.booked_count) + delta;
        let next = requested.clamp(0, i64::from(session.max_capacity));
        if next != requested {
            tracing::warn!(
                session = %session.id,
                requested,
                clamped = next,
                "occupancy adjustment saturated"
            );
        }

        // Within [0, u32::MAX] after the clamp
        session.booked_count = u32::try_from(next).unwrap_or(0);
        session.is_full = session.booked_count >= session.max_capacity;

        Some(session.clone())
    }
}
