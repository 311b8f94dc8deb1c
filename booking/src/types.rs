//! Domain types for the studio booking engine.
//!
//! Sessions, packages, entitlements, and bookings, plus the action and
//! rejection vocabulary the booking reducer operates on. Catalog-scoped
//! identifiers (sessions, packages, class types, instructors, users) are
//! string slugs supplied by the catalog provider; engine-generated
//! identifiers (bookings, entitlements) are UUIDs.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a class session, assigned by the catalog provider
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a `SessionId` from a catalog slug
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a catalog package
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId(String);

impl PackageId {
    /// Creates a `PackageId` from a catalog slug
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a class type
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassTypeId(String);

impl ClassTypeId {
    /// Creates a `ClassTypeId` from a catalog slug
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClassTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an instructor
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructorId(String);

impl InstructorId {
    /// Creates an `InstructorId` from a catalog slug
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstructorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a `UserId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `BookingId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a purchased entitlement
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserPackageId(Uuid);

impl UserPackageId {
    /// Creates a new random `UserPackageId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `UserPackageId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserPackageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserPackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Money amount in cents (avoids floating point issues)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Creates a new `Money` amount from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Creates a `Money` amount from whole dollars
    #[must_use]
    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars * 100)
    }

    /// Checks if this amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A kind of class offered by the studio (catalog, immutable)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassType {
    /// Class type identifier
    pub id: ClassTypeId,
    /// Display name
    pub name: String,
    /// Class duration in minutes
    pub duration_minutes: u32,
    /// Short description
    pub description: String,
    /// Display color (hex)
    pub color: String,
}

/// An instructor (catalog, immutable)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    /// Instructor identifier
    pub id: InstructorId,
    /// Display name
    pub name: String,
    /// Optional portrait path
    pub image: Option<String>,
}

/// A purchasable credit package (catalog, immutable)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package identifier
    pub id: PackageId,
    /// Display name
    pub name: String,
    /// Short description
    pub description: String,
    /// Credits granted (display sentinel for unlimited packages)
    pub class_count: u32,
    /// Purchase price
    pub price: Money,
    /// Days until a purchased instance expires
    pub validity_days: i64,
    /// Whether this is a first-time-customer offer
    pub is_intro_offer: bool,
    /// Whether this is a monthly membership
    pub is_monthly: bool,
    /// Whether credits are unlimited during the validity period
    pub is_unlimited: bool,
    /// Whether to highlight this package
    pub popular: bool,
}

/// A single scheduled class occurrence
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    /// Session identifier
    pub id: SessionId,
    /// The class type being taught
    pub class_type_id: ClassTypeId,
    /// The instructor teaching
    pub instructor_id: InstructorId,
    /// Calendar day
    pub date: NaiveDate,
    /// Wall-clock start time (same day)
    pub start_time: NaiveTime,
    /// Wall-clock end time (same day)
    pub end_time: NaiveTime,
    /// Maximum number of attendees
    pub max_capacity: u32,
    /// Current number of booked attendees, in `0..=max_capacity`
    pub booked_count: u32,
    /// Derived: `booked_count >= max_capacity`
    pub is_full: bool,
}

impl ClassSession {
    /// Creates a new session with a derived `is_full` flag
    #[must_use]
    pub fn new(
        id: SessionId,
        class_type_id: ClassTypeId,
        instructor_id: InstructorId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        max_capacity: u32,
        booked_count: u32,
    ) -> Self {
        Self {
            id,
            class_type_id,
            instructor_id,
            date,
            start_time,
            end_time,
            max_capacity,
            booked_count,
            is_full: booked_count >= max_capacity,
        }
    }

    /// The session start as a UTC instant (calendar day + wall-clock start)
    #[must_use]
    pub const fn starts_at(&self) -> DateTime<Utc> {
        self.date.and_time(self.start_time).and_utc()
    }

    /// Seats still available
    #[must_use]
    pub const fn remaining_capacity(&self) -> u32 {
        self.max_capacity.saturating_sub(self.booked_count)
    }
}

/// An immutable point-in-time copy of a session, captured when the owning
/// booking was last mutated
///
/// Live session data should be read through the registry; the snapshot
/// exists for the cancellation-window check and for history display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The snapshotted session
    pub session_id: SessionId,
    /// Calendar day at capture
    pub date: NaiveDate,
    /// Wall-clock start time at capture
    pub start_time: NaiveTime,
    /// Wall-clock end time at capture
    pub end_time: NaiveTime,
    /// Occupancy at capture
    pub booked_count: u32,
    /// Capacity at capture
    pub max_capacity: u32,
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Captures a snapshot of `session` at `taken_at`
    #[must_use]
    pub fn of(session: &ClassSession, taken_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session.id.clone(),
            date: session.date,
            start_time: session.start_time,
            end_time: session.end_time,
            booked_count: session.booked_count,
            max_capacity: session.max_capacity,
            taken_at,
        }
    }

    /// The snapshotted session start as a UTC instant
    #[must_use]
    pub const fn starts_at(&self) -> DateTime<Utc> {
        self.date.and_time(self.start_time).and_utc()
    }

    /// Hours between `now` and the snapshotted session start; negative once
    /// the session has started
    #[must_use]
    pub fn hours_until_start(&self, now: DateTime<Utc>) -> i64 {
        (self.starts_at() - now).num_hours()
    }
}

/// Lifecycle status of a booking
///
/// `Attended` is reachable data but no engine operation transitions into it;
/// attendance marking belongs to an external process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    /// The booking holds a seat
    Confirmed,
    /// The booking was cancelled and its seat released
    Cancelled,
    /// The user attended the class
    Attended,
}

/// A user's claim on one session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking identifier
    pub id: BookingId,
    /// Owner
    pub user_id: UserId,
    /// The session currently reserved
    pub session_id: SessionId,
    /// When the booking was made (re-stamped on move)
    pub booked_at: DateTime<Utc>,
    /// Lifecycle status
    pub status: BookingStatus,
    /// The entitlement debited at creation; `None` when an unlimited
    /// package funded the booking
    pub funded_by: Option<UserPackageId>,
    /// Session snapshot at the booking's own last mutation
    pub session: SessionSnapshot,
}

/// An owned instance of a catalog package with its own credit and expiry
/// tracking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPackage {
    /// Entitlement identifier
    pub id: UserPackageId,
    /// Owner
    pub user_id: UserId,
    /// The catalog package purchased
    pub package_id: PackageId,
    /// When the entitlement was purchased
    pub purchase_date: DateTime<Utc>,
    /// `purchase_date + package.validity_days`
    pub expiry_date: DateTime<Utc>,
    /// Credits left (meaningless for unlimited packages)
    pub classes_remaining: u32,
    /// Credits consumed
    pub classes_used: u32,
    /// Active flag; expiry is evaluated against "now" at query time, never
    /// auto-flipped here
    pub is_active: bool,
    /// Immutable copy of the catalog package definition
    pub package: Package,
}

impl UserPackage {
    /// Allocates a fresh entitlement for `package`, expiring
    /// `package.validity_days` after `now`
    #[must_use]
    pub fn allocate(
        id: UserPackageId,
        user_id: UserId,
        package: &Package,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            package_id: package.id.clone(),
            purchase_date: now,
            expiry_date: now + Duration::days(package.validity_days),
            classes_remaining: package.class_count,
            classes_used: 0,
            is_active: true,
            package: package.clone(),
        }
    }

    /// Whether this entitlement can fund a booking at `now`: active,
    /// unexpired, and holding credit (or unlimited)
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && now < self.expiry_date
            && (self.classes_remaining > 0 || self.package.is_unlimited)
    }
}

/// The signed-in user
///
/// The entitlement ledger owns the `UserPackage` records; the user carries
/// only the ids of the entitlements purchased.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Optional contact phone
    pub phone: Option<String>,
    /// Entitlements purchased, in purchase order
    pub active_packages: Vec<UserPackageId>,
}

/// Payment status signaled by the checkout return trip
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// The checkout reported a completed payment
    Success,
    /// Any other status flag value, carried verbatim
    Other(String),
}

impl PaymentStatus {
    /// Parses the `payment` query-parameter value
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == "success" {
            Self::Success
        } else {
            Self::Other(value.to_string())
        }
    }

    /// Whether the status indicates a completed payment
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Why a command was denied
///
/// Every failure mode of the engine is a recoverable, expected outcome
/// reported through this type - never a fault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The requested session does not exist
    SessionNotFound,
    /// The requested session is at capacity
    SessionFull,
    /// A confirmed booking already exists for this user and session
    DuplicateBooking,
    /// No usable entitlement can fund the booking
    NoUsableCredit,
    /// The requested booking does not exist
    BookingNotFound,
    /// The booking is not in the confirmed state
    BookingNotConfirmed,
    /// The session starts in under the cancellation window
    CancellationWindowClosed,
    /// A move targeted the booking's current session
    SameSession,
    /// The requested package is not in the catalog
    UnknownPackage,
    /// The payment return did not signal success
    PaymentIncomplete,
    /// The payment reference was already settled
    PaymentAlreadyProcessed,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::SessionNotFound => "session not found",
            Self::SessionFull => "session is fully booked",
            Self::DuplicateBooking => "already booked on this session",
            Self::NoUsableCredit => "no usable class credit",
            Self::BookingNotFound => "booking not found",
            Self::BookingNotConfirmed => "booking is not confirmed",
            Self::CancellationWindowClosed => {
                "sessions can only be changed 12 or more hours before start"
            },
            Self::SameSession => "booking already references this session",
            Self::UnknownPackage => "package not found in the catalog",
            Self::PaymentIncomplete => "payment was not completed",
            Self::PaymentAlreadyProcessed => "payment reference already settled",
        };
        write!(f, "{message}")
    }
}
