//! Checkout return-trip handling.
//!
//! After an external checkout redirect, the user lands back on the app with
//! payment outcome encoded in query parameters. This module turns that
//! surface into a single inbound event for the engine and produces the
//! cleaned address with the recognized parameters stripped.
//!
//! Recognized parameters: `payment` (status flag), `packageId`, and the
//! optional payment references `session_id` and `tx`.

use url::Url;

use crate::state::StudioAction;
use crate::types::{PackageId, PaymentStatus};

/// Query parameter carrying the payment status flag
pub const PARAM_PAYMENT: &str = "payment";

/// Query parameter carrying the package identifier
pub const PARAM_PACKAGE_ID: &str = "packageId";

/// Query parameter carrying the checkout session reference
pub const PARAM_SESSION_ID: &str = "session_id";

/// Query parameter carrying the transaction reference
pub const PARAM_TX: &str = "tx";

const RECOGNIZED_PARAMS: [&str; 4] = [PARAM_PAYMENT, PARAM_PACKAGE_ID, PARAM_SESSION_ID, PARAM_TX];

/// The idempotency marker recorded once a payment reference is settled
#[must_use]
pub fn processed_marker(reference: &str) -> String {
    format!("processed:{reference}")
}

/// A payment return trip decoded from the landing address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentReturn {
    /// Status flag reported by the checkout
    pub status: PaymentStatus,
    /// Package the payment was for
    pub package_id: PackageId,
    /// Unique payment reference: the checkout session id, else the
    /// transaction id, else the package id itself
    pub reference: String,
}

impl PaymentReturn {
    /// Decodes a payment return from a landing URL
    ///
    /// Returns `None` unless both the status flag and a package id are
    /// present; any other address is not a return trip.
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut status = None;
        let mut package_id = None;
        let mut session_id = None;
        let mut tx = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                PARAM_PAYMENT => status = Some(PaymentStatus::parse(&value)),
                PARAM_PACKAGE_ID => package_id = Some(value.into_owned()),
                PARAM_SESSION_ID => session_id = Some(value.into_owned()),
                PARAM_TX => tx = Some(value.into_owned()),
                _ => {},
            }
        }

        let status = status?;
        let package_id = package_id?;
        let reference = session_id.or(tx).unwrap_or_else(|| package_id.clone());

        Some(Self {
            status,
            package_id: PackageId::new(package_id),
            reference,
        })
    }

    /// The engine command settling this return
    #[must_use]
    pub fn into_action(self) -> StudioAction {
        StudioAction::CompletePayment {
            reference: self.reference,
            package_id: self.package_id,
            status: self.status,
        }
    }
}

/// Strips the recognized payment parameters from an address, preserving
/// every other query parameter and the fragment
///
/// The cleaned address is the only externally observable artifact of the
/// return flow.
#[must_use]
pub fn scrub(url: &Url) -> Url {
    let mut cleaned = url.clone();

    let remaining: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !RECOGNIZED_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if remaining.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned
            .query_pairs_mut()
            .clear()
            .extend_pairs(remaining)
            .finish();
    }

    cleaned
}
