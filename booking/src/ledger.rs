//! Entitlement ledger.
//!
//! Owns the `UserPackage` records and is the only writer of their credit
//! counters. Usability is always evaluated against a caller-supplied "now";
//! nothing here flips `is_active` when a package expires.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::UNLIMITED_CLASS_COUNT;
use crate::types::{UserPackage, UserPackageId};

/// Owns entitlement records and computes aggregate availability
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementLedger {
    packages: Vec<UserPackage>,
}

impl EntitlementLedger {
    /// Creates an empty ledger
    #[must_use]
    pub const fn new() -> Self {
        Self {
            packages: Vec::new(),
        }
    }

    /// All entitlements, in insertion (purchase) order
    #[must_use]
    pub fn packages(&self) -> &[UserPackage] {
        &self.packages
    }

    /// Looks up an entitlement by id
    #[must_use]
    pub fn get(&self, id: &UserPackageId) -> Option<&UserPackage> {
        self.packages.iter().find(|p| &p.id == id)
    }

    /// Appends a freshly allocated entitlement
    pub fn insert(&mut self, entitlement: UserPackage) {
        self.packages.push(entitlement);
    }

    /// Whether any entitlement can fund a booking at `now`
    #[must_use]
    pub fn has_available_credit(&self, now: DateTime<Utc>) -> bool {
        self.packages.iter().any(|p| p.is_usable(now))
    }

    /// Aggregate remaining credits for display
    ///
    /// Unlimited packages contribute [`UNLIMITED_CLASS_COUNT`] each to
    /// signal "effectively unlimited" - a display convenience, not a true
    /// count.
    #[must_use]
    pub fn total_remaining(&self, now: DateTime<Utc>) -> u32 {
        self.packages
            .iter()
            .filter(|p| p.is_active && now < p.expiry_date)
            .map(|p| {
                if p.package.is_unlimited {
                    UNLIMITED_CLASS_COUNT
                } else {
                    p.classes_remaining
                }
            })
            .sum()
    }

    /// The first usable entitlement in insertion order, if any
    ///
    /// No priority between multiple usable packages is applied.
    #[must_use]
    pub fn find_consumable(&self, now: DateTime<Utc>) -> Option<&UserPackage> {
        self.packages.iter().find(|p| p.is_usable(now))
    }

    /// Consumes one credit from a non-unlimited entitlement
    ///
    /// Unlimited packages are never debited; their credit count is not
    /// tracked. Unknown ids are a no-op.
    pub fn debit(&mut self, id: &UserPackageId) {
        if let Some(entitlement) = self.packages.iter_mut().find(|p| &p.id == id) {
            if !entitlement.package.is_unlimited {
                entitlement.classes_remaining = entitlement.classes_remaining.saturating_sub(1);
                entitlement.classes_used += 1;
            }
        }
    }

    /// Returns one credit to a non-unlimited entitlement
    ///
    /// The floor at zero used classes holds the conservation invariant if
    /// credited more than debited. Unknown ids are a no-op.
    pub fn credit(&mut self, id: &UserPackageId) {
        if let Some(entitlement) = self.packages.iter_mut().find(|p| &p.id == id) {
            if !entitlement.package.is_unlimited {
                entitlement.classes_remaining += 1;
                entitlement.classes_used = entitlement.classes_used.saturating_sub(1);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::types::{PackageId, UserId};
    use chrono::Duration;

    fn ledger_with(package_slug: &str, now: DateTime<Utc>) -> (EntitlementLedger, UserPackageId) {
        let catalog = Catalog::standard();
        let package = catalog
            .find_package(&PackageId::new(package_slug))
            .unwrap()
            .clone();
        let entitlement =
            UserPackage::allocate(UserPackageId::new(), UserId::new("user-1"), &package, now);
        let id = entitlement.id.clone();
        let mut ledger = EntitlementLedger::new();
        ledger.insert(entitlement);
        (ledger, id)
    }

    #[test]
    fn debit_and_credit_conserve_class_count() {
        let now = Utc::now();
        let (mut ledger, id) = ledger_with("pack-5", now);

        ledger.debit(&id);
        ledger.debit(&id);
        let entitlement = ledger.get(&id).unwrap();
        assert_eq!(entitlement.classes_remaining, 3);
        assert_eq!(entitlement.classes_used, 2);

        ledger.credit(&id);
        let entitlement = ledger.get(&id).unwrap();
        assert_eq!(entitlement.classes_remaining, 4);
        assert_eq!(entitlement.classes_used, 1);
        assert_eq!(
            entitlement.classes_remaining + entitlement.classes_used,
            entitlement.package.class_count
        );
    }

    #[test]
    fn credit_floors_used_at_zero() {
        let now = Utc::now();
        let (mut ledger, id) = ledger_with("pack-5", now);

        ledger.credit(&id);
        let entitlement = ledger.get(&id).unwrap();
        assert_eq!(entitlement.classes_used, 0);
        assert_eq!(entitlement.classes_remaining, 6);
    }

    #[test]
    fn unlimited_is_never_debited() {
        let now = Utc::now();
        let (mut ledger, id) = ledger_with("monthly-unlimited", now);

        ledger.debit(&id);
        let entitlement = ledger.get(&id).unwrap();
        assert_eq!(entitlement.classes_remaining, UNLIMITED_CLASS_COUNT);
        assert_eq!(entitlement.classes_used, 0);
    }

    #[test]
    fn expired_packages_are_not_consumable() {
        let now = Utc::now();
        let (ledger, _) = ledger_with("pack-5", now);

        assert!(ledger.has_available_credit(now));
        let later = now + Duration::days(61);
        assert!(!ledger.has_available_credit(later));
        assert!(ledger.find_consumable(later).is_none());
    }

    #[test]
    fn find_consumable_prefers_insertion_order() {
        let now = Utc::now();
        let (mut ledger, first_id) = ledger_with("pack-5", now);
        let catalog = Catalog::standard();
        let second = UserPackage::allocate(
            UserPackageId::new(),
            UserId::new("user-1"),
            catalog.find_package(&PackageId::new("pack-10")).unwrap(),
            now,
        );
        ledger.insert(second);

        assert_eq!(ledger.find_consumable(now).unwrap().id, first_id);
    }

    #[test]
    fn total_remaining_uses_unlimited_sentinel() {
        let now = Utc::now();
        let (mut ledger, id) = ledger_with("pack-5", now);
        let catalog = Catalog::standard();
        let unlimited = UserPackage::allocate(
            UserPackageId::new(),
            UserId::new("user-1"),
            catalog
                .find_package(&PackageId::new("monthly-unlimited"))
                .unwrap(),
            now,
        );
        ledger.insert(unlimited);
        ledger.debit(&id);

        assert_eq!(ledger.total_remaining(now), 4 + UNLIMITED_CLASS_COUNT);
    }

    #[test]
    fn zero_credit_package_still_counts_toward_total() {
        let now = Utc::now();
        let (mut ledger, id) = ledger_with("pack-5", now);
        for _ in 0..5 {
            ledger.debit(&id);
        }

        assert_eq!(ledger.total_remaining(now), 0);
        assert!(!ledger.has_available_credit(now));
    }
}
