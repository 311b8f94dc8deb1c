//! Checkout gateway boundary.
//!
//! The engine never processes payments; it only resolves where to send the
//! user. A gateway maps a package id to an externally hosted checkout URL,
//! with a configurable default for packages without a dedicated page. An
//! unresolvable URL is the one true configuration error in the system and is
//! surfaced without crashing the flow.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::PackageId;

/// Environment variable prefix for per-package checkout URLs
///
/// The package id is uppercased with dashes replaced by underscores, e.g.
/// `STUDIO_CHECKOUT_URL_MONTHLY_UNLIMITED` for `monthly-unlimited`.
pub const CHECKOUT_URL_PREFIX: &str = "STUDIO_CHECKOUT_URL_";

/// Environment variable holding the fallback checkout URL
pub const CHECKOUT_URL_DEFAULT: &str = "STUDIO_CHECKOUT_URL_DEFAULT";

/// Checkout resolution error
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum CheckoutError {
    /// Neither a per-package URL nor a default is configured
    #[error("checkout is not configured for package `{0}`")]
    NotConfigured(PackageId),
}

/// Maps a package to an external checkout URL
///
/// Abstraction over hosted checkout pages (Stripe payment links and the
/// like). `None` signals "checkout not configured", which callers must
/// surface as a user-visible, non-fatal error rather than redirecting.
pub trait CheckoutGateway: Send + Sync {
    /// Resolves the checkout URL for a package
    fn resolve_checkout_url(&self, package_id: &PackageId) -> Option<String>;
}

/// Resolves a checkout redirect, turning an unconfigured gateway into a
/// typed error
///
/// # Errors
///
/// Returns [`CheckoutError::NotConfigured`] when the gateway has no URL for
/// the package and no default.
pub fn checkout_redirect(
    gateway: &dyn CheckoutGateway,
    package_id: &PackageId,
) -> Result<String, CheckoutError> {
    gateway
        .resolve_checkout_url(package_id)
        .ok_or_else(|| CheckoutError::NotConfigured(package_id.clone()))
}

/// Gateway configured from environment variables
///
/// Reads `STUDIO_CHECKOUT_URL_<PACKAGE-ID>` per package and
/// `STUDIO_CHECKOUT_URL_DEFAULT` as the fallback.
#[derive(Clone, Debug, Default)]
pub struct EnvCheckoutGateway {
    urls: HashMap<PackageId, String>,
    default_url: Option<String>,
}

impl EnvCheckoutGateway {
    /// Loads checkout configuration from the process environment
    ///
    /// A `.env` file is honored when present.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut urls = HashMap::new();
        let mut default_url = None;

        for (key, value) in std::env::vars() {
            if key == CHECKOUT_URL_DEFAULT {
                default_url = Some(value);
            } else if let Some(suffix) = key.strip_prefix(CHECKOUT_URL_PREFIX) {
                urls.insert(package_id_from_env_suffix(suffix), value);
            }
        }

        Self { urls, default_url }
    }
}

impl CheckoutGateway for EnvCheckoutGateway {
    fn resolve_checkout_url(&self, package_id: &PackageId) -> Option<String> {
        self.urls
            .get(package_id)
            .or(self.default_url.as_ref())
            .cloned()
    }
}

/// Converts an environment variable suffix back into a package id slug
/// (`MONTHLY_UNLIMITED` → `monthly-unlimited`)
fn package_id_from_env_suffix(suffix: &str) -> PackageId {
    PackageId::new(suffix.to_lowercase().replace('_', "-"))
}

/// Fixed-table gateway for tests and development
#[derive(Clone, Debug, Default)]
pub struct StaticCheckoutGateway {
    urls: HashMap<PackageId, String>,
    default_url: Option<String>,
}

impl StaticCheckoutGateway {
    /// Creates an empty gateway (every resolution fails)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a per-package checkout URL
    #[must_use]
    pub fn with_url(mut self, package_id: PackageId, url: impl Into<String>) -> Self {
        self.urls.insert(package_id, url.into());
        self
    }

    /// Sets the fallback checkout URL
    #[must_use]
    pub fn with_default(mut self, url: impl Into<String>) -> Self {
        self.default_url = Some(url.into());
        self
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(self) -> Arc<dyn CheckoutGateway> {
        Arc::new(self)
    }
}

impl CheckoutGateway for StaticCheckoutGateway {
    fn resolve_checkout_url(&self, package_id: &PackageId) -> Option<String> {
        self.urls
            .get(package_id)
            .or(self.default_url.as_ref())
            .cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn static_gateway_resolves_per_package_url() {
        let gateway = StaticCheckoutGateway::new()
            .with_url(PackageId::new("pack-5"), "https://pay.example/p5")
            .with_default("https://pay.example/any");

        assert_eq!(
            gateway.resolve_checkout_url(&PackageId::new("pack-5")),
            Some("https://pay.example/p5".to_string())
        );
    }

    #[test]
    fn static_gateway_falls_back_to_default() {
        let gateway =
            StaticCheckoutGateway::new().with_default("https://pay.example/any");

        assert_eq!(
            gateway.resolve_checkout_url(&PackageId::new("pack-10")),
            Some("https://pay.example/any".to_string())
        );
    }

    #[test]
    fn unconfigured_gateway_is_a_typed_error() {
        let gateway = StaticCheckoutGateway::new();

        assert_eq!(
            checkout_redirect(&gateway, &PackageId::new("pack-10")),
            Err(CheckoutError::NotConfigured(PackageId::new("pack-10")))
        );
    }

    #[test]
    fn env_suffix_maps_back_to_slug() {
        assert_eq!(
            package_id_from_env_suffix("MONTHLY_UNLIMITED"),
            PackageId::new("monthly-unlimited")
        );
        assert_eq!(
            package_id_from_env_suffix("PACK_5"),
            PackageId::new("pack-5")
        );
    }
}
