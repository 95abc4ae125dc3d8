//! Credential lookup for switch requests
//!
//! The bearer token lives in a cookie set by the login flow. Lookup is
//! injected through [`CredentialProvider`] so tests can supply fixed values,
//! and it is partial: a missing cookie is `None`, never a panic.

pub mod cookie;

pub use cookie::{CookieCredentials, CookieSource};

/// Token plus the cookies that accompany it on same-origin requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Sent as `Authorization: Bearer <token>`
    pub token: String,
    /// Sent verbatim as the `Cookie` header
    pub cookie_header: String,
}

/// Source of the credential attached to every switch request.
///
/// Implementations are queried once per change event and must not cache.
pub trait CredentialProvider: Send + Sync + 'static {
    fn credential(&self) -> Option<Credential>;

    /// Name of the cookie the token is read from, used in error reports
    fn cookie_name(&self) -> &str;
}
