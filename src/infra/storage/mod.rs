//! Access-token storage.
//!
//! [`TokenProvider`] is the read-only view the HTTP wrapper consumes.
//! [`MemoryTokenStore`] keeps the token in process memory.
//! [`FileTokenStore`] persists it in a JSON key/value file, the way a browser
//! keeps it in `localStorage`.

mod file;
mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

use std::sync::Arc;

/// Key the access token is stored under.
pub const ACCESS_TOKEN_KEY: &str = "AccessToken";

/// Supplies the current access token, if any.
///
/// Called once per outgoing request; implementations must not cache a value
/// the underlying storage may have changed since.
pub trait TokenProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    fn current_token(&self) -> Option<String> {
        (**self).current_token()
    }
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_token(&self) -> Option<String> {
        self()
    }
}

/// Provider for clients that never authenticate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoToken;

impl TokenProvider for NoToken {
    fn current_token(&self) -> Option<String> {
        None
    }
}

/// Empty strings count as "no token".
pub(crate) fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}
