use std::sync::RwLock;

use super::{TokenProvider, non_empty};

/// In-process token store. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl TokenProvider for MemoryTokenStore {
    fn current_token(&self) -> Option<String> {
        let token = self.token.read().unwrap_or_else(|e| e.into_inner()).clone();
        non_empty(token)
    }
}
