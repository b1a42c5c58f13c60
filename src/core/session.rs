//! Session credential management
//!
//! [`SessionStore`] is the single source of truth for the bearer token. It
//! keeps an in-memory copy in front of a [`CredentialBackend`] so request
//! construction can read the token synchronously.
//!
//! ## Token Priority
//!
//! 1. Override token (`FUEL_LOG_TOKEN`), until the first `set_credential`
//! 2. In-memory cache
//! 3. Durable backend, loaded once and cached for the process lifetime
//!
//! ## Storage failures
//!
//! The first backend failure degrades the store to memory-only. The error is
//! reported to the caller, the in-memory value is still updated, and the
//! backend is not touched again for the rest of the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};

use crate::core::config::{Config, CredentialBackendKind};
use crate::core::credentials::{
    mask_token, CredentialBackend, FileBackend, KeyringBackend, MemoryBackend,
};
use crate::error::{FuelLogError, Result};

/// Environment variable that overrides the stored token
pub const TOKEN_ENV: &str = "FUEL_LOG_TOKEN";

/// File name used by the file backend inside the config directory
const SESSION_FILE: &str = "session.json";

/// Process-wide session state
pub struct SessionStore {
    backend: Box<dyn CredentialBackend>,
    // Option<Option<T>>:
    //   - None = not yet loaded from the backend
    //   - Some(None) = loaded, no credential
    //   - Some(Some(token)) = active credential
    cache: RwLock<Option<Option<SecretString>>>,
    override_token: Option<SecretString>,
    override_suppressed: AtomicBool,
    degraded: AtomicBool,
}

impl SessionStore {
    /// Create a store over the given backend
    pub fn new(backend: Box<dyn CredentialBackend>) -> Self {
        Self {
            backend,
            cache: RwLock::new(None),
            override_token: None,
            override_suppressed: AtomicBool::new(false),
            degraded: AtomicBool::new(false),
        }
    }

    /// Create a store that only lives in process memory
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// Build the store described by the configuration
    ///
    /// Picks up `FUEL_LOG_TOKEN` as an override when it is set and non-empty.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend: Box<dyn CredentialBackend> = match config.credential_backend()? {
            CredentialBackendKind::Keyring => Box::new(KeyringBackend::new()),
            CredentialBackendKind::File => {
                Box::new(FileBackend::new(Config::config_dir()?.join(SESSION_FILE)))
            }
            CredentialBackendKind::Memory => Box::new(MemoryBackend::new()),
        };

        let override_token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from);

        Ok(Self::new(backend).with_override(override_token))
    }

    /// Set a token that takes precedence over stored state
    pub fn with_override(mut self, token: Option<SecretString>) -> Self {
        self.override_token = token;
        self
    }

    /// Set or clear the active credential
    ///
    /// A non-empty token becomes active and is persisted. An empty (or
    /// whitespace-only) token clears both the active credential and the
    /// stored value. Memory is updated before storage, so a failed clear
    /// still stops the old token from being sent.
    pub fn set_credential(&self, token: &str) -> Result<()> {
        // An explicit login or logout always wins over the override
        self.override_suppressed.store(true, Ordering::SeqCst);

        if token.trim().is_empty() {
            self.write_cache(None);

            if self.is_degraded() {
                return Ok(());
            }
            tracing::debug!(backend = self.backend.name(), "clearing stored credential");
            return self.backend.clear().map_err(|e| self.degrade(e));
        }

        self.write_cache(Some(SecretString::from(token.to_string())));

        if self.is_degraded() {
            return Ok(());
        }
        tracing::debug!(backend = self.backend.name(), "persisting credential");
        self.backend.store(token).map_err(|e| self.degrade(e))
    }

    /// Get the active credential
    ///
    /// Loads from the backend on first use. A load failure degrades the
    /// store and is treated as "no credential".
    pub fn get_credential(&self) -> Option<SecretString> {
        if !self.override_suppressed.load(Ordering::SeqCst) {
            if let Some(token) = &self.override_token {
                return Some(token.clone());
            }
        }

        if let Ok(cache) = self.cache.read() {
            if let Some(cached_value) = cache.as_ref() {
                return cached_value.clone();
            }
        }

        let loaded = if self.is_degraded() {
            None
        } else {
            match self.backend.load() {
                Ok(token) => token,
                Err(e) => {
                    let _ = self.degrade(e);
                    None
                }
            }
        };

        match self.cache.write() {
            Ok(mut cache) => {
                // A concurrent set_credential wins over the lazy load
                if cache.is_none() {
                    *cache = Some(loaded);
                }
                cache.clone().flatten()
            }
            Err(_) => loaded,
        }
    }

    /// Get the credential, returning an error if not authenticated
    pub fn require_credential(&self) -> Result<SecretString> {
        self.get_credential().ok_or(FuelLogError::NotAuthenticated)
    }

    /// Check if a credential is active
    pub fn has_credential(&self) -> bool {
        self.get_credential().is_some()
    }

    /// Masked form of the active credential for display
    pub fn masked(&self) -> Option<String> {
        self.get_credential().map(|token| mask_token(&token))
    }

    /// `Authorization` header value for the active credential
    pub fn bearer_header(&self) -> Option<String> {
        self.get_credential()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }

    /// Whether storage failed and the store is running memory-only
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// Name of the durable backend
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn write_cache(&self, value: Option<SecretString>) {
        match self.cache.write() {
            Ok(mut cache) => *cache = Some(value),
            Err(poisoned) => *poisoned.into_inner() = Some(value),
        }
    }

    fn degrade(&self, err: FuelLogError) -> FuelLogError {
        tracing::warn!(
            backend = self.backend.name(),
            error = %err,
            "credential storage failed, continuing with memory-only session"
        );
        self.degraded.store(true, Ordering::SeqCst);
        match err {
            FuelLogError::Storage(_) => err,
            other => FuelLogError::Storage(other.to_string()),
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("backend", &self.backend.name())
            .field("degraded", &self.is_degraded())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::MockCredentialBackend;

    #[test]
    fn test_set_then_get_returns_token() {
        let store = SessionStore::in_memory();
        store.set_credential("abc.def.ghi").unwrap();

        let token = store.get_credential().unwrap();
        assert_eq!(token.expose_secret(), "abc.def.ghi");
        assert_eq!(store.bearer_header().as_deref(), Some("Bearer abc.def.ghi"));
    }

    #[test]
    fn test_empty_token_clears() {
        let store = SessionStore::in_memory();
        store.set_credential("abc").unwrap();
        store.set_credential("").unwrap();

        assert!(store.get_credential().is_none());
        assert!(store.bearer_header().is_none());
        assert!(matches!(
            store.require_credential(),
            Err(FuelLogError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_lazy_load_happens_once() {
        let mut backend = MockCredentialBackend::new();
        backend
            .expect_load()
            .times(1)
            .returning(|| Ok(Some(SecretString::from("persisted"))));
        backend.expect_name().return_const("mock");

        let store = SessionStore::new(Box::new(backend));
        assert_eq!(store.get_credential().unwrap().expose_secret(), "persisted");
        assert_eq!(store.get_credential().unwrap().expose_secret(), "persisted");
    }

    #[test]
    fn test_restart_reloads_persisted_token() {
        let storage = MemoryBackend::new();

        let first = SessionStore::new(Box::new(storage.clone()));
        first.set_credential("survives-restart").unwrap();
        drop(first);

        let second = SessionStore::new(Box::new(storage));
        assert_eq!(
            second.get_credential().unwrap().expose_secret(),
            "survives-restart"
        );
    }

    #[test]
    fn test_store_failure_keeps_memory_and_degrades() {
        let mut backend = MockCredentialBackend::new();
        backend
            .expect_store()
            .times(1)
            .returning(|_| Err(FuelLogError::Storage("keychain locked".into())));
        backend.expect_clear().never();
        backend.expect_load().never();
        backend.expect_name().return_const("mock");

        let store = SessionStore::new(Box::new(backend));
        let result = store.set_credential("fresh");
        assert!(matches!(result, Err(FuelLogError::Storage(_))));
        assert!(store.is_degraded());
        assert_eq!(store.get_credential().unwrap().expose_secret(), "fresh");

        // Memory-only from here on: the backend is not touched again
        store.set_credential("").unwrap();
        assert!(store.get_credential().is_none());
    }

    #[test]
    fn test_clear_failure_never_leaves_stale_token() {
        let mut backend = MockCredentialBackend::new();
        backend.expect_store().returning(|_| Ok(()));
        backend
            .expect_clear()
            .returning(|| Err(FuelLogError::Storage("delete failed".into())));
        backend.expect_name().return_const("mock");

        let store = SessionStore::new(Box::new(backend));
        store.set_credential("old").unwrap();

        assert!(store.set_credential("").is_err());
        assert!(store.get_credential().is_none());
    }

    #[test]
    fn test_load_failure_is_unauthenticated() {
        let mut backend = MockCredentialBackend::new();
        backend
            .expect_load()
            .times(1)
            .returning(|| Err(FuelLogError::Storage("no secret service".into())));
        backend.expect_name().return_const("mock");

        let store = SessionStore::new(Box::new(backend));
        assert!(store.get_credential().is_none());
        assert!(store.is_degraded());
        assert!(store.get_credential().is_none());
    }

    #[test]
    fn test_override_until_logout() {
        let store =
            SessionStore::in_memory().with_override(Some(SecretString::from("from-env")));
        assert_eq!(store.get_credential().unwrap().expose_secret(), "from-env");

        store.set_credential("").unwrap();
        assert!(store.get_credential().is_none());
    }

    #[test]
    fn test_masked() {
        let store = SessionStore::in_memory();
        assert!(store.masked().is_none());
        store.set_credential("0123456789abcdef").unwrap();
        assert_eq!(store.masked().as_deref(), Some("0123...cdef"));
    }
}
