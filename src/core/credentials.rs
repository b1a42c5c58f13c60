//! Durable credential storage backends
//!
//! The session token is persisted as a single key-value entry under a fixed
//! key. Three backends are available:
//! - [`KeyringBackend`] - system keyring (macOS Keychain, Linux Secret Service)
//! - [`FileBackend`] - JSON file in the config directory
//! - [`MemoryBackend`] - process memory, for tests and throwaway sessions
//!
//! Backends know nothing about caching; [`SessionStore`](crate::core::SessionStore)
//! owns the in-memory copy.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use keyring::Entry;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{FuelLogError, Result};

const SERVICE_NAME: &str = "fuel-log";

/// Fixed storage key for the bearer token
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Durable storage for the session token
#[cfg_attr(test, mockall::automock)]
pub trait CredentialBackend: Send + Sync {
    /// Read the stored token, `None` if nothing is stored
    fn load(&self) -> Result<Option<SecretString>>;

    /// Persist the token, replacing any previous value
    fn store(&self, token: &str) -> Result<()>;

    /// Remove the stored token. Removing a missing token is not an error.
    fn clear(&self) -> Result<()>;

    /// Short name for status output
    fn name(&self) -> &'static str;
}

// ─────────────────────────────────────────────────────────────────────────────
// Keyring
// ─────────────────────────────────────────────────────────────────────────────

/// System keyring backend
#[derive(Debug, Default)]
pub struct KeyringBackend;

impl KeyringBackend {
    /// Create a keyring backend
    pub fn new() -> Self {
        Self
    }

    fn entry() -> Result<Entry> {
        Ok(Entry::new(SERVICE_NAME, AUTH_TOKEN_KEY)?)
    }
}

impl CredentialBackend for KeyringBackend {
    fn load(&self) -> Result<Option<SecretString>> {
        match Self::entry()?.get_password() {
            Ok(password) => Ok(Some(SecretString::from(password))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(FuelLogError::Storage(format!(
                "Cannot access system keychain. Make sure your keyring is unlocked. ({})",
                e
            ))),
        }
    }

    fn store(&self, token: &str) -> Result<()> {
        Self::entry()?.set_password(token)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match Self::entry()?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(FuelLogError::Storage(e.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "keyring"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File
// ─────────────────────────────────────────────────────────────────────────────

/// JSON file backend
///
/// The file holds a flat string map so the fixed key can live alongside
/// other entries without a format change.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Create a file backend at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(storage_io)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            FuelLogError::Storage(format!(
                "Session file '{}' is corrupt: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if map.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(storage_io(e)),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(storage_io)?;
        }

        let contents = serde_json::to_string_pretty(map)
            .map_err(|e| FuelLogError::Storage(e.to_string()))?;

        // Write then rename so a crash never leaves a half-written file
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, contents).map_err(storage_io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&staging).map_err(storage_io)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&staging, perms).map_err(storage_io)?;
        }

        fs::rename(&staging, &self.path).map_err(storage_io)
    }
}

impl CredentialBackend for FileBackend {
    fn load(&self) -> Result<Option<SecretString>> {
        let map = self.read_map()?;
        Ok(map
            .get(AUTH_TOKEN_KEY)
            .filter(|token| !token.is_empty())
            .map(|token| SecretString::from(token.clone())))
    }

    fn store(&self, token: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(AUTH_TOKEN_KEY.to_string(), token.to_string());
        self.write_map(&map)
    }

    fn clear(&self) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(AUTH_TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

fn storage_io(err: std::io::Error) -> FuelLogError {
    FuelLogError::Storage(err.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory
// ─────────────────────────────────────────────────────────────────────────────

/// In-process backend
///
/// Clones share the same slot, which lets a test drop one `SessionStore` and
/// build another over the same storage to simulate a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    /// Create an empty memory backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialBackend for MemoryBackend {
    fn load(&self) -> Result<Option<SecretString>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| FuelLogError::Storage("memory slot poisoned".into()))?;
        Ok(slot.clone().map(SecretString::from))
    }

    fn store(&self, token: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| FuelLogError::Storage("memory slot poisoned".into()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| FuelLogError::Storage("memory slot poisoned".into()))?;
        *slot = None;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Get a masked version of a token for display (shows first 4 and last 4 chars)
pub fn mask_token(token: &SecretString) -> String {
    let chars: Vec<char> = token.expose_secret().chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
