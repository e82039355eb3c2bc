//! The state store.
//!
//! Entries live at `<base>/<namespace>/<key>.json` (or `.enc` when
//! encrypted), with every path component sanitized to `[A-Za-z0-9_-]`.
//! Writes go to the in-memory mirror first, then to disk via a temp-file
//! rename; reads prefer the mirror and fall back to disk. Expiration is
//! checked lazily on every read path — `clear_expired` is the only
//! compaction entry point.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use snapper_core::{SnappId, now_millis};

use crate::change::{ChangeEvent, ChangeListenerId, ChangeListeners};
use crate::cipher::StateCipher;
use crate::entry::{ENTRY_FORMAT_VERSION, StateEntry};
use crate::error::{StateError, StateResult};

/// Extension for plaintext entries.
const EXT_PLAIN: &str = "json";
/// Extension for encrypted entries.
const EXT_ENCRYPTED: &str = "enc";

/// Resolve the default state base directory,
/// `$HOME/.openclaw/snapper-state`.
///
/// The core owns no environment variables of its own; hosts that want a
/// different base pass it to [`StateStore::new`] directly.
///
/// # Errors
///
/// Returns an error if `$HOME` is not set.
pub fn default_state_dir() -> std::io::Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "$HOME is not set")
    })?;
    Ok(PathBuf::from(home).join(".openclaw").join("snapper-state"))
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
///
/// Lossy; colliding keys overwrite each other, which is accepted because
/// SnApps are expected to use sane keys.
fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Options for [`StateStore::persist`].
#[derive(Debug, Clone, Default)]
pub struct PersistOptions {
    /// Override the namespace (defaults to the writing SnApp's id).
    pub namespace: Option<String>,
    /// Time to live; the entry expires this long after creation.
    pub ttl: Option<Duration>,
    /// Pipe the serialized entry through the configured cipher.
    pub encrypted: bool,
    /// Emit a change event to listeners before returning.
    pub sync: bool,
}

impl PersistOptions {
    /// Write into an explicit namespace.
    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Expire the entry after `ttl`.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Request encryption.
    #[must_use]
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    /// Notify change listeners on completion.
    #[must_use]
    pub fn synchronized(mut self) -> Self {
        self.sync = true;
        self
    }
}

/// Aggregate statistics over a namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateStats {
    /// Number of live (non-expired) entries.
    pub total_entries: usize,
    /// Total on-disk size of live entries, in bytes.
    pub total_size: u64,
    /// Entries that expired between enumeration and inspection.
    pub expired_entries: usize,
    /// Creation time of the oldest live entry, epoch milliseconds.
    pub oldest_entry: Option<i64>,
    /// Creation time of the newest live entry, epoch milliseconds.
    pub newest_entry: Option<i64>,
}

/// Namespaced key/value persistence with TTL and pluggable cryptography.
///
/// The in-memory mirror is authoritative for reads when an entry is
/// present; disk is authoritative for persistence and recovery. Intended
/// for a single process — concurrent writers to the same key are
/// last-writer-wins through the filesystem.
pub struct StateStore {
    base_dir: PathBuf,
    cipher: Option<Arc<dyn StateCipher>>,
    memory: RwLock<HashMap<String, HashMap<String, StateEntry>>>,
    listeners: ChangeListeners,
}

enum MirrorLookup {
    Hit(Value),
    Expired,
    Miss,
}

impl StateStore {
    /// Create a store rooted at `base_dir`. The directory is created
    /// lazily on first write.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cipher: None,
            memory: RwLock::new(HashMap::new()),
            listeners: ChangeListeners::new(),
        }
    }

    /// Install a cipher for encrypted entries.
    #[must_use]
    pub fn with_cipher(mut self, cipher: Arc<dyn StateCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// The store's base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve_namespace<'a>(snapp: &'a SnappId, namespace: Option<&'a str>) -> &'a str {
        namespace.unwrap_or_else(|| snapp.as_str())
    }

    fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.base_dir.join(sanitize(namespace))
    }

    fn entry_path(&self, namespace: &str, key: &str, encrypted: bool) -> PathBuf {
        let ext = if encrypted { EXT_ENCRYPTED } else { EXT_PLAIN };
        self.namespace_dir(namespace)
            .join(format!("{}.{ext}", sanitize(key)))
    }

    /// Write an entry.
    ///
    /// The in-memory mirror is updated first, then the entry is written
    /// to disk atomically (temp sibling + rename) with owner-only
    /// permissions. When `opts.sync` is set, change listeners are
    /// notified before returning.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if serialization, encryption, or the disk
    /// write fails. Read-side staleness is never an error here.
    pub async fn persist(
        &self,
        snapp: &SnappId,
        key: &str,
        value: Value,
        opts: PersistOptions,
    ) -> StateResult<()> {
        let namespace = opts
            .namespace
            .clone()
            .unwrap_or_else(|| snapp.as_str().to_string());
        // The flag is honored silently when no cipher is configured.
        let encrypted = opts.encrypted && self.cipher.is_some();
        let ttl_millis = opts
            .ttl
            .map(|ttl| i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX));
        let entry = StateEntry::new(value, ttl_millis, encrypted);

        {
            let mut memory = self.memory.write().expect("lock poisoned");
            memory
                .entry(namespace.clone())
                .or_default()
                .insert(key.to_string(), entry.clone());
        }

        let dir = self.namespace_dir(&namespace);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StateError::io(&dir, e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = tokio::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700)).await;
        }

        let serialized = serde_json::to_string(&entry)?;
        let contents = match &self.cipher {
            Some(cipher) if encrypted => {
                cipher.encrypt(&serialized).map_err(StateError::Encrypt)?
            },
            _ => serialized,
        };

        let path = self.entry_path(&namespace, key, encrypted);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, contents.as_bytes())
            .await
            .map_err(|e| StateError::io(&tmp, e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await;
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StateError::io(&path, e));
        }

        // Drop a stale sibling left by a previous write with the other
        // encryption setting, so reads and listings see one copy per key.
        let stale = self.entry_path(&namespace, key, !encrypted);
        let _ = tokio::fs::remove_file(&stale).await;

        debug!(snapp_id = %snapp, namespace, key, encrypted, "Persisted state entry");

        if opts.sync {
            self.listeners.notify(&ChangeEvent {
                namespace,
                key: key.to_string(),
                snapp_id: snapp.clone(),
            });
        }
        Ok(())
    }

    /// Read an entry's value, or `None` when missing, expired, corrupt,
    /// or unreadable. Callers supply their own default on `None`.
    pub async fn restore(
        &self,
        snapp: &SnappId,
        key: &str,
        namespace: Option<&str>,
    ) -> Option<Value> {
        let namespace = Self::resolve_namespace(snapp, namespace);
        let now = now_millis();

        let lookup = {
            let memory = self.memory.read().expect("lock poisoned");
            match memory.get(namespace).and_then(|ns| ns.get(key)) {
                Some(entry) if entry.is_expired(now) => MirrorLookup::Expired,
                Some(entry) => MirrorLookup::Hit(entry.value.clone()),
                None => MirrorLookup::Miss,
            }
        };
        match lookup {
            MirrorLookup::Hit(value) => return Some(value),
            MirrorLookup::Expired => {
                let mut memory = self.memory.write().expect("lock poisoned");
                if let Some(ns) = memory.get_mut(namespace) {
                    ns.remove(key);
                }
                return None;
            },
            MirrorLookup::Miss => {},
        }

        let entry = self.load_entry(namespace, key).await?;
        if entry.is_expired(now) {
            return None;
        }
        if entry.version != ENTRY_FORMAT_VERSION {
            warn!(
                namespace,
                key,
                version = entry.version,
                "State entry has unexpected format version"
            );
        }
        let value = entry.value.clone();
        {
            let mut memory = self.memory.write().expect("lock poisoned");
            memory
                .entry(namespace.to_string())
                .or_default()
                .insert(key.to_string(), entry);
        }
        Some(value)
    }

    /// Load and decode an entry from disk, probing `.enc` before `.json`.
    async fn load_entry(&self, namespace: &str, key: &str) -> Option<StateEntry> {
        for encrypted in [true, false] {
            let path = self.entry_path(namespace, key, encrypted);
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read state entry");
                    return None;
                },
            };
            return self.decode_entry(&path, &text, encrypted);
        }
        None
    }

    fn decode_entry(&self, path: &Path, text: &str, encrypted: bool) -> Option<StateEntry> {
        let plaintext = if encrypted {
            let Some(cipher) = &self.cipher else {
                warn!(path = %path.display(), "Encrypted entry but no cipher configured");
                return None;
            };
            match cipher.decrypt(text) {
                Ok(plaintext) => plaintext,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to decrypt state entry");
                    return None;
                },
            }
        } else {
            text.to_string()
        };

        match serde_json::from_str::<StateEntry>(&plaintext) {
            Ok(entry) => Some(entry),
            Err(e) => {
                // Corrupt entries are treated as missing.
                warn!(path = %path.display(), error = %e, "Corrupt state entry");
                None
            },
        }
    }

    /// Delete an entry from memory and disk. Missing files are fine.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] only for filesystem failures other than
    /// the files not existing.
    pub async fn remove(
        &self,
        snapp: &SnappId,
        key: &str,
        namespace: Option<&str>,
    ) -> StateResult<()> {
        let namespace = Self::resolve_namespace(snapp, namespace);
        {
            let mut memory = self.memory.write().expect("lock poisoned");
            if let Some(ns) = memory.get_mut(namespace) {
                ns.remove(key);
            }
        }
        for encrypted in [true, false] {
            let path = self.entry_path(namespace, key, encrypted);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {},
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
                Err(e) => return Err(StateError::io(&path, e)),
            }
        }
        Ok(())
    }

    /// List the non-expired keys in a namespace, sorted. Keys are the
    /// sanitized on-disk names. A missing namespace directory yields an
    /// empty list.
    pub async fn list_keys(&self, snapp: &SnappId, namespace: Option<&str>) -> Vec<String> {
        let namespace = Self::resolve_namespace(snapp, namespace);
        let now = now_millis();
        let mut keys = BTreeSet::new();
        for key in self.disk_keys(namespace).await {
            if let Some(entry) = self.load_entry(namespace, &key).await
                && !entry.is_expired(now)
            {
                keys.insert(key);
            }
        }
        keys.into_iter().collect()
    }

    /// Enumerate every key with an entry file in the namespace directory,
    /// without expiration filtering.
    async fn disk_keys(&self, namespace: &str) -> Vec<String> {
        let dir = self.namespace_dir(namespace);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };
        let mut keys = BTreeSet::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(key) = name
                .strip_suffix(".json")
                .or_else(|| name.strip_suffix(".enc"))
            {
                keys.insert(key.to_string());
            }
        }
        keys.into_iter().collect()
    }

    /// Drop a whole namespace: the memory mirror and the directory tree.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] for filesystem failures other than the
    /// directory not existing.
    pub async fn clear(&self, snapp: &SnappId, namespace: Option<&str>) -> StateResult<()> {
        let namespace = Self::resolve_namespace(snapp, namespace);
        {
            let mut memory = self.memory.write().expect("lock poisoned");
            memory.remove(namespace);
        }
        let dir = self.namespace_dir(namespace);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::io(&dir, e)),
        }
    }

    /// Remove every expired entry in a namespace and report how many.
    ///
    /// The one operation that inspects expired entries; everything else
    /// filters them lazily.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if an expired entry cannot be deleted.
    pub async fn clear_expired(
        &self,
        snapp: &SnappId,
        namespace: Option<&str>,
    ) -> StateResult<usize> {
        let namespace = Self::resolve_namespace(snapp, namespace);
        let now = now_millis();
        let mut removed = 0;
        for key in self.disk_keys(namespace).await {
            let Some(entry) = self.load_entry(namespace, &key).await else {
                continue;
            };
            if !entry.is_expired(now) {
                continue;
            }
            {
                let mut memory = self.memory.write().expect("lock poisoned");
                if let Some(ns) = memory.get_mut(namespace) {
                    ns.remove(&key);
                }
            }
            for encrypted in [true, false] {
                let path = self.entry_path(namespace, &key, encrypted);
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {},
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
                    Err(e) => return Err(StateError::io(&path, e)),
                }
            }
            removed += 1;
        }
        debug!(namespace, removed, "Cleared expired state entries");
        Ok(removed)
    }

    /// Compute aggregate statistics over the currently visible (non-
    /// expired) entries of a namespace.
    pub async fn get_stats(&self, snapp: &SnappId, namespace: Option<&str>) -> StateStats {
        let ns = Self::resolve_namespace(snapp, namespace);
        let now = now_millis();
        let mut stats = StateStats::default();
        for key in self.list_keys(snapp, namespace).await {
            let Some(entry) = self.load_entry(ns, &key).await else {
                continue;
            };
            // An entry can expire between listing and inspection.
            if entry.is_expired(now) {
                stats.expired_entries += 1;
                continue;
            }
            stats.total_entries += 1;
            for encrypted in [true, false] {
                let path = self.entry_path(ns, &key, encrypted);
                if let Ok(meta) = tokio::fs::metadata(&path).await {
                    stats.total_size += meta.len();
                    break;
                }
            }
            stats.oldest_entry = Some(match stats.oldest_entry {
                Some(oldest) => oldest.min(entry.created_at),
                None => entry.created_at,
            });
            stats.newest_entry = Some(match stats.newest_entry {
                Some(newest) => newest.max(entry.created_at),
                None => entry.created_at,
            });
        }
        stats
    }

    /// Subscribe to change events from synchronized persists.
    pub fn on_change(&self, handler: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> ChangeListenerId {
        self.listeners.register(Box::new(handler))
    }

    /// Remove a change listener. Returns whether it was registered.
    pub fn remove_change_listener(&self, id: ChangeListenerId) -> bool {
        self.listeners.unregister(id)
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("base_dir", &self.base_dir)
            .field("cipher", &self.cipher.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
