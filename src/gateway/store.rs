use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cookie::Cookie;
use parking_lot::Mutex;
use time::OffsetDateTime;

use super::cookies::{is_expired, pin_expiry};
use crate::error::Error;

/// Persistence medium for the session credentials.
///
/// Entries are cookies keyed by name. Implementations pin a relative
/// `Max-Age` to an absolute expiry on [`set`](CredentialStore::set) and
/// report expired entries as absent. Writes are last-write-wins; the
/// gateway never needs more than single-entry atomicity.
///
/// # Example
///
/// ```rust,ignore
/// struct KeyringStore { /* ... */ }
///
/// impl CredentialStore for KeyringStore {
///     fn get(&self, name: &str) -> Result<Option<Cookie<'static>>, Error> { /* ... */ }
///     fn set(&self, cookie: Cookie<'static>) -> Result<(), Error> { /* ... */ }
///     fn remove(&self, name: &str) -> Result<(), Error> { /* ... */ }
/// }
/// ```
pub trait CredentialStore: Send + Sync + 'static {
    /// Look up an unexpired entry.
    fn get(&self, name: &str) -> Result<Option<Cookie<'static>>, Error>;

    /// Insert or replace the entry named `cookie.name()`.
    fn set(&self, cookie: Cookie<'static>) -> Result<(), Error>;

    /// Remove an entry. Removing a missing entry is not an error.
    fn remove(&self, name: &str) -> Result<(), Error>;

    /// Value of an unexpired entry.
    fn value(&self, name: &str) -> Result<Option<String>, Error> {
        Ok(self.get(name)?.map(|c| c.value().to_string()))
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn get(&self, name: &str) -> Result<Option<Cookie<'static>>, Error> {
        (**self).get(name)
    }

    fn set(&self, cookie: Cookie<'static>) -> Result<(), Error> {
        (**self).set(cookie)
    }

    fn remove(&self, name: &str) -> Result<(), Error> {
        (**self).remove(name)
    }
}

/// In-memory store. Credentials live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Cookie<'static>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<Cookie<'static>>, Error> {
        let mut entries = self.entries.lock();
        Ok(take_live(&mut entries, name))
    }

    fn set(&self, cookie: Cookie<'static>) -> Result<(), Error> {
        let now = OffsetDateTime::now_utc();
        let cookie = pin_expiry(cookie, now);
        let mut entries = self.entries.lock();
        if is_expired(&cookie, now) {
            entries.remove(cookie.name());
        } else {
            entries.insert(cookie.name().to_string(), cookie);
        }
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), Error> {
        self.entries.lock().remove(name);
        Ok(())
    }
}

/// File-backed store. Credentials survive process restarts.
///
/// The file holds a JSON object mapping cookie names to their `Set-Cookie`
/// serialization. Every write replaces the file through a temporary sibling
/// and a rename; the in-memory entries change only once the file is written.
/// On unix the file is created with mode `0600`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, Cookie<'static>>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries if the file exists.
    ///
    /// Unparseable entries are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the file exists but cannot be read, or is
    /// not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let entries = if path.exists() {
            load(&path)?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, Cookie<'static>>) -> Result<(), Error> {
        let serialized: BTreeMap<&str, String> = entries
            .iter()
            .map(|(name, cookie)| (name.as_str(), cookie.to_string()))
            .collect();
        let json = serde_json::to_vec_pretty(&serialized)?;

        let tmp = self.path.with_extension("tmp");
        write_private(&tmp, &json)
            .map_err(|e| Error::Store(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Store(format!("rename to {}: {e}", self.path.display())))
    }

    /// Persist `next` and only then make it the live map.
    fn commit(
        &self,
        entries: &mut HashMap<String, Cookie<'static>>,
        next: HashMap<String, Cookie<'static>>,
    ) -> Result<(), Error> {
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, name: &str) -> Result<Option<Cookie<'static>>, Error> {
        let mut entries = self.entries.lock();
        Ok(take_live(&mut entries, name))
    }

    fn set(&self, cookie: Cookie<'static>) -> Result<(), Error> {
        let now = OffsetDateTime::now_utc();
        let cookie = pin_expiry(cookie, now);
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        if is_expired(&cookie, now) {
            next.remove(cookie.name());
        } else {
            next.insert(cookie.name().to_string(), cookie);
        }
        self.commit(&mut entries, next)
    }

    fn remove(&self, name: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock();
        if !entries.contains_key(name) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(name);
        self.commit(&mut entries, next)
    }
}

/// Write `contents` to a fresh file readable only by the owner.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Return the entry if still valid, evicting it otherwise.
fn take_live(
    entries: &mut HashMap<String, Cookie<'static>>,
    name: &str,
) -> Option<Cookie<'static>> {
    let expired = is_expired(entries.get(name)?, OffsetDateTime::now_utc());
    if expired {
        entries.remove(name);
        return None;
    }
    entries.get(name).cloned()
}

fn load(path: &Path) -> Result<HashMap<String, Cookie<'static>>, Error> {
    let raw = std::fs::read(path)
        .map_err(|e| Error::Store(format!("read {}: {e}", path.display())))?;
    let serialized: BTreeMap<String, String> = serde_json::from_slice(&raw)
        .map_err(|e| Error::Store(format!("parse {}: {e}", path.display())))?;

    let mut entries = HashMap::with_capacity(serialized.len());
    for (name, raw_cookie) in serialized {
        match Cookie::parse(raw_cookie) {
            Ok(cookie) => {
                entries.insert(name, cookie.into_owned());
            }
            Err(e) => tracing::warn!(name = %name, error = %e, "Dropping unparseable stored credential"),
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::gateway::cookies::{CookiePolicy, credential_cookie};

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        store
            .set(credential_cookie("access", "a1", &CookiePolicy::access_default()))
            .unwrap();

        assert_eq!(store.value("access").unwrap().as_deref(), Some("a1"));
        assert_eq!(store.value("refresh").unwrap(), None);

        store.remove("access").unwrap();
        assert_eq!(store.value("access").unwrap(), None);
        store.remove("access").unwrap();
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let store = MemoryStore::new();
        let mut cookie = Cookie::new("access", "old");
        cookie.set_expires(cookie::Expiration::DateTime(
            OffsetDateTime::now_utc() - Duration::minutes(1),
        ));
        store.entries.lock().insert("access".into(), cookie);

        assert!(store.get("access").unwrap().is_none());
        assert!(store.entries.lock().is_empty());
    }

    #[test]
    fn zero_max_age_deletes() {
        let store = MemoryStore::new();
        store.set(Cookie::new("csrftoken", "x")).unwrap();
        let removal = Cookie::build(("csrftoken", "")).max_age(Duration::ZERO).build();
        store.set(removal).unwrap();
        assert!(store.get("csrftoken").unwrap().is_none());
    }

    #[test]
    fn arc_store_shares_entries() {
        let store = Arc::new(MemoryStore::new());
        let handle: Arc<dyn CredentialStore> = store.clone();
        handle.set(Cookie::new("refresh", "r1")).unwrap();
        assert_eq!(store.value("refresh").unwrap().as_deref(), Some("r1"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = FileStore::open(&path).unwrap();
        store
            .set(credential_cookie("access", "a1", &CookiePolicy::access_default()))
            .unwrap();
        store
            .set(credential_cookie("refresh", "r1", &CookiePolicy::refresh_default()))
            .unwrap();
        store.remove("access").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.value("access").unwrap(), None);
        assert_eq!(reopened.value("refresh").unwrap().as_deref(), Some("r1"));

        let cookie = reopened.get("refresh").unwrap().unwrap();
        assert!(cookie.expires_datetime().is_some());
        assert_eq!(cookie.max_age(), None);
    }

    #[test]
    fn failed_write_leaves_entries_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("missing").join("credentials.json")).unwrap();

        let err = store.set(Cookie::new("access", "a1")).unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert!(store.get("access").unwrap().is_none());
    }

    #[test]
    fn failed_remove_keeps_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileStore::open(&path).unwrap();
        store.set(Cookie::new("access", "a1")).unwrap();

        // A non-empty directory in place of the file makes the rename fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        assert!(store.remove("access").is_err());
        assert_eq!(store.value("access").unwrap().as_deref(), Some("a1"));
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileStore::open(&path).unwrap();
        store.set(Cookie::new("refresh", "r1")).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, b"not json").unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }
}
