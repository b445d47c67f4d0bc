//! Session management
//!
//! The session store is the only owner of the caller's credential. It is
//! initialised once at start-up from durable storage and mutated exclusively
//! through [`SessionStore::set_session`] and [`SessionStore::clear_session`].

use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::models::Id;
use crate::auth::models::{Identity, Role, Session};
use crate::error::Result;

/// Well-known slot names in durable storage
pub const SLOT_TOKEN: &str = "token";
pub const SLOT_ROLE: &str = "role";
pub const SLOT_NAME: &str = "name";
pub const SLOT_EMAIL: &str = "email";
pub const SLOT_INSTITUTE_ID: &str = "instituteId";
pub const SLOT_MANAGER_ID: &str = "managerId";

pub type Slots = BTreeMap<String, String>;

/// Durable key/value backing for the session slots
pub trait SessionStorage: Send + Sync {
    /// Read every stored slot
    fn load(&self) -> Result<Slots>;

    /// Replace all stored slots with `slots`
    fn store(&self, slots: &Slots) -> Result<()>;

    /// Remove every stored slot. Clearing empty storage succeeds.
    fn clear(&self) -> Result<()>;
}

/// In-memory storage, lost at process exit
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<Slots>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Slots> {
        Ok(self.slots.lock().clone())
    }

    fn store(&self, slots: &Slots) -> Result<()> {
        *self.slots.lock() = slots.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.slots.lock().clear();
        Ok(())
    }
}

/// JSON file storage surviving restarts
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Slots> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Slots::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(slots) => Ok(slots),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(Slots::new())
            }
        }
    }

    fn store(&self, slots: &Slots) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write then rename so readers never see a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(slots)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

struct Inner {
    storage: Box<dyn SessionStorage>,
    state: RwLock<Session>,
}

/// Shared handle to the caller's session
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Initialise the store from whatever `storage` already holds
    pub fn open(storage: impl SessionStorage + 'static) -> Result<Self> {
        let slots = storage.load()?;
        let session = session_from_slots(&slots);
        if session.is_present() {
            tracing::debug!("Restored session for {:?}", session.identity.email);
        }

        Ok(Self {
            inner: Arc::new(Inner {
                storage: Box::new(storage),
                state: RwLock::new(session),
            }),
        })
    }

    /// Store backed by a session file
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(FileStorage::new(path))
    }

    /// Empty store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Inner {
                storage: Box::new(MemoryStorage::new()),
                state: RwLock::new(Session::default()),
            }),
        }
    }

    /// Store `identity` and `token`, replacing any prior session
    pub fn set_session(&self, identity: Identity, token: impl Into<String>) -> Result<()> {
        let session = Session::new(identity, token);
        let slots = slots_from_session(&session);

        let mut state = self.inner.state.write();
        self.inner.storage.store(&slots)?;
        *state = session;
        Ok(())
    }

    pub fn get_token(&self) -> Option<String> {
        self.inner.state.read().token.clone()
    }

    pub fn get_role(&self) -> Option<Role> {
        self.inner.state.read().identity.role
    }

    /// Cached identity, if a session is present
    pub fn identity(&self) -> Option<Identity> {
        let state = self.inner.state.read();
        state.is_present().then(|| state.identity.clone())
    }

    pub fn is_present(&self) -> bool {
        self.inner.state.read().is_present()
    }

    /// Snapshot of the whole session
    pub fn snapshot(&self) -> Session {
        self.inner.state.read().clone()
    }

    /// Remove every stored field. Clearing an empty session is a no-op.
    ///
    /// The in-memory session is dropped even when durable storage fails, so
    /// callers never keep using a credential they asked to forget.
    pub fn clear_session(&self) -> Result<()> {
        let mut state = self.inner.state.write();
        *state = Session::default();
        self.inner.storage.clear()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("SessionStore")
            .field("present", &state.is_present())
            .field("role", &state.identity.role)
            .finish()
    }
}

fn slots_from_session(session: &Session) -> Slots {
    let mut slots = Slots::new();
    let identity = &session.identity;

    let mut put = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            slots.insert(key.to_string(), value);
        }
    };

    put(SLOT_TOKEN, session.token.clone());
    put(SLOT_ROLE, identity.role.map(|r| r.as_str().to_string()));
    put(SLOT_NAME, identity.name.clone());
    put(SLOT_EMAIL, identity.email.clone());
    put(SLOT_INSTITUTE_ID, identity.institute_id.as_ref().map(Id::to_string));
    put(SLOT_MANAGER_ID, identity.manager_id.as_ref().map(Id::to_string));
    slots
}

fn session_from_slots(slots: &Slots) -> Session {
    let get = |key: &str| slots.get(key).filter(|v| !v.is_empty()).cloned();

    Session {
        token: get(SLOT_TOKEN),
        identity: Identity {
            name: get(SLOT_NAME),
            email: get(SLOT_EMAIL),
            role: get(SLOT_ROLE).and_then(|r| r.parse().ok()),
            institute_id: get(SLOT_INSTITUTE_ID).map(Id::from),
            manager_id: get(SLOT_MANAGER_ID).map(Id::from),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_token() {
        let store = SessionStore::in_memory();
        store
            .set_session(Identity::with_role(Role::Manager), "abc")
            .unwrap();
        assert_eq!(store.get_token().as_deref(), Some("abc"));
        assert_eq!(store.get_role(), Some(Role::Manager));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = SessionStore::in_memory();
        store.set_session(Identity::default(), "abc").unwrap();

        store.clear_session().unwrap();
        assert_eq!(store.get_token(), None);
        store.clear_session().unwrap();
        assert_eq!(store.get_token(), None);
        assert!(store.identity().is_none());
    }

    #[test]
    fn test_set_overwrites_prior_session() {
        let store = SessionStore::in_memory();
        let mut first = Identity::with_role(Role::InstituteAdmin).email("a@b.com");
        first.institute_id = Some(Id::from("9"));
        store.set_session(first, "one").unwrap();

        store
            .set_session(Identity::with_role(Role::Manager), "two")
            .unwrap();

        let identity = store.identity().unwrap();
        assert_eq!(store.get_token().as_deref(), Some("two"));
        assert_eq!(identity.email, None);
        assert_eq!(identity.institute_id, None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::open_file(&path).unwrap();
        let mut identity = Identity::with_role(Role::InstituteAdmin)
            .email("owner@institute.in")
            .name("Institute");
        identity.institute_id = Some(Id::from(42u64));
        store.set_session(identity.clone(), "persisted").unwrap();

        let reopened = SessionStore::open_file(&path).unwrap();
        assert_eq!(reopened.get_token().as_deref(), Some("persisted"));
        assert_eq!(reopened.identity(), Some(identity));
    }

    #[test]
    fn test_file_storage_uses_named_slots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::open_file(&path).unwrap();
        store
            .set_session(Identity::with_role(Role::Manager).email("m@x.in"), "tok")
            .unwrap();

        let raw: Slots = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get(SLOT_TOKEN).map(String::as_str), Some("tok"));
        assert_eq!(raw.get(SLOT_ROLE).map(String::as_str), Some("manager"));
        assert_eq!(raw.get(SLOT_EMAIL).map(String::as_str), Some("m@x.in"));
        assert!(!raw.contains_key(SLOT_MANAGER_ID));
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::open_file(&path).unwrap();
        store.set_session(Identity::default(), "tok").unwrap();
        assert!(path.exists());

        store.clear_session().unwrap();
        assert!(!path.exists());
        store.clear_session().unwrap();
    }

    #[test]
    fn test_corrupt_file_yields_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SessionStore::open_file(&path).unwrap();
        assert!(!store.is_present());
    }
}
