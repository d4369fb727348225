use binlog_types::types::ObjectRef;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Maps object tokens to display names.
///
/// One table is shared by every encoder that may log about the same live objects,
/// so that a token means the same object in every stream.
/// Tokens are allocated monotonically and never reused.
pub struct ObjectTable {
    inner: Mutex<Tables>,
}

struct Tables {
    next: ObjectRef,
    names: HashMap<ObjectRef, String>,
    by_name: HashMap<String, ObjectRef>,
}

impl Tables {
    fn register(&mut self, name: String) -> ObjectRef {
        let token = self.next;
        self.next = token.next();

        self.by_name.insert(name.clone(), token);
        self.names.insert(token, name);
        token
    }
}

impl Default for ObjectTable {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Tables {
                next: ObjectRef::FIRST,
                names: HashMap::new(),
                by_name: HashMap::new(),
            }),
        }
    }
}

impl ObjectTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The process-wide table.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<ObjectTable>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(ObjectTable::new))
    }

    /// Always allocates a fresh token.
    pub fn register(&self, name: impl Into<String>) -> ObjectRef {
        self.inner.lock().register(name.into())
    }

    /// Reuses the token last registered under this name, if that token is still registered.
    pub fn register_or_lookup(&self, name: impl Into<String>) -> ObjectRef {
        let name = name.into();
        let mut tables = self.inner.lock();
        if let Some(token) = tables.by_name.get(&name) {
            if tables.names.contains_key(token) {
                return *token;
            }
        }
        tables.register(name)
    }

    /// Registers a live object. The token is unregistered when the handle drops.
    pub fn register_scoped(self: &Arc<Self>, name: impl Into<String>) -> ObjectHandle {
        let token = self.register(name);
        ObjectHandle {
            table: Arc::clone(self),
            token,
        }
    }

    pub fn name_for(&self, token: ObjectRef) -> Option<String> {
        self.inner.lock().names.get(&token).cloned()
    }

    pub fn unregister(&self, token: ObjectRef) {
        let mut tables = self.inner.lock();
        if let Some(name) = tables.names.remove(&token) {
            if tables.by_name.get(&name) == Some(&token) {
                tables.by_name.remove(&name);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The identity of one live object, for as long as the handle lives.
pub struct ObjectHandle {
    table: Arc<ObjectTable>,
    token: ObjectRef,
}

impl ObjectHandle {
    pub fn token(&self) -> ObjectRef {
        self.token
    }
}

impl Drop for ObjectHandle {
    fn drop(&mut self) {
        self.table.unregister(self.token);
    }
}
