//! Interned property and method names
//!
//! Every distinct name is stored once in a process-wide pool, so comparing
//! two identifiers is a pointer comparison. The pool only grows.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

static POOL: Lazy<Mutex<FxHashSet<Arc<str>>>> = Lazy::new(|| Mutex::new(FxHashSet::default()));

/// An interned name used to look up properties and methods
#[derive(Clone)]
pub struct Identifier(Arc<str>);

impl Identifier {
    /// Intern `name`, returning the shared identifier for it
    pub fn new(name: &str) -> Self {
        let mut pool = POOL.lock();
        if let Some(existing) = pool.get(name) {
            return Identifier(Arc::clone(existing));
        }

        let interned: Arc<str> = Arc::from(name);
        pool.insert(Arc::clone(&interned));
        Identifier(interned)
    }

    /// The name as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty names are not valid property names
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::new(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier::new(&name)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({:?})", self.as_str())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
