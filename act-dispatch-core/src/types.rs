//! Registry of issued action types
//!
//! Tracks which serializable type strings have been handed out so that two
//! creators can never share one. A registry is an explicit handle rather than
//! process-wide state: tests and subsystems each get their own.
//!
//! # Example
//!
//! ```
//! use act_dispatch_core::TypeRegistry;
//!
//! let types = TypeRegistry::new();
//! types.add("ONE");
//! types.add("TWO");
//! types.remove("ONE");
//! assert!(!types.has("ONE"));
//! assert_eq!(types.all(), vec!["TWO".to_string()]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::action::BATCH;
use crate::error::{Error, Result};

#[derive(Debug)]
struct TypeTable {
    // Names keep their first-insertion slot; `remove` only flips the flag.
    issued: IndexMap<String, bool>,
    checking: bool,
}

/// Cloneable handle over a table of issued type names
///
/// Clones share the same table.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    table: Rc<RefCell<TypeTable>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create an empty registry with duplicate checking enabled
    pub fn new() -> Self {
        Self {
            table: Rc::new(RefCell::new(TypeTable {
                issued: IndexMap::new(),
                checking: true,
            })),
        }
    }

    pub fn add(&self, name: &str) {
        self.table.borrow_mut().issued.insert(name.to_string(), true);
    }

    /// Mark `name` as not issued. Unknown names and `BATCH` are ignored.
    pub fn remove(&self, name: &str) {
        if name == BATCH {
            return;
        }
        if let Some(issued) = self.table.borrow_mut().issued.get_mut(name) {
            *issued = false;
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.table
            .borrow()
            .issued
            .get(name)
            .copied()
            .unwrap_or(false)
    }

    /// Every currently issued name, in the order it was first added
    pub fn all(&self) -> Vec<String> {
        self.table
            .borrow()
            .issued
            .iter()
            .filter(|(_, issued)| **issued)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Mark every name as not issued, except a reserved `BATCH`.
    pub fn clear(&self) {
        for (name, issued) in self.table.borrow_mut().issued.iter_mut() {
            if name != BATCH {
                *issued = false;
            }
        }
    }

    /// Fail with [`Error::DuplicateType`] if `name` is already issued and
    /// checking is enabled.
    pub fn check(&self, name: &str) -> Result<()> {
        if self.is_checking() && self.has(name) {
            return Err(Error::DuplicateType(name.to_string()));
        }
        Ok(())
    }

    /// Turn duplicate detection back on
    pub fn enable_checking(&self) {
        self.table.borrow_mut().checking = true;
    }

    /// Turn duplicate detection off, e.g. when modules are reloaded and
    /// recreate their creators.
    pub fn disable_checking(&self) {
        self.table.borrow_mut().checking = false;
    }

    pub fn is_checking(&self) -> bool {
        self.table.borrow().checking
    }
}
