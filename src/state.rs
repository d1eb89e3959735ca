//! Persistent UI state: the key/value store widgets save into.

use std::collections::HashMap;

use crate::error::Result;

/// Backing store for persisted widget state.
///
/// Values are short strings (a tab widget stores its selected index as a
/// decimal integer). Implementations may fail; errors surface as
/// [`Error::StateStore`](crate::Error::StateStore).
pub trait StateStore {
    fn get_state(&self, key: &str) -> Result<Option<String>>;
    fn put_state(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory [`StateStore`]; the default for a [`Ui`](crate::Ui).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStateStore {
    values: HashMap<String, String>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for MemoryStateStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn get_state(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
