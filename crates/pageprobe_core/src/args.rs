//! Initialization arguments handed over by the host.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Ordered argument strings passed to `initialize`.
///
/// Entries of the form `key=value` can be looked up with [`InitArguments::value_of`];
/// all entries are kept verbatim and in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InitArguments(Vec<String>);

impl InitArguments {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Value of the last `key=value` entry for `key`, trimmed.
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.iter()
            .rev()
            .filter_map(|entry| entry.split_once('='))
            .find(|(name, _)| name.trim() == key)
            .map(|(_, value)| value.trim())
    }
}

impl<S: Into<String>> FromIterator<S> for InitArguments {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Display for InitArguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (index, value) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value:?}")?;
        }
        f.write_str("]")
    }
}
