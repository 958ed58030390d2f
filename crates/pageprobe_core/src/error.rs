//! Faults raised by shim callbacks.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Callback fault returned to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShimError {
    /// `document-loaded` fired for a page that exposes no DOM document.
    MissingDocument { page: String },
}

impl Display for ShimError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDocument { page } => {
                write!(f, "page has no DOM document: {page}")
            }
        }
    }
}

impl Error for ShimError {}
