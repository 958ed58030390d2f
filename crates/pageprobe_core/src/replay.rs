//! Scenario replay against the simulated host.
//!
//! # Responsibility
//! - Describe a host-issued event sequence as JSON.
//! - Drive a [`SimHost`] through it with a given shim.
//!
//! # Invariants
//! - Events fire in file order: all `initialize` calls, then each page's
//!   creation followed by its loads.

use crate::args::InitArguments;
use crate::host::sim::{HostFault, SimHost};
use crate::shim::EventWiringShim;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Host event sequence to replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub arguments: InitArguments,
    /// How many times the host calls `initialize`.
    #[serde(default = "default_initialize_count")]
    pub initialize_count: u32,
    #[serde(default)]
    pub pages: Vec<ScenarioPage>,
}

/// One page opened by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioPage {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub loads: Vec<ScenarioLoad>,
}

/// One `document-loaded` delivery on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioLoad {
    /// New page URI; the previous one is kept when absent.
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// `false` simulates a load with no DOM document.
    #[serde(default = "default_has_document")]
    pub document: bool,
}

fn default_initialize_count() -> u32 {
    1
}

fn default_has_document() -> bool {
    true
}

impl Scenario {
    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(raw).map_err(ScenarioError::Parse)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }
}

/// Summary of one replay run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub pages: usize,
    pub loads: usize,
    /// Listener registrations left on the host after the run.
    pub listeners: usize,
    pub faults: Vec<HostFault>,
}

/// Replays `scenario` on a fresh simulated host.
pub fn replay(scenario: &Scenario, shim: &EventWiringShim) -> ReplayReport {
    let mut host = SimHost::new();
    for _ in 0..scenario.initialize_count {
        shim.initialize(host.extension(), &scenario.arguments);
    }

    let mut loads = 0;
    for page_spec in &scenario.pages {
        let page = host.create_page(page_spec.uri.as_deref());
        for load in &page_spec.loads {
            if load.document {
                page.load_document(load.uri.as_deref(), load.title.as_deref());
            } else {
                page.load_without_document(load.uri.as_deref());
            }
            loads += 1;
        }
    }

    let report = ReplayReport {
        pages: host.pages().len(),
        loads,
        listeners: host.listener_count(),
        faults: host.faults(),
    };
    info!(
        "event=replay_finished module=replay pages={} loads={} listeners={} faults={}",
        report.pages,
        report.loads,
        report.listeners,
        report.faults.len()
    );
    report
}

/// Scenario loading errors.
#[derive(Debug)]
pub enum ScenarioError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ScenarioError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read scenario `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid scenario JSON: {err}"),
        }
    }
}

impl Error for ScenarioError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}
