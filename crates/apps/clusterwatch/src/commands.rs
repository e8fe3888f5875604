//! Commands typed at the clusterwatch prompt

use anyhow::{Result, bail};
use clustersync::ClusterId;

/// A parsed prompt line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a sync for one cluster
    Sync(ClusterId),
    /// Start a sync for every cluster
    SyncAll,
    /// Log one cluster's stats
    Stats(ClusterId),
    /// Print counters and syncing clusters
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse a prompt line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        if words.next().is_some() {
            bail!("Too many arguments; type `help` for usage");
        }

        let command = match (verb.to_ascii_lowercase().as_str(), arg) {
            ("sync", Some(id)) => Self::Sync(ClusterId::new(id)),
            ("sync", None) => bail!("Usage: sync <cluster-id>"),
            ("sync-all", None) => Self::SyncAll,
            ("stats", Some(id)) => Self::Stats(ClusterId::new(id)),
            ("stats", None) => bail!("Usage: stats <cluster-id>"),
            ("status", None) => Self::Status,
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit" | "q", None) => Self::Quit,
            (other, _) => bail!("Unknown command `{other}`; type `help` for usage"),
        };

        Ok(Some(command))
    }
}

pub const HELP: &str = "\
Commands:
  sync <cluster-id>   start a sync for one cluster
  sync-all            start a sync for every cluster
  stats <cluster-id>  fetch and log one cluster's stats
  status              show counters and syncing clusters
  help                show this help
  quit                stop polling and exit";
