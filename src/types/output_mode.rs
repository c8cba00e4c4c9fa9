//! Output mode selection

use serde::{Deserialize, Serialize};

/// How each flush reaches the output sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Rewrite the pivoted full history on every flush
    #[default]
    Snapshot,

    /// Append only this cycle's new laps as flat rows
    Append,
}

impl OutputMode {
    /// Whether flushes need the roster's accumulated history
    pub fn needs_history(self) -> bool {
        matches!(self, OutputMode::Snapshot)
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Snapshot => f.write_str("snapshot"),
            OutputMode::Append => f.write_str("append"),
        }
    }
}
