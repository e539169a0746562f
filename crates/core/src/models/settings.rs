use serde::{Deserialize, Serialize};

/// User-configurable settings, stored inside the encrypted ledger file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Default trailing-window size (in months) for cash-flow smoothing.
    pub smoothing_window: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            smoothing_window: 12,
        }
    }
}
