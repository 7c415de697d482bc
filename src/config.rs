//! Engine configuration.
//!
//! Pool sizing has no effect on results, only on throughput. The config can
//! be built in code or read from JSON; missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Tile edge used when the caller has no preference.
pub const DEFAULT_TILE_EDGE: u32 = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads in the tile pool. `None` lets rayon pick (one per core).
    pub worker_threads: Option<usize>,
    /// Tile edge callers may fall back to.
    pub default_tile_edge: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            default_tile_edge: DEFAULT_TILE_EDGE,
        }
    }
}

impl EngineConfig {
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// `requested`, or the configured default tile edge when the caller has none.
    pub fn tile_edge_or_default(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.default_tile_edge)
    }

    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.worker_threads == Some(0) {
            return Err(EngineError::Config("worker_threads must be >= 1 when set".to_string()));
        }
        if self.default_tile_edge == 0 {
            return Err(EngineError::Config("default_tile_edge must be >= 1".to_string()));
        }
        Ok(())
    }
}
