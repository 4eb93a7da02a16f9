//! Server configuration
//!
//! Loaded from a TOML file, then overridden from the command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use checkers_core::{validate_seat_count, GameError, Variant};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to accept players on.
    pub bind: String,
    /// Seats per match, humans and bots together.
    pub seats: usize,
    /// How many of the seats are bots. Bots take the trailing seats.
    pub bots: usize,
    /// `default` or `diamond`.
    pub variant: String,
    /// Pause before each bot answer.
    pub bot_delay_ms: u64,
    /// JSON-lines move log; no recording when unset.
    pub record_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            seats: 2,
            bots: 0,
            variant: Variant::Default.to_string(),
            bot_delay_ms: 400,
            record_path: None,
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GameError::configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&contents).map_err(|e| {
            GameError::configuration(format!("failed to parse {}: {e}", path.display()))
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), GameError> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| GameError::configuration(format!("failed to serialize: {e}")))?;
        std::fs::write(path, contents).map_err(|e| {
            GameError::configuration(format!("failed to write {}: {e}", path.display()))
        })
    }

    pub fn variant(&self) -> Result<Variant, GameError> {
        self.variant.parse().map_err(GameError::configuration)
    }

    pub fn bot_delay(&self) -> Duration {
        Duration::from_millis(self.bot_delay_ms)
    }

    /// Human seats, i.e. connections to wait for before a match starts.
    pub fn humans(&self) -> usize {
        self.seats.saturating_sub(self.bots)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        validate_seat_count(self.seats)?;
        if self.bots > self.seats {
            return Err(GameError::configuration(format!(
                "{} bots do not fit in {} seats",
                self.bots, self.seats
            )));
        }
        self.variant()?;
        Ok(())
    }
}
