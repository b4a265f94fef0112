use anyhow::{anyhow, Context, Result};
use crashline_types::RoundSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_STARTING_BALANCE: f64 = 100.0;
const DEFAULT_WALLET_ID: &str = "player";

/// Table configuration, read from a YAML file. Every field has a default, so an empty
/// file (or no file) runs the standard game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub log_level: String,
    /// Scheduler pulse period.
    pub tick_ms: u64,
    /// Balance of a wallet the store has never seen.
    pub starting_balance: f64,
    /// Seed for the crash point RNG. Entropy when unset.
    pub seed: Option<u64>,
    pub wallet_file: Option<PathBuf>,
    pub wallet_id: String,
    /// Emit events as JSON lines instead of status text.
    pub json: bool,
    pub round: RoundSettings,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            tick_ms: DEFAULT_TICK_MS,
            starting_balance: DEFAULT_STARTING_BALANCE,
            seed: None,
            wallet_file: None,
            wallet_id: DEFAULT_WALLET_ID.to_string(),
            json: false,
            round: RoundSettings::default(),
        }
    }
}

impl TableConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        Self::from_yaml(&raw)
            .with_context(|| format!("Could not parse config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        // An empty document parses as unit, not as an empty map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn level(&self) -> Result<Level> {
        Level::from_str(&self.log_level)
            .map_err(|_| anyhow!("invalid log_level {:?}", self.log_level))
    }

    /// Check the table-level fields. Round settings are checked when the state machine is
    /// built.
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(anyhow!("tick_ms must be positive"));
        }
        if !self.starting_balance.is_finite() || self.starting_balance < 0.0 {
            return Err(anyhow!(
                "starting_balance must be a non-negative number (got {})",
                self.starting_balance
            ));
        }
        if self.wallet_id.trim().is_empty() {
            return Err(anyhow!("wallet_id must not be empty"));
        }
        self.level()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crashline_types::{CurveSpec, DistributionSpec};

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(TableConfig::from_yaml("").unwrap(), TableConfig::default());
        assert_eq!(TableConfig::from_yaml("{}").unwrap(), TableConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
tick_ms: 50
seed: 9
round:
  min_bet: 1.0
  curve:
    kind: quadratic
  distribution:
    kind: house_edge
    floor: 1.5
"#;
        let config = TableConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.starting_balance, 100.0);
        assert_eq!(config.wallet_id, "player");
        assert_eq!(config.round.min_bet, 1.0);
        assert_eq!(config.round.inter_round_delay_ms, 7_000);
        assert_eq!(config.round.curve, CurveSpec::Quadratic { divisor: 10.0 });
        assert_eq!(config.round.distribution, DistributionSpec::HouseEdge { floor: 1.5 });
        config.validate().unwrap();
    }

    #[test]
    fn test_unknown_curve_kind_rejected() {
        let yaml = "round:\n  curve:\n    kind: exponential\n";
        assert!(TableConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let config = TableConfig {
            tick_ms: 0,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TableConfig {
            starting_balance: -1.0,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TableConfig {
            log_level: "chatty".to_string(),
            ..TableConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"), "unexpected error: {err}");
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = TableConfig::load(Some(Path::new("/nonexistent/crashline.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Could not read config file"));
        assert_eq!(TableConfig::load(None).unwrap(), TableConfig::default());
    }
}
