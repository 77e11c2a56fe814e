use serde::{Deserialize, Serialize};
use std::fs;

use crate::core_types::Amount;
use crate::service::DEFAULT_MAX_CHARGE;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Ledger tuning knobs.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Upper bound for a single charge/use amount.
    pub max_charge: Amount,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_charge: DEFAULT_MAX_CHARGE,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_section_defaults_when_absent() {
        let config: AppConfig = serde_yaml::from_str(
            r#"
log_level: info
log_dir: ./logs
log_file: ledger.log
use_json: false
rotation: daily
"#,
        )
        .unwrap();
        assert_eq!(config.ledger.max_charge, DEFAULT_MAX_CHARGE);
    }

    #[test]
    fn test_ledger_section_overrides() {
        let config: AppConfig = serde_yaml::from_str(
            r#"
log_level: debug
log_dir: ./logs
log_file: ledger.log
use_json: true
rotation: hourly
ledger:
  max_charge: 500
"#,
        )
        .unwrap();
        assert_eq!(config.ledger.max_charge, 500);
        assert!(config.use_json);
    }
}
