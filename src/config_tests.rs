//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;
    use crate::error::LedgerError;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert!(config.ledger.default_unit_value.is_none());
        assert_eq!(config.ledger.currency, "EUR");
        assert_eq!(config.database.path, "~/.bet-ledger/bets.db");
        assert_eq!(config.dashboard.port, 8080);
        assert_eq!(config.surebet.default_investment, dec!(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.ledger.currency, "EUR");
        assert_eq!(config.dashboard.port, 8080);
    }

    #[test]
    fn test_ledger_config_deserialize() {
        let toml_str = r#"
default_unit_value = 25
currency = "BRL"
"#;
        let config: LedgerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_unit_value, Some(dec!(25)));
        assert_eq!(config.currency, "BRL");
    }

    #[test]
    fn test_full_config_deserialize() {
        let toml_str = r#"
[ledger]
default_unit_value = 12.5

[database]
path = "data/bets.db"

[dashboard]
port = 3000

[surebet]
default_investment = 500
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ledger.default_unit_value, Some(dec!(12.5)));
        assert_eq!(config.ledger.currency, "EUR");
        assert_eq!(config.database.path, "data/bets.db");
        assert_eq!(config.dashboard.port, 3000);
        assert_eq!(config.surebet.default_investment, dec!(500));
    }

    #[test]
    fn test_resolved_path_expands_home() {
        let config = DatabaseConfig {
            path: "~/bets.db".to_string(),
        };
        let resolved = config.resolved_path();
        assert!(!resolved.starts_with('~'));
        assert!(resolved.ends_with("bets.db"));

        let plain = DatabaseConfig {
            path: "data/bets.db".to_string(),
        };
        assert_eq!(plain.resolved_path(), "data/bets.db");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.ledger.default_unit_value = Some(Decimal::ZERO);
        assert!(matches!(config.validate(), Err(LedgerError::Config(_))));

        let mut config = Config::default();
        config.database.path = "  ".to_string();
        assert!(matches!(config.validate(), Err(LedgerError::Config(_))));

        let mut config = Config::default();
        config.surebet.default_investment = dec!(-1);
        assert!(matches!(config.validate(), Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[ledger]
default_unit_value = 10
currency = "USD"

[dashboard]
port = 9090
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.ledger.default_unit_value, Some(dec!(10)));
        assert_eq!(config.ledger.currency, "USD");
        assert_eq!(config.dashboard.port, 9090);
        assert_eq!(config.surebet.default_investment, dec!(100));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.dashboard.port, 8080);
    }

    #[test]
    fn test_load_invalid_file_fails() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[surebet]\ndefault_investment = 0").unwrap();
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }
}
