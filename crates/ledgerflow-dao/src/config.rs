//! Engine parameters fixed at construction.

use crate::error::DaoError;
use serde::{Deserialize, Serialize};

/// DAO configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaoConfig {
    /// Seconds after construction during which contributions are accepted
    pub contribution_period: u64,
    /// Seconds a proposal stays open for votes
    pub voting_period: u64,
    /// Share of total contributions a proposal's votes must reach (percent)
    pub quorum_percent: u8,
    /// Largest share of available funds a single proposal may request (percent)
    pub max_proposal_percent: u8,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            contribution_period: 604_800, // 1 week
            voting_period: 86_400,        // 1 day
            quorum_percent: 50,
            max_proposal_percent: 100,
        }
    }
}

impl DaoConfig {
    /// Config with the three constructor parameters of a classic DAO:
    /// contribution window, voting window and quorum.
    pub fn new(contribution_period: u64, voting_period: u64, quorum_percent: u8) -> Self {
        Self {
            contribution_period,
            voting_period,
            quorum_percent,
            ..Self::default()
        }
    }

    /// Cap proposals at `percent` of available funds.
    pub fn with_max_proposal_percent(mut self, percent: u8) -> Self {
        self.max_proposal_percent = percent;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), DaoError> {
        if self.quorum_percent == 0 || self.quorum_percent > 100 {
            return Err(DaoError::InvalidConfig(format!(
                "quorum_percent must be in 1..=100, got {}",
                self.quorum_percent
            )));
        }

        if self.max_proposal_percent == 0 || self.max_proposal_percent > 100 {
            return Err(DaoError::InvalidConfig(format!(
                "max_proposal_percent must be in 1..=100, got {}",
                self.max_proposal_percent
            )));
        }

        if self.voting_period == 0 {
            return Err(DaoError::InvalidConfig("voting_period cannot be 0".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DaoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.quorum_percent, 50);
        assert_eq!(config.max_proposal_percent, 100);
    }

    #[test]
    fn test_config_validation() {
        assert!(DaoConfig::new(10, 10, 0).validate().is_err());
        assert!(DaoConfig::new(10, 10, 101).validate().is_err());
        assert!(DaoConfig::new(10, 0, 50).validate().is_err());
        assert!(DaoConfig::new(10, 10, 50).with_max_proposal_percent(0).validate().is_err());
        assert!(DaoConfig::new(0, 10, 100).validate().is_ok());
    }

    #[test]
    fn test_config_toml_partial() {
        let config: DaoConfig = toml::from_str("quorum_percent = 66").unwrap();
        assert_eq!(config.quorum_percent, 66);
        assert_eq!(config.voting_period, DaoConfig::default().voting_period);
    }
}
