use crate::error::{ChemError, ChemResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;


/// Numeric policy of the balancer
/// Missing fields fall back to their defaults when deserializing
/// # Example
/// ```
/// use chembalance::BalancerConfig;
///
/// let config = BalancerConfig::from_json_str(r#"{ "max_denominator": 500 }"#).unwrap();
///
/// assert_eq!(config.max_denominator, 500);
/// assert_eq!(config.pivot_epsilon, 1e-10);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Pivots with smaller magnitude are treated as zero during elimination
    pub pivot_epsilon: f64,
    /// How close `coefficient * denominator` must be to an integer to accept the fraction
    pub fraction_tolerance: f64,
    /// Largest denominator tried when approximating coefficients (also the fallback denominator)
    pub max_denominator: u32,
    /// Whether elimination steps and balancing messages are recorded
    pub record_trace: bool,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            pivot_epsilon: 1e-10,
            fraction_tolerance: 1e-6,
            max_denominator: 1000,
            record_trace: true,
        }
    }
}

impl BalancerConfig {
    /// Parses configuration from a JSON string and validates it
    pub fn from_json_str(input: &str) -> ChemResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|err| ChemError::Config(err.to_string()))?;
        config.validate()
    }

    /// Loads configuration from a JSON file and validates it
    pub fn from_json_file(path: impl AsRef<Path>) -> ChemResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| ChemError::Config(format!("can't open {}: {}", path.display(), err)))?;
        let config: Self = serde_json::from_reader(BufReader::new(file)).map_err(|err| ChemError::Config(err.to_string()))?;
        config.validate()
    }

    /// Checks that tolerances are positive and finite and that denominators can be searched
    pub fn validate(self) -> ChemResult<Self> {
        if !(self.pivot_epsilon.is_finite() && self.pivot_epsilon > 0.0) {
            return Err(ChemError::Config(format!("pivot_epsilon must be positive, got {}", self.pivot_epsilon)));
        }
        if !(self.fraction_tolerance.is_finite() && self.fraction_tolerance > 0.0 && self.fraction_tolerance < 0.5) {
            return Err(ChemError::Config(format!("fraction_tolerance must be in (0, 0.5), got {}", self.fraction_tolerance)));
        }
        if self.max_denominator == 0 {
            return Err(ChemError::Config(String::from("max_denominator must be at least 1")));
        }
        Ok(self)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BalancerConfig::default();
        assert_eq!(config.pivot_epsilon, 1e-10);
        assert_eq!(config.fraction_tolerance, 1e-6);
        assert_eq!(config.max_denominator, 1000);
        assert!(config.record_trace);
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(BalancerConfig::from_json_str("{}").unwrap(), BalancerConfig::default());
    }

    #[test]
    fn json_round_trip() {
        let config = BalancerConfig { record_trace: false, ..BalancerConfig::default() };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(BalancerConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(BalancerConfig::from_json_str(r#"{ "pivot_epsilon": 0.0 }"#), Err(ChemError::Config(_))));
        assert!(matches!(BalancerConfig::from_json_str(r#"{ "fraction_tolerance": -1.0 }"#), Err(ChemError::Config(_))));
        assert!(matches!(BalancerConfig::from_json_str(r#"{ "max_denominator": 0 }"#), Err(ChemError::Config(_))));
        assert!(matches!(BalancerConfig::from_json_str("not json"), Err(ChemError::Config(_))));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(BalancerConfig::from_json_file("/nonexistent/chembalance.json"), Err(ChemError::Config(_))));
    }
}
