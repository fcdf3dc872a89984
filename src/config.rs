//! Allocation limits and server settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Default number of employees a (day, shift) slot can hold.
pub const SHIFT_CAPACITY: usize = 2;

/// Default number of employees the backfill pass tries to reach per slot.
pub const MIN_EMPLOYEES_PER_SHIFT: usize = 2;

/// Default number of distinct days an employee may work per week.
pub const MAX_DAYS_PER_EMPLOYEE: usize = 5;

/// Default HTTP port.
const DEFAULT_PORT: u16 = 7860;

/// Limits applied by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllocationConfig {
    pub shift_capacity: usize,
    pub min_employees_per_shift: usize,
    pub max_days_per_employee: usize,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            shift_capacity: SHIFT_CAPACITY,
            min_employees_per_shift: MIN_EMPLOYEES_PER_SHIFT,
            max_days_per_employee: MAX_DAYS_PER_EMPLOYEE,
        }
    }
}

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `SHIFT_SCHEDULING_PORT`
    pub port: u16,
    /// `SHIFT_SCHEDULING_DATA`: JSON snapshot file. In-memory only when unset.
    pub data_file: Option<PathBuf>,
    /// `SHIFT_SCHEDULING_SEED`: fixes the backfill RNG.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_file: None,
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Reads the process environment. Unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    ///
    /// ```
    /// use shift_scheduling::config::ServerConfig;
    ///
    /// let config = ServerConfig::from_lookup(|key| match key {
    ///     "SHIFT_SCHEDULING_PORT" => Some("8080".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.port, 8080);
    /// assert!(config.data_file.is_none());
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("SHIFT_SCHEDULING_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid SHIFT_SCHEDULING_PORT, using default");
                defaults.port
            }),
            None => defaults.port,
        };

        let data_file = lookup("SHIFT_SCHEDULING_DATA")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        let seed = lookup("SHIFT_SCHEDULING_SEED").and_then(|raw| match raw.trim().parse() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warn!(value = %raw, "Invalid SHIFT_SCHEDULING_SEED, ignoring");
                None
            }
        });

        Self {
            port,
            data_file,
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_defaults() {
        let config = AllocationConfig::default();
        assert_eq!(config.shift_capacity, 2);
        assert_eq!(config.min_employees_per_shift, 2);
        assert_eq!(config.max_days_per_employee, 5);
    }

    #[test]
    fn test_allocation_partial_json() {
        let config: AllocationConfig = serde_json::from_str(r#"{"shiftCapacity":3}"#).unwrap();
        assert_eq!(config.shift_capacity, 3);
        assert_eq!(config.min_employees_per_shift, MIN_EMPLOYEES_PER_SHIFT);
    }

    #[test]
    fn test_server_config_invalid_values() {
        let config = ServerConfig::from_lookup(|key| match key {
            "SHIFT_SCHEDULING_PORT" => Some("not-a-port".to_string()),
            "SHIFT_SCHEDULING_SEED" => Some("42".to_string()),
            "SHIFT_SCHEDULING_DATA" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.data_file, None);
    }
}
