//! Board configuration.

use crate::task::domain::{Priority, SortOrder};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML text could not be parsed.
    #[error("invalid board configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings shared by the board services.
///
/// # Examples
///
/// ```
/// use taskboard::config::BoardConfig;
/// use taskboard::task::domain::SortOrder;
///
/// let config = BoardConfig::default();
/// assert_eq!(config.sort_order, SortOrder::DueDateAscending);
///
/// let parsed = BoardConfig::from_toml_str("sort_order = \"due-date-descending\"")?;
/// assert_eq!(parsed.sort_order, SortOrder::DueDateDescending);
/// # Ok::<(), taskboard::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Ordering applied inside every status bucket.
    pub sort_order: SortOrder,
    /// Number of board events buffered per listener.
    pub event_capacity: usize,
    /// Priority selected when an edit session starts or is cleared.
    pub default_priority: Priority,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::DueDateAscending,
            event_capacity: 64,
            default_priority: Priority::Medium,
        }
    }
}

impl BoardConfig {
    /// Creates a configuration that lists the latest deadlines first.
    #[must_use]
    pub fn latest_deadline_first() -> Self {
        Self {
            sort_order: SortOrder::DueDateDescending,
            ..Self::default()
        }
    }

    /// Parses a TOML fragment; omitted keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, unknown keys, or
    /// values of the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Returns the event channel capacity, never zero.
    #[must_use]
    pub fn channel_capacity(&self) -> usize {
        self.event_capacity.max(1)
    }
}
