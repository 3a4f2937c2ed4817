use serde::{Deserialize, Serialize};

use crate::{ConfigError, core::SHAPE_SIZE};

/// Board geometry handed to [`GameEngine::new`](crate::GameEngine::new).
///
/// The default is the classic 10 × 25 board whose top two rows are hidden
/// spawn space, leaving 23 visible rows.
///
/// # Example
///
/// ```
/// use stackfall_engine::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.visible_rows(), 23);
/// assert_eq!(config.spawn_x(), 3);
/// assert!(EngineConfig { width: 2, ..config }.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of columns.
    pub width: usize,
    /// Number of rows, hidden rows included.
    pub height: usize,
    /// Rows at the top of the grid that are not shown to the player.
    pub hidden_rows: usize,
    /// Row at which new pieces are anchored.
    pub spawn_y: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::CLASSIC
    }
}

impl EngineConfig {
    pub const CLASSIC: Self = Self {
        width: 10,
        height: 25,
        hidden_rows: 2,
        spawn_y: 0,
    };

    /// Checks that the geometry can host a game.
    ///
    /// The board must be at least one piece template wide and tall, and must
    /// keep at least one visible row below the hidden ones.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < SHAPE_SIZE {
            return Err(ConfigError::TooNarrow { width: self.width });
        }
        if self.height < SHAPE_SIZE {
            return Err(ConfigError::TooShort {
                height: self.height,
            });
        }
        if self.hidden_rows >= self.height {
            return Err(ConfigError::NoVisibleRows {
                hidden_rows: self.hidden_rows,
                height: self.height,
            });
        }
        let spawn_fits = usize::try_from(self.spawn_y)
            .is_ok_and(|y| y + SHAPE_SIZE <= self.height);
        if !spawn_fits {
            return Err(ConfigError::SpawnOutsideGrid {
                spawn_y: self.spawn_y,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn visible_rows(&self) -> usize {
        self.height.saturating_sub(self.hidden_rows)
    }

    /// Column at which a piece template is anchored so that it is centered.
    #[must_use]
    pub fn spawn_x(&self) -> i32 {
        i32::try_from((self.width - SHAPE_SIZE) / 2).unwrap_or(i32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config, EngineConfig::CLASSIC);
        assert!(config.validate().is_ok());
        assert_eq!(config.spawn_x(), 3);
    }

    #[test]
    fn test_spawn_x_centers_template() {
        let config = EngineConfig {
            width: 7,
            ..EngineConfig::CLASSIC
        };
        assert_eq!(config.spawn_x(), 1);
        let config = EngineConfig {
            width: 4,
            ..EngineConfig::CLASSIC
        };
        assert_eq!(config.spawn_x(), 0);
    }

    #[test]
    fn test_invalid_configs_fail_fast() {
        let base = EngineConfig::CLASSIC;
        assert!(matches!(
            EngineConfig { width: 0, ..base }.validate(),
            Err(ConfigError::TooNarrow { width: 0 })
        ));
        assert!(matches!(
            EngineConfig { height: 3, ..base }.validate(),
            Err(ConfigError::TooShort { height: 3 })
        ));
        assert!(matches!(
            EngineConfig {
                hidden_rows: 25,
                ..base
            }
            .validate(),
            Err(ConfigError::NoVisibleRows { .. })
        ));
        assert!(matches!(
            EngineConfig { spawn_y: -1, ..base }.validate(),
            Err(ConfigError::SpawnOutsideGrid { spawn_y: -1 })
        ));
        assert!(matches!(
            EngineConfig { spawn_y: 22, ..base }.validate(),
            Err(ConfigError::SpawnOutsideGrid { spawn_y: 22 })
        ));
    }

    #[test]
    fn test_config_deserialization_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"width": 12}"#).unwrap();
        assert_eq!(config.width, 12);
        assert_eq!(config.height, 25);
        assert_eq!(config.hidden_rows, 2);
    }
}
