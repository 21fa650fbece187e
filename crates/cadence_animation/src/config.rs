//! Construction-time timeline options

use serde::Deserialize;

use crate::error::Result;

/// Loose `loop` option: a flag or an explicit count.
///
/// | input         | loop count |
/// |---------------|-----------:|
/// | `true`        | -1         |
/// | `false`       | 0          |
/// | absent / null | 0          |
/// | `n`           | n          |
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LoopSetting {
    Flag(bool),
    Count(i32),
}

impl LoopSetting {
    /// Infinite looping
    pub const INFINITE: LoopSetting = LoopSetting::Count(-1);

    /// The number of additional loops, -1 for infinite
    pub fn count(self) -> i32 {
        match self {
            LoopSetting::Flag(true) => -1,
            LoopSetting::Flag(false) => 0,
            LoopSetting::Count(n) => n,
        }
    }
}

impl Default for LoopSetting {
    fn default() -> Self {
        LoopSetting::Count(0)
    }
}

impl From<bool> for LoopSetting {
    fn from(value: bool) -> Self {
        LoopSetting::Flag(value)
    }
}

impl From<i32> for LoopSetting {
    fn from(value: i32) -> Self {
        LoopSetting::Count(value)
    }
}

impl From<Option<LoopSetting>> for LoopSetting {
    fn from(value: Option<LoopSetting>) -> Self {
        value.unwrap_or_default()
    }
}

/// Options accepted when creating a timeline
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineConfig {
    #[serde(rename = "loop", deserialize_with = "loop_or_null")]
    pub loop_setting: LoopSetting,
    /// Interpret deltas as ticks instead of time units
    pub use_ticks: bool,
    /// Keep advancing while the scheduler tick is globally paused
    pub ignore_global_pause: bool,
    pub reversed: bool,
    pub bounce: bool,
    /// Start outside the active registry
    pub paused: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            loop_setting: LoopSetting::default(),
            use_ticks: false,
            ignore_global_pause: false,
            reversed: false,
            bounce: false,
            paused: true,
        }
    }
}

impl TimelineConfig {
    /// Parse options from a TOML document
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_loop(mut self, setting: impl Into<LoopSetting>) -> Self {
        self.loop_setting = setting.into();
        self
    }

    pub fn with_use_ticks(mut self, value: bool) -> Self {
        self.use_ticks = value;
        self
    }

    pub fn with_ignore_global_pause(mut self, value: bool) -> Self {
        self.ignore_global_pause = value;
        self
    }

    pub fn with_reversed(mut self, value: bool) -> Self {
        self.reversed = value;
        self
    }

    pub fn with_bounce(mut self, value: bool) -> Self {
        self.bounce = value;
        self
    }

    pub fn with_paused(mut self, value: bool) -> Self {
        self.paused = value;
        self
    }

    /// Resolved loop count
    pub fn loop_count(&self) -> i32 {
        self.loop_setting.count()
    }
}

fn loop_or_null<'de, D>(deserializer: D) -> std::result::Result<LoopSetting, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<LoopSetting>::deserialize(deserializer).map(LoopSetting::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TimelineConfig::default();
        assert_eq!(config.loop_count(), 0);
        assert!(config.paused);
        assert!(!config.use_ticks);
        assert!(!config.reversed);
        assert!(!config.bounce);
    }

    #[test]
    fn test_loop_coercion_table() {
        assert_eq!(LoopSetting::from(true).count(), -1);
        assert_eq!(LoopSetting::from(false).count(), 0);
        assert_eq!(LoopSetting::from(None).count(), 0);
        assert_eq!(LoopSetting::from(3).count(), 3);
        assert_eq!(LoopSetting::INFINITE.count(), -1);
    }

    #[test]
    fn test_from_toml() {
        let config = TimelineConfig::from_toml(
            r#"
            loop = true
            bounce = true
            useTicks = true
            paused = false
            "#,
        )
        .unwrap();
        assert_eq!(config.loop_count(), -1);
        assert!(config.bounce);
        assert!(config.use_ticks);
        assert!(!config.paused);
        assert!(!config.ignore_global_pause);

        let config = TimelineConfig::from_toml("loop = 4").unwrap();
        assert_eq!(config.loop_count(), 4);
        assert!(config.paused);
    }

    #[test]
    fn test_from_toml_rejects_bad_loop() {
        assert!(TimelineConfig::from_toml("loop = \"forever\"").is_err());
    }

    #[test]
    fn test_null_loop_is_zero() {
        let config: TimelineConfig =
            serde_json::from_str(r#"{ "loop": null, "reversed": true }"#).unwrap();
        assert_eq!(config.loop_count(), 0);
        assert!(config.reversed);
    }
}
