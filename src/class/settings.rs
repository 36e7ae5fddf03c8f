// Klass Class Settings
// Per-class build switches. Keys follow the camelCase names of JSON class bodies.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Log start/returns for every method wrapped while set
    pub debug: bool,
    /// Add the executing frame to every diagnostic line
    #[serde(rename = "deepLoggingLevel")]
    pub deep_logging: bool,
    /// Generate setX/getX for value properties
    #[serde(rename = "autoSetterGetter")]
    pub auto_accessors: bool,
    /// The factory returns one constructed instance instead of the class
    pub singleton: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            deep_logging: false,
            auto_accessors: true,
            singleton: false,
        }
    }
}

/// Settings named by one class body; unnamed switches keep their value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub debug: Option<bool>,
    #[serde(rename = "deepLoggingLevel")]
    pub deep_logging: Option<bool>,
    #[serde(rename = "autoSetterGetter")]
    pub auto_accessors: Option<bool>,
    pub singleton: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }

    pub fn apply(&self, settings: Settings) -> Settings {
        Settings {
            debug: self.debug.unwrap_or(settings.debug),
            deep_logging: self.deep_logging.unwrap_or(settings.deep_logging),
            auto_accessors: self.auto_accessors.unwrap_or(settings.auto_accessors),
            singleton: self.singleton.unwrap_or(settings.singleton),
        }
    }
}
