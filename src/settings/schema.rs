use serde::{Deserialize, Serialize};

pub const SETTINGS_SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_MAX_WIDTH: f32 = 300.0;
pub const DEFAULT_MAX_HEIGHT: f32 = 300.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingsCategory {
    Preview,
    About,
}

impl SettingsCategory {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Preview => "Preview",
            Self::About => "About",
        }
    }

    pub const fn all() -> [Self; 2] {
        [Self::Preview, Self::About]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub schema_version: u32,
    pub preview: PreviewSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: SETTINGS_SCHEMA_VERSION,
            preview: PreviewSettings::default(),
        }
    }
}

impl Settings {
    /// Repairs records written by older builds or edited by hand. Values a
    /// panel cannot use (non-positive or non-finite dimensions) fall back
    /// to the defaults rather than failing the load.
    pub fn migrate(mut self) -> Self {
        if self.schema_version > SETTINGS_SCHEMA_VERSION {
            return self;
        }
        self.schema_version = SETTINGS_SCHEMA_VERSION;

        if !self.preview.max_width.is_finite() || self.preview.max_width <= 0.0 {
            self.preview.max_width = DEFAULT_MAX_WIDTH;
        }
        if !self.preview.max_height.is_finite() || self.preview.max_height <= 0.0 {
            self.preview.max_height = DEFAULT_MAX_HEIGHT;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreviewSettings {
    pub max_width: f32,
    pub max_height: f32,
    pub remember_last_size: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            remember_last_size: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.preview.max_width, 300.0);
        assert_eq!(settings.preview.max_height, 300.0);
        assert!(!settings.preview.remember_last_size);
    }

    #[test]
    fn migrate_repairs_unusable_dimensions() {
        let mut settings = Settings::default();
        settings.preview.max_width = -40.0;
        settings.preview.max_height = f32::NAN;

        let migrated = settings.migrate();
        assert_eq!(migrated.preview.max_width, DEFAULT_MAX_WIDTH);
        assert_eq!(migrated.preview.max_height, DEFAULT_MAX_HEIGHT);
        assert_eq!(migrated.schema_version, SETTINGS_SCHEMA_VERSION);
    }

    #[test]
    fn newer_records_pass_through_untouched() {
        let mut settings = Settings::default();
        settings.schema_version = SETTINGS_SCHEMA_VERSION + 1;
        settings.preview.max_width = -1.0;

        let migrated = settings.clone().migrate();
        assert_eq!(migrated, settings);
    }

    #[test]
    fn partial_records_fill_in_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"preview":{"remember_last_size":true}}"#).expect("parse");
        assert!(settings.preview.remember_last_size);
        assert_eq!(settings.preview.max_width, DEFAULT_MAX_WIDTH);
    }

    #[test]
    fn serde_round_trip_preserves_values() {
        let mut settings = Settings::default();
        settings.preview.max_width = 450.0;
        settings.preview.remember_last_size = true;

        let json = serde_json::to_string(&settings).expect("serialize");
        let back: Settings = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, settings);
    }
}
