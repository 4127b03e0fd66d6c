pub mod schema;

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use tracing::warn;

use schema::{Settings, SettingsCategory};

const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct SettingSearchHit {
    pub category: SettingsCategory,
    pub setting_key: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
}

/// Owns the persisted configuration record. Mutations mark the store dirty;
/// writes are debounced so a slider dragged in the host's settings surface
/// does not hit the disk per pixel.
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
    pending_write: bool,
    last_change_at: Option<Instant>,
}

impl SettingsStore {
    pub fn load() -> Self {
        Self::with_path(settings_path())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = load_settings_from(path.as_path());
        Self {
            path,
            settings,
            pending_write: false,
            last_change_at: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update<F>(&mut self, now: Instant, mutator: F)
    where
        F: FnOnce(&mut Settings),
    {
        mutator(&mut self.settings);
        self.pending_write = true;
        self.last_change_at = Some(now);
    }

    /// Writes the record once the debounce window since the last change has
    /// passed. Returns whether a write happened.
    pub fn flush_if_due(&mut self, now: Instant) -> bool {
        let Some(last_change) = self.last_change_at else {
            return false;
        };
        if !self.pending_write || now.duration_since(last_change) < SAVE_DEBOUNCE {
            return false;
        }

        self.write_out();
        true
    }

    pub fn force_flush(&mut self) {
        if self.pending_write {
            self.write_out();
        }
    }

    fn write_out(&mut self) {
        save_settings_to(self.path.as_path(), &self.settings);
        self.pending_write = false;
        self.last_change_at = None;
    }
}

pub fn settings_path() -> PathBuf {
    if let Some(base) = dirs::config_dir() {
        base.join("Glance").join("settings.json")
    } else {
        PathBuf::from("settings.json")
    }
}

fn load_settings_from(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str::<Settings>(&data) {
            Ok(settings) => settings.migrate(),
            Err(err) => {
                warn!(path = %path.display(), %err, "settings record unreadable, using defaults");
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

fn save_settings_to(path: &Path, settings: &Settings) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match serde_json::to_string_pretty(&settings.clone().migrate()) {
        Ok(data) => {
            if let Err(err) = fs::write(path, data) {
                warn!(path = %path.display(), %err, "failed to write settings record");
            }
        }
        Err(err) => warn!(%err, "failed to serialize settings record"),
    }
}

/// The host's settings surface renders these entries as labeled editable
/// options; `search_settings` backs its filter box.
pub fn search_settings(query: &str) -> Vec<SettingSearchHit> {
    let needle = query.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return settings_catalog().to_vec();
    }

    settings_catalog()
        .iter()
        .filter(|item| {
            item.title.to_ascii_lowercase().contains(needle.as_str())
                || item.summary.to_ascii_lowercase().contains(needle.as_str())
                || item.setting_key.to_ascii_lowercase().contains(needle.as_str())
        })
        .cloned()
        .collect()
}

fn settings_catalog() -> &'static [SettingSearchHit] {
    &[
        SettingSearchHit {
            category: SettingsCategory::Preview,
            setting_key: "preview.max_width",
            title: "Maximum Preview Width",
            summary: "Widest the preview image renders, in pixels.",
        },
        SettingSearchHit {
            category: SettingsCategory::Preview,
            setting_key: "preview.max_height",
            title: "Maximum Preview Height",
            summary: "Tallest the preview image renders, in pixels.",
        },
        SettingSearchHit {
            category: SettingsCategory::Preview,
            setting_key: "preview.remember_last_size",
            title: "Remember Last Size",
            summary: "Open new previews at the last zoomed size instead of the default.",
        },
        SettingSearchHit {
            category: SettingsCategory::About,
            setting_key: "about.version",
            title: "Version",
            summary: "Version of the preview engine in use.",
        },
    ]
}
