use serde::{Deserialize, Serialize};
use std::{fs, ops::RangeInclusive, path::{Path, PathBuf}, time::Duration};
use url::Url;

use crate::background::BackgroundTheme;
use crate::overlay::OverlayTiming;

pub const DEFAULT_DATA_DIR: &str = "rkiosk";
pub const CONFIG_FILE: &str = "config.json";
pub const MESSAGE_FILE: &str = "message.json";
pub const LOG_FILE: &str = "rkiosk.log";

const TIMEOUT_RANGE_SECS: RangeInclusive<u64> = 5..=600;
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_COUNTDOWN_SECS: u32 = 5;
const DEFAULT_PIN: &str = "1234";
const DEFAULT_PORT: u16 = 3000;

// ============================================================================
// Data Models
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    pub school_name: String,
    pub overlay_timeout_secs: u64,
    pub countdown_secs: u32,
    /// Unlocks the welcome-message editor. A kiosk convenience, not access control.
    pub pin: String,
    pub theme: String,
    /// Message endpoint to talk to. `None` reads and writes `message.json` directly.
    pub server_url: Option<String>,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            school_name: "Berufliche Schule Elmshorn".into(),
            overlay_timeout_secs: DEFAULT_TIMEOUT_SECS,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            pin: DEFAULT_PIN.into(),
            theme: BackgroundTheme::default().key().into(),
            server_url: None,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn normalize(&mut self) {
        if !TIMEOUT_RANGE_SECS.contains(&self.overlay_timeout_secs) {
            tracing::warn!(
                "overlay_timeout_secs {} outside {}-{}, using {}",
                self.overlay_timeout_secs,
                TIMEOUT_RANGE_SECS.start(),
                TIMEOUT_RANGE_SECS.end(),
                DEFAULT_TIMEOUT_SECS
            );
            self.overlay_timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        let max_countdown = u32::try_from(self.overlay_timeout_secs).unwrap_or(u32::MAX);
        self.countdown_secs = self.countdown_secs.clamp(1, max_countdown);

        let pin_len = self.pin.chars().count();
        if pin_len == 0 || pin_len > crate::pin::MAX_PIN_LEN {
            tracing::warn!("configured pin has invalid length, falling back to default");
            self.pin = DEFAULT_PIN.into();
        }

        if BackgroundTheme::from_key(&self.theme).is_none() {
            tracing::warn!("unknown theme {:?}, using default", self.theme);
            self.theme = BackgroundTheme::default().key().into();
        }

        if let Some(raw) = &self.server_url {
            if let Err(err) = Url::parse(raw) {
                tracing::warn!("ignoring invalid server_url {:?}: {}", raw, err);
                self.server_url = None;
            }
        }
    }

    pub fn overlay_timing(&self) -> OverlayTiming {
        OverlayTiming {
            visible_for: Duration::from_secs(self.overlay_timeout_secs),
            countdown_from: self.countdown_secs,
            step: Duration::from_secs(1),
        }
    }

    pub fn background_theme(&self) -> BackgroundTheme {
        BackgroundTheme::from_key(&self.theme).unwrap_or_default()
    }

    /// Endpoint URL for the HTTP store, with the message route appended.
    pub fn message_endpoint(&self) -> Option<Url> {
        let base = Url::parse(self.server_url.as_deref()?).ok()?;
        base.join(crate::server::MESSAGE_ROUTE.trim_start_matches('/')).ok()
    }
}

// ============================================================================
// Files
// ============================================================================

pub fn data_path(dir: &Path, filename: &str) -> PathBuf {
    let _ = fs::create_dir_all(dir);
    dir.join(filename)
}

/// Loads the config file, falling back to defaults when it is missing or unreadable.
pub fn load_config(dir: &Path) -> Config {
    let path = data_path(dir, CONFIG_FILE);
    match fs::read_to_string(&path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!("failed to parse {}, using defaults: {}", path.display(), err);
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_yields_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let config = load_config(dir.path());
        assert_eq!(config.overlay_timeout_secs, 20);
        assert_eq!(config.countdown_secs, 5);
        assert_eq!(config.pin, "1234");
        assert!(config.server_url.is_none());
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE), r#"{ "pin": "0815", "theme": "winter" }"#)
            .expect("write config");

        let config = load_config(dir.path());
        assert_eq!(config.pin, "0815");
        assert_eq!(config.theme, "winter");
        assert_eq!(config.overlay_timeout_secs, 20);
    }

    #[test]
    fn normalize_repairs_out_of_range_values() {
        let mut config = Config {
            overlay_timeout_secs: 1,
            countdown_secs: 0,
            pin: "123456".into(),
            theme: "disco".into(),
            server_url: Some("not a url".into()),
            ..Config::default()
        };

        config.normalize();

        assert_eq!(config.overlay_timeout_secs, 20);
        assert_eq!(config.countdown_secs, 1);
        assert_eq!(config.pin, "1234");
        assert_eq!(config.theme, "campus");
        assert!(config.server_url.is_none());
    }

    #[test]
    fn message_endpoint_appends_route() {
        let config = Config {
            server_url: Some("http://kiosk.local:3000/".into()),
            ..Config::default()
        };
        let endpoint = config.message_endpoint().expect("endpoint");
        assert_eq!(endpoint.as_str(), "http://kiosk.local:3000/api/message");
    }
}
