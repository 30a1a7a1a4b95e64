//! Connection profiles and resolved runtime settings.
//! Profiles live under the XDG config dir: $XDG_CONFIG_HOME/pktdash/profiles.json
//! (fallback ~/.config/pktdash/profiles.json).

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf, time::Duration};
use url::Url;

use crate::error::ConfigError;
use crate::view::DisplayMode;

pub const DEFAULT_URL: &str = "http://localhost:8003";
pub const DEFAULT_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_TIMEOUT_MS: u64 = 1500;
pub const MIN_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("pktdash")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pktdash")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

/// A missing or unreadable file is treated as empty.
pub fn load_profiles() -> ProfilesFile {
    match fs::read_to_string(profiles_path()) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> Result<(), ConfigError> {
    let path = profiles_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p)?;
    fs::write(path, data)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveProfile {
    /// Runtime inputs, possibly persisted by the caller.
    Direct(ProfileEntry),
    /// Taken from an existing profile entry.
    Loaded(ProfileEntry),
    /// Profile name given without a URL and not on disk.
    Unknown(String),
    /// Nothing given; fall back to the default analyzer address.
    Default,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileRequest {
    pub profile_name: Option<String>,
    pub url: Option<String>,
    pub interval_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
}

impl ProfileRequest {
    pub fn resolve(&self, pf: &ProfilesFile) -> ResolveProfile {
        match (&self.profile_name, &self.url) {
            (_, Some(u)) => ResolveProfile::Direct(ProfileEntry {
                url: u.clone(),
                interval_ms: self.interval_ms,
                timeout_ms: self.timeout_ms,
            }),
            (Some(name), None) => match pf.profiles.get(name) {
                Some(entry) => ResolveProfile::Loaded(entry.clone()),
                None => ResolveProfile::Unknown(name.clone()),
            },
            (None, None) => ResolveProfile::Default,
        }
    }
}

/// What happened to the profiles file while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileWrite {
    Unchanged,
    Created,
    Overwritten,
    /// Differs from disk but `--save` was not given.
    Skipped,
}

/// Record a directly-given entry under `name`. New names are always written;
/// existing ones only when they changed and `overwrite` is set.
pub fn upsert_profile(
    pf: &mut ProfilesFile,
    name: &str,
    entry: &ProfileEntry,
    overwrite: bool,
) -> ProfileWrite {
    match pf.profiles.get(name) {
        None => {
            pf.profiles.insert(name.to_string(), entry.clone());
            ProfileWrite::Created
        }
        Some(existing) if existing == entry => ProfileWrite::Unchanged,
        Some(_) if overwrite => {
            pf.profiles.insert(name.to_string(), entry.clone());
            ProfileWrite::Overwritten
        }
        Some(_) => ProfileWrite::Skipped,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: Url,
    pub interval: Duration,
    pub timeout: Duration,
    pub mode: DisplayMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_URL).expect("default url"),
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            mode: DisplayMode::Light,
        }
    }
}

impl Settings {
    /// Build settings from a profile entry, with explicit CLI values winning.
    pub fn from_entry(
        entry: &ProfileEntry,
        interval_ms: Option<u64>,
        timeout_ms: Option<u64>,
        mode: DisplayMode,
    ) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(&entry.url)?;
        let interval_ms = interval_ms
            .or(entry.interval_ms)
            .unwrap_or(DEFAULT_INTERVAL_MS);
        if interval_ms < MIN_INTERVAL_MS {
            return Err(ConfigError::IntervalTooShort {
                min_ms: MIN_INTERVAL_MS,
                got_ms: interval_ms,
            });
        }
        let timeout_ms = timeout_ms.or(entry.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS);
        // reqwest would fail every request instantly
        if timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self {
            base_url,
            interval: Duration::from_millis(interval_ms),
            timeout: Duration::from_millis(timeout_ms),
            mode,
        })
    }
}

pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str) -> ProfileEntry {
        ProfileEntry {
            url: url.into(),
            ..Default::default()
        }
    }

    #[test]
    fn resolve_prefers_explicit_url() {
        let mut pf = ProfilesFile::default();
        pf.profiles.insert("lab".into(), entry("http://old:8003"));
        let req = ProfileRequest {
            profile_name: Some("lab".into()),
            url: Some("http://new:8003".into()),
            ..Default::default()
        };
        assert_eq!(req.resolve(&pf), ResolveProfile::Direct(entry("http://new:8003")));
    }

    #[test]
    fn resolve_loads_named_profile_or_reports_unknown() {
        let mut pf = ProfilesFile::default();
        pf.profiles.insert("lab".into(), entry("http://lab:8003"));
        let req = ProfileRequest {
            profile_name: Some("lab".into()),
            ..Default::default()
        };
        assert_eq!(req.resolve(&pf), ResolveProfile::Loaded(entry("http://lab:8003")));

        let req = ProfileRequest {
            profile_name: Some("nope".into()),
            ..Default::default()
        };
        assert_eq!(req.resolve(&pf), ResolveProfile::Unknown("nope".into()));

        assert_eq!(ProfileRequest::default().resolve(&pf), ResolveProfile::Default);
    }

    #[test]
    fn upsert_only_overwrites_when_asked() {
        let mut pf = ProfilesFile::default();
        let one = entry("http://one");
        let two = entry("http://two");
        assert_eq!(upsert_profile(&mut pf, "a", &one, false), ProfileWrite::Created);
        assert_eq!(upsert_profile(&mut pf, "a", &one, false), ProfileWrite::Unchanged);
        assert_eq!(upsert_profile(&mut pf, "a", &two, false), ProfileWrite::Skipped);
        assert_eq!(pf.profiles["a"].url, "http://one");
        assert_eq!(upsert_profile(&mut pf, "a", &two, true), ProfileWrite::Overwritten);
        assert_eq!(pf.profiles["a"].url, "http://two");
    }

    #[test]
    fn settings_defaults_and_overrides() {
        let s = Settings::from_entry(&entry(DEFAULT_URL), None, None, DisplayMode::Light).unwrap();
        assert_eq!(s, Settings::default());

        let stored = ProfileEntry {
            url: "https://analyzer.example".into(),
            interval_ms: Some(5000),
            timeout_ms: Some(800),
        };
        let s = Settings::from_entry(&stored, Some(1000), None, DisplayMode::Dark).unwrap();
        assert_eq!(s.interval, Duration::from_millis(1000));
        assert_eq!(s.timeout, Duration::from_millis(800));
        assert_eq!(s.mode, DisplayMode::Dark);
    }

    #[test]
    fn rejects_bad_urls_and_tiny_intervals() {
        assert!(matches!(
            parse_base_url("ws://host:3000/ws"),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            Settings::from_entry(&entry(DEFAULT_URL), Some(10), None, DisplayMode::Light),
            Err(ConfigError::IntervalTooShort { got_ms: 10, .. })
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(matches!(
            Settings::from_entry(&entry(DEFAULT_URL), None, Some(0), DisplayMode::Light),
            Err(ConfigError::ZeroTimeout)
        ));
        let stored = ProfileEntry {
            timeout_ms: Some(0),
            ..entry(DEFAULT_URL)
        };
        assert!(matches!(
            Settings::from_entry(&stored, None, None, DisplayMode::Light),
            Err(ConfigError::ZeroTimeout)
        ));
        assert!(Settings::from_entry(&stored, None, Some(1), DisplayMode::Light).is_ok());
    }

    #[test]
    fn profile_entry_omits_unset_fields() {
        let js = serde_json::to_string(&entry("http://x")).unwrap();
        assert_eq!(js, r#"{"url":"http://x"}"#);
    }
}
