use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the optional settings file looked up at the working-tree root.
pub const CONFIG_FILE: &str = "backdate.toml";

/// Settings for a generation run.
///
/// Loaded from `backdate.toml` when present; every key is optional.
///
/// Example TOML:
/// ```toml
/// data_file = "data.json"
/// delay_ms  = 100
/// remote    = "origin"
/// push      = true
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Data file, relative to the working-tree root.
    pub data_file: PathBuf,
    /// Pause between two iterations, in milliseconds.
    pub delay_ms: u64,
    pub remote: String,
    pub push: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data.json"),
            delay_ms: 100,
            remote: "origin".to_string(),
            push: true,
        }
    }
}

/// Values given on the command line. `None` keeps the file/default value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub data_file: Option<PathBuf>,
    pub delay_ms: Option<u64>,
    pub remote: Option<String>,
    pub no_push: bool,
}

impl Settings {
    /// Apply command-line overrides on top of these settings.
    pub fn apply(mut self, o: &Overrides) -> Self {
        if let Some(p) = &o.data_file {
            self.data_file = p.clone();
        }
        if let Some(ms) = o.delay_ms {
            self.delay_ms = ms;
        }
        if let Some(r) = &o.remote {
            self.remote = r.clone();
        }
        if o.no_push {
            self.push = false;
        }
        self
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Load settings for the working tree at `workdir`.
///
/// - With `explicit`, that file must exist and parse.
/// - Otherwise `<workdir>/backdate.toml` is used if present, defaults if not.
///
/// # Errors
/// - Returns an error if an explicit config file cannot be read.
/// - Returns an error if parsing the TOML fails.
pub fn load_settings(workdir: &Path, explicit: Option<&Path>) -> Result<Settings> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = workdir.join(CONFIG_FILE);
            if !p.is_file() {
                return Ok(Settings::default());
            }
            p
        }
    };
    let txt = fs::read_to_string(&path)
        .with_context(|| format!("config not found: {}", path.display()))?;
    let settings: Settings = toml::from_str(&txt)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_default_file_gives_defaults() {
        let td = tempdir().unwrap();
        let s = load_settings(td.path(), None).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.delay(), Duration::from_millis(100));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let td = tempdir().unwrap();
        fs::write(
            td.path().join(CONFIG_FILE),
            "delay_ms = 0\nremote = \"upstream\"\n",
        )
        .unwrap();
        let s = load_settings(td.path(), None).unwrap();
        assert_eq!(s.delay_ms, 0);
        assert_eq!(s.remote, "upstream");
        assert_eq!(s.data_file, PathBuf::from("data.json"));
        assert!(s.push);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let td = tempdir().unwrap();
        let err = load_settings(td.path(), Some(&td.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("config not found"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let td = tempdir().unwrap();
        fs::write(td.path().join(CONFIG_FILE), "dealy_ms = 5\n").unwrap();
        assert!(load_settings(td.path(), None).is_err());
    }

    #[test]
    fn overrides_win() {
        let o = Overrides {
            data_file: Some(PathBuf::from("out/x.json")),
            delay_ms: Some(5),
            remote: None,
            no_push: true,
        };
        let s = Settings::default().apply(&o);
        assert_eq!(s.data_file, PathBuf::from("out/x.json"));
        assert_eq!(s.delay_ms, 5);
        assert_eq!(s.remote, "origin");
        assert!(!s.push);
    }
}
