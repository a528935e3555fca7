use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::{debug, info, trace, warn};

use crate::Rgb;
use crate::grid::Grid;

pub const RC_ENV_VAR: &str = "PINBOARDRC";
pub const RC_FILE_NAME: &str = ".pinboardrc";

/// Raw `key=value` settings: defaults, then rc files, then overrides.
#[derive(Debug, Clone)]
pub struct Config {
    map: HashMap<String, String>,
    pub loaded_files: Vec<PathBuf>,
}

impl Config {
    pub fn defaults() -> Self {
        let map = [
            ("grid.size", "25"),
            ("color.default", "rgb(255,255,153)"),
            ("text.placeholder", "You can type a note here"),
            ("audio", "on"),
            ("audio.delete", "/audios/delete-paper.wav"),
            ("audio.move", "/audios/move-paper.wav"),
            ("delete.on_cue_failure", "proceed"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            map,
            loaded_files: vec![],
        }
    }

    #[tracing::instrument(skip(rc_override))]
    pub fn load(rc_override: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = Self::defaults();

        match resolve_rc_path(rc_override)? {
            Some(path) => {
                info!(rc = %path.display(), "loading pinboardrc");
                cfg.load_file(&path)?;
            }
            None => debug!("no pinboardrc found; using defaults"),
        }

        Ok(cfg)
    }

    #[tracing::instrument(skip(self, overrides))]
    pub fn apply_overrides<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (k, v) in overrides {
            let key = k.strip_prefix("rc.").unwrap_or(&k).to_string();
            debug!(key = %key, value = %v, "applying override");
            self.map.insert(key, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.map.get(key).map(|v| parse_bool(v))
    }

    #[tracing::instrument(skip(self))]
    fn load_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let path = expand_tilde(path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        self.loaded_files.push(path.clone());

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        for (line_num, raw_line) in text.lines().enumerate() {
            let line = match raw_line.split_once('#') {
                Some((before, _)) => before.trim(),
                None => raw_line.trim(),
            };
            if line.is_empty() {
                continue;
            }

            if let Some(include_rest) = line.strip_prefix("include ") {
                let include_path = resolve_include_path(&base_dir, include_rest.trim())?;
                if self.loaded_files.contains(&include_path) {
                    warn!(include = %include_path.display(), "include cycle; skipping");
                } else if include_path.exists() {
                    debug!(
                        file = %path.display(),
                        include = %include_path.display(),
                        line = line_num + 1,
                        "processing include"
                    );
                    self.load_file(&include_path)?;
                } else {
                    warn!(include = %include_path.display(), "include file does not exist; skipping");
                }
                continue;
            }

            let (k, v) = line.split_once('=').ok_or_else(|| {
                anyhow!(
                    "invalid config line {}:{}: {}",
                    path.display(),
                    line_num + 1,
                    raw_line
                )
            })?;

            let key = k.trim().to_string();
            let value = v.trim().to_string();
            trace!(key = %key, value = %value, "loaded config key");
            self.map.insert(key, value);
        }

        Ok(())
    }
}

/// What a widget does when its deletion cue fails to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteOnCueFailure {
    /// Notify the owner anyway.
    #[default]
    Proceed,
    /// Abandon the deletion.
    Drop,
}

impl std::str::FromStr for DeleteOnCueFailure {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proceed" => Ok(Self::Proceed),
            "drop" => Ok(Self::Drop),
            other => Err(anyhow!("expected proceed or drop, got: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueSources {
    pub delete: String,
    pub moved: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSettings {
    pub grid: Grid,
    pub default_color: Rgb,
    pub placeholder: String,
    pub audio: bool,
    pub cues: CueSources,
    pub delete_on_cue_failure: DeleteOnCueFailure,
}

impl WidgetSettings {
    #[tracing::instrument(skip(cfg))]
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let grid = match cfg.get("grid.size") {
            Some(raw) => {
                let cell: i32 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("grid.size is not an integer: {raw}"))?;
                Grid::new(cell).ok_or_else(|| anyhow!("grid.size must be positive, got {cell}"))?
            }
            None => defaults.grid,
        };

        let default_color = match cfg.get("color.default") {
            Some(raw) => raw
                .parse::<Rgb>()
                .with_context(|| format!("invalid color.default: {raw}"))?,
            None => defaults.default_color,
        };

        let delete_on_cue_failure = match cfg.get("delete.on_cue_failure") {
            Some(raw) => raw
                .parse::<DeleteOnCueFailure>()
                .context("invalid delete.on_cue_failure")?,
            None => defaults.delete_on_cue_failure,
        };

        let settings = Self {
            grid,
            default_color,
            placeholder: cfg.get("text.placeholder").unwrap_or(defaults.placeholder),
            audio: cfg.get_bool("audio").unwrap_or(defaults.audio),
            cues: CueSources {
                delete: cfg.get("audio.delete").unwrap_or(defaults.cues.delete),
                moved: cfg.get("audio.move").unwrap_or(defaults.cues.moved),
            },
            delete_on_cue_failure,
        };
        debug!(?settings, "resolved widget settings");
        Ok(settings)
    }
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            grid: Grid::default(),
            default_color: Rgb::new(255, 255, 153),
            placeholder: "You can type a note here".to_string(),
            audio: true,
            cues: CueSources {
                delete: "/audios/delete-paper.wav".to_string(),
                moved: "/audios/move-paper.wav".to_string(),
            },
            delete_on_cue_failure: DeleteOnCueFailure::Proceed,
        }
    }
}

#[tracing::instrument(skip(override_path))]
fn resolve_rc_path(override_path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = override_path {
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(rc_env) = std::env::var(RC_ENV_VAR) {
        if rc_env == "/dev/null" {
            return Ok(None);
        }
        return Ok(Some(PathBuf::from(rc_env)));
    }

    let Some(home) = dirs::home_dir() else {
        warn!("cannot determine home directory; skipping {RC_FILE_NAME}");
        return Ok(None);
    };
    let candidate = home.join(RC_FILE_NAME);
    if candidate.exists() {
        return Ok(Some(candidate));
    }

    Ok(None)
}

fn resolve_include_path(base_dir: &Path, include: &str) -> anyhow::Result<PathBuf> {
    if include.is_empty() {
        return Err(anyhow!("include path cannot be empty"));
    }

    let expanded = expand_tilde(Path::new(include));
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base_dir.join(expanded))
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "on" | "true"
    )
}
