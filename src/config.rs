/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// The `LEVELS_PATH` environment variable, when set, overrides the
/// configured game root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::Deserialize;

pub const ROOT_ENV_VAR: &str = "LEVELS_PATH";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Directory holding `Levels/`, `Saves/` and optionally `Config/`.
    pub root_dir: PathBuf,
    pub play: PlayConfig,
}

#[derive(Clone, Debug)]
pub struct PlayConfig {
    /// How long to wait for a key before redrawing (keeps the clock live).
    pub poll: Duration,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    play: TomlPlay,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_root_dir")]
    root_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlPlay {
    #[serde(default = "default_poll_ms")]
    poll_ms: u64,
}

// ── Defaults ──

fn default_root_dir() -> String { "Games".into() }
fn default_poll_ms() -> u64 { 200 }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { root_dir: default_root_dir() }
    }
}

impl Default for TomlPlay {
    fn default() -> Self {
        TomlPlay { poll_ms: default_poll_ms() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load `config.toml` from the exe directory or the CWD, then apply the
    /// `LEVELS_PATH` override. Missing file or keys fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        let env_root = std::env::var(ROOT_ENV_VAR).ok();
        GameConfig::from_parts(toml_cfg, env_root, &search_dirs)
    }

    /// Parse a config document directly (no search, no environment).
    pub fn from_toml_str(text: &str, search_dirs: &[PathBuf]) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_parts(toml_cfg, None, search_dirs))
    }

    fn from_parts(toml_cfg: TomlConfig, env_root: Option<String>, search_dirs: &[PathBuf]) -> Self {
        GameConfig {
            root_dir: resolve_root(&toml_cfg.general.root_dir, env_root.as_deref(), search_dirs),
            play: PlayConfig {
                poll: Duration::from_millis(toml_cfg.play.poll_ms.max(10)),
            },
        }
    }
}

/// Pick the game root: the override wins when non-empty, then the
/// configured path. Relative paths are looked up in `search_dirs` and fall
/// back to being relative to the CWD.
pub fn resolve_root(configured: &str, env_override: Option<&str>, search_dirs: &[PathBuf]) -> PathBuf {
    let chosen = match env_override {
        Some(v) if !v.trim().is_empty() => v,
        _ => configured,
    };
    let path = Path::new(chosen);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(path))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Where `config.toml` and a relative root are looked up: the executable's
/// directory, then the working directory.
fn candidate_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .map(|exe| exe.canonicalize().unwrap_or(exe))
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();

    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in exe_dir.into_iter().chain(cwd) {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

/// First readable `config.toml` wins. A parse error falls back to defaults
/// rather than trying the next directory.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    let found = search_dirs.iter()
        .map(|d| d.join("config.toml"))
        .filter(|p| p.is_file())
        .find_map(|p| match std::fs::read_to_string(&p) {
            Ok(text) => Some((p, text)),
            Err(e) => {
                warn!("could not read {}: {e}", p.display());
                None
            }
        });

    let Some((path, text)) = found else {
        return TomlConfig::default();
    };
    toml::from_str(&text).unwrap_or_else(|e| {
        warn!("{}: {e}; using default settings", path.display());
        TomlConfig::default()
    })
}
