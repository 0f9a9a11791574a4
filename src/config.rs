/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// Runs before logging is set up (the log file is itself a setting), so
/// problems are reported on stderr while the terminal is still in cooked mode.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct QuizConfig {
    /// Catalog file to load instead of the built-in modules.
    pub catalog_path: Option<PathBuf>,
    /// Log destination. Logging is off when unset.
    pub log_file: Option<PathBuf>,
    pub hint_mode: HintMode,
    pub tick_rate_ms: u64,
    pub stars_per_answer: u32,
}

/// How hints are drawn from an activity's hint list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintMode {
    /// Uniform pick with replacement.
    #[default]
    Random,
    /// Each hint once, in random order, before any repeats.
    Shuffled,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    hints: TomlHints,
    #[serde(default)]
    ui: TomlUi,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    catalog: String,
    #[serde(default)]
    log_file: String,
}

#[derive(Deserialize, Debug, Default)]
struct TomlHints {
    #[serde(default)]
    mode: HintMode,
}

#[derive(Deserialize, Debug)]
struct TomlUi {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_stars_per_answer")]
    stars_per_answer: u32,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 50 }
fn default_stars_per_answer() -> u32 { 1 }

impl Default for TomlUi {
    fn default() -> Self {
        TomlUi {
            tick_rate_ms: default_tick_rate(),
            stars_per_answer: default_stars_per_answer(),
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        QuizConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl QuizConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        QuizConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text. Relative paths are kept as written.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(QuizConfig::from_toml(toml_cfg, &[]))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        QuizConfig {
            catalog_path: resolve_file(&cfg.general.catalog, search_dirs),
            log_file: non_empty(&cfg.general.log_file).map(PathBuf::from),
            hint_mode: cfg.hints.mode,
            tick_rate_ms: cfg.ui.tick_rate_ms.max(1),
            stars_per_answer: cfg.ui.stars_per_answer,
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s) }
}

/// Resolve a configured file: absolute as-is, relative against the first
/// candidate dir that has it, else relative to CWD.
fn resolve_file(raw: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    let raw = non_empty(raw)?;
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return Some(path);
    }
    let found = search_dirs.iter()
        .map(|d| d.join(&path))
        .find(|p| p.is_file());
    Some(found.unwrap_or(path))
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match read_toml(&path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    eprintln!("Warning: {e}");
                    eprintln!("Using default settings.");
                    return TomlConfig::default();
                }
            }
        }
    }
    TomlConfig::default()
}

fn read_toml(path: &Path) -> Result<TomlConfig, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read {}: {e}", path.display()))?;
    toml::from_str::<TomlConfig>(&text)
        .map_err(|e| format!("config.toml parse error: {e}"))
}
