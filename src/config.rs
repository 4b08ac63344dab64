/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.local/share/mazechase`. Falls back to the built-in tuning if the
/// file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub fear: FearConfig,
    pub gamepad: GamepadConfig,
    /// Fixed seed for the adversary tie-break; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub log_file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    /// Cells per tick.
    pub player_speed: f64,
    pub adversary_speed: f64,
}

#[derive(Clone, Debug)]
pub struct FearConfig {
    pub fear_ticks: u32,
    /// Below this many remaining ticks the feared colour blinks.
    pub warn_ticks: u32,
    /// Player/adversary distance (in cells) under which they bump.
    pub capture_radius: f64,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub quit: Vec<String>,
    pub pause: Vec<String>,
    pub confirm: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    fear: TomlFear,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_player_speed")]
    player_speed: f64,
    #[serde(default = "default_adversary_speed")]
    adversary_speed: f64,
}

#[derive(Deserialize, Debug)]
struct TomlFear {
    #[serde(default = "default_fear_ticks")]
    fear_ticks: u32,
    #[serde(default = "default_warn_ticks")]
    warn_ticks: u32,
    #[serde(default = "default_capture_radius")]
    capture_radius: f64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_quit")]
    quit: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 50 }
fn default_player_speed() -> f64 { 0.25 }
fn default_adversary_speed() -> f64 { 0.20 }
fn default_fear_ticks() -> u32 { 100 }   // 5s at 50ms
fn default_warn_ticks() -> u32 { 50 }
fn default_capture_radius() -> f64 { 1.6 }

fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }
fn default_confirm() -> Vec<String> { vec!["A".into(), "B".into(), "Start".into()] }
fn default_log_file() -> String { "mazechase.log".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            player_speed: default_player_speed(),
            adversary_speed: default_adversary_speed(),
        }
    }
}

impl Default for TomlFear {
    fn default() -> Self {
        TomlFear {
            fear_ticks: default_fear_ticks(),
            warn_ticks: default_warn_ticks(),
            capture_radius: default_capture_radius(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            quit: default_quit(),
            pause: default_pause(),
            confirm: default_confirm(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            log_file: default_log_file(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        let mut cfg = GameConfig::from_toml(toml_cfg);

        // A relative log path lands next to the first candidate directory.
        if cfg.log_file.is_relative() {
            if let Some(dir) = search_dirs.first() {
                cfg.log_file = dir.join(&cfg.log_file);
            }
        }
        cfg
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(1),
                player_speed: positive_or(toml_cfg.speed.player_speed, default_player_speed(), "player_speed"),
                adversary_speed: positive_or(toml_cfg.speed.adversary_speed, default_adversary_speed(), "adversary_speed"),
            },
            fear: FearConfig {
                fear_ticks: toml_cfg.fear.fear_ticks,
                warn_ticks: toml_cfg.fear.warn_ticks,
                capture_radius: positive_or(toml_cfg.fear.capture_radius, default_capture_radius(), "capture_radius"),
            },
            gamepad: GamepadConfig {
                quit: toml_cfg.gamepad.quit,
                pause: toml_cfg.gamepad.pause,
                confirm: toml_cfg.gamepad.confirm,
            },
            seed: toml_cfg.general.seed,
            log_file: PathBuf::from(toml_cfg.general.log_file),
        }
    }
}

/// Speeds and distances must be finite and above zero.
fn positive_or(value: f64, default: f64, key: &str) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        eprintln!("Warning: {key} = {value} is not positive, using {default}.");
        default
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
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

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/mazechase");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
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
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text),
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Warning: config.toml parse error: {e}");
            eprintln!("Using default settings.");
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml(parse_toml(""));
        assert_eq!(cfg.speed.tick_rate_ms, 50);
        assert_eq!(cfg.speed.player_speed, 0.25);
        assert_eq!(cfg.speed.adversary_speed, 0.20);
        assert_eq!(cfg.fear.fear_ticks, 100);
        assert_eq!(cfg.fear.warn_ticks, 50);
        assert_eq!(cfg.fear.capture_radius, 1.6);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.gamepad.quit, vec!["Select".to_string()]);
    }

    #[test]
    fn non_positive_speeds_and_radius_fall_back() {
        let text = r#"
            [speed]
            tick_rate_ms = 0
            player_speed = 0.0
            adversary_speed = -0.3

            [fear]
            capture_radius = -2.0
        "#;
        let cfg = GameConfig::from_toml(parse_toml(text));
        assert_eq!(cfg.speed.tick_rate_ms, 1);
        assert_eq!(cfg.speed.player_speed, 0.25);
        assert_eq!(cfg.speed.adversary_speed, 0.20);
        assert_eq!(cfg.fear.capture_radius, 1.6);
    }

    #[test]
    fn positive_tuning_is_kept() {
        let text = r#"
            [speed]
            player_speed = 0.4

            [fear]
            capture_radius = 0.9
        "#;
        let cfg = GameConfig::from_toml(parse_toml(text));
        assert_eq!(cfg.speed.player_speed, 0.4);
        assert_eq!(cfg.fear.capture_radius, 0.9);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
            [fear]
            fear_ticks = 40

            [general]
            seed = 7
        "#;
        let cfg = GameConfig::from_toml(parse_toml(text));
        assert_eq!(cfg.fear.fear_ticks, 40);
        assert_eq!(cfg.fear.warn_ticks, 50);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.speed.player_speed, 0.25);
        assert_eq!(cfg.log_file, PathBuf::from("mazechase.log"));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let cfg = GameConfig::from_toml(parse_toml("[speed\ntick_rate_ms = "));
        assert_eq!(cfg.speed.tick_rate_ms, 50);
    }

    #[test]
    fn zero_tick_rate_is_clamped() {
        let cfg = GameConfig::from_toml(parse_toml("[speed]\ntick_rate_ms = 0"));
        assert_eq!(cfg.speed.tick_rate_ms, 1);
    }
}
