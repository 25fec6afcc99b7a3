/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Missing file or missing keys fall back to defaults. A file that fails
/// to parse or validate is reported on stderr and the defaults are used.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::enemy::{EnemyKind, DEMO_SIZE};
use crate::domain::geometry::Bounds;
use crate::sim::spawner::SpawnPolicy;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub game: GameParams,
    /// Fixed RNG seed for replayable games. `None` = fresh entropy per game.
    pub seed: Option<u64>,
    pub log: LogConfig,
}

/// Everything a new game needs to lay out the playfield.
#[derive(Clone, Debug, PartialEq)]
pub struct GameParams {
    pub bounds: Bounds,
    pub level: u32,
    pub tick_rate_ms: u64,
    pub player_speed: f64,
    pub player_size: f64,
    pub home_size: f64,
    pub enemy_size: f64,
    pub spawn: SpawnPolicy,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Log destination. The terminal belongs to the game, so without a
    /// file nothing is logged.
    pub file: Option<PathBuf>,
    pub filter: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    screen: TomlScreen,
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    home: TomlHome,
    #[serde(default)]
    enemy: TomlEnemy,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlScreen {
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_level")]
    level: u32,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_player_speed")]
    speed: f64,
    #[serde(default = "default_player_size")]
    size: f64,
}

#[derive(Deserialize, Debug)]
struct TomlHome {
    #[serde(default = "default_home_size")]
    size: f64,
}

#[derive(Deserialize, Debug)]
struct TomlEnemy {
    #[serde(default = "default_enemy_size")]
    size: f64,
    #[serde(default = "default_spawn")]
    spawn: String,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default)]
    file: Option<String>,
    #[serde(default = "default_log_filter")]
    filter: String,
}

// ── Defaults ──

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 500 }
fn default_level() -> u32 { 1 }
fn default_tick_rate() -> u64 { 30 }
fn default_player_speed() -> f64 { 5.0 }
fn default_player_size() -> f64 { 10.0 }
fn default_home_size() -> f64 { 20.0 }
fn default_enemy_size() -> f64 { 20.0 }
fn default_spawn() -> String { "tiered".into() }
fn default_log_filter() -> String { "info".into() }

impl Default for TomlScreen {
    fn default() -> Self {
        TomlScreen { width: default_width(), height: default_height() }
    }
}

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame { level: default_level(), tick_rate_ms: default_tick_rate(), seed: None }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer { speed: default_player_speed(), size: default_player_size() }
    }
}

impl Default for TomlHome {
    fn default() -> Self {
        TomlHome { size: default_home_size() }
    }
}

impl Default for TomlEnemy {
    fn default() -> Self {
        TomlEnemy { size: default_enemy_size(), spawn: default_spawn() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: None, filter: default_log_filter() }
    }
}

impl Default for GameParams {
    fn default() -> Self {
        GameParams {
            bounds: Bounds::new(default_width(), default_height()),
            level: default_level(),
            tick_rate_ms: default_tick_rate(),
            player_speed: default_player_speed(),
            player_size: default_player_size(),
            home_size: default_home_size(),
            enemy_size: default_enemy_size(),
            spawn: SpawnPolicy::Tiered,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            game: GameParams::default(),
            seed: None,
            log: LogConfig { file: None, filter: default_log_filter() },
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/turtle-adventure.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() { continue; }
            match Self::from_path(&path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    eprintln!("Warning: {e}");
                    eprintln!("Using default settings.");
                    return GameConfig::default();
                }
            }
        }
        GameConfig::default()
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: TomlConfig = toml::from_str(text)?;
        raw.validate()
    }
}

impl TomlConfig {
    fn validate(self) -> Result<GameConfig, ConfigError> {
        let TomlConfig { screen, game, player, home, enemy, log } = self;

        if screen.width == 0 || screen.height == 0 {
            return Err(invalid("screen", format!("{}x{} has no area", screen.width, screen.height)));
        }
        if game.level == 0 {
            return Err(invalid("game.level", "levels start at 1".into()));
        }
        if game.tick_rate_ms == 0 {
            return Err(invalid("game.tick_rate_ms", "must be positive".into()));
        }
        positive("player.speed", player.speed)?;
        positive("player.size", player.size)?;
        positive("home.size", home.size)?;
        positive("enemy.size", enemy.size)?;

        let spawn = parse_spawn(&enemy.spawn)?;

        // Enemies are placed inside [size, dim - size] on each axis.
        // Demo enemies ignore the configured size and always use DEMO_SIZE.
        let (key, placed) = match spawn {
            SpawnPolicy::Fixed(EnemyKind::Demo) => ("enemy.spawn", enemy.size.max(DEMO_SIZE)),
            _ => ("enemy.size", enemy.size),
        };
        let shortest = screen.width.min(screen.height) as f64;
        if placed * 2.0 >= shortest {
            return Err(invalid(
                key,
                format!("size {placed} leaves no room on a {}x{} screen", screen.width, screen.height),
            ));
        }

        Ok(GameConfig {
            game: GameParams {
                bounds: Bounds::new(screen.width, screen.height),
                level: game.level,
                tick_rate_ms: game.tick_rate_ms,
                player_speed: player.speed,
                player_size: player.size,
                home_size: home.size,
                enemy_size: enemy.size,
                spawn,
            },
            seed: game.seed,
            log: LogConfig {
                file: log.file.filter(|f| !f.is_empty()).map(PathBuf::from),
                filter: log.filter,
            },
        })
    }
}

fn parse_spawn(name: &str) -> Result<SpawnPolicy, ConfigError> {
    if name == "tiered" {
        return Ok(SpawnPolicy::Tiered);
    }
    EnemyKind::from_name(name)
        .map(SpawnPolicy::Fixed)
        .ok_or_else(|| invalid("enemy.spawn", format!("unknown enemy kind `{name}`")))
}

fn positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(key, format!("{value} is not a positive number")))
    }
}

fn invalid(key: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { key, reason }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/turtle-adventure");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    dirs
}
