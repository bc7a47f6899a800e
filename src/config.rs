use crate::game::judgment::HitWindow;
use crate::game::spawner::SpawnPolicy;
use configparser::ini::Ini;
use log::{info, warn};
use once_cell::sync::Lazy;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

// Window
pub const WINDOW_TITLE: &str = "Fretfall";
pub const DEFAULT_CONFIG_PATH: &str = "fretfall.ini";

// Track geometry, in scroll-axis units
pub const HIT_POSITION: f32 = 10.0;
pub const HIT_TOLERANCE: f32 = 1.0;
pub const TRACK_LENGTH: f32 = 45.0;
pub const SCROLL_SPEED: f32 = 0.2; // Per rendered frame

// Spawning
pub const SPAWN_CHANCE: f64 = 0.02;
pub const LONG_NOTE_CHANCE: f64 = 0.3;
pub const LONG_NOTE_MIN_LENGTH: f32 = 5.0;
pub const LONG_NOTE_MAX_LENGTH: f32 = 10.0;

/// Where the spawner's randomness comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedSetting {
    #[default]
    Random,
    Fixed(u64),
}

impl fmt::Display for SeedSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedSetting::Random => write!(f, "random"),
            SeedSetting::Fixed(seed) => write!(f, "{}", seed),
        }
    }
}

impl FromStr for SeedSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("random") {
            return Ok(SeedSetting::Random);
        }
        trimmed
            .parse::<u64>()
            .map(SeedSetting::Fixed)
            .map_err(|_| format!("Seed '{}' must be 'random' or an unsigned integer", trimmed))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub display_width: u32,
    pub display_height: u32,
    pub scroll_speed: f32,
    pub hit_position: f32,
    pub hit_tolerance: f32,
    pub track_length: f32,
    pub spawn_chance: f64,
    pub long_note_chance: f64,
    pub long_note_min_length: f32,
    pub long_note_max_length: f32,
    pub seed: SeedSetting,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_width: 1280,
            display_height: 720,
            scroll_speed: SCROLL_SPEED,
            hit_position: HIT_POSITION,
            hit_tolerance: HIT_TOLERANCE,
            track_length: TRACK_LENGTH,
            spawn_chance: SPAWN_CHANCE,
            long_note_chance: LONG_NOTE_CHANCE,
            long_note_min_length: LONG_NOTE_MIN_LENGTH,
            long_note_max_length: LONG_NOTE_MAX_LENGTH,
            seed: SeedSetting::Random,
        }
    }
}

impl Config {
    /// Top of the track; every note starts here.
    pub fn spawn_position(&self) -> f32 {
        -self.track_length / 2.0
    }

    /// A note whose trailing edge passes this value has left the track.
    pub fn exit_threshold(&self) -> f32 {
        self.hit_position + self.track_length / 2.0
    }

    pub fn hit_window(&self) -> HitWindow {
        HitWindow {
            line: self.hit_position,
            tolerance: self.hit_tolerance,
        }
    }

    pub fn spawn_policy(&self) -> SpawnPolicy {
        SpawnPolicy {
            spawn_chance: self.spawn_chance,
            long_chance: self.long_note_chance,
            min_length: self.long_note_min_length,
            max_length: self.long_note_max_length,
        }
    }

    /// Reads every known key from `conf`, keeping defaults for anything
    /// missing or malformed.
    pub fn from_ini(conf: &Ini) -> Self {
        let d = Config::default();
        let config = Config {
            display_width: read(conf, "Display", "Width", d.display_width),
            display_height: read(conf, "Display", "Height", d.display_height),
            scroll_speed: read(conf, "Gameplay", "ScrollSpeed", d.scroll_speed),
            hit_position: read(conf, "Gameplay", "HitPosition", d.hit_position),
            hit_tolerance: read(conf, "Gameplay", "HitTolerance", d.hit_tolerance),
            track_length: read(conf, "Gameplay", "TrackLength", d.track_length),
            spawn_chance: read(conf, "Gameplay", "SpawnChance", d.spawn_chance),
            long_note_chance: read(conf, "Gameplay", "LongNoteChance", d.long_note_chance),
            long_note_min_length: read(conf, "Gameplay", "LongNoteMinLength", d.long_note_min_length),
            long_note_max_length: read(conf, "Gameplay", "LongNoteMaxLength", d.long_note_max_length),
            seed: read(conf, "Gameplay", "Seed", d.seed),
        };
        config.sanitized()
    }

    /// Clamps values into ranges the engine can run with.
    pub fn sanitized(mut self) -> Self {
        let d = Config::default();

        if !self.scroll_speed.is_finite() || self.scroll_speed <= 0.0 {
            warn!("ScrollSpeed {} must be positive; using {}.", self.scroll_speed, d.scroll_speed);
            self.scroll_speed = d.scroll_speed;
        }
        if !self.hit_tolerance.is_finite() || self.hit_tolerance <= 0.0 {
            warn!("HitTolerance {} must be positive; using {}.", self.hit_tolerance, d.hit_tolerance);
            self.hit_tolerance = d.hit_tolerance;
        }
        if !self.hit_position.is_finite() {
            self.hit_position = d.hit_position;
        }
        if !self.track_length.is_finite() || self.track_length <= 0.0 {
            warn!("TrackLength {} must be positive; using {}.", self.track_length, d.track_length);
            self.track_length = d.track_length;
        }

        self.spawn_chance = clamp_chance("SpawnChance", self.spawn_chance, d.spawn_chance);
        self.long_note_chance =
            clamp_chance("LongNoteChance", self.long_note_chance, d.long_note_chance);

        if !self.long_note_min_length.is_finite() || self.long_note_min_length < 0.0 {
            self.long_note_min_length = d.long_note_min_length;
        }
        if !self.long_note_max_length.is_finite() || self.long_note_max_length < 0.0 {
            self.long_note_max_length = d.long_note_max_length;
        }
        if self.long_note_min_length > self.long_note_max_length {
            warn!(
                "LongNoteMinLength {} exceeds LongNoteMaxLength {}; swapping.",
                self.long_note_min_length, self.long_note_max_length
            );
            std::mem::swap(&mut self.long_note_min_length, &mut self.long_note_max_length);
        }

        if self.display_width == 0 || self.display_height == 0 {
            self.display_width = d.display_width;
            self.display_height = d.display_height;
        }
        self
    }

    fn to_ini(&self) -> Ini {
        let mut conf = Ini::new();
        conf.set("Display", "Width", Some(self.display_width.to_string()));
        conf.set("Display", "Height", Some(self.display_height.to_string()));
        conf.set("Gameplay", "ScrollSpeed", Some(self.scroll_speed.to_string()));
        conf.set("Gameplay", "HitPosition", Some(self.hit_position.to_string()));
        conf.set("Gameplay", "HitTolerance", Some(self.hit_tolerance.to_string()));
        conf.set("Gameplay", "TrackLength", Some(self.track_length.to_string()));
        conf.set("Gameplay", "SpawnChance", Some(self.spawn_chance.to_string()));
        conf.set("Gameplay", "LongNoteChance", Some(self.long_note_chance.to_string()));
        conf.set("Gameplay", "LongNoteMinLength", Some(self.long_note_min_length.to_string()));
        conf.set("Gameplay", "LongNoteMaxLength", Some(self.long_note_max_length.to_string()));
        conf.set("Gameplay", "Seed", Some(self.seed.to_string()));
        conf
    }
}

fn read<T>(conf: &Ini, section: &str, key: &str, default: T) -> T
where
    T: FromStr + fmt::Display,
{
    let Some(raw) = conf.get(section, key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!("Invalid value '{}' for [{}] {}; using {}.", raw, section, key, default);
            default
        }
    }
}

fn clamp_chance(name: &str, value: f64, default: f64) -> f64 {
    if !value.is_finite() {
        warn!("{} is not a number; using {}.", name, default);
        return default;
    }
    if !(0.0..=1.0).contains(&value) {
        warn!("{} {} is outside [0, 1]; clamping.", name, value);
    }
    value.clamp(0.0, 1.0)
}

// Global static for the loaded configuration.
static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::default()));

fn create_default_file(path: &Path) -> Result<(), std::io::Error> {
    info!("Config file not found, creating defaults in '{}'.", path.display());
    Config::default().to_ini().write(path)
}

/// Loads `path` into the global config, writing a default file first if
/// none exists. Never fails: problems are logged and defaults kept.
pub fn load(path: &Path) {
    if !path.exists() {
        if let Err(e) = create_default_file(path) {
            warn!("Failed to create default config file: {}", e);
        }
    }

    let mut conf = Ini::new();
    let loaded = match conf.load(path) {
        Ok(_) => Config::from_ini(&conf),
        Err(e) => {
            warn!("Failed to load '{}' ({}), using defaults.", path.display(), e);
            Config::default()
        }
    };
    info!(
        "Config: scroll {} per frame, hit line {} ±{}, spawn chance {}, seed {}",
        loaded.scroll_speed, loaded.hit_position, loaded.hit_tolerance, loaded.spawn_chance, loaded.seed
    );

    *CONFIG.lock().unwrap_or_else(PoisonError::into_inner) = loaded;
}

/// Returns a copy of the currently loaded config.
pub fn get() -> Config {
    CONFIG.lock().unwrap_or_else(PoisonError::into_inner).clone()
}
