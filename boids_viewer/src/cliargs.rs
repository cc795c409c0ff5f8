use std::{fs, io, path::{Path, PathBuf}};

use boids_engine::{
    color::HexColor,
    options::{SettingsUpdate, SimulationSettings},
};
use clap_serde_derive::{
    clap::{self, Parser},
    serde::Serialize,
    ClapSerde,
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Interactive 2D flocking simulation (boids).
pub struct Args {
    /// Config file, YAML unless the extension is `.toml`
    #[arg(short, long = "config", default_value = "config.yaml")]
    pub config_path: PathBuf,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Serialize)]
/// Programatic configuration
///
/// Uses defaults, which can be overwritten by a config file given with `-c` or
/// `--config`, which in turn is overwritten by the flags below.
pub struct Config {
    #[default(1280)]
    #[arg(short = 'x', long)]
    pub init_width: u32,

    #[default(800)]
    #[arg(short = 'y', long)]
    pub init_height: u32,

    #[default(0)]
    #[arg(long)]
    /// seed for the initial placement, 0 picks one from the clock
    pub seed: u64,

    #[default(0)]
    #[arg(long = "fps")]
    /// simulation steps per second, 0 steps on every frame
    pub fps_limit: u32,

    #[default(100)]
    #[arg(short = 'n', long)]
    /// number of boids
    pub num_boids: usize,

    #[default(1.0)]
    #[arg(short = 's', long)]
    pub scale: f32,

    #[default("#558cf4".to_owned())]
    #[arg(long)]
    pub boid_color: String,

    #[default("#558cf4".to_owned())]
    #[arg(long)]
    pub trail_color: String,

    #[default(false)]
    #[arg(short = 't', long)]
    pub draw_trail: bool,

    #[default(15.)]
    #[arg(long = "max_speed")]
    pub speed_limit: f32,

    #[default(5.)]
    #[arg(long = "min_speed")]
    pub min_speed_limit: f32,

    #[default(false)]
    #[arg(long)]
    pub constant_speed: bool,

    #[default(10.)]
    #[arg(long = "const_speed")]
    pub constant_speed_value: f32,

    #[default(false)]
    #[arg(short = 'w', long = "wrap")]
    pub wraparound_mode: bool,

    #[default(75.)]
    #[arg(long = "visual_range")]
    pub visual_range: f32,

    #[default(0.005)]
    #[arg(long = "coh_coef")]
    pub centering_factor: f32,

    #[default(20.)]
    #[arg(long = "min_dist")]
    pub min_distance: f32,

    #[default(0.05)]
    #[arg(long = "sep_coef")]
    pub avoid_factor: f32,

    #[default(0.05)]
    #[arg(long = "ali_coef")]
    pub matching_factor: f32,

    #[default(0.1)]
    #[arg(long)]
    pub margin_fraction: f32,

    #[default(1.)]
    #[arg(long)]
    pub turn_factor: f32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error in yaml configuration {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("error in toml configuration {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Reads the config file, if there is one, and lays the command line flags
/// over it.
pub fn load_config(args: &mut Args) -> Result<Config, ConfigError> {
    let path = args.config_path.clone();

    if !path.exists() {
        info!(path = %path.display(), "no configuration file, using defaults and flags");
        return Ok(Config::from(&mut args.config));
    }

    let opt = read_opt(&path)?;
    info!(path = %path.display(), "loaded configuration file");
    Ok(Config::from(opt).merge(&mut args.config))
}

fn read_opt(path: &Path) -> Result<<Config as ClapSerde>::Opt, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;

    let is_toml = path.extension().map_or(false, |ext| ext == "toml");
    if is_toml {
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_owned(),
            source,
        })
    } else {
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_owned(),
            source,
        })
    }
}

fn parse_color(value: &str, fallback: HexColor) -> HexColor {
    value.parse().unwrap_or_else(|err| {
        warn!(value, %err, "ignoring colour");
        fallback
    })
}

impl Config {
    /// The initial settings snapshot. Bad colours fall back to the defaults,
    /// the speed pair is put in order.
    pub fn simulation_settings(&self) -> SimulationSettings {
        let defaults = SimulationSettings::default();

        let settings = SimulationSettings {
            num_boids: self.num_boids,
            scale: self.scale,
            boid_color: parse_color(&self.boid_color, defaults.boid_color),
            trail_color: parse_color(&self.trail_color, defaults.trail_color),
            draw_trail: self.draw_trail,
            speed_limit: self.speed_limit,
            min_speed_limit: self.min_speed_limit,
            constant_speed: self.constant_speed,
            constant_speed_value: self.constant_speed_value,
            wraparound_mode: self.wraparound_mode,
            visual_range: self.visual_range,
            centering_factor: self.centering_factor,
            min_distance: self.min_distance,
            avoid_factor: self.avoid_factor,
            matching_factor: self.matching_factor,
            margin_fraction: self.margin_fraction,
            turn_factor: self.turn_factor,
        };

        // re-applying the minimum pushes it below the maximum if needed
        match settings.apply(SettingsUpdate::MinSpeedLimit(self.min_speed_limit)) {
            Ok((settings, _)) => settings,
            Err(err) => {
                warn!(%err, "ignoring minimum speed");
                settings
            }
        }
    }
}
