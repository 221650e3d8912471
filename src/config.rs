//! Engine configuration: initial state plus every physical constant and cadence.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    error::EngineError,
    geo::LatLng,
    hurricane::HurricaneOptions,
    pressure_system::{PressureKind, PressureSystemRecord},
    wind::{Season, WindVector},
};

fn default_seed() -> u64 {
    1
}

fn default_season() -> Season {
    Season::Summer
}

fn default_pressure_systems() -> Vec<PressureSystemRecord> {
    vec![
        PressureSystemRecord {
            kind: PressureKind::High,
            center: LatLng::new(34.0, -42.0),
            strength: 13.0,
        },
        PressureSystemRecord {
            kind: PressureKind::Low,
            center: LatLng::new(44.0, -82.0),
            strength: 14.0,
        },
    ]
}

fn default_hurricane() -> HurricaneOptions {
    HurricaneOptions {
        center: LatLng::new(14.0, -30.0),
        speed: WindVector::new(-2.0, 0.0),
        strength: 20.0,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_season")]
    pub season: Season,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default = "default_pressure_systems")]
    pub pressure_systems: Vec<PressureSystemRecord>,
    #[serde(default = "default_hurricane")]
    pub hurricane: HurricaneOptions,
    #[serde(default)]
    pub physics: PressureSystemParams,
    #[serde(default)]
    pub dynamics: HurricaneParams,
    #[serde(default)]
    pub clock: ClockParams,
    #[serde(default)]
    pub precipitation: PrecipitationParams,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            season: default_season(),
            data: DataConfig::default(),
            pressure_systems: default_pressure_systems(),
            hurricane: default_hurricane(),
            physics: PressureSystemParams::default(),
            dynamics: HurricaneParams::default(),
            clock: ClockParams::default(),
            precipitation: PrecipitationParams::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let clock = &self.clock;
        for (name, value) in [
            ("clock.timestep", clock.timestep),
            ("clock.track_interval", clock.track_interval),
            ("clock.sst_check_interval", clock.sst_check_interval),
            ("clock.precipitation_interval", clock.precipitation_interval),
        ] {
            if value == 0 {
                return Err(EngineError::InvalidConfig(format!("{name} must be positive")));
            }
        }

        let constants = [
            ("physics.min_lat", self.physics.min_lat),
            ("physics.range_per_strength", self.physics.range_per_strength),
            ("physics.high_exponent", self.physics.high_exponent),
            ("physics.low_exponent", self.physics.low_exponent),
            ("physics.smoothing_ratio", self.physics.smoothing_ratio),
            ("dynamics.momentum", self.dynamics.momentum),
            ("dynamics.acceleration_gain", self.dynamics.acceleration_gain),
            ("dynamics.min_hurricane_strength", self.dynamics.min_hurricane_strength),
            ("clock.dt_seconds", self.clock.dt_seconds),
            ("clock.min_merge_distance", self.clock.min_merge_distance),
            ("hurricane.strength", self.hurricane.strength),
        ];
        for (name, value) in constants {
            if !value.is_finite() {
                return Err(EngineError::InvalidConfig(format!("{name} must be finite")));
            }
        }

        if !(0.0..1.0).contains(&self.physics.smoothing_ratio) {
            return Err(EngineError::InvalidConfig(
                "physics.smoothing_ratio must be in [0, 1)".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.dynamics.momentum) {
            return Err(EngineError::InvalidConfig(
                "dynamics.momentum must be in [0, 1]".into(),
            ));
        }
        if self.clock.dt_seconds <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "clock.dt_seconds must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Where the seasonal wind datasets and SST rasters live. `{season}` in a
/// pattern is replaced by the lowercase season name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub wind_pattern: String,
    pub raster_pattern: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            wind_pattern: "wind-{season}.json".to_string(),
            raster_pattern: "sst-{season}.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureSystemParams {
    /// Northern-hemisphere floor for every system center, degrees.
    pub min_lat: f64,
    /// Metres of influence radius per unit of strength.
    pub range_per_strength: f64,
    pub high_angle_offset_deg: f64,
    pub low_angle_offset_deg: f64,
    pub high_exponent: f64,
    pub low_exponent: f64,
    pub smoothing_ratio: f64,
    pub min_pressure_system_distance: f64,
}

impl Default for PressureSystemParams {
    fn default() -> Self {
        Self {
            min_lat: 10.0,
            range_per_strength: 200_000.0,
            high_angle_offset_deg: -10.0,
            low_angle_offset_deg: -20.0,
            high_exponent: 0.25,
            low_exponent: 4.0,
            smoothing_ratio: 0.75,
            min_pressure_system_distance: 1_000_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HurricaneParams {
    pub momentum: f64,
    pub acceleration_gain: f64,
    pub min_hurricane_strength: f64,
    pub warm_sst_threshold: f64,
    pub cat3_unlock_sst: f64,
    /// Strength change per step per degree above (or below) the warm threshold.
    pub sst_strength_gain: f64,
    pub land_strength_change: f64,
}

impl Default for HurricaneParams {
    fn default() -> Self {
        Self {
            momentum: 0.98,
            acceleration_gain: 2.0e-5,
            min_hurricane_strength: 10.0,
            warm_sst_threshold: 26.0,
            cat3_unlock_sst: 28.5,
            sst_strength_gain: 0.005,
            land_strength_change: -0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockParams {
    pub timestep: u64,
    /// Simulated seconds per step fed to the hurricane integrator.
    pub dt_seconds: f64,
    pub track_interval: u64,
    pub sst_check_interval: u64,
    pub precipitation_interval: u64,
    pub landfall_debounce_steps: u32,
    pub min_merge_distance: f64,
    pub step_rate_window: usize,
}

impl Default for ClockParams {
    fn default() -> Self {
        Self {
            timestep: 1,
            dt_seconds: 600.0,
            track_interval: 15,
            sst_check_interval: 60,
            precipitation_interval: 5,
            landfall_debounce_steps: 10,
            min_merge_distance: 400_000.0,
            step_rate_window: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecipitationParams {
    pub narrow_point_count: usize,
    pub jitter_deg: f64,
    pub broad_radius_m: f64,
    pub broad_intensity: f64,
    pub narrow_radius_m: f64,
    pub narrow_intensity: f64,
    /// Fractional growth of radius and intensity per category.
    pub category_scale: f64,
}

impl Default for PrecipitationParams {
    fn default() -> Self {
        Self {
            narrow_point_count: 3,
            jitter_deg: 1.0,
            broad_radius_m: 300_000.0,
            broad_intensity: 0.2,
            narrow_radius_m: 40_000.0,
            narrow_intensity: 0.5,
            category_scale: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<EngineConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: EngineConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }
}
