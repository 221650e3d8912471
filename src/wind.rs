use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{error::EngineError, geo::LatLng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wind velocity in m/s; `u` points east, `v` points north.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindVector {
    pub u: f64,
    pub v: f64,
}

impl WindVector {
    pub const ZERO: WindVector = WindVector { u: 0.0, v: 0.0 };

    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    pub fn speed(&self) -> f64 {
        self.u.hypot(self.v)
    }

    pub fn lerp(&self, other: &WindVector, t: f64) -> WindVector {
        WindVector::new(
            self.u + (other.u - self.u) * t,
            self.v + (other.v - self.v) * t,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindPoint {
    pub lat: f64,
    pub lng: f64,
    pub u: f64,
    pub v: f64,
}

impl WindPoint {
    pub fn new(lat: f64, lng: f64, u: f64, v: f64) -> Self {
        Self { lat, lng, u, v }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn vector(&self) -> WindVector {
        WindVector::new(self.u, self.v)
    }

    pub fn with_vector(&self, vector: WindVector) -> WindPoint {
        WindPoint::new(self.lat, self.lng, vector.u, vector.v)
    }
}

/// Immutable base wind field for one season.
#[derive(Debug, Clone)]
pub struct WindDataset {
    season: Season,
    points: Vec<WindPoint>,
}

impl WindDataset {
    pub fn new(season: Season, points: Vec<WindPoint>) -> Result<Self, EngineError> {
        if points.is_empty() {
            return Err(EngineError::EmptyWindDataset(season));
        }
        Ok(Self { season, points })
    }

    pub fn from_json(season: Season, json: &str) -> Result<Self> {
        let points: Vec<WindPoint> = serde_json::from_str(json)
            .with_context(|| format!("Failed to parse {season} wind dataset"))?;
        Ok(Self::new(season, points)?)
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn points(&self) -> &[WindPoint] {
        &self.points
    }
}

/// One base dataset per season, loaded up front as static resources.
#[derive(Debug, Clone, Default)]
pub struct SeasonalWindData {
    datasets: HashMap<Season, WindDataset>,
}

impl SeasonalWindData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, dataset: WindDataset) -> Self {
        self.insert(dataset);
        self
    }

    pub fn insert(&mut self, dataset: WindDataset) {
        self.datasets.insert(dataset.season(), dataset);
    }

    pub fn get(&self, season: Season) -> Option<&WindDataset> {
        self.datasets.get(&season)
    }

    pub fn seasons(&self) -> impl Iterator<Item = Season> + '_ {
        self.datasets.keys().copied()
    }

    /// Loads every season whose file exists under `dir`. `pattern` names the
    /// file with `{season}` standing in for the season name.
    pub fn load_dir(dir: impl AsRef<Path>, pattern: &str) -> Result<Self> {
        let mut data = Self::new();
        for season in Season::ALL {
            let path = season_path(dir.as_ref(), pattern, season);
            if !path.exists() {
                continue;
            }
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read wind dataset {}", path.display()))?;
            let dataset = WindDataset::from_json(season, &json)
                .with_context(|| format!("Invalid wind dataset {}", path.display()))?;
            tracing::debug!(%season, points = dataset.points().len(), "loaded wind dataset");
            data.insert(dataset);
        }
        Ok(data)
    }
}

pub fn season_path(dir: &Path, pattern: &str, season: Season) -> PathBuf {
    dir.join(pattern.replace("{season}", season.as_str()))
}
