pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod hurricane;
pub mod precipitation;
pub mod pressure_system;
pub mod rng;
pub mod scheduler;
pub mod spatial;
pub mod temperature;
pub mod wind;
pub mod wind_field;

pub use config::{ConfigLoader, EngineConfig};
pub use engine::{Engine, EngineSnapshot, Landfall, RunState, TrackPoint};
pub use error::EngineError;
pub use geo::{LatLng, LatLngBounds};
pub use hurricane::{Category, Hurricane};
pub use pressure_system::{PressureKind, PressureSystem, WindPerturbation};
pub use wind::{Season, SeasonalWindData, WindDataset, WindPoint, WindVector};
