use thiserror::Error;

use crate::wind::Season;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("wind dataset for {0} is empty")]
    EmptyWindDataset(Season),
    #[error("no wind dataset loaded for {0}")]
    MissingSeason(Season),
    #[error("failed to decode {season} temperature raster: {source}")]
    RasterDecode {
        season: Season,
        #[source]
        source: image::ImageError,
    },
    #[error("temperature raster is {width}x{height}; width must be 256 * 2^zoom")]
    RasterShape { width: u32, height: u32 },
    #[error("simulation is not ready (raster loading or hurricane inactive)")]
    NotReady,
    #[error("simulation has finished; reset before starting again")]
    Finished,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no pressure system at index {0}")]
    UnknownPressureSystem(usize),
}
