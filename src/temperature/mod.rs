//! Sea-surface temperature lookup from color-coded seasonal rasters.

mod raster;
mod scale;

pub use raster::{pixel_for, TemperatureRaster};
pub use scale::{TemperatureScale, SCALE_MAX_C, SCALE_MIN_C};
