use std::f64::consts::PI;

use image::{ImageFormat, RgbaImage};

use super::scale::TemperatureScale;
use crate::{error::EngineError, wind::Season};

/// Web-Mercator tile edge; a raster `256 * 2^z` pixels wide covers the world at zoom `z`.
const TILE_SIZE: u32 = 256;

/// Decoded SST raster for one season. Fully transparent pixels are land.
#[derive(Debug, Clone)]
pub struct TemperatureRaster {
    season: Season,
    zoom: u32,
    pixels: RgbaImage,
}

impl TemperatureRaster {
    pub fn decode(season: Season, bytes: &[u8]) -> Result<Self, EngineError> {
        let pixels = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|source| EngineError::RasterDecode { season, source })?
            .to_rgba8();
        Self::from_rgba(season, pixels)
    }

    pub fn from_rgba(season: Season, pixels: RgbaImage) -> Result<Self, EngineError> {
        let (width, height) = pixels.dimensions();
        let tiles = width / TILE_SIZE;
        if width % TILE_SIZE != 0 || !tiles.is_power_of_two() || height == 0 {
            return Err(EngineError::RasterShape { width, height });
        }
        Ok(Self {
            season,
            zoom: tiles.trailing_zeros(),
            pixels,
        })
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// SST in °C, or `None` over land and outside the raster.
    pub fn temperature_at(&self, lat: f64, lng: f64) -> Option<f64> {
        let (x, y) = pixel_for(lat, lng, self.zoom)?;
        let (width, height) = self.pixels.dimensions();
        if x >= width || y >= height {
            return None;
        }
        let [r, g, b, a] = self.pixels.get_pixel(x, y).0;
        if a == 0 {
            return None;
        }
        TemperatureScale::standard().temperature([r, g, b])
    }
}

/// Web-Mercator pixel containing (`lat`, `lng`) at `zoom`.
pub fn pixel_for(lat: f64, lng: f64, zoom: u32) -> Option<(u32, u32)> {
    let world = f64::from(TILE_SIZE * (1 << zoom));
    let phi = lat.to_radians();
    let x = (lng + 180.0) / 360.0 * world;
    let y = (1.0 - (phi.tan() + 1.0 / phi.cos()).ln() / PI) / 2.0 * world;
    if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 || x >= world || y >= world {
        return None;
    }
    Some((x.floor() as u32, y.floor() as u32))
}
