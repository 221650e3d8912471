#![allow(dead_code)]

use std::io::Cursor;

use hurricane_sim::{
    config::EngineConfig,
    hurricane::HurricaneOptions,
    scheduler::QueuedFrames,
    temperature::{pixel_for, TemperatureRaster, TemperatureScale},
    Engine, LatLng, Season, SeasonalWindData, WindDataset, WindPoint, WindVector,
};
use image::{ImageFormat, Rgba, RgbaImage};

pub const RASTER_ZOOM: u32 = 1;

/// 5° grid over the tropical Atlantic with the same vector everywhere.
pub fn uniform_wind(season: Season, u: f64, v: f64) -> WindDataset {
    let mut points = Vec::new();
    for lat in (0..=60).step_by(5) {
        for lng in (-100..=0).step_by(5) {
            points.push(WindPoint::new(lat as f64, lng as f64, u, v));
        }
    }
    WindDataset::new(season, points).expect("grid is non-empty")
}

/// Ocean at `celsius` everywhere, land (transparent) east of `coast_lng`.
pub fn raster_pixels(celsius: f64, coast_lng: Option<f64>) -> RgbaImage {
    let [r, g, b] = TemperatureScale::color(celsius);
    let mut pixels = RgbaImage::from_pixel(512, 512, Rgba([r, g, b, 255]));
    if let Some(coast) = coast_lng {
        let (coast_x, _) = pixel_for(0.0, coast, RASTER_ZOOM).expect("coast on map");
        for (x, _, pixel) in pixels.enumerate_pixels_mut() {
            if x >= coast_x {
                *pixel = Rgba([0, 0, 0, 0]);
            }
        }
    }
    pixels
}

pub fn all_land_pixels() -> RgbaImage {
    RgbaImage::from_pixel(512, 512, Rgba([0, 0, 0, 0]))
}

pub fn png_bytes(pixels: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    pixels
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

/// Default constants, no pressure systems, a resting storm at 20°N 50°W.
pub fn quiet_config() -> EngineConfig {
    EngineConfig {
        pressure_systems: Vec::new(),
        hurricane: HurricaneOptions {
            center: LatLng::new(20.0, -50.0),
            speed: WindVector::ZERO,
            strength: 30.0,
        },
        ..EngineConfig::default()
    }
}

pub fn engine_with(config: EngineConfig, wind: WindDataset) -> Engine {
    let data = SeasonalWindData::new().with_dataset(wind);
    Engine::new(config, data, QueuedFrames::new()).expect("engine builds")
}

/// Engine with its raster already installed.
pub fn ready_engine(config: EngineConfig, wind: WindDataset, pixels: RgbaImage) -> Engine {
    let season = config.season;
    let mut engine = engine_with(config, wind);
    let raster = TemperatureRaster::from_rgba(season, pixels).expect("valid raster");
    assert!(engine.install_raster(raster));
    engine
}
