use std::{collections::HashMap, sync::OnceLock};

pub const SCALE_MIN_C: f64 = 0.0;
pub const SCALE_MAX_C: f64 = 32.0;

/// Ramp stops, coldest first.
const STOPS: [(f64, [u8; 3]); 6] = [
    (0.0, [0, 0, 255]),
    (8.0, [0, 255, 255]),
    (16.0, [0, 255, 0]),
    (24.0, [255, 255, 0]),
    (28.0, [255, 128, 0]),
    (32.0, [255, 0, 0]),
];

/// Linear color ramp over temperatures quantized to hundredths of a degree,
/// together with its precomputed inverse.
#[derive(Debug)]
pub struct TemperatureScale {
    inverse: HashMap<[u8; 3], f64>,
}

impl TemperatureScale {
    /// The ramp every SST raster is encoded with.
    pub fn standard() -> &'static TemperatureScale {
        static SCALE: OnceLock<TemperatureScale> = OnceLock::new();
        SCALE.get_or_init(TemperatureScale::build)
    }

    fn build() -> Self {
        // Neighbouring hundredths can share a color; such a run maps back to
        // its middle temperature.
        let steps = ((SCALE_MAX_C - SCALE_MIN_C) * 100.0).round() as i64;
        let mut runs: HashMap<[u8; 3], (f64, f64)> = HashMap::new();
        for step in 0..=steps {
            let t = quantize(SCALE_MIN_C + step as f64 / 100.0);
            runs.entry(Self::color(t))
                .and_modify(|run| run.1 = t)
                .or_insert((t, t));
        }
        let inverse = runs
            .into_iter()
            .map(|(color, (first, last))| (color, quantize((first + last) / 2.0)))
            .collect();
        Self { inverse }
    }

    /// Color for `celsius`, clamped to the ramp's domain.
    pub fn color(celsius: f64) -> [u8; 3] {
        let t = quantize(celsius.clamp(SCALE_MIN_C, SCALE_MAX_C));
        let upper = STOPS
            .iter()
            .position(|(stop, _)| t <= *stop)
            .unwrap_or(STOPS.len() - 1)
            .max(1);
        let (t0, c0) = STOPS[upper - 1];
        let (t1, c1) = STOPS[upper];
        let f = (t - t0) / (t1 - t0);
        let channel = |i: usize| (c0[i] as f64 + (c1[i] as f64 - c0[i] as f64) * f).round() as u8;
        [channel(0), channel(1), channel(2)]
    }

    /// Exact inverse lookup; colors the ramp never produces have no temperature.
    pub fn temperature(&self, color: [u8; 3]) -> Option<f64> {
        self.inverse.get(&color).copied()
    }
}

fn quantize(celsius: f64) -> f64 {
    (celsius * 100.0).round() / 100.0
}
