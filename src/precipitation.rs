use serde::{Deserialize, Serialize};

use crate::{config::PrecipitationParams, geo::LatLng, hurricane::Category, rng::DeterministicRng};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationPoint {
    pub lat: f64,
    pub lng: f64,
    /// Relative rain rate in `[0, 1]`.
    pub intensity: f64,
    /// Footprint radius in metres.
    pub radius: f64,
}

/// One broad light footprint plus a cluster of narrow heavy cells around
/// `center`. Stronger storms get more, larger and heavier cells.
pub fn burst(
    center: LatLng,
    category: Category,
    params: &PrecipitationParams,
    rng: &mut DeterministicRng,
) -> Vec<PrecipitationPoint> {
    let level = f64::from(category.level());
    let scale = 1.0 + params.category_scale * level;
    let narrow_count = params.narrow_point_count + usize::from(category.level());

    let mut points = Vec::with_capacity(narrow_count + 1);
    points.push(PrecipitationPoint {
        lat: center.lat + rng.jitter(params.jitter_deg * 0.25),
        lng: center.lng + rng.jitter(params.jitter_deg * 0.25),
        intensity: (params.broad_intensity * scale).min(1.0),
        radius: params.broad_radius_m * scale,
    });
    for _ in 0..narrow_count {
        points.push(PrecipitationPoint {
            lat: center.lat + rng.jitter(params.jitter_deg),
            lng: center.lng + rng.jitter(params.jitter_deg),
            intensity: (params.narrow_intensity * scale * rng.range_f64(0.8, 1.2)).min(1.0),
            radius: params.narrow_radius_m * scale,
        });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_has_one_broad_point_and_scaled_narrow_cells() {
        let params = PrecipitationParams::default();
        let mut rng = DeterministicRng::new(3);
        let center = LatLng::new(20.0, -60.0);

        let weak = burst(center, Category::TropicalStorm, &params, &mut rng);
        assert_eq!(weak.len(), 1 + params.narrow_point_count);
        assert!(weak[0].radius > weak[1].radius);
        assert!(weak[0].intensity < weak[1].intensity);

        let strong = burst(center, Category::Four, &params, &mut rng);
        assert_eq!(strong.len(), 1 + params.narrow_point_count + 4);
        assert!(strong[0].radius > weak[0].radius);
        for point in &strong {
            assert!((point.lat - center.lat).abs() <= params.jitter_deg);
            assert!((point.lng - center.lng).abs() <= params.jitter_deg);
            assert!(point.intensity <= 1.0);
        }
    }

    #[test]
    fn bursts_are_reproducible_for_a_seed() {
        let params = PrecipitationParams::default();
        let center = LatLng::new(25.0, -70.0);
        let a = burst(center, Category::Two, &params, &mut DeterministicRng::new(11));
        let b = burst(center, Category::Two, &params, &mut DeterministicRng::new(11));
        assert_eq!(a, b);
    }
}
