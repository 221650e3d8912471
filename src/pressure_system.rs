use serde::{Deserialize, Serialize};

use crate::{
    config::PressureSystemParams,
    geo::LatLng,
    wind::{WindPoint, WindVector},
};

/// Seconds of travel used to turn a wind vector into a displacement and back.
const REFERENCE_INTERVAL_S: f64 = 3_600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureKind {
    High,
    Low,
}

/// Compact serialized form of a pressure system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureSystemRecord {
    #[serde(rename = "type")]
    pub kind: PressureKind,
    pub center: LatLng,
    pub strength: f64,
}

/// Anything that perturbs the regional wind field around a center.
pub trait WindPerturbation {
    fn kind(&self) -> PressureKind;
    fn center(&self) -> LatLng;
    fn strength(&self) -> f64;
    fn range(&self) -> f64;
    fn apply_to_wind_point(&self, wind: &WindPoint) -> WindVector;

    /// Distance to `point` as a fraction of the range, when inside it.
    fn range_fraction(&self, point: &LatLng) -> Option<f64> {
        let range = self.range();
        if range <= 0.0 {
            return None;
        }
        let d = self.center().distance_to(point) / range;
        (d < 1.0).then_some(d)
    }
}

#[derive(Debug, Clone)]
pub struct PressureSystem {
    kind: PressureKind,
    center: LatLng,
    strength: f64,
    last_valid_center: LatLng,
    params: PressureSystemParams,
}

impl PressureSystem {
    pub fn new(kind: PressureKind, center: LatLng, strength: f64, params: PressureSystemParams) -> Self {
        let center = clamp_to_hemisphere(center, params.min_lat);
        Self {
            kind,
            center,
            strength,
            last_valid_center: center,
            params,
        }
    }

    pub fn from_record(record: &PressureSystemRecord, params: PressureSystemParams) -> Self {
        Self::new(record.kind, record.center, record.strength, params)
    }

    pub fn to_record(&self) -> PressureSystemRecord {
        PressureSystemRecord {
            kind: self.kind,
            center: self.center,
            strength: self.strength,
        }
    }

    pub fn is_active(&self) -> bool {
        self.strength > 0.0
    }

    pub fn last_valid_center(&self) -> LatLng {
        self.last_valid_center
    }

    pub fn params(&self) -> &PressureSystemParams {
        &self.params
    }

    /// Moves the system while dragging. The literal position is always kept so
    /// the marker follows the pointer; only positions far enough from `others`
    /// become the snap-back target.
    pub fn set_center(&mut self, center: LatLng, others: &[LatLng]) {
        let center = clamp_to_hemisphere(center, self.params.min_lat);
        self.center = center;
        if self.is_valid_position(center, others) {
            self.last_valid_center = center;
        }
    }

    /// Drag release: snap back to the last valid center if too close to another system.
    pub fn check_pressure_system(&mut self, others: &[LatLng]) {
        if !self.is_valid_position(self.center, others) {
            self.center = self.last_valid_center;
        }
    }

    pub fn set_strength(&mut self, strength: f64) {
        self.strength = strength;
    }

    /// Moves the center without the drag-time latitude floor.
    pub(crate) fn place(&mut self, center: LatLng) {
        self.center = center;
        self.last_valid_center = center;
    }

    fn is_valid_position(&self, center: LatLng, others: &[LatLng]) -> bool {
        others
            .iter()
            .map(|other| center.distance_to(other))
            .fold(f64::INFINITY, f64::min)
            >= self.params.min_pressure_system_distance
    }
}

impl WindPerturbation for PressureSystem {
    fn kind(&self) -> PressureKind {
        self.kind
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn strength(&self) -> f64 {
        self.strength
    }

    fn range(&self) -> f64 {
        (self.strength * self.params.range_per_strength).max(0.0)
    }

    fn apply_to_wind_point(&self, wind: &WindPoint) -> WindVector {
        let original = wind.vector();
        let point = wind.position();
        let d = match self.range_fraction(&point) {
            Some(d) => d,
            None => return original,
        };

        let params = &self.params;
        let (turn, offset, falloff) = match self.kind {
            PressureKind::High => (90.0, params.high_angle_offset_deg, d.powf(params.high_exponent)),
            PressureKind::Low => (
                -90.0,
                params.low_angle_offset_deg,
                1.0 - d.powf(params.low_exponent),
            ),
        };
        let bearing = self.center.bearing_to(&point) + turn + offset;
        let length = self.strength * falloff;

        let downwind = point.translate_m(
            original.u * REFERENCE_INTERVAL_S,
            original.v * REFERENCE_INTERVAL_S,
        );
        let influenced = downwind.destination(bearing, length * REFERENCE_INTERVAL_S);
        let (east, north) = point.offset_m(&influenced);
        let vector = WindVector::new(east / REFERENCE_INTERVAL_S, north / REFERENCE_INTERVAL_S);

        if d > params.smoothing_ratio {
            let t = (d - params.smoothing_ratio) / (1.0 - params.smoothing_ratio);
            vector.lerp(&original, t)
        } else {
            vector
        }
    }
}

fn clamp_to_hemisphere(center: LatLng, min_lat: f64) -> LatLng {
    LatLng::new(center.lat.max(min_lat), center.lng)
}
