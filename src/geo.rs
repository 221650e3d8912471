//! Spherical geometry on lat/lng points.
//!
//! Distances are great-circle (haversine) metres; bearings are degrees clockwise
//! from north. `translate_m` and `offset_m` use the small-angle approximation and
//! are exact inverses of each other.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = phi2 - phi1;
        let d_lambda = (other.lng - self.lng).to_radians();
        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }

    /// Initial great-circle bearing towards `other`, in `[0, 360)`.
    pub fn bearing_to(&self, other: &LatLng) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_lambda = (other.lng - self.lng).to_radians();
        let y = d_lambda.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    /// Point reached by travelling `distance_m` along `bearing_deg`.
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> LatLng {
        let delta = distance_m / EARTH_RADIUS_M;
        let theta = bearing_deg.to_radians();
        let phi1 = self.lat.to_radians();
        let lambda1 = self.lng.to_radians();
        let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
        let lambda2 = lambda1
            + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());
        LatLng::new(phi2.to_degrees(), lambda2.to_degrees())
    }

    pub fn translate_m(&self, east_m: f64, north_m: f64) -> LatLng {
        let d_lat = north_m.to_degrees() / EARTH_RADIUS_M;
        let d_lng = east_m.to_degrees() / (EARTH_RADIUS_M * self.lat.to_radians().cos());
        LatLng::new(self.lat + d_lat, self.lng + d_lng)
    }

    /// Local (east, north) offset in metres from `self` to `other`.
    pub fn offset_m(&self, other: &LatLng) -> (f64, f64) {
        let north = (other.lat - self.lat).to_radians() * EARTH_RADIUS_M;
        let east = (other.lng - self.lng).to_radians() * EARTH_RADIUS_M * self.lat.to_radians().cos();
        (east, north)
    }

    /// Unit vector on the sphere, used for chord-distance neighbour search.
    pub(crate) fn to_unit_xyz(self) -> [f64; 3] {
        let phi = self.lat.to_radians();
        let lambda = self.lng.to_radians();
        [phi.cos() * lambda.cos(), phi.cos() * lambda.sin(), phi.sin()]
    }
}

/// Viewport rectangle supplied by the map collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }
}
