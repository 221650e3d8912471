use serde::{Deserialize, Serialize};

use crate::{
    config::{HurricaneParams, PressureSystemParams},
    geo::LatLng,
    pressure_system::{PressureKind, PressureSystem, WindPerturbation},
    wind::{WindPoint, WindVector},
};

/// Saffir-Simpson lower bounds in m/s: tropical storm, then categories 1-5.
pub const CATEGORY_THRESHOLDS: [f64; 6] = [17.0, 33.0, 43.0, 50.0, 58.0, 70.0];

pub const CAT3_THRESHOLD: f64 = CATEGORY_THRESHOLDS[3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TropicalStorm,
    One,
    Two,
    Three,
    Four,
    Five,
}

impl Category {
    pub fn from_strength(strength: f64) -> Self {
        let level = CATEGORY_THRESHOLDS[1..]
            .iter()
            .filter(|threshold| strength >= **threshold)
            .count();
        match level {
            0 => Category::TropicalStorm,
            1 => Category::One,
            2 => Category::Two,
            3 => Category::Three,
            4 => Category::Four,
            _ => Category::Five,
        }
    }

    /// 0 for a tropical storm, otherwise the Saffir-Simpson number.
    pub fn level(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HurricaneOptions {
    pub center: LatLng,
    pub speed: WindVector,
    pub strength: f64,
}

#[derive(Debug, Clone)]
pub struct Hurricane {
    system: PressureSystem,
    velocity: WindVector,
    strength_change: f64,
    cat3_unlocked: bool,
    initial: HurricaneOptions,
    params: HurricaneParams,
}

impl Hurricane {
    pub fn new(
        options: &HurricaneOptions,
        params: HurricaneParams,
        system_params: PressureSystemParams,
    ) -> Self {
        let mut system = PressureSystem::new(
            PressureKind::Low,
            options.center,
            options.strength,
            system_params,
        );
        system.place(options.center);
        Self {
            system,
            velocity: options.speed,
            strength_change: 0.0,
            cat3_unlocked: false,
            initial: options.clone(),
            params,
        }
    }

    pub fn velocity(&self) -> WindVector {
        self.velocity
    }

    pub fn strength_change(&self) -> f64 {
        self.strength_change
    }

    pub fn cat3_unlocked(&self) -> bool {
        self.cat3_unlocked
    }

    pub fn initial_options(&self) -> &HurricaneOptions {
        &self.initial
    }

    pub fn category(&self) -> Category {
        Category::from_strength(self.system.strength())
    }

    pub fn is_active(&self) -> bool {
        self.system.strength() >= self.params.min_hurricane_strength
    }

    pub fn set_strength(&mut self, strength: f64) {
        self.system.set_strength(strength);
    }

    /// Semi-implicit Euler step: drag, steering acceleration, then position.
    pub fn move_by(&mut self, wind: WindVector, dt: f64) {
        let gain = self.params.acceleration_gain * dt;
        self.velocity = WindVector::new(
            self.velocity.u * self.params.momentum + wind.u * gain,
            self.velocity.v * self.params.momentum + wind.v * gain,
        );
        let center = self
            .system
            .center()
            .translate_m(self.velocity.u * dt, self.velocity.v * dt);
        self.system.place(center);
    }

    /// `None` means the hurricane is over land (no SST sample).
    pub fn set_strength_change_from_sst(&mut self, sst: Option<f64>) {
        self.strength_change = match sst {
            Some(sst) => {
                if sst >= self.params.cat3_unlock_sst {
                    self.cat3_unlocked = true;
                }
                (sst - self.params.warm_sst_threshold) * self.params.sst_strength_gain
            }
            None => self.params.land_strength_change,
        };
    }

    pub fn update_strength(&mut self) {
        let current = self.system.strength();
        let mut next = current + self.strength_change;
        if !self.cat3_unlocked && next >= CAT3_THRESHOLD {
            next = next.min(CAT3_THRESHOLD.max(current));
        }
        self.system.set_strength(next);
    }

    pub fn reset(&mut self) {
        let initial = self.initial.clone();
        self.system.place(initial.center);
        self.system.set_strength(initial.strength);
        self.velocity = initial.speed;
        self.strength_change = 0.0;
        self.cat3_unlocked = false;
    }
}

impl WindPerturbation for Hurricane {
    fn kind(&self) -> PressureKind {
        PressureKind::Low
    }

    fn center(&self) -> LatLng {
        self.system.center()
    }

    fn strength(&self) -> f64 {
        self.system.strength()
    }

    fn range(&self) -> f64 {
        self.system.range()
    }

    fn apply_to_wind_point(&self, wind: &WindPoint) -> WindVector {
        self.system.apply_to_wind_point(wind)
    }
}
