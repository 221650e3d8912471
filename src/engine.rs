//! The simulation clock: owns all mutable state and advances it one step at a time.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{
    config::EngineConfig,
    error::EngineError,
    geo::{LatLng, LatLngBounds},
    hurricane::{Category, Hurricane},
    precipitation::{self, PrecipitationPoint},
    pressure_system::{PressureKind, PressureSystem, PressureSystemRecord, WindPerturbation},
    rng::DeterministicRng,
    scheduler::{FrameScheduler, QueuedFrames, StepRate},
    temperature::TemperatureRaster,
    wind::{Season, SeasonalWindData, WindDataset, WindPoint, WindVector},
    wind_field::{samples_within, WindFieldAssembler},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub position: LatLng,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landfall {
    pub position: LatLng,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Stopped,
    Running,
    /// The hurricane dissipated; only `reset()` leaves this state.
    Finished,
}

/// Raster the driver should decode and hand back through
/// [`Engine::complete_raster_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterRequest {
    pub season: Season,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HurricaneSnapshot {
    pub center: LatLng,
    pub velocity: WindVector,
    pub strength: f64,
    pub category: Category,
    pub cat3_unlocked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub season: Season,
    pub time: u64,
    pub state: RunState,
    pub started: bool,
    pub hurricane: HurricaneSnapshot,
    pub pressure_systems: Vec<PressureSystemRecord>,
    pub track: Vec<TrackPoint>,
    pub landfalls: Vec<Landfall>,
    pub precipitation_points: usize,
}

pub struct Engine<S: FrameScheduler = QueuedFrames> {
    config: EngineConfig,
    wind_data: SeasonalWindData,
    season: Season,
    base_wind: WindDataset,
    assembler: WindFieldAssembler,
    raster: Option<TemperatureRaster>,
    pressure_systems: Vec<PressureSystem>,
    hurricane: Hurricane,
    track: Vec<TrackPoint>,
    landfalls: Vec<Landfall>,
    precipitation_points: Vec<PrecipitationPoint>,
    time: u64,
    state: RunState,
    started: bool,
    over_sea_steps: u32,
    bounds: Option<LatLngBounds>,
    rng: DeterministicRng,
    scheduler: S,
    step_rate: StepRate,
    sst_samples: u64,
}

impl<S: FrameScheduler> Engine<S> {
    pub fn new(
        config: EngineConfig,
        wind_data: SeasonalWindData,
        scheduler: S,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let season = config.season;
        let base_wind = wind_data
            .get(season)
            .cloned()
            .ok_or(EngineError::MissingSeason(season))?;
        let hurricane = Hurricane::new(
            &config.hurricane,
            config.dynamics.clone(),
            config.physics.clone(),
        );
        let pressure_systems = build_pressure_systems(&config);
        tracing::info!(
            %season,
            seed = config.seed,
            pressure_systems = pressure_systems.len(),
            "engine created"
        );
        Ok(Self {
            rng: DeterministicRng::new(config.seed),
            step_rate: StepRate::new(config.clock.step_rate_window),
            wind_data,
            season,
            base_wind,
            assembler: WindFieldAssembler::new(),
            raster: None,
            pressure_systems,
            hurricane,
            track: Vec::new(),
            landfalls: Vec::new(),
            precipitation_points: Vec::new(),
            time: 0,
            state: RunState::Stopped,
            started: false,
            over_sea_steps: 0,
            bounds: None,
            scheduler,
            sst_samples: 0,
            config,
        })
    }

    // --- commands -------------------------------------------------------

    /// Stopped → Running, stepping once immediately. Idempotent while running.
    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.state {
            RunState::Running => return Ok(()),
            RunState::Finished => return Err(EngineError::Finished),
            RunState::Stopped => {}
        }
        if !self.is_ready() {
            tracing::warn!(loading = self.is_loading(), "start rejected: engine not ready");
            return Err(EngineError::NotReady);
        }
        self.state = RunState::Running;
        self.started = true;
        tracing::info!(time = self.time, "simulation started");
        self.tick();
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Stopped;
            self.scheduler.cancel();
            tracing::info!(time = self.time, "simulation stopped");
        }
    }

    /// Restores the initial hurricane, pressure systems and random sequence and
    /// clears all recorded history. The season and its raster are kept.
    pub fn reset(&mut self) {
        self.hurricane.reset();
        self.pressure_systems = build_pressure_systems(&self.config);
        self.track.clear();
        self.landfalls.clear();
        self.precipitation_points.clear();
        self.time = 0;
        self.state = RunState::Stopped;
        self.started = false;
        self.over_sea_steps = 0;
        self.rng.reseed();
        self.step_rate.clear();
        self.scheduler.cancel();
        tracing::info!(seed = self.rng.seed(), "simulation reset");
    }

    /// Switches the base wind dataset and drops the raster until the new
    /// season's one is delivered.
    pub fn set_season(&mut self, season: Season) -> Result<(), EngineError> {
        if season == self.season {
            return Ok(());
        }
        let base_wind = self
            .wind_data
            .get(season)
            .cloned()
            .ok_or(EngineError::MissingSeason(season))?;
        self.season = season;
        self.base_wind = base_wind;
        self.raster = None;
        tracing::info!(%season, "season changed; waiting for raster");
        Ok(())
    }

    pub fn set_pressure_system_center(
        &mut self,
        index: usize,
        center: LatLng,
    ) -> Result<(), EngineError> {
        let others = self.other_centers(index)?;
        self.pressure_systems[index].set_center(center, &others);
        Ok(())
    }

    /// Drag release: snaps the system back if it ended too close to another.
    pub fn check_pressure_system(&mut self, index: usize) -> Result<(), EngineError> {
        let others = self.other_centers(index)?;
        self.pressure_systems[index].check_pressure_system(&others);
        Ok(())
    }

    pub fn set_pressure_system_strength(
        &mut self,
        index: usize,
        strength: f64,
    ) -> Result<(), EngineError> {
        self.pressure_systems
            .get_mut(index)
            .ok_or(EngineError::UnknownPressureSystem(index))?
            .set_strength(strength);
        Ok(())
    }

    /// Viewport hint for the sample queries; physics ignores it.
    pub fn update_bounds(&mut self, bounds: LatLngBounds) {
        self.bounds = Some(bounds);
    }

    // --- raster loading -------------------------------------------------

    pub fn raster_request(&self) -> Option<RasterRequest> {
        self.raster.is_none().then_some(RasterRequest {
            season: self.season,
        })
    }

    /// Delivers PNG bytes for `season`. Returns whether the raster was
    /// installed; a load for a season that is no longer current is dropped.
    /// Decode failures are returned and leave the engine loading.
    pub fn complete_raster_load(&mut self, season: Season, bytes: &[u8]) -> Result<bool, EngineError> {
        if season != self.season {
            tracing::warn!(%season, current = %self.season, "discarding stale raster load");
            return Ok(false);
        }
        let raster = TemperatureRaster::decode(season, bytes)?;
        Ok(self.install_raster(raster))
    }

    pub fn install_raster(&mut self, raster: TemperatureRaster) -> bool {
        if raster.season() != self.season {
            tracing::warn!(season = %raster.season(), current = %self.season, "discarding stale raster");
            return false;
        }
        let (width, height) = raster.dimensions();
        tracing::info!(season = %self.season, width, height, zoom = raster.zoom(), "raster installed");
        self.raster = Some(raster);
        true
    }

    // --- stepping -------------------------------------------------------

    /// Frame callback: steps only while running.
    pub fn on_frame(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        self.tick();
        true
    }

    /// Advances the simulation by one step. A finished run stays frozen
    /// until `reset()`.
    pub fn tick(&mut self) {
        if self.state == RunState::Finished {
            return;
        }
        let clock = self.config.clock.clone();

        if self.time % clock.track_interval == 0 {
            self.track.push(TrackPoint {
                position: self.hurricane.center(),
                category: self.hurricane.category(),
            });
        }

        let center = self.hurricane.center();
        let steering = self.assembler.wind_at(
            &self.base_wind,
            &perturbations(&self.pressure_systems),
            &center,
        );
        self.hurricane.move_by(steering, clock.dt_seconds);

        let center = self.hurricane.center();
        let sst = self.sample_sst(&center);
        if self.time % clock.sst_check_interval == 0 {
            self.hurricane.set_strength_change_from_sst(sst);
        }
        self.hurricane.update_strength();

        match sst {
            None => {
                if self.over_sea_steps >= clock.landfall_debounce_steps {
                    let landfall = Landfall {
                        position: center,
                        category: self.hurricane.category(),
                    };
                    tracing::debug!(time = self.time, lat = center.lat, lng = center.lng, category = ?landfall.category, "landfall");
                    self.landfalls.push(landfall);
                }
                self.over_sea_steps = 0;
            }
            Some(_) => self.over_sea_steps += 1,
        }

        if self.time % clock.precipitation_interval == 0 {
            let burst = precipitation::burst(
                center,
                self.hurricane.category(),
                &self.config.precipitation,
                &mut self.rng,
            );
            self.precipitation_points.extend(burst);
        }

        self.time += clock.timestep;
        self.merge_pressure_systems(clock.min_merge_distance);

        if !self.hurricane.is_active() {
            self.state = RunState::Finished;
            tracing::info!(time = self.time, strength = self.hurricane.strength(), "hurricane dissipated");
        }

        self.step_rate.record(Instant::now());
        if self.state == RunState::Running {
            self.scheduler.schedule_next();
        }
    }

    /// The stronger of the hurricane and each nearby low absorbs the weaker.
    /// A losing hurricane is left at exactly zero strength.
    fn merge_pressure_systems(&mut self, min_distance: f64) {
        let center = self.hurricane.center();
        let mut index = 0;
        while index < self.pressure_systems.len() {
            let system = &mut self.pressure_systems[index];
            let mergeable = system.kind() == PressureKind::Low
                && system.is_active()
                && center.distance_to(&system.center()) < min_distance;
            if !mergeable {
                index += 1;
                continue;
            }

            let storm = self.hurricane.strength();
            if storm >= system.strength() {
                self.hurricane.set_strength(storm + system.strength());
                tracing::debug!(time = self.time, absorbed = system.strength(), "hurricane absorbed low");
                self.pressure_systems.remove(index);
            } else {
                system.set_strength(system.strength() + storm);
                self.hurricane.set_strength(0.0);
                tracing::debug!(time = self.time, "hurricane absorbed by low");
                break;
            }
        }
    }

    fn sample_sst(&mut self, point: &LatLng) -> Option<f64> {
        self.sst_samples += 1;
        self.sea_surface_temp_at(point)
    }

    fn other_centers(&self, index: usize) -> Result<Vec<LatLng>, EngineError> {
        if index >= self.pressure_systems.len() {
            return Err(EngineError::UnknownPressureSystem(index));
        }
        Ok(self
            .pressure_systems
            .iter()
            .enumerate()
            .filter(|(i, system)| *i != index && system.is_active())
            .map(|(_, system)| system.center())
            .collect())
    }

    // --- queries --------------------------------------------------------

    pub fn is_loading(&self) -> bool {
        self.raster.is_none()
    }

    /// Raster available and a hurricane strong enough to simulate.
    pub fn is_ready(&self) -> bool {
        !self.is_loading() && self.hurricane.is_active()
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.state == RunState::Finished
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    /// Wind from the base data and pressure systems, excluding the hurricane.
    pub fn wind_at(&mut self, point: &LatLng) -> WindVector {
        self.assembler
            .wind_at(&self.base_wind, &perturbations(&self.pressure_systems), point)
    }

    /// Blended samples inside the current bounds.
    pub fn wind_samples(&mut self) -> Vec<WindPoint> {
        let index = self
            .assembler
            .current_wind(&self.base_wind, &perturbations(&self.pressure_systems));
        samples_within(index, self.bounds.as_ref())
    }

    /// Display field including the hurricane's own circulation.
    pub fn wind_including_hurricane(&mut self) -> Vec<WindPoint> {
        let index = self.assembler.wind_including(
            &self.base_wind,
            &perturbations(&self.pressure_systems),
            &self.hurricane,
        );
        samples_within(index, self.bounds.as_ref())
    }

    pub fn sea_surface_temp_at(&self, point: &LatLng) -> Option<f64> {
        self.raster
            .as_ref()
            .and_then(|raster| raster.temperature_at(point.lat, point.lng))
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn hurricane(&self) -> &Hurricane {
        &self.hurricane
    }

    pub fn pressure_systems(&self) -> &[PressureSystem] {
        &self.pressure_systems
    }

    pub fn track(&self) -> &[TrackPoint] {
        &self.track
    }

    pub fn landfalls(&self) -> &[Landfall] {
        &self.landfalls
    }

    pub fn precipitation_points(&self) -> &[PrecipitationPoint] {
        &self.precipitation_points
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.bounds
    }

    pub fn steps_per_second(&self) -> Option<f64> {
        self.step_rate.steps_per_second()
    }

    /// SST lookups performed by `tick()` so far.
    pub fn sst_samples(&self) -> u64 {
        self.sst_samples
    }

    pub fn wind_field_rebuilds(&self) -> u64 {
        self.assembler.rebuilds()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            season: self.season,
            time: self.time,
            state: self.state,
            started: self.started,
            hurricane: HurricaneSnapshot {
                center: self.hurricane.center(),
                velocity: self.hurricane.velocity(),
                strength: self.hurricane.strength(),
                category: self.hurricane.category(),
                cat3_unlocked: self.hurricane.cat3_unlocked(),
            },
            pressure_systems: self
                .pressure_systems
                .iter()
                .map(PressureSystem::to_record)
                .collect(),
            track: self.track.clone(),
            landfalls: self.landfalls.clone(),
            precipitation_points: self.precipitation_points.len(),
        }
    }
}

impl Engine<QueuedFrames> {
    /// Drains queued frames until none remain or `limit` steps were taken.
    pub fn run_frames(&mut self, limit: u64) -> u64 {
        let mut steps = 0;
        while steps < limit && self.scheduler.take_frame() {
            if self.on_frame() {
                steps += 1;
            }
        }
        steps
    }
}

fn build_pressure_systems(config: &EngineConfig) -> Vec<PressureSystem> {
    config
        .pressure_systems
        .iter()
        .map(|record| PressureSystem::from_record(record, config.physics.clone()))
        .collect()
}

fn perturbations(systems: &[PressureSystem]) -> Vec<&dyn WindPerturbation> {
    systems
        .iter()
        .map(|system| system as &dyn WindPerturbation)
        .collect()
}
