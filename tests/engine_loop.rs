mod common;

use approx::assert_relative_eq;
use common::{all_land_pixels, quiet_config, raster_pixels, ready_engine, uniform_wind};
use hurricane_sim::{
    config::EngineConfig,
    pressure_system::{PressureKind, PressureSystemRecord},
    temperature::TemperatureRaster,
    EngineError, LatLng, RunState, Season, WindPerturbation, WindVector,
};

#[test]
fn single_tick_records_track_advances_time_and_samples_sst_once() {
    let config = quiet_config();
    let timestep = config.clock.timestep;
    let mut engine = ready_engine(
        config,
        uniform_wind(Season::Summer, -6.0, 1.0),
        raster_pixels(27.0, None),
    );
    let before = engine.hurricane().center();

    engine.tick();

    assert_eq!(engine.track().len(), 1);
    assert_eq!(engine.track()[0].position, before);
    assert_eq!(engine.time(), timestep);
    assert_eq!(engine.sst_samples(), 1);
    assert_ne!(engine.hurricane().center(), before);
    assert!(!engine.is_running(), "a manual tick does not start the clock");
    assert_eq!(engine.scheduler().pending(), 0);
}

#[test]
fn track_and_precipitation_follow_their_cadences() {
    let config = quiet_config();
    let track_interval = config.clock.track_interval;
    let precipitation_interval = config.clock.precipitation_interval;
    let burst_size = 1 + config.precipitation.narrow_point_count;
    let mut engine = ready_engine(
        config,
        uniform_wind(Season::Summer, -6.0, 1.0),
        raster_pixels(27.0, None),
    );

    let steps: u64 = 60;
    for _ in 0..steps {
        engine.tick();
    }

    assert_eq!(engine.track().len() as u64, steps.div_ceil(track_interval));
    let bursts = steps.div_ceil(precipitation_interval) as usize;
    assert_eq!(engine.precipitation_points().len(), bursts * burst_size);
}

#[test]
fn start_steps_immediately_and_schedules_the_next_frame() {
    let mut engine = ready_engine(
        quiet_config(),
        uniform_wind(Season::Summer, -6.0, 1.0),
        raster_pixels(27.0, None),
    );
    engine.start().expect("ready to start");
    assert!(engine.is_running());
    assert!(engine.is_started());
    assert_eq!(engine.time(), 1);
    assert_eq!(engine.scheduler().pending(), 1);

    engine.start().expect("starting twice is harmless");
    assert_eq!(engine.time(), 1);

    assert_eq!(engine.run_frames(9), 9);
    assert_eq!(engine.time(), 10);

    engine.stop();
    assert_eq!(engine.run_state(), RunState::Stopped);
    assert_eq!(engine.run_frames(100), 0);
    assert_eq!(engine.time(), 10);
}

#[test]
fn restarting_after_stop_keeps_one_step_per_frame() {
    let mut engine = ready_engine(
        quiet_config(),
        uniform_wind(Season::Summer, -6.0, 1.0),
        raster_pixels(27.0, None),
    );
    engine.start().expect("ready to start");
    engine.stop();
    assert_eq!(engine.scheduler().pending(), 0);

    engine.start().expect("restart");
    assert_eq!(engine.time(), 2);
    assert_eq!(engine.scheduler().pending(), 1);
    assert_eq!(engine.run_frames(10), 10);
    assert_eq!(engine.time(), 12);
    assert_eq!(engine.scheduler().pending(), 1);
}

#[test]
fn restarting_after_reset_keeps_one_step_per_frame() {
    let mut engine = ready_engine(
        quiet_config(),
        uniform_wind(Season::Summer, -6.0, 1.0),
        raster_pixels(27.0, None),
    );
    engine.start().expect("ready to start");
    engine.reset();
    assert_eq!(engine.scheduler().pending(), 0);

    engine.start().expect("restart");
    assert_eq!(engine.time(), 1);
    assert_eq!(engine.scheduler().pending(), 1);
    assert_eq!(engine.run_frames(5), 5);
    assert_eq!(engine.time(), 6);
    assert_eq!(engine.scheduler().pending(), 1);
}

#[test]
fn start_waits_for_the_raster() {
    let mut engine = common::engine_with(quiet_config(), uniform_wind(Season::Summer, -6.0, 1.0));
    assert!(engine.is_loading());
    assert!(!engine.is_ready());
    assert!(matches!(engine.start(), Err(EngineError::NotReady)));
    assert_eq!(engine.sea_surface_temp_at(&LatLng::new(20.0, -50.0)), None);
}

#[test]
fn weakening_over_land_finishes_the_run() {
    let mut config = quiet_config();
    config.hurricane.strength = 10.5;
    let mut engine = ready_engine(config, uniform_wind(Season::Summer, 0.0, 0.0), all_land_pixels());

    engine.start().expect("ready to start");
    engine.run_frames(1_000);

    assert!(engine.is_finished());
    assert!(!engine.is_running());
    assert!(!engine.hurricane().is_active());
    assert_eq!(engine.scheduler().pending(), 0);
    assert!(matches!(engine.start(), Err(EngineError::Finished)));

    let time = engine.time();
    let track = engine.track().len();
    let precipitation = engine.precipitation_points().len();
    engine.tick();
    assert_eq!(engine.time(), time);
    assert_eq!(engine.track().len(), track);
    assert_eq!(engine.precipitation_points().len(), precipitation);

    engine.reset();
    assert_eq!(engine.run_state(), RunState::Stopped);
    engine.start().expect("reset makes the engine startable again");
}

#[test]
fn crossing_the_coast_records_one_landfall() {
    let mut engine = ready_engine(
        quiet_config(),
        uniform_wind(Season::Summer, 10.0, 0.0),
        raster_pixels(27.0, Some(-45.0)),
    );

    for _ in 0..2_000 {
        if !engine.landfalls().is_empty() {
            break;
        }
        engine.tick();
    }
    let landfalls = engine.landfalls().to_vec();
    assert_eq!(landfalls.len(), 1);
    assert!(landfalls[0].position.lng >= -45.1);

    for _ in 0..100 {
        engine.tick();
    }
    assert_eq!(engine.landfalls().len(), 1, "staying on land is not a new landfall");
}

#[test]
fn starting_over_land_is_not_a_landfall() {
    let mut config = quiet_config();
    config.hurricane.center = LatLng::new(20.0, -40.0);
    let mut engine = ready_engine(
        config,
        uniform_wind(Season::Summer, 0.0, 0.0),
        raster_pixels(27.0, Some(-45.0)),
    );
    for _ in 0..30 {
        engine.tick();
    }
    assert!(engine.landfalls().is_empty());
}

#[test]
fn a_few_sea_steps_before_the_coast_are_not_a_landfall() {
    let mut config = quiet_config();
    config.hurricane.center = LatLng::new(20.0, -46.3);
    config.hurricane.speed = WindVector::new(50.0, 0.0);
    let mut engine = ready_engine(
        config,
        uniform_wind(Season::Summer, 0.0, 0.0),
        raster_pixels(27.0, Some(-45.0)),
    );
    for _ in 0..30 {
        engine.tick();
    }
    assert!(engine.hurricane().center().lng > -45.0, "storm should be inland");
    assert!(engine.landfalls().is_empty());
}

#[test]
fn southward_steering_crosses_ten_north() {
    let mut config = quiet_config();
    config.hurricane.center = LatLng::new(11.0, -50.0);
    let mut engine = ready_engine(
        config,
        uniform_wind(Season::Summer, 0.0, -10.0),
        raster_pixels(27.0, None),
    );
    for _ in 0..500 {
        engine.tick();
    }
    assert!(engine.hurricane().center().lat < 10.0);
}

#[test]
fn sst_rate_is_only_resampled_on_its_cadence() {
    let config = quiet_config();
    let interval = config.clock.sst_check_interval;
    let mut engine = ready_engine(
        config,
        uniform_wind(Season::Summer, 0.0, 0.0),
        raster_pixels(27.0, None),
    );

    engine.tick();
    let warm_rate = engine.hurricane().strength_change();
    assert_relative_eq!(warm_rate, 0.005, epsilon = 1e-4);

    let cold = TemperatureRaster::from_rgba(Season::Summer, raster_pixels(20.0, None))
        .expect("valid raster");
    assert!(engine.install_raster(cold));

    for _ in 1..interval {
        engine.tick();
    }
    assert_eq!(engine.hurricane().strength_change(), warm_rate);
    assert_relative_eq!(
        engine.hurricane().strength(),
        30.0 + interval as f64 * warm_rate,
        epsilon = 1e-9
    );

    let before = engine.hurricane().strength();
    engine.tick();
    let cold_rate = engine.hurricane().strength_change();
    assert_relative_eq!(cold_rate, -0.03, epsilon = 1e-3);
    assert_relative_eq!(engine.hurricane().strength(), before + cold_rate, epsilon = 1e-9);
}

fn config_with_low(strength: f64) -> EngineConfig {
    EngineConfig {
        pressure_systems: vec![PressureSystemRecord {
            kind: PressureKind::Low,
            center: LatLng::new(20.0, -49.0),
            strength,
        }],
        ..quiet_config()
    }
}

#[test]
fn stronger_hurricane_absorbs_a_nearby_low() {
    let mut engine = ready_engine(
        config_with_low(12.0),
        uniform_wind(Season::Summer, 0.0, 0.0),
        raster_pixels(27.0, None),
    );
    engine.tick();
    assert!(engine.pressure_systems().is_empty());
    assert!(engine.hurricane().strength() > 41.9);
    assert!(engine.hurricane().is_active());
}

#[test]
fn stronger_low_swallows_the_hurricane() {
    let mut engine = ready_engine(
        config_with_low(40.0),
        uniform_wind(Season::Summer, 0.0, 0.0),
        raster_pixels(27.0, None),
    );
    engine.start().expect("ready to start");

    assert_eq!(engine.hurricane().strength(), 0.0);
    assert!(engine.is_finished());
    assert_eq!(engine.pressure_systems().len(), 1);
    assert!(engine.pressure_systems()[0].strength() > 69.9);
    assert_eq!(engine.scheduler().pending(), 0);
}

#[test]
fn high_pressure_systems_never_merge() {
    let mut config = config_with_low(40.0);
    config.pressure_systems[0].kind = PressureKind::High;
    let mut engine = ready_engine(config, uniform_wind(Season::Summer, 0.0, 0.0), raster_pixels(27.0, None));
    engine.tick();
    assert_eq!(engine.pressure_systems().len(), 1);
    assert!(engine.hurricane().is_active());
}

#[test]
fn same_seed_replays_the_same_run() {
    let run = || {
        let mut engine = ready_engine(
            quiet_config(),
            uniform_wind(Season::Summer, -6.0, 2.0),
            raster_pixels(28.0, Some(-20.0)),
        );
        for _ in 0..300 {
            engine.tick();
        }
        (engine.track().to_vec(), engine.precipitation_points().to_vec())
    };
    assert_eq!(run(), run());
}

#[test]
fn reset_restores_the_initial_state() {
    let config = config_with_low(12.0);
    let initial = config.hurricane.clone();
    let mut engine = ready_engine(config, uniform_wind(Season::Summer, -6.0, 1.0), raster_pixels(27.0, None));

    for _ in 0..20 {
        engine.tick();
    }
    let first_precipitation = engine.precipitation_points()[..4].to_vec();
    assert!(engine.pressure_systems().is_empty());

    engine.reset();
    assert_eq!(engine.time(), 0);
    assert!(engine.track().is_empty());
    assert!(engine.landfalls().is_empty());
    assert!(engine.precipitation_points().is_empty());
    assert_eq!(engine.pressure_systems().len(), 1);
    assert_eq!(engine.hurricane().center(), initial.center);
    assert_eq!(engine.hurricane().strength(), initial.strength);
    assert!(!engine.is_started());

    engine.tick();
    assert_eq!(&engine.precipitation_points()[..4], first_precipitation.as_slice());
}

#[test]
fn snapshot_serializes_the_observable_state() {
    let mut engine = ready_engine(
        quiet_config(),
        uniform_wind(Season::Summer, -6.0, 1.0),
        raster_pixels(27.0, None),
    );
    engine.start().expect("ready to start");
    let json = serde_json::to_value(engine.snapshot()).expect("serializes");
    assert_eq!(json["season"], "summer");
    assert_eq!(json["state"], "running");
    assert_eq!(json["time"], 1);
    assert_eq!(json["track"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["hurricane"]["category"], "tropical_storm");
}
