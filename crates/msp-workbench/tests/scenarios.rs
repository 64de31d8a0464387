//! End-to-end pipeline scenarios through the workbench surface

use msp_core::{ErrorKind, FixedClock, SensorKind, SeriesEvent, SeriesId, TimeSeries};
use msp_processing::ResampleConfig;
use msp_simulation::GeneratorConfig;
use msp_workbench::Workbench;
use std::sync::{Arc, Mutex};

const START_US: u64 = 1_700_000_000_000_000;

fn workbench(seed: u64) -> Workbench {
    let config = GeneratorConfig {
        seed: Some(seed),
        ..GeneratorConfig::default()
    };
    Workbench::with_config(config, ResampleConfig::default())
        .unwrap()
        .with_clock(Arc::new(FixedClock::new(START_US)))
}

fn unit_spaced(values: Vec<f64>) -> TimeSeries {
    let timestamps = (0..values.len() as u64).map(|i| START_US + i * 1_000_000).collect();
    TimeSeries::from_points("manual", "deg", START_US, timestamps, values).unwrap()
}

#[test]
fn scenario_base_generation_without_jitter() {
    let mut wb = workbench(1);
    let hip = wb.create_sensor(SensorKind::Hip);
    wb.generate_base(hip, 1000.0, 0.0, 1.0).unwrap();

    let series = wb.series(hip).unwrap();
    assert_eq!(series.start_time_us(), START_US);
    assert_eq!(series.len(), 1001);
    assert_eq!(series.first_timestamp_us(), Some(START_US));
    assert_eq!(series.last_timestamp_us(), Some(START_US + 1_000_000));
    assert!(series.values()[0].abs() < 1.0);
    for pair in series.timestamps().windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn scenario_correlated_follows_reference() {
    let mut wb = workbench(2);
    let hip = wb.create_sensor(SensorKind::Hip);
    let imu = wb.create_sensor(SensorKind::Imu);
    wb.generate_base(hip, 1000.0, 0.1, 1.0).unwrap();
    wb.generate_correlated(imu, 400.0, 0.1, 1.0, Some(hip)).unwrap();

    let reference = wb.series(hip).unwrap();
    let derived = wb.series(imu).unwrap();
    assert_eq!(derived.name(), "3-axis IMU");
    assert_eq!(derived.unit(), "deg/s");
    assert_eq!(derived.start_time_us(), reference.start_time_us());
    assert!(!derived.is_empty());
    assert!(derived.last_timestamp_us() <= reference.last_timestamp_us());
    for pair in derived.timestamps().windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn scenario_resample_to_100hz() {
    let mut wb = workbench(3);
    let hip = wb.create_sensor(SensorKind::Hip);
    let resampled = wb.create("hip_100hz", "deg");
    wb.generate_base(hip, 1000.0, 0.0, 1.0).unwrap();

    let count = wb.resample(hip, resampled, 100.0, 0.1, 0.9).unwrap();
    let series = wb.series(resampled).unwrap();
    assert_eq!(count, series.len());
    assert!((79..=81).contains(&count), "got {} samples", count);
    assert_eq!(series.start_time_us(), START_US);
    for pair in series.timestamps().windows(2) {
        assert_eq!(pair[1] - pair[0], 10_000);
    }
    let source = wb.series(hip).unwrap();
    for &t in series.timestamps() {
        assert!(t >= source.first_timestamp_us().unwrap());
        assert!(t <= source.last_timestamp_us().unwrap());
    }
}

#[test]
fn scenario_peaks_in_manual_series() {
    let mut wb = workbench(4);
    let handle = wb.add(unit_spaced(vec![1.0, 3.0, 2.0, 5.0, 1.0]));

    let peaks = wb.find_peaks(handle, 0.0, 4.0).unwrap();
    let series = wb.series(handle).unwrap();
    let peak_values: Vec<f64> = peaks
        .iter()
        .map(|t| series.values()[series.timestamps().binary_search(t).unwrap()])
        .collect();
    assert_eq!(peak_values, vec![3.0, 5.0]);
    assert_eq!(series.seconds_since_start(peaks[1]), 3.0);
}

#[test]
fn scenario_smoothing_constant_series() {
    let mut wb = workbench(5);
    let handle = wb.add(unit_spaced(vec![4.0; 50]));
    wb.smooth(handle, 19, 3.0).unwrap();

    let values = wb.series(handle).unwrap().values();
    for &v in &values[9..=40] {
        assert!((v - 4.0).abs() < 1e-9);
    }
    assert!(values[0] < 4.0 && values[49] < 4.0);
}

#[test]
fn kinematics_on_generated_series() {
    let mut wb = workbench(6);
    let hip = wb.create_sensor(SensorKind::Hip);
    let resampled = wb.create("hip_100hz", "deg");
    wb.generate_base(hip, 1000.0, 0.05, 2.0).unwrap();
    wb.resample(hip, resampled, 100.0, 0.0, 2.0).unwrap();

    let kinematics = wb.derive_kinematics(resampled, 0.5, 1.5).unwrap();
    assert_eq!(kinematics.velocities.len(), 100);
    assert_eq!(kinematics.accelerations.len(), 99);
    assert_eq!(kinematics.velocities[0].timestamp_us, START_US + 500_000);
}

#[test]
fn unknown_handles_are_rejected() {
    let mut wb = workbench(7);
    let missing = SeriesId::new();
    let hip = wb.create_sensor(SensorKind::Hip);

    assert_eq!(wb.generate_base(missing, 100.0, 0.0, 1.0).unwrap_err().kind(), ErrorKind::NullHandle);
    assert_eq!(wb.resample(missing, hip, 100.0, 0.0, 1.0).unwrap_err().kind(), ErrorKind::NullHandle);
    assert_eq!(wb.resample(hip, missing, 100.0, 0.0, 1.0).unwrap_err().kind(), ErrorKind::NullHandle);
    assert_eq!(wb.find_peaks(missing, 0.0, 1.0).unwrap_err().kind(), ErrorKind::NullHandle);
    assert_eq!(wb.derive_kinematics(missing, 0.0, 1.0).unwrap_err().kind(), ErrorKind::NullHandle);
    assert_eq!(wb.smooth(missing, 5, 1.0).unwrap_err().kind(), ErrorKind::NullHandle);
    assert_eq!(
        wb.generate_correlated(hip, 100.0, 0.0, 1.0, Some(missing)).unwrap_err().kind(),
        ErrorKind::NullHandle
    );
}

#[test]
fn correlated_without_reference_fails() {
    let mut wb = workbench(8);
    let imu = wb.create_sensor(SensorKind::Imu);
    let empty = wb.create_sensor(SensorKind::Hip);

    let err = wb.generate_correlated(imu, 400.0, 0.0, 1.0, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err.to_string().contains("3-axis IMU"));

    let err = wb.generate_correlated(imu, 400.0, 0.0, 1.0, Some(empty)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(wb.series(imu).unwrap().is_empty());
}

#[test]
fn failed_resample_keeps_destination_and_stays_silent() {
    let mut wb = workbench(9);
    let hip = wb.create_sensor(SensorKind::Hip);
    let out = wb.add(unit_spaced(vec![1.0, 2.0]));
    wb.generate_base(hip, 200.0, 0.0, 1.0).unwrap();

    let events = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&events);
    wb.subscribe_fn(move |_: &SeriesEvent<'_>| *sink.lock().unwrap() += 1);

    let err = wb.resample(hip, out, 100.0, 0.8, 0.2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidWindow);
    assert!(err.is_recoverable());
    assert_eq!(wb.series(out).unwrap().values(), &[1.0, 2.0]);
    assert_eq!(*events.lock().unwrap(), 0);
}

#[test]
fn listeners_observe_every_stage_in_order() {
    let mut wb = workbench(10);
    let log = Arc::new(Mutex::new(Vec::new()));

    let first_log = Arc::clone(&log);
    let first = wb.subscribe_fn(move |event: &SeriesEvent<'_>| {
        let label = match event {
            SeriesEvent::Ready(series) => format!("first:ready:{}", series.name()),
            SeriesEvent::PeaksReady { name, .. } => format!("first:peaks:{}", name),
        };
        first_log.lock().unwrap().push(label);
    });
    let second_log = Arc::clone(&log);
    wb.subscribe_fn(move |event: &SeriesEvent<'_>| {
        second_log.lock().unwrap().push(format!("second:{}", event.series().name()));
    });

    let hip = wb.create_sensor(SensorKind::Hip);
    let imu = wb.create_sensor(SensorKind::Imu);
    let resampled = wb.create("hip_100hz", "deg");
    wb.generate_base(hip, 1000.0, 0.0, 1.0).unwrap();
    wb.generate_correlated(imu, 400.0, 0.0, 1.0, Some(hip)).unwrap();
    wb.resample(hip, resampled, 100.0, 0.0, 1.0).unwrap();
    wb.find_peaks(resampled, 0.0, 1.0).unwrap();
    wb.derive_kinematics(resampled, 0.0, 1.0).unwrap();
    wb.smooth(resampled, 5, 1.0).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "first:ready:hip_sensor",
            "second:hip_sensor",
            "first:ready:3-axis IMU",
            "second:3-axis IMU",
            "first:ready:hip_100hz",
            "second:hip_100hz",
            "first:peaks:hip_100hz",
            "second:hip_100hz",
            "first:ready:hip_100hz",
            "second:hip_100hz",
        ]
    );

    assert!(wb.unsubscribe(first));
    assert!(!wb.unsubscribe(first));
    log.lock().unwrap().clear();
    wb.smooth(resampled, 5, 1.0).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["second:hip_100hz"]);
}
