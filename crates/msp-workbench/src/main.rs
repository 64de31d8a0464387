//! Headless demo: hip sensor -> IMU rate -> resample -> peaks -> kinematics -> smoothing

use anyhow::Context;
use msp_core::{SensorKind, SeriesEvent};
use msp_processing::{AnalysisConfig, ResampleConfig};
use msp_simulation::GeneratorConfig;
use msp_workbench::Workbench;
use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("Starting motion signal pipeline demo...");
    println!("Signal Flow: Hip Sensor → IMU Rate → Resampling → Peaks / Kinematics / Smoothing");

    let config = GeneratorConfig {
        seed: Some(2024),
        ..GeneratorConfig::default()
    };
    let mut workbench = Workbench::with_config(config, ResampleConfig::default())
        .context("failed to set up workbench")?;

    workbench.subscribe_fn(|event: &SeriesEvent<'_>| match event {
        SeriesEvent::Ready(series) => info!(series = series.name(), samples = series.len(), "series ready"),
        SeriesEvent::PeaksReady { name, peaks_us, .. } => {
            info!(series = *name, peaks = peaks_us.len(), "peaks ready")
        }
    });

    let hip = workbench.create_sensor(SensorKind::Hip);
    let imu = workbench.create_sensor(SensorKind::Imu);

    workbench
        .generate_base(hip, 1000.0, 0.1, 5.0)
        .context("hip generation failed")?;
    workbench
        .generate_correlated(imu, 400.0, 0.1, 5.0, Some(hip))
        .context("IMU derivation failed")?;

    let mut reports = Vec::new();
    for preset in AnalysisConfig::presets() {
        for &source in &[hip, imu] {
            let report = workbench
                .analyze(source, &preset)
                .with_context(|| format!("analysis '{}' failed", preset.name))?;
            reports.push(report);
        }
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
