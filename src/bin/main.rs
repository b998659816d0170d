//! Replay a synthetic observation stream through the rollup engine.
//!
//! Generates five-minute observations with daily temperature swings, veering
//! wind and afternoon showers, folds them into day/month/year summaries and
//! logs each closed period.
//!
//! ```text
//! weather-rollup [CONFIG.toml] [DAYS]
//! ```
//!
//! Run with `RUST_LOG=info` (or `debug`) to see the reports.

use std::f64::consts::TAU;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use log::{error, info};

use weather_rollup::config::RollupConfig;
use weather_rollup::error::SummaryResult;
use weather_rollup::observation::{Observation, SensorReading, Wind};
use weather_rollup::quantity::{Depth, Heading, Humidity, Pressure, SolarRadiation, Speed, Temperature};
use weather_rollup::sensors::SensorType;
use weather_rollup::storage::{RollupAccumulator, RollupEvent, SummaryTier};

// ---------------------------------------------------------------------------
// Synthetic data
// ---------------------------------------------------------------------------

/// Interval between synthetic observations.
const SAMPLE_INTERVAL: Duration = Duration::from_secs(300);

/// Days replayed when none are given on the command line.
const DEFAULT_DAYS: u32 = 62;

/// Produces observations that vary smoothly over the day and the year.
struct MockObservationGenerator {
    time: NaiveDateTime,
    step: u64,
}

impl MockObservationGenerator {
    fn new(start: NaiveDateTime) -> Self {
        Self { time: start, step: 0 }
    }

    /// Return the next observation and advance the clock.
    fn next_observation(&mut self) -> Observation {
        let time = self.time;
        self.time += TimeDelta::seconds(SAMPLE_INTERVAL.as_secs() as i64);
        self.step += 1;

        let s = self.step as f64;
        let day_phase = (time.num_seconds_from_midnight() as f64 / 86_400.0) * TAU;
        let season = (s / (288.0 * 365.0) * TAU).sin();

        // Outdoor temperature: coolest near dawn, warmest mid-afternoon
        let temp = 55.0 + 15.0 * season - 12.0 * (day_phase - TAU / 8.0).cos();
        let humidity = (65.0 + 20.0 * (day_phase - TAU / 8.0).cos()).clamp(5.0, 100.0);

        // Wind: veers slowly, drops to calm in the small hours
        let speed = (8.0 + 6.0 * (s / 97.0).sin() + 4.0 * (day_phase - TAU / 2.0).cos()).max(0.0);
        let speed = if time.hour() < 3 && self.step % 7 == 0 { 0.0 } else { speed };
        let heading = (s * 3.7).rem_euclid(360.0);

        let mut obs = Observation::with_duration(time, SAMPLE_INTERVAL);
        obs.outdoor_temp = Some(Temperature(temp));
        obs.indoor_temp = Some(Temperature(70.0 + day_phase.sin()));
        obs.outdoor_humidity = Some(Humidity(humidity));
        obs.indoor_humidity = Some(Humidity(40.0));
        obs.baro_pressure = Some(Pressure(29.92 + 0.3 * (s / 500.0).sin()));
        obs.dew_point = Some(Temperature(temp - (100.0 - humidity) / 5.0));
        obs.wind = Some(Wind::new(Speed(speed), Heading(heading)));
        obs.gust = Some(Speed(speed * 1.4));
        obs.solar_radiation = Some(SolarRadiation(800.0 * (-day_phase.cos()).max(0.0)));

        // Showers on every third afternoon
        let shower = time.ordinal() % 3 == 0 && (14..16).contains(&time.hour());
        if shower {
            obs.rainfall = Some(Depth(0.25));
            obs.high_rainfall_rate = Some(Depth(3.0 + (s / 5.0).sin()));
        }
        obs.evapotranspiration = Some(Depth(0.002));

        obs.sensor_readings.push(SensorReading {
            sensor_id: 1,
            sensor_type: SensorType::SoilTemperature,
            value: temp - 5.0,
        });
        obs.sensor_readings.push(SensorReading {
            sensor_id: 2,
            sensor_type: SensorType::SoilMoisture,
            value: 30.0 + 10.0 * (s / 1000.0).sin(),
        });
        obs
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

fn report(event: &RollupEvent) {
    let summary = event.summary();
    match event.tier() {
        SummaryTier::Day => {
            let high = summary.max_high_outdoor_temp().map(|e| e.value);
            let low = summary.min_low_outdoor_temp().map(|e| e.value);
            info!(
                "{} high {} low {} rain {} calm {:.1}%",
                summary.date(),
                high.unwrap_or_default(),
                low.unwrap_or_default(),
                summary.total_rainfall(),
                summary.wind_rose().calm_percentage()
            );
        }
        SummaryTier::Month | SummaryTier::Year => {
            info!("{} summary:\n{}", event.tier().label(), summary);
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn run() -> SummaryResult<()> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => {
            info!("Loading configuration from {}", path);
            RollupConfig::load(path)?
        }
        None => RollupConfig::default(),
    };
    let days = args
        .next()
        .and_then(|d| d.parse::<u32>().ok())
        .unwrap_or(DEFAULT_DAYS);

    info!(
        "Replaying {} days: {} sectors, {} speed bins, {} threshold bins",
        days,
        config.wind.direction_slice_count,
        config.wind.speed_bin_count,
        config.threshold_bins.len()
    );

    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let mut generator = MockObservationGenerator::new(start);
    let mut accumulator = RollupAccumulator::new(config)?;

    let samples = u64::from(days) * 86_400 / SAMPLE_INTERVAL.as_secs();
    for _ in 0..samples {
        let obs = generator.next_observation();
        for event in accumulator.add_observation(&obs)? {
            report(&event);
        }
    }
    for event in accumulator.finish()? {
        report(&event);
    }

    info!("Replay finished");
    Ok(())
}

fn main() {
    env_logger::init();
    info!("Starting weather-rollup replay");

    if let Err(e) = run() {
        error!("Replay failed: {}", e);
        std::process::exit(1);
    }
}
