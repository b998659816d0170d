//! Folding observations directly and merging partial summaries must agree.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use weather_rollup::measurement::MeasurementAccumulator;
use weather_rollup::quantity::{
    Depth, Heading, Humidity, Pressure, Quantity, SolarRadiation, Speed, Temperature,
};
use weather_rollup::sensors::SensorType;
use weather_rollup::storage::RollupEvent;
use weather_rollup::{
    Observation, PeriodSummary, RollupAccumulator, RollupConfig, SensorReading, ThresholdBin,
    ThresholdDirection, Wind, WindParameters,
};

const EPS: f64 = 1e-6;

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 4, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn bins() -> Vec<ThresholdBin> {
    vec![
        ThresholdBin::new(1, ThresholdDirection::Above, Temperature(60.0)),
        ThresholdBin::new(2, ThresholdDirection::Below, Temperature(45.0)),
    ]
}

fn config() -> RollupConfig {
    RollupConfig {
        wind: WindParameters::default(),
        threshold_bins: bins(),
    }
}

/// Deterministic observation `i` of a five-minute stream
fn observation(i: u32) -> Observation {
    let x = i as f64;
    let time = start() + TimeDelta::minutes(5 * i as i64);
    // Alternate 5 and 10 minute validity so the weighting matters.
    let duration = Duration::from_secs(if i % 2 == 0 { 300 } else { 600 });
    let mut obs = Observation::with_duration(time, duration);

    obs.outdoor_temp = Some(Temperature(52.0 + 10.0 * (x / 40.0).sin() + (x / 3.0).cos()));
    obs.indoor_temp = Some(Temperature(68.0 + (x / 11.0).sin()));
    obs.outdoor_humidity = Some(Humidity(60.0 + 25.0 * (x / 50.0).cos()));
    obs.indoor_humidity = Some(Humidity(40.0 + 4.0 * (x / 17.0).sin()));
    if i % 5 != 0 {
        obs.baro_pressure = Some(Pressure(29.8 + 0.2 * (x / 70.0).sin()));
    }
    obs.dew_point = Some(Temperature(40.0 + 5.0 * (x / 30.0).sin()));
    obs.solar_radiation = Some(SolarRadiation((500.0 * (x / 60.0).sin()).max(0.0)));

    let speed = if i % 9 == 0 { 0.0 } else { (x * 1.3) % 27.0 };
    obs.wind = Some(Wind::new(Speed(speed), Heading((x * 17.0) % 360.0)));
    obs.gust = Some(Speed(speed * 1.5));

    // Heat index only in the warm half of the cycle, wind chill only in wind.
    let temp = obs.outdoor_temp.map_or(0.0, |t| t.0);
    if temp >= 52.0 {
        obs.heat_index = Some(Temperature(temp + 0.1 * (i % 7) as f64));
    }
    if speed > 0.0 {
        obs.wind_chill = Some(Temperature(temp - 0.2 * speed));
    }

    if (i / 12) % 4 == 1 {
        obs.rainfall = Some(Depth(0.1 + (i % 3) as f64 * 0.05));
        obs.high_rainfall_rate = Some(Depth((i % 4) as f64));
    }
    obs.evapotranspiration = Some(Depth(0.01));

    obs.sensor_readings.push(SensorReading {
        sensor_id: 4,
        sensor_type: SensorType::SoilMoisture,
        value: 20.0 + (x / 25.0).sin() * 5.0,
    });
    if i % 2 == 0 {
        obs.sensor_readings.push(SensorReading {
            sensor_id: 8,
            sensor_type: SensorType::LeafWetness,
            value: (i % 16) as f64,
        });
    }
    obs
}

fn fold(date: NaiveDate, obs: impl IntoIterator<Item = Observation>) -> PeriodSummary {
    let mut summary = PeriodSummary::new(date, &WindParameters::default(), &bins()).unwrap();
    for o in obs {
        summary.apply_observation(&o).unwrap();
    }
    summary
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

fn assert_accumulators_match<Q: Quantity>(
    name: &str,
    a: &MeasurementAccumulator<Q>,
    b: &MeasurementAccumulator<Q>,
) {
    assert_eq!(a.min_extremum(), b.min_extremum(), "{name} minimum");
    assert_eq!(a.max_extremum(), b.max_extremum(), "{name} maximum");
    assert_eq!(a.duration(), b.duration(), "{name} duration");
    match (a.average(), b.average()) {
        (Some(x), Some(y)) => assert!(close(x.value(), y.value()), "{name} average {x:?} != {y:?}"),
        (None, None) => {}
        (x, y) => panic!("{name} average {x:?} != {y:?}"),
    }
}

fn assert_summaries_match(a: &PeriodSummary, b: &PeriodSummary) {
    assert_eq!(a.duration(), b.duration());

    assert_accumulators_match("outdoor temp", a.outdoor_temp(), b.outdoor_temp());
    assert_accumulators_match("indoor temp", a.indoor_temp(), b.indoor_temp());
    assert_accumulators_match("outdoor humidity", a.outdoor_humidity(), b.outdoor_humidity());
    assert_accumulators_match("indoor humidity", a.indoor_humidity(), b.indoor_humidity());
    assert_accumulators_match("pressure", a.baro_pressure(), b.baro_pressure());
    assert_accumulators_match("wind speed", a.wind_speed(), b.wind_speed());
    assert_accumulators_match("wind gust", a.wind_gust(), b.wind_gust());
    assert_accumulators_match("solar", a.solar_radiation(), b.solar_radiation());
    assert_accumulators_match("dew point", a.dew_point(), b.dew_point());
    assert_accumulators_match("heat index", a.heat_index(), b.heat_index());
    assert_accumulators_match("wind chill", a.wind_chill(), b.wind_chill());
    assert!(!a.heat_index().is_empty() && !a.wind_chill().is_empty());
    assert!(!a.indoor_humidity().is_empty());

    assert_eq!(a.max_high_outdoor_temp(), b.max_high_outdoor_temp());
    assert_eq!(a.min_low_outdoor_temp(), b.min_low_outdoor_temp());

    let (ra, rb) = (a.wind_rose(), b.wind_rose());
    assert_eq!(ra.total_duration(), rb.total_duration());
    assert_eq!(ra.calm_duration(), rb.calm_duration());
    for (sa, sb) in ra.slices().iter().zip(rb.slices()) {
        assert_eq!(sa.slice_duration(), sb.slice_duration());
        assert_eq!(sa.max_speed(), sb.max_speed());
        assert_eq!(sa.bin_durations(), sb.bin_durations());
        match (sa.avg_speed(), sb.avg_speed()) {
            (Some(x), Some(y)) => assert!(close(x.0, y.0)),
            (x, y) => assert_eq!(x, y),
        }
    }
    for i in 0..ra.num_slices() {
        assert!(close(ra.percentage_of_total(i), rb.percentage_of_total(i)));
        assert!(close(ra.percentage_of_wind(i), rb.percentage_of_wind(i)));
    }

    for (ba, bb) in a.threshold_bins().iter().zip(b.threshold_bins()) {
        assert_eq!(ba.bin_id(), bb.bin_id());
        assert_eq!(ba.duration(), bb.duration());
    }

    let hours_a: Vec<_> = a.hourly_rainfall().hours().collect();
    let hours_b: Vec<_> = b.hourly_rainfall().hours().collect();
    assert_eq!(hours_a.len(), hours_b.len());
    for ((ha, da), (hb, db)) in hours_a.iter().zip(&hours_b) {
        assert_eq!(ha, hb);
        assert!(close(da.0, db.0));
    }
    assert!(close(a.total_rainfall().0, b.total_rainfall().0));
    assert!(close(a.total_et().0, b.total_et().0));
    assert_eq!(a.max_rainfall_rate(), b.max_rainfall_rate());

    let sensors_a: Vec<_> = a.sensors().collect();
    let sensors_b: Vec<_> = b.sensors().collect();
    assert_eq!(sensors_a.len(), sensors_b.len());
    for (sa, sb) in sensors_a.iter().zip(&sensors_b) {
        assert_eq!(sa.sensor_id(), sb.sensor_id());
        assert_eq!(sa.stats().minimum(), sb.stats().minimum());
        assert_eq!(sa.stats().maximum_time(), sb.stats().maximum_time());
        assert_eq!(sa.stats().duration(), sb.stats().duration());
        let (x, y) = (sa.stats().average().unwrap(), sb.stats().average().unwrap());
        assert!(close(x, y));
    }
}

#[test]
fn test_contiguous_partitions_merge_to_direct_fold() {
    let date = start().date();
    let direct = fold(date, (0..288).map(observation));

    let groups = [0..100, 100..101, 101..288];
    let mut merged = PeriodSummary::new(date, &WindParameters::default(), &bins()).unwrap();
    for group in groups {
        merged.merge_period(&fold(date, group.map(observation))).unwrap();
    }

    assert_summaries_match(&merged, &direct);
}

#[test]
fn test_interleaved_partitions_merge_in_any_order() {
    let date = start().date();
    let direct = fold(date, (0..288).map(observation));

    let parts: Vec<PeriodSummary> = (0..3)
        .map(|k| fold(date, (0..288).filter(|i| i % 3 == k).map(observation)))
        .collect();

    let mut forward = PeriodSummary::new(date, &WindParameters::default(), &bins()).unwrap();
    for part in &parts {
        forward.merge_period(part).unwrap();
    }
    let mut backward = PeriodSummary::new(date, &WindParameters::default(), &bins()).unwrap();
    for part in parts.iter().rev() {
        backward.merge_period(part).unwrap();
    }

    assert_summaries_match(&forward, &direct);
    assert_summaries_match(&backward, &direct);
}

#[test]
fn test_nested_merges_are_associative() {
    let date = start().date();
    let direct = fold(date, (0..288).map(observation));

    // (a + b) + c against a + (b + c)
    let a = fold(date, (0..90).map(observation));
    let b = fold(date, (90..200).map(observation));
    let c = fold(date, (200..288).map(observation));

    let mut left = a.clone();
    left.merge_period(&b).unwrap();
    left.merge_period(&c).unwrap();

    let mut bc = b.clone();
    bc.merge_period(&c).unwrap();
    let mut right = a.clone();
    right.merge_period(&bc).unwrap();

    assert_summaries_match(&left, &direct);
    assert_summaries_match(&right, &direct);
    assert_eq!(
        left.period_temperatures().high().max_extremum(),
        right.period_temperatures().high().max_extremum()
    );
}

#[test]
fn test_tiered_rollup_matches_direct_month() {
    // Nine days of data, so the month is built from nine day merges.
    let count = 288 * 9;
    let mut accumulator = RollupAccumulator::new(config()).unwrap();
    let mut events = Vec::new();
    for i in 0..count {
        events.extend(accumulator.add_observation(&observation(i)).unwrap());
    }
    events.extend(accumulator.finish().unwrap());

    let days = events
        .iter()
        .filter(|e| matches!(e, RollupEvent::Day(_)))
        .count();
    assert_eq!(days, 9);

    let month = events
        .iter()
        .find_map(|e| match e {
            RollupEvent::Month(m) => Some(m),
            _ => None,
        })
        .unwrap();
    let direct = fold(month.date(), (0..count).map(observation));

    assert_summaries_match(month, &direct);
    assert_eq!(month.date(), start().date());
}
