//! End-to-end reporting properties: averaging across sample counts and the
//! linear-vs-nonlinear formatting split.

#![cfg(feature = "mock")]

use std::sync::atomic::Ordering;

use goio::calibration::{CalibrationEquation, CalibrationPage};
use goio::driver::mock::{MockDevice, MockDriver};
use goio::driver::DEFAULT_TIMEOUT_MS;
use goio::products::{Product, VERNIER_VENDOR_ID};
use goio::session::SensorSession;

fn volts_page() -> CalibrationPage {
    CalibrationPage {
        a: 0.0,
        b: 1.0,
        c: 0.0,
        units: "Volts".to_string(),
    }
}

/// Runs the full acquire-and-average flow for one device.
fn take_reading(device: MockDevice) -> (goio::session::CalibratedReading, MockDriver) {
    let driver = MockDriver::new().with_device(device);
    let reading = {
        let session =
            SensorSession::open(&driver, "dev", VERNIER_VENDOR_ID, Product::GoLink).unwrap();
        session.set_measurement_period(0.040, DEFAULT_TIMEOUT_MS).unwrap();
        session.start_measurements(DEFAULT_TIMEOUT_MS).unwrap();
        let raw = session.read_raw_measurements(100).unwrap();
        session.calibrated_reading(&raw).unwrap()
    };
    (reading, driver)
}

#[test]
fn test_average_of_many_samples_is_the_arithmetic_mean() {
    // calibrated = 0.5 + 2.0 * (raw * 0.001) -> 2.5, 4.5, 6.5, 8.5
    let device = MockDevice::new(Product::GoLink, "dev")
        .with_raw_samples(vec![1000, 2000, 3000, 4000])
        .with_volts_per_count(0.001)
        .with_calibration(0.5, 2.0);
    let (reading, _driver) = take_reading(device);

    assert_eq!(reading.sample_count, 4);
    assert!((reading.average - 5.5).abs() < 1e-9);
}

#[test]
fn test_fixed_samples_with_volts_page_format_to_three_decimals() {
    let device = MockDevice::new(Product::GoLink, "dev")
        .with_raw_samples(vec![2748, 2748, 2748])
        .with_volts_per_count(0.001)
        .with_page(volts_page());
    let (reading, _driver) = take_reading(device);

    assert_eq!(reading.to_string(), "2.748 Volts");
}

#[test]
fn test_single_sample_is_reported_unaveraged() {
    let device = MockDevice::new(Product::GoLink, "dev")
        .with_raw_samples(vec![2000])
        .with_volts_per_count(0.001);
    let (reading, _driver) = take_reading(device);

    assert_eq!(reading.sample_count, 1);
    assert!((reading.average - 2.0).abs() < 1e-9);
}

#[test]
fn test_empty_read_reports_zero_without_dividing() {
    // Historical quirk, kept on purpose: an empty acquisition is displayed
    // as a 0.0 "average" even though no sample backs it.
    let device = MockDevice::new(Product::GoLink, "dev")
        .with_raw_samples(vec![])
        .with_page(volts_page());
    let (reading, _driver) = take_reading(device);

    assert_eq!(reading.sample_count, 0);
    assert_eq!(reading.average, 0.0);
    assert_eq!(reading.to_string(), "0.000 Volts");
}

#[test]
fn test_nonlinear_equation_reports_volts_and_never_fetches_the_page() {
    let device = MockDevice::new(Product::GoLink, "dev")
        .with_raw_samples(vec![1500])
        .with_volts_per_count(0.001)
        .with_equation(CalibrationEquation::SteinhartHart);
    let (reading, driver) = take_reading(device);

    assert!(reading.calibration.is_none());
    assert_eq!(reading.to_string(), "1.5 volts");
    assert_eq!(
        driver.counts().calibration_page_reads.load(Ordering::SeqCst),
        0
    );
}

#[test]
fn test_read_capacity_bounds_the_sample_count() {
    let device = MockDevice::new(Product::GoLink, "dev")
        .with_raw_samples((0..200).collect());
    let driver = MockDriver::new().with_device(device);

    let session =
        SensorSession::open(&driver, "dev", VERNIER_VENDOR_ID, Product::GoLink).unwrap();
    session.start_measurements(DEFAULT_TIMEOUT_MS).unwrap();
    let raw = session.read_raw_measurements(100).unwrap();
    assert_eq!(raw.len(), 100);
}
