//! Cleanup invariants of the sensor session workflow: close and uninit run
//! exactly once per session/driver no matter where the sequence fails.

#![cfg(feature = "mock")]

use std::sync::atomic::Ordering;

use goio::driver::mock::{MockDevice, MockDriver};
use goio::driver::{SensorDriver, DEFAULT_TIMEOUT_MS};
use goio::products::{Product, VERNIER_VENDOR_ID};
use goio::session::SensorSession;
use goio::GoIoError;

fn golink(samples: Vec<i32>) -> MockDevice {
    MockDevice::new(Product::GoLink, "0xfa140000")
        .with_sensor_number(10)
        .with_raw_samples(samples)
}

#[test]
fn test_happy_path_closes_and_uninits_exactly_once() {
    let driver = MockDriver::new().with_device(golink(vec![100, 200, 300]));
    let counts = driver.counts();

    let session =
        SensorSession::open(&driver, "0xfa140000", VERNIER_VENDOR_ID, Product::GoLink).unwrap();
    session.set_measurement_period(0.040, DEFAULT_TIMEOUT_MS).unwrap();
    session.start_measurements(DEFAULT_TIMEOUT_MS).unwrap();
    let raw = session.read_raw_measurements(100).unwrap();
    assert_eq!(raw.len(), 3);
    session.close().unwrap();

    drop(driver);
    assert_eq!(counts.closes.load(Ordering::SeqCst), 1);
    assert_eq!(counts.uninits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dropping_an_open_session_closes_it() {
    let driver = MockDriver::new().with_device(golink(vec![]));
    let counts = driver.counts();

    {
        let _session =
            SensorSession::open(&driver, "0xfa140000", VERNIER_VENDOR_ID, Product::GoLink)
                .unwrap();
        // Session dropped here without an explicit close.
    }

    assert_eq!(counts.closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_open_failure_skips_close_but_uninit_still_runs() {
    let driver = MockDriver::new()
        .with_device(golink(vec![]))
        .fail_open();
    let counts = driver.counts();

    let err = SensorSession::open(&driver, "0xfa140000", VERNIER_VENDOR_ID, Product::GoLink)
        .unwrap_err();
    assert!(matches!(err, GoIoError::DeviceUnavailable { .. }));

    drop(driver);
    assert_eq!(counts.closes.load(Ordering::SeqCst), 0);
    assert_eq!(counts.uninits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_configure_timeout_still_closes_exactly_once() {
    let driver = MockDriver::new()
        .with_device(golink(vec![1, 2, 3]))
        .fail_configure();
    let counts = driver.counts();

    {
        let session =
            SensorSession::open(&driver, "0xfa140000", VERNIER_VENDOR_ID, Product::GoLink)
                .unwrap();
        let err = session
            .set_measurement_period(0.040, DEFAULT_TIMEOUT_MS)
            .unwrap_err();
        assert!(matches!(err, GoIoError::Timeout { timeout_ms: 2000, .. }));
        // Abort the session; cleanup happens on drop.
    }

    drop(driver);
    assert_eq!(counts.closes.load(Ordering::SeqCst), 1);
    assert_eq!(counts.uninits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_start_command_failure_still_closes_exactly_once() {
    let driver = MockDriver::new()
        .with_device(golink(vec![1, 2, 3]))
        .fail_start_measurements();
    let counts = driver.counts();

    {
        let session =
            SensorSession::open(&driver, "0xfa140000", VERNIER_VENDOR_ID, Product::GoLink)
                .unwrap();
        session.set_measurement_period(0.040, DEFAULT_TIMEOUT_MS).unwrap();
        let err = session.start_measurements(DEFAULT_TIMEOUT_MS).unwrap_err();
        assert!(matches!(err, GoIoError::Timeout { .. }));
    }

    drop(driver);
    assert_eq!(counts.closes.load(Ordering::SeqCst), 1);
    assert_eq!(counts.uninits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_empty_enumeration_reports_zero_never_errors() {
    let driver = MockDriver::new();
    for product in Product::ALL {
        let count = driver
            .update_available_devices(VERNIER_VENDOR_ID, product)
            .unwrap();
        assert_eq!(count, 0, "{product} should enumerate as absent, not error");
    }
}

#[test]
fn test_short_read_is_a_smaller_buffer_not_an_error() {
    let driver = MockDriver::new().with_device(golink(vec![10, 20]));

    let session =
        SensorSession::open(&driver, "0xfa140000", VERNIER_VENDOR_ID, Product::GoLink).unwrap();
    session.start_measurements(DEFAULT_TIMEOUT_MS).unwrap();
    let raw = session.read_raw_measurements(100).unwrap();
    assert_eq!(raw, vec![10, 20]);
}
