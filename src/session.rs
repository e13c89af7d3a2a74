//! Scoped sensor session.
//!
//! [`SensorSession`] owns the device handle for the open → configure →
//! acquire → convert → close sequence. The handle is released exactly once:
//! either by an explicit [`SensorSession::close`], or by `Drop` when the
//! session unwinds out of scope after a failure partway through the
//! sequence. A close failure during drop is logged, never panicked on.

use std::fmt;

use tracing::error;

use crate::calibration::{self, CalibrationEquation, CalibrationPage};
use crate::driver::{DeviceHandle, SensorDriver, CMD_ID_START_MEASUREMENTS};
use crate::error::GoIoResult;
use crate::products::Product;

/// The outcome of one acquisition: the averaged calibrated value plus the
/// calibration metadata needed to report it.
#[derive(Debug, Clone)]
pub struct CalibratedReading {
    /// Averaged calibrated value. With fewer than two samples this is the
    /// unadjusted accumulator; see [`calibration::reported_average`].
    pub average: f64,
    /// Number of raw samples behind the average.
    pub sample_count: usize,
    /// Equation tag from the sensor's DDS record.
    pub equation: CalibrationEquation,
    /// Active calibration page, fetched only for linear equations.
    pub calibration: Option<CalibrationPage>,
}

impl fmt::Display for CalibratedReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&calibration::format_reading(
            self.average,
            self.equation,
            self.calibration.as_ref(),
        ))
    }
}

/// One open sensor connection, closed on drop.
#[derive(Debug)]
pub struct SensorSession<'d, D: SensorDriver> {
    driver: &'d D,
    handle: DeviceHandle,
    device_name: String,
    closed: bool,
}

impl<'d, D: SensorDriver> SensorSession<'d, D> {
    /// Opens the named device. Fails with `DeviceUnavailable` if the device
    /// disappeared between enumeration and open.
    pub fn open(
        driver: &'d D,
        name: &str,
        vendor_id: u16,
        product: Product,
    ) -> GoIoResult<Self> {
        let handle = driver.open(name, vendor_id, product)?;
        Ok(Self {
            driver,
            handle,
            device_name: name.to_string(),
            closed: false,
        })
    }

    /// The open device handle.
    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    /// Device name this session was opened with.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Numeric sensor id from DDS memory.
    pub fn sensor_number(&self) -> GoIoResult<u8> {
        self.driver.sensor_number(self.handle)
    }

    /// Long sensor name from DDS memory. May be empty.
    pub fn long_name(&self) -> GoIoResult<String> {
        self.driver.sensor_long_name(self.handle)
    }

    /// Sets the sampling period, in seconds.
    pub fn set_measurement_period(&self, period_s: f64, timeout_ms: u32) -> GoIoResult<()> {
        self.driver
            .set_measurement_period(self.handle, period_s, timeout_ms)
    }

    /// Sends the start-measurements command. The device begins buffering
    /// samples; the caller is expected to wait before reading.
    pub fn start_measurements(&self, timeout_ms: u32) -> GoIoResult<()> {
        self.driver
            .send_command(self.handle, CMD_ID_START_MEASUREMENTS, &[], timeout_ms)
            .map(|_| ())
    }

    /// Drains up to `capacity` buffered raw samples.
    pub fn read_raw_measurements(&self, capacity: usize) -> GoIoResult<Vec<i32>> {
        self.driver.read_raw_measurements(self.handle, capacity)
    }

    /// Converts raw samples to calibrated values and averages them, fetching
    /// the calibration page when the equation is linear.
    pub fn calibrated_reading(&self, raw: &[i32]) -> GoIoResult<CalibratedReading> {
        let mut calibrated = Vec::with_capacity(raw.len());
        for &sample in raw {
            let volts = self.driver.convert_to_voltage(self.handle, sample)?;
            calibrated.push(self.driver.calibrate_data(self.handle, volts)?);
        }
        let average = calibration::reported_average(&calibrated);

        let equation = self.driver.calibration_equation(self.handle)?;
        let page = if equation.is_linear() {
            let index = self.driver.active_calibration_page(self.handle)?;
            Some(self.driver.calibration_page(self.handle, index)?)
        } else {
            None
        };

        Ok(CalibratedReading {
            average,
            sample_count: raw.len(),
            equation,
            calibration: page,
        })
    }

    /// Closes the session, surfacing any close error to the caller. Dropping
    /// the session without calling this closes it too.
    pub fn close(mut self) -> GoIoResult<()> {
        self.closed = true;
        self.driver.close(self.handle)
    }
}

impl<D: SensorDriver> Drop for SensorSession<'_, D> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.driver.close(self.handle) {
            error!("failed to close sensor '{}': {}", self.device_name, e);
        }
    }
}
