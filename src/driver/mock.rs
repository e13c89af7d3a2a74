//! Scriptable in-memory driver for tests and SDK-less demo runs.
//!
//! The mock mirrors the vendor library's observable behavior: enumeration by
//! product family, one handle per open, a raw sample buffer that drains on
//! first read, and DDS-style sensor metadata. Failure injection at open,
//! configure, and start lets tests drive every abort path of the session
//! workflow, and [`CallCounts`] records the cleanup calls those tests assert
//! on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::calibration::{CalibrationEquation, CalibrationPage};
use crate::driver::{
    DeviceHandle, DriverVersion, SensorDriver, CMD_ID_START_MEASUREMENTS,
};
use crate::error::{GoIoError, GoIoResult};
use crate::products::Product;

/// Call counters shared with tests via [`MockDriver::counts`].
#[derive(Debug, Default)]
pub struct CallCounts {
    /// Successful and failed open attempts.
    pub opens: AtomicUsize,
    /// Close calls.
    pub closes: AtomicUsize,
    /// Driver uninitializations (the mock's drop).
    pub uninits: AtomicUsize,
    /// Calibration page fetches.
    pub calibration_page_reads: AtomicUsize,
}

/// One simulated attached device.
#[derive(Debug, Clone)]
pub struct MockDevice {
    product: Product,
    name: String,
    sensor_number: u8,
    long_name: String,
    raw_samples: Vec<i32>,
    volts_per_count: f64,
    calibration_offset: f64,
    calibration_gain: f64,
    equation: CalibrationEquation,
    active_page: u8,
    page: CalibrationPage,
}

impl MockDevice {
    /// A device with a plain linear volts-in, volts-out calibration.
    pub fn new(product: Product, name: &str) -> Self {
        Self {
            product,
            name: name.to_string(),
            sensor_number: 10,
            long_name: String::new(),
            raw_samples: Vec::new(),
            // 12-bit ADC over a 5 V range, the Go!Link transfer function.
            volts_per_count: 5.0 / 4096.0,
            calibration_offset: 0.0,
            calibration_gain: 1.0,
            equation: CalibrationEquation::Linear,
            active_page: 0,
            page: CalibrationPage {
                a: 0.0,
                b: 1.0,
                c: 0.0,
                units: "Volts".to_string(),
            },
        }
    }

    /// Sets the DDS sensor id.
    pub fn with_sensor_number(mut self, number: u8) -> Self {
        self.sensor_number = number;
        self
    }

    /// Sets the DDS long name.
    pub fn with_long_name(mut self, name: &str) -> Self {
        self.long_name = name.to_string();
        self
    }

    /// Sets the raw samples one acquisition will yield.
    pub fn with_raw_samples(mut self, samples: Vec<i32>) -> Self {
        self.raw_samples = samples;
        self
    }

    /// Sets the raw-count-to-voltage scale.
    pub fn with_volts_per_count(mut self, scale: f64) -> Self {
        self.volts_per_count = scale;
        self
    }

    /// Sets the calibration applied to voltages: `offset + gain * volts`.
    pub fn with_calibration(mut self, offset: f64, gain: f64) -> Self {
        self.calibration_offset = offset;
        self.calibration_gain = gain;
        self
    }

    /// Sets the DDS equation tag.
    pub fn with_equation(mut self, equation: CalibrationEquation) -> Self {
        self.equation = equation;
        self
    }

    /// Sets the active calibration page contents.
    pub fn with_page(mut self, page: CalibrationPage) -> Self {
        self.page = page;
        self
    }
}

#[derive(Debug)]
struct OpenState {
    device: usize,
    acquiring: bool,
    drained: bool,
}

#[derive(Debug, Default)]
struct MockState {
    next_handle: usize,
    open: HashMap<usize, OpenState>,
}

/// In-memory [`SensorDriver`] implementation.
#[derive(Debug)]
pub struct MockDriver {
    devices: Vec<MockDevice>,
    fail_open: bool,
    fail_configure: bool,
    fail_start: bool,
    counts: Arc<CallCounts>,
    state: Mutex<MockState>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// A driver with no attached devices.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            fail_open: false,
            fail_configure: false,
            fail_start: false,
            counts: Arc::new(CallCounts::default()),
            state: Mutex::new(MockState {
                // Arbitrary but recognizable in logs.
                next_handle: 0xfa14_0000,
                open: HashMap::new(),
            }),
        }
    }

    /// Attaches a simulated device.
    pub fn with_device(mut self, device: MockDevice) -> Self {
        self.devices.push(device);
        self
    }

    /// Makes every open attempt fail with `DeviceUnavailable`.
    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Makes `set_measurement_period` fail with `Timeout`.
    pub fn fail_configure(mut self) -> Self {
        self.fail_configure = true;
        self
    }

    /// Makes the start-measurements command fail with `Timeout`.
    pub fn fail_start_measurements(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Shared call counters, kept alive past the driver's drop.
    pub fn counts(&self) -> Arc<CallCounts> {
        Arc::clone(&self.counts)
    }

    fn device_for(&self, handle: DeviceHandle, operation: &'static str) -> GoIoResult<&MockDevice> {
        let state = self.state.lock().unwrap();
        let open = state
            .open
            .get(&handle.0)
            .ok_or(GoIoError::CommandFailed { operation, status: -1 })?;
        Ok(&self.devices[open.device])
    }
}

impl Drop for MockDriver {
    fn drop(&mut self) {
        self.counts.uninits.fetch_add(1, Ordering::SeqCst);
        debug!("mock driver uninitialized");
    }
}

impl SensorDriver for MockDriver {
    fn version(&self) -> GoIoResult<DriverVersion> {
        Ok(DriverVersion { major: 2, minor: 28 })
    }

    fn update_available_devices(&self, _vendor_id: u16, product: Product) -> GoIoResult<usize> {
        Ok(self.devices.iter().filter(|d| d.product == product).count())
    }

    fn device_name(&self, _vendor_id: u16, product: Product, index: usize) -> GoIoResult<String> {
        self.devices
            .iter()
            .filter(|d| d.product == product)
            .nth(index)
            .map(|d| d.name.clone())
            .ok_or(GoIoError::CommandFailed {
                operation: "get device name",
                status: -1,
            })
    }

    fn open(&self, name: &str, _vendor_id: u16, product: Product) -> GoIoResult<DeviceHandle> {
        self.counts.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(GoIoError::DeviceUnavailable {
                name: name.to_string(),
            });
        }
        let device = self
            .devices
            .iter()
            .position(|d| d.product == product && d.name == name)
            .ok_or_else(|| GoIoError::DeviceUnavailable {
                name: name.to_string(),
            })?;

        let mut state = self.state.lock().unwrap();
        let handle = state.next_handle;
        state.next_handle += 4;
        state.open.insert(
            handle,
            OpenState {
                device,
                acquiring: false,
                drained: false,
            },
        );
        debug!(device = name, handle = %DeviceHandle(handle), "mock sensor opened");
        Ok(DeviceHandle(handle))
    }

    fn close(&self, handle: DeviceHandle) -> GoIoResult<()> {
        self.counts.closes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        state
            .open
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(GoIoError::CommandFailed {
                operation: "close sensor",
                status: -1,
            })
    }

    fn set_measurement_period(
        &self,
        handle: DeviceHandle,
        period_s: f64,
        timeout_ms: u32,
    ) -> GoIoResult<()> {
        if self.fail_configure {
            return Err(GoIoError::Timeout {
                operation: "set measurement period",
                timeout_ms,
            });
        }
        if period_s <= 0.0 {
            return Err(GoIoError::CommandFailed {
                operation: "set measurement period",
                status: -1,
            });
        }
        self.device_for(handle, "set measurement period")?;
        Ok(())
    }

    fn send_command(
        &self,
        handle: DeviceHandle,
        command: u8,
        _payload: &[u8],
        timeout_ms: u32,
    ) -> GoIoResult<Vec<u8>> {
        self.device_for(handle, "send command")?;
        if command == CMD_ID_START_MEASUREMENTS {
            if self.fail_start {
                return Err(GoIoError::Timeout {
                    operation: "send command",
                    timeout_ms,
                });
            }
            let mut state = self.state.lock().unwrap();
            if let Some(open) = state.open.get_mut(&handle.0) {
                open.acquiring = true;
            }
        }
        Ok(Vec::new())
    }

    fn read_raw_measurements(
        &self,
        handle: DeviceHandle,
        capacity: usize,
    ) -> GoIoResult<Vec<i32>> {
        let mut state = self.state.lock().unwrap();
        let open = state
            .open
            .get_mut(&handle.0)
            .ok_or(GoIoError::CommandFailed {
                operation: "read raw measurements",
                status: -1,
            })?;
        if !open.acquiring || open.drained {
            return Ok(Vec::new());
        }
        open.drained = true;
        let samples = &self.devices[open.device].raw_samples;
        Ok(samples.iter().take(capacity).copied().collect())
    }

    fn convert_to_voltage(&self, handle: DeviceHandle, raw: i32) -> GoIoResult<f64> {
        let device = self.device_for(handle, "convert to voltage")?;
        Ok(f64::from(raw) * device.volts_per_count)
    }

    fn calibrate_data(&self, handle: DeviceHandle, volts: f64) -> GoIoResult<f64> {
        let device = self.device_for(handle, "calibrate data")?;
        Ok(device.calibration_offset + device.calibration_gain * volts)
    }

    fn sensor_number(&self, handle: DeviceHandle) -> GoIoResult<u8> {
        Ok(self.device_for(handle, "get sensor number")?.sensor_number)
    }

    fn sensor_long_name(&self, handle: DeviceHandle) -> GoIoResult<String> {
        Ok(self
            .device_for(handle, "get sensor long name")?
            .long_name
            .clone())
    }

    fn calibration_equation(&self, handle: DeviceHandle) -> GoIoResult<CalibrationEquation> {
        Ok(self.device_for(handle, "get calibration equation")?.equation)
    }

    fn active_calibration_page(&self, handle: DeviceHandle) -> GoIoResult<u8> {
        Ok(self
            .device_for(handle, "get active calibration page")?
            .active_page)
    }

    fn calibration_page(&self, handle: DeviceHandle, _page: u8) -> GoIoResult<CalibrationPage> {
        self.counts
            .calibration_page_reads
            .fetch_add(1, Ordering::SeqCst);
        Ok(self.device_for(handle, "get calibration page")?.page.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::VERNIER_VENDOR_ID;

    #[test]
    fn test_enumeration_filters_by_product() {
        let driver = MockDriver::new()
            .with_device(MockDevice::new(Product::GoLink, "0xfa140000"))
            .with_device(MockDevice::new(Product::GoTemp, "0x10"));
        assert_eq!(
            driver
                .update_available_devices(VERNIER_VENDOR_ID, Product::GoLink)
                .unwrap(),
            1
        );
        assert_eq!(
            driver
                .update_available_devices(VERNIER_VENDOR_ID, Product::GoMotion)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_buffer_drains_on_first_read() {
        let driver = MockDriver::new().with_device(
            MockDevice::new(Product::GoLink, "dev").with_raw_samples(vec![1, 2, 3]),
        );
        let handle = driver.open("dev", VERNIER_VENDOR_ID, Product::GoLink).unwrap();
        driver
            .send_command(handle, CMD_ID_START_MEASUREMENTS, &[], 2000)
            .unwrap();
        assert_eq!(driver.read_raw_measurements(handle, 100).unwrap(), vec![1, 2, 3]);
        assert!(driver.read_raw_measurements(handle, 100).unwrap().is_empty());
    }

    #[test]
    fn test_read_before_start_yields_nothing() {
        let driver = MockDriver::new().with_device(
            MockDevice::new(Product::GoLink, "dev").with_raw_samples(vec![1, 2, 3]),
        );
        let handle = driver.open("dev", VERNIER_VENDOR_ID, Product::GoLink).unwrap();
        assert!(driver.read_raw_measurements(handle, 100).unwrap().is_empty());
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let driver = MockDriver::new()
            .with_device(MockDevice::new(Product::GoLink, "dev"));
        let handle = driver.open("dev", VERNIER_VENDOR_ID, Product::GoLink).unwrap();
        driver.close(handle).unwrap();
        assert!(driver.sensor_number(handle).is_err());
    }
}
