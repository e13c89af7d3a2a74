//! Driver capability boundary.
//!
//! [`SensorDriver`] is the one seam between the measurement workflow and the
//! vendor library: it owns buffer allocation and marshals every raw output
//! parameter into a typed return value. The FFI-backed implementation lives
//! in [`native`] (feature `goio_hardware`); the scriptable in-memory
//! implementation used by the tests lives in [`mock`] (feature `mock`).

use std::fmt;

use crate::calibration::{CalibrationEquation, CalibrationPage};
use crate::error::GoIoResult;
use crate::products::Product;

#[cfg(feature = "mock")]
pub mod mock;
#[cfg(feature = "goio_hardware")]
pub mod native;

/// Default acknowledgement bound for configure and command calls.
pub const DEFAULT_TIMEOUT_MS: u32 = 2000;

/// Acknowledgement bound for DDS memory block reads.
pub const READ_DDSMEMBLOCK_TIMEOUT_MS: u32 = 2000;

/// Acknowledgement bound for DDS memory block writes.
pub const WRITE_DDSMEMBLOCK_TIMEOUT_MS: u32 = 4000;

/// Command id that starts streaming measurements. No payload.
pub const CMD_ID_START_MEASUREMENTS: u8 = 0x18;

/// Longest device name the driver will produce, excluding the NUL.
pub const MAX_DEVICE_NAME_LEN: usize = 255;

/// Opaque reference to one open sensor connection.
///
/// Created by [`SensorDriver::open`], destroyed by [`SensorDriver::close`].
/// The wrapped value is whatever the driver uses internally (a pointer for
/// the vendor library); callers only pass it back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(pub(crate) usize);

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Version of the loaded vendor library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverVersion {
    /// Major version.
    pub major: u16,
    /// Minor version.
    pub minor: u16,
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Capability trait over the GoIO driver surface.
///
/// Implementations are synchronous and blocking, matching the vendor
/// library. Process-wide driver state is tied to the implementing value's
/// lifetime: construction initializes the library, drop releases it.
pub trait SensorDriver {
    /// Version of the underlying driver library.
    fn version(&self) -> GoIoResult<DriverVersion>;

    /// Refreshes the driver's view of attached devices for one product
    /// family and returns how many are present. Zero is not an error.
    fn update_available_devices(&self, vendor_id: u16, product: Product) -> GoIoResult<usize>;

    /// Name of the `index`-th available device for the family, for
    /// `index` in `[0, count)` of the preceding enumeration.
    fn device_name(&self, vendor_id: u16, product: Product, index: usize) -> GoIoResult<String>;

    /// Opens the named device and returns its handle.
    fn open(&self, name: &str, vendor_id: u16, product: Product) -> GoIoResult<DeviceHandle>;

    /// Closes an open handle. Must be called exactly once per open.
    fn close(&self, handle: DeviceHandle) -> GoIoResult<()>;

    /// Sets the measurement sampling period, in seconds.
    fn set_measurement_period(
        &self,
        handle: DeviceHandle,
        period_s: f64,
        timeout_ms: u32,
    ) -> GoIoResult<()>;

    /// Sends one command and returns its response bytes, if any.
    fn send_command(
        &self,
        handle: DeviceHandle,
        command: u8,
        payload: &[u8],
        timeout_ms: u32,
    ) -> GoIoResult<Vec<u8>>;

    /// Drains up to `capacity` buffered raw samples. The returned length is
    /// the actual count read; fewer than `capacity` is a normal short read.
    fn read_raw_measurements(
        &self,
        handle: DeviceHandle,
        capacity: usize,
    ) -> GoIoResult<Vec<i32>>;

    /// Converts one raw sample to a probe voltage.
    fn convert_to_voltage(&self, handle: DeviceHandle, raw: i32) -> GoIoResult<f64>;

    /// Applies the active calibration equation to a voltage.
    fn calibrate_data(&self, handle: DeviceHandle, volts: f64) -> GoIoResult<f64>;

    /// Numeric sensor id from the sensor's DDS record.
    fn sensor_number(&self, handle: DeviceHandle) -> GoIoResult<u8>;

    /// Long display name from the sensor's DDS record. May be empty.
    fn sensor_long_name(&self, handle: DeviceHandle) -> GoIoResult<String>;

    /// Calibration equation tag from the sensor's DDS record.
    fn calibration_equation(&self, handle: DeviceHandle) -> GoIoResult<CalibrationEquation>;

    /// Index of the active calibration page.
    fn active_calibration_page(&self, handle: DeviceHandle) -> GoIoResult<u8>;

    /// Coefficients and units of one calibration page.
    fn calibration_page(&self, handle: DeviceHandle, page: u8) -> GoIoResult<CalibrationPage>;
}
