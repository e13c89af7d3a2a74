//! FFI-backed driver speaking to `libGoIO_DLL`.
//!
//! This is the only module that touches raw pointers. Every call allocates
//! its own output buffers, checks the vendor status code, and hands back a
//! typed value; nothing `unsafe` leaks past [`NativeDriver`].

#![allow(unsafe_code)]

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};

use goio_sys as ffi;
use tracing::{debug, error};

use crate::calibration::{CalibrationEquation, CalibrationPage};
use crate::driver::{DeviceHandle, DriverVersion, SensorDriver, MAX_DEVICE_NAME_LEN};
use crate::error::{GoIoError, GoIoResult};
use crate::products::Product;

/// Output buffer size for command responses.
const RESPONSE_BUFFER_LEN: usize = 256;

/// Output buffer size for DDS long names.
const LONG_NAME_BUFFER_LEN: usize = 100;

/// Output buffer size for calibration units strings (20 chars + NUL).
const UNITS_BUFFER_LEN: usize = 21;

/// Process-wide handle to the vendor library.
///
/// Construction runs `GoIO_Init`; dropping the value runs `GoIO_Uninit`
/// unconditionally, after any open sensor handle has been closed. Only one
/// `NativeDriver` should exist at a time, matching the vendor library's
/// single global state.
pub struct NativeDriver {
    // GoIO calls are not thread-safe; keep the driver on one thread.
    _not_send: std::marker::PhantomData<*mut ()>,
}

impl NativeDriver {
    /// Loads and initializes the vendor library.
    pub fn init() -> GoIoResult<Self> {
        let status = unsafe { ffi::GoIO_Init() };
        if status < 0 {
            return Err(GoIoError::DriverUnavailable(format!(
                "GoIO_Init returned {status}"
            )));
        }
        debug!("GoIO driver initialized");
        Ok(Self {
            _not_send: std::marker::PhantomData,
        })
    }

    fn raw(handle: DeviceHandle) -> ffi::GOIO_SENSOR_HANDLE {
        handle.0 as ffi::GOIO_SENSOR_HANDLE
    }
}

impl Drop for NativeDriver {
    fn drop(&mut self) {
        let status = unsafe { ffi::GoIO_Uninit() };
        if status < 0 {
            error!(status, "GoIO_Uninit failed");
        } else {
            debug!("GoIO driver uninitialized");
        }
    }
}

/// Maps a negative status to `CommandFailed`.
fn check(operation: &'static str, status: i32) -> GoIoResult<()> {
    if status < 0 {
        Err(GoIoError::CommandFailed { operation, status })
    } else {
        Ok(())
    }
}

/// Reads a NUL-terminated C string out of an owned buffer.
fn string_from_buffer(buf: &[u8]) -> String {
    match CStr::from_bytes_until_nul(buf) {
        Ok(s) => s.to_string_lossy().into_owned(),
        Err(_) => String::from_utf8_lossy(buf).into_owned(),
    }
}

impl SensorDriver for NativeDriver {
    fn version(&self) -> GoIoResult<DriverVersion> {
        let mut major: u16 = 0;
        let mut minor: u16 = 0;
        let status = unsafe { ffi::GoIO_GetDLLVersion(&mut major, &mut minor) };
        check("get driver version", status)?;
        Ok(DriverVersion { major, minor })
    }

    fn update_available_devices(&self, vendor_id: u16, product: Product) -> GoIoResult<usize> {
        let count = unsafe {
            ffi::GoIO_UpdateListOfAvailableDevices(
                i32::from(vendor_id),
                i32::from(product.product_id()),
            )
        };
        if count < 0 {
            return Err(GoIoError::CommandFailed {
                operation: "update available devices",
                status: count,
            });
        }
        Ok(count as usize)
    }

    fn device_name(&self, vendor_id: u16, product: Product, index: usize) -> GoIoResult<String> {
        let mut buf = vec![0u8; MAX_DEVICE_NAME_LEN + 1];
        let status = unsafe {
            ffi::GoIO_GetNthAvailableDeviceName(
                buf.as_mut_ptr() as *mut c_char,
                MAX_DEVICE_NAME_LEN as i32,
                i32::from(vendor_id),
                i32::from(product.product_id()),
                index as i32,
            )
        };
        check("get device name", status)?;
        Ok(string_from_buffer(&buf))
    }

    fn open(&self, name: &str, vendor_id: u16, product: Product) -> GoIoResult<DeviceHandle> {
        let c_name =
            CString::new(name).map_err(|_| GoIoError::InvalidDeviceName(name.to_string()))?;
        // Last argument is the reserved strict-DDS flag, always 0.
        let handle = unsafe {
            ffi::GoIO_Sensor_Open(
                c_name.as_ptr() as *mut c_char,
                i32::from(vendor_id),
                i32::from(product.product_id()),
                0,
            )
        };
        if handle.is_null() {
            return Err(GoIoError::DeviceUnavailable {
                name: name.to_string(),
            });
        }
        debug!(device = name, "sensor opened");
        Ok(DeviceHandle(handle as usize))
    }

    fn close(&self, handle: DeviceHandle) -> GoIoResult<()> {
        let status = unsafe { ffi::GoIO_Sensor_Close(Self::raw(handle)) };
        check("close sensor", status)?;
        debug!(%handle, "sensor closed");
        Ok(())
    }

    fn set_measurement_period(
        &self,
        handle: DeviceHandle,
        period_s: f64,
        timeout_ms: u32,
    ) -> GoIoResult<()> {
        let status = unsafe {
            ffi::GoIO_Sensor_SetMeasurementPeriod(Self::raw(handle), period_s, timeout_ms as i32)
        };
        if status < 0 {
            return Err(GoIoError::Timeout {
                operation: "set measurement period",
                timeout_ms,
            });
        }
        Ok(())
    }

    fn send_command(
        &self,
        handle: DeviceHandle,
        command: u8,
        payload: &[u8],
        timeout_ms: u32,
    ) -> GoIoResult<Vec<u8>> {
        let mut response = vec![0u8; RESPONSE_BUFFER_LEN];
        let mut response_len = response.len() as i32;
        let payload_ptr = if payload.is_empty() {
            std::ptr::null::<u8>()
        } else {
            payload.as_ptr()
        };
        let status = unsafe {
            ffi::GoIO_Sensor_SendCmdAndGetResponse(
                Self::raw(handle),
                command,
                payload_ptr as *mut c_void,
                payload.len() as i32,
                response.as_mut_ptr() as *mut c_void,
                &mut response_len,
                timeout_ms as i32,
            )
        };
        if status < 0 {
            return Err(GoIoError::Timeout {
                operation: "send command",
                timeout_ms,
            });
        }
        response.truncate(response_len.max(0) as usize);
        Ok(response)
    }

    fn read_raw_measurements(
        &self,
        handle: DeviceHandle,
        capacity: usize,
    ) -> GoIoResult<Vec<i32>> {
        let mut buf = vec![0i32; capacity];
        let count = unsafe {
            ffi::GoIO_Sensor_ReadRawMeasurements(
                Self::raw(handle),
                buf.as_mut_ptr(),
                capacity as i32,
            )
        };
        if count < 0 {
            return Err(GoIoError::CommandFailed {
                operation: "read raw measurements",
                status: count,
            });
        }
        buf.truncate(count as usize);
        Ok(buf)
    }

    fn convert_to_voltage(&self, handle: DeviceHandle, raw: i32) -> GoIoResult<f64> {
        Ok(unsafe { ffi::GoIO_Sensor_ConvertToVoltage(Self::raw(handle), raw) })
    }

    fn calibrate_data(&self, handle: DeviceHandle, volts: f64) -> GoIoResult<f64> {
        Ok(unsafe { ffi::GoIO_Sensor_CalibrateData(Self::raw(handle), volts) })
    }

    fn sensor_number(&self, handle: DeviceHandle) -> GoIoResult<u8> {
        let mut id: u8 = 0;
        // Flags: do not re-query the hardware, no timeout needed.
        let status =
            unsafe { ffi::GoIO_Sensor_DDSMem_GetSensorNumber(Self::raw(handle), &mut id, 0, 0) };
        check("get sensor number", status)?;
        Ok(id)
    }

    fn sensor_long_name(&self, handle: DeviceHandle) -> GoIoResult<String> {
        let mut buf = vec![0u8; LONG_NAME_BUFFER_LEN];
        let status = unsafe {
            ffi::GoIO_Sensor_DDSMem_GetLongName(
                Self::raw(handle),
                buf.as_mut_ptr() as *mut c_char,
                buf.len() as u16,
            )
        };
        check("get sensor long name", status)?;
        Ok(string_from_buffer(&buf))
    }

    fn calibration_equation(&self, handle: DeviceHandle) -> GoIoResult<CalibrationEquation> {
        let mut tag: c_char = 0;
        let status =
            unsafe { ffi::GoIO_Sensor_DDSMem_GetCalibrationEquation(Self::raw(handle), &mut tag) };
        check("get calibration equation", status)?;
        Ok(CalibrationEquation::from_raw(tag as i8))
    }

    fn active_calibration_page(&self, handle: DeviceHandle) -> GoIoResult<u8> {
        let mut page: u8 = 0;
        let status =
            unsafe { ffi::GoIO_Sensor_DDSMem_GetActiveCalPage(Self::raw(handle), &mut page) };
        check("get active calibration page", status)?;
        Ok(page)
    }

    fn calibration_page(&self, handle: DeviceHandle, page: u8) -> GoIoResult<CalibrationPage> {
        let mut a: f32 = 0.0;
        let mut b: f32 = 0.0;
        let mut c: f32 = 0.0;
        let mut units = vec![0u8; UNITS_BUFFER_LEN];
        let status = unsafe {
            ffi::GoIO_Sensor_DDSMem_GetCalPage(
                Self::raw(handle),
                page,
                &mut a,
                &mut b,
                &mut c,
                units.as_mut_ptr() as *mut c_char,
                (UNITS_BUFFER_LEN - 1) as u16,
            )
        };
        check("get calibration page", status)?;
        Ok(CalibrationPage {
            a,
            b,
            c,
            units: string_from_buffer(&units),
        })
    }
}
