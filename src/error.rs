//! Custom error types for the GoIO wrapper.
//!
//! This module defines the primary error type, `GoIoError`, for the whole
//! crate. Using the `thiserror` crate, it gives every failure mode of the
//! native driver boundary a structured, programmatically inspectable value
//! instead of the status-code soup the C API returns.
//!
//! ## Error taxonomy
//!
//! - **`DriverUnavailable`**: the vendor library could not be loaded or
//!   initialized. Fatal; nothing else can be done in the process.
//! - **`DeviceUnavailable`**: open returned a null handle, usually because
//!   the device was disconnected between enumeration and open. Callers skip
//!   the device and move on.
//! - **`Timeout`**: a configure or command call did not get an
//!   acknowledgement within its bound. Aborts the session.
//! - **`CommandFailed`**: any other negative status from a native call.
//! - **`InvalidDeviceName`**: a device name that cannot cross the C boundary
//!   (interior NUL).
//!
//! A short read from the measurement buffer is deliberately NOT an error:
//! `read_raw_measurements` just returns fewer samples than the capacity.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type GoIoResult<T> = std::result::Result<T, GoIoError>;

/// Errors surfaced by the GoIO driver boundary.
#[derive(Error, Debug)]
pub enum GoIoError {
    /// The vendor library failed to load or initialize.
    #[error("GoIO driver unavailable: {0}")]
    DriverUnavailable(String),

    /// Open returned a null handle for the named device.
    #[error("device '{name}' unavailable (disconnected since enumeration?)")]
    DeviceUnavailable {
        /// Device name as returned by enumeration.
        name: String,
    },

    /// A configure or command call exceeded its acknowledgement bound.
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout {
        /// Native call that timed out.
        operation: &'static str,
        /// The bound that was exceeded.
        timeout_ms: u32,
    },

    /// A native call returned a negative status.
    #[error("{operation} failed with status {status}")]
    CommandFailed {
        /// Native call that failed.
        operation: &'static str,
        /// Raw status code from the vendor library.
        status: i32,
    },

    /// A device name that cannot be marshalled to the C boundary.
    #[error("invalid device name: {0}")]
    InvalidDeviceName(String),

    /// Configuration file or environment override error.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GoIoError::Timeout {
            operation: "set measurement period",
            timeout_ms: 2000,
        };
        assert_eq!(
            err.to_string(),
            "set measurement period timed out after 2000 ms"
        );
    }

    #[test]
    fn test_device_unavailable_names_device() {
        let err = GoIoError::DeviceUnavailable {
            name: "0xfa140000".into(),
        };
        assert!(err.to_string().contains("0xfa140000"));
    }
}
