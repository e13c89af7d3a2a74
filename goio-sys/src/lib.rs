//! Raw FFI bindings for the Vernier GoIO sensor interface SDK (`libGoIO_DLL`).
//!
//! Bindings are generated by `build.rs` with bindgen when the `goio-sdk`
//! feature is enabled; without it this crate compiles to an empty surface so
//! the workspace builds on machines without the vendor SDK installed.
//!
//! Everything here is `unsafe` and untyped beyond the C signatures. Safe
//! marshalling lives in the `goio` crate's native driver, which is the only
//! intended consumer.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(missing_docs)]

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
