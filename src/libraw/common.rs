//! Common utilities module
//!
//! Error types, native status translation and C string marshaling shared by
//! the rest of the binding layer.

pub mod cstr;
pub mod error;
pub mod status;

pub use error::{DecodeError, Result};
pub use status::{NativeError, StatusKind, translate};
