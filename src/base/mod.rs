//! Base types and error handling.
//!
//! Provides foundational types mirroring Chromium's `net/base/`:
//! - [`NetError`]: Network error codes matching `net_error_list.h`
//! - [`IoResultExt`]: Context helpers turning `io::Error` into DNS and
//!   connection errors

pub mod context;
pub mod neterror;

pub use context::IoResultExt;
pub use neterror::NetError;
