//! Configuration utility types.
//!
//! | Module   | Purpose                                      |
//! |----------|----------------------------------------------|
//! | `error`  | Configuration error types                    |
//! | `handle` | Global settings handle (thread-safe)         |

mod error;
pub mod handle;

pub use error::{ClampWarning, ConfigError};
pub use handle::{init_settings, reload_settings, settings};
