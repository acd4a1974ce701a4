//! resizer - An in-memory workbook host for the array result resizer.
//!
//! The coordinator itself lives in `resizer-core`; this crate supplies a
//! host to run it against, the built-in worksheet functions, and settings.

pub mod error;
pub mod functions;
pub mod settings;
pub mod workbook;

pub use error::{Result, WorkbookError};
pub use functions::FunctionRegistry;
pub use settings::{Settings, load_settings};
pub use workbook::{MemoryHost, Session};
