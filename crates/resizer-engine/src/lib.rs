//! resizer_engine - Host-independent value and reference types.

pub mod engine;
