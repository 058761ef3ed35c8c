//! Export core modules shared across the CLI and future front-ends.

#[cfg(feature = "excel")]
pub mod excel_core;
