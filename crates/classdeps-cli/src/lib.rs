//! Library interface for the classdeps CLI components

pub mod manifest;
pub mod report;

pub use manifest::{Manifest, ModeArg, OutputConfig, Overrides};
pub use report::{Report, ReportFormat};
