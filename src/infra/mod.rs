//! Infrastructure adapters and runtime bootstrap.

pub mod assets;
pub mod content_files;
pub mod error;
pub mod http;
pub mod mail;
pub mod telemetry;
