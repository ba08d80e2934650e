//! Folio: a content-driven portfolio site.
//!
//! Content is loaded once into an immutable catalog, every visitor interaction
//! is a [`domain::navigation::NavAction`] applied by the page router, and the
//! resulting render description is turned into HTML by the presentation layer.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
