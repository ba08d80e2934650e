//! Presentation layer: view models and templates.

pub mod pages;
pub mod views;
