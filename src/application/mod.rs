//! Application services: content loading, routing, filtering and the contact form.

pub mod blog;
pub mod catalog;
pub mod contact;
pub mod error;
pub mod filter;
pub mod pages;
pub mod render;
pub mod router;
pub mod session;
