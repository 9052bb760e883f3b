//! Database models backing the domain entities.

pub mod application;
pub mod config;
pub mod document;
