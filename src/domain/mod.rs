//! Domain entities and the pure logic of the application wizard.

pub mod application;
pub mod document;
pub mod draft;
pub mod normalizer;
pub mod requirements;
pub mod section;
pub mod types;
