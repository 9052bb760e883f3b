//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    /// Directory uploaded documents are written into as `<id>_<name>`.
    pub uploads_dir: String,
    /// Cookie signing key for flash messages.
    pub secret: String,
}
