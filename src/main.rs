use dbrg_membership::models::config::ServerConfig;
use dbrg_membership::run;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let settings = config::Config::builder()
        .set_default("address", "127.0.0.1")
        .map_err(std::io::Error::other)?
        .set_default("port", 8080)
        .map_err(std::io::Error::other)?
        .set_default("database_url", "membership.db")
        .map_err(std::io::Error::other)?
        .set_default("templates_dir", "templates/**/*.html")
        .map_err(std::io::Error::other)?
        .set_default("uploads_dir", "uploads")
        .map_err(std::io::Error::other)?
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::Environment::default())
        .build()
        .map_err(|e| std::io::Error::other(format!("Failed to load configuration: {e}")))?;

    let server_config: ServerConfig = settings
        .try_deserialize()
        .map_err(|e| std::io::Error::other(format!("Failed to parse configuration: {e}")))?;

    run(server_config).await
}
