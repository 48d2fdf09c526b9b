mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod histogram;
mod input;
mod models;
mod omdb;
mod shell;
mod site;
mod store;

use std::time::Duration;

use crate::{
    config::Config,
    input::Console,
    omdb::OmdbClient,
    shell::{Shell, SitePaths},
    store::MovieStore,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env first so a RUST_LOG set there reaches the filter.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,sqlx=warn".to_string()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .user_agent("moviedb/0.1")
        .timeout(Duration::from_secs(config.omdb_timeout_secs))
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let store = MovieStore::new(db);
    let omdb = OmdbClient::new(http, config.omdb_api_key.clone(), config.omdb_base_url.clone());
    let site =
        SitePaths { template: config.site_template.clone(), output: config.site_output.clone() };

    let console = Console::new(std::io::stdin().lock(), std::io::stdout());
    Shell::new(store, omdb, site, console).run().await?;

    Ok(())
}
