use std::path::PathBuf;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub omdb_api_key: String,
    pub omdb_base_url: String,
    pub omdb_timeout_secs: u64,
    pub site_template: PathBuf,
    pub site_output: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = var("DATABASE_URL", "sqlite://movies.sqlite3?mode=rwc");
        let omdb_api_key = var("OMDB_API_KEY", "");
        let omdb_base_url = var("OMDB_BASE_URL", "http://www.omdbapi.com/");

        let omdb_timeout_secs: u64 =
            var("OMDB_TIMEOUT_SECS", "10").trim().parse().context("OMDB_TIMEOUT_SECS")?;

        let site_template = PathBuf::from(var("SITE_TEMPLATE", "static/index_template.html"));
        let site_output = PathBuf::from(var("SITE_OUTPUT", "static/index.html"));

        Ok(Self {
            database_url,
            omdb_api_key,
            omdb_base_url,
            omdb_timeout_secs,
            site_template,
            site_output,
        })
    }
}
