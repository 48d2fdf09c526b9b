use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

pub struct OmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OmdbClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        if api_key.trim().is_empty() {
            warn!("no OMDB_API_KEY provided, adding movies will not work");
        }
        Self { client, api_key, base_url }
    }

    /// Resolves a free-text name to one movie, or `None` if the lookup failed
    /// for any reason. The reason is logged.
    pub async fn get_movie_info(&self, name: &str) -> Option<Movie> {
        match self.lookup(name).await {
            Ok(movie) => Some(movie),
            Err(err) => {
                warn!(name, error = %err, "movie lookup failed");
                None
            },
        }
    }

    pub async fn lookup(&self, name: &str) -> AppResult<Movie> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::lookup(name, "no API key configured"));
        }

        debug!(name, "querying OMDb");

        let body = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str()), ("t", name)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let resp: OmdbResponse =
            serde_json::from_str(&body).map_err(|err| AppError::lookup(name, err))?;

        if !resp.response.eq_ignore_ascii_case("true") {
            let reason = resp.error.unwrap_or_else(|| "movie not found".to_string());
            return Err(AppError::lookup(name, reason));
        }

        let title = resp.title.filter(|t| !t.trim().is_empty());
        let Some(title) = title else {
            return Err(AppError::lookup(name, "response has no title"));
        };

        let year_text = resp.year.unwrap_or_default();
        let year = parse_year(&year_text)
            .ok_or_else(|| AppError::lookup(name, format!("unusable year {year_text:?}")))?;

        let rating_text = resp.imdb_rating.unwrap_or_default();
        let rating = parse_rating(&rating_text)
            .ok_or_else(|| AppError::lookup(name, format!("unusable rating {rating_text:?}")))?;

        Ok(Movie::new(title, year, rating, resp.poster.unwrap_or_default()))
    }
}

/// Leading four digits, so series ranges like `2008–2013` yield 2008.
fn parse_year(text: &str) -> Option<i32> {
    let digits: String = text.trim().chars().take_while(char::is_ascii_digit).collect();
    if digits.len() < 4 {
        return None;
    }
    digits[..4].parse().ok()
}

fn parse_rating(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|r| r.is_finite())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbResponse {
    response: String,
    title: Option<String>,
    year: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    poster: Option<String>,
    error: Option<String>,
}
