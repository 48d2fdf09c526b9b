use std::path::Path;

use maud::{Markup, html};

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

pub const GRID_PLACEHOLDER: &str = "__TEMPLATE_MOVIE_GRID__";

/// Renders the movie grid into the template at `template` and writes the page
/// to `output`, replacing whatever was there. Returns the number of movies.
pub async fn export_site(movies: &[Movie], template: &Path, output: &Path) -> AppResult<usize> {
    let template_str = tokio::fs::read_to_string(template)
        .await
        .map_err(|source| AppError::Template { path: template.to_path_buf(), source })?;

    let page = template_str.replace(GRID_PLACEHOLDER, &movie_grid(movies));
    tokio::fs::write(output, page)
        .await
        .map_err(|source| AppError::SiteOutput { path: output.to_path_buf(), source })?;

    tracing::info!(movies = movies.len(), output = %output.display(), "website generated");
    Ok(movies.len())
}

pub fn movie_grid(movies: &[Movie]) -> String {
    let mut out = String::new();
    for movie in movies {
        out.push_str(&movie_item(movie).into_string());
        out.push('\n');
    }
    out
}

fn movie_item(movie: &Movie) -> Markup {
    html! {
        li {
            div class="movie" {
                img class="movie-poster" src=(movie.image_link);
                div class="movie-title" { (movie.title) }
                div class="movie-year" { (movie.year) }
            }
        }
    }
}
