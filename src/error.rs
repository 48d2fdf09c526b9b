use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Movie {0} is already in the database.")]
    Duplicate(String),

    #[error("Movie {0} doesn't exist.")]
    NotFound(String),

    #[error("Movie lookup for \"{title}\" failed: {reason}")]
    Lookup { title: String, reason: String },

    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not read site template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write website {}: {source}", path.display())]
    SiteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("input closed")]
    InputClosed,
}

impl AppError {
    pub fn lookup(title: &str, reason: impl std::fmt::Display) -> Self {
        Self::Lookup { title: title.to_string(), reason: reason.to_string() }
    }
}

pub type AppResult<T> = Result<T, AppError>;
