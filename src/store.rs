use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, sea_query::Expr,
};
use tracing::{info, warn};

use crate::{
    catalog,
    entities::movie,
    error::{AppError, AppResult},
    models::Movie,
};

/// Durable collection of movies keyed by title.
#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every stored movie, in insertion order.
    pub async fn list(&self) -> AppResult<Vec<Movie>> {
        let rows = movie::Entity::find()
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await
            .inspect_err(|err| warn!(error = %err, "failed to list movies"))?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    /// Inserts `movie` unless a title equal to it ignoring case is already stored.
    pub async fn add(&self, movie: &Movie) -> AppResult<()> {
        let existing = self.list().await?;
        if let Some(found) = catalog::find_title(&existing, &movie.title) {
            return Err(AppError::Duplicate(found.title.clone()));
        }

        let model = movie::ActiveModel {
            id: NotSet,
            title: Set(movie.title.clone()),
            year: Set(movie.year),
            rating: Set(movie.rating),
            image_link: Set(movie.image_link.clone()),
        };

        movie::Entity::insert(model).exec(&self.db).await.map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Duplicate(movie.title.clone())
            } else {
                warn!(title = %movie.title, error = %err, "failed to add movie");
                AppError::Db(err)
            }
        })?;

        info!(title = %movie.title, year = movie.year, rating = movie.rating, "movie added");
        Ok(())
    }

    /// Removes the movie stored under exactly `title`.
    pub async fn delete(&self, title: &str) -> AppResult<()> {
        let res = movie::Entity::delete_many()
            .filter(movie::Column::Title.eq(title))
            .exec(&self.db)
            .await
            .inspect_err(|err| warn!(title, error = %err, "failed to delete movie"))?;

        if res.rows_affected == 0 {
            return Err(AppError::NotFound(title.to_string()));
        }
        info!(title, "movie deleted");
        Ok(())
    }

    /// Overwrites the rating of the movie stored under exactly `title`.
    pub async fn update(&self, title: &str, rating: f64) -> AppResult<()> {
        let res = movie::Entity::update_many()
            .col_expr(movie::Column::Rating, Expr::value(rating))
            .filter(movie::Column::Title.eq(title))
            .exec(&self.db)
            .await
            .inspect_err(|err| warn!(title, error = %err, "failed to update movie"))?;

        if res.rows_affected == 0 {
            return Err(AppError::NotFound(title.to_string()));
        }
        info!(title, rating, "movie rating updated");
        Ok(())
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
