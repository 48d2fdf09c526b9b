use crate::entities::movie;

#[derive(Clone, Debug, PartialEq)]
pub struct Movie {
    pub title: String,
    pub year: i32,
    pub rating: f64,
    pub image_link: String,
}

impl Movie {
    pub fn new(
        title: impl Into<String>,
        year: i32,
        rating: f64,
        image_link: impl Into<String>,
    ) -> Self {
        Self { title: title.into(), year, rating, image_link: image_link.into() }
    }
}

impl From<movie::Model> for Movie {
    fn from(row: movie::Model) -> Self {
        Self { title: row.title, year: row.year, rating: row.rating, image_link: row.image_link }
    }
}

/// Inclusive bounds for the filter action. Unset bounds place no constraint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterBounds {
    pub min_rating: f64,
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for FilterBounds {
    fn default() -> Self {
        Self { min_rating: 0.0, start_year: 0, end_year: 9999 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stats<'a> {
    pub average: f64,
    pub median: f64,
    pub best: &'a Movie,
    pub worst: &'a Movie,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome<'a> {
    Matches(Vec<&'a Movie>),
    Suggestion(Option<&'a Movie>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}
