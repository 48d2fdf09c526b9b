//! Read-only operations over a snapshot of the collection.
//!
//! Callers pass a freshly listed snapshot; nothing here touches storage.

use rand::{Rng, seq::IndexedRandom};
use strsim::normalized_levenshtein;

use crate::models::{Bin, FilterBounds, Movie, SearchOutcome, Stats};

/// Minimum similarity (0.0-1.0) for a failed search to offer a suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.6;

/// Looks up a movie by title ignoring case, returning the stored spelling.
pub fn find_title<'a>(movies: &'a [Movie], title: &str) -> Option<&'a Movie> {
    let wanted = title.to_lowercase();
    movies.iter().find(|m| m.title.to_lowercase() == wanted)
}

/// Average, median, best and worst rating.
///
/// Ties for best or worst go to the movie that comes first in `movies`.
pub fn stats(movies: &[Movie]) -> Option<Stats<'_>> {
    let first = movies.first()?;

    let mut ratings: Vec<f64> = movies.iter().map(|m| m.rating).collect();
    ratings.sort_by(f64::total_cmp);

    let len = ratings.len();
    let average = ratings.iter().sum::<f64>() / len as f64;
    let median = if len % 2 == 1 {
        ratings[len / 2]
    } else {
        (ratings[len / 2 - 1] + ratings[len / 2]) / 2.0
    };

    let (mut best, mut worst) = (first, first);
    for movie in &movies[1..] {
        if movie.rating > best.rating {
            best = movie;
        }
        if movie.rating < worst.rating {
            worst = movie;
        }
    }

    Some(Stats { average, median, best, worst })
}

pub fn random_pick<'a, R: Rng + ?Sized>(movies: &'a [Movie], rng: &mut R) -> Option<&'a Movie> {
    movies.choose(rng)
}

/// Case-insensitive substring search. With no match, falls back to the single
/// most similar title if it clears [`SUGGESTION_THRESHOLD`].
pub fn search<'a>(movies: &'a [Movie], term: &str) -> SearchOutcome<'a> {
    let needle = term.to_lowercase();
    let matches: Vec<&Movie> =
        movies.iter().filter(|m| m.title.to_lowercase().contains(&needle)).collect();

    if !matches.is_empty() {
        return SearchOutcome::Matches(matches);
    }

    let mut best: Option<(&Movie, f64)> = None;
    for movie in movies {
        let score = normalized_levenshtein(&needle, &movie.title.to_lowercase());
        if score >= SUGGESTION_THRESHOLD && best.is_none_or(|(_, top)| score > top) {
            best = Some((movie, score));
        }
    }
    SearchOutcome::Suggestion(best.map(|(movie, _)| movie))
}

/// Highest rating first; equal ratings keep their relative order.
pub fn sorted_by_rating(movies: &[Movie]) -> Vec<&Movie> {
    let mut out: Vec<&Movie> = movies.iter().collect();
    out.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    out
}

/// Chronological order, newest first when `newest_first`; equal years keep
/// their relative order either way.
pub fn sorted_by_year(movies: &[Movie], newest_first: bool) -> Vec<&Movie> {
    let mut out: Vec<&Movie> = movies.iter().collect();
    if newest_first {
        out.sort_by(|a, b| b.year.cmp(&a.year));
    } else {
        out.sort_by_key(|m| m.year);
    }
    out
}

pub fn filter<'a>(movies: &'a [Movie], bounds: &FilterBounds) -> Vec<&'a Movie> {
    movies
        .iter()
        .filter(|m| {
            m.rating >= bounds.min_rating
                && m.year >= bounds.start_year
                && m.year <= bounds.end_year
        })
        .collect()
}

/// Splits the rating range into `bins` equal-width buckets.
///
/// The top rating lands in the last bucket. A collection whose ratings are all
/// equal is centred in a range one point wide.
pub fn rating_bins(movies: &[Movie], bins: usize) -> Vec<Bin> {
    if movies.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = movies.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), m| {
        (lo.min(m.rating), hi.max(m.rating))
    });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin { start: lo + width * i as f64, end: lo + width * (i + 1) as f64, count: 0 })
        .collect();
    // Pin the outer edge so float drift cannot push the maximum out of range.
    if let Some(last) = out.last_mut() {
        last.end = hi;
    }

    for movie in movies {
        let idx = (((movie.rating - lo) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}
