//! Catalog data models.
//!
//! Defines catalog items as fetched from TMDB, their release dates and the
//! listing categories the bot can reconcile against.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Base URL for poster thumbnails shown in the channel.
pub const POSTER_DISPLAY_BASE: &str = "http://image.tmdb.org/t/p/w185";

/// Base URL for poster images handed to the library manager.
pub const POSTER_LIBRARY_BASE: &str = "https://image.tmdb.org/t/p/w200";

/// A movie as described by the catalog.
///
/// Immutable once fetched. Lives for one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub title: String,
    /// Raw release date as returned by the catalog (`YYYY-MM-DD`, sometimes `YYYY-MM`).
    pub release_date: Option<String>,
    pub overview: String,
    pub poster_path: Option<String>,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: u64,
}

impl CatalogItem {
    /// Parse the release date, reporting the raw value when it can't be read.
    pub fn parsed_release_date(&self) -> Result<ReleaseDate, BridgeError> {
        let raw = self.release_date.as_deref().unwrap_or_default();
        ReleaseDate::parse(raw).ok_or_else(|| BridgeError::UnparsableReleaseDate {
            tmdb_id: self.id,
            raw: raw.to_string(),
        })
    }

    /// Release year, or 0 when the catalog doesn't know it yet.
    pub fn release_year(&self) -> i32 {
        self.parsed_release_date().map(|d| d.year).unwrap_or(0)
    }

    /// Release date as shown to users.
    pub fn release_label(&self) -> &str {
        match self.release_date.as_deref() {
            Some(date) if !date.is_empty() => date,
            _ => "unknown",
        }
    }

    pub fn poster_display_url(&self) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|path| format!("{}{}", POSTER_DISPLAY_BASE, path))
    }

    pub fn poster_library_url(&self) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|path| format!("{}{}", POSTER_LIBRARY_BASE, path))
    }
}

/// Release date with precision down to the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseDate {
    pub year: i32,
    pub month: u32,
    pub day: Option<u32>,
}

impl ReleaseDate {
    /// Accepts `YYYY-MM-DD` and `YYYY-MM`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(Self {
                year: date.year(),
                month: date.month(),
                day: Some(date.day()),
            });
        }

        let (year, month) = raw.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self {
            year,
            month,
            day: None,
        })
    }

    /// True when this date falls in the same calendar month as `today`.
    pub fn same_month_as(&self, today: NaiveDate) -> bool {
        self.year == today.year() && self.month == today.month()
    }
}

/// Catalog listings that can feed a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieCategory {
    Upcoming,
    Popular,
    NowPlaying,
    TopRated,
}

impl MovieCategory {
    /// Path segment of the catalog listing endpoint.
    pub fn as_path(&self) -> &'static str {
        match self {
            MovieCategory::Upcoming => "upcoming",
            MovieCategory::Popular => "popular",
            MovieCategory::NowPlaying => "now_playing",
            MovieCategory::TopRated => "top_rated",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Some(MovieCategory::Upcoming),
            "popular" => Some(MovieCategory::Popular),
            "now_playing" | "nowplaying" => Some(MovieCategory::NowPlaying),
            "top_rated" | "toprated" => Some(MovieCategory::TopRated),
            _ => None,
        }
    }
}

impl std::fmt::Display for MovieCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovieCategory::Upcoming => write!(f, "upcoming"),
            MovieCategory::Popular => write!(f, "popular"),
            MovieCategory::NowPlaying => write!(f, "now playing"),
            MovieCategory::TopRated => write!(f, "top rated"),
        }
    }
}

// =============================================================================
// TMDB API Response Types
// =============================================================================

/// One page of a TMDB movie listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMoviePage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// Movie as returned by TMDB listing and detail endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
}

impl From<TmdbMovie> for CatalogItem {
    fn from(movie: TmdbMovie) -> Self {
        CatalogItem {
            id: movie.id,
            title: movie.title,
            release_date: movie.release_date.filter(|d| !d.is_empty()),
            overview: movie.overview.unwrap_or_default(),
            poster_path: movie.poster_path,
            popularity: movie.popularity,
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
        }
    }
}
