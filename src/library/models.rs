//! Data models for the library manager.
//!
//! Defines acquisition requests (the body posted to Radarr when a movie is
//! added) and the minimal view of library movies used for reconciliation.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;

/// Library-side settings applied to every acquisition request.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionDefaults {
    pub quality_profile_id: u32,
    pub root_folder_path: String,
    pub monitored: bool,
    pub search_on_add: bool,
}

impl Default for AcquisitionDefaults {
    fn default() -> Self {
        Self {
            quality_profile_id: 1,
            root_folder_path: "/movies/".to_string(),
            monitored: true,
            search_on_add: true,
        }
    }
}

/// Request to add one movie to the library.
///
/// Serialized in the library manager's camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionRequest {
    pub title: String,
    pub title_slug: String,
    pub tmdb_id: i64,
    /// 0 when the catalog doesn't know the release year yet.
    pub year: i32,
    pub quality_profile_id: u32,
    pub root_folder_path: String,
    pub monitored: bool,
    pub images: Vec<LibraryImage>,
    pub add_options: AddOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryImage {
    pub cover_type: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOptions {
    pub search_for_movie: bool,
}

impl AcquisitionRequest {
    /// Derive the request for a catalog item.
    pub fn from_item(item: &CatalogItem, defaults: &AcquisitionDefaults) -> Self {
        let images = item
            .poster_library_url()
            .map(|url| LibraryImage {
                cover_type: "poster".to_string(),
                url,
            })
            .into_iter()
            .collect();

        Self {
            title: item.title.clone(),
            title_slug: title_slug(&item.title, item.id),
            tmdb_id: item.id,
            year: item.release_year(),
            quality_profile_id: defaults.quality_profile_id,
            root_folder_path: defaults.root_folder_path.clone(),
            monitored: defaults.monitored,
            images,
            add_options: AddOptions {
                search_for_movie: defaults.search_on_add,
            },
        }
    }
}

/// Slug used by the library manager: lowercase title, spaces as dashes, id suffix.
pub fn title_slug(title: &str, tmdb_id: i64) -> String {
    format!("{}-{}", title.to_lowercase().replace(' ', "-"), tmdb_id)
}

/// Outcome of a submitted acquisition request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcquisitionResult {
    pub accepted: bool,
    pub detail: String,
}

/// Movie as listed by the library manager. Only the catalog id matters here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryMovie {
    pub tmdb_id: i64,
}

/// Validation failure returned by the library manager on a rejected add.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryValidationError {
    #[serde(default)]
    pub property_name: Option<String>,
    pub error_message: String,
}
