use async_trait::async_trait;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BASE_URL: &str = "https://api.themoviedb.org/3";
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const POSTER_SIZE: &str = "w500";

/// Media kind as TMDB spells it in paths and in `media_type` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Movie => "MOVIE",
            Self::Tv => "TV",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a paged listing (trending/popular/discover/search/similar).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

impl CatalogItem {
    /// Kind as reported by the provider, falling back to the listing's kind.
    pub fn kind_or(&self, hint: MediaKind) -> MediaKind {
        self.media_type
            .as_deref()
            .and_then(MediaKind::parse)
            .unwrap_or(hint)
    }

    pub fn year(&self) -> Option<&str> {
        let date = self.release_date.as_deref()?;
        date.get(0..4)
    }
}

fn first_page() -> u32 {
    1
}

/// One page of results with the provider's paging envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<CatalogItem>,
    #[serde(default = "first_page")]
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeasonSummary {
    pub season_number: u32,
    #[serde(default)]
    pub episode_count: u32,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Episode {
    pub episode_number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub still_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonPayload {
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

/// Full detail payload for one title.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetailsPayload {
    pub id: u64,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub seasons: Vec<SeasonSummary>,
    #[serde(default)]
    pub credits: Credits,
}

impl DetailsPayload {
    /// First five cast names, comma separated, "N/A" when unknown.
    pub fn cast_line(&self) -> String {
        let names: Vec<&str> = self
            .credits
            .cast
            .iter()
            .take(5)
            .map(|c| c.name.as_str())
            .collect();
        if names.is_empty() {
            "N/A".to_string()
        } else {
            names.join(", ")
        }
    }

    /// Seasons the UI offers: specials (season 0) are skipped.
    pub fn playable_seasons(&self) -> Vec<SeasonSummary> {
        self.seasons
            .iter()
            .filter(|s| s.season_number > 0)
            .cloned()
            .collect()
    }
}

/// Absolute poster URL for a provider-relative path.
pub fn poster_url(relative: &str) -> String {
    format!("{IMAGE_BASE_URL}/{POSTER_SIZE}{relative}")
}

/// Strip the image-base + size prefix so only the relative path persists.
/// Paths without the prefix pass through unchanged.
pub fn strip_poster_prefix(path: &str) -> String {
    let prefix = format!("{IMAGE_BASE_URL}/{POSTER_SIZE}");
    path.strip_prefix(&prefix).unwrap_or(path).to_string()
}

/// Catalog/detail/search supplier. Calls yield `None` on any failure; the
/// view layer treats that as "no data" and never sees transport errors.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn trending(&self, kind: MediaKind, page: u32) -> Option<Page>;
    /// Trending across movies and TV, used for search suggestions.
    async fn trending_all(&self) -> Option<Page>;
    async fn popular(&self, kind: MediaKind, page: u32) -> Option<Page>;
    async fn top_rated(&self, kind: MediaKind, page: u32) -> Option<Page>;
    async fn discover_genre(&self, kind: MediaKind, genre_id: u64, page: u32) -> Option<Page>;
    async fn search(&self, query: &str) -> Option<Page>;
    async fn details(&self, kind: MediaKind, id: u64) -> Option<DetailsPayload>;
    async fn season(&self, tv_id: u64, season: u32) -> Option<SeasonPayload>;
    async fn genres(&self, kind: MediaKind) -> Option<Vec<Genre>>;
    async fn similar(&self, kind: MediaKind, id: u64) -> Option<Page>;
}

/// TMDB v3 client.
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            api_key,
        }
    }

    /// Generic parametrized fetch keyed by endpoint path and query params.
    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Option<T> {
        let url = format!("{}{}", self.base_url, path);
        let request = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params);
        match request.send().await.and_then(|r| r.error_for_status()) {
            Ok(response) => match response.json::<T>().await {
                Ok(payload) => Some(payload),
                Err(err) => {
                    warn!("tmdb: malformed payload from {path}: {err}");
                    None
                }
            },
            Err(err) => {
                warn!("tmdb: request to {path} failed: {err}");
                None
            }
        }
    }

    async fn get_page(&self, path: &str, params: &[(&str, String)]) -> Option<Page> {
        self.get::<Page>(path, params).await
    }
}

#[async_trait]
impl MetadataSource for TmdbClient {
    async fn trending(&self, kind: MediaKind, page: u32) -> Option<Page> {
        self.get_page(
            &format!("/trending/{kind}/week"),
            &[("page", page.to_string())],
        )
        .await
    }

    async fn trending_all(&self) -> Option<Page> {
        self.get_page("/trending/all/week", &[]).await
    }

    async fn popular(&self, kind: MediaKind, page: u32) -> Option<Page> {
        self.get_page(&format!("/{kind}/popular"), &[("page", page.to_string())])
            .await
    }

    async fn top_rated(&self, kind: MediaKind, page: u32) -> Option<Page> {
        self.get_page(&format!("/{kind}/top_rated"), &[("page", page.to_string())])
            .await
    }

    async fn discover_genre(&self, kind: MediaKind, genre_id: u64, page: u32) -> Option<Page> {
        self.get_page(
            &format!("/discover/{kind}"),
            &[
                ("with_genres", genre_id.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    async fn search(&self, query: &str) -> Option<Page> {
        self.get_page("/search/multi", &[("query", query.to_string())])
            .await
    }

    async fn details(&self, kind: MediaKind, id: u64) -> Option<DetailsPayload> {
        self.get(
            &format!("/{kind}/{id}"),
            &[("append_to_response", "credits".to_string())],
        )
        .await
    }

    async fn season(&self, tv_id: u64, season: u32) -> Option<SeasonPayload> {
        self.get(&format!("/tv/{tv_id}/season/{season}"), &[]).await
    }

    async fn genres(&self, kind: MediaKind) -> Option<Vec<Genre>> {
        self.get::<GenreList>(&format!("/genre/{kind}/list"), &[])
            .await
            .map(|list| list.genres)
    }

    async fn similar(&self, kind: MediaKind, id: u64) -> Option<Page> {
        self.get_page(&format!("/{kind}/{id}/similar"), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poster_prefix_round_trips() {
        let relative = "/abc123.jpg";
        let absolute = poster_url(relative);
        assert_eq!(absolute, "https://image.tmdb.org/t/p/w500/abc123.jpg");
        assert_eq!(strip_poster_prefix(&absolute), relative);
    }

    #[test]
    fn strip_leaves_bare_paths_alone() {
        assert_eq!(strip_poster_prefix("/abc123.jpg"), "/abc123.jpg");
    }

    #[test]
    fn catalog_item_accepts_tv_field_names() {
        let raw = r#"{
            "id": 1399,
            "name": "Game of Thrones",
            "media_type": "tv",
            "poster_path": "/p.jpg",
            "overview": "...",
            "first_air_date": "2011-04-17",
            "vote_average": 8.453
        }"#;
        let item: CatalogItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.title, "Game of Thrones");
        assert_eq!(item.release_date.as_deref(), Some("2011-04-17"));
        assert_eq!(item.kind_or(MediaKind::Movie), MediaKind::Tv);
        assert_eq!(item.year(), Some("2011"));
    }

    #[test]
    fn details_cast_line_takes_first_five() {
        let mut details: DetailsPayload = serde_json::from_str(r#"{"id": 550}"#).unwrap();
        assert_eq!(details.cast_line(), "N/A");
        details.credits.cast = (1..=7)
            .map(|n| CastMember {
                name: format!("Actor {n}"),
            })
            .collect();
        assert_eq!(
            details.cast_line(),
            "Actor 1, Actor 2, Actor 3, Actor 4, Actor 5"
        );
    }

    #[test]
    fn playable_seasons_skip_specials() {
        let raw = r#"{
            "id": 1399,
            "name": "Show",
            "seasons": [
                {"season_number": 0, "episode_count": 3, "name": "Specials"},
                {"season_number": 1, "episode_count": 10, "name": "Season 1"}
            ]
        }"#;
        let details: DetailsPayload = serde_json::from_str(raw).unwrap();
        let seasons = details.playable_seasons();
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].season_number, 1);
    }
}
