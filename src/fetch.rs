use crate::router::PageKey;
use crate::tmdb::{CatalogItem, DetailsPayload, Episode, Genre, MetadataSource, Page};

/// Results sent from spawned fetch tasks back to the UI thread. Every
/// variant carries the render generation it was spawned under; the app
/// discards anything whose generation is no longer current.
#[derive(Debug, Clone)]
pub enum FetchResponse {
    Hero {
        generation: u64,
        item: Option<CatalogItem>,
    },
    /// One category row landing in its pre-declared slot.
    Row {
        generation: u64,
        slot: usize,
        items: Option<Vec<CatalogItem>>,
    },
    GridPage {
        generation: u64,
        page: Option<Page>,
    },
    GenreLists {
        generation: u64,
        movie: Option<Vec<Genre>>,
        tv: Option<Vec<Genre>>,
    },
    SearchResults {
        generation: u64,
        query: String,
        page: Option<Page>,
    },
    Suggestions {
        generation: u64,
        page: Option<Page>,
    },
    Details {
        generation: u64,
        details: Option<DetailsPayload>,
        similar: Option<Page>,
    },
    Episodes {
        generation: u64,
        tv_id: u64,
        season: u32,
        episodes: Option<Vec<Episode>>,
    },
}

impl FetchResponse {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Hero { generation, .. }
            | Self::Row { generation, .. }
            | Self::GridPage { generation, .. }
            | Self::GenreLists { generation, .. }
            | Self::SearchResults { generation, .. }
            | Self::Suggestions { generation, .. }
            | Self::Details { generation, .. }
            | Self::Episodes { generation, .. } => *generation,
        }
    }
}

/// Resolve a `PageKey` to its paged fetch.
pub async fn fetch_page(source: &dyn MetadataSource, key: &PageKey, page: u32) -> Option<Page> {
    match key {
        PageKey::Trending(kind) => source.trending(*kind, page).await,
        PageKey::Popular(kind) => source.popular(*kind, page).await,
        PageKey::TopRated(kind) => source.top_rated(*kind, page).await,
        PageKey::Genre(kind, id) => source.discover_genre(*kind, *id, page).await,
    }
}
