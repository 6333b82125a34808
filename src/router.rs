use crate::tmdb::MediaKind;

/// Compact token identifying one paged catalog query, carried by `view-all`
/// navigation entries. Encodes as `movie:popular`, `tv:genre:18`, etc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKey {
    Trending(MediaKind),
    Popular(MediaKind),
    TopRated(MediaKind),
    Genre(MediaKind, u64),
}

impl PageKey {
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Trending(kind)
            | Self::Popular(kind)
            | Self::TopRated(kind)
            | Self::Genre(kind, _) => *kind,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Trending(kind) => format!("{kind}:trending"),
            Self::Popular(kind) => format!("{kind}:popular"),
            Self::TopRated(kind) => format!("{kind}:top_rated"),
            Self::Genre(kind, id) => format!("{kind}:genre:{id}"),
        }
    }

    /// Inverse of `encode`. Unknown tokens yield `None`; the view-all render
    /// turns that into a terminal "unknown category" state.
    pub fn decode(token: &str) -> Option<Self> {
        let mut parts = token.split(':');
        let kind = MediaKind::parse(parts.next()?)?;
        let key = match parts.next()? {
            "trending" => Self::Trending(kind),
            "popular" => Self::Popular(kind),
            "top_rated" => Self::TopRated(kind),
            "genre" => Self::Genre(kind, parts.next()?.parse().ok()?),
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(key)
    }
}

/// One navigable location: a view name plus its fixed positional arguments.
/// Equality is deep equality over the arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Home,
    Movies,
    Tv,
    MyList,
    Genres,
    ViewAll { key: String, title: String },
    Search { query: String },
    Details { kind: MediaKind, id: u64 },
    Player { kind: MediaKind, id: u64, season: u32, episode: u32 },
}

impl Location {
    /// Index into the primary nav tabs, if this view has one.
    pub fn nav_tab(&self) -> Option<usize> {
        match self {
            Self::Home => Some(0),
            Self::Movies => Some(1),
            Self::Tv => Some(2),
            Self::MyList => Some(3),
            Self::Genres => Some(4),
            Self::Search { .. } => Some(5),
            _ => None,
        }
    }

    /// The player hides primary navigation for immersive playback.
    pub fn hides_nav(&self) -> bool {
        matches!(self, Self::Player { .. })
    }
}

/// History-backed navigation stack. Mirrors the browser model: pushing from
/// the middle of the stack discards the forward entries.
#[derive(Debug)]
pub struct History {
    entries: Vec<Location>,
    index: usize,
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &Location {
        &self.entries[self.index]
    }

    /// Push a new entry. Returns false (and leaves the stack untouched) when
    /// the target equals the current entry, so re-clicking the active view
    /// never duplicates history.
    pub fn push(&mut self, location: Location) -> bool {
        if *self.current() == location {
            return false;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index += 1;
        true
    }

    /// Replace the current entry in place. Used when refining the same view,
    /// e.g. search query edits, so back-navigation restores the refined args.
    pub fn replace(&mut self, location: Location) {
        self.entries[self.index] = location;
    }

    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn can_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_key_round_trips() {
        let keys = [
            PageKey::Trending(MediaKind::Movie),
            PageKey::Popular(MediaKind::Tv),
            PageKey::TopRated(MediaKind::Movie),
            PageKey::Genre(MediaKind::Tv, 10765),
        ];
        for key in keys {
            assert_eq!(PageKey::decode(&key.encode()), Some(key));
        }
    }

    #[test]
    fn page_key_rejects_unknown_tokens() {
        for token in ["", "movie", "movie:newest", "book:popular", "tv:genre:x", "movie:popular:1"] {
            assert_eq!(PageKey::decode(token), None, "token {token:?}");
        }
    }

    #[test]
    fn duplicate_push_is_a_no_op() {
        let mut history = History::new(Location::Home);
        assert!(history.push(Location::Details {
            kind: MediaKind::Movie,
            id: 550,
        }));
        assert!(!history.push(Location::Details {
            kind: MediaKind::Movie,
            id: 550,
        }));
        assert!(history.can_back());
        history.back();
        assert_eq!(*history.current(), Location::Home);
        assert!(!history.back());
    }

    #[test]
    fn back_replays_views_with_original_arguments() {
        let mut history = History::new(Location::Home);
        history.push(Location::Details {
            kind: MediaKind::Movie,
            id: 550,
        });
        history.push(Location::Player {
            kind: MediaKind::Movie,
            id: 550,
            season: 1,
            episode: 1,
        });

        assert!(history.back());
        assert_eq!(
            *history.current(),
            Location::Details {
                kind: MediaKind::Movie,
                id: 550,
            }
        );
        assert!(history.back());
        assert_eq!(*history.current(), Location::Home);
        assert!(history.forward());
        assert_eq!(
            *history.current(),
            Location::Details {
                kind: MediaKind::Movie,
                id: 550,
            }
        );
    }

    #[test]
    fn push_discards_forward_entries() {
        let mut history = History::new(Location::Home);
        history.push(Location::Movies);
        history.push(Location::Tv);
        history.back();
        history.back();
        assert!(history.push(Location::Genres));
        assert!(!history.can_forward());
        history.back();
        assert_eq!(*history.current(), Location::Home);
    }

    #[test]
    fn replace_keeps_stack_depth() {
        let mut history = History::new(Location::Home);
        history.push(Location::Search {
            query: String::new(),
        });
        history.replace(Location::Search {
            query: "batman".into(),
        });
        assert_eq!(
            *history.current(),
            Location::Search {
                query: "batman".into(),
            }
        );
        history.back();
        assert_eq!(*history.current(), Location::Home);
    }

    #[test]
    fn only_player_hides_nav() {
        assert!(Location::Player {
            kind: MediaKind::Tv,
            id: 1,
            season: 1,
            episode: 1,
        }
        .hides_nav());
        assert!(!Location::Home.hides_nav());
        assert!(!Location::Genres.hides_nav());
    }
}
