use crate::tmdb::{CatalogItem, MediaKind};
use crate::watchlist::WatchlistItem;
use std::time::{Duration, Instant};

/// Dwell time on a tile before the preview appears.
pub const SHOW_DELAY: Duration = Duration::from_millis(700);
/// Grace period after leaving a tile before the preview hides.
pub const HIDE_DELAY: Duration = Duration::from_millis(500);

/// Everything the preview shows. Snapshotted from the tile itself when the
/// popup is armed; no fetch is involved.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub kind: MediaKind,
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub poster_path: String,
}

impl PopupContent {
    pub fn from_catalog(item: &CatalogItem, kind_hint: MediaKind) -> Self {
        Self {
            kind: item.kind_or(kind_hint),
            id: item.id,
            title: item.title.clone(),
            overview: item.overview.clone(),
            poster_path: item.poster_path.clone().unwrap_or_default(),
        }
    }

    pub fn from_watchlist(item: &WatchlistItem) -> Self {
        Self {
            kind: item.kind,
            id: item.id,
            title: item.title.clone(),
            overview: item.overview.clone(),
            poster_path: item.poster_path.clone(),
        }
    }
}

/// The tile a popup is anchored to: its row and tile indices within the
/// active view, plus the snapshotted content.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupAnchor {
    pub row: usize,
    pub tile: usize,
    pub content: PopupContent,
}

#[derive(Debug)]
enum PopupState {
    Hidden,
    /// Dwelling on a tile, show timer running.
    Arming { anchor: PopupAnchor, show_at: Instant },
    Visible { anchor: PopupAnchor },
    /// Left the tile; still shown until the hide deadline so moving between
    /// tile and popup does not flicker. `next` holds a freshly-dwelt tile
    /// waiting its own show timer.
    Fading {
        anchor: PopupAnchor,
        hide_at: Instant,
        next: Option<(PopupAnchor, Instant)>,
    },
}

/// Dwell-driven preview overlay. Constructed once per app, force-hidden on
/// every navigation and scroll so no popup outlives its anchor tile.
#[derive(Debug)]
pub struct PopupController {
    state: PopupState,
}

impl Default for PopupController {
    fn default() -> Self {
        Self::new()
    }
}

impl PopupController {
    pub fn new() -> Self {
        Self {
            state: PopupState::Hidden,
        }
    }

    /// The selection now rests on `anchor`. `suppressed` marks tiles at a
    /// clipped row edge where the preview would render off-grid.
    pub fn dwell(&mut self, anchor: PopupAnchor, suppressed: bool, now: Instant) {
        if suppressed {
            self.leave(now);
            return;
        }
        self.state = match std::mem::replace(&mut self.state, PopupState::Hidden) {
            PopupState::Hidden => PopupState::Arming {
                anchor,
                show_at: now + SHOW_DELAY,
            },
            PopupState::Arming {
                anchor: previous,
                show_at,
            } => {
                if previous == anchor {
                    PopupState::Arming {
                        anchor: previous,
                        show_at,
                    }
                } else {
                    PopupState::Arming {
                        anchor,
                        show_at: now + SHOW_DELAY,
                    }
                }
            }
            PopupState::Visible { anchor: shown } => {
                if shown == anchor {
                    PopupState::Visible { anchor: shown }
                } else {
                    PopupState::Fading {
                        anchor: shown,
                        hide_at: now + HIDE_DELAY,
                        next: Some((anchor, now + SHOW_DELAY)),
                    }
                }
            }
            PopupState::Fading {
                anchor: shown,
                hide_at,
                ..
            } => {
                if shown == anchor {
                    // Back onto the anchor: cancel the pending hide.
                    PopupState::Visible { anchor: shown }
                } else {
                    PopupState::Fading {
                        anchor: shown,
                        hide_at,
                        next: Some((anchor, now + SHOW_DELAY)),
                    }
                }
            }
        };
    }

    /// The selection left its tile without landing on another.
    pub fn leave(&mut self, now: Instant) {
        self.state = match std::mem::replace(&mut self.state, PopupState::Hidden) {
            PopupState::Arming { .. } | PopupState::Hidden => PopupState::Hidden,
            PopupState::Visible { anchor } => PopupState::Fading {
                anchor,
                hide_at: now + HIDE_DELAY,
                next: None,
            },
            PopupState::Fading {
                anchor, hide_at, ..
            } => PopupState::Fading {
                anchor,
                hide_at,
                next: None,
            },
        };
    }

    /// Scroll or navigation: drop everything immediately, timers included.
    pub fn force_hide(&mut self) {
        self.state = PopupState::Hidden;
    }

    /// Advance timers. Called once per event-loop turn.
    pub fn tick(&mut self, now: Instant) {
        self.state = match std::mem::replace(&mut self.state, PopupState::Hidden) {
            PopupState::Arming { anchor, show_at } => {
                if now >= show_at {
                    PopupState::Visible { anchor }
                } else {
                    PopupState::Arming { anchor, show_at }
                }
            }
            PopupState::Fading {
                anchor,
                hide_at,
                next,
            } => {
                if now >= hide_at {
                    match next {
                        Some((anchor, show_at)) => PopupState::Arming { anchor, show_at },
                        None => PopupState::Hidden,
                    }
                } else {
                    PopupState::Fading {
                        anchor,
                        hide_at,
                        next,
                    }
                }
            }
            other => other,
        };
    }

    /// The anchor currently on screen (visible or in its hide grace period).
    pub fn visible(&self) -> Option<&PopupAnchor> {
        match &self.state {
            PopupState::Visible { anchor } | PopupState::Fading { anchor, .. } => Some(anchor),
            _ => None,
        }
    }
}

/// A tile at the clipped edge of a scrolled row suppresses the preview, but
/// the absolute start and end of the track do not (nothing is clipped there).
pub fn edge_suppressed(tile: usize, scroll: usize, visible: usize, total: usize) -> bool {
    if visible == 0 || total <= visible {
        return false;
    }
    let at_left_edge = tile == scroll;
    let at_right_edge = tile + 1 == scroll + visible;
    (at_left_edge && tile != 0) || (at_right_edge && tile + 1 != total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(row: usize, tile: usize) -> PopupAnchor {
        PopupAnchor {
            row,
            tile,
            content: PopupContent {
                kind: MediaKind::Movie,
                id: (row * 100 + tile) as u64,
                title: format!("r{row}t{tile}"),
                overview: String::new(),
                poster_path: "/p.jpg".into(),
            },
        }
    }

    #[test]
    fn short_dwell_never_shows() {
        let mut popup = PopupController::new();
        let start = Instant::now();
        popup.dwell(anchor(0, 0), false, start);
        popup.tick(start + Duration::from_millis(400));
        assert!(popup.visible().is_none());
        popup.leave(start + Duration::from_millis(500));
        popup.tick(start + Duration::from_secs(5));
        assert!(popup.visible().is_none());
    }

    #[test]
    fn full_dwell_shows_then_hides_after_grace() {
        let mut popup = PopupController::new();
        let start = Instant::now();
        popup.dwell(anchor(0, 0), false, start);
        popup.tick(start + SHOW_DELAY);
        assert!(popup.visible().is_some());

        let left = start + Duration::from_secs(1);
        popup.leave(left);
        // Still visible inside the grace period.
        popup.tick(left + Duration::from_millis(300));
        assert!(popup.visible().is_some());
        popup.tick(left + HIDE_DELAY);
        assert!(popup.visible().is_none());
    }

    #[test]
    fn returning_during_grace_cancels_hide() {
        let mut popup = PopupController::new();
        let start = Instant::now();
        popup.dwell(anchor(0, 0), false, start);
        popup.tick(start + SHOW_DELAY);
        popup.leave(start + Duration::from_secs(1));
        popup.dwell(anchor(0, 0), false, start + Duration::from_millis(1200));
        popup.tick(start + Duration::from_secs(10));
        assert_eq!(popup.visible().map(|a| a.tile), Some(0));
    }

    #[test]
    fn moving_tiles_swaps_after_both_timers() {
        let mut popup = PopupController::new();
        let start = Instant::now();
        popup.dwell(anchor(0, 0), false, start);
        popup.tick(start + SHOW_DELAY);

        let moved = start + Duration::from_secs(1);
        popup.dwell(anchor(0, 1), false, moved);
        // Old anchor lingers through its grace period.
        assert_eq!(popup.visible().map(|a| a.tile), Some(0));
        popup.tick(moved + HIDE_DELAY);
        assert!(popup.visible().is_none());
        popup.tick(moved + SHOW_DELAY);
        assert_eq!(popup.visible().map(|a| a.tile), Some(1));
    }

    #[test]
    fn scroll_force_hides_immediately() {
        let mut popup = PopupController::new();
        let start = Instant::now();
        popup.dwell(anchor(0, 0), false, start);
        popup.tick(start + SHOW_DELAY);
        assert!(popup.visible().is_some());
        popup.force_hide();
        assert!(popup.visible().is_none());
    }

    #[test]
    fn suppressed_tiles_never_arm() {
        let mut popup = PopupController::new();
        let start = Instant::now();
        popup.dwell(anchor(0, 3), true, start);
        popup.tick(start + Duration::from_secs(2));
        assert!(popup.visible().is_none());
    }

    #[test]
    fn edge_rule_spares_track_start_and_end() {
        // Scrolled row: 30 tiles, 10 visible, offset 5.
        assert!(edge_suppressed(5, 5, 10, 30)); // left clipped edge
        assert!(edge_suppressed(14, 5, 10, 30)); // right clipped edge
        assert!(!edge_suppressed(9, 5, 10, 30)); // interior
        // At track start/end the boundary tile is fine.
        assert!(!edge_suppressed(0, 0, 10, 30));
        assert!(!edge_suppressed(29, 20, 10, 30));
        // Unscrolled short rows never suppress.
        assert!(!edge_suppressed(0, 0, 10, 4));
        assert!(!edge_suppressed(3, 0, 10, 4));
    }
}
