use crate::tmdb::MediaKind;
use std::time::{Duration, Instant};

/// Playback-control overlay hides after this much inactivity.
pub const OVERLAY_TIMEOUT: Duration = Duration::from_secs(3);
/// The "initializing stream" indicator is force-dismissed after this long
/// even if the embed never signals readiness.
pub const LOADER_FALLBACK: Duration = Duration::from_secs(8);

pub const MOVIE_EMBED_BASE: &str = "https://vidking.net/embed/movie/";
pub const TV_EMBED_BASE: &str = "https://vidking.net/embed/tv/";
const ACCENT: &str = "e50914";

/// Resolves an embeddable playback URL for a title. The core only builds the
/// URL and owns the surrounding lifecycle, never the player internals.
pub trait PlaybackSink: Send + Sync {
    fn embed_url(&self, kind: MediaKind, id: u64, season: u32, episode: u32) -> String;
}

/// Default sink: the Vidking embed provider.
pub struct VidkingSink {
    movie_base: String,
    tv_base: String,
}

impl Default for VidkingSink {
    fn default() -> Self {
        Self {
            movie_base: MOVIE_EMBED_BASE.to_string(),
            tv_base: TV_EMBED_BASE.to_string(),
        }
    }
}

impl PlaybackSink for VidkingSink {
    fn embed_url(&self, kind: MediaKind, id: u64, season: u32, episode: u32) -> String {
        match kind {
            MediaKind::Movie => format!("{}{id}?clr={ACCENT}", self.movie_base),
            MediaKind::Tv => format!("{}{id}/{season}/{episode}?clr={ACCENT}", self.tv_base),
        }
    }
}

/// Inactivity-driven show/hide state for the playback control overlay.
/// Shown on entry; any interaction re-arms the 3-second hide timer.
#[derive(Debug)]
pub struct OverlayTimer {
    visible: bool,
    hide_at: Instant,
}

impl OverlayTimer {
    pub fn new(now: Instant) -> Self {
        Self {
            visible: true,
            hide_at: now + OVERLAY_TIMEOUT,
        }
    }

    /// Any pointer/key interaction: show and restart the timer.
    pub fn poke(&mut self, now: Instant) {
        self.visible = true;
        self.hide_at = now + OVERLAY_TIMEOUT;
    }

    pub fn tick(&mut self, now: Instant) {
        if self.visible && now >= self.hide_at {
            self.visible = false;
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_and_tv_urls_match_the_provider_format() {
        let sink = VidkingSink::default();
        assert_eq!(
            sink.embed_url(MediaKind::Movie, 550, 1, 1),
            "https://vidking.net/embed/movie/550?clr=e50914"
        );
        assert_eq!(
            sink.embed_url(MediaKind::Tv, 1399, 2, 5),
            "https://vidking.net/embed/tv/1399/2/5?clr=e50914"
        );
    }

    #[test]
    fn overlay_shows_on_entry_and_hides_after_idle() {
        let start = Instant::now();
        let mut overlay = OverlayTimer::new(start);
        assert!(overlay.visible());
        overlay.tick(start + Duration::from_secs(2));
        assert!(overlay.visible());
        overlay.tick(start + OVERLAY_TIMEOUT);
        assert!(!overlay.visible());
    }

    #[test]
    fn interaction_rearms_the_timer() {
        let start = Instant::now();
        let mut overlay = OverlayTimer::new(start);
        let poked = start + Duration::from_secs(2);
        overlay.poke(poked);
        overlay.tick(start + OVERLAY_TIMEOUT);
        assert!(overlay.visible());
        overlay.tick(poked + OVERLAY_TIMEOUT);
        assert!(!overlay.visible());
        overlay.poke(poked + Duration::from_secs(10));
        assert!(overlay.visible());
    }
}
