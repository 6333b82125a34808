mod app;
mod fetch;
mod paginate;
mod player;
mod popup;
mod router;
mod tmdb;
mod ui;
mod watchlist;

use app::{App, Content, DetailsFocus, DetailsSlot, EpisodesSlot, RowsView, SearchFocus};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::error;
use player::VidkingSink;
use router::{Location, PageKey};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tmdb::{CatalogItem, MediaKind, TmdbClient};
use watchlist::{STORE_FILE, WatchlistStore};

/// Terminal browser for movie and TV metadata, backed by TMDB
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// TMDB API key (falls back to the TMDB_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Path to the watchlist file (defaults to the platform data directory)
    #[arg(long)]
    watchlist: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let project_dirs = directories::ProjectDirs::from("com", "marquee", "marquee")
        .ok_or("Could not determine home directory")?;

    // Stderr belongs to the terminal UI, so logs go to a file.
    let log_dir = project_dirs.cache_dir();
    std::fs::create_dir_all(log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("marquee.log"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let api_key = cli
        .api_key
        .or_else(|| std::env::var("TMDB_API_KEY").ok())
        .ok_or("No TMDB API key. Pass --api-key or set TMDB_API_KEY.")?;

    let watchlist_path = cli
        .watchlist
        .unwrap_or_else(|| project_dirs.data_dir().join(STORE_FILE));

    let mut app = App::new(
        Arc::new(TmdbClient::new(api_key)),
        Arc::new(VidkingSink::default()),
        WatchlistStore::new(watchlist_path),
    );

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    app.resize(size.width, size.height);
    app.init();

    let result = run_app(&mut terminal, &mut app).await;

    ratatui::restore();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.pump();
        app.tick(Instant::now());

        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Short poll so popup and overlay timers stay responsive.
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(app, key);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Text-entry focuses capture everything before global bindings.
    if let Content::Search(state) = &app.content {
        match state.focus {
            SearchFocus::Query => return handle_search_query_input(app, key),
            SearchFocus::Year => return handle_search_year_input(app, key),
            SearchFocus::Results => {}
        }
    }

    if key.code == KeyCode::Char('?') {
        app.show_help = true;
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('1') => return app.navigate(Location::Home),
        KeyCode::Char('2') => return app.navigate(Location::Movies),
        KeyCode::Char('3') => return app.navigate(Location::Tv),
        KeyCode::Char('4') => return app.navigate(Location::MyList),
        KeyCode::Char('5') => return app.navigate(Location::Genres),
        KeyCode::Char('6') | KeyCode::Char('/') => {
            let query = match app.history.current() {
                Location::Search { query } => query.clone(),
                _ => String::new(),
            };
            app.navigate(Location::Search { query });
            if let Content::Search(state) = &mut app.content {
                state.focus = SearchFocus::Query;
            }
            return;
        }
        KeyCode::Backspace => return app.back(),
        KeyCode::Char('n') => return app.forward(),
        _ => {}
    }

    match &app.content {
        Content::Home(_) | Content::Rows(_) => handle_rows_key(app, key),
        Content::MyList(_) => handle_my_list_key(app, key),
        Content::Grid(_) => handle_grid_key(app, key),
        Content::Genres(_) => handle_genres_key(app, key),
        Content::Search(_) => handle_search_key(app, key),
        Content::Details(_) => handle_details_key(app, key),
        Content::Player(_) => handle_player_key(app, key),
        Content::Loading | Content::UnknownCategory { .. } => {
            if key.code == KeyCode::Esc {
                app.back();
            }
        }
    }
}

fn rows_of_mut(content: &mut Content) -> Option<&mut RowsView> {
    match content {
        Content::Home(state) => Some(&mut state.rows),
        Content::Rows(state) => Some(&mut state.rows),
        _ => None,
    }
}

/// (kind, id, title, poster, overview) snapshot for navigation and toggles.
fn listing_of(item: &CatalogItem, hint: MediaKind) -> (MediaKind, u64, String, String, String) {
    (
        item.kind_or(hint),
        item.id,
        item.title.clone(),
        item.poster_path.clone().unwrap_or_default(),
        item.overview.clone(),
    )
}

fn report_store_error(app: &mut App, err: watchlist::StoreError) {
    error!("watchlist write failed: {err}");
    app.status_msg = format!("Couldn't save list: {err}");
}

fn handle_rows_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    let visible = app.visible_tiles();
    let outcome = {
        let Some(rows) = rows_of_mut(&mut app.content) else {
            return;
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => rows.move_up(),
            KeyCode::Down | KeyCode::Char('j') => rows.move_down(),
            KeyCode::Left | KeyCode::Char('h') => rows.move_left(visible),
            KeyCode::Right | KeyCode::Char('l') => rows.move_right(visible),
            KeyCode::Char('g') => rows.jump_start(visible),
            KeyCode::Char('G') => rows.jump_end(visible),
            _ => {
                handle_rows_action(app, key);
                return;
            }
        }
    };
    if outcome.scrolled {
        app.popup.force_hide();
    }
    if outcome.moved {
        app.sync_popup(now);
    }
}

fn handle_rows_action(app: &mut App, key: KeyEvent) {
    // Hero actions take the uppercase variants on the home view.
    if let Content::Home(state) = &app.content {
        if let app::HeroSlot::Ready(item) = &state.hero {
            let listing = listing_of(item, MediaKind::Movie);
            match key.code {
                KeyCode::Char('D') => return app.show_preview(listing.0, listing.1),
                KeyCode::Char('P') => return app.play_stream(listing.0, listing.1, 1, 1),
                KeyCode::Char('A') => {
                    let (kind, id, title, poster, overview) = listing;
                    if let Err(err) = app.toggle_from_listing(kind, id, &title, &poster, &overview)
                    {
                        report_store_error(app, err);
                    }
                    return;
                }
                _ => {}
            }
        }
    }

    let (view_all, listing) = {
        let rows = match &app.content {
            Content::Home(state) => &state.rows,
            Content::Rows(state) => &state.rows,
            _ => return,
        };
        let row = rows.current_row();
        let view_all = row.map(|r| (r.key.encode(), r.title.clone()));
        let listing = rows
            .current_item()
            .zip(row)
            .map(|(item, row)| listing_of(item, row.kind));
        (view_all, listing)
    };

    match key.code {
        KeyCode::Char('v') => {
            if let Some((key, title)) = view_all {
                app.navigate(Location::ViewAll { key, title });
            }
        }
        KeyCode::Enter => {
            if let Some((kind, id, ..)) = listing {
                app.show_preview(kind, id);
            }
        }
        KeyCode::Char('p') => {
            if let Some((kind, id, ..)) = listing {
                app.play_stream(kind, id, 1, 1);
            }
        }
        KeyCode::Char('a') => {
            if let Some((kind, id, title, poster, overview)) = listing {
                if let Err(err) = app.toggle_from_listing(kind, id, &title, &poster, &overview) {
                    report_store_error(app, err);
                }
            }
        }
        KeyCode::Esc => app.back(),
        _ => {}
    }
}

fn handle_my_list_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    let selected = {
        let Content::MyList(state) = &mut app.content else {
            return;
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                state.selected = state.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                state.selected = (state.selected + 1).min(state.items.len().saturating_sub(1));
                None
            }
            _ => state
                .items
                .get(state.selected)
                .map(|item| (item.kind, item.id)),
        }
    };

    match (key.code, selected) {
        (KeyCode::Up | KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('k'), _) => {
            app.popup.force_hide();
            app.sync_popup(now);
        }
        (KeyCode::Enter, Some((kind, id))) => app.show_preview(kind, id),
        (KeyCode::Char('p'), Some((kind, id))) => app.play_stream(kind, id, 1, 1),
        (KeyCode::Char('x') | KeyCode::Char('a'), Some((_, id))) => {
            if let Err(err) = app.remove_from_list(id) {
                report_store_error(app, err);
            }
            app.popup.force_hide();
            app.sync_popup(now);
        }
        (KeyCode::Esc, _) => app.back(),
        _ => {}
    }
}

fn handle_grid_key(app: &mut App, key: KeyEvent) {
    let cols = app.visible_tiles();
    let selected = {
        let Content::Grid(grid) = &mut app.content else {
            return;
        };
        let last = grid.items.len().saturating_sub(1);
        match key.code {
            // Movement re-arms the proximity trigger after a failed page.
            KeyCode::Left | KeyCode::Char('h') => {
                grid.paginator.rearm();
                grid.selected = grid.selected.saturating_sub(1);
                return;
            }
            KeyCode::Right | KeyCode::Char('l') => {
                grid.paginator.rearm();
                grid.selected = (grid.selected + 1).min(last);
                return;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                grid.paginator.rearm();
                grid.selected = grid.selected.saturating_sub(cols);
                return;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                grid.paginator.rearm();
                grid.selected = (grid.selected + cols).min(last);
                return;
            }
            KeyCode::Char('g') => {
                grid.paginator.rearm();
                grid.selected = 0;
                return;
            }
            KeyCode::Char('G') => {
                grid.paginator.rearm();
                grid.selected = last;
                return;
            }
            _ => grid
                .items
                .get(grid.selected)
                .map(|item| listing_of(item, grid.kind)),
        }
    };

    match (key.code, selected) {
        (KeyCode::Enter, Some((kind, id, ..))) => app.show_preview(kind, id),
        (KeyCode::Char('p'), Some((kind, id, ..))) => app.play_stream(kind, id, 1, 1),
        (KeyCode::Char('a'), Some((kind, id, title, poster, overview))) => {
            if let Err(err) = app.toggle_from_listing(kind, id, &title, &poster, &overview) {
                report_store_error(app, err);
            }
        }
        (KeyCode::Esc, _) => app.back(),
        _ => {}
    }
}

fn handle_genres_key(app: &mut App, key: KeyEvent) {
    let target = {
        let Content::Genres(state) = &mut app.content else {
            return;
        };
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                state.column = 0;
                return;
            }
            KeyCode::Right | KeyCode::Char('l') => {
                state.column = 1;
                return;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                state.move_vertical(-1);
                return;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                state.move_vertical(1);
                return;
            }
            KeyCode::Enter => state.current().map(|(genre, kind)| {
                let suffix = match kind {
                    MediaKind::Movie => "Movies",
                    MediaKind::Tv => "TV Shows",
                };
                (
                    PageKey::Genre(kind, genre.id).encode(),
                    format!("{} {suffix}", genre.name),
                )
            }),
            KeyCode::Esc => {
                app.back();
                return;
            }
            _ => return,
        }
    };
    if let Some((key, title)) = target {
        app.navigate(Location::ViewAll { key, title });
    }
}

fn handle_search_query_input(app: &mut App, key: KeyEvent) {
    let submit = {
        let Content::Search(state) = &mut app.content else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                state.focus = SearchFocus::Results;
                true
            }
            KeyCode::Esc => {
                state.input = state.committed.clone();
                state.focus = SearchFocus::Results;
                false
            }
            KeyCode::Backspace => {
                state.input.pop();
                false
            }
            KeyCode::Char(c) => {
                state.input.push(c);
                false
            }
            _ => false,
        }
    };
    if submit {
        app.search_submit();
    }
}

fn handle_search_year_input(app: &mut App, key: KeyEvent) {
    let Content::Search(state) = &mut app.content else {
        return;
    };
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            state.focus = SearchFocus::Results;
        }
        KeyCode::Backspace => {
            state.year_filter.pop();
            state.apply_filters();
        }
        KeyCode::Char(c) if c.is_ascii_digit() && state.year_filter.len() < 4 => {
            state.year_filter.push(c);
            state.apply_filters();
        }
        _ => {}
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    let visible = app.visible_tiles();
    let (outcome, selected) = {
        let Content::Search(state) = &mut app.content else {
            return;
        };
        match key.code {
            KeyCode::Char('i') => {
                state.focus = SearchFocus::Query;
                return;
            }
            KeyCode::Char('y') => {
                state.focus = SearchFocus::Year;
                return;
            }
            KeyCode::Left | KeyCode::Char('h') => (Some(state.move_selection(-1, visible)), None),
            KeyCode::Right | KeyCode::Char('l') => (Some(state.move_selection(1, visible)), None),
            _ => (
                None,
                state
                    .current_item()
                    .map(|item| listing_of(item, MediaKind::Movie)),
            ),
        }
    };

    if let Some(outcome) = outcome {
        if outcome.scrolled {
            app.popup.force_hide();
        }
        if outcome.moved {
            app.sync_popup(now);
        }
        return;
    }

    match key.code {
        KeyCode::Char('t') => app.search_cycle_kind(),
        KeyCode::Enter => {
            if let Some((kind, id, ..)) = selected {
                app.show_preview(kind, id);
            }
        }
        KeyCode::Char('p') => {
            if let Some((kind, id, ..)) = selected {
                app.play_stream(kind, id, 1, 1);
            }
        }
        KeyCode::Char('a') => {
            if let Some((kind, id, title, poster, overview)) = selected {
                if let Err(err) = app.toggle_from_listing(kind, id, &title, &poster, &overview) {
                    report_store_error(app, err);
                }
            }
        }
        KeyCode::Esc => app.back(),
        _ => {}
    }
}

enum DetailsAction {
    Play(MediaKind, u64, u32, u32),
    Toggle(MediaKind, u64, String, String, String),
    Similar(MediaKind, u64),
    ChangeSeason(i64),
    Back,
}

fn handle_details_key(app: &mut App, key: KeyEvent) {
    let action = {
        let Content::Details(state) = &mut app.content else {
            return;
        };
        let kind = state.kind;
        let id = state.id;
        match &mut state.slot {
            DetailsSlot::Ready(ready) => match key.code {
                KeyCode::Tab => {
                    let has_episodes = !matches!(ready.episodes, EpisodesSlot::NotApplicable);
                    ready.focus = match ready.focus {
                        DetailsFocus::Actions if has_episodes => DetailsFocus::Episodes,
                        DetailsFocus::Actions => DetailsFocus::Similar,
                        DetailsFocus::Episodes => DetailsFocus::Similar,
                        DetailsFocus::Similar => DetailsFocus::Actions,
                    };
                    None
                }
                KeyCode::Char('[') => Some(DetailsAction::ChangeSeason(-1)),
                KeyCode::Char(']') => Some(DetailsAction::ChangeSeason(1)),
                KeyCode::Char('a') => Some(DetailsAction::Toggle(
                    kind,
                    id,
                    ready.details.title.clone(),
                    ready.details.poster_path.clone().unwrap_or_default(),
                    ready.details.overview.clone(),
                )),
                KeyCode::Char('p') => {
                    let season = ready
                        .seasons
                        .get(ready.season_sel)
                        .map(|s| s.season_number)
                        .unwrap_or(1);
                    Some(DetailsAction::Play(kind, id, season, 1))
                }
                KeyCode::Up | KeyCode::Char('k') if ready.focus == DetailsFocus::Episodes => {
                    ready.episode_sel = ready.episode_sel.saturating_sub(1);
                    None
                }
                KeyCode::Down | KeyCode::Char('j') if ready.focus == DetailsFocus::Episodes => {
                    if let EpisodesSlot::Ready(episodes) = &ready.episodes {
                        ready.episode_sel =
                            (ready.episode_sel + 1).min(episodes.len().saturating_sub(1));
                    }
                    None
                }
                KeyCode::Left | KeyCode::Char('h') if ready.focus == DetailsFocus::Similar => {
                    ready.similar_sel = ready.similar_sel.saturating_sub(1);
                    ready.similar_scroll = ready.similar_scroll.min(ready.similar_sel);
                    None
                }
                KeyCode::Right | KeyCode::Char('l') if ready.focus == DetailsFocus::Similar => {
                    ready.similar_sel =
                        (ready.similar_sel + 1).min(ready.similar.len().saturating_sub(1));
                    None
                }
                KeyCode::Enter => match ready.focus {
                    DetailsFocus::Actions => {
                        let season = ready
                            .seasons
                            .get(ready.season_sel)
                            .map(|s| s.season_number)
                            .unwrap_or(1);
                        Some(DetailsAction::Play(kind, id, season, 1))
                    }
                    DetailsFocus::Episodes => {
                        let season = ready
                            .seasons
                            .get(ready.season_sel)
                            .map(|s| s.season_number)
                            .unwrap_or(1);
                        match &ready.episodes {
                            EpisodesSlot::Ready(episodes) => {
                                episodes.get(ready.episode_sel).map(|episode| {
                                    DetailsAction::Play(kind, id, season, episode.episode_number)
                                })
                            }
                            _ => None,
                        }
                    }
                    DetailsFocus::Similar => ready
                        .similar
                        .get(ready.similar_sel)
                        .map(|item| DetailsAction::Similar(item.kind_or(kind), item.id)),
                },
                KeyCode::Esc => Some(DetailsAction::Back),
                _ => None,
            },
            _ => match key.code {
                KeyCode::Esc => Some(DetailsAction::Back),
                _ => None,
            },
        }
    };

    match action {
        Some(DetailsAction::Play(kind, id, season, episode)) => {
            app.play_stream(kind, id, season, episode);
        }
        Some(DetailsAction::Toggle(kind, id, title, poster, overview)) => {
            if let Err(err) = app.toggle_from_listing(kind, id, &title, &poster, &overview) {
                report_store_error(app, err);
            }
        }
        Some(DetailsAction::Similar(kind, id)) => app.show_preview(kind, id),
        Some(DetailsAction::ChangeSeason(delta)) => app.change_season(delta),
        Some(DetailsAction::Back) => app.back(),
        None => {}
    }
}

fn handle_player_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    let open = {
        let Content::Player(player) = &mut app.content else {
            return;
        };
        // Any interaction brings the controls back.
        player.overlay.poke(now);
        match key.code {
            KeyCode::Esc => {
                app.back();
                return;
            }
            KeyCode::Char('o') | KeyCode::Enter => {
                player.dismiss_loader();
                player.launched = true;
                Some(player.embed_url.clone())
            }
            _ => None,
        }
    };
    if let Some(url) = open {
        if let Err(err) = open::that(&url) {
            error!("failed to open {url}: {err}");
            app.status_msg = "Couldn't open a browser.".to_string();
        }
    }
}
