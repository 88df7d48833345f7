use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use agenda_feed::{filter, link, ConfigStore, EventStore, FavoritesStore, FilterState};

/// Terminal front for the event agenda pipeline.
#[derive(Parser)]
#[command(name = "agenda-feed", version, about)]
struct Cli {
    /// Sheet export URL (defaults to the configured sheet)
    #[arg(long)]
    url: Option<String>,

    /// Read CSV from a local file instead of fetching
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Free-text search over name, location, attractions and producer
    #[arg(long)]
    search: Option<String>,

    /// Show only this calendar date (DD/MM/YYYY or YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,

    /// Require this genre
    #[arg(long)]
    genre: Option<String>,

    /// Show only favorited events
    #[arg(long)]
    favorites: bool,

    /// Apply a shared link's query string instead of the flags above
    #[arg(long, value_name = "QUERY")]
    link: Option<String>,

    /// Toggle a slug in the favorites set and exit
    #[arg(long, value_name = "SLUG")]
    toggle: Option<String>,

    /// Include events that are already over
    #[arg(long)]
    all: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let favorites = FavoritesStore::load_default();

    if let Some(slug) = cli.toggle.as_deref() {
        let favorited = favorites.toggle(slug)?;
        println!(
            "{} {}",
            slug,
            if favorited { "favoritado" } else { "removido" }
        );
        return Ok(());
    }

    let config = ConfigStore::load().read();
    let store = EventStore::with_overrides(config.image_overrides.clone());

    match cli.file.as_deref() {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("unable to read {}", path.display()))?;
            store.ingest(&text);
        }
        None => {
            let url = cli.url.clone().unwrap_or_else(|| config.sheet_url());
            store.refresh(&url)?;
        }
    }

    let deep_link = match cli.link.as_deref() {
        Some(query) => link::parse_query(query),
        None => link::DeepLink::from_filter(FilterState {
            term: cli.search.clone().unwrap_or_default(),
            date: cli.date.as_deref().and_then(link::parse_date_value),
            genre: cli.genre.clone(),
            favorites_only: cli.favorites,
        }),
    };

    let now = Local::now().naive_local();

    if let Some(slug) = deep_link.selected.as_deref() {
        match store.find_by_slug(slug) {
            Some(event) => {
                print_event(&event, &favorites);
                let related = store.related_to(&event, now, 3);
                if !related.is_empty() {
                    println!("\nVeja também:");
                    for other in &related {
                        println!("  {} — {}", other.date, other.name);
                    }
                }
            }
            None => println!("Nenhum evento com o identificador '{slug}'."),
        }
        return Ok(());
    }

    let events = if cli.all {
        let mut all = store.snapshot().as_ref().clone();
        all.sort_by(agenda_feed::dates::compare_for_sort);
        all
    } else {
        filter::apply(
            &store.snapshot(),
            &deep_link.filter,
            now,
            &favorites.snapshot(),
        )
    };

    if events.is_empty() {
        println!("Nenhum evento encontrado.");
        return Ok(());
    }

    for event in &events {
        print_event(event, &favorites);
        println!();
    }
    println!("{} evento(s).", events.len());
    Ok(())
}

fn print_event(event: &agenda_feed::CanonicalEvent, favorites: &FavoritesStore) {
    let star = if favorites.is_favorited(&event.slug) {
        "★ "
    } else {
        ""
    };
    match event.time_display() {
        Some(time) => println!("{star}{} — {} - {}", event.name, event.date, time),
        None => println!("{star}{} — {}", event.name, event.date),
    }
    if let Some(location) = event.location.as_deref() {
        println!("  Local: {location}");
    }
    if let Some(attractions) = event.attractions.as_deref() {
        println!("  Atrações: {attractions}");
    }
    if let Some(genres) = event.genres.as_deref() {
        println!("  Gêneros: {genres}");
    }
    if event.is_free() {
        println!("  Ingressos: gratuito");
    } else if let Some(url) = event.ticket_link() {
        println!("  Ingressos: {url}");
    }
    if let Some(instagram) = event.instagram_url.as_deref() {
        println!("  Instagram: {instagram}");
    }
    if let Some(coupon) = event.coupon.as_deref() {
        println!("  Cupom: {coupon}");
    }
    println!("  Link: ?evento={}", event.slug);
}
