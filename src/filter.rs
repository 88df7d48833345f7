use chrono::{NaiveDate, NaiveDateTime};

use crate::dates;
use crate::favorites::FavoritesSet;
use crate::models::{CanonicalEvent, FilterState};

/// Narrow the all-events collection through the active filters and return
/// it sorted for display.
///
/// Stages only ever narrow: exact-date (or the upcoming-only default),
/// free text, genre, favorites — then a final re-sort, so filtering and
/// ordering stay decoupled no matter which filters are active.
pub fn apply(
    events: &[CanonicalEvent],
    state: &FilterState,
    now: NaiveDateTime,
    favorites: &FavoritesSet,
) -> Vec<CanonicalEvent> {
    let term = state.term.trim().to_lowercase();
    let genre = state
        .genre
        .as_deref()
        .map(|g| g.trim().to_lowercase())
        .filter(|g| !g.is_empty());

    let mut result: Vec<CanonicalEvent> = events
        .iter()
        .filter(|event| matches_date(event, state.date, now))
        .filter(|event| term.is_empty() || matches_term(event, &term))
        .filter(|event| {
            genre
                .as_deref()
                .map_or(true, |wanted| event.genre_tokens().iter().any(|t| t == wanted))
        })
        .filter(|event| !state.favorites_only || favorites.contains(&event.slug))
        .cloned()
        .collect();

    result.sort_by(dates::compare_for_sort);
    result
}

/// Picking an exact calendar date shows that day no matter how long ago it
/// was; with no date picked, only events that are not yet over survive.
fn matches_date(event: &CanonicalEvent, wanted: Option<NaiveDate>, now: NaiveDateTime) -> bool {
    match wanted {
        Some(date) => event.parsed_date() == Some(date),
        None => !dates::is_over(event, now),
    }
}

fn matches_term(event: &CanonicalEvent, term: &str) -> bool {
    [
        Some(event.name.as_str()),
        event.location.as_deref(),
        event.attractions.as_deref(),
        event.producer.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|text| text.to_lowercase().contains(term))
}
