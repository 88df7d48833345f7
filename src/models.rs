use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates;

/// One data row from the sheet: header → raw value, in column order.
///
/// The sheet is edited by hand and carries no schema contract, so headers
/// keep their original casing here and lookup is case-insensitive. Every
/// record holds exactly one value per header column; short rows are padded
/// with empty strings at parse time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Case-insensitive exact match on a header name.
    ///
    /// Returns `None` when no column matches, which is distinct from a
    /// present-but-empty cell (`Some("")`).
    pub fn get(&self, name: &str) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.fields
            .iter()
            .find(|(key, _)| key.to_lowercase() == wanted)
            .map(|(_, value)| value.as_str())
    }

    /// First hit along an alias chain, in priority order.
    pub fn get_any(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.get(name))
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Normalized event record consumed by everything downstream of the sheet.
///
/// `date` stays in its raw `DD/MM/YYYY` form and is re-parsed on demand;
/// the sheet is the source of truth and the string is what gets displayed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CanonicalEvent {
    pub name: String,
    pub date: String,
    pub location: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub attractions: Option<String>,
    pub producer: Option<String>,
    pub image_url: Option<String>,
    pub genres: Option<String>,
    pub ticket_info: Option<String>,
    pub instagram_url: Option<String>,
    pub coupon: Option<String>,
    pub hidden: bool,
    pub slug: String,
}

impl CanonicalEvent {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        dates::parse_local_date(&self.date)
    }

    /// Trimmed, lower-cased genre tokens from the comma-separated field.
    pub fn genre_tokens(&self) -> Vec<String> {
        self.genres
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(|token| token.trim().to_lowercase())
                    .filter(|token| !token.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ticket URL, unless the field holds one of the non-link sentinels
    /// ("gratuito", "couvert") a sheet editor may type instead.
    pub fn ticket_link(&self) -> Option<&str> {
        let info = self.ticket_info.as_deref()?.trim();
        if info.is_empty() {
            return None;
        }
        let lowered = info.to_lowercase();
        if lowered == "gratuito" || lowered == "couvert" {
            return None;
        }
        Some(info)
    }

    pub fn is_free(&self) -> bool {
        self.ticket_info
            .as_deref()
            .map(|info| info.trim().eq_ignore_ascii_case("gratuito"))
            .unwrap_or(false)
    }

    /// Display string for the time range, e.g. "De 22h até 02h" or "Às 20h".
    pub fn time_display(&self) -> Option<String> {
        let text = match (self.start_time.as_deref(), self.end_time.as_deref()) {
            (Some(start), Some(end)) => format!("de {start}h até {end}h"),
            (Some(start), None) => format!("às {start}h"),
            _ => return None,
        };
        let mut chars = text.chars();
        let first = chars.next()?;
        Some(first.to_uppercase().collect::<String>() + chars.as_str())
    }
}

/// Ephemeral filter inputs, rebuilt from the UI (or a shared link) on every
/// change; never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    pub term: String,
    pub date: Option<NaiveDate>,
    pub genre: Option<String>,
    pub favorites_only: bool,
}

impl FilterState {
    pub fn is_default(&self) -> bool {
        self.term.trim().is_empty()
            && self.date.is_none()
            && self.genre.is_none()
            && !self.favorites_only
    }
}
