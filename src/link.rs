use chrono::NaiveDate;
use url::form_urlencoded;

use crate::dates;
use crate::models::FilterState;

const PARAM_SEARCH: &str = "search";
const PARAM_DATE: &str = "date";
const PARAM_GENRE: &str = "genre";
const PARAM_EVENT: &str = "evento";

/// Everything a shared URL can carry: the filter state plus an optional
/// "open this event" directive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeepLink {
    pub filter: FilterState,
    pub selected: Option<String>,
}

impl DeepLink {
    pub fn from_filter(filter: FilterState) -> Self {
        Self {
            filter,
            selected: None,
        }
    }
}

/// Reconstruct filter state and selection from a query string, with or
/// without its leading `?`. Unknown and empty parameters are ignored; an
/// unparseable date simply leaves the date filter off.
pub fn parse_query(query: &str) -> DeepLink {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut link = DeepLink::default();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            PARAM_SEARCH => link.filter.term = value.to_string(),
            PARAM_DATE => link.filter.date = parse_date_value(value),
            PARAM_GENRE => link.filter.genre = Some(value.to_string()),
            PARAM_EVENT => link.selected = Some(value.to_string()),
            _ => {}
        }
    }
    link
}

/// Serialize back into a query string; inactive filters are omitted so the
/// default view shares as a bare URL.
pub fn to_query(link: &DeepLink) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let term = link.filter.term.trim();
    if !term.is_empty() {
        serializer.append_pair(PARAM_SEARCH, term);
    }
    if let Some(date) = link.filter.date {
        serializer.append_pair(PARAM_DATE, &date.format("%Y-%m-%d").to_string());
    }
    if let Some(genre) = link.filter.genre.as_deref() {
        serializer.append_pair(PARAM_GENRE, genre);
    }
    if let Some(selected) = link.selected.as_deref() {
        serializer.append_pair(PARAM_EVENT, selected);
    }
    serializer.finish()
}

/// Date pickers emit `YYYY-MM-DD`, the sheet speaks `D/M/YYYY`; accept
/// either in shared links.
pub fn parse_date_value(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| dates::parse_local_date(value))
}
