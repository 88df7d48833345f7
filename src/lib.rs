//! Event agenda pipeline: a spreadsheet published as CSV in, filterable,
//! date-sorted canonical event records out.
//!
//! The sheet is edited by hand, so the boundary layers are deliberately
//! forgiving — quoted commas, BOMs, aliased and missing columns, malformed
//! dates — while everything past [`normalize`] works with one strict
//! [`models::CanonicalEvent`] shape. Rendering is someone else's job: the
//! consumer takes snapshots from [`store::EventStore`], narrows them with
//! [`filter::apply`], and joins favorites and deep links on [`slug`]s.

pub mod config;
pub mod csv;
pub mod dates;
pub mod favorites;
pub mod fetch;
pub mod filter;
pub mod link;
pub mod models;
pub mod normalize;
pub mod slug;
pub mod store;
pub mod utils;

pub use config::{AppConfig, ConfigStore};
pub use favorites::{FavoritesSet, FavoritesStore};
pub use link::DeepLink;
pub use models::{CanonicalEvent, FilterState, RawRecord};
pub use store::EventStore;
