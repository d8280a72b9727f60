// JSON API handlers.

pub mod categories;
pub mod classify;
pub mod map;
pub mod stats;

use serde::Deserialize;

/// `?k=` on every GET route.
#[derive(Deserialize, Default)]
pub struct KQuery {
    pub k: Option<usize>,
}
