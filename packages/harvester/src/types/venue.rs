//! Venue registry records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A known venue, looked up (never mutated) by the venue matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueRecord {
    pub id: Uuid,
    pub name: String,
    pub city_id: Option<Uuid>,
}

impl VenueRecord {
    pub fn new(id: Uuid, name: impl Into<String>, city_id: Option<Uuid>) -> Self {
        Self {
            id,
            name: name.into(),
            city_id,
        }
    }
}
