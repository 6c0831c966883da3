//! Data model for the harvesting engine.

pub mod candidate;
pub mod draft;
pub mod extraction;
pub mod venue;

pub use candidate::{DiscoveryCandidate, DiscoveryStrategy, ListingHint};
pub use draft::{EventCategory, EventDraft, TimeWindow};
pub use extraction::{Confidence, ExtractionResult, ExtractionTier};
pub use venue::VenueRecord;
