//! Listing admission: location allow-list and cross-provider identity keys.
pub mod dedup;
pub mod location;

pub use dedup::job_key;
pub use location::{is_location_ok, normalize_location};
