//! Domain vocabulary shared across entities, services and handlers:
//! work areas and their topology, the authenticated actor claim, and
//! folio formatting rules.

pub mod area;
pub mod folio;

pub use area::{Actor, Area, TRACKING_SEQUENCE};
