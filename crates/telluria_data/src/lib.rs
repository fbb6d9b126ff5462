//! Pure data structures for the Telluria world server.
//!
//! This crate contains serializable data types with no business logic,
//! shared between the simulation engine and the service layer.

pub mod data;

pub use data::account::*;
pub use data::combat::*;
pub use data::entity::*;
pub use data::geo::*;
pub use data::hex::*;
pub use data::pathogen::*;
pub use data::terrain::*;
pub use data::underground::*;
