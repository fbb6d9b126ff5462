//! Subsurface simulation: strata columns, karst caves, magma, organic
//! diagenesis, and mining.

pub mod caves;
pub mod column;
pub mod deposits;
pub mod magma;
pub mod mining;

pub use caves::KarstSystem;
pub use column::ColumnGrid;
pub use magma::MagmaSystem;
