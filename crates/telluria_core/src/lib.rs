//! Simulation engine for the Telluria world server.
//!
//! Three pillars: deterministic world generation (`world`), the
//! autonomous-agent ecosystem (`ecosystem`), and real-time combat
//! resolution (`combat`). Everything here is synchronous and pure over
//! its inputs; the async service layer lives in the root crate.

pub mod combat;
pub mod ecosystem;
pub mod rng;
pub mod world;
