//! Real-time combat resolution.
//!
//! Actions queue with a reaction-time delay and resolve in
//! `execute_at` order inside a synchronous tick. The resolver never
//! errors mid-tick; actions whose preconditions fail are dropped.

pub mod effects;
pub mod interrupt;
pub mod queue;
pub mod reaction;
pub mod resolver;
pub mod state;

pub use queue::ActionQueue;
pub use resolver::CombatResolver;
pub use state::{CombatEvent, CombatError};
