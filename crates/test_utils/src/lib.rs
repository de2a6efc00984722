//! Shared test support for the risk engine crates
//!
//! Claim builders, canned fraud scenarios, collaborator doubles, proptest
//! strategies and assertion helpers. Only ever a dev-dependency.

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
pub use mocks::*;
