//! relay-core: Shared HTTP infrastructure for the upload relay.
pub mod middleware;
pub mod observability;
