//! Audio registry
//!
//! Owns every active engine: local players keyed by handle, and network
//! players grouped by listener. The host drives [`AudioRegistry::tick_all`]
//! once per frame; engines that end are released automatically.

pub mod manager;

pub use manager::{create_shared_registry, AudioRegistry, SharedRegistry, TickReport};
