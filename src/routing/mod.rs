//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! resolve(origin, calling, called)
//!     → resolver.rs (orchestration state machine)
//!     → table.rs (ingress scan, egress candidates, tie-break, policy)
//!     → Return: fully formed CallState (success or recorded failure)
//!
//! Table Compilation (at startup):
//!     DialplanConfig
//!     → compile pattern catalog + translation catalog
//!     → build ingress/egress entries, resolve all name references
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Tables compiled at startup, immutable at runtime
//! - Deterministic: same config and input always select the same peers
//! - Fatal conditions are returned as data on the CallState
//! - Selection policy (tie-break, preferred ids) comes from configuration

pub mod resolver;
pub mod table;

pub use resolver::Resolver;
pub use table::{
    EgressPeer, EgressSelection, EgressSelector, IngressPeer, RouteTable, SelectionPolicy,
    TranslationBinding,
};
