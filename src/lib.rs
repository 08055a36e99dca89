//! Dial-peer resolution and number translation for a SIP border element.
//!
//! Models how a call traverses a border element: ingress dial-peer
//! classification by origin, egress dial-peer selection over the called
//! number with explicit tie-break policy, and ordered application of
//! number-translation profiles to the calling and called party numbers.
//! The result of one resolution is a [`CallState`] record carrying the
//! selected peers, before/after numbers, the full event log, warnings and
//! any fatal error.
//!
//! Everything is a pure, synchronous computation over configuration loaded
//! once: no signaling, no network I/O, no persistence. Compiled tables are
//! immutable and safe to share across concurrent resolutions.

pub mod call_state;
pub mod config;
pub mod patterns;
pub mod routing;
pub mod translate;

pub use call_state::{
    CallState, DestinationPlatform, FlowStep, OriginTag, PeerSnapshot, ResolveError, Warning,
};
pub use config::{load_config, parse_config, ConfigError, DialplanConfig, NumberField, Phase};
pub use patterns::{MatchResult, PatternError, PhonePattern, RewriteRule};
pub use routing::{Resolver, RouteTable};
pub use translate::{TranslationCatalog, TranslationProfile, WorkingNumbers};
