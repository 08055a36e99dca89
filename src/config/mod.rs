//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! dialplan file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, all errors collected)
//!     → DialplanConfig (validated, immutable)
//!     → routing::table (compiled into runtime tables)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the runtime tables never mutate it
//! - All sections default to empty so minimal dialplans parse
//! - Validation separates syntactic (serde) from semantic checks
//! - Dangling name references and broken patterns fail at load, never
//!   during a resolution

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    DialplanConfig, NumberField, OriginClass, PatternConfig, PeerConfig, PeerDirection, Phase,
    PolicyConfig, ProfileConfig, RuleConfig, TieBreak, TranslationConfig,
};
pub use validation::{validate_config, ValidationError};
