//! Configuration schema definitions.
//!
//! This module defines the on-disk shape of a dialplan. All types derive
//! Serde traits for deserialization from TOML; semantic checks live in
//! [`crate::config::validation`], and compilation into runtime tables in
//! [`crate::routing::table`].

use serde::{Deserialize, Serialize};

/// Root configuration for the dialplan resolver.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DialplanConfig {
    /// Egress selection policy (tie-break, per-origin preferences).
    pub policy: PolicyConfig,

    /// Named destination-number patterns.
    pub patterns: Vec<PatternConfig>,

    /// Named number-rewrite rules.
    pub rules: Vec<RuleConfig>,

    /// Named translation profiles binding a rule to a number field.
    pub profiles: Vec<ProfileConfig>,

    /// Dial-peer entries, in precedence order.
    pub peers: Vec<PeerConfig>,
}

/// A named match pattern over a phone number.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PatternConfig {
    /// Unique name within the catalog.
    pub name: String,

    /// Regular-expression source, anchored or not as written.
    pub pattern: String,
}

/// Which party number a rule or profile operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberField {
    /// The calling-party number (CPN).
    Calling,
    /// The called-party number (CDPN).
    Called,
}

impl std::fmt::Display for NumberField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumberField::Calling => write!(f, "calling"),
            NumberField::Called => write!(f, "called"),
        }
    }
}

/// A named rewrite rule: pattern plus replacement template.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Unique name within the rule table.
    pub name: String,

    /// Number field this rule is written for.
    pub target: NumberField,

    /// Regular-expression source matched against the number.
    pub pattern: String,

    /// Replacement template; `$1`..`$n` reference capture groups,
    /// `$0` the whole match.
    pub replace: String,
}

/// A named binding of a rewrite rule to a number field.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfileConfig {
    /// Unique profile name.
    pub name: String,

    /// Field the profile rewrites; must agree with the rule's target.
    pub target: NumberField,

    /// Name of the rewrite rule to apply.
    pub rule: String,
}

/// Direction of a dial-peer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerDirection {
    Inbound,
    Outbound,
}

/// Signaling source class of an origin, set on inbound peers.
///
/// Carrier-class origins switch egress selection into called-number-driven
/// mode: the called number is matched against `incoming_called_pattern`
/// selectors instead of named destination patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OriginClass {
    #[default]
    Platform,
    Carrier,
}

/// Translation phase relative to egress selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Applied to the numbers as received by the selected route.
    Incoming,
    /// Applied to the numbers as sent onward.
    Outgoing,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Incoming => write!(f, "incoming"),
            Phase::Outgoing => write!(f, "outgoing"),
        }
    }
}

/// One translation attached to an outbound peer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    /// Phase the profile runs in.
    pub phase: Phase,

    /// Name of the translation profile.
    pub profile: String,
}

/// A dial-peer entry. Inbound entries claim an origin; outbound entries
/// carry exactly one selector (`destination_pattern` or
/// `incoming_called_pattern`) and an ordered translation list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PeerConfig {
    /// Unique id across the whole table.
    pub id: u32,

    /// Free-text description; also drives destination platform
    /// classification on outbound peers.
    #[serde(default)]
    pub description: String,

    pub direction: PeerDirection,

    /// Origin tag claimed by an inbound peer (e.g. "zoom", "itsp").
    #[serde(default)]
    pub origin: Option<String>,

    /// Origin class of an inbound peer.
    #[serde(default)]
    pub class: OriginClass,

    /// Named destination pattern (outbound, platform-mode selector).
    #[serde(default)]
    pub destination_pattern: Option<String>,

    /// Inline called-number pattern (outbound, carrier-mode selector).
    #[serde(default)]
    pub incoming_called_pattern: Option<String>,

    /// Ordered translation profile bindings.
    #[serde(default)]
    pub translations: Vec<TranslationConfig>,

    /// Signaling transport is TLS.
    #[serde(default)]
    pub tls: bool,

    /// Media is SRTP.
    #[serde(default)]
    pub srtp: bool,
}

/// Tie-break applied when several egress peers match the called number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Longest pattern source wins (specificity proxy); ties fall back to
    /// table order.
    #[default]
    LongestPattern,
    /// First match in table order wins.
    TableOrder,
}

/// Egress selection policy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PolicyConfig {
    pub tie_break: TieBreak,

    /// Origin tag -> preferred egress peer id. A preferred peer that is
    /// among the matched candidates wins regardless of pattern length.
    pub preferred: std::collections::HashMap<String, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_deserializes_with_defaults() {
        let config: DialplanConfig = toml::from_str("").unwrap();
        assert!(config.peers.is_empty());
        assert_eq!(config.policy.tie_break, TieBreak::LongestPattern);
        assert!(config.policy.preferred.is_empty());
    }

    #[test]
    fn test_peer_defaults() {
        let toml = r#"
            [[peers]]
            id = 7
            direction = "inbound"
            origin = "zoom"
        "#;
        let config: DialplanConfig = toml::from_str(toml).unwrap();
        let peer = &config.peers[0];
        assert_eq!(peer.class, OriginClass::Platform);
        assert!(!peer.tls);
        assert!(!peer.srtp);
        assert!(peer.translations.is_empty());
    }

    #[test]
    fn test_tie_break_kebab_case() {
        let policy: PolicyConfig = toml::from_str("tie_break = \"table-order\"").unwrap();
        assert_eq!(policy.tie_break, TieBreak::TableOrder);
    }
}
