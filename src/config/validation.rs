//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (peers reference existing patterns and
//!   profiles, profiles reference existing rules)
//! - Detect duplicate names, ids and origin claims
//! - Compile-check every stored regular expression so a bad pattern can
//!   never surface mid-resolution
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DialplanConfig -> Result<(), Vec<ValidationError>>
//! - Runs before the config is compiled into runtime tables

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::schema::{DialplanConfig, PeerDirection};

/// A single semantic defect found in a dialplan.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("duplicate pattern name \"{0}\"")]
    DuplicatePattern(String),

    #[error("duplicate rule name \"{0}\"")]
    DuplicateRule(String),

    #[error("duplicate profile name \"{0}\"")]
    DuplicateProfile(String),

    #[error("duplicate peer id {0}")]
    DuplicatePeerId(u32),

    #[error("inbound peer {0} has no origin tag")]
    MissingOrigin(u32),

    #[error("origin \"{origin}\" claimed by peers {first} and {second}")]
    DuplicateOriginClaim { origin: String, first: u32, second: u32 },

    #[error("outbound peer {0} has no selector")]
    MissingSelector(u32),

    #[error("outbound peer {0} has both a destination pattern and an incoming called-number pattern")]
    ConflictingSelectors(u32),

    #[error("peer {peer} references unknown pattern \"{pattern}\"")]
    UnknownPattern { peer: u32, pattern: String },

    #[error("peer {peer} references unknown profile \"{profile}\"")]
    UnknownProfile { peer: u32, profile: String },

    #[error("profile \"{profile}\" references unknown rule \"{rule}\"")]
    UnknownRule { profile: String, rule: String },

    #[error("profile \"{profile}\" targets {profile_target} but rule \"{rule}\" targets {rule_target}")]
    TargetMismatch {
        profile: String,
        profile_target: crate::config::schema::NumberField,
        rule: String,
        rule_target: crate::config::schema::NumberField,
    },

    #[error("invalid pattern \"{name}\": {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Validate a parsed dialplan. Collects every defect before failing.
pub fn validate_config(config: &DialplanConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut pattern_names = HashSet::new();
    for pattern in &config.patterns {
        if !pattern_names.insert(pattern.name.as_str()) {
            errors.push(ValidationError::DuplicatePattern(pattern.name.clone()));
        }
        if let Err(e) = regex::Regex::new(&pattern.pattern) {
            errors.push(ValidationError::InvalidPattern {
                name: pattern.name.clone(),
                source: e,
            });
        }
    }

    let mut rule_targets = HashMap::new();
    for rule in &config.rules {
        if rule_targets.insert(rule.name.as_str(), rule.target).is_some() {
            errors.push(ValidationError::DuplicateRule(rule.name.clone()));
        }
        if let Err(e) = regex::Regex::new(&rule.pattern) {
            errors.push(ValidationError::InvalidPattern {
                name: rule.name.clone(),
                source: e,
            });
        }
    }

    let mut profile_names = HashSet::new();
    for profile in &config.profiles {
        if !profile_names.insert(profile.name.as_str()) {
            errors.push(ValidationError::DuplicateProfile(profile.name.clone()));
        }
        match rule_targets.get(profile.rule.as_str()) {
            None => errors.push(ValidationError::UnknownRule {
                profile: profile.name.clone(),
                rule: profile.rule.clone(),
            }),
            Some(&rule_target) if rule_target != profile.target => {
                errors.push(ValidationError::TargetMismatch {
                    profile: profile.name.clone(),
                    profile_target: profile.target,
                    rule: profile.rule.clone(),
                    rule_target,
                });
            }
            Some(_) => {}
        }
    }

    let mut peer_ids = HashSet::new();
    let mut origin_claims: HashMap<String, u32> = HashMap::new();
    for peer in &config.peers {
        if !peer_ids.insert(peer.id) {
            errors.push(ValidationError::DuplicatePeerId(peer.id));
        }

        match peer.direction {
            PeerDirection::Inbound => match &peer.origin {
                None => errors.push(ValidationError::MissingOrigin(peer.id)),
                Some(origin) => {
                    let origin = origin.to_lowercase();
                    if let Some(&first) = origin_claims.get(&origin) {
                        errors.push(ValidationError::DuplicateOriginClaim {
                            origin,
                            first,
                            second: peer.id,
                        });
                    } else {
                        origin_claims.insert(origin, peer.id);
                    }
                }
            },
            PeerDirection::Outbound => {
                match (&peer.destination_pattern, &peer.incoming_called_pattern) {
                    (None, None) => errors.push(ValidationError::MissingSelector(peer.id)),
                    (Some(_), Some(_)) => {
                        errors.push(ValidationError::ConflictingSelectors(peer.id))
                    }
                    (Some(name), None) => {
                        if !pattern_names.contains(name.as_str()) {
                            errors.push(ValidationError::UnknownPattern {
                                peer: peer.id,
                                pattern: name.clone(),
                            });
                        }
                    }
                    (None, Some(inline)) => {
                        if let Err(e) = regex::Regex::new(inline) {
                            errors.push(ValidationError::InvalidPattern {
                                name: format!("peer {}", peer.id),
                                source: e,
                            });
                        }
                    }
                }
            }
        }

        for translation in &peer.translations {
            if !profile_names.contains(translation.profile.as_str()) {
                errors.push(ValidationError::UnknownProfile {
                    peer: peer.id,
                    profile: translation.profile.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
