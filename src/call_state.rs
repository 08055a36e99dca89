//! Per-resolution call state.
//!
//! A [`CallState`] is constructed at the start of one resolution, populated
//! (or short-circuited on the first fatal condition) and returned to the
//! caller. It is never mutated after return and owns nothing beyond the
//! single call. Failures travel as data on the record, never as panics.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::schema::{NumberField, Phase};

/// Normalized origin identity tag (e.g. "zoom", "cucm", "itsp").
///
/// Tags compare case-insensitively: both config and caller input are
/// lowercased on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OriginTag(String);

impl OriginTag {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OriginTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OriginTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Fatal per-call resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolveError {
    /// No configured ingress peer claims the origin.
    #[error("no ingress dial-peer matches origin \"{origin}\"")]
    NoIngressMatch { origin: String },

    /// Ingress succeeded but no egress peer matches the called number.
    #[error("no egress dial-peer matches called number \"{called}\"")]
    NoEgressMatch { called: String },
}

/// Recoverable conditions attached to an otherwise successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Several egress peers matched; the tie-break policy picked one.
    AmbiguousEgressMatch { selected: u32, candidates: Vec<u32> },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::AmbiguousEgressMatch { selected, candidates } => write!(
                f,
                "multiple egress dial-peers matched ({:?}); selected {}",
                candidates, selected
            ),
        }
    }
}

/// Destination platform derived from the selected egress description.
/// Informational metadata only, never routing logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationPlatform {
    Cucm,
    Zoom,
    Pstn,
    Unknown,
}

impl DestinationPlatform {
    /// Classify from the descriptive tag of an egress peer.
    ///
    /// Peer descriptions follow an `X_TO_Y` naming convention; the segment
    /// after the last `_TO_` names the destination side. Falls back to a
    /// whole-description scan when the convention is absent.
    pub fn classify(description: &str) -> Self {
        let head = description.split_whitespace().next().unwrap_or("");
        let tag = match head.rsplit_once("_TO_") {
            Some((_, destination)) => destination,
            None => description,
        };
        Self::from_tag(tag)
    }

    fn from_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        if tag.contains("cucm") {
            DestinationPlatform::Cucm
        } else if tag.contains("zoom") {
            DestinationPlatform::Zoom
        } else if tag.contains("itsp") || tag.contains("pstn") {
            DestinationPlatform::Pstn
        } else {
            DestinationPlatform::Unknown
        }
    }
}

/// Snapshot of a selected dial-peer with the party numbers at that hop:
/// as received for the ingress peer, as sent onward for the egress peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerSnapshot {
    pub id: u32,
    pub description: String,
    pub tls: bool,
    pub srtp: bool,
    pub calling: String,
    pub called: String,
}

/// One entry in the ordered per-call event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowStep {
    Start {
        calling: String,
        called: String,
    },
    IngressSelected {
        peer: u32,
        description: String,
    },
    EgressSelected {
        peer: u32,
        description: String,
    },
    TranslationApplied {
        phase: Phase,
        field: NumberField,
        profile: String,
        rule: String,
        old: String,
        new: String,
    },
    /// A profile ran but its rule did not match; the number is unchanged.
    TranslationSkipped {
        phase: Phase,
        field: NumberField,
        profile: String,
    },
    Warning {
        message: String,
    },
    Failed {
        message: String,
    },
    Completed {
        calling: String,
        called: String,
    },
}

/// The result record of one resolution.
#[derive(Debug, Clone, Serialize)]
pub struct CallState {
    /// Correlation id for this resolution.
    pub call_id: Uuid,

    pub origin: OriginTag,
    pub initial_calling: String,
    pub initial_called: String,

    pub ingress: Option<PeerSnapshot>,
    pub egress: Option<PeerSnapshot>,
    pub destination_platform: Option<DestinationPlatform>,

    /// Calling-party value after each translation applied to it.
    pub calling_history: Vec<String>,
    /// Called-party value after each translation applied to it.
    pub called_history: Vec<String>,

    pub final_calling: Option<String>,
    pub final_called: Option<String>,

    /// Full event log in call order.
    pub steps: Vec<FlowStep>,
    pub warnings: Vec<Warning>,
    pub error: Option<ResolveError>,
}

impl CallState {
    /// Start a new resolution record; logs the `start` step.
    pub fn new(origin: OriginTag, calling: &str, called: &str) -> Self {
        Self {
            call_id: Uuid::new_v4(),
            origin,
            initial_calling: calling.to_string(),
            initial_called: called.to_string(),
            ingress: None,
            egress: None,
            destination_platform: None,
            calling_history: Vec::new(),
            called_history: Vec::new(),
            final_calling: None,
            final_called: None,
            steps: vec![FlowStep::Start {
                calling: calling.to_string(),
                called: called.to_string(),
            }],
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn push_step(&mut self, step: FlowStep) {
        self.steps.push(step);
    }

    /// Attach a recoverable warning; also mirrored into the event log.
    pub fn add_warning(&mut self, warning: Warning) {
        self.steps.push(FlowStep::Warning {
            message: warning.to_string(),
        });
        self.warnings.push(warning);
    }

    /// Terminate the resolution with a fatal error. Steps recorded so far
    /// are retained; the final number fields stay unset.
    pub fn fail(&mut self, error: ResolveError) {
        self.steps.push(FlowStep::Failed {
            message: error.to_string(),
        });
        self.error = Some(error);
    }

    /// Record the post-step value of one field.
    pub fn record_field(&mut self, field: NumberField, value: &str) {
        match field {
            NumberField::Calling => self.calling_history.push(value.to_string()),
            NumberField::Called => self.called_history.push(value.to_string()),
        }
    }

    /// True when the resolution ran to completion.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.final_calling.is_some() && self.final_called.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_tag_normalizes() {
        assert_eq!(OriginTag::new("  ZOOM "), OriginTag::new("zoom"));
        assert_eq!(OriginTag::new("Cucm").as_str(), "cucm");
    }

    #[test]
    fn test_classify_destination_platform() {
        assert_eq!(
            DestinationPlatform::classify("OUT_ZOOM_TO_CUCM (internal)"),
            DestinationPlatform::Cucm
        );
        assert_eq!(
            DestinationPlatform::classify("IN_ITSP_TO_ZOOM (PSTN DID to Zoom)"),
            DestinationPlatform::Zoom
        );
        // The destination side wins, not the first platform named.
        assert_eq!(
            DestinationPlatform::classify("OUT_ZOOM_TO_ITSP (Zoom to PSTN - CPN passthrough)"),
            DestinationPlatform::Pstn
        );
        assert_eq!(
            DestinationPlatform::classify("toward the carrier PSTN trunk"),
            DestinationPlatform::Pstn
        );
        assert_eq!(
            DestinationPlatform::classify("lab loopback"),
            DestinationPlatform::Unknown
        );
    }

    #[test]
    fn test_new_state_records_start_step() {
        let state = CallState::new(OriginTag::new("zoom"), "101001", "301001");
        assert_eq!(state.steps.len(), 1);
        assert!(matches!(state.steps[0], FlowStep::Start { .. }));
        assert!(!state.is_complete());
    }

    #[test]
    fn test_fail_retains_prior_steps() {
        let mut state = CallState::new(OriginTag::new("pbx"), "100", "200");
        state.fail(ResolveError::NoIngressMatch {
            origin: "pbx".into(),
        });
        assert_eq!(state.steps.len(), 2);
        assert!(state.error.is_some());
        assert!(state.final_calling.is_none());
    }
}
