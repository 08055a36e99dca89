//! Compiled route table and egress selection.
//!
//! # Responsibilities
//! - Compile dial-peer configuration into immutable ingress/egress entries
//! - Ingress lookup: first entry claiming the origin, in table order
//! - Egress candidate collection per selection mode, tie-break and
//!   per-origin preferred-id override
//!
//! # Design Decisions
//! - Entries compiled at startup, immutable at runtime; safe to share
//!   across concurrent resolutions without locking
//! - Explicit `None` for no match rather than a silent default
//! - Ingress scan walks table order even though origin claims are unique
//!   after validation: configuration order is the precedence rule
//! - Tie-break and preferences are policy data, not hardcoded ids

use std::collections::HashMap;
use std::sync::Arc;

use crate::call_state::OriginTag;
use crate::config::schema::{
    DialplanConfig, OriginClass, PeerDirection, Phase, PolicyConfig, TieBreak,
};
use crate::config::ConfigError;
use crate::patterns::{PatternCatalog, PhonePattern};
use crate::translate::{TranslationCatalog, TranslationProfile};

/// Egress selection policy, frozen from `[policy]`.
#[derive(Debug, Clone, Default)]
pub struct SelectionPolicy {
    tie_break: TieBreak,
    preferred: HashMap<OriginTag, u32>,
}

impl SelectionPolicy {
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            tie_break: config.tie_break,
            preferred: config
                .preferred
                .iter()
                .map(|(origin, &id)| (OriginTag::new(origin), id))
                .collect(),
        }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Operator-preferred egress peer for an origin, if configured.
    pub fn preferred_for(&self, origin: &OriginTag) -> Option<u32> {
        self.preferred.get(origin).copied()
    }
}

/// An inbound dial-peer: claims calls arriving from one origin.
#[derive(Debug, Clone)]
pub struct IngressPeer {
    pub id: u32,
    pub description: String,
    pub origin: OriginTag,
    pub class: OriginClass,
    pub tls: bool,
    pub srtp: bool,
}

/// How an outbound dial-peer matches the called number.
#[derive(Debug, Clone)]
pub enum EgressSelector {
    /// Named destination pattern (platform-mode selection).
    Destination(Arc<PhonePattern>),
    /// Inline incoming called-number pattern (carrier-mode selection).
    IncomingCalled(Arc<PhonePattern>),
}

impl EgressSelector {
    pub fn pattern(&self) -> &PhonePattern {
        match self {
            EgressSelector::Destination(p) | EgressSelector::IncomingCalled(p) => p,
        }
    }
}

/// A translation profile bound to an outbound peer, with its phase.
#[derive(Debug, Clone)]
pub struct TranslationBinding {
    pub phase: Phase,
    pub profile: Arc<TranslationProfile>,
}

/// An outbound dial-peer: matches where a call is routed next.
#[derive(Debug, Clone)]
pub struct EgressPeer {
    pub id: u32,
    pub description: String,
    pub selector: EgressSelector,
    pub translations: Vec<TranslationBinding>,
    pub tls: bool,
    pub srtp: bool,
}

/// The chosen egress peer plus every candidate that matched, in table
/// order. More than one candidate means the tie-break policy decided.
#[derive(Debug)]
pub struct EgressSelection<'a> {
    pub peer: &'a EgressPeer,
    pub candidates: Vec<u32>,
}

/// Immutable compiled route table.
#[derive(Debug)]
pub struct RouteTable {
    ingress: Vec<IngressPeer>,
    egress: Vec<EgressPeer>,
    policy: SelectionPolicy,
}

impl RouteTable {
    /// Compile a validated configuration into runtime tables. Every
    /// pattern is compiled exactly once; all name references resolve here
    /// or the whole load fails.
    pub fn compile(config: &DialplanConfig) -> Result<Self, ConfigError> {
        let patterns = PatternCatalog::compile(&config.patterns)?;
        let translations = TranslationCatalog::compile(config)?;

        let mut ingress = Vec::new();
        let mut egress = Vec::new();

        for peer in &config.peers {
            match peer.direction {
                PeerDirection::Inbound => {
                    let origin = peer
                        .origin
                        .as_deref()
                        .ok_or_else(|| ConfigError::UnresolvedReference(format!("peer {}", peer.id)))?;
                    ingress.push(IngressPeer {
                        id: peer.id,
                        description: peer.description.clone(),
                        origin: OriginTag::new(origin),
                        class: peer.class,
                        tls: peer.tls,
                        srtp: peer.srtp,
                    });
                }
                PeerDirection::Outbound => {
                    let selector = match (&peer.destination_pattern, &peer.incoming_called_pattern)
                    {
                        (Some(name), None) => {
                            let pattern = patterns.get(name).cloned().ok_or_else(|| {
                                ConfigError::UnresolvedReference(name.clone())
                            })?;
                            EgressSelector::Destination(pattern)
                        }
                        (None, Some(inline)) => {
                            let pattern =
                                PhonePattern::compile(format!("peer {}", peer.id), inline)?;
                            EgressSelector::IncomingCalled(Arc::new(pattern))
                        }
                        _ => {
                            return Err(ConfigError::UnresolvedReference(format!(
                                "peer {} selector",
                                peer.id
                            )))
                        }
                    };

                    let mut bindings = Vec::with_capacity(peer.translations.len());
                    for translation in &peer.translations {
                        let profile = translations
                            .profile(&translation.profile)
                            .cloned()
                            .ok_or_else(|| {
                                ConfigError::UnresolvedReference(translation.profile.clone())
                            })?;
                        bindings.push(TranslationBinding {
                            phase: translation.phase,
                            profile,
                        });
                    }

                    egress.push(EgressPeer {
                        id: peer.id,
                        description: peer.description.clone(),
                        selector,
                        translations: bindings,
                        tls: peer.tls,
                        srtp: peer.srtp,
                    });
                }
            }
        }

        tracing::debug!(
            ingress = ingress.len(),
            egress = egress.len(),
            "route table compiled"
        );

        Ok(Self {
            ingress,
            egress,
            policy: SelectionPolicy::from_config(&config.policy),
        })
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    pub fn ingress_peers(&self) -> &[IngressPeer] {
        &self.ingress
    }

    pub fn egress_peers(&self) -> &[EgressPeer] {
        &self.egress
    }

    /// First ingress peer claiming `origin`, scanning in table order.
    pub fn ingress_for(&self, origin: &OriginTag) -> Option<&IngressPeer> {
        self.ingress.iter().find(|peer| &peer.origin == origin)
    }

    /// Select an egress peer for the current called number.
    ///
    /// Carrier-class origins match inline incoming called-number patterns;
    /// everything else matches named destination patterns. When several
    /// candidates match, the tie-break policy picks one, except that a
    /// configured preferred peer for this origin wins outright.
    pub fn select_egress(
        &self,
        origin: &OriginTag,
        class: OriginClass,
        called: &str,
    ) -> Option<EgressSelection<'_>> {
        let matched: Vec<&EgressPeer> = self
            .egress
            .iter()
            .filter(|peer| match (&peer.selector, class) {
                (EgressSelector::IncomingCalled(p), OriginClass::Carrier) => p.is_match(called),
                (EgressSelector::Destination(p), OriginClass::Platform) => p.is_match(called),
                _ => false,
            })
            .collect();

        if matched.is_empty() {
            return None;
        }
        let candidates: Vec<u32> = matched.iter().map(|peer| peer.id).collect();

        if let Some(preferred) = self.policy.preferred_for(origin) {
            if let Some(peer) = matched.iter().copied().find(|peer| peer.id == preferred) {
                return Some(EgressSelection { peer, candidates });
            }
        }

        let peer = match self.policy.tie_break {
            TieBreak::TableOrder => matched[0],
            TieBreak::LongestPattern => {
                let mut best = matched[0];
                for &peer in &matched[1..] {
                    // Strictly longer wins; equal lengths keep table order.
                    if peer.selector.pattern().source().len()
                        > best.selector.pattern().source().len()
                    {
                        best = peer;
                    }
                }
                best
            }
        };

        Some(EgressSelection { peer, candidates })
    }
}
