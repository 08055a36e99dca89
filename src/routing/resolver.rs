//! Per-call resolution orchestration.
//!
//! One resolution walks START → ingress matched → egress matched →
//! translating → done, with a terminal failure from the first two stages
//! when nothing matches. No stage is re-entered; the working copy of the
//! party numbers is threaded explicitly from stage to stage and the event
//! log captures every decision in call order.

use crate::call_state::{
    CallState, DestinationPlatform, FlowStep, OriginTag, PeerSnapshot, ResolveError, Warning,
};
use crate::config::schema::{DialplanConfig, Phase};
use crate::config::ConfigError;
use crate::routing::table::RouteTable;
use crate::translate::WorkingNumbers;

/// The call resolver. Holds only immutable compiled tables, so one
/// instance may serve concurrent resolutions without locking.
#[derive(Debug)]
pub struct Resolver {
    table: RouteTable,
}

impl Resolver {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    /// Compile a validated configuration into a ready resolver.
    pub fn from_config(config: &DialplanConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(RouteTable::compile(config)?))
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolve one call. Always returns a fully formed [`CallState`]:
    /// fatal conditions are recorded on the state with the steps so far
    /// retained, never raised.
    pub fn resolve(&self, origin: OriginTag, calling: &str, called: &str) -> CallState {
        let mut state = CallState::new(origin.clone(), calling, called);
        let mut working = WorkingNumbers::new(calling, called);

        // Ingress: first entry claiming the origin, table order.
        let ingress = match self.table.ingress_for(&origin) {
            Some(ingress) => ingress,
            None => {
                tracing::warn!(call_id = %state.call_id, %origin, "no ingress dial-peer");
                state.fail(ResolveError::NoIngressMatch {
                    origin: origin.to_string(),
                });
                return state;
            }
        };
        tracing::info!(
            call_id = %state.call_id,
            peer_id = ingress.id,
            %origin,
            "ingress dial-peer selected"
        );
        state.ingress = Some(PeerSnapshot {
            id: ingress.id,
            description: ingress.description.clone(),
            tls: ingress.tls,
            srtp: ingress.srtp,
            calling: working.calling.clone(),
            called: working.called.clone(),
        });
        state.push_step(FlowStep::IngressSelected {
            peer: ingress.id,
            description: ingress.description.clone(),
        });

        // Egress: candidates per selection mode, tie-break + preference.
        let selection = match self.table.select_egress(&origin, ingress.class, &working.called) {
            Some(selection) => selection,
            None => {
                tracing::warn!(
                    call_id = %state.call_id,
                    called = %working.called,
                    "no egress dial-peer"
                );
                state.fail(ResolveError::NoEgressMatch {
                    called: working.called.clone(),
                });
                return state;
            }
        };
        let egress = selection.peer;
        if selection.candidates.len() > 1 {
            state.add_warning(Warning::AmbiguousEgressMatch {
                selected: egress.id,
                candidates: selection.candidates.clone(),
            });
        }
        tracing::info!(
            call_id = %state.call_id,
            peer_id = egress.id,
            candidates = selection.candidates.len(),
            "egress dial-peer selected"
        );
        state.push_step(FlowStep::EgressSelected {
            peer: egress.id,
            description: egress.description.clone(),
        });
        state.destination_platform = Some(DestinationPlatform::classify(&egress.description));

        // Translations: all incoming-phase profiles, then all outgoing,
        // each phase in listed order. Phases never interleave.
        for phase in [Phase::Incoming, Phase::Outgoing] {
            for binding in egress
                .translations
                .iter()
                .filter(|binding| binding.phase == phase)
            {
                binding.profile.apply(phase, &mut working, &mut state);
            }
        }

        state.egress = Some(PeerSnapshot {
            id: egress.id,
            description: egress.description.clone(),
            tls: egress.tls,
            srtp: egress.srtp,
            calling: working.calling.clone(),
            called: working.called.clone(),
        });
        state.final_calling = Some(working.calling.clone());
        state.final_called = Some(working.called.clone());
        state.push_step(FlowStep::Completed {
            calling: working.calling,
            called: working.called,
        });

        tracing::info!(
            call_id = %state.call_id,
            final_calling = %state.final_calling.as_deref().unwrap_or_default(),
            final_called = %state.final_called.as_deref().unwrap_or_default(),
            "resolution complete"
        );
        state
    }
}
