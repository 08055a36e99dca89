//! End-to-end call flows over the example dialplan.
//!
//! These follow the lab calling-plan matrix: Zoom Phone, CUCM and a PSTN
//! carrier (ITSP) bridged by one border element. The PSTN-bound scenarios
//! use `+14085551234` as the far-end number; the matrix sheet shows
//! `+1234567890`, which is one digit short of the NANP pattern the plan
//! actually routes on.

use dialplan_sim::{
    parse_config, CallState, DestinationPlatform, FlowStep, OriginTag, ResolveError, Resolver,
    Warning,
};

fn resolver() -> Resolver {
    let config = parse_config(include_str!("../dialplan.example.toml")).unwrap();
    Resolver::from_config(&config).unwrap()
}

fn resolve(origin: &str, calling: &str, called: &str) -> CallState {
    resolver().resolve(OriginTag::new(origin), calling, called)
}

#[test]
fn zoom_extension_to_cucm_extension() {
    let state = resolve("zoom", "101001", "301001");

    assert!(state.error.is_none());
    assert_eq!(state.ingress.as_ref().unwrap().id, 1000);
    assert_eq!(state.egress.as_ref().unwrap().id, 1010);
    assert_eq!(state.destination_platform, Some(DestinationPlatform::Cucm));
    assert!(state.warnings.is_empty());

    // The CPN profile on 1010 targets the Zoom DID, not this extension:
    // recorded as a no-op, numbers pass through unchanged.
    assert!(state
        .steps
        .iter()
        .any(|s| matches!(s, FlowStep::TranslationSkipped { .. })));
    assert_eq!(state.final_calling.as_deref(), Some("101001"));
    assert_eq!(state.final_called.as_deref(), Some("301001"));
}

#[test]
fn cucm_extension_to_zoom_extension() {
    let state = resolve("cucm", "301001", "101001");

    assert!(state.error.is_none());
    assert_eq!(state.ingress.as_ref().unwrap().id, 2000);
    assert_eq!(state.egress.as_ref().unwrap().id, 2010);
    assert_eq!(state.destination_platform, Some(DestinationPlatform::Zoom));

    // No translations configured on this route at all.
    assert!(!state
        .steps
        .iter()
        .any(|s| matches!(s, FlowStep::TranslationApplied { .. })));
    assert!(state.calling_history.is_empty());
    assert!(state.called_history.is_empty());
    assert_eq!(state.final_calling.as_deref(), Some("301001"));
    assert_eq!(state.final_called.as_deref(), Some("101001"));
}

#[test]
fn zoom_to_pstn_cpn_passthrough() {
    let state = resolve("zoom", "+16205558080", "+14085551234");

    assert!(state.error.is_none());
    // Both ITSP routes match the NANP pattern; the Zoom preference picks
    // its own trunk and the ambiguity is surfaced as a warning.
    assert_eq!(state.egress.as_ref().unwrap().id, 1100);
    assert_eq!(
        state.warnings,
        vec![Warning::AmbiguousEgressMatch {
            selected: 1100,
            candidates: vec![1100, 2100]
        }]
    );
    assert_eq!(state.destination_platform, Some(DestinationPlatform::Pstn));
    assert_eq!(state.final_calling.as_deref(), Some("+16205558080"));
    assert_eq!(state.final_called.as_deref(), Some("+14085551234"));
}

#[test]
fn pstn_to_zoom_did_translated() {
    let state = resolve("itsp", "+1234567890", "+16205558080");

    assert!(state.error.is_none());
    assert_eq!(state.ingress.as_ref().unwrap().id, 3000);
    assert_eq!(state.egress.as_ref().unwrap().id, 3010);
    assert_eq!(state.destination_platform, Some(DestinationPlatform::Zoom));
    assert!(state.warnings.is_empty());

    assert_eq!(state.final_calling.as_deref(), Some("+1234567890"));
    assert_eq!(state.final_called.as_deref(), Some("1018080"));
    assert_eq!(state.called_history, vec!["1018080".to_string()]);
    assert!(state.steps.iter().any(|s| matches!(
        s,
        FlowStep::TranslationApplied { profile, .. } if profile == "IN_PSTN_TO_ZOOM"
    )));
}

#[test]
fn cucm_to_pstn_cpn_translated() {
    let state = resolve("cucm", "301001", "+14085551234");

    assert!(state.error.is_none());
    assert_eq!(state.egress.as_ref().unwrap().id, 2100);
    assert_eq!(
        state.warnings,
        vec![Warning::AmbiguousEgressMatch {
            selected: 2100,
            candidates: vec![1100, 2100]
        }]
    );
    assert_eq!(state.final_calling.as_deref(), Some("+13035553001"));
    assert_eq!(state.final_called.as_deref(), Some("+14085551234"));
    assert_eq!(state.calling_history, vec!["+13035553001".to_string()]);
}

#[test]
fn pstn_to_cucm_did_translated() {
    let state = resolve("itsp", "+1234567890", "+13035553001");

    assert!(state.error.is_none());
    assert_eq!(state.egress.as_ref().unwrap().id, 3020);
    assert_eq!(state.destination_platform, Some(DestinationPlatform::Cucm));
    assert_eq!(state.final_called.as_deref(), Some("301001"));
}

#[test]
fn every_configured_origin_finds_ingress() {
    let resolver = resolver();
    for origin in ["zoom", "cucm", "itsp"] {
        let state = resolver.resolve(OriginTag::new(origin), "100", "200");
        assert!(
            !matches!(state.error, Some(ResolveError::NoIngressMatch { .. })),
            "origin {origin} should always have an ingress peer"
        );
    }
}

#[test]
fn unknown_origin_is_a_clean_failure() {
    let state = resolve("teams", "101001", "301001");

    assert_eq!(
        state.error,
        Some(ResolveError::NoIngressMatch {
            origin: "teams".into()
        })
    );
    assert!(state.ingress.is_none());
    assert!(state.egress.is_none());
    assert!(state.warnings.is_empty());
    assert!(state.final_calling.is_none() && state.final_called.is_none());
}

#[test]
fn malformed_number_is_an_ordinary_no_match() {
    // Garbage input is not a validation error, it just fails to match.
    let state = resolve("zoom", "", "not-a-number");
    assert!(matches!(
        state.error,
        Some(ResolveError::NoEgressMatch { .. })
    ));
    assert_eq!(state.ingress.as_ref().unwrap().id, 1000);
}

#[test]
fn call_state_serializes_for_display() {
    let state = resolve("itsp", "+1234567890", "+16205558080");
    let json = serde_json::to_value(&state).unwrap();

    assert_eq!(json["origin"], "itsp");
    assert_eq!(json["final_called"], "1018080");
    assert_eq!(json["egress"]["id"], 3010);
    assert_eq!(json["steps"][0]["type"], "start");
    assert!(json["call_id"].as_str().is_some());
}
