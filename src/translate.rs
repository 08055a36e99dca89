//! Translation profiles and their application to a call in flight.
//!
//! # Design Decisions
//! - Rules and profiles are compiled once and shared via `Arc`; many
//!   profiles may bind the same rule under different names
//! - Applying a profile touches only the per-call working copy of the
//!   numbers and the per-call event log, never the catalogs
//! - A non-matching rule records an informational no-op event

use std::collections::HashMap;
use std::sync::Arc;

use crate::call_state::{CallState, FlowStep};
use crate::config::schema::{DialplanConfig, NumberField, Phase};
use crate::config::ConfigError;
use crate::patterns::RewriteRule;

/// Working copy of the party numbers threaded through one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingNumbers {
    pub calling: String,
    pub called: String,
}

impl WorkingNumbers {
    pub fn new(calling: &str, called: &str) -> Self {
        Self {
            calling: calling.to_string(),
            called: called.to_string(),
        }
    }

    pub fn get(&self, field: NumberField) -> &str {
        match field {
            NumberField::Calling => &self.calling,
            NumberField::Called => &self.called,
        }
    }

    fn set(&mut self, field: NumberField, value: String) {
        match field {
            NumberField::Calling => self.calling = value,
            NumberField::Called => self.called = value,
        }
    }
}

/// A named binding of a rewrite rule to a number field.
#[derive(Debug, Clone)]
pub struct TranslationProfile {
    name: String,
    target: NumberField,
    rule: Arc<RewriteRule>,
}

impl TranslationProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> NumberField {
        self.target
    }

    pub fn rule(&self) -> &RewriteRule {
        &self.rule
    }

    /// Apply this profile to the working numbers, logging the outcome on
    /// the call state.
    pub fn apply(&self, phase: Phase, working: &mut WorkingNumbers, state: &mut CallState) {
        let old = working.get(self.target).to_string();
        let new = self.rule.apply(&old);

        if new == old {
            tracing::debug!(
                profile = %self.name,
                field = %self.target,
                %phase,
                "translation did not match, number unchanged"
            );
            state.push_step(FlowStep::TranslationSkipped {
                phase,
                field: self.target,
                profile: self.name.clone(),
            });
            return;
        }

        tracing::debug!(
            profile = %self.name,
            rule = %self.rule.name(),
            field = %self.target,
            %phase,
            %old,
            %new,
            "translation applied"
        );
        state.push_step(FlowStep::TranslationApplied {
            phase,
            field: self.target,
            profile: self.name.clone(),
            rule: self.rule.name().to_string(),
            old,
            new: new.clone(),
        });
        state.record_field(self.target, &new);
        working.set(self.target, new);
    }
}

/// Compiled rule and profile tables, immutable after load.
#[derive(Debug, Default)]
pub struct TranslationCatalog {
    rules: HashMap<String, Arc<RewriteRule>>,
    profiles: HashMap<String, Arc<TranslationProfile>>,
}

impl TranslationCatalog {
    pub fn compile(config: &DialplanConfig) -> Result<Self, ConfigError> {
        let mut rules = HashMap::new();
        for rule_config in &config.rules {
            let rule = RewriteRule::compile(rule_config)?;
            rules.insert(rule_config.name.clone(), Arc::new(rule));
        }

        let mut profiles = HashMap::new();
        for profile_config in &config.profiles {
            let rule = rules
                .get(&profile_config.rule)
                .cloned()
                .ok_or_else(|| ConfigError::UnresolvedReference(profile_config.rule.clone()))?;
            profiles.insert(
                profile_config.name.clone(),
                Arc::new(TranslationProfile {
                    name: profile_config.name.clone(),
                    target: profile_config.target,
                    rule,
                }),
            );
        }

        Ok(Self { rules, profiles })
    }

    pub fn profile(&self, name: &str) -> Option<&Arc<TranslationProfile>> {
        self.profiles.get(name)
    }

    pub fn rule(&self, name: &str) -> Option<&Arc<RewriteRule>> {
        self.rules.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_state::OriginTag;

    fn catalog() -> TranslationCatalog {
        let config: DialplanConfig = toml::from_str(
            r#"
            [[rules]]
            name = "301"
            target = "called"
            pattern = '^\+1620555(\d{4})$'
            replace = "101$1"

            [[profiles]]
            name = "IN_PSTN_TO_ZOOM"
            target = "called"
            rule = "301"

            [[profiles]]
            name = "ALIAS"
            target = "called"
            rule = "301"
        "#,
        )
        .unwrap();
        TranslationCatalog::compile(&config).unwrap()
    }

    #[test]
    fn test_profiles_share_rules() {
        let catalog = catalog();
        let a = catalog.profile("IN_PSTN_TO_ZOOM").unwrap();
        let b = catalog.profile("ALIAS").unwrap();
        assert!(Arc::ptr_eq(&a.rule, &b.rule));
    }

    #[test]
    fn test_apply_updates_working_copy_and_logs() {
        let catalog = catalog();
        let profile = catalog.profile("IN_PSTN_TO_ZOOM").unwrap();
        let mut state = CallState::new(OriginTag::new("itsp"), "+1234567890", "+16205558080");
        let mut working = WorkingNumbers::new("+1234567890", "+16205558080");

        profile.apply(Phase::Outgoing, &mut working, &mut state);

        assert_eq!(working.called, "1018080");
        assert_eq!(working.calling, "+1234567890");
        assert_eq!(state.called_history, vec!["1018080".to_string()]);
        assert!(matches!(
            state.steps.last(),
            Some(FlowStep::TranslationApplied { new, .. }) if new == "1018080"
        ));
    }

    #[test]
    fn test_apply_no_match_records_noop() {
        let catalog = catalog();
        let profile = catalog.profile("IN_PSTN_TO_ZOOM").unwrap();
        let mut state = CallState::new(OriginTag::new("cucm"), "301001", "101001");
        let mut working = WorkingNumbers::new("301001", "101001");

        profile.apply(Phase::Incoming, &mut working, &mut state);

        assert_eq!(working.called, "101001");
        assert!(state.called_history.is_empty());
        assert!(matches!(
            state.steps.last(),
            Some(FlowStep::TranslationSkipped { .. })
        ));
    }
}
