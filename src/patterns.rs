//! Number pattern matching and rewriting.
//!
//! # Responsibilities
//! - Compile pattern sources once, at load time
//! - Match a phone number against a compiled pattern (pure, no cursor)
//! - Apply a rewrite rule with single-shot replace semantics
//!
//! # Design Decisions
//! - Patterns are immutable after compilation and safe to share
//! - Matching always returns a fresh [`MatchResult`]; there is no reusable
//!   matcher object carrying internal position state
//! - A rule whose pattern does not match returns the number unchanged,
//!   which is an ordinary outcome, not an error
//! - Only the first match is substituted (parity with single-shot replace,
//!   not global replace)

use regex::Regex;
use thiserror::Error;

use crate::config::schema::{NumberField, RuleConfig};

/// A stored pattern failed to compile.
#[derive(Debug, Error)]
#[error("pattern \"{name}\" failed to compile: {source}")]
pub struct PatternError {
    pub name: String,
    #[source]
    pub source: regex::Error,
}

/// An immutable compiled matcher over a phone number.
#[derive(Debug, Clone)]
pub struct PhonePattern {
    name: String,
    source: String,
    regex: Regex,
}

impl PhonePattern {
    /// Compile a pattern source under a catalog name.
    pub fn compile(name: impl Into<String>, source: impl Into<String>) -> Result<Self, PatternError> {
        let name = name.into();
        let source = source.into();
        let regex = Regex::new(&source).map_err(|e| PatternError {
            name: name.clone(),
            source: e,
        })?;
        Ok(Self { name, source, regex })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw pattern source; its length is the specificity proxy used by the
    /// longest-pattern tie-break.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when the pattern matches anywhere in `number`.
    pub fn is_match(&self, number: &str) -> bool {
        self.regex.is_match(number)
    }

    /// Match `number`, returning a fresh result with capture groups.
    /// Group 0 is the whole match; unparticipating groups are `None`.
    pub fn find(&self, number: &str) -> MatchResult {
        match self.regex.captures(number) {
            None => MatchResult {
                matched: false,
                groups: Vec::new(),
            },
            Some(captures) => MatchResult {
                matched: true,
                groups: captures
                    .iter()
                    .map(|g| g.map(|m| m.as_str().to_string()))
                    .collect(),
            },
        }
    }
}

/// Outcome of matching one pattern against one number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    /// Captured substrings, group 0 first.
    pub groups: Vec<Option<String>>,
}

/// A rewrite rule: pattern plus replacement template, bound to one field.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    name: String,
    target: NumberField,
    pattern: PhonePattern,
    template: String,
}

impl RewriteRule {
    /// Compile a rule from its configuration.
    pub fn compile(config: &RuleConfig) -> Result<Self, PatternError> {
        Ok(Self {
            name: config.name.clone(),
            target: config.target,
            pattern: PhonePattern::compile(&config.name, &config.pattern)?,
            template: config.replace.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> NumberField {
        self.target
    }

    /// Apply the rule to a number.
    ///
    /// If the pattern does not match, the number comes back unchanged.
    /// Otherwise the first match is replaced per the template, with `$1`..
    /// resolving to capture groups and `$0` to the whole match; any
    /// non-matched prefix/suffix is preserved.
    pub fn apply(&self, number: &str) -> String {
        self.pattern
            .regex
            .replace(number, self.template.as_str())
            .into_owned()
    }
}

/// Catalog of named destination-number patterns, compiled once at load.
#[derive(Debug, Default)]
pub struct PatternCatalog {
    patterns: std::collections::HashMap<String, std::sync::Arc<PhonePattern>>,
}

impl PatternCatalog {
    pub fn compile(configs: &[crate::config::schema::PatternConfig]) -> Result<Self, PatternError> {
        let mut patterns = std::collections::HashMap::new();
        for config in configs {
            let pattern = PhonePattern::compile(&config.name, &config.pattern)?;
            patterns.insert(config.name.clone(), std::sync::Arc::new(pattern));
        }
        Ok(Self { patterns })
    }

    pub fn get(&self, name: &str) -> Option<&std::sync::Arc<PhonePattern>> {
        self.patterns.get(name)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
