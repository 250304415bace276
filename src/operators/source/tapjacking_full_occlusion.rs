use regex::Regex;
use crate::errors::SeedError;
use crate::operators::pattern::PatternRule;
use crate::operators::{MutationContext, OperatorName};
use crate::repository::{ArtifactKind, Candidate, Edit};
use super::TrueLiteral;

/// Disables touch filtering set from code, so a view accepts touches while
/// fully covered by another window.
pub struct TapjackingFullOcclusionJava {
    patterns: Vec<Regex>,
    literal: TrueLiteral,
}

impl TapjackingFullOcclusionJava {
    pub fn new() -> Result<Self, SeedError> {
        Ok(Self {
            patterns: vec![
                // Java setter
                Regex::new(r"\.\s*setFilterTouchesWhenObscured\s*\(\s*true\s*\)")?,
                // Kotlin property
                Regex::new(r"\.\s*filterTouchesWhenObscured\s*=\s*true\b")?,
            ],
            literal: TrueLiteral::new()?,
        })
    }
}

impl PatternRule for TapjackingFullOcclusionJava {
    fn name(&self) -> OperatorName {
        OperatorName::TapjackingFullOcclusionJava
    }

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Source
    }

    fn description(&self) -> &'static str {
        "Turn filterTouchesWhenObscured off in Java/Kotlin code"
    }

    fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    fn pattern_label(&self) -> &'static str {
        "filterTouchesWhenObscured pattern"
    }

    fn transform(&self, candidate: &Candidate, _content: &str, _ctx: &mut MutationContext<'_>) -> Result<Edit, SeedError> {
        Ok(candidate.edit(self.literal.flip(&candidate.matched_excerpt)?))
    }
}
