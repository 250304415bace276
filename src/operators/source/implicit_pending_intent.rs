use regex::Regex;
use crate::errors::SeedError;
use crate::operators::pattern::PatternRule;
use crate::operators::{MutationContext, OperatorName};
use crate::repository::{ArtifactKind, Candidate, Edit};

/// `PendingIntent.getX(..., FLAG_IMMUTABLE)` becomes `FLAG_MUTABLE`, so the
/// receiving app may fill in the wrapped intent.
pub struct ImplicitPendingIntent {
    patterns: Vec<Regex>,
    flag: Regex,
}

impl ImplicitPendingIntent {
    pub fn new() -> Result<Self, SeedError> {
        Ok(Self {
            patterns: vec![Regex::new(
                r"PendingIntent\s*\.\s*get(?:Activity|Activities|Broadcast|Service|ForegroundService)\s*\([^;{}]*?\bFLAG_IMMUTABLE\b[^;{}]*?\)",
            )?],
            flag: Regex::new(r"\bFLAG_IMMUTABLE\b")?,
        })
    }
}

impl PatternRule for ImplicitPendingIntent {
    fn name(&self) -> OperatorName {
        OperatorName::ImplicitPendingIntent
    }

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Source
    }

    fn description(&self) -> &'static str {
        "Make an immutable PendingIntent mutable (FLAG_IMMUTABLE -> FLAG_MUTABLE)"
    }

    fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    fn pattern_label(&self) -> &'static str {
        "PendingIntent pattern"
    }

    fn transform(&self, candidate: &Candidate, _content: &str, _ctx: &mut MutationContext<'_>) -> Result<Edit, SeedError> {
        let mutated = self
            .flag
            .replacen(&candidate.matched_excerpt, 1, "FLAG_MUTABLE")
            .into_owned();
        Ok(candidate.edit(mutated))
    }
}
