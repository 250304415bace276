use regex::Regex;
use crate::errors::SeedError;
use crate::operators::pattern::PatternRule;
use crate::operators::{MutationContext, OperatorName};
use crate::repository::{ArtifactKind, Candidate, Edit};
use super::TrueLiteral;

/// `.setHideOverlayWindows(true)` becomes `.setHideOverlayWindows(false)`,
/// letting overlay windows draw over the activity again.
pub struct TapjackingSetHideOverlayWindows {
    patterns: Vec<Regex>,
    literal: TrueLiteral,
}

impl TapjackingSetHideOverlayWindows {
    pub fn new() -> Result<Self, SeedError> {
        Ok(Self {
            // same call shape in Java and Kotlin
            patterns: vec![Regex::new(r"\.\s*setHideOverlayWindows\s*\(\s*true\s*\)")?],
            literal: TrueLiteral::new()?,
        })
    }
}

impl PatternRule for TapjackingSetHideOverlayWindows {
    fn name(&self) -> OperatorName {
        OperatorName::TapjackingSetHideOverlayWindows
    }

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Source
    }

    fn description(&self) -> &'static str {
        "Turn setHideOverlayWindows(true) into false so overlays can cover the window"
    }

    fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    fn pattern_label(&self) -> &'static str {
        "setHideOverlayWindows pattern"
    }

    fn transform(&self, candidate: &Candidate, _content: &str, _ctx: &mut MutationContext<'_>) -> Result<Edit, SeedError> {
        Ok(candidate.edit(self.literal.flip(&candidate.matched_excerpt)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::source::testing::{candidate, Harness};

    #[test]
    fn test_flips_only_the_call_argument() {
        let rule = TapjackingSetHideOverlayWindows::new().unwrap();
        let content = "boolean keep = true;\ngetWindow()\n    .setHideOverlayWindows(true);\n";
        let c = candidate("A.java", content, &rule.patterns()[0]);
        let mut h = Harness::new();
        let edit = rule.transform(&c, content, &mut h.ctx()).unwrap();
        assert_eq!(
            edit.apply(content).unwrap(),
            "boolean keep = true;\ngetWindow()\n    .setHideOverlayWindows(false);\n"
        );
    }

    #[test]
    fn test_false_argument_is_not_a_candidate() {
        let rule = TapjackingSetHideOverlayWindows::new().unwrap();
        assert!(!rule.patterns()[0].is_match("window.setHideOverlayWindows(false)"));
    }
}
