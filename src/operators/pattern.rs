use regex::Regex;
use crate::errors::SeedError;
use crate::repository::{ArtifactKind, Candidate, Edit, RepositorySet};
use super::report::ReportBlock;
use super::{block_marker, persist, select, xml_marker, MutationContext, MutationOutcome, Operator, OperatorName};
use tracing::{debug, info, info_span};

/// A regex-located, excerpt-local rewrite over source or resource files.
pub trait PatternRule {
    fn name(&self) -> OperatorName;

    fn kind(&self) -> ArtifactKind;

    fn description(&self) -> &'static str;

    fn patterns(&self) -> &[Regex];

    /// Label of the pattern line in the report, e.g. `setHideOverlayWindows pattern`.
    fn pattern_label(&self) -> &'static str;

    /// Rewrite the candidate's excerpt. Only the returned span of `content`
    /// changes.
    fn transform(&self, candidate: &Candidate, content: &str, ctx: &mut MutationContext<'_>) -> Result<Edit, SeedError>;

    fn mark(&self, edit: &mut Edit, marker: &str) {
        edit.replacement.push(' ');
        edit.replacement.push_str(marker);
    }
}

/// Runs a [`PatternRule`] through the common operator steps.
pub struct PatternOperator<R> {
    rule: R,
}

impl<R: PatternRule> PatternOperator<R> {
    pub fn new(rule: R) -> Self {
        Self { rule }
    }
}

impl<R: PatternRule> Operator for PatternOperator<R> {
    fn name(&self) -> OperatorName {
        self.rule.name()
    }

    fn artifact_kind(&self) -> ArtifactKind {
        self.rule.kind()
    }

    fn description(&self) -> &'static str {
        self.rule.description()
    }

    fn mutate(&self, repos: &mut RepositorySet, ctx: &mut MutationContext<'_>) -> Result<MutationOutcome, SeedError> {
        let name = self.rule.name();
        let _span = info_span!("operator", operator = %name).entered();
        let repo = repos.get(self.rule.kind())?;

        let files = repo.find_files()?;
        info!(kind = %self.rule.kind(), count = files.len(), "Found artifact files");
        for file in files {
            debug!(file = %file.display(), "Artifact");
        }

        let candidates = repo.match_files(self.rule.patterns())?;
        info!(count = candidates.len(), "Found candidates");
        for candidate in &candidates {
            debug!(file = %candidate.file_path.display(), pattern = candidate.pattern_str(), "Candidate");
        }
        if candidates.is_empty() {
            return Ok(MutationOutcome::NoCandidates);
        }

        let marker = match self.rule.kind() {
            ArtifactKind::Source => block_marker(),
            ArtifactKind::Manifest | ArtifactKind::Resource => xml_marker(),
        };

        let mut block = ReportBlock::new(name);
        let mut outputs = Vec::new();
        for (index, candidate) in select(candidates, ctx) {
            info!(file = %candidate.file_path.display(), index = ?index, "Mutating candidate");
            block
                .file("Picked file", &candidate.file_path)
                .field(self.rule.pattern_label(), candidate.pattern_str());

            let content = repo.read(&candidate.file_path)?;
            let mut edit = self.rule.transform(&candidate, &content, ctx)?;
            if ctx.options.comment_mutations {
                self.rule.mark(&mut edit, &marker);
            }
            let mutated = edit.apply(&content)?;
            let output = persist(repo, ctx, &candidate.file_path, &mutated, index)?;

            block.excerpts(&edit.original, &edit.replacement).mutant(index, &output);
            block.line("");
            outputs.push(output);
        }

        Ok(MutationOutcome::Mutated {
            report: block.finish(),
            outputs,
        })
    }
}

/// Replace the first `from` inside the first match of `within` in `excerpt`.
pub fn replace_within(excerpt: &str, within: &Regex, from: &str, to: &str) -> Option<String> {
    let m = within.find(excerpt)?;
    let inner = m.as_str().replacen(from, to, 1);
    if inner == m.as_str() {
        return None;
    }
    Some(format!("{}{}{}", &excerpt[..m.start()], inner, &excerpt[m.end()..]))
}

/// Leading whitespace of the line containing byte `at`.
pub fn line_indent(content: &str, at: usize) -> &str {
    let line_start = content[..at].rfind('\n').map_or(0, |i| i + 1);
    let line = &content[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_within_only_touches_matched_attribute() {
        let within = Regex::new(r#"filterTouchesWhenObscured\s*=\s*"true""#).unwrap();
        let excerpt = r#"<Button android:clickable="true" android:filterTouchesWhenObscured="true" />"#;
        let out = replace_within(excerpt, &within, "true", "false").unwrap();
        assert_eq!(out, r#"<Button android:clickable="true" android:filterTouchesWhenObscured="false" />"#);
    }

    #[test]
    fn test_replace_within_no_match() {
        let within = Regex::new("abc").unwrap();
        assert!(replace_within("xyz", &within, "a", "b").is_none());
    }

    #[test]
    fn test_line_indent() {
        let content = "class A {\n    \tvoid b() {}\n}";
        let at = content.find("void").unwrap();
        assert_eq!(line_indent(content, at), "    \t");
        assert_eq!(line_indent(content, 0), "");
    }
}
