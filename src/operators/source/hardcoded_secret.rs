use data_encoding::HEXLOWER;
use rand::RngCore;
use regex::Regex;
use crate::errors::SeedError;
use crate::operators::pattern::{line_indent, PatternRule};
use crate::operators::{MutationContext, OperatorName};
use crate::repository::{ArtifactKind, Candidate, Edit, SourceLanguage};
use tracing::debug;

const SECRET_BYTES: usize = 256;

/// Plants a high-entropy string constant at the top of a class body.
pub struct HardcodedSecret {
    patterns: Vec<Regex>,
}

impl HardcodedSecret {
    pub fn new() -> Result<Self, SeedError> {
        Ok(Self {
            // header up to the opening brace, Java and Kotlin alike
            patterns: vec![Regex::new(r"(?s)\bclass\s+[A-Za-z0-9_]+.*?\{")?],
        })
    }

    fn field(language: SourceLanguage, indent: &str, secret: &str) -> String {
        match language {
            SourceLanguage::Java => format!("\n\n{indent}private static final String KEY = \"{secret}\";\n"),
            SourceLanguage::Kotlin => format!("\n\n{indent}private const val KEY = \"{secret}\"\n"),
        }
    }
}

impl PatternRule for HardcodedSecret {
    fn name(&self) -> OperatorName {
        OperatorName::HardcodedSecret
    }

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Source
    }

    fn description(&self) -> &'static str {
        "Insert a hardcoded 256-byte hex secret at the start of a class body"
    }

    fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    fn pattern_label(&self) -> &'static str {
        "class definition pattern"
    }

    fn transform(&self, candidate: &Candidate, content: &str, ctx: &mut MutationContext<'_>) -> Result<Edit, SeedError> {
        let language = SourceLanguage::from_path(&candidate.file_path).ok_or_else(|| {
            SeedError::Operator(format!(
                "{} is neither Java nor Kotlin",
                candidate.file_path.display()
            ))
        })?;

        let mut bytes = [0u8; SECRET_BYTES];
        ctx.rng.fill_bytes(&mut bytes);
        let secret = HEXLOWER.encode(&bytes);
        debug!(len = secret.len(), "Generated secret");

        let indent = format!("{}    ", line_indent(content, candidate.span.start.min(content.len())));
        let mut replacement = candidate.matched_excerpt.clone();
        replacement.push_str(&Self::field(language, &indent, &secret));
        Ok(candidate.edit(replacement))
    }

    fn mark(&self, edit: &mut Edit, marker: &str) {
        // keep the marker on the field's line
        let at = edit.replacement.trim_end_matches('\n').len();
        edit.replacement.insert_str(at, &format!(" {marker}"));
    }
}
