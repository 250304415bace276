use regex::Regex;
use crate::errors::SeedError;
use crate::operators::pattern::{line_indent, PatternRule};
use crate::operators::{MutationContext, OperatorName};
use crate::repository::{ArtifactKind, Candidate, Edit, SourceLanguage};

/// Replaces the body of a `dispatchTouchEvent` override with a plain call to
/// the superclass, dropping any `FLAG_WINDOW_IS_PARTIALLY_OBSCURED` check.
pub struct TapjackingPartialOcclusion {
    patterns: Vec<Regex>,
}

impl TapjackingPartialOcclusion {
    pub fn new() -> Result<Self, SeedError> {
        Ok(Self {
            patterns: vec![
                Regex::new(
                    r"public\s+boolean\s+dispatchTouchEvent\s*\(\s*(?:final\s+)?(?:@\w+\s+)*MotionEvent\s+(\w+)\s*\)\s*\{",
                )?,
                Regex::new(
                    r"override\s+fun\s+dispatchTouchEvent\s*\(\s*(\w+)\s*:\s*MotionEvent\??\s*\)\s*:\s*Boolean\s*\{",
                )?,
            ],
        })
    }
}

impl PatternRule for TapjackingPartialOcclusion {
    fn name(&self) -> OperatorName {
        OperatorName::TapjackingPartialOcclusion
    }

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Source
    }

    fn description(&self) -> &'static str {
        "Reduce dispatchTouchEvent to a bare super call, ignoring partial occlusion"
    }

    fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    fn pattern_label(&self) -> &'static str {
        "dispatchTouchEvent regex pattern"
    }

    fn transform(&self, candidate: &Candidate, content: &str, _ctx: &mut MutationContext<'_>) -> Result<Edit, SeedError> {
        let header = candidate.matched_excerpt.as_str();
        let start = match content.get(candidate.span.clone()) {
            Some(found) if found == header => candidate.span.start,
            _ => content.find(header).ok_or_else(|| {
                SeedError::Operator(format!("dispatchTouchEvent header not found: {header:?}"))
            })?,
        };
        let open = start + header.len() - 1;

        let pattern = candidate
            .pattern
            .as_ref()
            .ok_or_else(|| SeedError::Internal("candidate without pattern".into()))?;
        let param = pattern
            .captures(header)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| SeedError::Operator(format!("no MotionEvent parameter in {header:?}")))?;

        let close = matching_brace(content, open).ok_or_else(|| {
            SeedError::Operator(format!(
                "unbalanced dispatchTouchEvent body in {}",
                candidate.file_path.display()
            ))
        })?;

        let terminator = match SourceLanguage::from_path(&candidate.file_path) {
            Some(SourceLanguage::Kotlin) => "",
            _ => ";",
        };
        let indent = line_indent(content, start);
        let replacement = format!(
            "{header}\n{indent}    return super.dispatchTouchEvent({param}){terminator}\n{indent}}}"
        );

        Ok(Edit {
            span: start..close + 1,
            original: content[start..=close].to_string(),
            replacement,
        })
    }

    fn mark(&self, edit: &mut Edit, marker: &str) {
        // after the opening brace, inside the new body
        if let Some(at) = edit.replacement.find('\n') {
            edit.replacement.insert_str(at, &format!(" {marker}"));
        }
    }
}

/// Byte offset of the `}` closing the `{` at `open`, skipping string and
/// char literals and comments.
fn matching_brace(content: &str, open: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}
