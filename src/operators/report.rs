use std::path::Path;
use similar::TextDiff;
use super::OperatorName;
use tracing::info;

/// Text block describing one operator invocation.
pub struct ReportBlock {
    name: OperatorName,
    body: String,
}

impl ReportBlock {
    pub fn new(name: OperatorName) -> Self {
        Self {
            name,
            body: String::new(),
        }
    }

    pub fn line(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.body.push_str(line.as_ref());
        self.body.push('\n');
        self
    }

    pub fn field(&mut self, key: &str, value: impl std::fmt::Display) -> &mut Self {
        self.line(format!("- {key}: {value}"))
    }

    pub fn file(&mut self, label: &str, path: &Path) -> &mut Self {
        self.line(format!("{label}: {}", path.display()))
    }

    pub fn mutant(&mut self, index: Option<usize>, output: &Path) -> &mut Self {
        if let Some(index) = index {
            self.field("mutant index", index);
        }
        self.field("output", output.display())
    }

    /// Original and mutated excerpt plus a unified diff between them.
    pub fn excerpts(&mut self, original: &str, mutated: &str) -> &mut Self {
        let diff = TextDiff::from_lines(original, mutated);
        let mut unified = diff.unified_diff();
        unified.context_radius(3).header("original", "mutated");
        let rendered = unified.to_string();

        info!(operator = %self.name, excerpt = original, mutated = mutated, "Excerpt mutated");
        self.line("")
            .line("Excerpt:")
            .line(original)
            .line("Mutated excerpt:")
            .line(mutated)
            .line("Diff:")
            .line(rendered.trim_end())
    }

    pub fn finish(self) -> String {
        let title = self.name.title();
        format!(
            "\n========== {title} ==========\n{}========== End of {title} ==========\n",
            self.body
        )
    }
}
