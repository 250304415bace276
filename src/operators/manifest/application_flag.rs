use crate::errors::SeedError;
use crate::operators::report::ReportBlock;
use crate::operators::{persist, select, xml_marker, MutationContext, MutationOutcome, Operator, OperatorName};
use crate::repository::{ArtifactKind, ArtifactRepository, RepositorySet};
use super::start_tag_edit;
use tracing::{error, info, info_span};

/// Forces a boolean `<application>` attribute to `true`.
pub struct ApplicationFlag {
    name: OperatorName,
    attribute: &'static str,
    description: &'static str,
}

impl ApplicationFlag {
    pub fn debuggable_application() -> Self {
        Self {
            name: OperatorName::DebuggableApplication,
            attribute: "debuggable",
            description: "Set android:debuggable=\"true\" on the application",
        }
    }

    pub fn plaintext_http() -> Self {
        Self {
            name: OperatorName::PlaintextHttp,
            attribute: "usesCleartextTraffic",
            description: "Set android:usesCleartextTraffic=\"true\" on the application",
        }
    }

    pub fn attribute(&self) -> &'static str {
        self.attribute
    }
}

impl Operator for ApplicationFlag {
    fn name(&self) -> OperatorName {
        self.name
    }

    fn artifact_kind(&self) -> ArtifactKind {
        ArtifactKind::Manifest
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn mutate(&self, repos: &mut RepositorySet, ctx: &mut MutationContext<'_>) -> Result<MutationOutcome, SeedError> {
        let _span = info_span!("operator", operator = %self.name, attribute = self.attribute).entered();
        let repo = repos.manifest()?;
        let path = repo.path().to_path_buf();

        let marker = ctx.options.comment_mutations.then(xml_marker);
        let (current, edit) = {
            let doc = repo.document();
            let application = doc.application()?;
            let current = doc
                .android_attribute(application, self.attribute)
                .map(str::to_string);
            match current.as_deref() {
                Some("true") => {
                    info!("Application attribute already true, nothing to do");
                    return Ok(MutationOutcome::AlreadyVulnerable);
                }
                None | Some("false") => {}
                Some(other) => {
                    error!(value = other, "Invalid application attribute value");
                    return Err(SeedError::Manifest(format!(
                        "Invalid value for {} in {}: {other}",
                        self.attribute,
                        path.display()
                    )));
                }
            }
            let edit = start_tag_edit(doc, application, self.attribute, "true", marker.as_deref())?;
            (current, edit)
        };

        let mut block = ReportBlock::new(self.name);
        let mut outputs = Vec::new();
        for (index, edit) in select(vec![edit], ctx) {
            block.file("Manifest", &path);
            block.field(self.attribute, current.as_deref().unwrap_or("<absent>"));

            let content = repo.read(&path)?;
            let mutated = edit.apply(&content)?;
            let output = persist(&mut *repo, ctx, &path, &mutated, index)?;
            info!(output = %output.display(), "Application attribute set to true");

            block.excerpts(&edit.original, &edit.replacement).mutant(index, &output);
            outputs.push(output);
        }

        Ok(MutationOutcome::Mutated {
            report: block.finish(),
            outputs,
        })
    }
}
