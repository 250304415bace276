use crate::errors::SeedError;
use crate::manifest::{application_components, ExportFilter, ExportReason};
use crate::operators::report::ReportBlock;
use crate::operators::{persist, select, xml_marker, MutationContext, MutationOutcome, Operator, OperatorName};
use crate::repository::{ArtifactKind, ArtifactRepository, RepositorySet};
use super::start_tag_edit;
use tracing::{debug, info, info_span};

/// Exports a component that is currently private to the app.
pub struct ImproperExport;

impl Operator for ImproperExport {
    fn name(&self) -> OperatorName {
        OperatorName::ImproperExport
    }

    fn artifact_kind(&self) -> ArtifactKind {
        ArtifactKind::Manifest
    }

    fn description(&self) -> &'static str {
        "Set android:exported=\"true\" on a non-exported activity, service, receiver or provider"
    }

    fn mutate(&self, repos: &mut RepositorySet, ctx: &mut MutationContext<'_>) -> Result<MutationOutcome, SeedError> {
        let _span = info_span!("operator", operator = %self.name()).entered();
        let repo = repos.manifest()?;
        let path = repo.path().to_path_buf();

        let marker = ctx.options.comment_mutations.then(xml_marker);
        let planned = {
            let doc = repo.document();
            let components = application_components(doc, ExportFilter::NotExported);
            info!(count = components.len(), "Found non-exported components");

            let mut planned = Vec::with_capacity(components.len());
            for component in components {
                match component.reason {
                    Some(ExportReason::ExplicitFalse | ExportReason::ImplicitFalse) => {}
                    other => {
                        return Err(SeedError::Classification(format!(
                            "{} {} classified as {:?}, expected a non-exported reason",
                            component.kind, component.name, other
                        )))
                    }
                }
                debug!(component = %component.name, tag = %component.kind, reason = ?component.reason, "Component is not exported");
                let edit = start_tag_edit(doc, component.element, "exported", "true", marker.as_deref())?;
                planned.push((component, edit));
            }
            planned
        };

        if planned.is_empty() {
            return Ok(MutationOutcome::NoCandidates);
        }

        let mut block = ReportBlock::new(self.name());
        let mut outputs = Vec::new();
        for (index, (component, edit)) in select(planned, ctx) {
            info!(component = %component.name, tag = %component.kind, index = ?index, "Exporting component");
            block.file("Manifest", &path);
            block.line(format!("Picked component: {}", component.name));
            block.field("tag", component.kind);
            if let Some(reason) = component.reason {
                block.field("reason", reason);
            }

            let content = repo.read(&path)?;
            let mutated = edit.apply(&content)?;
            let output = persist(&mut *repo, ctx, &path, &mutated, index)?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{classify, ComponentKind};
    use crate::operators::manifest::testing::App;
    use crate::operators::MutationOptions;

    #[test]
    fn test_bare_activity_becomes_exported() {
        let mut app = App::new(
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android">
    <!-- keep me -->
    <application android:label="Demo">
        <activity android:name=".Hidden"/>
    </application>
</manifest>
"#,
        );
        let (repos, mut ctx) = app.split(MutationOptions::default());
        let outcome = ImproperExport.mutate(repos, &mut ctx).unwrap();

        let report = outcome.report().unwrap();
        assert!(report.contains("Picked component: .Hidden"));
        assert!(report.contains("- reason: IMPLICIT_FALSE"));
        assert!(report.contains(&format!("Manifest: {}", app.manifest_path().display())));
        assert_eq!(
            app.manifest(),
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android">
    <!-- keep me -->
    <application android:label="Demo">
        <activity android:name=".Hidden" android:exported="true"/>
    </application>
</manifest>
"#
        );
    }

    #[test]
    fn test_only_picked_element_changes() {
        let manifest = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android">
    <application>
        <activity android:name=".A" android:exported="false"/>
        <service android:name=".B" android:exported='false'/>
    </application>
</manifest>"#;
        let mut app = App::new(manifest);
        let (repos, mut ctx) = app.split(MutationOptions::default());
        ImproperExport.mutate(repos, &mut ctx).unwrap();

        let after = app.manifest();
        let flipped = [
            (r#"<activity android:name=".A" android:exported="false"/>"#, r#"<activity android:name=".A" android:exported="true"/>"#),
            (r#"<service android:name=".B" android:exported='false'/>"#, r#"<service android:name=".B" android:exported="true"/>"#),
        ];
        let changed: Vec<_> = flipped
            .iter()
            .filter(|(before, mutated)| after.contains(mutated) && !after.contains(before))
            .collect();
        assert_eq!(changed.len(), 1);
        let (before, mutated) = changed[0];
        assert_eq!(after, manifest.replacen(before, mutated, 1));
    }

    #[test]
    fn test_repository_reparsed_after_write() {
        let mut app = App::new(
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"><application><receiver android:name=".R"/></application></manifest>"#,
        );
        let (repos, mut ctx) = app.split(MutationOptions::default());
        ImproperExport.mutate(repos, &mut ctx).unwrap();

        let doc = app.repos.manifest().unwrap().document();
        assert!(classify(doc, ComponentKind::Receiver, ExportFilter::NotExported).is_empty());
        assert_eq!(classify(doc, ComponentKind::Receiver, ExportFilter::Exported).len(), 1);
    }

    #[test]
    fn test_nothing_to_export() {
        let mut app = App::new(
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"><application><activity android:name=".A" android:exported="true"/></application></manifest>"#,
        );
        let (repos, mut ctx) = app.split(MutationOptions::default());
        assert_eq!(ImproperExport.mutate(repos, &mut ctx).unwrap(), MutationOutcome::NoCandidates);
    }

    #[test]
    fn test_all_mutants_one_directory_per_component() {
        let mut app = App::new(
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"><application><activity android:name=".A"/><provider android:name=".P" android:exported="false"/></application></manifest>"#,
        );
        let (repos, mut ctx) = app.split(MutationOptions { all_mutants: true, ..Default::default() });
        let outcome = ImproperExport.mutate(repos, &mut ctx).unwrap();
        let MutationOutcome::Mutated { outputs, .. } = outcome else {
            panic!("expected a mutation");
        };
        assert_eq!(outputs.len(), 2);

        let rel = "app/src/main/AndroidManifest.xml";
        let first = std::fs::read_to_string(outputs[0].join(rel)).unwrap();
        let second = std::fs::read_to_string(outputs[1].join(rel)).unwrap();
        assert!(first.contains(r#"<activity android:name=".A" android:exported="true"/>"#));
        assert!(first.contains(r#"<provider android:name=".P" android:exported="false"/>"#));
        assert!(second.contains(r#"<activity android:name=".A"/>"#));
        assert!(second.contains(r#"<provider android:name=".P" android:exported="true"/>"#));
        // working copy stays pristine
        assert!(!app.manifest().contains("\"true\""));
    }
}
