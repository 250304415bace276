use std::sync::LazyLock;
use crate::errors::SeedError;
use crate::repository::ArtifactKind;
use super::manifest::{ApplicationFlag, ImproperExport};
use super::pattern::PatternOperator;
use super::resource::TapjackingFullOcclusionXml;
use super::source::{
    HardcodedSecret, ImplicitPendingIntent, TapjackingFullOcclusionJava, TapjackingPartialOcclusion,
    TapjackingSetHideOverlayWindows,
};
use super::{Operator, OperatorName};
use tracing::debug;

pub struct OperatorDefinition {
    pub name: OperatorName,
    pub kind: ArtifactKind,
    pub build: fn() -> Result<Box<dyn Operator>, SeedError>,
}

/// Command-line names that stand for several operators, run in the listed order.
pub const OPERATOR_ALIASES: &[(&str, &[OperatorName])] = &[(
    "TapjackingFullOcclusion",
    &[OperatorName::TapjackingFullOcclusionXml, OperatorName::TapjackingFullOcclusionJava],
)];

pub static OPERATOR_REGISTRY: LazyLock<Vec<OperatorDefinition>> = LazyLock::new(|| vec![
    OperatorDefinition {
        name: OperatorName::ImproperExport,
        kind: ArtifactKind::Manifest,
        build: || Ok(Box::new(ImproperExport)),
    },
    OperatorDefinition {
        name: OperatorName::DebuggableApplication,
        kind: ArtifactKind::Manifest,
        build: || Ok(Box::new(ApplicationFlag::debuggable_application())),
    },
    OperatorDefinition {
        name: OperatorName::PlaintextHttp,
        kind: ArtifactKind::Manifest,
        build: || Ok(Box::new(ApplicationFlag::plaintext_http())),
    },
    OperatorDefinition {
        name: OperatorName::HardcodedSecret,
        kind: ArtifactKind::Source,
        build: || Ok(Box::new(PatternOperator::new(HardcodedSecret::new()?))),
    },
    OperatorDefinition {
        name: OperatorName::ImplicitPendingIntent,
        kind: ArtifactKind::Source,
        build: || Ok(Box::new(PatternOperator::new(ImplicitPendingIntent::new()?))),
    },
    OperatorDefinition {
        name: OperatorName::TapjackingFullOcclusionXml,
        kind: ArtifactKind::Resource,
        build: || Ok(Box::new(PatternOperator::new(TapjackingFullOcclusionXml::new()?))),
    },
    OperatorDefinition {
        name: OperatorName::TapjackingFullOcclusionJava,
        kind: ArtifactKind::Source,
        build: || Ok(Box::new(PatternOperator::new(TapjackingFullOcclusionJava::new()?))),
    },
    OperatorDefinition {
        name: OperatorName::TapjackingSetHideOverlayWindows,
        kind: ArtifactKind::Source,
        build: || Ok(Box::new(PatternOperator::new(TapjackingSetHideOverlayWindows::new()?))),
    },
    OperatorDefinition {
        name: OperatorName::TapjackingPartialOcclusion,
        kind: ArtifactKind::Source,
        build: || Ok(Box::new(PatternOperator::new(TapjackingPartialOcclusion::new()?))),
    },
]);

pub fn definition(name: OperatorName) -> Result<&'static OperatorDefinition, SeedError> {
    OPERATOR_REGISTRY
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| SeedError::Internal(format!("operator {name} missing from registry")))
}

/// Split a comma-separated operator list.
pub fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Resolve user-facing names, aliases included, to operators in run order.
pub fn expand_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<OperatorName>, SeedError> {
    if names.is_empty() {
        return Err(SeedError::Config("No operators given".into()));
    }
    let mut expanded: Vec<OperatorName> = Vec::new();
    for raw in names {
        let raw = raw.as_ref().trim();
        let resolved = match OPERATOR_ALIASES.iter().find(|(alias, _)| *alias == raw) {
            Some((_, targets)) => targets.to_vec(),
            None => vec![raw.parse::<OperatorName>()?],
        };
        for name in resolved {
            if expanded.contains(&name) {
                return Err(SeedError::Config(format!("Operator {name} is listed more than once")));
            }
            expanded.push(name);
        }
    }
    Ok(expanded)
}

pub fn resolve_operators<S: AsRef<str>>(names: &[S]) -> Result<Vec<Box<dyn Operator>>, SeedError> {
    expand_names(names)?
        .into_iter()
        .map(|name| {
            debug!(operator = %name, "Instantiating operator");
            (definition(name)?.build)()
        })
        .collect()
}
