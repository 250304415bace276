pub mod registry;
pub mod report;
pub mod pattern;
pub mod manifest;
pub mod source;
pub mod resource;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::errors::SeedError;
use crate::materializer::Materializer;
use crate::repository::{ArtifactKind, ArtifactRepository, RepositorySet};

pub use registry::{resolve_operators, OPERATOR_REGISTRY};

/// Greppable marker left next to mutated sites when comment marking is on.
pub const MUTATION_MARKER: &str = "seed-vulns: injected vulnerability";

pub fn xml_marker() -> String {
    format!("<!-- {MUTATION_MARKER} -->")
}

pub fn block_marker() -> String {
    format!("/* {MUTATION_MARKER} */")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorName {
    ImproperExport,
    DebuggableApplication,
    PlaintextHttp,
    HardcodedSecret,
    ImplicitPendingIntent,
    TapjackingFullOcclusionXml,
    TapjackingFullOcclusionJava,
    TapjackingSetHideOverlayWindows,
    TapjackingPartialOcclusion,
}

impl OperatorName {
    pub const ALL: [OperatorName; 9] = [
        Self::ImproperExport,
        Self::DebuggableApplication,
        Self::PlaintextHttp,
        Self::HardcodedSecret,
        Self::ImplicitPendingIntent,
        Self::TapjackingFullOcclusionXml,
        Self::TapjackingFullOcclusionJava,
        Self::TapjackingSetHideOverlayWindows,
        Self::TapjackingPartialOcclusion,
    ];

    /// Name used on the command line and in output directory names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImproperExport => "ImproperExport",
            Self::DebuggableApplication => "DebuggableApplication",
            Self::PlaintextHttp => "PlaintextHttp",
            Self::HardcodedSecret => "HardcodedSecret",
            Self::ImplicitPendingIntent => "ImplicitPendingIntent",
            Self::TapjackingFullOcclusionXml => "TapjackingFullOcclusionXml",
            Self::TapjackingFullOcclusionJava => "TapjackingFullOcclusionJava",
            Self::TapjackingSetHideOverlayWindows => "TapjackingSetHideOverlayWindows",
            Self::TapjackingPartialOcclusion => "TapjackingPartialOcclusion",
        }
    }

    /// Heading used for the report block delimiters.
    pub fn title(&self) -> &'static str {
        match self {
            Self::ImproperExport => "Improper Export Operator",
            Self::DebuggableApplication => "Debuggable Application Operator",
            Self::PlaintextHttp => "Plaintext HTTP Operator",
            Self::HardcodedSecret => "Hardcoded Secret Operator",
            Self::ImplicitPendingIntent => "Implicit Pending Intent Operator",
            Self::TapjackingFullOcclusionXml => "Tapjacking Full Occlusion (XML)",
            Self::TapjackingFullOcclusionJava => "Tapjacking Full Occlusion (Java)",
            Self::TapjackingSetHideOverlayWindows => "Tapjacking Set Hide Overlay Windows",
            Self::TapjackingPartialOcclusion => "Tapjacking Partial Occlusion Operator",
        }
    }
}

impl fmt::Display for OperatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatorName {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| SeedError::Config(format!("Invalid operator: {s}")))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MutationOptions {
    pub comment_mutations: bool,
    pub all_mutants: bool,
}

/// Everything an operator may touch besides its repository.
pub struct MutationContext<'a> {
    pub options: MutationOptions,
    pub rng: &'a mut StdRng,
    pub materializer: &'a Materializer,
}

/// Result of one operator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Mutated { report: String, outputs: Vec<PathBuf> },
    /// Nothing in the tree matched.
    NoCandidates,
    /// The only site already carries the vulnerable value.
    AlreadyVulnerable,
}

impl MutationOutcome {
    pub fn report(&self) -> Option<&str> {
        match self {
            Self::Mutated { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn is_mutated(&self) -> bool {
        matches!(self, Self::Mutated { .. })
    }
}

/// One vulnerability class.
pub trait Operator {
    fn name(&self) -> OperatorName;

    fn artifact_kind(&self) -> ArtifactKind;

    fn description(&self) -> &'static str;

    fn mutate(&self, repos: &mut RepositorySet, ctx: &mut MutationContext<'_>) -> Result<MutationOutcome, SeedError>;
}

/// The candidates to mutate, paired with their mutant index in all-mutants
/// mode. Default mode picks exactly one uniformly at random.
pub fn select<T>(candidates: Vec<T>, ctx: &mut MutationContext<'_>) -> Vec<(Option<usize>, T)> {
    if ctx.options.all_mutants {
        return candidates.into_iter().enumerate().map(|(i, c)| (Some(i), c)).collect();
    }
    if candidates.is_empty() {
        return Vec::new();
    }
    let index = ctx.rng.gen_range(0..candidates.len());
    candidates
        .into_iter()
        .nth(index)
        .map(|c| vec![(None, c)])
        .unwrap_or_default()
}

/// Write mutated `content` for `target`: in place, or as the mutant
/// `index` with the repository reloaded from the restored tree.
pub fn persist(
    repo: &mut dyn ArtifactRepository,
    ctx: &MutationContext<'_>,
    target: &Path,
    content: &str,
    index: Option<usize>,
) -> Result<PathBuf, SeedError> {
    match index {
        None => {
            repo.write(target, content)?;
            Ok(ctx.materializer.working().to_path_buf())
        }
        Some(index) => {
            let output = ctx.materializer.persist_indexed(target, content, index)?;
            repo.reload()?;
            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tempfile::TempDir;

    #[test]
    fn test_operator_name_round_trip() {
        for name in OperatorName::ALL {
            assert_eq!(name.as_str().parse::<OperatorName>().unwrap(), name);
        }
        assert!("Nope".parse::<OperatorName>().is_err());
    }

    #[test]
    fn test_select_single_picks_one() {
        let dir = TempDir::new().unwrap();
        let materializer = Materializer::open(dir.path()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut ctx = MutationContext {
            options: MutationOptions::default(),
            rng: &mut rng,
            materializer: &materializer,
        };
        let picked = select(vec!["a", "b", "c"], &mut ctx);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].0, None);
        assert!(["a", "b", "c"].contains(&picked[0].1));
        assert!(select(Vec::<&str>::new(), &mut ctx).is_empty());
    }

    #[test]
    fn test_select_all_mutants_indexes_in_order() {
        let dir = TempDir::new().unwrap();
        let materializer = Materializer::open(dir.path()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut ctx = MutationContext {
            options: MutationOptions { all_mutants: true, ..Default::default() },
            rng: &mut rng,
            materializer: &materializer,
        };
        let picked = select(vec!["a", "b"], &mut ctx);
        assert_eq!(picked, vec![(Some(0), "a"), (Some(1), "b")]);
    }

    #[test]
    fn test_select_is_reproducible_with_seed() {
        let dir = TempDir::new().unwrap();
        let materializer = Materializer::open(dir.path()).unwrap();
        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut ctx = MutationContext {
                options: MutationOptions::default(),
                rng: &mut rng,
                materializer: &materializer,
            };
            select((0..50).collect::<Vec<_>>(), &mut ctx)[0].1
        };
        assert_eq!(pick(42), pick(42));
    }

    #[test]
    fn test_outcome_report() {
        let mutated = MutationOutcome::Mutated { report: "r".into(), outputs: vec![] };
        assert_eq!(mutated.report(), Some("r"));
        assert!(MutationOutcome::NoCandidates.report().is_none());
        assert!(!MutationOutcome::AlreadyVulnerable.is_mutated());
    }

    #[test]
    fn test_markers() {
        assert_eq!(xml_marker(), "<!-- seed-vulns: injected vulnerability -->");
        assert_eq!(block_marker(), "/* seed-vulns: injected vulnerability */");
    }
}
