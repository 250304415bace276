use std::fmt;
use serde::{Deserialize, Serialize};
use super::document::{ElementId, ManifestDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Activity,
    Service,
    Receiver,
    Provider,
}

impl ComponentKind {
    /// Aggregation order for "all application components".
    pub const ALL: [ComponentKind; 4] = [Self::Activity, Self::Service, Self::Receiver, Self::Provider];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Service => "service",
            Self::Receiver => "receiver",
            Self::Provider => "provider",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFilter {
    Exported,
    NotExported,
    Any,
}

/// Why a component ends up exported or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportReason {
    /// `android:exported="true"`
    ExplicitTrue,
    /// No `android:exported`, but an `<intent-filter>` child.
    ImplicitTrueViaIntentFilter,
    /// `android:exported="false"`
    ExplicitFalse,
    /// No `android:exported` and no `<intent-filter>`.
    ImplicitFalse,
}

impl ExportReason {
    pub fn is_exported(&self) -> bool {
        matches!(self, Self::ExplicitTrue | Self::ImplicitTrueViaIntentFilter)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplicitTrue => "EXPLICIT_TRUE",
            Self::ImplicitTrueViaIntentFilter => "IMPLICIT_TRUE_VIA_INTENT_FILTER",
            Self::ExplicitFalse => "EXPLICIT_FALSE",
            Self::ImplicitFalse => "IMPLICIT_FALSE",
        }
    }
}

impl fmt::Display for ExportReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A manifest component with its computed export state.
///
/// Only valid for the document it was computed from; reasons are never
/// cached across writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    pub element: ElementId,
    pub kind: ComponentKind,
    pub name: String,
    pub reason: Option<ExportReason>,
}

/// Components of one kind matching `filter`. Explicit matches come first,
/// then implicit ones, each in document order.
pub fn classify(doc: &ManifestDocument, kind: ComponentKind, filter: ExportFilter) -> Vec<ComponentRecord> {
    let all: Vec<ElementId> = doc.elements_named(kind.tag()).collect();
    let record = |id: ElementId, reason: Option<ExportReason>| ComponentRecord {
        element: id,
        kind,
        name: doc
            .android_attribute(id, "name")
            .unwrap_or("<unnamed>")
            .to_string(),
        reason,
    };

    let (explicit, implicit): (Vec<ElementId>, Vec<ElementId>) = all
        .iter()
        .partition(|&&id| doc.android_attribute(id, "exported").is_some());

    let (wanted_value, explicit_reason, wants_filter, implicit_reason) = match filter {
        ExportFilter::Any => return all.into_iter().map(|id| record(id, None)).collect(),
        ExportFilter::Exported => ("true", ExportReason::ExplicitTrue, true, ExportReason::ImplicitTrueViaIntentFilter),
        ExportFilter::NotExported => ("false", ExportReason::ExplicitFalse, false, ExportReason::ImplicitFalse),
    };

    let explicit_matches = explicit
        .into_iter()
        .filter(|&id| doc.android_attribute(id, "exported") == Some(wanted_value))
        .map(|id| record(id, Some(explicit_reason)));
    let implicit_matches = implicit
        .into_iter()
        .filter(|&id| doc.has_child(id, "intent-filter") == wants_filter)
        .map(|id| record(id, Some(implicit_reason)));

    explicit_matches.chain(implicit_matches).collect()
}

/// All application components matching `filter`: activities, services,
/// receivers, then providers.
pub fn application_components(doc: &ManifestDocument, filter: ExportFilter) -> Vec<ComponentRecord> {
    ComponentKind::ALL
        .iter()
        .flat_map(|&kind| classify(doc, kind, filter))
        .collect()
}
