pub mod document;
pub mod classifier;

pub use classifier::{application_components, classify, ComponentKind, ComponentRecord, ExportFilter, ExportReason};
pub use document::{set_attribute, Element, ElementId, ManifestDocument, ANDROID_NAMESPACE};
