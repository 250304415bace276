pub mod application_flag;
pub mod improper_export;

pub use application_flag::ApplicationFlag;
pub use improper_export::ImproperExport;

use crate::errors::SeedError;
use crate::manifest::{set_attribute, ElementId, ManifestDocument};
use crate::repository::Edit;

/// Splice that sets `android:<local>="<value>"` on one element's start tag,
/// optionally followed by a marker comment.
pub(crate) fn start_tag_edit(
    doc: &ManifestDocument,
    element: ElementId,
    local: &str,
    value: &str,
    marker: Option<&str>,
) -> Result<Edit, SeedError> {
    let original = doc.start_tag_text(element).to_string();
    let mut replacement = set_attribute(&original, &doc.android_name(local), value)?;
    if let Some(marker) = marker {
        replacement.push(' ');
        replacement.push_str(marker);
    }
    Ok(Edit {
        span: doc.element(element).start_tag.clone(),
        original,
        replacement,
    })
}
