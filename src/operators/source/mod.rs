pub mod hardcoded_secret;
pub mod implicit_pending_intent;
pub mod tapjacking_full_occlusion;
pub mod tapjacking_set_hide_overlay_windows;
pub mod tapjacking_partial_occlusion;

pub use hardcoded_secret::HardcodedSecret;
pub use implicit_pending_intent::ImplicitPendingIntent;
pub use tapjacking_full_occlusion::TapjackingFullOcclusionJava;
pub use tapjacking_partial_occlusion::TapjackingPartialOcclusion;
pub use tapjacking_set_hide_overlay_windows::TapjackingSetHideOverlayWindows;

use regex::Regex;
use crate::errors::SeedError;

/// Flip the first `true` literal of an excerpt to `false`.
pub(crate) struct TrueLiteral(Regex);

impl TrueLiteral {
    pub fn new() -> Result<Self, SeedError> {
        Ok(Self(Regex::new(r"\btrue\b")?))
    }

    pub fn flip(&self, excerpt: &str) -> Result<String, SeedError> {
        if !self.0.is_match(excerpt) {
            return Err(SeedError::Operator(format!("no `true` literal in excerpt: {excerpt}")));
        }
        Ok(self.0.replacen(excerpt, 1, "false").into_owned())
    }
}
