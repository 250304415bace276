pub mod tapjacking_full_occlusion;

pub use tapjacking_full_occlusion::TapjackingFullOcclusionXml;
