use regex::Regex;
use crate::errors::SeedError;
use crate::operators::pattern::{replace_within, PatternRule};
use crate::operators::{MutationContext, OperatorName};
use crate::repository::{ArtifactKind, Candidate, Edit};

/// `filterTouchesWhenObscured="true"` in a layout, or the equivalent style
/// item, flipped to `false`.
///
/// Candidates cover the whole start tag (or style item) so a marker comment
/// can follow it without landing inside the tag.
pub struct TapjackingFullOcclusionXml {
    patterns: Vec<Regex>,
    attribute: Regex,
    item_value: Regex,
}

impl TapjackingFullOcclusionXml {
    pub fn new() -> Result<Self, SeedError> {
        Ok(Self {
            patterns: vec![
                Regex::new(r#"<[A-Za-z][^<>]*?\bfilterTouchesWhenObscured\s*=\s*["']true["'][^<>]*>"#)?,
                Regex::new(
                    r#"<item\s+name\s*=\s*["'](?:android:)?filterTouchesWhenObscured["']\s*>\s*true\s*</item>"#,
                )?,
            ],
            attribute: Regex::new(r#"filterTouchesWhenObscured\s*=\s*["']true["']"#)?,
            item_value: Regex::new(r">\s*true\s*<")?,
        })
    }
}

impl PatternRule for TapjackingFullOcclusionXml {
    fn name(&self) -> OperatorName {
        OperatorName::TapjackingFullOcclusionXml
    }

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Resource
    }

    fn description(&self) -> &'static str {
        "Turn filterTouchesWhenObscured off in layout and style resources"
    }

    fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    fn pattern_label(&self) -> &'static str {
        "filterTouchesWhenObscured pattern"
    }

    fn transform(&self, candidate: &Candidate, _content: &str, _ctx: &mut MutationContext<'_>) -> Result<Edit, SeedError> {
        let excerpt = &candidate.matched_excerpt;
        let mutated = replace_within(excerpt, &self.attribute, "true", "false")
            .or_else(|| replace_within(excerpt, &self.item_value, "true", "false"))
            .ok_or_else(|| SeedError::Operator(format!("no filterTouchesWhenObscured value in {excerpt:?}")))?;
        Ok(candidate.edit(mutated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::source::testing::{candidate, Harness};
    use crate::operators::xml_marker;

    const LAYOUT: &str = r#"<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <Button
        android:id="@+id/pay"
        android:clickable="true"
        android:filterTouchesWhenObscured="true" />
</LinearLayout>
"#;

    #[test]
    fn test_layout_attribute_flipped() {
        let rule = TapjackingFullOcclusionXml::new().unwrap();
        let c = candidate("res/layout/main.xml", LAYOUT, &rule.patterns()[0]);
        assert!(c.matched_excerpt.starts_with("<Button"));
        let edit = rule.transform(&c, LAYOUT, &mut Harness::new().ctx()).unwrap();
        let out = edit.apply(LAYOUT).unwrap();
        assert!(out.contains(r#"android:clickable="true""#));
        assert!(out.contains(r#"android:filterTouchesWhenObscured="false" />"#));
    }

    #[test]
    fn test_marker_follows_the_tag() {
        let rule = TapjackingFullOcclusionXml::new().unwrap();
        let c = candidate("res/layout/main.xml", LAYOUT, &rule.patterns()[0]);
        let mut edit = rule.transform(&c, LAYOUT, &mut Harness::new().ctx()).unwrap();
        rule.mark(&mut edit, &xml_marker());
        let out = edit.apply(LAYOUT).unwrap();
        assert!(out.contains(r#"="false" /> <!-- seed-vulns: injected vulnerability -->"#));
    }

    #[test]
    fn test_style_item_flipped() {
        let rule = TapjackingFullOcclusionXml::new().unwrap();
        let content = "<resources>\n  <style name=\"Secure\">\n    <item name=\"android:filterTouchesWhenObscured\">true</item>\n  </style>\n</resources>\n";
        assert!(!rule.patterns()[0].is_match(content));
        let c = candidate("res/values/styles.xml", content, &rule.patterns()[1]);
        let edit = rule.transform(&c, content, &mut Harness::new().ctx()).unwrap();
        assert!(edit
            .apply(content)
            .unwrap()
            .contains("<item name=\"android:filterTouchesWhenObscured\">false</item>"));
    }

    #[test]
    fn test_false_attribute_is_not_a_candidate() {
        let rule = TapjackingFullOcclusionXml::new().unwrap();
        assert!(!rule.patterns()[0].is_match(r#"<View android:filterTouchesWhenObscured="false"/>"#));
    }
}
