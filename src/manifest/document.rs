use std::borrow::Cow;
use std::ops::Range;
use std::path::{Path, PathBuf};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use crate::errors::SeedError;

pub const ANDROID_NAMESPACE: &str = "http://schemas.android.com/apk/res/android";
const DEFAULT_ANDROID_PREFIX: &str = "android";

pub type ElementId = usize;

/// One element of the manifest, with the byte span of its start tag in the
/// original text.
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub start_tag: Range<usize>,
    pub self_closing: bool,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
}

impl Element {
    pub fn attribute(&self, qname: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == qname)
            .map(|(_, v)| v.as_str())
    }
}

/// A parsed `AndroidManifest.xml` that keeps the source text verbatim.
///
/// Edits are expressed as splices into [`ManifestDocument::text`]; the
/// document itself is immutable and must be re-parsed after every write.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    path: PathBuf,
    text: String,
    elements: Vec<Element>,
    android_prefix: String,
}

impl ManifestDocument {
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let text = std::fs::read_to_string(path).map_err(|e| SeedError::io_at(path, e))?;
        Self::parse(path, text)
    }

    pub fn parse(path: &Path, text: String) -> Result<Self, SeedError> {
        let elements = scan_elements(path, &text)?;
        let root = elements.first().ok_or_else(|| SeedError::Xml {
            path: path.to_path_buf(),
            message: "document has no root element".into(),
        })?;
        let android_prefix = root
            .attributes
            .iter()
            .find(|(k, v)| k.starts_with("xmlns:") && v == ANDROID_NAMESPACE)
            .map(|(k, _)| k.trim_start_matches("xmlns:").to_string())
            .unwrap_or_else(|| DEFAULT_ANDROID_PREFIX.to_string());

        Ok(Self {
            path: path.to_path_buf(),
            text,
            elements,
            android_prefix,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id]
    }

    /// Elements with the given tag at any depth, in document order.
    pub fn elements_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = ElementId> + 'a {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.tag == tag)
            .map(|(id, _)| id)
    }

    /// Qualified name of an attribute in the android namespace, e.g. `android:exported`.
    pub fn android_name(&self, local: &str) -> String {
        format!("{}:{}", self.android_prefix, local)
    }

    pub fn android_attribute(&self, id: ElementId, local: &str) -> Option<&str> {
        self.element(id).attribute(&self.android_name(local))
    }

    pub fn has_child(&self, id: ElementId, tag: &str) -> bool {
        self.element(id)
            .children
            .iter()
            .any(|&c| self.elements[c].tag == tag)
    }

    pub fn start_tag_text(&self, id: ElementId) -> &str {
        &self.text[self.element(id).start_tag.clone()]
    }

    /// The one `<application>` element; anything else is a broken manifest.
    pub fn application(&self) -> Result<ElementId, SeedError> {
        let apps: Vec<_> = self.elements_named("application").collect();
        match apps.as_slice() {
            [id] => Ok(*id),
            _ => Err(SeedError::Manifest(format!(
                "{} must contain exactly one <application>, found {}",
                self.path.display(),
                apps.len()
            ))),
        }
    }
}

fn scan_elements(path: &Path, text: &str) -> Result<Vec<Element>, SeedError> {
    let xml_error = |message: String| SeedError::Xml {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = Reader::from_str(text);
    let mut elements: Vec<Element> = Vec::new();
    let mut open: Vec<ElementId> = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(xml_error(format!(
                    "at byte {}: {}",
                    reader.buffer_position() as usize,
                    e
                )))
            }
        };
        let (start, self_closing) = match event {
            Event::Start(start) => (start, false),
            Event::Empty(start) => (start, true),
            Event::End(_) => {
                open.pop();
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let end = reader.buffer_position() as usize;
        let begin = text[..end]
            .rfind('<')
            .ok_or_else(|| xml_error(format!("cannot locate start tag ending at byte {end}")))?;
        let id = elements.len();
        let parent = open.last().copied();
        if let Some(p) = parent {
            elements[p].children.push(id);
        } else if id > 0 {
            return Err(xml_error("multiple root elements".into()));
        }

        elements.push(Element {
            tag: decode(start.name().as_ref()).into_owned(),
            attributes: read_attributes(&start).map_err(xml_error)?,
            start_tag: begin..end,
            self_closing,
            parent,
            children: Vec::new(),
        });
        if !self_closing {
            open.push(id);
        }
    }

    if let Some(&unclosed) = open.last() {
        return Err(xml_error(format!("unclosed element <{}>", elements[unclosed].tag)));
    }
    Ok(elements)
}

fn read_attributes(start: &BytesStart<'_>) -> Result<Vec<(String, String)>, String> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        attributes.push((
            decode(attr.key.as_ref()).into_owned(),
            decode(&attr.value).into_owned(),
        ));
    }
    Ok(attributes)
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Return `tag_text` (a complete start tag) with `qname` set to `value`.
///
/// An existing attribute keeps its position and quoting style is normalised
/// to double quotes; a missing one is appended after the last attribute.
pub fn set_attribute(tag_text: &str, qname: &str, value: &str) -> Result<String, SeedError> {
    let attribute = Regex::new(&format!(
        r#"(\s{}\s*=\s*)("[^"]*"|'[^']*')"#,
        regex::escape(qname)
    ))?;

    if let Some(caps) = attribute.captures(tag_text) {
        if let Some(old) = caps.get(2) {
            let mut out = String::with_capacity(tag_text.len() + value.len());
            out.push_str(&tag_text[..old.start()]);
            out.push('"');
            out.push_str(value);
            out.push('"');
            out.push_str(&tag_text[old.end()..]);
            return Ok(out);
        }
    }

    let close = if tag_text.ends_with("/>") {
        tag_text.len() - 2
    } else if tag_text.ends_with('>') {
        tag_text.len() - 1
    } else {
        return Err(SeedError::Manifest(format!("not a start tag: {tag_text}")));
    };
    let insert_at = tag_text[..close].trim_end().len();

    let mut out = String::with_capacity(tag_text.len() + qname.len() + value.len() + 4);
    out.push_str(&tag_text[..insert_at]);
    out.push_str(&format!(" {qname}=\"{value}\""));
    out.push_str(&tag_text[insert_at..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- sample app -->
<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example">
    <application android:label="Demo">
        <activity android:name=".Main" android:exported="true">
            <intent-filter>
                <action android:name="android.intent.action.MAIN" />
            </intent-filter>
        </activity>
        <service android:name=".Sync"/>
    </application>
</manifest>
"#;

    fn parse(text: &str) -> Result<ManifestDocument, SeedError> {
        ManifestDocument::parse(Path::new("AndroidManifest.xml"), text.to_string())
    }

    #[test]
    fn test_parse_tree_shape() {
        let doc = parse(MANIFEST).unwrap();
        let tags: Vec<_> = doc.elements().iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["manifest", "application", "activity", "intent-filter", "action", "service"]);
        let activity = doc.elements_named("activity").next().unwrap();
        assert!(doc.has_child(activity, "intent-filter"));
        assert_eq!(doc.element(activity).parent, Some(1));
        assert!(doc.element(5).self_closing);
    }

    #[test]
    fn test_start_tag_spans_are_exact() {
        let doc = parse(MANIFEST).unwrap();
        let activity = doc.elements_named("activity").next().unwrap();
        assert_eq!(
            doc.start_tag_text(activity),
            r#"<activity android:name=".Main" android:exported="true">"#
        );
        let service = doc.elements_named("service").next().unwrap();
        assert_eq!(doc.start_tag_text(service), r#"<service android:name=".Sync"/>"#);
    }

    #[test]
    fn test_android_attributes() {
        let doc = parse(MANIFEST).unwrap();
        let activity = doc.elements_named("activity").next().unwrap();
        assert_eq!(doc.android_attribute(activity, "exported"), Some("true"));
        assert_eq!(doc.android_attribute(activity, "name"), Some(".Main"));
        assert_eq!(doc.android_attribute(activity, "permission"), None);
    }

    #[test]
    fn test_custom_namespace_prefix() {
        let text = r#"<manifest xmlns:a="http://schemas.android.com/apk/res/android"><application a:debuggable="false"/></manifest>"#;
        let doc = parse(text).unwrap();
        let app = doc.application().unwrap();
        assert_eq!(doc.android_name("debuggable"), "a:debuggable");
        assert_eq!(doc.android_attribute(app, "debuggable"), Some("false"));
    }

    #[test]
    fn test_application_must_be_unique() {
        let none = parse(r#"<manifest></manifest>"#).unwrap();
        assert!(matches!(none.application(), Err(SeedError::Manifest(_))));
        let two = parse(r#"<manifest><application/><application/></manifest>"#).unwrap();
        assert!(matches!(two.application(), Err(SeedError::Manifest(_))));
    }

    #[test]
    fn test_malformed_xml_is_error() {
        assert!(matches!(parse("<manifest><application></manifest>"), Err(SeedError::Xml { .. })));
        assert!(matches!(parse("<manifest><application>"), Err(SeedError::Xml { .. })));
        assert!(matches!(parse(""), Err(SeedError::Xml { .. })));
    }

    #[test]
    fn test_set_attribute_replaces_existing_value() {
        let out = set_attribute(
            r#"<activity android:name=".A" android:exported='false'>"#,
            "android:exported",
            "true",
        )
        .unwrap();
        assert_eq!(out, r#"<activity android:name=".A" android:exported="true">"#);
    }

    #[test]
    fn test_set_attribute_appends_missing() {
        let out = set_attribute(r#"<activity android:name=".A" />"#, "android:exported", "true").unwrap();
        assert_eq!(out, r#"<activity android:name=".A" android:exported="true" />"#);

        let multiline = "<application\n        android:label=\"Demo\"\n        >";
        let out = set_attribute(multiline, "android:debuggable", "true").unwrap();
        assert_eq!(out, "<application\n        android:label=\"Demo\" android:debuggable=\"true\"\n        >");
    }

    #[test]
    fn test_set_attribute_ignores_similar_names() {
        let out = set_attribute(
            r#"<application tools:debuggable="false">"#,
            "android:debuggable",
            "true",
        )
        .unwrap();
        assert_eq!(out, r#"<application tools:debuggable="false" android:debuggable="true">"#);
    }
}
