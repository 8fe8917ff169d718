use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// XML-level failures. Causes are carried as rendered text so the error stays
/// `Clone`/`Eq` and independent of the underlying parser's error shape.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum XmlError {
    #[error("invalid XML: {0}")]
    Syntax(String),
    #[error("missing document root element")]
    MissingRoot,
    #[error("unbalanced element nesting")]
    Unbalanced,
}

fn syntax(err: impl std::fmt::Display) -> XmlError {
    XmlError::Syntax(err.to_string())
}

/// An element with its attributes and ordered children, as written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child element with the given tag.
    pub fn child(&self, tag: &str) -> Option<&XmlElement> {
        self.children_named(tag).next()
    }

    pub fn children_named<'a, 'b>(&'a self, tag: &'b str) -> impl Iterator<Item = &'a XmlElement> + 'b
    where
        'a: 'b,
    {
        self.elements().filter(move |e| e.tag == tag)
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let XmlNode::Text(t) = node {
                out.push_str(t);
            }
        }
        out
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, XmlError> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(syntax)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(syntax)?.into_owned();
        attrs.push((key, value));
    }
    Ok(XmlElement {
        tag,
        attrs,
        children: Vec::new(),
    })
}

/// Parse one descriptor into an element tree.
///
/// Element order and attribute order are preserved; whitespace-only text,
/// comments, and processing instructions are not modeled (the rewrite path
/// never re-serializes from this tree).
pub fn parse_document(text: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event().map_err(syntax)? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None if root.is_none() => root = Some(element),
                    None => {}
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(XmlError::Unbalanced);
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None if root.is_none() => root = Some(element),
                    None => {}
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(syntax)?;
                if !text.is_empty() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(text.into_owned()));
                    }
                }
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Event::Eof => break,
            // Declarations, comments, PIs, doctypes: opaque to the model.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Unbalanced);
    }
    root.ok_or(XmlError::MissingRoot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_in_order() {
        let doc = parse_document(
            r#"<Flow name="f"><Request><Step><Name>A</Name></Step><Step><Name>B</Name></Step></Request></Flow>"#,
        )
        .expect("parse");

        assert_eq!(doc.tag, "Flow");
        assert_eq!(doc.attr("name"), Some("f"));
        let request = doc.child("Request").expect("Request child");
        let names: Vec<String> = request
            .children_named("Step")
            .map(|s| s.child("Name").expect("Name").text())
            .collect();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn self_closing_root_is_accepted() {
        let doc = parse_document(r#"<Quota name="Q" enabled="true"/>"#).expect("parse");
        assert_eq!(doc.tag, "Quota");
        assert_eq!(doc.attr("name"), Some("Q"));
        assert!(doc.children.is_empty());
    }

    #[test]
    fn text_is_unescaped() {
        let doc = parse_document("<Condition>a &amp;&amp; b</Condition>").expect("parse");
        assert_eq!(doc.text(), "a && b");
    }

    #[test]
    fn empty_input_has_no_root() {
        assert_eq!(parse_document(""), Err(XmlError::MissingRoot));
        assert_eq!(parse_document("  \n "), Err(XmlError::MissingRoot));
    }

    #[test]
    fn mismatched_close_is_an_error() {
        assert!(parse_document("<A><B></A></B>").is_err());
    }
}
