//! XML to element tree.
//!
//! The scene format is small enough that reading it into a tree first and
//! interpreting the tree afterwards is simpler than a streaming interpreter.

use thiserror::Error;
use xml::common::Position;
use xml::reader::{EventReader, XmlEvent};

/// Errors that can occur while reading scene XML.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML error: {0}")]
    Xml(#[from] xml::reader::Error),

    #[error("Document has no root element")]
    NoRoot,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// One XML element with its attributes, children and concatenated text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
    /// 1-based line of the start tag
    pub line: usize,
}

impl Element {
    /// Value of the attribute `name`, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child element called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements called `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text content.
    pub fn text(&self) -> &str {
        self.text.trim()
    }
}

/// Parse an XML document and return its root element.
pub fn parse_xml(content: &str) -> ParseResult<Element> {
    let mut reader = EventReader::new(content.as_bytes());
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let line = reader.position().row as usize + 1;
        match reader.next()? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                stack.push(Element {
                    name: name.local_name,
                    attributes: attributes
                        .into_iter()
                        .map(|a| (a.name.local_name, a.value))
                        .collect(),
                    line,
                    ..Default::default()
                });
            }
            XmlEvent::EndElement { .. } => {
                // The reader guarantees balanced tags, so the stack is never empty here
                let Some(done) = stack.pop() else {
                    return Err(ParseError::NoRoot);
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None => return Ok(done),
                }
            }
            XmlEvent::Characters(text) | XmlEvent::CData(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            XmlEvent::EndDocument => return Err(ParseError::NoRoot),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree() {
        let root = parse_xml(
            r#"<?xml version="1.0"?>
<scene>
  <!-- comment -->
  <light type="point" shadows="true">
    <point>1, 2, 3</point>
  </light>
  <light type="ambient"/>
</scene>"#,
        )
        .unwrap();

        assert_eq!(root.name, "scene");
        assert_eq!(root.children.len(), 2);

        let light = root.child("light").unwrap();
        assert_eq!(light.attr("type"), Some("point"));
        assert_eq!(light.attr("shadows"), Some("true"));
        assert_eq!(light.attr("missing"), None);
        assert_eq!(light.child("point").unwrap().text(), "1, 2, 3");
        assert_eq!(root.children_named("light").count(), 2);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_xml("<scene><light></scene>"),
            Err(ParseError::Xml(_))
        ));
    }
}
