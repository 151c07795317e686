//! HTML serializer - turn a document tree back into HTML text
//!
//! Output contract, exact and load-bearing:
//! - childless elements self-close as `<tag attr="v"/>`; elements with
//!   children always get a separate closing tag (deliberate simplification,
//!   not HTML5 void-element compliance)
//! - attribute values are double-quoted and attribute-escaped
//! - raw text children pass through verbatim, escaped ones go through
//!   content escaping at render time
//! - pretty mode puts exactly one newline between consecutive children when
//!   a node has 2+ children, nowhere else
//! - document output starts with `<!DOCTYPE html>`
//!
//! Rendering reads the tree only; repeated calls on an unmutated tree are
//! byte-identical.

use crate::document::Document;
use crate::error::Result;
use crate::escape::{escape_attr, escape_text};
use crate::types::{Child, NodeId};

/// Serializer configuration.
#[derive(Debug, Clone, Default)]
pub struct SerializerConfig {
    pub pretty: bool,
}

/// Tree-to-text writer.
pub struct Serializer {
    config: SerializerConfig,
}

impl Serializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Serialize a whole document, `<!DOCTYPE html>` included.
    pub fn serialize(&self, doc: &Document) -> Result<String> {
        let mut out = String::with_capacity(1024);
        out.push_str("<!DOCTYPE html>");
        if self.config.pretty {
            out.push('\n');
        }
        self.write_node(doc, doc.root(), &mut out)?;
        Ok(out)
    }

    /// Serialize a subtree without the doctype prefix.
    pub fn serialize_node(&self, doc: &Document, node: NodeId) -> Result<String> {
        let mut out = String::with_capacity(256);
        self.write_node(doc, node, &mut out)?;
        Ok(out)
    }

    fn write_node(&self, doc: &Document, node: NodeId, out: &mut String) -> Result<()> {
        let n = doc.get(node)?;

        out.push('<');
        out.push_str(n.tag());
        for (key, value) in n.attrs() {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }

        let children = n.children();
        if children.is_empty() {
            out.push_str("/>");
            return Ok(());
        }
        out.push('>');

        let separate = self.config.pretty && children.len() > 1;
        for (i, child) in children.iter().enumerate() {
            if separate && i > 0 {
                out.push('\n');
            }
            match child {
                Child::Element(id) => self.write_node(doc, *id, out)?,
                Child::Raw(text) => out.push_str(text),
                Child::Escaped(text) => out.push_str(&escape_text(text)),
            }
        }

        out.push_str("</");
        out.push_str(n.tag());
        out.push('>');
        Ok(())
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level entry: render a document to HTML text.
pub fn render(doc: &Document, pretty: bool) -> Result<String> {
    Serializer::with_config(SerializerConfig { pretty }).serialize(doc)
}
