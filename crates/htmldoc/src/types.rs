//! Core tree types
//!
//! Design:
//! 1. Nodes are addressed by `NodeId` (u32 index into the document arena),
//!    never by pointers. No Rc/Arc, no cycles.
//! 2. Children use SmallVec (most elements have <4 children).
//! 3. Attributes are an ordered Vec of pairs: keys are unique, the first
//!    insert fixes a key's position, overwrites replace the value in place.
//! 4. Text is a leaf variant of `Child`, not a node; whether it will be
//!    escaped is decided when the text is inserted, not when it is rendered.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into the document arena).
/// u32 allows 4 billion nodes, enough for any document.
pub type NodeId = u32;

/// How text handed to `append_text` is treated by the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextMode {
    /// Emitted verbatim.
    Raw,
    /// Run through content escaping at render time.
    Escaped,
}

/// A child slot: a nested element or a text leaf.
///
/// This is a closed union; the serializer dispatches over it with a single
/// match, no open-ended trait objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Child {
    Element(NodeId),
    Raw(String),
    Escaped(String),
}

/// A single element: tag, ordered attributes, ordered children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) children: SmallVec<[Child; 4]>,
}

impl Node {
    pub(crate) fn new(tag: String) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: SmallVec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute lookup. Absent keys are `None`, never an error.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in stored order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Set an attribute, returning the previous value if the key existed.
    /// An existing key keeps its position among the other attributes; a new
    /// key is appended.
    pub(crate) fn set_attr(&mut self, key: &str, value: String) -> Option<String> {
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => Some(std::mem::replace(v, value)),
            None => {
                self.attrs.push((key.to_string(), value));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_lookup() {
        let mut node = Node::new("div".to_string());
        assert_eq!(node.attr("class"), None);

        node.set_attr("class", "wide".to_string());
        assert_eq!(node.attr("class"), Some("wide"));
    }

    #[test]
    fn test_set_attr_preserves_position() {
        let mut node = Node::new("input".to_string());
        node.set_attr("type", "text".to_string());
        node.set_attr("name", "q".to_string());

        // Overwriting the first key must not move it behind the second.
        let prev = node.set_attr("type", "search".to_string());
        assert_eq!(prev.as_deref(), Some("text"));

        let keys: Vec<&str> = node.attrs().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["type", "name"]);
        assert_eq!(node.attr("type"), Some("search"));
    }
}
