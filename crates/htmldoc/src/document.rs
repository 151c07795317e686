//! Document: arena-backed HTML tree plus mutation primitives
//!
//! Design:
//! - Single Vec<Node> for node storage, NodeId indices everywhere. The arena
//!   doubles as the owning-document back-reference: a node is reachable only
//!   through its document. Arena slots are never removed; detaching a node
//!   means dropping its id from the parent's child list.
//! - AHashMap for the id → NodeId registry (dynamic documents only).
//! - Mutation primitives are transaction-aware: each one pushes its reified
//!   inverse onto the innermost active undo log before the change lands.
//!   With no active transaction nothing is recorded and the mutation is
//!   permanently irreversible.

use crate::error::{DomError, Result};
use crate::transaction::{Transaction, UndoOp};
use crate::types::{Child, Node, NodeId, TextMode};
use ahash::AHashMap;
use tracing::{debug, trace};
use uuid::Uuid;

/// Configuration for document creation.
#[derive(Debug, Clone, Default)]
pub struct DocumentConfig {
    /// Text of the `<title>` element, created under `<head>` when present.
    pub title: Option<String>,
    /// Dynamic documents register a unique id for every created node so it
    /// can be looked up later via [`Document::node_by_id`].
    pub dynamic: bool,
}

/// An HTML document: the `html` root with `head`/`body` scaffolding, owning
/// every node ever created in it.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    /// Lazily materialized `<title>` node, cached after first access.
    title: Option<NodeId>,
    dynamic: bool,
    ids: AHashMap<String, NodeId>,
    /// Stack of undo logs; the last entry is the innermost active
    /// transaction. Empty when no transaction is active.
    pub(crate) txns: Vec<Vec<UndoOp>>,
}

impl Document {
    /// Create a non-dynamic document without a title.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Create a document with explicit configuration.
    ///
    /// Scaffolding (`html`, `head`, `body`, and the title when given) is
    /// built with no transaction active, so it is immutable as far as
    /// rollback is concerned. In dynamic mode the scaffolding nodes receive
    /// generated ids like any other node.
    pub fn with_config(config: DocumentConfig) -> Self {
        let mut doc = Self {
            nodes: Vec::with_capacity(8),
            root: 0,
            head: 0,
            body: 0,
            title: None,
            dynamic: config.dynamic,
            ids: AHashMap::new(),
            txns: Vec::new(),
        };

        let root = doc.alloc("html".to_string());
        if doc.dynamic {
            doc.assign_fresh_id(root);
        }
        doc.root = root;
        doc.head = doc.scaffold_child(root, "head");
        doc.body = doc.scaffold_child(root, "body");

        if let Some(text) = &config.title {
            let title = doc.scaffold_child(doc.head, "title");
            doc.nodes[title as usize]
                .children
                .push(Child::Escaped(text.clone()));
            doc.title = Some(title);
        }

        debug!(dynamic = doc.dynamic, "document created");
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Get a node (immutable).
    pub fn get(&self, node: NodeId) -> Result<&Node> {
        self.nodes
            .get(node as usize)
            .ok_or(DomError::NodeNotFound(node))
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(node as usize)
            .ok_or(DomError::NodeNotFound(node))
    }

    /// Look up a node by registered id. Always `None` on non-dynamic
    /// documents.
    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Attribute lookup: pure read, no transaction interaction. Absent keys
    /// (and unknown nodes) are `None`.
    pub fn attribute(&self, node: NodeId, key: &str) -> Option<&str> {
        self.get(node).ok().and_then(|n| n.attr(key))
    }

    /// Create a new empty element appended to `parent`'s children.
    ///
    /// In a dynamic document the node is registered under a generated id,
    /// which also lands in its `id` attribute. Inside a transaction the
    /// inverse (detach from parent, unregister the id) is recorded.
    pub fn create_child(&mut self, parent: NodeId, tag: &str) -> Result<NodeId> {
        self.insert_child(parent, tag, None)
    }

    /// Like [`create_child`](Self::create_child) with a caller-chosen id.
    ///
    /// In a dynamic document the id is registered and must be unused; in a
    /// non-dynamic document it only becomes the `id` attribute.
    pub fn create_child_with_id(&mut self, parent: NodeId, tag: &str, id: &str) -> Result<NodeId> {
        self.insert_child(parent, tag, Some(id))
    }

    fn insert_child(&mut self, parent: NodeId, tag: &str, explicit_id: Option<&str>) -> Result<NodeId> {
        if tag.is_empty() {
            return Err(DomError::MissingTag);
        }
        self.get(parent)?;
        if self.dynamic {
            if let Some(id) = explicit_id {
                if self.ids.contains_key(id) {
                    return Err(DomError::DuplicateId(id.to_string()));
                }
            }
        }

        let node = self.alloc(tag.to_string());
        let registered = match explicit_id {
            Some(id) => {
                self.nodes[node as usize].set_attr("id", id.to_string());
                if self.dynamic {
                    self.ids.insert(id.to_string(), node);
                    Some(id.to_string())
                } else {
                    None
                }
            }
            None if self.dynamic => {
                let id = self.assign_fresh_id(node);
                Some(id)
            }
            None => None,
        };

        self.nodes[parent as usize].children.push(Child::Element(node));
        self.record(UndoOp::RemoveNode {
            parent,
            node,
            id: registered,
        });
        trace!(parent, node, tag, "created child");
        Ok(node)
    }

    /// Create an element that belongs to this document but hangs off no
    /// parent. No id is assigned; attributes work as usual.
    pub fn create_detached(&mut self, tag: &str) -> Result<NodeId> {
        if tag.is_empty() {
            return Err(DomError::MissingTag);
        }
        Ok(self.alloc(tag.to_string()))
    }

    /// Set an attribute. An existing key keeps its position and gets its
    /// value replaced; a new key is appended. The inverse (restore the old
    /// value, or remove the key) is recorded when a transaction is active.
    ///
    /// Non-string values are converted to their string form here, at
    /// insertion time.
    pub fn set_attribute(&mut self, node: NodeId, key: &str, value: impl ToString) -> Result<()> {
        let prev = self.get_mut(node)?.set_attr(key, value.to_string());
        self.record(UndoOp::RestoreAttribute {
            node,
            key: key.to_string(),
            prev,
        });
        Ok(())
    }

    /// Empty a node's child list. The inverse captures the whole prior
    /// sequence, identities included, not a diff.
    pub fn clear_children(&mut self, node: NodeId) -> Result<()> {
        let prev = std::mem::take(&mut self.get_mut(node)?.children);
        self.record(UndoOp::RestoreChildren {
            node,
            children: prev,
        });
        Ok(())
    }

    /// Append a text leaf. `replace` first clears the existing children
    /// (recorded as its own undo step); the append itself is undone by
    /// popping the last child.
    pub fn append_text(
        &mut self,
        node: NodeId,
        text: &str,
        mode: TextMode,
        replace: bool,
    ) -> Result<()> {
        if replace {
            self.clear_children(node)?;
        } else {
            self.get(node)?;
        }
        let leaf = match mode {
            TextMode::Raw => Child::Raw(text.to_string()),
            TextMode::Escaped => Child::Escaped(text.to_string()),
        };
        self.get_mut(node)?.children.push(leaf);
        self.record(UndoOp::PopChild { node });
        Ok(())
    }

    /// The lazily created `<title>` node under `<head>`. Idempotent after
    /// the first call; creation is not transaction-recorded, matching the
    /// rest of the scaffolding.
    pub fn title(&mut self) -> NodeId {
        if let Some(title) = self.title {
            return title;
        }
        let title = self.scaffold_child(self.head, "title");
        self.title = Some(title);
        title
    }

    /// Register a fresh process-unique id for `node` and return it. Fails
    /// on non-dynamic documents. Generated tokens are drawn until one is
    /// free, so they can never collide with an explicitly supplied id.
    pub fn generate_id(&mut self, node: NodeId) -> Result<String> {
        if !self.dynamic {
            return Err(DomError::InvalidDocumentMode);
        }
        self.get(node)?;
        Ok(self.assign_fresh_id(node))
    }

    /// Begin a transaction scope. Mutations made through the returned guard
    /// record their inverses; dropping the guard commits, consuming
    /// `rollback()` undoes everything in reverse order.
    pub fn transaction(&mut self) -> Transaction<'_> {
        Transaction::begin(self)
    }

    fn alloc(&mut self, tag: String) -> NodeId {
        let node = self.nodes.len() as NodeId;
        self.nodes.push(Node::new(tag));
        node
    }

    /// Scaffolding path: allocate, id-register (dynamic), attach. Inputs
    /// are known-good and nothing is recorded for rollback.
    fn scaffold_child(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.alloc(tag.to_string());
        if self.dynamic {
            self.assign_fresh_id(node);
        }
        self.nodes[parent as usize].children.push(Child::Element(node));
        node
    }

    fn assign_fresh_id(&mut self, node: NodeId) -> String {
        let id = loop {
            let candidate = format!("n{}", Uuid::new_v4().simple());
            if !self.ids.contains_key(&candidate) {
                break candidate;
            }
        };
        self.ids.insert(id.clone(), node);
        self.nodes[node as usize].set_attr("id", id.clone());
        id
    }

    /// Push an inverse onto the innermost active undo log, if any.
    fn record(&mut self, op: UndoOp) {
        if let Some(log) = self.txns.last_mut() {
            log.push(op);
        }
    }

    /// Apply a reified inverse. Works on the structures directly so a
    /// rollback never records into an enclosing transaction's log.
    pub(crate) fn apply_undo(&mut self, op: UndoOp) {
        match op {
            UndoOp::RemoveNode { parent, node, id } => {
                if let Some(p) = self.nodes.get_mut(parent as usize) {
                    if let Some(pos) = p
                        .children
                        .iter()
                        .position(|c| matches!(c, Child::Element(n) if *n == node))
                    {
                        p.children.remove(pos);
                    }
                }
                if let Some(id) = id {
                    self.ids.remove(&id);
                }
            }
            UndoOp::RestoreAttribute { node, key, prev } => {
                if let Some(n) = self.nodes.get_mut(node as usize) {
                    match prev {
                        Some(value) => {
                            n.set_attr(&key, value);
                        }
                        None => n.attrs.retain(|(k, _)| *k != key),
                    }
                }
            }
            UndoOp::RestoreChildren { node, children } => {
                if let Some(n) = self.nodes.get_mut(node as usize) {
                    n.children = children;
                }
            }
            UndoOp::PopChild { node } => {
                if let Some(n) = self.nodes.get_mut(node as usize) {
                    n.children.pop();
                }
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
