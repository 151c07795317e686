//! Scoped transactions with reified undo actions
//!
//! A transaction is a guard over the document: mutations made through it
//! register their inverses on the innermost active log. Dropping the guard
//! (or calling `commit`) discards the log and keeps the mutations; the
//! consuming `rollback` applies every inverse in reverse registration order.
//!
//! Inverses are tagged operations, not closures: each one carries exactly
//! the state it restores and is applied by a single dispatch in
//! `Document::apply_undo`. Because `rollback` and `commit` take the guard by
//! value, finishing a transaction twice does not compile.

use crate::document::Document;
use crate::types::{Child, NodeId};
use smallvec::SmallVec;
use std::ops::{Deref, DerefMut};
use tracing::trace;

/// A recorded inverse action. Applied LIFO on rollback.
#[derive(Debug, Clone)]
pub(crate) enum UndoOp {
    /// Detach a created node from its parent and drop its registered id.
    /// The node itself stays in the arena; slots are never reclaimed.
    RemoveNode {
        parent: NodeId,
        node: NodeId,
        id: Option<String>,
    },
    /// Put an attribute back to its previous value, or remove the key if it
    /// did not exist.
    RestoreAttribute {
        node: NodeId,
        key: String,
        prev: Option<String>,
    },
    /// Restore a full prior child sequence, same order and identities.
    RestoreChildren {
        node: NodeId,
        children: SmallVec<[Child; 4]>,
    },
    /// Undo a single text append.
    PopChild { node: NodeId },
}

/// An active transaction scope.
///
/// Derefs to [`Document`], so every mutation primitive is available on the
/// guard; nested transactions are further `transaction()` calls on it, each
/// with an independent log.
pub struct Transaction<'a> {
    doc: &'a mut Document,
    finished: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn begin(doc: &'a mut Document) -> Self {
        doc.txns.push(Vec::new());
        trace!(depth = doc.txns.len(), "transaction begun");
        Self {
            doc,
            finished: false,
        }
    }

    /// Keep the applied mutations and discard the undo log. Equivalent to
    /// dropping the guard, spelled out for readers.
    pub fn commit(mut self) {
        self.finished = true;
        self.doc.txns.pop();
        trace!(depth = self.doc.txns.len(), "transaction committed");
    }

    /// Undo every mutation recorded in this scope, newest first, then end
    /// the transaction.
    pub fn rollback(mut self) {
        self.finished = true;
        if let Some(log) = self.doc.txns.pop() {
            trace!(
                depth = self.doc.txns.len(),
                ops = log.len(),
                "rolling back transaction"
            );
            for op in log.into_iter().rev() {
                self.doc.apply_undo(op);
            }
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        // Falling out of scope commits.
        if !self.finished {
            self.doc.txns.pop();
        }
    }
}

impl Deref for Transaction<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        self.doc
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Document {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{Document, DocumentConfig};
    use crate::types::{Child, TextMode};

    #[test]
    fn test_attribute_rollback_restores_previous_value() {
        let mut doc = Document::new();
        let node = doc.create_child(doc.body(), "a").unwrap();
        doc.set_attribute(node, "href", "first").unwrap();

        let mut tx = doc.transaction();
        tx.set_attribute(node, "href", "second").unwrap();
        tx.set_attribute(node, "href", "third").unwrap();
        tx.rollback();

        // Chained LIFO undo lands on the value before the transaction.
        assert_eq!(doc.attribute(node, "href"), Some("first"));
    }

    #[test]
    fn test_attribute_rollback_removes_new_key() {
        let mut doc = Document::new();
        let node = doc.create_child(doc.body(), "div").unwrap();

        let mut tx = doc.transaction();
        tx.set_attribute(node, "class", "v1").unwrap();
        tx.set_attribute(node, "class", "v2").unwrap();
        tx.rollback();

        assert_eq!(doc.attribute(node, "class"), None);
    }

    #[test]
    fn test_clear_children_rollback_restores_sequence() {
        let mut doc = Document::new();
        let ul = doc.create_child(doc.body(), "ul").unwrap();
        let first = doc.create_child(ul, "li").unwrap();
        let second = doc.create_child(ul, "li").unwrap();
        let before = doc.get(ul).unwrap().children().to_vec();

        let mut tx = doc.transaction();
        tx.clear_children(ul).unwrap();
        assert!(tx.get(ul).unwrap().children().is_empty());
        tx.rollback();

        let after = doc.get(ul).unwrap().children();
        assert_eq!(after, before.as_slice());
        assert_eq!(
            after,
            &[Child::Element(first), Child::Element(second)]
        );
    }

    #[test]
    fn test_create_child_rollback_detaches_and_unregisters() {
        let mut doc = Document::with_config(DocumentConfig {
            title: None,
            dynamic: true,
        });
        let body = doc.body();

        let mut tx = doc.transaction();
        let node = tx.create_child_with_id(body, "div", "temp").unwrap();
        assert_eq!(tx.node_by_id("temp"), Some(node));
        tx.rollback();

        assert!(doc.get(body).unwrap().children().is_empty());
        assert_eq!(doc.node_by_id("temp"), None);
    }

    #[test]
    fn test_replace_text_rollback() {
        let mut doc = Document::new();
        let p = doc.create_child(doc.body(), "p").unwrap();
        doc.append_text(p, "original", TextMode::Escaped, false)
            .unwrap();

        let mut tx = doc.transaction();
        tx.append_text(p, "replacement", TextMode::Escaped, true)
            .unwrap();
        assert_eq!(
            tx.get(p).unwrap().children(),
            &[Child::Escaped("replacement".to_string())]
        );
        tx.rollback();

        assert_eq!(
            doc.get(p).unwrap().children(),
            &[Child::Escaped("original".to_string())]
        );
    }

    #[test]
    fn test_commit_keeps_mutations() {
        let mut doc = Document::new();
        let node = doc.create_child(doc.body(), "div").unwrap();

        let mut tx = doc.transaction();
        tx.set_attribute(node, "class", "kept").unwrap();
        tx.commit();

        assert_eq!(doc.attribute(node, "class"), Some("kept"));
        assert!(doc.txns.is_empty());
    }

    #[test]
    fn test_drop_commits() {
        let mut doc = Document::new();
        let node = doc.create_child(doc.body(), "div").unwrap();

        {
            let mut tx = doc.transaction();
            tx.set_attribute(node, "class", "kept").unwrap();
        }

        assert_eq!(doc.attribute(node, "class"), Some("kept"));
        assert!(doc.txns.is_empty());
    }

    #[test]
    fn test_nested_inner_rollback_leaves_outer_applied() {
        let mut doc = Document::new();
        let node = doc.create_child(doc.body(), "div").unwrap();

        let mut outer = doc.transaction();
        outer.set_attribute(node, "class", "outer").unwrap();
        {
            let mut inner = outer.transaction();
            inner.set_attribute(node, "class", "inner").unwrap();
            inner.rollback();
        }
        assert_eq!(outer.attribute(node, "class"), Some("outer"));
        outer.commit();

        assert_eq!(doc.attribute(node, "class"), Some("outer"));
    }

    #[test]
    fn test_nested_outer_rollback_spares_inner_committed() {
        let mut doc = Document::new();
        let node = doc.create_child(doc.body(), "div").unwrap();
        doc.set_attribute(node, "class", "base").unwrap();

        let mut outer = doc.transaction();
        outer.set_attribute(node, "data-step", "outer").unwrap();
        {
            let mut inner = outer.transaction();
            inner.set_attribute(node, "class", "inner").unwrap();
            inner.commit();
        }
        outer.rollback();

        // Inverses register with the innermost log only; once the inner
        // scope committed, its mutation is out of the outer log's reach.
        assert_eq!(doc.attribute(node, "data-step"), None);
        assert_eq!(doc.attribute(node, "class"), Some("inner"));
    }

    #[test]
    fn test_mutation_outside_transaction_records_nothing() {
        let mut doc = Document::new();
        let node = doc.create_child(doc.body(), "div").unwrap();
        doc.set_attribute(node, "class", "permanent").unwrap();
        assert!(doc.txns.is_empty());
    }
}
