//! Per-tick change tracking.

use schema::FieldType;

use crate::tree::Tree;
use crate::types::NodeId;
use crate::value::Value;

/// One element-level change to a vector or dictionary, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ElementChange {
    Remove { index: usize },
    Update { index: usize, value: Value },
    Insert { index: usize, value: Value },
    /// A field inside a struct element, addressed by ordinals below the element.
    Member {
        index: usize,
        member: Vec<u64>,
        ty: FieldType,
        value: Value,
    },
    KeyRemove { key: Value },
    KeyUpdate { key: Value, value: Value },
    KeyInsert { key: Value, value: Value },
}

/// Dirty and replaced bits keyed by node index, plus vector change logs.
///
/// A dirty node always has dirty ancestors, so marking stops at the first
/// ancestor already marked.
#[derive(Debug, Default)]
pub(crate) struct DirtySet {
    dirty: Vec<bool>,
    replaced: Vec<bool>,
    element_logs: Vec<Vec<ElementChange>>,
}

impl DirtySet {
    pub fn new(nodes: usize) -> Self {
        Self {
            dirty: vec![false; nodes],
            replaced: vec![false; nodes],
            element_logs: vec![Vec::new(); nodes],
        }
    }

    pub fn clear(&mut self) {
        self.dirty.fill(false);
        self.replaced.fill(false);
        for log in &mut self.element_logs {
            log.clear();
        }
    }

    pub fn is_dirty(&self, node: NodeId) -> bool {
        self.dirty[node.index()]
    }

    pub fn is_replaced(&self, node: NodeId) -> bool {
        self.replaced[node.index()]
    }

    pub fn element_log(&self, node: NodeId) -> &[ElementChange] {
        &self.element_logs[node.index()]
    }

    pub fn any_dirty(&self) -> bool {
        self.dirty.first().copied().unwrap_or(false)
    }

    /// Marks a node and its ancestors dirty.
    pub fn mark(&mut self, tree: &Tree, node: NodeId) {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.dirty[id.index()] {
                break;
            }
            self.dirty[id.index()] = true;
            current = tree.get(id).and_then(|n| n.parent);
        }
    }

    /// Marks a struct or vector as replaced whole; pending element changes become moot.
    pub fn mark_replaced(&mut self, tree: &Tree, node: NodeId) {
        self.replaced[node.index()] = true;
        self.element_logs[node.index()].clear();
        self.mark(tree, node);
    }

    /// Records an element change unless the collection is already being sent whole.
    pub fn log_element(&mut self, tree: &Tree, node: NodeId, change: ElementChange) {
        if !self.replaced[node.index()] {
            self.element_logs[node.index()].push(change);
        }
        self.mark(tree, node);
    }
}
