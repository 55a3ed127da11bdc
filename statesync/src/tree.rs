//! Arena of declared fields.
//!
//! Every field declared in the schema gets one node. Parents are stored as
//! indices, so the tree has no ownership cycles and marking a node dirty is
//! an index walk up to the root.

use schema::{FieldType, Schema, StructDef};

use crate::types::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Leaf,
    Struct,
    Vector,
    Dictionary,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    /// Ordinal path from the root struct.
    pub address: Vec<u64>,
    pub ty: FieldType,
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn build(schema: &Schema) -> Self {
        let root = schema.root();
        let mut tree = Self {
            nodes: vec![Node {
                name: root.name.clone(),
                parent: None,
                address: Vec::new(),
                ty: FieldType::Struct(root.clone()),
                kind: NodeKind::Struct,
                children: Vec::new(),
            }],
        };
        tree.add_children(NodeId::ROOT, root);
        tree
    }

    fn add_children(&mut self, parent: NodeId, def: &StructDef) {
        for (ordinal, field) in def.fields.iter().enumerate() {
            let id = NodeId::new(self.nodes.len() as u32);
            let mut address = self.nodes[parent.index()].address.clone();
            address.push(ordinal as u64);
            let kind = match field.ty {
                FieldType::Struct(_) => NodeKind::Struct,
                FieldType::Vector(_) => NodeKind::Vector,
                FieldType::Dictionary { .. } => NodeKind::Dictionary,
                _ => NodeKind::Leaf,
            };
            self.nodes.push(Node {
                name: field.name.clone(),
                parent: Some(parent),
                address,
                ty: field.ty.clone(),
                kind,
                children: Vec::new(),
            });
            self.nodes[parent.index()].children.push(id);
            if let FieldType::Struct(inner) = &field.ty {
                self.add_children(id, inner);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Finds the node reached by following field names from the root.
    pub fn resolve(&self, path: &[&str]) -> Option<NodeId> {
        path.iter().try_fold(NodeId::ROOT, |current, name| {
            self.get(current)?
                .children
                .iter()
                .copied()
                .find(|child| self.nodes[child.index()].name == *name)
        })
    }
}

/// Resolves field names below `def` into ordinals and the final field type.
///
/// Only struct fields are walked; a name after a leaf or vector fails.
pub(crate) fn resolve_path<'a>(
    def: &'a StructDef,
    path: &[&str],
) -> Option<(Vec<u64>, &'a FieldType)> {
    let (last, parents) = path.split_last()?;
    let mut current = def;
    let mut ordinals = Vec::with_capacity(path.len());
    for name in parents {
        let index = current.field_index(name)?;
        ordinals.push(index as u64);
        match &current.fields[index].ty {
            FieldType::Struct(inner) => current = inner,
            _ => return None,
        }
    }
    let index = current.field_index(last)?;
    ordinals.push(index as u64);
    Some((ordinals, &current.fields[index].ty))
}
