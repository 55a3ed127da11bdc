//! Publishing side of state sync.

use buffer::ByteBuffer;
use schema::{FieldType, Schema};
use tracing::{debug, trace};
use wire::{ComposeMessage, Composer, WireError, WireFormat};

use crate::dirty::{DirtySet, ElementChange};
use crate::envelope::{self, DictionaryAction, ElementAction};
use crate::error::{SyncError, SyncResult};
use crate::snapshot::{compose_value, StructView};
use crate::tree::{resolve_path, NodeKind, Tree};
use crate::types::NodeId;
use crate::value::Value;

/// Owns a live value tree and turns its mutations into update messages.
///
/// Mutations are only accepted between [`Publisher::start_tick`] and
/// [`Publisher::end_tick`]. Each tick produces one update; applying the
/// updates in order to a replica that started from
/// [`Publisher::generate_state_sync_message`] reproduces the live value.
#[derive(Debug)]
pub struct Publisher {
    schema: Schema,
    format: WireFormat,
    tree: Tree,
    data: Value,
    dirty: DirtySet,
    output: Option<ByteBuffer>,
    tick: u64,
}

impl Publisher {
    /// Creates a publisher over `data`, which must have the shape of the schema root.
    pub fn new(format: WireFormat, schema: Schema, data: Value) -> SyncResult<Self> {
        let root = FieldType::Struct(schema.root().clone());
        check_value(&root, &data, format)?;
        let tree = Tree::build(&schema);
        let dirty = DirtySet::new(tree.len());
        Ok(Self {
            schema,
            format,
            tree,
            data,
            dirty,
            output: None,
            tick: 0,
        })
    }

    /// Creates a publisher whose fields all start at their zero values.
    #[must_use]
    pub fn with_defaults(format: WireFormat, schema: Schema) -> Self {
        let data = Value::Struct(
            schema
                .root()
                .fields
                .iter()
                .map(|field| Value::default_for(&field.ty))
                .collect(),
        );
        let tree = Tree::build(&schema);
        let dirty = DirtySet::new(tree.len());
        Self {
            schema,
            format,
            tree,
            data,
            dirty,
            output: None,
            tick: 0,
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn format(&self) -> WireFormat {
        self.format
    }

    /// The live root value.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Number of ticks ended so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub const fn is_tick_open(&self) -> bool {
        self.output.is_some()
    }

    #[must_use]
    pub fn schema_hash(&self) -> u64 {
        schema::schema_hash(&self.schema)
    }

    /// Looks up the node for a field path such as `["aggregate", "name"]`.
    pub fn node(&self, path: &[&str]) -> SyncResult<NodeId> {
        self.tree
            .resolve(path)
            .ok_or_else(|| SyncError::UnknownField {
                path: path.join("."),
            })
    }

    /// Current value of a node.
    pub fn get(&self, node: NodeId) -> SyncResult<&Value> {
        let entry = self.tree.get(node).ok_or(SyncError::UnknownNode { node })?;
        self.data
            .at(&entry.address)
            .ok_or_else(|| SyncError::InvalidAddress {
                address: entry.address.clone(),
            })
    }

    /// Replaces the value of a field.
    ///
    /// Leaves are sent on their own; a struct or vector set this way is sent
    /// whole and any element changes already made to it this tick are dropped.
    pub fn set(&mut self, node: NodeId, value: Value) -> SyncResult<()> {
        self.require_tick()?;
        let entry = self.tree.get(node).ok_or(SyncError::UnknownNode { node })?;
        if node == NodeId::ROOT {
            return Err(SyncError::InvalidAddress {
                address: Vec::new(),
            });
        }
        check_value(&entry.ty, &value, self.format)?;
        let slot = self
            .data
            .at_mut(&entry.address)
            .ok_or_else(|| SyncError::InvalidAddress {
                address: entry.address.clone(),
            })?;
        *slot = value;

        if entry.kind == NodeKind::Leaf {
            self.dirty.mark(&self.tree, node);
        } else {
            self.dirty.mark_replaced(&self.tree, node);
        }
        Ok(())
    }

    /// Replaces the element at `index` of a vector field.
    pub fn vector_update(&mut self, node: NodeId, index: usize, value: Value) -> SyncResult<()> {
        self.require_tick()?;
        let format = self.format;
        let (element, items) = self.vector_target(node)?;
        check_value(element, &value, format)?;
        if index >= items.len() {
            return Err(out_of_range(index, items.len()));
        }
        items[index] = value.clone();
        self.dirty
            .log_element(&self.tree, node, ElementChange::Update { index, value });
        Ok(())
    }

    /// Inserts an element before `index`; `index == len` appends.
    pub fn vector_insert(&mut self, node: NodeId, index: usize, value: Value) -> SyncResult<()> {
        self.require_tick()?;
        let format = self.format;
        let (element, items) = self.vector_target(node)?;
        check_value(element, &value, format)?;
        if index > items.len() {
            return Err(out_of_range(index, items.len()));
        }
        items.insert(index, value.clone());
        self.dirty
            .log_element(&self.tree, node, ElementChange::Insert { index, value });
        Ok(())
    }

    /// Removes the element at `index`.
    pub fn vector_remove(&mut self, node: NodeId, index: usize) -> SyncResult<()> {
        self.require_tick()?;
        let (_, items) = self.vector_target(node)?;
        if index >= items.len() {
            return Err(out_of_range(index, items.len()));
        }
        items.remove(index);
        self.dirty
            .log_element(&self.tree, node, ElementChange::Remove { index });
        Ok(())
    }

    /// Replaces one field inside a struct element of a vector.
    pub fn vector_update_field(
        &mut self,
        node: NodeId,
        index: usize,
        path: &[&str],
        value: Value,
    ) -> SyncResult<()> {
        self.require_tick()?;
        let format = self.format;
        let (element, items) = self.vector_target(node)?;
        let FieldType::Struct(def) = element else {
            return Err(SyncError::TypeMismatch {
                expected: "struct",
                found: element.kind_name(),
            });
        };
        let (member, ty) = resolve_path(def, path).ok_or_else(|| SyncError::UnknownField {
            path: path.join("."),
        })?;
        check_value(ty, &value, format)?;
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))?
            .at_mut(&member)
            .ok_or_else(|| SyncError::InvalidAddress {
                address: member.clone(),
            })?;
        *slot = value.clone();
        let change = ElementChange::Member {
            index,
            member,
            ty: ty.clone(),
            value,
        };
        self.dirty.log_element(&self.tree, node, change);
        Ok(())
    }

    /// Adds an entry under a key the dictionary does not hold yet.
    pub fn dictionary_insert(&mut self, node: NodeId, key: Value, value: Value) -> SyncResult<()> {
        self.require_tick()?;
        let format = self.format;
        let (key_ty, value_ty, entries) = self.dictionary_target(node)?;
        check_value(key_ty, &key, format)?;
        check_value(value_ty, &value, format)?;
        if entries.iter().any(|(k, _)| *k == key) {
            return Err(SyncError::KeyExists {
                key: key.key_label(),
            });
        }
        entries.push((key.clone(), value.clone()));
        self.dirty
            .log_element(&self.tree, node, ElementChange::KeyInsert { key, value });
        Ok(())
    }

    /// Replaces the value stored under an existing key.
    pub fn dictionary_update(&mut self, node: NodeId, key: Value, value: Value) -> SyncResult<()> {
        self.require_tick()?;
        let format = self.format;
        let (_, value_ty, entries) = self.dictionary_target(node)?;
        check_value(value_ty, &value, format)?;
        let slot = entries
            .iter_mut()
            .find(|(k, _)| *k == key)
            .ok_or_else(|| SyncError::KeyNotFound {
                key: key.key_label(),
            })?;
        slot.1 = value.clone();
        self.dirty
            .log_element(&self.tree, node, ElementChange::KeyUpdate { key, value });
        Ok(())
    }

    /// Removes the entry stored under `key`.
    pub fn dictionary_remove(&mut self, node: NodeId, key: Value) -> SyncResult<()> {
        self.require_tick()?;
        let (_, _, entries) = self.dictionary_target(node)?;
        let position = entries
            .iter()
            .position(|(k, _)| *k == key)
            .ok_or_else(|| SyncError::KeyNotFound {
                key: key.key_label(),
            })?;
        entries.remove(position);
        self.dirty
            .log_element(&self.tree, node, ElementChange::KeyRemove { key });
        Ok(())
    }

    /// Opens a tick; the update will be appended to `buffer`.
    ///
    /// Calling it again before [`Publisher::end_tick`] only swaps the buffer.
    pub fn start_tick(&mut self, buffer: ByteBuffer) {
        if self.output.is_some() {
            debug!(tick = self.tick, "tick already open, rebinding output");
        }
        self.output = Some(buffer);
    }

    /// Composes the changes made since [`Publisher::start_tick`] and closes the tick.
    ///
    /// Clean subtrees are skipped. With no changes the update is just the
    /// empty envelope. On failure the tick stays open and the buffer is cut
    /// back to its length at the start of this call.
    pub fn end_tick(&mut self) -> SyncResult<ByteBuffer> {
        let mut buffer = self.output.take().ok_or(SyncError::TickNotStarted)?;
        let start = buffer.len();
        let result = {
            let mut composer = Composer::new(self.format, &mut buffer);
            envelope::update_begin(&mut composer);
            let changes = if self.dirty.any_dirty() {
                self.compose_dirty(&mut composer, NodeId::ROOT)
            } else {
                Ok(0)
            };
            if changes.is_ok() {
                envelope::update_end(&mut composer);
            }
            changes
        };
        match result {
            Ok(changes) => {
                debug!(tick = self.tick, changes, bytes = buffer.len(), "tick ended");
                self.dirty.clear();
                self.tick += 1;
                Ok(buffer)
            }
            Err(err) => {
                buffer.truncate(start);
                self.output = Some(buffer);
                Err(err)
            }
        }
    }

    /// Writes the whole live value, for a subscriber joining late.
    pub fn generate_state_sync_message(&self, composer: &mut Composer<'_>) -> SyncResult<()> {
        let fields = self.data.as_struct().ok_or(SyncError::TypeMismatch {
            expected: "struct",
            found: self.data.kind_name(),
        })?;
        StructView {
            def: self.schema.root(),
            fields,
        }
        .compose(composer)?;
        Ok(())
    }

    fn require_tick(&self) -> SyncResult<()> {
        if self.output.is_none() {
            return Err(SyncError::TickNotStarted);
        }
        Ok(())
    }

    fn vector_target(&mut self, node: NodeId) -> SyncResult<(&FieldType, &mut Vec<Value>)> {
        let entry = self.tree.get(node).ok_or(SyncError::UnknownNode { node })?;
        let FieldType::Vector(element) = &entry.ty else {
            return Err(SyncError::TypeMismatch {
                expected: "vector",
                found: entry.ty.kind_name(),
            });
        };
        match self.data.at_mut(&entry.address) {
            Some(Value::Vector(items)) => Ok((element.as_ref(), items)),
            _ => Err(SyncError::InvalidAddress {
                address: entry.address.clone(),
            }),
        }
    }

    fn dictionary_target(
        &mut self,
        node: NodeId,
    ) -> SyncResult<(&FieldType, &FieldType, &mut Vec<(Value, Value)>)> {
        let entry = self.tree.get(node).ok_or(SyncError::UnknownNode { node })?;
        let FieldType::Dictionary { key, value } = &entry.ty else {
            return Err(SyncError::TypeMismatch {
                expected: "dictionary",
                found: entry.ty.kind_name(),
            });
        };
        match self.data.at_mut(&entry.address) {
            Some(Value::Dictionary(entries)) => Ok((key.as_ref(), value.as_ref(), entries)),
            _ => Err(SyncError::InvalidAddress {
                address: entry.address.clone(),
            }),
        }
    }

    fn compose_dirty(&self, composer: &mut Composer<'_>, node: NodeId) -> SyncResult<usize> {
        let Some(entry) = self.tree.get(node) else {
            return Ok(0);
        };
        let mut changes = 0;
        for &child in &entry.children {
            if !self.dirty.is_dirty(child) {
                continue;
            }
            let Some(child_entry) = self.tree.get(child) else {
                continue;
            };
            match child_entry.kind {
                NodeKind::Struct if !self.dirty.is_replaced(child) => {
                    changes += self.compose_dirty(composer, child)?;
                }
                NodeKind::Vector if !self.dirty.is_replaced(child) => {
                    changes += self.compose_element_log(composer, child)?;
                }
                NodeKind::Dictionary if !self.dirty.is_replaced(child) => {
                    changes += self.compose_key_log(composer, child)?;
                }
                _ => {
                    let value = self.get(child)?;
                    trace!(address = ?child_entry.address, "field changed");
                    envelope::change_begin(composer, &child_entry.address, None);
                    envelope::value_begin(composer);
                    compose_value(composer, &child_entry.ty, value)?;
                    envelope::change_end(composer);
                    changes += 1;
                }
            }
        }
        Ok(changes)
    }

    fn compose_element_log(&self, composer: &mut Composer<'_>, node: NodeId) -> SyncResult<usize> {
        let Some(entry) = self.tree.get(node) else {
            return Ok(0);
        };
        let FieldType::Vector(element) = &entry.ty else {
            return Ok(0);
        };
        let log = self.dirty.element_log(node);
        for change in log {
            let mut address = entry.address.clone();
            let (action, ty, value) = match change {
                ElementChange::Remove { index } => {
                    address.push(*index as u64);
                    (Some(ElementAction::Remove), element.as_ref(), None)
                }
                ElementChange::Update { index, value } => {
                    address.push(*index as u64);
                    (Some(ElementAction::Update), element.as_ref(), Some(value))
                }
                ElementChange::Insert { index, value } => {
                    address.push(*index as u64);
                    (Some(ElementAction::Insert), element.as_ref(), Some(value))
                }
                ElementChange::Member {
                    index,
                    member,
                    ty,
                    value,
                } => {
                    address.push(*index as u64);
                    address.extend_from_slice(member);
                    (None, ty, Some(value))
                }
                ElementChange::KeyRemove { .. }
                | ElementChange::KeyUpdate { .. }
                | ElementChange::KeyInsert { .. } => continue,
            };
            trace!(?address, ?action, "element changed");
            envelope::change_begin(composer, &address, action);
            if let Some(value) = value {
                envelope::value_begin(composer);
                compose_value(composer, ty, value)?;
            }
            envelope::change_end(composer);
        }
        Ok(log.len())
    }

    /// Writes keyed records; the action rides as the last address ordinal.
    fn compose_key_log(&self, composer: &mut Composer<'_>, node: NodeId) -> SyncResult<usize> {
        let Some(entry) = self.tree.get(node) else {
            return Ok(0);
        };
        let FieldType::Dictionary {
            key: key_ty,
            value: value_ty,
        } = &entry.ty
        else {
            return Ok(0);
        };
        let log = self.dirty.element_log(node);
        let mut changes = 0;
        for change in log {
            let (action, key, value) = match change {
                ElementChange::KeyRemove { key } => (DictionaryAction::Remove, key, None),
                ElementChange::KeyUpdate { key, value } => {
                    (DictionaryAction::UpdateValue, key, Some(value))
                }
                ElementChange::KeyInsert { key, value } => {
                    (DictionaryAction::Insert, key, Some(value))
                }
                _ => continue,
            };
            let mut address = entry.address.clone();
            address.push(action.code());
            trace!(?address, %action, key = %key.key_label(), "entry changed");
            envelope::change_begin(composer, &address, None);
            envelope::key_begin(composer);
            compose_value(composer, key_ty, key)?;
            if let Some(value) = value {
                envelope::value_begin(composer);
                compose_value(composer, value_ty, value)?;
            }
            envelope::change_end(composer);
            changes += 1;
        }
        Ok(changes)
    }
}

fn check_value(ty: &FieldType, value: &Value, format: WireFormat) -> SyncResult<()> {
    if !value.conforms(ty) {
        return Err(SyncError::TypeMismatch {
            expected: ty.kind_name(),
            found: value.kind_name(),
        });
    }
    if format == WireFormat::Json && value.has_non_finite() {
        return Err(WireError::NonFiniteReal.into());
    }
    Ok(())
}

const fn out_of_range(index: usize, len: usize) -> SyncError {
    SyncError::IndexOutOfRange {
        index: index as u64,
        len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{FieldDef, StructDef};

    fn schema() -> Schema {
        Schema::builder("Root")
            .field(FieldDef::signed("count"))
            .field(FieldDef::structure(
                "inner",
                StructDef::new("Inner")
                    .field(FieldDef::string("label"))
                    .field(FieldDef::real("ratio")),
            ))
            .field(FieldDef::vector("list", FieldType::Unsigned))
            .field(FieldDef::dictionary(
                "tags",
                FieldType::String,
                FieldType::Signed,
            ))
            .build()
            .unwrap()
    }

    fn json(buf: &ByteBuffer) -> &str {
        std::str::from_utf8(buf.as_bytes()).unwrap()
    }

    #[test]
    fn mutation_requires_tick() {
        let mut publisher = Publisher::with_defaults(WireFormat::Json, schema());
        let count = publisher.node(&["count"]).unwrap();
        let err = publisher.set(count, Value::Signed(1)).unwrap_err();
        assert_eq!(err, SyncError::TickNotStarted);
        assert_eq!(publisher.end_tick().unwrap_err(), SyncError::TickNotStarted);
    }

    #[test]
    fn empty_tick_is_empty_envelope() {
        let mut publisher = Publisher::with_defaults(WireFormat::Json, schema());
        publisher.start_tick(ByteBuffer::new());
        let buf = publisher.end_tick().unwrap();
        assert_eq!(json(&buf), r#"{"changes":[{}]}"#);
        assert_eq!(publisher.tick(), 1);

        let mut publisher = Publisher::with_defaults(WireFormat::Gmq, schema());
        publisher.start_tick(ByteBuffer::new());
        assert_eq!(publisher.end_tick().unwrap().as_bytes(), &[0]);
    }

    #[test]
    fn leaf_change_only() {
        let mut publisher = Publisher::with_defaults(WireFormat::Json, schema());
        publisher.start_tick(ByteBuffer::new());
        let label = publisher.node(&["inner", "label"]).unwrap();
        publisher.set(label, "hi".into()).unwrap();
        let buf = publisher.end_tick().unwrap();
        assert_eq!(
            json(&buf),
            r#"{"changes":[{"addr":[1,0],"value":"hi"},{}]}"#
        );
        assert_eq!(publisher.get(label).unwrap(), &Value::from("hi"));
    }

    #[test]
    fn marks_cleared_after_tick() {
        let mut publisher = Publisher::with_defaults(WireFormat::Json, schema());
        let count = publisher.node(&["count"]).unwrap();
        publisher.start_tick(ByteBuffer::new());
        publisher.set(count, Value::Signed(4)).unwrap();
        publisher.end_tick().unwrap();

        publisher.start_tick(ByteBuffer::new());
        let buf = publisher.end_tick().unwrap();
        assert_eq!(json(&buf), r#"{"changes":[{}]}"#);
    }

    #[test]
    fn element_log_in_order() {
        let mut publisher = Publisher::with_defaults(WireFormat::Json, schema());
        let list = publisher.node(&["list"]).unwrap();
        publisher.start_tick(ByteBuffer::new());
        publisher.vector_insert(list, 0, Value::Unsigned(5)).unwrap();
        publisher.vector_insert(list, 1, Value::Unsigned(6)).unwrap();
        publisher.vector_update(list, 0, Value::Unsigned(7)).unwrap();
        publisher.vector_remove(list, 1).unwrap();
        let buf = publisher.end_tick().unwrap();
        assert_eq!(
            json(&buf),
            concat!(
                r#"{"changes":["#,
                r#"{"addr":[2,0],"action":3,"value":5},"#,
                r#"{"addr":[2,1],"action":3,"value":6},"#,
                r#"{"addr":[2,0],"action":2,"value":7},"#,
                r#"{"addr":[2,1],"action":1},"#,
                r#"{}]}"#
            )
        );
        assert_eq!(
            publisher.get(list).unwrap(),
            &Value::Vector(vec![Value::Unsigned(7)])
        );
    }

    #[test]
    fn replaced_vector_sent_whole() {
        let mut publisher = Publisher::with_defaults(WireFormat::Json, schema());
        let list = publisher.node(&["list"]).unwrap();
        publisher.start_tick(ByteBuffer::new());
        publisher.vector_insert(list, 0, Value::Unsigned(1)).unwrap();
        publisher
            .set(list, Value::Vector(vec![Value::Unsigned(2), Value::Unsigned(3)]))
            .unwrap();
        publisher.vector_remove(list, 0).unwrap();
        let buf = publisher.end_tick().unwrap();
        assert_eq!(
            json(&buf),
            r#"{"changes":[{"addr":[2],"value":{"size":1,"data":[3]}},{}]}"#
        );
    }

    #[test]
    fn type_and_index_checks() {
        let mut publisher = Publisher::with_defaults(WireFormat::Gmq, schema());
        let count = publisher.node(&["count"]).unwrap();
        let list = publisher.node(&["list"]).unwrap();
        publisher.start_tick(ByteBuffer::new());

        assert_eq!(
            publisher.set(count, Value::Unsigned(1)).unwrap_err(),
            SyncError::TypeMismatch {
                expected: "signed",
                found: "unsigned",
            }
        );
        assert_eq!(
            publisher.vector_remove(list, 0).unwrap_err(),
            SyncError::IndexOutOfRange { index: 0, len: 0 }
        );
        assert!(matches!(
            publisher.vector_insert(count, 0, Value::Signed(1)),
            Err(SyncError::TypeMismatch {
                expected: "vector",
                ..
            })
        ));
        assert!(matches!(
            publisher.set(NodeId::new(99), Value::Signed(1)),
            Err(SyncError::UnknownNode { .. })
        ));
        assert!(matches!(
            publisher.set(NodeId::ROOT, Value::Struct(Vec::new())),
            Err(SyncError::InvalidAddress { .. })
        ));
        assert!(matches!(
            publisher.node(&["inner", "nope"]),
            Err(SyncError::UnknownField { path }) if path == "inner.nope"
        ));
    }

    #[test]
    fn json_rejects_non_finite() {
        let mut publisher = Publisher::with_defaults(WireFormat::Json, schema());
        let ratio = publisher.node(&["inner", "ratio"]).unwrap();
        publisher.start_tick(ByteBuffer::new());
        assert_eq!(
            publisher.set(ratio, Value::Real(f64::NAN)).unwrap_err(),
            SyncError::Wire(WireError::NonFiniteReal)
        );

        let mut publisher = Publisher::with_defaults(WireFormat::Gmq, schema());
        let ratio = publisher.node(&["inner", "ratio"]).unwrap();
        publisher.start_tick(ByteBuffer::new());
        publisher.set(ratio, Value::Real(f64::INFINITY)).unwrap();
    }

    #[test]
    fn dictionary_log_in_order() {
        let mut publisher = Publisher::with_defaults(WireFormat::Json, schema());
        let tags = publisher.node(&["tags"]).unwrap();
        publisher.start_tick(ByteBuffer::new());
        publisher
            .dictionary_insert(tags, "a".into(), Value::Signed(1))
            .unwrap();
        publisher
            .dictionary_insert(tags, "b".into(), Value::Signed(2))
            .unwrap();
        publisher
            .dictionary_update(tags, "a".into(), Value::Signed(-3))
            .unwrap();
        publisher.dictionary_remove(tags, "b".into()).unwrap();
        let buf = publisher.end_tick().unwrap();
        assert_eq!(
            json(&buf),
            concat!(
                r#"{"changes":["#,
                r#"{"addr":[3,3],"key":"a","value":1},"#,
                r#"{"addr":[3,3],"key":"b","value":2},"#,
                r#"{"addr":[3,2],"key":"a","value":-3},"#,
                r#"{"addr":[3,1],"key":"b"},"#,
                r#"{}]}"#
            )
        );
        assert_eq!(
            publisher.get(tags).unwrap(),
            &Value::Dictionary(vec![("a".into(), Value::Signed(-3))])
        );
    }

    #[test]
    fn dictionary_key_checks() {
        let mut publisher = Publisher::with_defaults(WireFormat::Gmq, schema());
        let tags = publisher.node(&["tags"]).unwrap();
        let list = publisher.node(&["list"]).unwrap();
        publisher.start_tick(ByteBuffer::new());
        publisher
            .dictionary_insert(tags, "a".into(), Value::Signed(1))
            .unwrap();

        assert_eq!(
            publisher
                .dictionary_insert(tags, "a".into(), Value::Signed(2))
                .unwrap_err(),
            SyncError::KeyExists {
                key: "\"a\"".to_string()
            }
        );
        assert_eq!(
            publisher
                .dictionary_update(tags, "z".into(), Value::Signed(2))
                .unwrap_err(),
            SyncError::KeyNotFound {
                key: "\"z\"".to_string()
            }
        );
        assert!(matches!(
            publisher.dictionary_remove(tags, Value::Unsigned(1)),
            Err(SyncError::KeyNotFound { .. })
        ));
        assert!(matches!(
            publisher.dictionary_insert(tags, Value::Unsigned(1), Value::Signed(0)),
            Err(SyncError::TypeMismatch {
                expected: "string",
                ..
            })
        ));
        assert!(matches!(
            publisher.dictionary_remove(list, "a".into()),
            Err(SyncError::TypeMismatch {
                expected: "dictionary",
                ..
            })
        ));
    }

    #[test]
    fn replaced_dictionary_sent_whole() {
        let mut publisher = Publisher::with_defaults(WireFormat::Json, schema());
        let tags = publisher.node(&["tags"]).unwrap();
        publisher.start_tick(ByteBuffer::new());
        publisher
            .dictionary_insert(tags, "a".into(), Value::Signed(1))
            .unwrap();
        publisher
            .set(tags, Value::Dictionary(vec![("b".into(), Value::Signed(2))]))
            .unwrap();
        publisher.dictionary_remove(tags, "b".into()).unwrap();
        let buf = publisher.end_tick().unwrap();
        assert_eq!(
            json(&buf),
            r#"{"changes":[{"addr":[3],"value":{"size":0,"data":[]}},{}]}"#
        );
    }

    #[test]
    fn failed_end_tick_rolls_back_buffer() {
        let mut publisher = Publisher::with_defaults(WireFormat::Json, schema());
        let count = publisher.node(&["count"]).unwrap();
        let ratio = publisher.node(&["inner", "ratio"]).unwrap();
        publisher.start_tick(ByteBuffer::from(&b"prior"[..]));
        publisher.set(count, Value::Signed(2)).unwrap();
        publisher.set(ratio, Value::Real(0.5)).unwrap();
        // Bypass the set-time check so composing the update fails midway.
        if let Some(slot) = publisher.data.at_mut(&[1, 1]) {
            *slot = Value::Real(f64::NAN);
        }

        assert_eq!(
            publisher.end_tick().unwrap_err(),
            SyncError::Wire(WireError::NonFiniteReal)
        );
        assert!(publisher.is_tick_open());
        assert_eq!(publisher.tick(), 0);

        publisher.set(ratio, Value::Real(0.25)).unwrap();
        let buf = publisher.end_tick().unwrap();
        assert_eq!(
            json(&buf),
            r#"prior{"changes":[{"addr":[0],"value":2},{"addr":[1,1],"value":0.25},{}]}"#
        );
    }

    #[test]
    fn new_checks_shape() {
        let err = Publisher::new(WireFormat::Gmq, schema(), Value::Signed(1)).unwrap_err();
        assert!(matches!(err, SyncError::TypeMismatch { .. }));
    }

    #[test]
    fn state_sync_matches_value_layout() {
        let publisher = Publisher::with_defaults(WireFormat::Json, schema());
        let mut buf = ByteBuffer::new();
        publisher
            .generate_state_sync_message(&mut Composer::json(&mut buf))
            .unwrap();
        assert_eq!(
            json(&buf),
            r#"{"count":0,"inner":{"label":"","ratio":0},"list":{"size":0,"data":[]},"tags":{"size":0,"data":[]}}"#
        );
    }
}
