//! Applying side of state sync.

use schema::{FieldType, Schema, StructDef};
use tracing::{debug, trace};
use wire::{ParseMessage, Parser};

use crate::envelope::{self, DictionaryAction, ElementAction};
use crate::error::{LimitKind, SyncError, SyncResult};
use crate::limits::SyncLimits;
use crate::snapshot::{parse_value, StructSink};
use crate::tree::resolve_path;
use crate::value::Value;

/// Replica of a publisher's value tree.
///
/// Starts at zero values; a state sync message replaces it whole and update
/// messages patch it. A failed update leaves the replica untouched.
#[derive(Debug, Clone)]
pub struct Subscriber {
    schema: Schema,
    data: Value,
    limits: SyncLimits,
}

impl Subscriber {
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self::with_limits(schema, SyncLimits::default())
    }

    #[must_use]
    pub fn with_limits(schema: Schema, limits: SyncLimits) -> Self {
        let data = Value::Struct(
            schema
                .root()
                .fields
                .iter()
                .map(|field| Value::default_for(&field.ty))
                .collect(),
        );
        Self {
            schema,
            data,
            limits,
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn limits(&self) -> &SyncLimits {
        &self.limits
    }

    /// The replica root value.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Value of a field by name path, e.g. `["aggregate", "name"]`.
    #[must_use]
    pub fn field(&self, path: &[&str]) -> Option<&Value> {
        let (address, _) = resolve_path(self.schema.root(), path)?;
        self.data.at(&address)
    }

    #[must_use]
    pub fn schema_hash(&self) -> u64 {
        schema::schema_hash(&self.schema)
    }

    /// Fails if a peer announced a different schema fingerprint.
    pub fn check_schema_hash(&self, found: u64) -> SyncResult<()> {
        let expected = self.schema_hash();
        if found != expected {
            return Err(SyncError::SchemaMismatch { expected, found });
        }
        Ok(())
    }

    /// Replaces the replica with a full state sync message.
    pub fn apply_state_sync_message(&mut self, parser: &mut Parser<'_>) -> SyncResult<()> {
        let mut sink = StructSink::new(self.schema.root());
        sink.parse(parser)?;
        self.data = Value::Struct(sink.fields);
        debug!("applied state sync message");
        Ok(())
    }

    /// Applies one update message and returns the number of changes it held.
    pub fn apply_message_with_updates(&mut self, parser: &mut Parser<'_>) -> SyncResult<usize> {
        let mut replica = self.data.clone();
        envelope::parse_update_begin(parser)?;
        let mut applied = 0;
        while let Some(address) = envelope::parse_change_address(parser, &self.limits)? {
            if applied >= self.limits.max_changes_per_update {
                return Err(SyncError::LimitsExceeded {
                    kind: LimitKind::ChangesPerUpdate,
                    limit: self.limits.max_changes_per_update,
                    actual: applied + 1,
                });
            }
            apply_at(parser, self.schema.root(), &mut replica, &address, &address)?;
            envelope::parse_change_end(parser)?;
            trace!(?address, "change applied");
            applied += 1;
        }
        self.data = replica;
        debug!(changes = applied, "applied update message");
        Ok(applied)
    }
}

/// Walks `address` through struct fields of `def` and applies the change found there.
fn apply_at(
    parser: &mut Parser<'_>,
    def: &StructDef,
    target: &mut Value,
    address: &[u64],
    full: &[u64],
) -> SyncResult<()> {
    let invalid = || SyncError::InvalidAddress {
        address: full.to_vec(),
    };
    let (&ordinal, tail) = address.split_first().ok_or_else(invalid)?;
    let index = usize::try_from(ordinal).map_err(|_| invalid())?;
    let field = def.fields.get(index).ok_or_else(invalid)?;
    let slot = match target {
        Value::Struct(fields) => fields.get_mut(index),
        _ => None,
    }
    .ok_or_else(invalid)?;

    match (&field.ty, tail) {
        (ty, []) => {
            envelope::parse_value_begin(parser)?;
            *slot = parse_value(parser, ty)?;
            Ok(())
        }
        (FieldType::Struct(inner), _) => apply_at(parser, inner, slot, tail, full),
        (FieldType::Vector(element), [position, member @ ..]) => {
            apply_element(parser, element, slot, *position, member, full)
        }
        (FieldType::Dictionary { key, value }, [code]) => {
            apply_keyed(parser, key, value, slot, *code, full)
        }
        _ => Err(invalid()),
    }
}

/// Applies a change to one vector element, or to a field inside a struct element.
fn apply_element(
    parser: &mut Parser<'_>,
    element: &FieldType,
    target: &mut Value,
    position: u64,
    member: &[u64],
    full: &[u64],
) -> SyncResult<()> {
    let Value::Vector(items) = target else {
        return Err(SyncError::InvalidAddress {
            address: full.to_vec(),
        });
    };
    let len = items.len();
    let out_of_range = || SyncError::IndexOutOfRange {
        index: position,
        len,
    };
    let index = usize::try_from(position).map_err(|_| out_of_range())?;

    if !member.is_empty() {
        let FieldType::Struct(def) = element else {
            return Err(SyncError::InvalidAddress {
                address: full.to_vec(),
            });
        };
        let item = items.get_mut(index).ok_or_else(out_of_range)?;
        return apply_at(parser, def, item, member, full);
    }

    match envelope::parse_action(parser)? {
        ElementAction::Remove => {
            if index >= len {
                return Err(out_of_range());
            }
            items.remove(index);
        }
        ElementAction::Update => {
            if index >= len {
                return Err(out_of_range());
            }
            envelope::parse_value_begin(parser)?;
            items[index] = parse_value(parser, element)?;
        }
        ElementAction::Insert => {
            if index > len {
                return Err(out_of_range());
            }
            envelope::parse_value_begin(parser)?;
            let value = parse_value(parser, element)?;
            items.insert(index, value);
        }
    }
    Ok(())
}

/// Applies a keyed dictionary change. The key is read before the value.
fn apply_keyed(
    parser: &mut Parser<'_>,
    key_ty: &FieldType,
    value_ty: &FieldType,
    target: &mut Value,
    code: u64,
    full: &[u64],
) -> SyncResult<()> {
    let Value::Dictionary(entries) = target else {
        return Err(SyncError::InvalidAddress {
            address: full.to_vec(),
        });
    };
    let action = DictionaryAction::from_code(code).ok_or(SyncError::InvalidAction { action: code })?;
    envelope::parse_key_begin(parser)?;
    let key = parse_value(parser, key_ty)?;
    let position = entries.iter().position(|(k, _)| *k == key);

    match (action, position) {
        (DictionaryAction::Remove, Some(position)) => {
            entries.remove(position);
        }
        (DictionaryAction::UpdateValue, Some(position)) => {
            envelope::parse_value_begin(parser)?;
            entries[position].1 = parse_value(parser, value_ty)?;
        }
        (DictionaryAction::Insert, None) => {
            envelope::parse_value_begin(parser)?;
            let value = parse_value(parser, value_ty)?;
            entries.push((key, value));
        }
        (DictionaryAction::Insert, Some(_)) => {
            return Err(SyncError::KeyExists {
                key: key.key_label(),
            });
        }
        (DictionaryAction::Remove | DictionaryAction::UpdateValue, None) => {
            return Err(SyncError::KeyNotFound {
                key: key.key_label(),
            });
        }
    }
    Ok(())
}
