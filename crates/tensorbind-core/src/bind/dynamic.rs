use serde::ser::{Serialize, SerializeMap, Serializer};

use super::error::BindError;
use super::field::FieldSlot;
use super::registry::{FieldRegistry, TensorRecord};
use crate::decode::DecodeError;
use crate::tensor::{TensorValue, ValueKind};

/// Field whose static type is chosen at runtime.
///
/// It accepts exactly one `ValueKind`, with the same strictness as a typed
/// Rust field.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicField {
    kind: ValueKind,
    value: Option<TensorValue>,
}

impl DynamicField {
    pub fn new(kind: ValueKind) -> Self {
        Self { kind, value: None }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> Option<&TensorValue> {
        self.value.as_ref()
    }
}

impl FieldSlot for DynamicField {
    fn expected(&self) -> ValueKind {
        self.kind
    }

    fn assign(&mut self, value: TensorValue) -> Result<(), BindError> {
        self.check(value.kind())?;
        self.value = Some(value);
        Ok(())
    }
}

/// Destination record described at runtime by `name=type` field specs.
///
/// Field names are unique. Serializes as a map in declaration order;
/// fields that no output filled serialize as `null`.
///
/// # Examples
/// ```
/// use tensorbind_core::DynamicRecord;
///
/// let record = DynamicRecord::from_specs(["score=f32", "labels=Vec<String>"]).unwrap();
/// assert_eq!(record.len(), 2);
/// assert!(DynamicRecord::from_specs(["score=u64"]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicRecord {
    fields: Vec<(String, DynamicField)>,
}

impl DynamicRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs<I, S>(specs: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut record = Self::new();
        for spec in specs {
            record.add_spec(spec.as_ref())?;
        }
        Ok(record)
    }

    /// Add a field from `name=type`, e.g. `scores=Vec<f32>`.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidTarget` when the spec has no `=`, an
    /// empty or already declared name, or a type that cannot be bound.
    pub fn add_spec(&mut self, spec: &str) -> Result<(), DecodeError> {
        let (name, kind) = spec.split_once('=').ok_or_else(|| DecodeError::InvalidTarget {
            reason: format!("field spec '{spec}' is not of the form name=type"),
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(DecodeError::InvalidTarget {
                reason: format!("field spec '{spec}' has an empty name"),
            });
        }
        if self.position(name).is_some() {
            return Err(DecodeError::InvalidTarget {
                reason: format!("field '{name}' is declared twice"),
            });
        }
        let kind: ValueKind = kind.parse().map_err(|err| DecodeError::InvalidTarget {
            reason: format!("field '{name}': {err}"),
        })?;
        self.add_field(name, kind);
        Ok(())
    }

    /// Add a field, replacing any field of the same name in place.
    pub fn add_field(&mut self, name: impl Into<String>, kind: ValueKind) {
        let name = name.into();
        let field = DynamicField::new(kind);
        match self.position(&name) {
            Some(index) => self.fields[index].1 = field,
            None => self.fields.push((name, field)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TensorValue> {
        self.position(name)
            .and_then(|index| self.fields[index].1.value())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|(field_name, _)| field_name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TensorRecord for DynamicRecord {
    fn register_fields<'a>(&'a mut self, registry: &mut FieldRegistry<'a>) {
        for (name, field) in self.fields.iter_mut() {
            registry.register(name.as_str(), field);
        }
    }
}

impl Serialize for DynamicRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, field) in &self.fields {
            map.serialize_entry(name, &field.value)?;
        }
        map.end()
    }
}
