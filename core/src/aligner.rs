//! Schema alignment: sparse record in, one slot per schema feature out.
//!
//! RULES:
//!   - Missing fields are expected, never an error. They become absent slots.
//!   - Fields outside the schema are dropped.
//!   - Present values are coerced to the feature's kind; a value that cannot
//!     be coerced (or is NaN/∞) becomes an absent slot.
//!   - Aligning an aligned record yields the same record.

use crate::{
    schema::{FeatureKind, Schema},
    transform::Coercion,
    types::{FeatureValue, FieldSource},
};

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSlot {
    pub name:  String,
    pub kind:  FeatureKind,
    pub value: Option<FeatureValue>,
}

/// A schema-ordered record with explicit gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRecord {
    slots: Vec<AlignedSlot>,
}

impl AlignedRecord {
    pub fn slots(&self) -> &[AlignedSlot] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<AlignedSlot> {
        self.slots
    }

    pub fn absent(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(|s| s.value.is_none())
            .map(|s| s.name.as_str())
    }

    pub fn absent_count(&self) -> usize {
        self.absent().count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FieldSource for AlignedRecord {
    fn field(&self, name: &str) -> Option<&FeatureValue> {
        self.slots
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.value.as_ref())
    }
}

pub struct SchemaAligner<'a> {
    schema:   &'a Schema,
    coercion: &'a Coercion,
}

impl<'a> SchemaAligner<'a> {
    pub fn new(schema: &'a Schema, coercion: &'a Coercion) -> Self {
        Self { schema, coercion }
    }

    pub fn align<S: FieldSource + ?Sized>(&self, source: &S) -> AlignedRecord {
        let slots = self
            .schema
            .features()
            .iter()
            .map(|spec| AlignedSlot {
                name:  spec.name.clone(),
                kind:  spec.kind,
                value: source
                    .field(&spec.name)
                    .and_then(|v| self.coercion.coerce(spec.kind, v)),
            })
            .collect();
        AlignedRecord { slots }
    }
}
