//! Named per-pore and per-throat fields of a phase.
//!
//! A [`Phase`] is the conductance source of the transport algorithm. Fields
//! are looked up by name once and then addressed through a [`FieldId`]
//! handle. Every write bumps the field's generation so that caches built
//! from a field can tell when they went stale.

use super::topology::Topology;
use super::types::Element;
use crate::error::{Result, TransportError};

/// Typed handle to a field on a [`Phase`].
///
/// A handle is only meaningful for the phase that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId {
    index: usize,
    element: Element,
}

impl FieldId {
    /// Element the field is defined on.
    pub fn element(&self) -> Element {
        self.element
    }
}

#[derive(Debug, Clone)]
struct Field {
    name: String,
    element: Element,
    values: Vec<f64>,
    generation: u64,
}

/// A fluid or solid phase holding named property fields.
#[derive(Debug, Clone)]
pub struct Phase {
    name: String,
    num_pores: usize,
    num_throats: usize,
    fields: Vec<Field>,
    next_generation: u64,
}

impl Phase {
    /// Create an empty phase sized for `num_pores` pores and `num_throats` throats.
    pub fn new(name: impl Into<String>, num_pores: usize, num_throats: usize) -> Self {
        Self {
            name: name.into(),
            num_pores,
            num_throats,
            fields: Vec::new(),
            next_generation: 0,
        }
    }

    /// Create an empty phase sized for a network.
    pub fn for_network<T: Topology + ?Sized>(name: impl Into<String>, network: &T) -> Self {
        Self::new(name, network.num_pores(), network.num_throats())
    }

    /// Phase name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of pores the phase is sized for.
    pub fn num_pores(&self) -> usize {
        self.num_pores
    }

    /// Number of throats the phase is sized for.
    pub fn num_throats(&self) -> usize {
        self.num_throats
    }

    /// Insert or replace a field.
    pub fn set_field(
        &mut self,
        name: impl Into<String>,
        element: Element,
        values: Vec<f64>,
    ) -> Result<FieldId> {
        let name = name.into();
        let expected = match element {
            Element::Pore => self.num_pores,
            Element::Throat => self.num_throats,
        };
        if values.len() != expected {
            return Err(TransportError::FieldLength {
                name,
                expected,
                actual: values.len(),
            });
        }

        let generation = self.bump();
        let field = Field {
            name,
            element,
            values,
            generation,
        };

        let index = match self.fields.iter().position(|f| f.name == field.name) {
            Some(index) => {
                self.fields[index] = field;
                index
            }
            None => {
                self.fields.push(field);
                self.fields.len() - 1
            }
        };

        Ok(FieldId { index, element })
    }

    /// Insert or replace a throat field.
    pub fn set_throat_field(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<FieldId> {
        self.set_field(name, Element::Throat, values)
    }

    /// Insert or replace a pore field.
    pub fn set_pore_field(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<FieldId> {
        self.set_field(name, Element::Pore, values)
    }

    /// Resolve a field name to its handle.
    pub fn field_id(&self, name: &str) -> Result<FieldId> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .map(|index| FieldId {
                index,
                element: self.fields[index].element,
            })
            .ok_or_else(|| TransportError::UnknownField {
                name: name.to_string(),
                phase: self.name.clone(),
            })
    }

    /// Field values by handle.
    ///
    /// # Panics
    /// If `id` was issued by another phase with fewer fields.
    pub fn values(&self, id: FieldId) -> &[f64] {
        &self.fields[id.index].values
    }

    /// Mutable field values by handle. Counts as a write.
    ///
    /// # Panics
    /// If `id` was issued by another phase with fewer fields.
    pub fn values_mut(&mut self, id: FieldId) -> &mut [f64] {
        let generation = self.bump();
        let field = &mut self.fields[id.index];
        field.generation = generation;
        &mut field.values
    }

    /// Field values by name.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.values.as_slice())
    }

    /// Generation stamp of the last write to a field.
    ///
    /// # Panics
    /// If `id` was issued by another phase with fewer fields.
    pub fn generation(&self, id: FieldId) -> u64 {
        self.fields[id.index].generation
    }

    /// Names of all fields.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_length_is_checked() {
        let mut phase = Phase::new("water", 3, 2);
        assert!(phase.set_throat_field("throat.conductance", vec![1.0; 2]).is_ok());
        let err = phase.set_throat_field("throat.area", vec![1.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            TransportError::FieldLength { expected: 2, actual: 3, .. }
        ));
    }

    #[test]
    fn test_handle_survives_replacement() {
        let mut phase = Phase::new("water", 3, 2);
        let id = phase.set_throat_field("g", vec![1.0, 1.0]).unwrap();
        let again = phase.set_throat_field("g", vec![2.0, 3.0]).unwrap();
        assert_eq!(id, again);
        assert_eq!(phase.values(id), &[2.0, 3.0]);
        assert_eq!(phase.field_id("g").unwrap(), id);
    }

    #[test]
    fn test_writes_bump_generation() {
        let mut phase = Phase::new("air", 2, 1);
        let id = phase.set_throat_field("g", vec![1.0]).unwrap();
        let before = phase.generation(id);
        phase.values_mut(id)[0] = 4.0;
        assert!(phase.generation(id) > before);
        assert_eq!(phase.get("g"), Some(&[4.0][..]));
    }

    #[test]
    #[should_panic]
    fn test_handle_from_another_phase() {
        let mut water = Phase::new("water", 2, 1);
        water.set_throat_field("g", vec![1.0]).unwrap();
        let id = water.set_throat_field("throat.area", vec![2.0]).unwrap();

        let air = Phase::new("air", 2, 1);
        air.values(id);
    }

    #[test]
    fn test_unknown_field() {
        let phase = Phase::new("air", 2, 1);
        assert!(matches!(
            phase.field_id("nope"),
            Err(TransportError::UnknownField { .. })
        ));
    }
}
