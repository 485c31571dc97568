//! Name-driven partial updates.
//!
//! Every patchable entity owns a [`FieldRegistry`]: a dispatch table from the
//! attribute's wire name to a setter that deserializes a JSON value straight
//! into the attribute. The table is built once per entity type, so an unknown
//! name is rejected by a map lookup.

use derive_more::Display;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub type FieldSetter<T> = fn(&mut T, Value) -> Result<(), serde_json::Error>;

#[derive(Debug, Display, PartialEq)]
pub enum PatchError {
    #[display(fmt = "Field '{}' does not exist in {}", field, entity)]
    UnknownField { entity: &'static str, field: String },

    #[display(fmt = "Field '{}' cannot be updated", field)]
    ReadOnlyField { field: String },

    #[display(fmt = "Invalid value for field '{}': {}", field, reason)]
    InvalidValue { field: String, reason: String },
}

impl std::error::Error for PatchError {}

pub struct FieldRegistry<T> {
    entity: &'static str,
    setters: HashMap<&'static str, FieldSetter<T>>,
    read_only: &'static [&'static str],
}

impl<T: Clone> FieldRegistry<T> {
    pub fn new(
        entity: &'static str,
        setters: HashMap<&'static str, FieldSetter<T>>,
        read_only: &'static [&'static str],
    ) -> Self {
        Self {
            entity,
            setters,
            read_only,
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.setters.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.setters.keys().copied()
    }

    /// Returns a copy of `record` with every field in `fields` overwritten.
    ///
    /// All names are resolved before the first assignment, and assignments
    /// happen on the copy, so on error `record` is exactly as it was.
    pub fn apply(&self, record: &T, fields: Map<String, Value>) -> Result<T, PatchError> {
        let mut resolved = Vec::with_capacity(fields.len());
        for (field, value) in fields {
            if self.read_only.contains(&field.as_str()) {
                return Err(PatchError::ReadOnlyField { field });
            }
            let Some(setter) = self.setters.get(field.as_str()).copied() else {
                return Err(PatchError::UnknownField {
                    entity: self.entity,
                    field,
                });
            };
            resolved.push((field, setter, value));
        }

        let mut patched = record.clone();
        for (field, setter, value) in resolved {
            setter(&mut patched, value).map_err(|e| PatchError::InvalidValue {
                field,
                reason: e.to_string(),
            })?;
        }
        Ok(patched)
    }
}

/// Implemented by records that accept `PATCH` field maps.
pub trait Patchable: Clone + Sized + 'static {
    fn field_registry() -> &'static FieldRegistry<Self>;
}

/// Builds a [`FieldRegistry`] from `"wireName" => rust_field` pairs.
#[macro_export]
macro_rules! field_registry {
    (
        $entity:literal, $ty:ty,
        read_only: [$($read_only:literal),* $(,)?],
        fields: { $($name:literal => $field:ident),* $(,)? }
    ) => {{
        let mut setters: ::std::collections::HashMap<
            &'static str,
            $crate::model::patch::FieldSetter<$ty>,
        > = ::std::collections::HashMap::new();
        $(
            setters.insert($name, |record: &mut $ty, value: ::serde_json::Value| {
                record.$field = ::serde_json::from_value(value)?;
                Ok(())
            });
        )*
        $crate::model::patch::FieldRegistry::new($entity, setters, &[$($read_only),*])
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use serde_json::json;

    #[derive(Clone, Debug, PartialEq, Default)]
    struct Gadget {
        id: Option<u64>,
        label: String,
        enabled: bool,
        weight: Option<f64>,
    }

    static GADGET_FIELDS: Lazy<FieldRegistry<Gadget>> = Lazy::new(|| {
        field_registry!("Gadget", Gadget,
            read_only: ["id"],
            fields: {
                "label" => label,
                "enabled" => enabled,
                "weight" => weight,
            }
        )
    });

    fn gadget() -> Gadget {
        Gadget {
            id: Some(3),
            label: "probe".into(),
            enabled: true,
            weight: Some(1.5),
        }
    }

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn overwrites_only_named_fields() {
        let original = gadget();
        let patched = GADGET_FIELDS
            .apply(&original, fields(json!({"enabled": false})))
            .unwrap();
        assert_eq!(
            patched,
            Gadget {
                enabled: false,
                ..original
            }
        );
    }

    #[test]
    fn null_clears_optional_field() {
        let patched = GADGET_FIELDS
            .apply(&gadget(), fields(json!({"weight": null})))
            .unwrap();
        assert_eq!(patched.weight, None);
    }

    #[test]
    fn empty_map_is_identity() {
        let patched = GADGET_FIELDS.apply(&gadget(), Map::new()).unwrap();
        assert_eq!(patched, gadget());
    }

    #[test]
    fn unknown_field_is_rejected_by_name() {
        let err = GADGET_FIELDS
            .apply(&gadget(), fields(json!({"label": "x", "colour": "red"})))
            .unwrap_err();
        assert_eq!(
            err,
            PatchError::UnknownField {
                entity: "Gadget",
                field: "colour".into()
            }
        );
    }

    #[test]
    fn read_only_field_is_rejected() {
        let err = GADGET_FIELDS
            .apply(&gadget(), fields(json!({"id": 99})))
            .unwrap_err();
        assert_eq!(err, PatchError::ReadOnlyField { field: "id".into() });
    }

    #[test]
    fn mistyped_value_reports_the_field() {
        let err = GADGET_FIELDS
            .apply(&gadget(), fields(json!({"enabled": "yes"})))
            .unwrap_err();
        assert!(matches!(err, PatchError::InvalidValue { ref field, .. } if field == "enabled"));
    }

    #[test]
    fn null_into_required_field_is_a_bad_value() {
        let err = GADGET_FIELDS
            .apply(&gadget(), fields(json!({"label": null})))
            .unwrap_err();
        assert!(matches!(err, PatchError::InvalidValue { ref field, .. } if field == "label"));
    }

    #[test]
    fn registry_lists_its_fields() {
        let mut names: Vec<_> = GADGET_FIELDS.field_names().collect();
        names.sort_unstable();
        assert_eq!(names, ["enabled", "label", "weight"]);
        assert!(!GADGET_FIELDS.contains("id"));
    }
}
