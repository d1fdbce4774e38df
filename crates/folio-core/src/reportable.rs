//! The [`Reportable`] capability.

use crate::metadata::ReportRow;
use serde::Serialize;
use serde_json::Value;

/// An entity that can be exported as report rows.
///
/// The entity is serialized with `serde` once per lookup batch and fields are
/// resolved by name against that value. Dotted paths such as `address.city`
/// reach into nested objects. Implementors can override
/// [`Reportable::resolve_field`] to expose computed or renamed fields.
///
/// # Example
///
/// ```
/// use folio_core::Reportable;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Employee {
///     first_name: String,
///     last_name: String,
/// }
///
/// impl Reportable for Employee {}
///
/// let employee = Employee { first_name: "Sad".into(), last_name: "Panda".into() };
/// assert_eq!(employee.field_value("lastName"), Some("Panda".into()));
/// ```
pub trait Reportable: Serialize + Send + Sync {
    /// Resolves `field` against `serialized`, the serde form of `self`.
    fn resolve_field(&self, serialized: &Value, field: &str) -> Option<Value> {
        lookup_path(serialized, field).cloned()
    }

    /// Returns the values of `fields`, in that order.
    ///
    /// An entity that fails to serialize has no fields.
    fn field_values(&self, fields: &[&str]) -> Vec<Option<Value>> {
        let serialized = serde_json::to_value(self).unwrap_or(Value::Null);
        fields
            .iter()
            .map(|field| self.resolve_field(&serialized, field))
            .collect()
    }

    /// Returns the value of a field, or `None` when the entity has no such field.
    fn field_value(&self, field: &str) -> Option<Value> {
        self.field_values(&[field]).pop().flatten()
    }

    /// Projects the entity onto `fields`, in that order.
    ///
    /// Fields the entity does not have are left out of the row.
    fn to_row(&self, fields: &[&str]) -> ReportRow {
        fields
            .iter()
            .zip(self.field_values(fields))
            .filter_map(|(field, value)| value.map(|v| ((*field).to_string(), v)))
            .collect()
    }
}

/// Resolves a dotted path against a JSON value.
fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(direct) = value.get(path) {
        return Some(direct);
    }
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}
