//! Filter and sort criteria.
//!
//! The export layer forwards [`Filters`] and [`Sort`] to the repository
//! unchanged. The helpers here let in-memory repositories evaluate them
//! against any [`Reportable`] entity.

use crate::reportable::Reportable;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Equal to the value.
    #[default]
    #[serde(alias = "=", alias = "equals")]
    Eq,
    /// Not equal to the value.
    #[serde(alias = "!=")]
    Ne,
    /// Greater than the value.
    #[serde(alias = ">")]
    Gt,
    /// Greater than or equal to the value.
    #[serde(alias = ">=")]
    Ge,
    /// Less than the value.
    #[serde(alias = "<")]
    Lt,
    /// Less than or equal to the value.
    #[serde(alias = "<=")]
    Le,
    /// String field contains the value.
    Contains,
    /// String field starts with the value.
    #[serde(alias = "startsWith")]
    StartsWith,
    /// Field equals one of the values in an array.
    In,
}

/// A single restriction on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Field identifier the restriction applies to.
    pub field: String,
    /// Comparison operator.
    #[serde(default)]
    pub operator: FilterOperator,
    /// Operand.
    #[serde(default)]
    pub value: Value,
}

impl Filter {
    /// Creates a filter.
    #[must_use]
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Creates an equality filter.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// Evaluates the filter against a field value.
    #[must_use]
    pub fn matches(&self, actual: Option<&Value>) -> bool {
        let ordering = || compare_values(actual, Some(&self.value));
        match self.operator {
            FilterOperator::Eq => ordering() == Ordering::Equal,
            FilterOperator::Ne => ordering() != Ordering::Equal,
            FilterOperator::Gt => actual.is_some() && ordering() == Ordering::Greater,
            FilterOperator::Ge => actual.is_some() && ordering() != Ordering::Less,
            FilterOperator::Lt => actual.is_some() && ordering() == Ordering::Less,
            FilterOperator::Le => actual.is_some() && ordering() != Ordering::Greater,
            FilterOperator::Contains => match (actual, &self.value) {
                (Some(Value::String(s)), Value::String(needle)) => s.contains(needle.as_str()),
                (Some(Value::Array(items)), needle) => items.contains(needle),
                _ => false,
            },
            FilterOperator::StartsWith => match (actual, &self.value) {
                (Some(Value::String(s)), Value::String(prefix)) => s.starts_with(prefix.as_str()),
                _ => false,
            },
            FilterOperator::In => match &self.value {
                Value::Array(candidates) => candidates
                    .iter()
                    .any(|c| compare_values(actual, Some(c)) == Ordering::Equal),
                _ => false,
            },
        }
    }
}

/// A conjunction of [`Filter`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(Vec<Filter>);

impl Filters {
    /// Creates an empty filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter, returning the set.
    #[must_use]
    pub fn with(mut self, filter: Filter) -> Self {
        self.0.push(filter);
        self
    }

    /// Returns the filters.
    #[must_use]
    pub fn as_slice(&self) -> &[Filter] {
        &self.0
    }

    /// Returns `true` if there are no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the entity satisfies every filter.
    pub fn matches<T: Reportable + ?Sized>(&self, entity: &T) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let fields: Vec<&str> = self.0.iter().map(|f| f.field.as_str()).collect();
        self.0
            .iter()
            .zip(entity.field_values(&fields))
            .all(|(filter, actual)| filter.matches(actual.as_ref()))
    }
}

impl From<Vec<Filter>> for Filters {
    fn from(filters: Vec<Filter>) -> Self {
        Self(filters)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending.
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    /// Descending.
    #[serde(alias = "DESC")]
    Desc,
}

/// Ordering on one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Field identifier to order by.
    pub property: String,
    /// Direction, ascending by default.
    #[serde(default)]
    pub direction: Direction,
}

impl Order {
    /// Ascending order on `property`.
    #[must_use]
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    /// Descending order on `property`.
    #[must_use]
    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

/// Lexicographic ordering over several properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort(Vec<Order>);

impl Sort {
    /// Creates an empty sort.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by a single property.
    #[must_use]
    pub fn by(order: Order) -> Self {
        Self(vec![order])
    }

    /// Adds a tie-breaking order, returning the sort.
    #[must_use]
    pub fn then(mut self, order: Order) -> Self {
        self.0.push(order);
        self
    }

    /// Returns the orders.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.0
    }

    /// Returns `true` if no order is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compares two entities under this sort.
    pub fn compare<T: Reportable + ?Sized>(&self, a: &T, b: &T) -> Ordering {
        self.compare_keys(&self.keys(a), &self.keys(b))
    }

    /// The values of the sorted properties of `entity`, in order.
    pub fn keys<T: Reportable + ?Sized>(&self, entity: &T) -> Vec<Option<Value>> {
        let properties: Vec<&str> = self.0.iter().map(|o| o.property.as_str()).collect();
        entity.field_values(&properties)
    }

    /// Compares two key lists produced by [`Sort::keys`].
    #[must_use]
    pub fn compare_keys(&self, a: &[Option<Value>], b: &[Option<Value>]) -> Ordering {
        for (i, order) in self.0.iter().enumerate() {
            let ordering = compare_values(
                a.get(i).and_then(Option::as_ref),
                b.get(i).and_then(Option::as_ref),
            );
            let ordering = match order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl From<Vec<Order>> for Sort {
    fn from(orders: Vec<Order>) -> Self {
        Self(orders)
    }
}

/// Total order over optional JSON values.
///
/// Missing and `null` sort lowest, then booleans, numbers, strings and
/// composite values. Numbers compare numerically and strings
/// lexicographically.
#[must_use]
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    static NULL: Value = Value::Null;
    let a = a.unwrap_or(&NULL);
    let b = b.unwrap_or(&NULL);
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ if rank(a) != rank(b) => rank(a).cmp(&rank(b)),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

const fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
