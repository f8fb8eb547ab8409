//! Query condition DSL and the filtered-query builder.
//!
//! A query starts from a collection and folds in [`Condition`]s one at a
//! time; every condition narrows the result set by logical AND, so the
//! order they are applied in never changes the final result set. Sorting
//! is applied after all filters, and the limit truncates last.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

/// Filter operator applied to a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "array-contains")]
    ArrayContains,
    #[serde(rename = "array-contains-any")]
    ArrayContainsAny,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not-in")]
    NotIn,
}

impl FieldOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOp::Eq => "==",
            FieldOp::Ne => "!=",
            FieldOp::Lt => "<",
            FieldOp::Lte => "<=",
            FieldOp::Gt => ">",
            FieldOp::Gte => ">=",
            FieldOp::ArrayContains => "array-contains",
            FieldOp::ArrayContainsAny => "array-contains-any",
            FieldOp::In => "in",
            FieldOp::NotIn => "not-in",
        }
    }
}

impl fmt::Display for FieldOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(FieldOp::Eq),
            "!=" => Ok(FieldOp::Ne),
            "<" => Ok(FieldOp::Lt),
            "<=" => Ok(FieldOp::Lte),
            ">" => Ok(FieldOp::Gt),
            ">=" => Ok(FieldOp::Gte),
            "array-contains" => Ok(FieldOp::ArrayContains),
            "array-contains-any" => Ok(FieldOp::ArrayContainsAny),
            "in" => Ok(FieldOp::In),
            "not-in" => Ok(FieldOp::NotIn),
            _ => Err(Error::Serialization(format!("unknown operator: {}", s))),
        }
    }
}

/// A single filter predicate: an immutable `(field, operator, value)`
/// triple. Multiple conditions on one query are conjunctive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub op: FieldOp,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: FieldOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

/// Field expression builder for fluent condition construction.
pub struct Field {
    name: String,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn eq(self, value: impl Into<Value>) -> Condition {
        Condition::new(self.name, FieldOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Condition {
        Condition::new(self.name, FieldOp::Ne, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Condition {
        Condition::new(self.name, FieldOp::Lt, value)
    }

    pub fn lte(self, value: impl Into<Value>) -> Condition {
        Condition::new(self.name, FieldOp::Lte, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Condition {
        Condition::new(self.name, FieldOp::Gt, value)
    }

    pub fn gte(self, value: impl Into<Value>) -> Condition {
        Condition::new(self.name, FieldOp::Gte, value)
    }

    /// The field is an array containing `value`.
    pub fn contains(self, value: impl Into<Value>) -> Condition {
        Condition::new(self.name, FieldOp::ArrayContains, value)
    }

    /// The field is an array sharing at least one element with `values`.
    pub fn contains_any(self, values: Vec<Value>) -> Condition {
        Condition::new(self.name, FieldOp::ArrayContainsAny, Value::Array(values))
    }

    /// The field's value is one of `values`.
    pub fn is_in(self, values: Vec<Value>) -> Condition {
        Condition::new(self.name, FieldOp::In, Value::Array(values))
    }

    /// The field is present and its value is none of `values`.
    pub fn not_in(self, values: Vec<Value>) -> Condition {
        Condition::new(self.name, FieldOp::NotIn, Value::Array(values))
    }
}

/// Create a field expression.
pub fn field(name: impl Into<String>) -> Field {
    Field::new(name)
}

/// Single-field sort specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Named optional query parameters.
///
/// Passed to `DocumentStore::query_documents` alongside the condition
/// list; avoids the silent misordering that positional optional
/// arguments invite.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub order_by: Option<String>,
    pub direction: SortDirection,
    pub limit: Option<usize>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort results by `field` in `direction`.
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(field.into());
        self.direction = direction;
        self
    }

    /// Cap the number of results. A zero limit means unbounded.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = if n > 0 { Some(n) } else { None };
        self
    }
}

/// A complete query against one collection: an ordered condition list,
/// optional single-field sort, and an optional result cap.
///
/// # Example
/// ```
/// use acorndb::{field, QuerySpec, SortDirection};
///
/// let spec = QuerySpec::collection("products")
///     .filter(field("price").gte(100))
///     .filter(field("categories").contains("electronics"))
///     .order_by("price", SortDirection::Descending)
///     .limit(10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub collection: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl QuerySpec {
    /// Start a query over every document in `collection`. With no
    /// conditions folded in, this is equivalent to a full collection
    /// read.
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            conditions: Vec::new(),
            sort: None,
            limit: None,
        }
    }

    /// Fold one condition into the query. Each condition narrows the
    /// result set by logical AND.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Fold a sequence of conditions into the query.
    pub fn filters(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    /// Sort results by a single field, applied after all filters.
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec {
            field: field.into(),
            direction,
        });
        self
    }

    /// Truncate the (ordered) result to at most `n` documents. A zero
    /// limit means unbounded. Without a sort, which documents survive
    /// the cut is store-defined.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = if n > 0 { Some(n) } else { None };
        self
    }

    /// Apply the sort/limit half of a query from named options.
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        if let Some(order_by) = options.order_by {
            self = self.order_by(order_by, options.direction);
        }
        if let Some(limit) = options.limit {
            self = self.limit(limit);
        }
        self
    }
}
