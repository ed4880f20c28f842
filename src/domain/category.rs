//! Category rows of the normalized schema.

use crate::{
    errors::{ExpenseError, Result},
    storage::Row,
};

/// A named grouping of expenses. Names are unique and matched exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl Category {
    /// Decodes a `(category_id, category_name)` row.
    pub fn from_row(row: &Row) -> Result<Self> {
        let id = row
            .first()
            .and_then(|value| value.as_i64())
            .ok_or_else(|| ExpenseError::Query("category row is missing its id".into()))?;
        let name = row
            .get(1)
            .and_then(|value| value.as_text())
            .ok_or_else(|| ExpenseError::Query(format!("category {id} is missing its name")))?;
        Ok(Self { id, name })
    }
}
