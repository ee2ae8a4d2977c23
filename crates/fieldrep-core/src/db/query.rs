//! Index-backed queries against the replica tables

use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::ToSql;

use crate::error::{Error, Result};
use crate::models::{RecordId, SyncStatus, Table};

/// A value compared against an indexed payload field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&RecordId> for FieldValue {
    fn from(value: &RecordId) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

impl From<SyncStatus> for FieldValue {
    fn from(value: SyncStatus) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

// json_extract yields 1/0 for JSON booleans
impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Text(text) => ToSqlOutput::Owned(Value::Text(text.clone())),
            Self::Integer(int) => ToSqlOutput::Owned(Value::Integer(*int)),
            Self::Real(real) => ToSqlOutput::Owned(Value::Real(*real)),
        })
    }
}

/// Sort direction for [`Query::order_by`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Equality filter and ordering over indexed payload fields.
///
/// Field names are checked against [`Table::indexed_fields`] before any SQL is
/// built, so only declared index paths ever reach the statement text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filter: Option<(String, FieldValue)>,
    order: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    /// Match every record
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Match records whose `field` equals `value`
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            filter: Some((field.into(), value.into())),
            ..Self::default()
        }
    }

    /// Order results by an indexed field, ascending
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order = Some((field.into(), Direction::Asc));
        self
    }

    /// Order results by an indexed field, descending
    #[must_use]
    pub fn order_by_desc(mut self, field: impl Into<String>) -> Self {
        self.order = Some((field.into(), Direction::Desc));
        self
    }

    /// Cap the number of results
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the `WHERE ... ORDER BY ... LIMIT ...` tail for `table`,
    /// returning the SQL fragment and its bound parameters.
    pub(crate) fn to_sql_tail(&self, table: Table) -> Result<(String, Vec<FieldValue>)> {
        let mut sql = String::new();
        let mut params = Vec::new();

        if let Some((field, value)) = &self.filter {
            check_indexed(table, field)?;
            sql.push_str(&format!(" WHERE json_extract(data, '$.{field}') = ?"));
            params.push(value.clone());
        }

        match &self.order {
            Some((field, direction)) => {
                check_indexed(table, field)?;
                let keyword = match direction {
                    Direction::Asc => "ASC",
                    Direction::Desc => "DESC",
                };
                sql.push_str(&format!(
                    " ORDER BY json_extract(data, '$.{field}') {keyword}, id ASC"
                ));
            }
            None => sql.push_str(" ORDER BY id ASC"),
        }

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push(FieldValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        Ok((sql, params))
    }
}

fn check_indexed(table: Table, field: &str) -> Result<()> {
    if table.is_indexed(field) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Field '{field}' is not indexed on table {table}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_orders_by_id() {
        let (sql, params) = Query::all().to_sql_tail(Table::Clients).unwrap();
        assert_eq!(sql, " ORDER BY id ASC");
        assert!(params.is_empty());
    }

    #[test]
    fn test_eq_with_order_and_limit() {
        let (sql, params) = Query::eq("rep_id", "rep-1")
            .order_by_desc("check_in_time")
            .limit(5)
            .to_sql_tail(Table::Visits)
            .unwrap();
        assert_eq!(
            sql,
            " WHERE json_extract(data, '$.rep_id') = ? ORDER BY json_extract(data, '$.check_in_time') DESC, id ASC LIMIT ?"
        );
        assert_eq!(
            params,
            vec![FieldValue::Text("rep-1".to_string()), FieldValue::Integer(5)]
        );
    }

    #[test]
    fn test_unindexed_field_is_rejected() {
        let error = Query::eq("notes", "x").to_sql_tail(Table::Visits).unwrap_err();
        assert!(error.to_string().contains("not indexed"));

        let error = Query::all()
            .order_by("data') OR 1=1 --")
            .to_sql_tail(Table::Clients)
            .unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
    }
}
