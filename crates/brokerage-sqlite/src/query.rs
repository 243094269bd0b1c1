//! Filter translation for window queries
//!
//! Only whitelisted fields reach SQL; every value is a bound parameter.

use brokerage_core::error::{BrokerageError, Result};
use brokerage_core::traits::{Filter, FilterValue};
use rusqlite::ToSql;

pub(crate) const SELECT_WINDOWS: &str = "SELECT movement_key, share_id, activity_seconds, \
     activity_nanos, created_seconds, created_nanos FROM share_price_movements";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Text(&'static str),
    /// Full-precision nanosecond expression, filtered by whole seconds
    Seconds(&'static str),
}

/// Queryable entity fields and their backing columns
fn column_for(field: &str) -> Option<Column> {
    match field {
        "share" => Some(Column::Text("share_id")),
        "when_created" => Some(Column::Seconds(
            "(created_seconds * 1000000000 + created_nanos)",
        )),
        "activity_time" => Some(Column::Seconds(
            "(activity_seconds * 1000000000 + activity_nanos)",
        )),
        _ => None,
    }
}

/// Build the window SELECT for `filters` (AND-combined), in insertion order
pub fn build_window_query(filters: &[Filter]) -> Result<(String, Vec<Box<dyn ToSql>>)> {
    let mut sql = format!("{} WHERE 1=1", SELECT_WINDOWS);
    let mut bound_params: Vec<Box<dyn ToSql>> = Vec::with_capacity(filters.len());

    for filter in filters {
        let column = column_for(&filter.field).ok_or_else(|| {
            BrokerageError::InvalidArgument(format!("unknown filter field '{}'", filter.field))
        })?;

        let condition = match (column, &filter.value) {
            (Column::Text(name), FilterValue::Text(v)) => {
                bound_params.push(Box::new(v.clone()));
                format!("{} {} ?", name, filter.op.as_operator())
            }
            (Column::Seconds(expr), FilterValue::Integer(v)) => {
                bound_params.push(Box::new(*v));
                format!("{} {} (? * 1000000000)", expr, filter.op.as_operator())
            }
            _ => {
                return Err(BrokerageError::InvalidArgument(format!(
                    "filter '{}' has the wrong value type",
                    filter
                )))
            }
        };

        sql.push_str(" AND ");
        sql.push_str(&condition);
    }

    sql.push_str(" ORDER BY rowid ASC");
    Ok((sql, bound_params))
}
