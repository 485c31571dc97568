use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlQueryResult;
use sqlx::types::Json;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Id(u64),
    Text(Option<String>),
    Int(Option<i32>),
    Decimal(Option<Decimal>),
    Bool(Option<bool>),
    Date(Option<NaiveDate>),
    DateTime(Option<NaiveDateTime>),
    Timestamp(Option<DateTime<Utc>>),
    /// Stored in a JSON column.
    List(Option<Vec<String>>),
}

macro_rules! sql_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    SqlValue::$variant(Some(value))
                }
            }

            impl From<Option<$ty>> for SqlValue {
                fn from(value: Option<$ty>) -> Self {
                    SqlValue::$variant(value)
                }
            }
        )*
    };
}

sql_value_from! {
    String => Text,
    i32 => Int,
    Decimal => Decimal,
    bool => Bool,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    DateTime<Utc> => Timestamp,
    Vec<String> => List,
}

/// ===============================
/// SQL statement container
/// ===============================
#[derive(Debug)]
pub struct SqlStatement {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Column names come from the entity definitions, never from request input.
pub fn build_insert_sql(table: &str, columns: Vec<(&'static str, SqlValue)>) -> SqlStatement {
    let (names, values): (Vec<&str>, Vec<SqlValue>) = columns.into_iter().unzip();
    let placeholders = vec!["?"; names.len()].join(", ");

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        names.join(", "),
        placeholders
    );

    SqlStatement { sql, values }
}

pub fn build_update_sql(
    table: &str,
    columns: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: u64,
) -> SqlStatement {
    let (names, mut values): (Vec<&str>, Vec<SqlValue>) = columns.into_iter().unzip();

    let set_clause = names
        .iter()
        .map(|name| format!("{} = ?", name))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table, set_clause, id_column
    );

    // WHERE id = ?
    values.push(SqlValue::Id(id_value));

    SqlStatement { sql, values }
}

/// ===============================
/// Execute the statement
/// ===============================
pub async fn execute(
    pool: &MySqlPool,
    statement: SqlStatement,
) -> Result<MySqlQueryResult, sqlx::Error> {
    let mut query = sqlx::query(&statement.sql);

    for value in statement.values {
        query = match value {
            SqlValue::Id(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Decimal(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Timestamp(v) => query.bind(v),
            SqlValue::List(v) => query.bind(v.map(Json)),
        };
    }

    query.execute(pool).await
}
