//! Dynamic `WHERE` clause builder shared by the list/count/statistics queries.
//!
//! Every list endpoint takes a handful of optional filters. [`Filter`]
//! collects the active ones as numbered placeholders plus typed bind values,
//! and the `bind_*` helpers apply those values to a sqlx query in order.
//!
//! ```ignore
//! let mut filter = Filter::new();
//! filter.eq_i32("a.status", params.status);
//! filter.contains("a.executor", params.executor.as_deref());
//! let sql = format!("SELECT ... FROM activities a {} LIMIT ${}", filter.where_clause(), filter.next_index());
//! ```

use farmops_core::types::Timestamp;
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::Postgres;

/// Typed bind value for dynamically-built queries.
#[derive(Debug, Clone)]
pub enum BindValue {
    BigInt(i64),
    Int(i32),
    Text(String),
    Timestamp(Timestamp),
}

/// Accumulated filter conditions and their bind values.
#[derive(Debug, Default)]
pub struct Filter {
    conditions: Vec<String>,
    values: Vec<BindValue>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition whose `{}` markers all refer to one new placeholder.
    pub fn push(&mut self, template: &str, value: BindValue) {
        let placeholder = format!("${}", self.values.len() + 1);
        self.conditions.push(template.replace("{}", &placeholder));
        self.values.push(value);
    }

    /// Add a condition with no bind value.
    pub fn push_raw(&mut self, condition: &str) {
        self.conditions.push(condition.to_string());
    }

    pub fn eq_i64(&mut self, column: &str, value: Option<i64>) {
        if let Some(v) = value {
            self.push(&format!("{column} = {{}}"), BindValue::BigInt(v));
        }
    }

    pub fn eq_i32(&mut self, column: &str, value: Option<i32>) {
        if let Some(v) = value {
            self.push(&format!("{column} = {{}}"), BindValue::Int(v));
        }
    }

    pub fn eq_text(&mut self, column: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.push(&format!("{column} = {{}}"), BindValue::Text(v.to_string()));
        }
    }

    /// Case-insensitive substring match on one column.
    pub fn contains(&mut self, column: &str, value: Option<&str>) {
        self.contains_any(&[column], value);
    }

    /// Case-insensitive substring match on any of `columns`.
    ///
    /// `%`, `_` and `\` in `value` match literally.
    pub fn contains_any(&mut self, columns: &[&str], value: Option<&str>) {
        let Some(v) = value else { return };
        let condition = columns
            .iter()
            .map(|c| format!("{c} ILIKE {{}} ESCAPE '\\'"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.push(
            &format!("({condition})"),
            BindValue::Text(format!("%{}%", escape_like(v))),
        );
    }

    /// Inclusive time range; each bound applies on its own.
    pub fn time_range(&mut self, column: &str, from: Option<Timestamp>, to: Option<Timestamp>) {
        if let Some(from) = from {
            self.push(&format!("{column} >= {{}}"), BindValue::Timestamp(from));
        }
        if let Some(to) = to {
            self.push(&format!("{column} <= {{}}"), BindValue::Timestamp(to));
        }
    }

    /// `WHERE ...` for the active conditions, or an empty string.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// The placeholder number following the filter's own values.
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    /// Bind the filter values to a sqlx `QueryAs`.
    pub fn bind_as<'q, O>(
        &'q self,
        mut q: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for val in &self.values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Int(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q
    }

    /// Bind the filter values to a sqlx `QueryScalar`.
    pub fn bind_scalar<'q, O>(
        &'q self,
        mut q: QueryScalar<'q, Postgres, O, PgArguments>,
    ) -> QueryScalar<'q, Postgres, O, PgArguments> {
        for val in &self.values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Int(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q
    }
}

/// Escape the `LIKE` wildcards in user text.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
