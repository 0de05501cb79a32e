use preload_filter::{Arity, Condition, Value};

use crate::error::SqlGenerationError;

/// How bound arguments are written into generated SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `$1`, `$2`, ...
    Numbered,
    /// `?`
    Positional,
}

pub enum SqlExpr {
    Sql(String),
    Argument(Value),
}

/// Double-quote an identifier, escaping embedded quotes by doubling them
pub fn quote(name: &str) -> String { format!(r#""{}""#, name.replace('"', "\"\"")) }

pub fn qualified(table: &str, column: &str) -> String { format!("{}.{}", quote(table), quote(column)) }

#[derive(Default)]
pub struct SqlBuilder {
    expressions: Vec<SqlExpr>,
    fields: Vec<String>,
    table_name: Option<String>,
    joins: Vec<String>,
    order_by: Vec<String>,
}

impl SqlBuilder {
    pub fn new() -> Self { Self::default() }

    /// Fields are emitted as given; quote them with [`quote`] or [`qualified`]
    pub fn with_fields<T: Into<String>>(fields: Vec<T>) -> Self {
        Self { fields: fields.into_iter().map(|f| f.into()).collect(), ..Self::default() }
    }

    pub fn table_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.table_name = Some(name.into());
        self
    }

    /// Append an ` INNER JOIN <table> ON <on>` clause
    pub fn join(&mut self, table: &str, on: impl AsRef<str>) -> &mut Self {
        self.joins.push(format!(" INNER JOIN {} ON {}", quote(table), on.as_ref()));
        self
    }

    pub fn order_by(&mut self, expr: impl Into<String>) -> &mut Self {
        self.order_by.push(expr.into());
        self
    }

    pub fn push(&mut self, expr: SqlExpr) { self.expressions.push(expr); }

    pub fn arg(&mut self, arg: impl Into<Value>) { self.push(SqlExpr::Argument(arg.into())); }

    pub fn sql(&mut self, s: impl AsRef<str>) { self.push(SqlExpr::Sql(s.as_ref().to_owned())); }

    pub fn is_empty(&self) -> bool { self.expressions.is_empty() }

    /// Separate the next predicate from any already written
    pub fn and(&mut self) {
        if !self.is_empty() {
            self.sql(" AND ");
        }
    }

    /// A parenthesised argument list. An empty list becomes `NULL`, which matches nothing under `IN`.
    pub fn list(&mut self, values: &[Value]) {
        if values.is_empty() {
            self.sql("NULL");
            return;
        }
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.sql(", ");
            }
            self.arg(value.clone());
        }
    }

    /// Expand a condition template, binding its values in order.
    ///
    /// A Multi template's single `?` becomes one argument per value. A Scalar
    /// template must have exactly as many `?` as values.
    pub fn condition(&mut self, condition: &Condition) -> Result<(), SqlGenerationError> {
        let pieces: Vec<&str> = condition.template.split('?').collect();
        let found = pieces.len() - 1;

        match condition.arity {
            Arity::Multi => {
                if found != 1 {
                    return Err(SqlGenerationError::PlaceholderCountMismatch { template: condition.template.clone(), found, expected: 1 });
                }
                self.sql(pieces[0]);
                self.list(&condition.values);
                self.sql(pieces[1]);
            }
            Arity::Scalar => {
                if found != condition.values.len() {
                    return Err(SqlGenerationError::PlaceholderCountMismatch {
                        template: condition.template.clone(),
                        found,
                        expected: condition.values.len(),
                    });
                }
                for (i, piece) in pieces.iter().enumerate() {
                    if i > 0 {
                        self.arg(condition.values[i - 1].clone());
                    }
                    self.sql(piece);
                }
            }
        }
        Ok(())
    }

    /// AND-combine conditions after anything already written
    pub fn conjunction(&mut self, conditions: &[Condition]) -> Result<(), SqlGenerationError> {
        for condition in conditions {
            self.and();
            self.sql("(");
            self.condition(condition)?;
            self.sql(")");
        }
        Ok(())
    }

    pub fn build(self, placeholder: Placeholder) -> Result<(String, Vec<Value>), SqlGenerationError> {
        let Some(table) = self.table_name.as_deref() else { return Err(SqlGenerationError::IncompleteConfiguration) };
        if self.fields.is_empty() {
            return Err(SqlGenerationError::IncompleteConfiguration);
        }

        let mut sql = format!("SELECT {} FROM {}", self.fields.join(", "), quote(table));
        for join in &self.joins {
            sql += join;
        }
        let order_by = if self.order_by.is_empty() { None } else { Some(self.order_by.join(", ")) };

        let (where_clause, args) = render(self.expressions, placeholder);
        if !where_clause.is_empty() {
            sql += " WHERE ";
            sql += &where_clause;
        }
        if let Some(order_by) = order_by {
            sql += " ORDER BY ";
            sql += &order_by;
        }

        Ok((sql, args))
    }

    pub fn build_where_clause(self, placeholder: Placeholder) -> (String, Vec<Value>) { render(self.expressions, placeholder) }
}

fn render(expressions: Vec<SqlExpr>, placeholder: Placeholder) -> (String, Vec<Value>) {
    let mut counter = 1;
    let mut clause = String::new();
    let mut args = Vec::new();

    for expr in expressions {
        match expr {
            SqlExpr::Argument(arg) => {
                match placeholder {
                    Placeholder::Numbered => clause += &format!("${}", counter),
                    Placeholder::Positional => clause.push('?'),
                }
                args.push(arg);
                counter += 1;
            }
            SqlExpr::Sql(s) => clause += &s,
        }
    }

    (clause, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_expands_to_one_placeholder_per_value() {
        let mut builder = SqlBuilder::new();
        builder.condition(&Condition::multi("devices.id IN (?)", [3i64, 1, 2])).unwrap();
        let (sql, args) = builder.build_where_clause(Placeholder::Numbered);
        assert_eq!(sql, "devices.id IN ($1, $2, $3)");
        assert_eq!(args, vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn test_empty_multi_matches_nothing() {
        let mut builder = SqlBuilder::new();
        builder.condition(&Condition::new("groups.name IN (?)", vec![], Arity::Multi)).unwrap();
        let (sql, args) = builder.build_where_clause(Placeholder::Positional);
        assert_eq!(sql, "groups.name IN (NULL)");
        assert!(args.is_empty());
    }

    #[test]
    fn test_scalar_placeholder_count_is_checked() {
        let condition = Condition::new("users.name = ? OR users.name = ?", vec![Value::from("x")], Arity::Scalar);
        assert_eq!(
            SqlBuilder::new().condition(&condition),
            Err(SqlGenerationError::PlaceholderCountMismatch { template: condition.template.clone(), found: 2, expected: 1 })
        );
    }

    #[test]
    fn test_conjunction_numbers_across_conditions() {
        let mut builder = SqlBuilder::with_fields(vec![qualified("users", "id"), qualified("users", "name")]);
        builder.table_name("users").order_by(qualified("users", "id"));
        builder
            .conjunction(&[Condition::scalar("users.name = ?", "John Doe"), Condition::multi("users.id IN (?)", [1i64, 2])])
            .unwrap();
        let (sql, args) = builder.build(Placeholder::Numbered).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "users"."id", "users"."name" FROM "users" WHERE (users.name = $1) AND (users.id IN ($2, $3)) ORDER BY "users"."id""#
        );
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_join_and_no_where() {
        let mut builder = SqlBuilder::with_fields(vec![qualified("user_devices", "user_id"), qualified("devices", "id")]);
        builder.table_name("devices").join("user_devices", format!("{} = {}", qualified("user_devices", "device_id"), qualified("devices", "id")));
        let (sql, args) = builder.build(Placeholder::Positional).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "user_devices"."user_id", "devices"."id" FROM "devices" INNER JOIN "user_devices" ON "user_devices"."device_id" = "devices"."id""#
        );
        assert!(args.is_empty());
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"we"ird"#), r#""we""ird""#);
        assert!(matches!(SqlBuilder::new().build(Placeholder::Numbered), Err(SqlGenerationError::IncompleteConfiguration)));
    }
}
