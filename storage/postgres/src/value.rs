use std::error::Error;

use bytes::BytesMut;
use preload_filter::{ColumnKind, Value};
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::Row;

/// Binds a [`Value`] as a Postgres parameter, narrowing integers to the column's width
#[derive(Debug)]
pub struct PGValue<'a>(pub &'a Value);

impl ToSql for PGValue<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Boolean(b) => b.to_sql(ty, out),
            Value::Integer(i) if *ty == Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
            Value::Integer(i) if *ty == Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
            Value::Integer(i) => i.to_sql(ty, out),
            Value::Text(s) => s.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool { true }

    to_sql_checked!();
}

pub fn decode_row(row: &Row, kinds: &[ColumnKind]) -> Result<Vec<Value>, tokio_postgres::Error> {
    let mut values = Vec::with_capacity(kinds.len());
    for (i, kind) in kinds.iter().enumerate() {
        let value = match kind {
            ColumnKind::Integer => row.try_get::<_, Option<i64>>(i)?.map(Value::Integer),
            ColumnKind::Text => row.try_get::<_, Option<String>>(i)?.map(Value::Text),
            ColumnKind::Boolean => row.try_get::<_, Option<bool>>(i)?.map(Value::Boolean),
        };
        values.push(value.unwrap_or(Value::Null));
    }
    Ok(values)
}
