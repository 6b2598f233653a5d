//! Statement construction from a [`TableSpec`] and a [`Draft`].

use chrono::NaiveDate;
use sea_orm::sea_query::{
    Alias, DeleteStatement, Expr, InsertStatement, LikeExpr, Order, Query, SelectStatement,
    SimpleExpr, UpdateStatement, Value,
};

use crate::{
    RecordError, RecordResult,
    draft::Draft,
    spec::{FieldKind, FieldSpec, TableSpec},
};

/// Extra conditions for [`select`]; all of them must hold.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    equals: Vec<(&'static str, Value)>,
    contains: Vec<(&'static str, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.equals.push((column, value.into()));
        self
    }

    /// Substring match, case-insensitive under the default collations.
    pub fn contains(mut self, column: &'static str, needle: impl Into<String>) -> Self {
        self.contains.push((column, needle.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.equals.is_empty() && self.contains.is_empty()
    }
}

pub fn insert(spec: &TableSpec, draft: &Draft) -> RecordResult<InsertStatement> {
    let mut columns = Vec::with_capacity(spec.fields.len());
    let mut values: Vec<SimpleExpr> = Vec::with_capacity(spec.fields.len());
    for field in spec.fields {
        let raw = draft.value(field.name).or(field.default);
        if raw.is_none() && field.required {
            return Err(RecordError::MissingField(field.name));
        }
        columns.push(Alias::new(field.name));
        values.push(to_value(field, raw)?.into());
    }

    let mut stmt = Query::insert();
    stmt.into_table(Alias::new(spec.table))
        .columns(columns)
        .values(values)
        .map_err(|err| RecordError::Statement(err.to_string()))?;
    Ok(stmt)
}

/// `None` when the draft names none of the table's fields.
pub fn update(spec: &TableSpec, id: i64, draft: &Draft) -> RecordResult<Option<UpdateStatement>> {
    let mut values: Vec<(Alias, SimpleExpr)> = Vec::new();
    for field in spec.fields.iter().filter(|f| draft.contains(f.name)) {
        let raw = draft.value(field.name).or(field.default);
        if raw.is_none() && field.required {
            return Err(RecordError::MissingField(field.name));
        }
        values.push((Alias::new(field.name), to_value(field, raw)?.into()));
    }
    if values.is_empty() {
        return Ok(None);
    }

    let mut stmt = Query::update();
    stmt.table(Alias::new(spec.table))
        .values(values)
        .and_where(Expr::col(Alias::new("id")).eq(id));
    Ok(Some(stmt))
}

pub fn delete(spec: &TableSpec, id: i64) -> DeleteStatement {
    let mut stmt = Query::delete();
    stmt.from_table(Alias::new(spec.table))
        .and_where(Expr::col(Alias::new("id")).eq(id));
    stmt
}

pub fn select(spec: &TableSpec, filter: &Filter) -> SelectStatement {
    let mut stmt = Query::select();
    stmt.columns(spec.columns().into_iter().map(|c| Alias::new(c.name)))
        .from(Alias::new(spec.table));
    for (column, value) in &filter.equals {
        stmt.and_where(Expr::col(Alias::new(*column)).eq(value.clone()));
    }
    for (column, needle) in &filter.contains {
        let pattern = format!("%{}%", escape_like(needle));
        stmt.and_where(Expr::col(Alias::new(*column)).like(LikeExpr::new(pattern).escape('\\')));
    }
    stmt.order_by(Alias::new("id"), Order::Desc);
    stmt
}

pub fn select_one(spec: &TableSpec, id: i64) -> SelectStatement {
    let mut stmt = select(spec, &Filter::new());
    stmt.and_where(Expr::col(Alias::new("id")).eq(id));
    stmt
}

fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Converts raw form text into a typed, possibly null, column value.
pub fn to_value(field: &FieldSpec, raw: Option<&str>) -> RecordResult<Value> {
    let invalid = |reason: String| RecordError::InvalidValue {
        field: field.name,
        reason,
    };
    let value = match (field.kind, raw) {
        (FieldKind::Text, raw) => Value::from(raw.map(str::to_string)),
        (FieldKind::Integer, None) => Value::from(None::<i64>),
        (FieldKind::Integer, Some(raw)) => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid(format!("'{raw}' is not a whole number")))?,
        (FieldKind::Date, None) => Value::from(None::<NaiveDate>),
        (FieldKind::Date, Some(raw)) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Value::from)
            .map_err(|_| invalid(format!("'{raw}' is not a YYYY-MM-DD date")))?,
        (FieldKind::Choice(_), None) => Value::from(None::<String>),
        (FieldKind::Choice(options), Some(raw)) => {
            let lowered = raw.to_lowercase();
            if !options.contains(&lowered.as_str()) {
                return Err(invalid(format!(
                    "'{raw}' is not one of {}",
                    options.join(", ")
                )));
            }
            Value::from(lowered)
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables;
    use sea_orm::DbBackend;

    #[test]
    fn insert_applies_defaults_and_nulls() {
        let draft = Draft::new()
            .with("name", "Aminah")
            .with("national_id", "900101-01-1234")
            .with("unit", "");
        let stmt = insert(&tables::PERSONNEL, &draft).unwrap();
        let built = DbBackend::Sqlite.build(&stmt);
        assert!(built.sql.starts_with(r#"INSERT INTO "personnel_profiles""#));
        let values = built.values.unwrap().0;
        assert_eq!(values.len(), tables::PERSONNEL.fields.len());
        assert_eq!(values[3], Value::String(None));
        assert_eq!(values[7], Value::from("active"));
    }

    #[test]
    fn insert_rejects_missing_required_field() {
        let draft = Draft::new().with("name", "Aminah");
        let err = insert(&tables::PERSONNEL, &draft).unwrap_err();
        assert!(matches!(err, RecordError::MissingField("national_id")));
        assert_eq!(err.to_string(), "field national_id is required");
    }

    #[test]
    fn update_touches_only_present_fields() {
        let draft = Draft::new().with("unit", "Logistik").with("nickname", "x");
        let stmt = update(&tables::PERSONNEL, 4, &draft).unwrap().unwrap();
        let built = DbBackend::Sqlite.build(&stmt);
        assert!(built.sql.starts_with(r#"UPDATE "personnel_profiles" SET "unit" = ?"#));
        assert!(!built.sql.contains("nickname"));
        assert_eq!(built.values.unwrap().0.len(), 2);
    }

    #[test]
    fn update_without_known_fields_is_none() {
        let draft = Draft::new().with("nickname", "x");
        assert!(update(&tables::ORG_CHART, 1, &draft).unwrap().is_none());
    }

    #[test]
    fn update_cannot_blank_a_required_field() {
        let draft = Draft::new().with("title", "  ");
        let err = update(&tables::JOURNAL, 1, &draft).unwrap_err();
        assert!(matches!(err, RecordError::MissingField("title")));
    }

    #[test]
    fn values_are_checked_per_kind() {
        let supervisor = tables::ORG_CHART.field("supervisor_id").unwrap();
        assert_eq!(to_value(supervisor, Some("12")).unwrap(), Value::from(12i64));
        assert!(to_value(supervisor, Some("twelve")).is_err());

        let joined = tables::PERSONNEL.field("joined_on").unwrap();
        assert!(to_value(joined, Some("2024-02-30")).is_err());

        let status = tables::INCIDENTS.field("status").unwrap();
        assert_eq!(
            to_value(status, Some("Closed")).unwrap(),
            Value::from("closed")
        );
        let err = to_value(status, Some("archived")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "field status: 'archived' is not one of open, investigating, closed"
        );
    }

    #[test]
    fn select_orders_newest_first_and_escapes_like() {
        let filter = Filter::new()
            .equals("unit", "HQ")
            .contains("name", "50%");
        let built = DbBackend::MySql.build(&select(&tables::PERSONNEL, &filter));
        assert!(built.sql.contains("WHERE `unit` = ? AND `name` LIKE ?"));
        assert!(built.sql.contains("ESCAPE"));
        assert!(built.sql.ends_with("ORDER BY `id` DESC"));
        let values = built.values.unwrap().0;
        assert_eq!(values[1], Value::from("%50\\%%"));
    }

    #[test]
    fn delete_targets_one_id() {
        let built = DbBackend::Sqlite.build(&delete(&tables::REWARDS, 9));
        assert!(built.sql.starts_with(r#"DELETE FROM "rewards" WHERE "id" = "#));
        assert_eq!(built.values.unwrap().0, vec![Value::from(9i64)]);
    }
}
