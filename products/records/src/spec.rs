/// How a field's raw form text is converted and how its column decodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    /// `YYYY-MM-DD`.
    Date,
    /// One of a fixed set of lowercase values.
    Choice(&'static [&'static str]),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Used on insert when the field is left empty.
    pub default: Option<&'static str>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            default: None,
        }
    }

    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn with_default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }
}

/// Decoding class of a selected column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    Date,
    Timestamp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
}

pub const ID_COLUMN: Column = Column {
    name: "id",
    label: "ID",
    kind: ColumnKind::Integer,
};

pub const CREATED_AT_COLUMN: Column = Column {
    name: "created_at",
    label: "Created",
    kind: ColumnKind::Timestamp,
};

/// One table and the screen over it.
#[derive(Debug, PartialEq, Eq)]
pub struct TableSpec {
    /// Stable key used on the command line and in export file names.
    pub key: &'static str,
    pub table: &'static str,
    pub title: &'static str,
    /// Editable fields in form order. `id` and `created_at` are implicit.
    pub fields: &'static [FieldSpec],
    /// Columns shown in the list view, in order.
    pub listed: &'static [&'static str],
}

impl TableSpec {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        self.columns().into_iter().find(|c| c.name == name)
    }

    /// `id`, every field, then `created_at`.
    pub fn columns(&self) -> Vec<Column> {
        let mut out = Vec::with_capacity(self.fields.len() + 2);
        out.push(ID_COLUMN);
        out.extend(self.fields.iter().map(|f| Column {
            name: f.name,
            label: f.label,
            kind: match f.kind {
                FieldKind::Integer => ColumnKind::Integer,
                FieldKind::Date => ColumnKind::Date,
                FieldKind::Text | FieldKind::Choice(_) => ColumnKind::Text,
            },
        }));
        out.push(CREATED_AT_COLUMN);
        out
    }

    pub fn listed_columns(&self) -> Vec<Column> {
        self.listed
            .iter()
            .filter_map(|name| self.column(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables;

    #[test]
    fn columns_wrap_fields_with_id_and_created_at() {
        let cols = tables::ORG_CHART.columns();
        assert_eq!(cols.first().map(|c| c.name), Some("id"));
        assert_eq!(cols.last().map(|c| c.name), Some("created_at"));
        assert_eq!(cols.len(), tables::ORG_CHART.fields.len() + 2);
        let supervisor = tables::ORG_CHART.column("supervisor_id").unwrap();
        assert_eq!(supervisor.kind, ColumnKind::Integer);
    }

    #[test]
    fn every_listed_column_exists() {
        for spec in tables::ALL {
            assert_eq!(
                spec.listed_columns().len(),
                spec.listed.len(),
                "{} lists an unknown column",
                spec.key
            );
        }
    }
}
