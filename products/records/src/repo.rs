//! Statement execution against any sea-orm connection.

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{ConnectionTrait, QueryResult};
use tracing::info;

use crate::{
    RecordResult,
    cell::{Cell, Row},
    draft::Draft,
    spec::{Column, ColumnKind, TableSpec},
    sql::{self, Filter},
};

pub async fn list<C>(conn: &C, spec: &TableSpec, filter: &Filter) -> RecordResult<Vec<Row>>
where
    C: ConnectionTrait,
{
    let backend = conn.get_database_backend();
    let rows = conn.query_all(backend.build(&sql::select(spec, filter))).await?;
    let columns = spec.columns();
    rows.iter().map(|row| decode(row, &columns)).collect()
}

pub async fn find<C>(conn: &C, spec: &TableSpec, id: i64) -> RecordResult<Option<Row>>
where
    C: ConnectionTrait,
{
    let backend = conn.get_database_backend();
    let row = conn.query_one(backend.build(&sql::select_one(spec, id))).await?;
    let columns = spec.columns();
    row.map(|row| decode(&row, &columns)).transpose()
}

/// Inserts a row and returns its id.
pub async fn create<C>(conn: &C, spec: &TableSpec, draft: &Draft) -> RecordResult<i64>
where
    C: ConnectionTrait,
{
    let stmt = sql::insert(spec, draft)?;
    let backend = conn.get_database_backend();
    let result = conn.execute(backend.build(&stmt)).await?;
    let id = result.last_insert_id() as i64;
    info!(table = spec.table, id, "record created");
    Ok(id)
}

/// `false` when nothing was updated, including drafts with no known fields.
pub async fn update<C>(conn: &C, spec: &TableSpec, id: i64, draft: &Draft) -> RecordResult<bool>
where
    C: ConnectionTrait,
{
    let Some(stmt) = sql::update(spec, id, draft)? else {
        return Ok(false);
    };
    let backend = conn.get_database_backend();
    let changed = conn.execute(backend.build(&stmt)).await?.rows_affected() > 0;
    info!(table = spec.table, id, changed, "record updated");
    Ok(changed)
}

pub async fn delete<C>(conn: &C, spec: &TableSpec, id: i64) -> RecordResult<bool>
where
    C: ConnectionTrait,
{
    let backend = conn.get_database_backend();
    let removed = conn
        .execute(backend.build(&sql::delete(spec, id)))
        .await?
        .rows_affected()
        > 0;
    info!(table = spec.table, id, removed, "record deleted");
    Ok(removed)
}

fn decode(row: &QueryResult, columns: &[Column]) -> RecordResult<Row> {
    let mut cells = Vec::with_capacity(columns.len());
    for column in columns {
        let cell = match column.kind {
            ColumnKind::Integer => row
                .try_get::<Option<i64>>("", column.name)?
                .map(Cell::Integer),
            ColumnKind::Text => row
                .try_get::<Option<String>>("", column.name)?
                .map(Cell::Text),
            ColumnKind::Date => row
                .try_get::<Option<NaiveDate>>("", column.name)?
                .map(Cell::Date),
            ColumnKind::Timestamp => row
                .try_get::<Option<NaiveDateTime>>("", column.name)?
                .map(Cell::Timestamp),
        };
        cells.push((column.name, cell.unwrap_or(Cell::Null)));
    }
    Ok(Row::new(cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecordError, tables};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};

    async fn memory_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn create_list_update_delete() {
        let db = memory_db().await;
        let spec = &tables::ORG_CHART;

        let first = create(
            &db,
            spec,
            &Draft::new().with("name", "Rahim").with("position", "Director"),
        )
        .await
        .unwrap();
        let second = create(
            &db,
            spec,
            &Draft::new()
                .with("name", "Siti")
                .with("position", "Clerk")
                .with("supervisor_id", &first.to_string()),
        )
        .await
        .unwrap();

        let rows = list(&db, spec, &Filter::new()).await.unwrap();
        assert_eq!(rows.iter().map(Row::id).collect::<Vec<_>>(), vec![Some(second), Some(first)]);
        assert_eq!(rows[0].get("supervisor_id"), Some(&Cell::Integer(first)));
        assert_eq!(rows[1].get("unit"), Some(&Cell::Null));
        assert!(matches!(rows[0].get("created_at"), Some(Cell::Timestamp(_))));

        assert!(update(&db, spec, second, &Draft::new().with("unit", "HQ")).await.unwrap());
        let row = find(&db, spec, second).await.unwrap().unwrap();
        assert_eq!(row.text("unit"), "HQ");

        assert!(delete(&db, spec, first).await.unwrap());
        assert!(!delete(&db, spec, first).await.unwrap());
        assert!(find(&db, spec, first).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_with_no_known_fields_returns_false() {
        let db = memory_db().await;
        let id = create(
            &db,
            &tables::JOURNAL,
            &Draft::new().with("entry_date", "2024-05-01").with("title", "Patrol"),
        )
        .await
        .unwrap();
        let changed = update(&db, &tables::JOURNAL, id, &Draft::new().with("mood", "ok"))
            .await
            .unwrap();
        assert!(!changed);
    }

    #[tokio::test]
    async fn duplicate_national_id_is_rejected() {
        let db = memory_db().await;
        let draft = Draft::new()
            .with("name", "Aminah")
            .with("national_id", "900101-01-1234");
        create(&db, &tables::PERSONNEL, &draft).await.unwrap();
        let err = create(&db, &tables::PERSONNEL, &draft).await.unwrap_err();
        assert!(matches!(err, RecordError::Db(_)));
    }

    #[tokio::test]
    async fn filters_combine() {
        let db = memory_db().await;
        for (name, nid, unit, status) in [
            ("Aminah", "1", "HQ", "active"),
            ("Amir", "2", "HQ", "inactive"),
            ("Bala", "3", "Ops", "active"),
        ] {
            let draft = Draft::new()
                .with("name", name)
                .with("national_id", nid)
                .with("unit", unit)
                .with("status", status);
            create(&db, &tables::PERSONNEL, &draft).await.unwrap();
        }
        let filter = Filter::new()
            .equals("unit", "HQ")
            .contains("name", "am")
            .equals("status", "active");
        let rows = list(&db, &tables::PERSONNEL, &filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("name"), "Aminah");
        assert_eq!(rows[0].text("status"), "active");
    }
}
