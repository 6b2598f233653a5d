//! Demo rows for a fresh install (`sed-desk seed --demo`).

use chrono::{NaiveDate, Utc};
use entity::{
    incident_reports, journal_entries, org_chart_members, personnel_profiles, rewards,
};
use sea_orm::{ActiveValue::Set, ConnectionTrait, EntityTrait, PaginatorTrait};
use tracing::info;

use crate::RecordResult;

/// Inserts a handful of rows into every empty record table. Returns how many
/// rows were written.
pub async fn seed_demo<C>(conn: &C) -> RecordResult<usize>
where
    C: ConnectionTrait,
{
    let mut written = 0;
    let today = Utc::now().date_naive();

    if org_chart_members::Entity::find().count(conn).await? == 0 {
        let head = org_chart_members::Entity::insert(org_chart_members::ActiveModel {
            name: Set("Rahim Bin Osman".into()),
            position: Set("Director".into()),
            unit: Set(Some("HQ".into())),
            ..Default::default()
        })
        .exec(conn)
        .await?
        .last_insert_id;
        org_chart_members::Entity::insert(org_chart_members::ActiveModel {
            name: Set("Siti Aisyah".into()),
            position: Set("Administrative Officer".into()),
            unit: Set(Some("HQ".into())),
            supervisor_id: Set(Some(head)),
            email: Set(Some("siti@example.org".into())),
            ..Default::default()
        })
        .exec(conn)
        .await?;
        written += 2;
    }

    if personnel_profiles::Entity::find().count(conn).await? == 0 {
        use personnel_profiles::Status::{Active, Inactive};
        let profiles = [
            ("Aminah Binti Ali", "880412-10-5522", "Sergeant", "HQ", Active),
            ("Bala Subramaniam", "910203-08-6131", "Corporal", "Operations", Active),
            ("Chong Wei Ming", "850930-14-7781", "Inspector", "Operations", Inactive),
        ];
        for (name, national_id, rank, unit, status) in profiles {
            personnel_profiles::Entity::insert(personnel_profiles::ActiveModel {
                name: Set(name.into()),
                national_id: Set(national_id.into()),
                rank: Set(Some(rank.into())),
                unit: Set(Some(unit.into())),
                joined_on: Set(NaiveDate::from_ymd_opt(2019, 1, 2)),
                status: Set(status),
                ..Default::default()
            })
            .exec(conn)
            .await?;
            written += 1;
        }
    }

    if rewards::Entity::find().count(conn).await? == 0 {
        rewards::Entity::insert(rewards::ActiveModel {
            recipient_name: Set("Aminah Binti Ali".into()),
            national_id: Set(Some("880412-10-5522".into())),
            reward_type: Set("Certificate of Merit".into()),
            awarded_on: Set(Some(today)),
            ..Default::default()
        })
        .exec(conn)
        .await?;
        written += 1;
    }

    if incident_reports::Entity::find().count(conn).await? == 0 {
        incident_reports::Entity::insert(incident_reports::ActiveModel {
            report_no: Set(Some("IR-0001".into())),
            title: Set("Flooded storeroom".into()),
            location: Set(Some("Block B".into())),
            occurred_on: Set(Some(today)),
            status: Set(incident_reports::Status::Investigating),
            ..Default::default()
        })
        .exec(conn)
        .await?;
        written += 1;
    }

    if journal_entries::Entity::find().count(conn).await? == 0 {
        journal_entries::Entity::insert(journal_entries::ActiveModel {
            entry_date: Set(today),
            title: Set("Records desk opened".into()),
            author: Set(Some("admin".into())),
            ..Default::default()
        })
        .exec(conn)
        .await?;
        written += 1;
    }

    info!(rows = written, "demo records seeded");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, repo, sql::Filter, tables};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    #[tokio::test]
    async fn seeds_once_and_rows_decode_through_specs() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        assert_eq!(seed_demo(&db).await.unwrap(), 8);
        assert_eq!(seed_demo(&db).await.unwrap(), 0);

        let staff = repo::list(&db, &tables::ORG_CHART, &Filter::new()).await.unwrap();
        let head = staff.iter().find(|r| r.text("position") == "Director").unwrap();
        let clerk = staff.iter().find(|r| r.text("name") == "Siti Aisyah").unwrap();
        assert_eq!(clerk.get("supervisor_id"), head.get("id"));

        let incidents = repo::list(&db, &tables::INCIDENTS, &Filter::new()).await.unwrap();
        assert_eq!(incidents[0].get("status"), Some(&Cell::Text("investigating".into())));
    }
}
