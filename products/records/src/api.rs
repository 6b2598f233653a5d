use async_trait::async_trait;
use platform_api::ApiResult;
use platform_db::Connector;

use crate::{cell::Row, draft::Draft, repo, spec::TableSpec, sql::{self, Filter}};

/// The four operations a CRUD screen is bound to.
#[async_trait]
pub trait CrudApi: Send + Sync {
    fn spec(&self) -> &'static TableSpec;
    async fn list(&self) -> ApiResult<Vec<Row>>;
    async fn create(&self, draft: &Draft) -> ApiResult<i64>;
    async fn update(&self, id: i64, draft: &Draft) -> ApiResult<bool>;
    async fn delete(&self, id: i64) -> ApiResult<bool>;
}

/// [`CrudApi`] over one table; every call opens and closes its own connection.
#[derive(Clone, Debug)]
pub struct TableApi {
    spec: &'static TableSpec,
    connector: Connector,
}

impl TableApi {
    pub fn new(spec: &'static TableSpec, connector: Connector) -> Self {
        Self { spec, connector }
    }

    pub async fn query(&self, filter: &Filter) -> ApiResult<Vec<Row>> {
        let conn = self.connector.open().await?;
        let result = repo::list(&conn, self.spec, filter).await;
        platform_db::release(conn).await;
        Ok(result?)
    }
}

#[async_trait]
impl CrudApi for TableApi {
    fn spec(&self) -> &'static TableSpec {
        self.spec
    }

    async fn list(&self) -> ApiResult<Vec<Row>> {
        self.query(&Filter::new()).await
    }

    async fn create(&self, draft: &Draft) -> ApiResult<i64> {
        // Validate before touching the network.
        sql::insert(self.spec, draft)?;
        let conn = self.connector.open().await?;
        let result = repo::create(&conn, self.spec, draft).await;
        platform_db::release(conn).await;
        Ok(result?)
    }

    async fn update(&self, id: i64, draft: &Draft) -> ApiResult<bool> {
        if sql::update(self.spec, id, draft)?.is_none() {
            return Ok(false);
        }
        let conn = self.connector.open().await?;
        let result = repo::update(&conn, self.spec, id, draft).await;
        platform_db::release(conn).await;
        Ok(result?)
    }

    async fn delete(&self, id: i64) -> ApiResult<bool> {
        let conn = self.connector.open().await?;
        let result = repo::delete(&conn, self.spec, id).await;
        platform_db::release(conn).await;
        Ok(result?)
    }
}

/// Read-only personnel record search. Set filters combine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonnelQuery {
    /// Exact unit.
    pub unit: Option<String>,
    /// Substring of the name.
    pub name: Option<String>,
    pub status: Option<String>,
}

impl PersonnelQuery {
    pub fn to_filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(unit) = non_blank(&self.unit) {
            filter = filter.equals("unit", unit.to_string());
        }
        if let Some(name) = non_blank(&self.name) {
            filter = filter.contains("name", name);
        }
        if let Some(status) = non_blank(&self.status) {
            filter = filter.equals("status", status.to_lowercase());
        }
        filter
    }
}

/// Read-only reward record search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardQuery {
    pub recipient: Option<String>,
    pub reward_type: Option<String>,
}

impl RewardQuery {
    pub fn to_filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(recipient) = non_blank(&self.recipient) {
            filter = filter.contains("recipient_name", recipient);
        }
        if let Some(reward_type) = non_blank(&self.reward_type) {
            filter = filter.equals("reward_type", reward_type.to_string());
        }
        filter
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables;
    use platform_api::ApiError;
    use platform_db::DatabaseSettings;

    async fn sqlite_api(spec: &'static TableSpec) -> (tempfile::TempDir, TableApi) {
        let dir = tempfile::tempdir().unwrap();
        let settings = DatabaseSettings::sqlite(dir.path().join("sed.db"));
        let conn = platform_db::connect(&settings).await.unwrap();
        {
            use migration::{Migrator, MigratorTrait};
            Migrator::up(&conn, None).await.unwrap();
        }
        platform_db::release(conn).await;
        (dir, TableApi::new(spec, Connector::new(settings)))
    }

    #[test]
    fn blank_query_fields_are_ignored() {
        let query = PersonnelQuery {
            unit: Some("  ".into()),
            name: None,
            status: Some("Active".into()),
        };
        assert_eq!(query.to_filter(), Filter::new().equals("status", "active".to_string()));
        assert!(RewardQuery::default().to_filter().is_empty());
    }

    #[tokio::test]
    async fn each_call_uses_a_fresh_connection() {
        let (_dir, api) = sqlite_api(&tables::REWARDS).await;
        let id = api
            .create(&Draft::new().with("recipient_name", "Siti").with("reward_type", "Medal"))
            .await
            .unwrap();
        api.create(&Draft::new().with("recipient_name", "Bala").with("reward_type", "Letter"))
            .await
            .unwrap();

        let medals = api
            .query(
                &RewardQuery {
                    recipient: Some("sit".into()),
                    reward_type: Some("Medal".into()),
                }
                .to_filter(),
            )
            .await
            .unwrap();
        assert_eq!(medals.len(), 1);
        assert_eq!(medals[0].id(), Some(id));

        assert!(api.delete(id).await.unwrap());
        assert_eq!(api.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_drafts_fail_before_connecting() {
        let settings = DatabaseSettings {
            host: "unreachable.invalid".into(),
            ..DatabaseSettings::default()
        };
        let api = TableApi::new(&tables::JOURNAL, Connector::new(settings));
        let err = api.create(&Draft::new().with("title", "x")).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidInput(ref msg) if msg == "field entry_date is required"
        ));
        assert!(!api.update(1, &Draft::new()).await.unwrap());
    }
}
