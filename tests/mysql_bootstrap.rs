use anyhow::Result;
use platform_api::ApiError;
use platform_db::{DatabaseSettings, Driver};
use products_records::{CrudApi, Draft, TableApi, tables};
use testcontainers::{GenericImage, clients::Cli, core::WaitFor};

#[tokio::test]
#[ignore = "needs a Docker daemon"]
async fn bootstrap_creates_schema_on_a_fresh_server() -> Result<()> {
    let docker = Cli::default();
    let image = GenericImage::new("mysql", "8.0")
        .with_env_var("MYSQL_ROOT_PASSWORD", "secret")
        .with_wait_for(WaitFor::message_on_stderr(
            "port: 3306  MySQL Community Server",
        ));
    let container = docker.run(image);
    let settings = DatabaseSettings {
        driver: Driver::Mysql,
        host: "127.0.0.1".into(),
        port: container.get_host_port_ipv4(3306),
        user: "root".into(),
        password: "secret".into(),
        database: "sed_db".into(),
    };

    platform_db::test_connection(&settings).await?;
    sed_tests::bootstrap(&settings).await?;
    sed_tests::bootstrap(&settings).await?;

    let conn = platform_db::connect(&settings).await?;
    let admin = platform_authn::login(&conn, "admin", "admin123").await?;
    assert_eq!(admin.map(|u| u.role.as_str()), Some("admin"));
    let accounts = platform_authn::list_accounts(&conn).await?;
    assert_eq!(accounts.len(), 2);
    platform_db::release(conn).await;

    let api = TableApi::new(&tables::PERSONNEL, platform_db::Connector::new(settings));
    let draft = Draft::new()
        .with("name", "Bala Subramaniam")
        .with("national_id", "910203-08-6131");
    api.create(&draft).await?;
    let err = api.create(&draft).await.unwrap_err();
    assert!(matches!(err, ApiError::Operation(_)));
    let rows = api.list().await?;
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].text("created_at").is_empty());
    Ok(())
}
