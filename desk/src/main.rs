mod bootstrap;
mod config;
mod menu;
mod render;
mod view;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use migration::{Migrator, MigratorTrait};
use platform_api::{ApiError, Notice};
use platform_authn::CurrentUser;
use platform_authz::MenuKey;
use platform_db::{ConfigStore, Connector, DatabaseSettings, Driver, SetupForm};
use platform_export::Format;
use platform_obs::{ObsConfig, init_tracing};
use products_records::{PersonnelQuery, RewardQuery, TableApi, fixtures, tables};
use tracing::info;

use crate::{
    config::AppConfig,
    menu::Module,
    view::{CrudView, FormMode},
};

#[derive(Parser, Debug)]
#[command(name = "sed-desk", version, about = "SED records desk")]
struct Cli {
    #[command(flatten)]
    credentials: Credentials,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Credentials {
    #[arg(long, env = "SED_USERNAME", global = true)]
    username: Option<String>,
    #[arg(long, env = "SED_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the database settings file and create the database.
    Setup(SetupCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Seed the default accounts, plus demo records with --demo.
    Seed {
        #[arg(long)]
        demo: bool,
    },
    /// Show the menu entries the signed-in user may open.
    Menu,
    /// List the records of a screen.
    List {
        module: Module,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, help = "Print every column as JSON")]
        json: bool,
    },
    /// Add a record.
    Add {
        module: Module,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Change fields of a record.
    Edit {
        module: Module,
        id: i64,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Delete a record.
    Delete {
        module: Module,
        id: i64,
        #[arg(long, help = "Confirm the deletion")]
        yes: bool,
    },
    /// Read-only record searches.
    #[command(subcommand)]
    Records(RecordsCommand),
    /// Export the listed records.
    Export {
        module: Module,
        #[arg(long, value_enum)]
        format: ExportFormat,
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
        #[arg(long)]
        search: Option<String>,
    },
    /// Manage user accounts.
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Args, Debug)]
struct SetupCommand {
    #[arg(long, value_enum)]
    driver: Option<DriverArg>,
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<String>,
    #[arg(long)]
    user: Option<String>,
    #[arg(long, env = "SED_DB_PASSWORD", hide_env_values = true)]
    db_password: Option<String>,
    #[arg(long, help = "Database name, or file path for sqlite")]
    database: Option<String>,
    #[arg(long, help = "Only check that the server is reachable")]
    test_only: bool,
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Subcommand, Debug)]
enum RecordsCommand {
    Personnel {
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    Rewards {
        #[arg(long)]
        recipient: Option<String>,
        #[arg(long)]
        reward_type: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List,
    Add {
        #[arg(value_name = "USERNAME")]
        account: String,
        #[arg(value_name = "PASSWORD")]
        account_password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
    Delete {
        #[arg(value_name = "USERNAME")]
        account: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DriverArg {
    Mysql,
    Sqlite,
}

impl From<DriverArg> for Driver {
    fn from(value: DriverArg) -> Self {
        match value {
            DriverArg::Mysql => Driver::Mysql,
            DriverArg::Sqlite => Driver::Sqlite,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Pdf,
}

impl From<ExportFormat> for Format {
    fn from(value: ExportFormat) -> Self {
        match value {
            ExportFormat::Csv => Format::Csv,
            ExportFormat::Pdf => Format::Pdf,
        }
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got {raw:?}"))?;
    Ok((field.trim().to_string(), value.to_string()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let Cli {
        credentials,
        command,
    } = Cli::parse();
    let config = AppConfig::load();
    init_tracing(ObsConfig {
        log_dir: config.log_dir.clone(),
        ..ObsConfig::default()
    })?;
    let store = config.store();

    match command {
        Command::Setup(cmd) => run_setup(&store, cmd).await,
        Command::Migrate(action) => {
            let settings = configured(&store).await?;
            migrate(&settings, action).await
        }
        command => {
            let settings = configured(&store).await?;
            if matches!(command, Command::Seed { .. }) {
                bootstrap::migrate_schema(&settings).await?;
            } else {
                bootstrap::ensure_schema(&settings).await?;
            }
            let connector = Connector::new(settings);
            run_command(command, &credentials, &connector).await
        }
    }
}

async fn configured(store: &ConfigStore) -> Result<DatabaseSettings> {
    if bootstrap::needs_setup(store).await {
        bail!(
            "database is not configured or unreachable; run `sed-desk setup` (config: {})",
            store.path().display()
        );
    }
    Ok(store.load())
}

async fn run_setup(store: &ConfigStore, cmd: SetupCommand) -> Result<()> {
    let mut form = SetupForm::from_settings(&store.load());
    if let Some(driver) = cmd.driver {
        form.driver = driver.into();
    }
    let overrides = [
        (&mut form.host, cmd.host),
        (&mut form.port, cmd.port),
        (&mut form.user, cmd.user),
        (&mut form.password, cmd.db_password),
        (&mut form.database, cmd.database),
    ];
    for (slot, value) in overrides {
        if let Some(value) = value {
            *slot = value;
        }
    }

    if cmd.test_only {
        return finish(bootstrap::test_connection(&form).await);
    }
    let settings = bootstrap::save_setup(store, &form).await?;
    bootstrap::ensure_schema(&settings).await?;
    finish(Notice::info(
        "Setup",
        format!("Settings saved to {}", store.path().display()),
    ))
}

async fn migrate(settings: &DatabaseSettings, action: MigrateCommand) -> Result<()> {
    let conn = platform_db::connect(settings).await?;
    let result = match action {
        MigrateCommand::Up => Migrator::up(&conn, None)
            .await
            .map(|()| "database migrations applied"),
        MigrateCommand::Down => Migrator::down(&conn, Some(1))
            .await
            .map(|()| "most recent migration rolled back"),
    };
    platform_db::release(conn).await;
    info!("{}", result?);
    Ok(())
}

async fn run_command(
    command: Command,
    credentials: &Credentials,
    connector: &Connector,
) -> Result<()> {
    if let Command::Seed { demo } = command {
        return seed(connector, demo).await;
    }

    let user = sign_in(connector, credentials).await?;
    match command {
        Command::Menu => {
            println!("Signed in as {} ({})", user.username, user.role);
            for (label, command) in menu::entries(user.role) {
                println!("  {label:<20} sed-desk {command}");
            }
            Ok(())
        }
        Command::List {
            module,
            search,
            json,
        } => {
            let view = open_view(&user, module, connector, search.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(view.rows())?);
            } else {
                let (headers, rows) = view.table(&module.spec().listed_columns());
                print!("{}", render::table(&headers, &rows));
            }
            Ok(())
        }
        Command::Add { module, set } => {
            check_fields(module, &set)?;
            let mut view = open_view(&user, module, connector, None).await?;
            finish(view.save(FormMode::Add, &set).await)
        }
        Command::Edit { module, id, set } => {
            check_fields(module, &set)?;
            let mut view = open_view(&user, module, connector, None).await?;
            view.select(id);
            finish(view.save(FormMode::Edit, &set).await)
        }
        Command::Delete { module, id, yes } => {
            let mut view = open_view(&user, module, connector, None).await?;
            view.select(id);
            match view.delete_selected(yes).await {
                Some(notice) => finish(notice),
                None => finish(Notice::info("Delete", "Nothing deleted; pass --yes to confirm")),
            }
        }
        Command::Records(records) => run_records(&user, records, connector).await,
        Command::Export {
            module,
            format,
            out,
            search,
        } => {
            let view = open_view(&user, module, connector, search.as_deref()).await?;
            finish(view.export(format.into(), &out))
        }
        Command::Users(users) => run_users(&user, users, connector).await,
        other => bail!("{other:?} does not run as a signed-in command"),
    }
}

async fn seed(connector: &Connector, demo: bool) -> Result<()> {
    let conn = connector.open().await?;
    let result = async {
        let accounts = platform_authn::seed_default_accounts(&conn).await?;
        let records = if demo { fixtures::seed_demo(&conn).await? } else { 0 };
        anyhow::Ok((accounts, records))
    }
    .await;
    platform_db::release(conn).await;
    let (accounts, records) = result?;
    finish(Notice::info(
        "Seed",
        format!("{accounts} accounts and {records} demo records added"),
    ))
}

async fn sign_in(connector: &Connector, credentials: &Credentials) -> Result<CurrentUser> {
    let username = credentials
        .username
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .context("sign in with --username/--password or SED_USERNAME/SED_PASSWORD")?;
    let password = credentials.password.as_deref().unwrap_or_default();
    let conn = connector.open().await?;
    let user = platform_authn::login(&conn, username, password).await;
    platform_db::release(conn).await;
    user?.ok_or_else(|| anyhow!("Invalid username or password"))
}

async fn open_view(
    user: &CurrentUser,
    module: Module,
    connector: &Connector,
    search: Option<&str>,
) -> Result<CrudView<TableApi>> {
    menu::open(&user.username, user.role, module.menu_key())?;
    let mut view = CrudView::new(TableApi::new(module.spec(), connector.clone()));
    if let Err(err) = view.refresh().await {
        return Err(anyhow!("{}", err.notice("Load")));
    }
    if let Some(search) = search {
        view.set_search(search);
    }
    Ok(view)
}

fn check_fields(module: Module, set: &[(String, String)]) -> Result<()> {
    let spec = module.spec();
    for (name, _) in set {
        if spec.field(name).is_none() {
            let known: Vec<_> = spec.fields.iter().map(|f| f.name).collect();
            bail!("unknown field {name:?} for {}; expected one of {}", spec.key, known.join(", "));
        }
    }
    Ok(())
}

async fn run_records(
    user: &CurrentUser,
    command: RecordsCommand,
    connector: &Connector,
) -> Result<()> {
    let (key, spec, filter) = match command {
        RecordsCommand::Personnel { unit, name, status } => (
            MenuKey::PersonnelRecords,
            &tables::PERSONNEL,
            PersonnelQuery { unit, name, status }.to_filter(),
        ),
        RecordsCommand::Rewards {
            recipient,
            reward_type,
        } => (
            MenuKey::RewardRecords,
            &tables::REWARDS,
            RewardQuery {
                recipient,
                reward_type,
            }
            .to_filter(),
        ),
    };
    menu::open(&user.username, user.role, key)?;
    match TableApi::new(spec, connector.clone()).query(&filter).await {
        Ok(rows) => {
            let (headers, body) = render::cells(&spec.listed_columns(), &rows);
            print!("{}", render::table(&headers, &body));
            Ok(())
        }
        Err(err) => finish(err.notice("Search")),
    }
}

async fn run_users(user: &CurrentUser, command: UsersCommand, connector: &Connector) -> Result<()> {
    menu::open(&user.username, user.role, MenuKey::ManageUsers)?;
    let conn = connector.open().await?;
    let notice = match command {
        UsersCommand::List => match platform_authn::list_accounts(&conn).await {
            Ok(accounts) => {
                let headers = ["ID", "Username", "Role", "Created"].map(String::from);
                let rows: Vec<Vec<String>> = accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.to_string(),
                            a.username.clone(),
                            a.role.to_string(),
                            a.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                        ]
                    })
                    .collect();
                print!("{}", render::table(&headers, &rows));
                None
            }
            Err(err) => Some(ApiError::from(err).notice("Load users")),
        },
        UsersCommand::Add {
            account,
            account_password,
            role,
        } => Some(
            match platform_authn::create_account(&conn, user, &account, &account_password, &role)
                .await
            {
                Ok(true) => Notice::info("Users", format!("User {} created", account.trim())),
                Ok(false) => {
                    Notice::info("Users", format!("User {} already exists", account.trim()))
                }
                Err(err) => ApiError::from(err).notice("Create user"),
            },
        ),
        UsersCommand::Delete { account } => Some(
            match platform_authn::delete_account(&conn, &user.username, &account).await {
                Ok(true) => Notice::info("Users", format!("User {} deleted", account.trim())),
                Ok(false) => Notice::info("Users", format!("No user named {}", account.trim())),
                Err(err) => ApiError::from(err).notice("Delete user"),
            },
        ),
    };
    platform_db::release(conn).await;
    notice.map_or(Ok(()), finish)
}

/// Info notices go to stdout; an error notice fails the process.
fn finish(notice: Notice) -> Result<()> {
    if notice.is_error() {
        return Err(anyhow!("{notice}"));
    }
    println!("{notice}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_assignments_and_global_credentials() {
        let cli = Cli::try_parse_from([
            "sed-desk",
            "add",
            "personnel",
            "--set",
            "name=Aminah",
            "--set",
            "address=Lot 5, Jalan = Dua",
            "--username",
            "admin",
        ])
        .unwrap();
        assert_eq!(cli.credentials.username.as_deref(), Some("admin"));
        match cli.command {
            Command::Add { module, set } => {
                assert_eq!(module, Module::Personnel);
                assert_eq!(set[1], ("address".to_string(), "Lot 5, Jalan = Dua".to_string()));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn user_arguments_do_not_clash_with_credentials() {
        let cli = Cli::try_parse_from([
            "sed-desk", "--username", "admin", "users", "add", "siti", "siti123", "--role", "admin",
        ])
        .unwrap();
        assert_eq!(cli.credentials.username.as_deref(), Some("admin"));
        match cli.command {
            Command::Users(UsersCommand::Add {
                account,
                account_password,
                role,
            }) => {
                assert_eq!((account.as_str(), account_password.as_str()), ("siti", "siti123"));
                assert_eq!(role, "admin");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn assignment_needs_an_equals_sign() {
        assert!(parse_assignment("name").is_err());
        assert_eq!(parse_assignment("unit=").unwrap(), ("unit".into(), String::new()));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = check_fields(Module::Journal, &[("mood".into(), "ok".into())]).unwrap_err();
        assert!(err.to_string().starts_with("unknown field \"mood\" for journal"));
    }

    #[tokio::test]
    async fn unreachable_database_is_a_load_failure() {
        let connector = Connector::new(DatabaseSettings {
            host: "127.0.0.1".into(),
            port: 1,
            ..DatabaseSettings::default()
        });
        let admin = CurrentUser {
            id: 1,
            username: "admin".into(),
            role: platform_authz::Role::Admin,
        };
        let err = open_view(&admin, Module::Journal, &connector, None)
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("Load failed: connection failed"), "{err}");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
