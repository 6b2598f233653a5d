use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum OrgChartMembers {
    Table,
    Id,
    Name,
    Position,
    Unit,
    SupervisorId,
    Phone,
    Email,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PersonnelProfiles {
    Table,
    Id,
    Name,
    NationalId,
    Rank,
    Unit,
    Phone,
    Address,
    JoinedOn,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Rewards {
    Table,
    Id,
    RecipientName,
    NationalId,
    RewardType,
    AwardedOn,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum IncidentReports {
    Table,
    Id,
    ReportNo,
    Title,
    Location,
    OccurredOn,
    Description,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum JournalEntries {
    Table,
    Id,
    EntryDate,
    Title,
    Body,
    Author,
    CreatedAt,
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

/// `DATETIME`: MySQL `TIMESTAMP` columns do not decode as `NaiveDateTime`.
fn created_at_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .date_time()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrgChartMembers::Table)
                    .if_not_exists()
                    .col(&mut id_col(OrgChartMembers::Id))
                    .col(ColumnDef::new(OrgChartMembers::Name).string_len(100).not_null())
                    .col(ColumnDef::new(OrgChartMembers::Position).string_len(100).not_null())
                    .col(ColumnDef::new(OrgChartMembers::Unit).string_len(100))
                    .col(ColumnDef::new(OrgChartMembers::SupervisorId).integer().null())
                    .col(ColumnDef::new(OrgChartMembers::Phone).string_len(30))
                    .col(ColumnDef::new(OrgChartMembers::Email).string_len(100))
                    .col(&mut created_at_col(OrgChartMembers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PersonnelProfiles::Table)
                    .if_not_exists()
                    .col(&mut id_col(PersonnelProfiles::Id))
                    .col(ColumnDef::new(PersonnelProfiles::Name).string_len(120).not_null())
                    .col(
                        ColumnDef::new(PersonnelProfiles::NationalId)
                            .string_len(30)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PersonnelProfiles::Rank).string_len(60))
                    .col(ColumnDef::new(PersonnelProfiles::Unit).string_len(60))
                    .col(ColumnDef::new(PersonnelProfiles::Phone).string_len(30))
                    .col(ColumnDef::new(PersonnelProfiles::Address).text())
                    .col(ColumnDef::new(PersonnelProfiles::JoinedOn).date())
                    .col(
                        ColumnDef::new(PersonnelProfiles::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(&mut created_at_col(PersonnelProfiles::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_personnel_profiles_unit")
                    .table(PersonnelProfiles::Table)
                    .col(PersonnelProfiles::Unit)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rewards::Table)
                    .if_not_exists()
                    .col(&mut id_col(Rewards::Id))
                    .col(ColumnDef::new(Rewards::RecipientName).string_len(120).not_null())
                    .col(ColumnDef::new(Rewards::NationalId).string_len(30))
                    .col(ColumnDef::new(Rewards::RewardType).string_len(100).not_null())
                    .col(ColumnDef::new(Rewards::AwardedOn).date())
                    .col(ColumnDef::new(Rewards::Description).text())
                    .col(&mut created_at_col(Rewards::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IncidentReports::Table)
                    .if_not_exists()
                    .col(&mut id_col(IncidentReports::Id))
                    .col(ColumnDef::new(IncidentReports::ReportNo).string_len(50))
                    .col(ColumnDef::new(IncidentReports::Title).string_len(150).not_null())
                    .col(ColumnDef::new(IncidentReports::Location).string_len(150))
                    .col(ColumnDef::new(IncidentReports::OccurredOn).date())
                    .col(ColumnDef::new(IncidentReports::Description).text())
                    .col(
                        ColumnDef::new(IncidentReports::Status)
                            .string_len(16)
                            .not_null()
                            .default("open"),
                    )
                    .col(&mut created_at_col(IncidentReports::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JournalEntries::Table)
                    .if_not_exists()
                    .col(&mut id_col(JournalEntries::Id))
                    .col(ColumnDef::new(JournalEntries::EntryDate).date().not_null())
                    .col(ColumnDef::new(JournalEntries::Title).string_len(150).not_null())
                    .col(ColumnDef::new(JournalEntries::Body).text())
                    .col(ColumnDef::new(JournalEntries::Author).string_len(100))
                    .col(&mut created_at_col(JournalEntries::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JournalEntries::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IncidentReports::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rewards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PersonnelProfiles::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrgChartMembers::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
