use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_teams_and_users::Migration),
            Box::new(m20240101_000002_create_routings::Migration),
            Box::new(m20240101_000003_create_orders::Migration),
            Box::new(m20240101_000004_create_pause_reasons::Migration),
            Box::new(m20240101_000005_create_work_order_operations::Migration),
            Box::new(m20240101_000006_create_data_collection::Migration),
            Box::new(m20240101_000007_create_api_keys::Migration),
        ]
    }
}

mod m20240101_000001_create_teams_and_users {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_teams_and_users"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Teams::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Teams::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Teams::Name).string().not_null())
                        .col(
                            ColumnDef::new(Teams::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Name).string().null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TeamMembers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TeamMembers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TeamMembers::TeamId).uuid().not_null())
                        .col(ColumnDef::new(TeamMembers::UserId).uuid().not_null())
                        .col(ColumnDef::new(TeamMembers::Role).string_len(20).not_null())
                        .col(
                            ColumnDef::new(TeamMembers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_team_members_team_id")
                                .from(TeamMembers::Table, TeamMembers::TeamId)
                                .to(Teams::Table, Teams::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_team_members_user_id")
                                .from(TeamMembers::Table, TeamMembers::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_team_members_team_user")
                        .table(TeamMembers::Table)
                        .col(TeamMembers::TeamId)
                        .col(TeamMembers::UserId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Teams::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum Teams {
        Table,
        Id,
        Name,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(crate) enum Users {
        Table,
        Id,
        Email,
        Name,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum TeamMembers {
        Table,
        Id,
        TeamId,
        UserId,
        Role,
        CreatedAt,
    }
}

mod m20240101_000002_create_routings {

    use super::m20240101_000001_create_teams_and_users::Teams;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_routings"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Routings::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Routings::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Routings::TeamId).uuid().not_null())
                        .col(ColumnDef::new(Routings::Name).string().not_null())
                        .col(ColumnDef::new(Routings::Description).text().null())
                        .col(
                            ColumnDef::new(Routings::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Routings::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Routings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Routings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_routings_team_id")
                                .from(Routings::Table, Routings::TeamId)
                                .to(Teams::Table, Teams::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RoutingOperations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RoutingOperations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RoutingOperations::TeamId).uuid().not_null())
                        .col(
                            ColumnDef::new(RoutingOperations::RoutingId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RoutingOperations::Sequence)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RoutingOperations::Title).string().not_null())
                        .col(ColumnDef::new(RoutingOperations::Department).string().null())
                        .col(
                            ColumnDef::new(RoutingOperations::SetupTimeSeconds)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(RoutingOperations::RunTimeSeconds)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(RoutingOperations::Instructions)
                                .text()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(RoutingOperations::Attachments)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RoutingOperations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RoutingOperations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_routing_operations_routing_id")
                                .from(RoutingOperations::Table, RoutingOperations::RoutingId)
                                .to(Routings::Table, Routings::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_routing_operations_routing_id")
                        .table(RoutingOperations::Table)
                        .col(RoutingOperations::RoutingId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RoutingOperations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Routings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum Routings {
        Table,
        Id,
        TeamId,
        Name,
        Description,
        Version,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(crate) enum RoutingOperations {
        Table,
        Id,
        TeamId,
        RoutingId,
        Sequence,
        Title,
        Department,
        SetupTimeSeconds,
        RunTimeSeconds,
        Instructions,
        Attachments,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_orders {

    use super::m20240101_000001_create_teams_and_users::Teams;
    use super::m20240101_000002_create_routings::Routings;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_orders"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::TeamId).uuid().not_null())
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::ProductName).string().not_null())
                        .col(ColumnDef::new(Orders::Quantity).integer().not_null())
                        .col(ColumnDef::new(Orders::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Orders::RoutingId).uuid().null())
                        .col(
                            ColumnDef::new(Orders::ScheduledStart)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Orders::ScheduledEnd)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Orders::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Orders::Notes).text().null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_team_id")
                                .from(Orders::Table, Orders::TeamId)
                                .to(Teams::Table, Teams::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_routing_id")
                                .from(Orders::Table, Orders::RoutingId)
                                .to(Routings::Table, Routings::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_team_order_number")
                        .table(Orders::Table)
                        .col(Orders::TeamId)
                        .col(Orders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum Orders {
        Table,
        Id,
        TeamId,
        OrderNumber,
        ProductName,
        Quantity,
        Status,
        RoutingId,
        ScheduledStart,
        ScheduledEnd,
        CompletedAt,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_pause_reasons {

    use super::m20240101_000001_create_teams_and_users::Teams;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_pause_reasons"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PauseReasons::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PauseReasons::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PauseReasons::TeamId).uuid().not_null())
                        .col(ColumnDef::new(PauseReasons::Name).string().not_null())
                        .col(ColumnDef::new(PauseReasons::Description).text().null())
                        .col(
                            ColumnDef::new(PauseReasons::Category)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PauseReasons::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(PauseReasons::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PauseReasons::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pause_reasons_team_id")
                                .from(PauseReasons::Table, PauseReasons::TeamId)
                                .to(Teams::Table, Teams::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PauseReasons::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum PauseReasons {
        Table,
        Id,
        TeamId,
        Name,
        Description,
        Category,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_work_order_operations {

    use super::m20240101_000002_create_routings::RoutingOperations;
    use super::m20240101_000003_create_orders::Orders;
    use super::m20240101_000004_create_pause_reasons::PauseReasons;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_work_order_operations"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WorkOrderOperations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkOrderOperations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkOrderOperations::TeamId).uuid().not_null())
                        .col(
                            ColumnDef::new(WorkOrderOperations::OrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::RoutingOperationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::Status)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::ScheduledStart)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::ScheduledEnd)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::ActualStart)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::ActualEnd)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(WorkOrderOperations::OperatorId).uuid().null())
                        .col(
                            ColumnDef::new(WorkOrderOperations::CapturedData)
                                .json()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::QuantityCompleted)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::QuantityRejected)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(WorkOrderOperations::Notes).text().null())
                        .col(
                            ColumnDef::new(WorkOrderOperations::Attachments)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkOrderOperations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_woo_order_id")
                                .from(WorkOrderOperations::Table, WorkOrderOperations::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_woo_routing_operation_id")
                                .from(
                                    WorkOrderOperations::Table,
                                    WorkOrderOperations::RoutingOperationId,
                                )
                                .to(RoutingOperations::Table, RoutingOperations::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_woo_order_id")
                        .table(WorkOrderOperations::Table)
                        .col(WorkOrderOperations::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WooPauseEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WooPauseEvents::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WooPauseEvents::TeamId).uuid().not_null())
                        .col(
                            ColumnDef::new(WooPauseEvents::WorkOrderOperationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WooPauseEvents::PauseReasonId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WooPauseEvents::Notes).text().null())
                        .col(ColumnDef::new(WooPauseEvents::PausedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(WooPauseEvents::PausedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WooPauseEvents::ResumedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_woo_pause_events_woo_id")
                                .from(WooPauseEvents::Table, WooPauseEvents::WorkOrderOperationId)
                                .to(WorkOrderOperations::Table, WorkOrderOperations::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_woo_pause_events_reason_id")
                                .from(WooPauseEvents::Table, WooPauseEvents::PauseReasonId)
                                .to(PauseReasons::Table, PauseReasons::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_woo_pause_events_woo_id")
                        .table(WooPauseEvents::Table)
                        .col(WooPauseEvents::WorkOrderOperationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WooPauseEvents::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WorkOrderOperations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum WorkOrderOperations {
        Table,
        Id,
        TeamId,
        OrderId,
        RoutingOperationId,
        Status,
        ScheduledStart,
        ScheduledEnd,
        ActualStart,
        ActualEnd,
        OperatorId,
        CapturedData,
        QuantityCompleted,
        QuantityRejected,
        Notes,
        Attachments,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum WooPauseEvents {
        Table,
        Id,
        TeamId,
        WorkOrderOperationId,
        PauseReasonId,
        Notes,
        PausedBy,
        PausedAt,
        ResumedAt,
    }
}

mod m20240101_000006_create_data_collection {

    use super::m20240101_000001_create_teams_and_users::Teams;
    use super::m20240101_000002_create_routings::RoutingOperations;
    use super::m20240101_000005_create_work_order_operations::WorkOrderOperations;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_data_collection"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DataCollectionActivities::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DataCollectionActivities::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DataCollectionActivities::TeamId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DataCollectionActivities::Name)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DataCollectionActivities::Description)
                                .text()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(DataCollectionActivities::Fields)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DataCollectionActivities::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(DataCollectionActivities::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DataCollectionActivities::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_dc_activities_team_id")
                                .from(
                                    DataCollectionActivities::Table,
                                    DataCollectionActivities::TeamId,
                                )
                                .to(Teams::Table, Teams::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RoutingOperationActivities::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RoutingOperationActivities::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RoutingOperationActivities::TeamId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RoutingOperationActivities::RoutingOperationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RoutingOperationActivities::ActivityId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RoutingOperationActivities::IsRequired)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(RoutingOperationActivities::Sequence)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(RoutingOperationActivities::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_roa_routing_operation_id")
                                .from(
                                    RoutingOperationActivities::Table,
                                    RoutingOperationActivities::RoutingOperationId,
                                )
                                .to(RoutingOperations::Table, RoutingOperations::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_roa_activity_id")
                                .from(
                                    RoutingOperationActivities::Table,
                                    RoutingOperationActivities::ActivityId,
                                )
                                .to(
                                    DataCollectionActivities::Table,
                                    DataCollectionActivities::Id,
                                )
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_roa_operation_activity")
                        .table(RoutingOperationActivities::Table)
                        .col(RoutingOperationActivities::RoutingOperationId)
                        .col(RoutingOperationActivities::ActivityId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DataCollections::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DataCollections::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DataCollections::TeamId).uuid().not_null())
                        .col(
                            ColumnDef::new(DataCollections::WorkOrderOperationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DataCollections::ActivityId).uuid().not_null())
                        .col(ColumnDef::new(DataCollections::OperatorId).uuid().not_null())
                        .col(ColumnDef::new(DataCollections::Data).json().not_null())
                        .col(
                            ColumnDef::new(DataCollections::CollectedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_data_collections_woo_id")
                                .from(DataCollections::Table, DataCollections::WorkOrderOperationId)
                                .to(WorkOrderOperations::Table, WorkOrderOperations::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_data_collections_activity_id")
                                .from(DataCollections::Table, DataCollections::ActivityId)
                                .to(
                                    DataCollectionActivities::Table,
                                    DataCollectionActivities::Id,
                                )
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_data_collections_woo_id")
                        .table(DataCollections::Table)
                        .col(DataCollections::WorkOrderOperationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DataCollections::Table).to_owned())
                .await?;
            manager
                .drop_table(
                    Table::drop()
                        .table(RoutingOperationActivities::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(DataCollectionActivities::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum DataCollectionActivities {
        Table,
        Id,
        TeamId,
        Name,
        Description,
        Fields,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum RoutingOperationActivities {
        Table,
        Id,
        TeamId,
        RoutingOperationId,
        ActivityId,
        IsRequired,
        Sequence,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum DataCollections {
        Table,
        Id,
        TeamId,
        WorkOrderOperationId,
        ActivityId,
        OperatorId,
        Data,
        CollectedAt,
    }
}

mod m20240101_000007_create_api_keys {

    use super::m20240101_000001_create_teams_and_users::{Teams, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_api_keys"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ApiKeys::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ApiKeys::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(ApiKeys::TeamId).uuid().not_null())
                        .col(ColumnDef::new(ApiKeys::Name).string().not_null())
                        .col(ColumnDef::new(ApiKeys::KeyPrefix).string_len(32).not_null())
                        .col(
                            ColumnDef::new(ApiKeys::KeyHash)
                                .string_len(64)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(ApiKeys::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(ApiKeys::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ApiKeys::ExpiresAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ApiKeys::LastUsedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ApiKeys::RevokedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_api_keys_team_id")
                                .from(ApiKeys::Table, ApiKeys::TeamId)
                                .to(Teams::Table, Teams::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_api_keys_created_by")
                                .from(ApiKeys::Table, ApiKeys::CreatedBy)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ApiKeys::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ApiKeys {
        Table,
        Id,
        TeamId,
        Name,
        KeyPrefix,
        KeyHash,
        CreatedBy,
        CreatedAt,
        ExpiresAt,
        LastUsedAt,
        RevokedAt,
    }
}
