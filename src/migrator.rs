use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_order_tables::Migration),
            Box::new(m20240301_000002_create_reposition_tables::Migration),
            Box::new(m20240301_000003_create_notifications_table::Migration),
            Box::new(m20240301_000004_create_folio_counters_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_order_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_order_tables"
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
                        .col(
                            ColumnDef::new(Orders::Folio)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::ClienteHotel).string().not_null())
                        .col(ColumnDef::new(Orders::NoSolicitud).string().not_null())
                        .col(ColumnDef::new(Orders::NoHoja).string().null())
                        .col(ColumnDef::new(Orders::Modelo).string().not_null())
                        .col(ColumnDef::new(Orders::TipoPrenda).string().not_null())
                        .col(ColumnDef::new(Orders::Color).string().not_null())
                        .col(ColumnDef::new(Orders::Tela).string().not_null())
                        .col(ColumnDef::new(Orders::TotalPiezas).integer().not_null())
                        .col(ColumnDef::new(Orders::CurrentArea).string().not_null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::CreatedBy).integer().not_null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_current_area")
                        .table(Orders::Table)
                        .col(Orders::CurrentArea)
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
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderPieces::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderPieces::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderPieces::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderPieces::Area).string().not_null())
                        .col(ColumnDef::new(OrderPieces::Pieces).integer().not_null())
                        .col(
                            ColumnDef::new(OrderPieces::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One ledger row per (order, area)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_pieces_order_area")
                        .table(OrderPieces::Table)
                        .col(OrderPieces::OrderId)
                        .col(OrderPieces::Area)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Transfers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Transfers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transfers::OrderId).uuid().not_null())
                        .col(ColumnDef::new(Transfers::FromArea).string().not_null())
                        .col(ColumnDef::new(Transfers::ToArea).string().not_null())
                        .col(ColumnDef::new(Transfers::Pieces).integer().not_null())
                        .col(ColumnDef::new(Transfers::Status).string().not_null())
                        .col(ColumnDef::new(Transfers::Notes).string().null())
                        .col(ColumnDef::new(Transfers::CreatedBy).integer().not_null())
                        .col(ColumnDef::new(Transfers::ProcessedBy).integer().null())
                        .col(
                            ColumnDef::new(Transfers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transfers::ProcessedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transfers_to_area_status")
                        .table(Transfers::Table)
                        .col(Transfers::ToArea)
                        .col(Transfers::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderHistory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderHistory::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderHistory::Action).string().not_null())
                        .col(
                            ColumnDef::new(OrderHistory::Description)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderHistory::FromArea).string().null())
                        .col(ColumnDef::new(OrderHistory::ToArea).string().null())
                        .col(ColumnDef::new(OrderHistory::Pieces).integer().null())
                        .col(ColumnDef::new(OrderHistory::UserId).integer().not_null())
                        .col(
                            ColumnDef::new(OrderHistory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_history_order_id")
                        .table(OrderHistory::Table)
                        .col(OrderHistory::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderHistory::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Transfers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderPieces::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        Folio,
        ClienteHotel,
        NoSolicitud,
        NoHoja,
        Modelo,
        TipoPrenda,
        Color,
        Tela,
        TotalPiezas,
        CurrentArea,
        Status,
        CreatedBy,
        CreatedAt,
        CompletedAt,
    }

    #[derive(DeriveIden)]
    enum OrderPieces {
        Table,
        Id,
        OrderId,
        Area,
        Pieces,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Transfers {
        Table,
        Id,
        OrderId,
        FromArea,
        ToArea,
        Pieces,
        Status,
        Notes,
        CreatedBy,
        ProcessedBy,
        CreatedAt,
        ProcessedAt,
    }

    #[derive(DeriveIden)]
    enum OrderHistory {
        Table,
        Id,
        OrderId,
        Action,
        Description,
        FromArea,
        ToArea,
        Pieces,
        UserId,
        CreatedAt,
    }
}

mod m20240301_000002_create_reposition_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_reposition_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Repositions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Repositions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Repositions::Folio)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Repositions::Type).string().not_null())
                        .col(
                            ColumnDef::new(Repositions::SolicitanteNombre)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Repositions::SolicitanteArea)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Repositions::NoSolicitud).string().not_null())
                        .col(ColumnDef::new(Repositions::NoHoja).string().null())
                        .col(
                            ColumnDef::new(Repositions::CausanteDano)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Repositions::DescripcionSuceso)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Repositions::ModeloPrenda)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Repositions::Tela).string().not_null())
                        .col(ColumnDef::new(Repositions::Color).string().not_null())
                        .col(ColumnDef::new(Repositions::TipoPieza).string().not_null())
                        .col(ColumnDef::new(Repositions::Urgencia).string().not_null())
                        .col(ColumnDef::new(Repositions::Observaciones).string().null())
                        .col(ColumnDef::new(Repositions::CurrentArea).string().not_null())
                        .col(ColumnDef::new(Repositions::Status).string().not_null())
                        .col(ColumnDef::new(Repositions::CreatedBy).integer().not_null())
                        .col(ColumnDef::new(Repositions::ApprovedBy).integer().null())
                        .col(
                            ColumnDef::new(Repositions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Repositions::ApprovedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Repositions::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Repositions::DeletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Repositions::DeletionReason).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_repositions_status")
                        .table(Repositions::Table)
                        .col(Repositions::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_repositions_current_area")
                        .table(Repositions::Table)
                        .col(Repositions::CurrentArea)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RepositionPieces::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RepositionPieces::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionPieces::RepositionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RepositionPieces::Talla).string().not_null())
                        .col(
                            ColumnDef::new(RepositionPieces::Cantidad)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionPieces::FolioOriginal)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(RepositionPieces::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RepositionTransfers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RepositionTransfers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionTransfers::RepositionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionTransfers::FromArea)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionTransfers::ToArea)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RepositionTransfers::Notes).string().null())
                        .col(
                            ColumnDef::new(RepositionTransfers::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionTransfers::CreatedBy)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionTransfers::ProcessedBy)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(RepositionTransfers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionTransfers::ProcessedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reposition_transfers_to_area_status")
                        .table(RepositionTransfers::Table)
                        .col(RepositionTransfers::ToArea)
                        .col(RepositionTransfers::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RepositionHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RepositionHistory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionHistory::RepositionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionHistory::Action)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionHistory::Description)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RepositionHistory::FromArea).string().null())
                        .col(ColumnDef::new(RepositionHistory::ToArea).string().null())
                        .col(
                            ColumnDef::new(RepositionHistory::UserId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionHistory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reposition_history_reposition_id")
                        .table(RepositionHistory::Table)
                        .col(RepositionHistory::RepositionId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RepositionHistory::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RepositionTransfers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RepositionPieces::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Repositions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Repositions {
        Table,
        Id,
        Folio,
        Type,
        SolicitanteNombre,
        SolicitanteArea,
        NoSolicitud,
        NoHoja,
        CausanteDano,
        DescripcionSuceso,
        ModeloPrenda,
        Tela,
        Color,
        TipoPieza,
        Urgencia,
        Observaciones,
        CurrentArea,
        Status,
        CreatedBy,
        ApprovedBy,
        CreatedAt,
        ApprovedAt,
        CompletedAt,
        DeletedAt,
        DeletionReason,
    }

    #[derive(DeriveIden)]
    enum RepositionPieces {
        Table,
        Id,
        RepositionId,
        Talla,
        Cantidad,
        FolioOriginal,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum RepositionTransfers {
        Table,
        Id,
        RepositionId,
        FromArea,
        ToArea,
        Notes,
        Status,
        CreatedBy,
        ProcessedBy,
        CreatedAt,
        ProcessedAt,
    }

    #[derive(DeriveIden)]
    enum RepositionHistory {
        Table,
        Id,
        RepositionId,
        Action,
        Description,
        FromArea,
        ToArea,
        UserId,
        CreatedAt,
    }
}

mod m20240301_000003_create_notifications_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_notifications_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::UserId).integer().not_null())
                        .col(ColumnDef::new(Notifications::Type).string().not_null())
                        .col(ColumnDef::new(Notifications::Title).string().not_null())
                        .col(ColumnDef::new(Notifications::Message).string().not_null())
                        .col(ColumnDef::new(Notifications::TransferId).uuid().null())
                        .col(ColumnDef::new(Notifications::OrderId).uuid().null())
                        .col(ColumnDef::new(Notifications::RepositionId).uuid().null())
                        .col(
                            ColumnDef::new(Notifications::Read)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Notifications::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifications_user_id")
                        .table(Notifications::Table)
                        .col(Notifications::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Notifications {
        Table,
        Id,
        UserId,
        Type,
        Title,
        Message,
        TransferId,
        OrderId,
        RepositionId,
        Read,
        CreatedAt,
    }
}

mod m20240301_000004_create_folio_counters_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_folio_counters_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RepositionFolioCounters::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RepositionFolioCounters::Prefix)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RepositionFolioCounters::Counter)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(RepositionFolioCounters::Table)
                        .to_owned(),
                )
                .await
        }
    }

    #[derive(DeriveIden)]
    enum RepositionFolioCounters {
        Table,
        Prefix,
        Counter,
    }
}
