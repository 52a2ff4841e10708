//! Embedded schema migrations.
//!
//! One migration per table (or tightly-coupled table pair), in creation
//! order. The shifts migration also installs the partial unique index that
//! makes "one open shift per branch" a database-level guarantee instead of
//! an application-level check.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_suppliers_table::Migration),
            Box::new(m20240301_000002_create_products_table::Migration),
            Box::new(m20240301_000003_create_shifts_table::Migration),
            Box::new(m20240301_000004_create_cash_cuts_table::Migration),
            Box::new(m20240301_000005_create_purchases_tables::Migration),
            Box::new(m20240301_000006_create_payments_table::Migration),
            Box::new(m20240301_000007_create_inventory_movements_table::Migration),
            Box::new(m20240301_000008_create_sales_tables::Migration),
            Box::new(m20240301_000009_create_appointments_tables::Migration),
            Box::new(m20240301_000010_create_expenses_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_suppliers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_suppliers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Suppliers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Suppliers::AccountId).uuid().not_null())
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(ColumnDef::new(Suppliers::ContactName).string().null())
                        .col(ColumnDef::new(Suppliers::Phone).string().null())
                        .col(ColumnDef::new(Suppliers::Email).string().null())
                        .col(
                            ColumnDef::new(Suppliers::Balance)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Suppliers::CreditDays)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Suppliers::CreditLimit)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Suppliers::Notes).string().null())
                        .col(
                            ColumnDef::new(Suppliers::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
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
                        .name("idx_suppliers_account_id")
                        .table(Suppliers::Table)
                        .col(Suppliers::AccountId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Suppliers {
        Table,
        Id,
        AccountId,
        Name,
        ContactName,
        Phone,
        Email,
        Balance,
        CreditDays,
        CreditLimit,
        Notes,
        Active,
        CreatedAt,
    }
}

mod m20240301_000002_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::AccountId).uuid().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Sku).string().null())
                        .col(ColumnDef::new(Products::Category).string().null())
                        .col(
                            ColumnDef::new(Products::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::MinStock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Cost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
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
                        .name("idx_products_account_id")
                        .table(Products::Table)
                        .col(Products::AccountId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_sku")
                        .table(Products::Table)
                        .col(Products::Sku)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        AccountId,
        Name,
        Sku,
        Category,
        Stock,
        MinStock,
        Price,
        Cost,
        Active,
        CreatedAt,
    }
}

mod m20240301_000003_create_shifts_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_shifts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Shifts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Shifts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Shifts::BranchId).uuid().not_null())
                        .col(ColumnDef::new(Shifts::UserId).uuid().not_null())
                        .col(ColumnDef::new(Shifts::Date).date().not_null())
                        .col(ColumnDef::new(Shifts::StartTime).time().not_null())
                        .col(ColumnDef::new(Shifts::EndTime).time().null())
                        .col(
                            ColumnDef::new(Shifts::InitialCash)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Shifts::FinalCash).decimal().null())
                        .col(ColumnDef::new(Shifts::Status).string().not_null())
                        .col(
                            ColumnDef::new(Shifts::CreatedAt)
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
                        .name("idx_shifts_branch_date")
                        .table(Shifts::Table)
                        .col(Shifts::BranchId)
                        .col(Shifts::Date)
                        .to_owned(),
                )
                .await?;

            // At most one open shift per branch. A partial unique index makes
            // the check-then-insert race lose at the store instead of racing
            // in application code. Same syntax on PostgreSQL and SQLite.
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_shifts_one_open_per_branch \
                     ON shifts (branch_id) WHERE status = 'open'",
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Shifts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Shifts {
        Table,
        Id,
        BranchId,
        UserId,
        Date,
        StartTime,
        EndTime,
        InitialCash,
        FinalCash,
        Status,
        CreatedAt,
    }
}

mod m20240301_000004_create_cash_cuts_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_cash_cuts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CashCuts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(CashCuts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(CashCuts::ShiftId).uuid().null())
                        .col(ColumnDef::new(CashCuts::BranchId).uuid().not_null())
                        .col(ColumnDef::new(CashCuts::UserId).uuid().not_null())
                        .col(ColumnDef::new(CashCuts::Date).date().not_null())
                        .col(
                            ColumnDef::new(CashCuts::TotalSales)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashCuts::TotalExpenses)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashCuts::TotalPurchases)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashCuts::CompletedAppointments)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(CashCuts::SalesByMethod).json().not_null())
                        .col(ColumnDef::new(CashCuts::ExpensesByMethod).json().not_null())
                        .col(ColumnDef::new(CashCuts::PurchasesByMethod).json().not_null())
                        .col(ColumnDef::new(CashCuts::ExpectedByMethod).json().not_null())
                        .col(ColumnDef::new(CashCuts::RealByMethod).json().not_null())
                        .col(ColumnDef::new(CashCuts::DifferenceByMethod).json().not_null())
                        .col(
                            ColumnDef::new(CashCuts::Expected)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashCuts::RealAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashCuts::Difference)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashCuts::InitialCash)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(CashCuts::FinalCash).decimal().null())
                        .col(
                            ColumnDef::new(CashCuts::CreatedAt)
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
                        .name("idx_cash_cuts_branch_date")
                        .table(CashCuts::Table)
                        .col(CashCuts::BranchId)
                        .col(CashCuts::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CashCuts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum CashCuts {
        Table,
        Id,
        ShiftId,
        BranchId,
        UserId,
        Date,
        TotalSales,
        TotalExpenses,
        TotalPurchases,
        CompletedAppointments,
        SalesByMethod,
        ExpensesByMethod,
        PurchasesByMethod,
        ExpectedByMethod,
        RealByMethod,
        DifferenceByMethod,
        Expected,
        RealAmount,
        Difference,
        InitialCash,
        FinalCash,
        CreatedAt,
    }
}

mod m20240301_000005_create_purchases_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_purchases_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Purchases::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Purchases::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Purchases::BranchId).uuid().not_null())
                        .col(ColumnDef::new(Purchases::SupplierId).uuid().null())
                        .col(ColumnDef::new(Purchases::Date).date().not_null())
                        .col(
                            ColumnDef::new(Purchases::Total)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Purchases::PaymentType).string().not_null())
                        .col(ColumnDef::new(Purchases::Status).string().not_null())
                        .col(
                            ColumnDef::new(Purchases::PaidAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Purchases::Balance)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Purchases::DueDate).date().null())
                        .col(ColumnDef::new(Purchases::Notes).string().null())
                        .col(ColumnDef::new(Purchases::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(Purchases::CreatedAt)
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
                        .name("idx_purchases_branch_date")
                        .table(Purchases::Table)
                        .col(Purchases::BranchId)
                        .col(Purchases::Date)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchases_supplier_id")
                        .table(Purchases::Table)
                        .col(Purchases::SupplierId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchases_status")
                        .table(Purchases::Table)
                        .col(Purchases::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseLines::PurchaseId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseLines::ProductId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseLines::Quantity).integer().not_null())
                        .col(ColumnDef::new(PurchaseLines::UnitCost).decimal().not_null())
                        .col(ColumnDef::new(PurchaseLines::Subtotal).decimal().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_lines_purchase_id")
                        .table(PurchaseLines::Table)
                        .col(PurchaseLines::PurchaseId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Purchases::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Purchases {
        Table,
        Id,
        BranchId,
        SupplierId,
        Date,
        Total,
        PaymentType,
        Status,
        PaidAmount,
        Balance,
        DueDate,
        Notes,
        CreatedBy,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum PurchaseLines {
        Table,
        Id,
        PurchaseId,
        ProductId,
        Quantity,
        UnitCost,
        Subtotal,
    }
}

mod m20240301_000006_create_payments_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_payments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payments::ReferenceType).string().not_null())
                        .col(ColumnDef::new(Payments::ReferenceId).uuid().not_null())
                        .col(ColumnDef::new(Payments::Method).string().not_null())
                        .col(ColumnDef::new(Payments::Amount).decimal().not_null())
                        .col(ColumnDef::new(Payments::Reference).string().null())
                        .col(ColumnDef::new(Payments::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(Payments::CreatedAt)
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
                        .name("idx_payments_reference")
                        .table(Payments::Table)
                        .col(Payments::ReferenceType)
                        .col(Payments::ReferenceId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payments_method")
                        .table(Payments::Table)
                        .col(Payments::Method)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Payments {
        Table,
        Id,
        ReferenceType,
        ReferenceId,
        Method,
        Amount,
        Reference,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240301_000007_create_inventory_movements_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000007_create_inventory_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryMovements::BranchId).uuid().not_null())
                        .col(
                            ColumnDef::new(InventoryMovements::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::MovementType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryMovements::Reason).string().not_null())
                        .col(ColumnDef::new(InventoryMovements::UserId).uuid().null())
                        .col(
                            ColumnDef::new(InventoryMovements::CreatedAt)
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
                        .name("idx_inventory_movements_product_id")
                        .table(InventoryMovements::Table)
                        .col(InventoryMovements::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_movements_branch_created")
                        .table(InventoryMovements::Table)
                        .col(InventoryMovements::BranchId)
                        .col(InventoryMovements::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryMovements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InventoryMovements {
        Table,
        Id,
        BranchId,
        ProductId,
        MovementType,
        Quantity,
        Reason,
        UserId,
        CreatedAt,
    }
}

mod m20240301_000008_create_sales_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000008_create_sales_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Sales::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Sales::BranchId).uuid().not_null())
                        .col(ColumnDef::new(Sales::StylistId).uuid().null())
                        .col(ColumnDef::new(Sales::ClientName).string().null())
                        .col(ColumnDef::new(Sales::ClientPhone).string().null())
                        .col(ColumnDef::new(Sales::Date).date().not_null())
                        .col(ColumnDef::new(Sales::Time).time().not_null())
                        .col(
                            ColumnDef::new(Sales::Subtotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Sales::Discount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Sales::Total).decimal().not_null().default(0))
                        .col(ColumnDef::new(Sales::Notes).string().null())
                        .col(
                            ColumnDef::new(Sales::CreatedAt)
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
                        .name("idx_sales_branch_date")
                        .table(Sales::Table)
                        .col(Sales::BranchId)
                        .col(Sales::Date)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SaleItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(SaleItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(SaleItems::SaleId).uuid().not_null())
                        .col(ColumnDef::new(SaleItems::ItemType).string().not_null())
                        .col(ColumnDef::new(SaleItems::ItemId).uuid().not_null())
                        .col(ColumnDef::new(SaleItems::Name).string().not_null())
                        .col(ColumnDef::new(SaleItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(SaleItems::Price).decimal().not_null())
                        .col(
                            ColumnDef::new(SaleItems::Discount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(SaleItems::Subtotal).decimal().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sale_items_sale_id")
                        .table(SaleItems::Table)
                        .col(SaleItems::SaleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SaleItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Sales::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Sales {
        Table,
        Id,
        BranchId,
        StylistId,
        ClientName,
        ClientPhone,
        Date,
        Time,
        Subtotal,
        Discount,
        Total,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum SaleItems {
        Table,
        Id,
        SaleId,
        ItemType,
        ItemId,
        Name,
        Quantity,
        Price,
        Discount,
        Subtotal,
    }
}

mod m20240301_000009_create_appointments_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000009_create_appointments_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Appointments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Appointments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Appointments::BranchId).uuid().not_null())
                        .col(ColumnDef::new(Appointments::ClientId).uuid().null())
                        .col(ColumnDef::new(Appointments::ClientName).string().null())
                        .col(ColumnDef::new(Appointments::StylistId).uuid().null())
                        .col(ColumnDef::new(Appointments::Date).date().not_null())
                        .col(ColumnDef::new(Appointments::StartTime).time().not_null())
                        .col(ColumnDef::new(Appointments::Status).string().not_null())
                        .col(
                            ColumnDef::new(Appointments::Total)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Appointments::Notes).string().null())
                        .col(
                            ColumnDef::new(Appointments::CreatedAt)
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
                        .name("idx_appointments_branch_date")
                        .table(Appointments::Table)
                        .col(Appointments::BranchId)
                        .col(Appointments::Date)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_appointments_status")
                        .table(Appointments::Table)
                        .col(Appointments::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AppointmentItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AppointmentItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AppointmentItems::AppointmentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AppointmentItems::ItemType).string().not_null())
                        .col(ColumnDef::new(AppointmentItems::ItemId).uuid().not_null())
                        .col(ColumnDef::new(AppointmentItems::Name).string().not_null())
                        .col(
                            ColumnDef::new(AppointmentItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AppointmentItems::Price).decimal().not_null())
                        .col(
                            ColumnDef::new(AppointmentItems::Subtotal)
                                .decimal()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_appointment_items_appointment_id")
                        .table(AppointmentItems::Table)
                        .col(AppointmentItems::AppointmentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AppointmentItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Appointments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Appointments {
        Table,
        Id,
        BranchId,
        ClientId,
        ClientName,
        StylistId,
        Date,
        StartTime,
        Status,
        Total,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum AppointmentItems {
        Table,
        Id,
        AppointmentId,
        ItemType,
        ItemId,
        Name,
        Quantity,
        Price,
        Subtotal,
    }
}

mod m20240301_000010_create_expenses_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000010_create_expenses_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Expenses::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Expenses::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Expenses::BranchId).uuid().not_null())
                        .col(ColumnDef::new(Expenses::Date).date().not_null())
                        .col(ColumnDef::new(Expenses::Category).string().null())
                        .col(ColumnDef::new(Expenses::Description).string().not_null())
                        .col(ColumnDef::new(Expenses::Amount).decimal().not_null())
                        .col(ColumnDef::new(Expenses::PaymentMethod).string().not_null())
                        .col(ColumnDef::new(Expenses::Supplier).string().null())
                        .col(ColumnDef::new(Expenses::Notes).string().null())
                        .col(ColumnDef::new(Expenses::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(Expenses::CreatedAt)
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
                        .name("idx_expenses_branch_date")
                        .table(Expenses::Table)
                        .col(Expenses::BranchId)
                        .col(Expenses::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Expenses::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Expenses {
        Table,
        Id,
        BranchId,
        Date,
        Category,
        Description,
        Amount,
        PaymentMethod,
        Supplier,
        Notes,
        CreatedBy,
        CreatedAt,
    }
}
