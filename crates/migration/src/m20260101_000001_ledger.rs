//! Ledger schema.
//!
//! - `wallet`: balance-holding accounts, keyed by `(name, user_id)`
//! - `category`: transaction tags, keyed by `(name, user_id)`
//! - `transaction`: posted movements with a store-generated id
//! - `affected_wallet`: which wallet each transaction moved and in which role
//!
//! Every table is created with `IF NOT EXISTS`, so running the migrator
//! against an existing schema is a no-op.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Wallet {
    Table,
    Name,
    UserId,
    #[iden = "type"]
    Kind,
    BalanceMinor,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Category {
    Table,
    Name,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Transaction {
    Table,
    Id,
    AmountMinor,
    #[iden = "type"]
    Kind,
    Category,
    Description,
    OccurredAt,
    CreatedAt,
    UpdatedAt,
    UserId,
}

#[derive(Iden)]
enum AffectedWallet {
    Table,
    TransactionId,
    Wallet,
    Role,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wallet::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Wallet::Name).string().not_null())
                    .col(ColumnDef::new(Wallet::UserId).string().not_null())
                    .col(ColumnDef::new(Wallet::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Wallet::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Wallet::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Wallet::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(Index::create().col(Wallet::Name).col(Wallet::UserId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Category::Name).string().not_null())
                    .col(ColumnDef::new(Category::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Category::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Category::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(Index::create().col(Category::Name).col(Category::UserId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transaction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transaction::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transaction::AmountMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Transaction::AmountMinor).gte(0)),
                    )
                    .col(ColumnDef::new(Transaction::Kind).string().not_null())
                    .col(ColumnDef::new(Transaction::Category).string().not_null())
                    .col(
                        ColumnDef::new(Transaction::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Transaction::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transaction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transaction::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transaction::UserId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction-category")
                            .from(
                                Transaction::Table,
                                (Transaction::Category, Transaction::UserId),
                            )
                            .to(Category::Table, (Category::Name, Category::UserId)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction-user_id-occurred_at")
                    .table(Transaction::Table)
                    .col(Transaction::UserId)
                    .col(Transaction::OccurredAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AffectedWallet::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AffectedWallet::TransactionId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AffectedWallet::Wallet).string().not_null())
                    .col(ColumnDef::new(AffectedWallet::Role).string().not_null())
                    .col(ColumnDef::new(AffectedWallet::UserId).string().not_null())
                    .col(
                        ColumnDef::new(AffectedWallet::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AffectedWallet::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(AffectedWallet::TransactionId)
                            .col(AffectedWallet::Wallet)
                            .col(AffectedWallet::Role),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-affected_wallet-transaction_id")
                            .from(AffectedWallet::Table, AffectedWallet::TransactionId)
                            .to(Transaction::Table, Transaction::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-affected_wallet-wallet")
                            .from(
                                AffectedWallet::Table,
                                (AffectedWallet::Wallet, AffectedWallet::UserId),
                            )
                            .to(Wallet::Table, (Wallet::Name, Wallet::UserId)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-affected_wallet-user_id-wallet")
                    .table(AffectedWallet::Table)
                    .col(AffectedWallet::UserId)
                    .col(AffectedWallet::Wallet)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(AffectedWallet::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transaction::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Category::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallet::Table).to_owned())
            .await?;
        Ok(())
    }
}
