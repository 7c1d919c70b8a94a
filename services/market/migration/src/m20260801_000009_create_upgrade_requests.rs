use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UpgradeRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UpgradeRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UpgradeRequests::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UpgradeRequests::RequestedRole)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UpgradeRequests::BusinessName).string())
                    .col(
                        ColumnDef::new(UpgradeRequests::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(UpgradeRequests::AdminComment).text())
                    .col(
                        ColumnDef::new(UpgradeRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UpgradeRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UpgradeRequests::Table, UpgradeRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(UpgradeRequests::Table)
                    .col(UpgradeRequests::UserId)
                    .name("idx_upgrade_requests_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UpgradeRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UpgradeRequests {
    Table,
    Id,
    UserId,
    RequestedRole,
    BusinessName,
    Status,
    AdminComment,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
