use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shipments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shipments::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Shipments::OrderId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Shipments::Address).string().not_null())
                    .col(ColumnDef::new(Shipments::City).string().not_null())
                    .col(ColumnDef::new(Shipments::State).string().not_null())
                    .col(ColumnDef::new(Shipments::PostalCode).string().not_null())
                    .col(ColumnDef::new(Shipments::TrackingNumber).string())
                    .col(ColumnDef::new(Shipments::ShippedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Shipments::DeliveredAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Shipments::Table, Shipments::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shipments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Shipments {
    Table,
    Id,
    OrderId,
    Address,
    City,
    State,
    PostalCode,
    TrackingNumber,
    ShippedAt,
    DeliveredAt,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
}
