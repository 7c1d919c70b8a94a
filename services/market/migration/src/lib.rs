use sea_orm_migration::prelude::*;

mod m20260801_000001_create_users;
mod m20260801_000002_create_categories;
mod m20260801_000003_create_products;
mod m20260801_000004_create_carts;
mod m20260801_000005_create_cart_lines;
mod m20260801_000006_create_orders;
mod m20260801_000007_create_order_lines;
mod m20260801_000008_create_shipments;
mod m20260801_000009_create_upgrade_requests;
mod m20260801_000010_create_revoked_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_users::Migration),
            Box::new(m20260801_000002_create_categories::Migration),
            Box::new(m20260801_000003_create_products::Migration),
            Box::new(m20260801_000004_create_carts::Migration),
            Box::new(m20260801_000005_create_cart_lines::Migration),
            Box::new(m20260801_000006_create_orders::Migration),
            Box::new(m20260801_000007_create_order_lines::Migration),
            Box::new(m20260801_000008_create_shipments::Migration),
            Box::new(m20260801_000009_create_upgrade_requests::Migration),
            Box::new(m20260801_000010_create_revoked_tokens::Migration),
        ]
    }
}
