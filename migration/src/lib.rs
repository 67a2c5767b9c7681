pub use sea_orm_migration::prelude::*;

mod m20250620_000001_initial;
mod m20250705_000001_add_disposition_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250620_000001_initial::Migration),
            Box::new(m20250705_000001_add_disposition_records::Migration),
        ]
    }
}
