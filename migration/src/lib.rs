pub use sea_orm_migration::prelude::*;

mod m20250810_120000_create_schema_and_base_db_setup;
mod m20250810_121500_base_migration;
mod m20250811_093000_add_initial_user;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250810_120000_create_schema_and_base_db_setup::Migration),
            Box::new(m20250810_121500_base_migration::Migration),
            Box::new(m20250811_093000_add_initial_user::Migration),
        ]
    }
}
