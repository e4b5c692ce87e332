use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the application's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS tasklens;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO tasklens, public;")
            .await?;

        // Create the base DB user that will execute all application queries
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE tasklens TO tasklens;
                    GRANT ALL ON SCHEMA tasklens TO tasklens;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA tasklens GRANT ALL ON TABLES TO tasklens;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA tasklens GRANT ALL ON SEQUENCES TO tasklens;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA tasklens GRANT ALL ON FUNCTIONS TO tasklens;
                END $$;
            "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Revoke default privileges first
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA tasklens REVOKE ALL ON FUNCTIONS FROM tasklens;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA tasklens REVOKE ALL ON SEQUENCES FROM tasklens;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA tasklens REVOKE ALL ON TABLES FROM tasklens;
                    REVOKE ALL ON SCHEMA tasklens FROM tasklens;
                    REVOKE ALL PRIVILEGES ON DATABASE tasklens FROM tasklens;
                END $$;
            "#,
            )
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS tasklens CASCADE;")
            .await?;

        Ok(())
    }
}
