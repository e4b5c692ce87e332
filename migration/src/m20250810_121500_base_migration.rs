use sea_orm_migration::prelude::*;

// Must stay in lockstep with entity::tasks::Model; every bulk insert the
// task persister issues names every column.
const CREATE_TASKS_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS tasklens.tasks (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        meeting_id UUID NOT NULL REFERENCES tasklens.meetings(id) ON DELETE CASCADE,
        user_id UUID NOT NULL REFERENCES tasklens.users(id) ON DELETE CASCADE,
        description TEXT NOT NULL,
        assignee VARCHAR(255) NOT NULL,
        due_by DATE,
        priority tasklens.task_priority NOT NULL DEFAULT 'medium',
        context TEXT,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r#"
            DO $$ BEGIN
                CREATE TYPE tasklens.task_priority AS ENUM ('high', 'medium', 'low');
            EXCEPTION
                WHEN duplicate_object THEN NULL;
            END $$;
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            DO $$ BEGIN
                CREATE TYPE tasklens.pipeline_run_type AS ENUM ('live', 'dry_run');
            EXCEPTION
                WHEN duplicate_object THEN NULL;
            END $$;
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS tasklens.users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                email VARCHAR(255) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,
                first_name VARCHAR(255) NOT NULL,
                last_name VARCHAR(255) NOT NULL,
                display_name VARCHAR(255),
                timezone VARCHAR(255),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS tasklens.meetings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL REFERENCES tasklens.users(id) ON DELETE CASCADE,
                title VARCHAR(255) NOT NULL,
                date DATE NOT NULL,
                duration VARCHAR(50),
                transcript TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_meetings_user_id ON tasklens.meetings(user_id)",
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS tasklens.zoom_meetings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL REFERENCES tasklens.users(id) ON DELETE CASCADE,
                meeting_id UUID NOT NULL REFERENCES tasklens.meetings(id) ON DELETE CASCADE,
                zoom_meeting_id VARCHAR(255) NOT NULL,
                zoom_uuid VARCHAR(255),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT zoom_meetings_user_zoom_id_unique UNIQUE(user_id, zoom_meeting_id)
            )
        "#,
        )
        .await?;

        db.execute_unprepared(CREATE_TASKS_TABLE_SQL).await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_tasks_meeting_id ON tasklens.tasks(meeting_id)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_tasks_user_id ON tasklens.tasks(user_id)",
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS tasklens.pipeline_failures (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                meeting_id UUID REFERENCES tasklens.meetings(id) ON DELETE SET NULL,
                run_type tasklens.pipeline_run_type NOT NULL,
                transcript_sample TEXT NOT NULL,
                error_code VARCHAR(50) NOT NULL,
                raw_output TEXT,
                prompt_version VARCHAR(50) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS tasklens.user_integrations (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL REFERENCES tasklens.users(id) ON DELETE CASCADE,

                -- Zoom OAuth (encrypted)
                zoom_access_token TEXT,
                zoom_refresh_token TEXT,
                zoom_token_expiry TIMESTAMPTZ,
                zoom_email VARCHAR(255),

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT user_integrations_user_id_unique UNIQUE(user_id)
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_user_integrations_user_id
             ON tasklens.user_integrations(user_id)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP TABLE IF EXISTS tasklens.user_integrations")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS tasklens.pipeline_failures")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS tasklens.tasks")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS tasklens.zoom_meetings")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS tasklens.meetings")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS tasklens.users")
            .await?;
        db.execute_unprepared("DROP TYPE IF EXISTS tasklens.pipeline_run_type")
            .await?;
        db.execute_unprepared("DROP TYPE IF EXISTS tasklens.task_priority")
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CREATE_TASKS_TABLE_SQL;
    use sea_orm_migration::sea_orm::Iterable;

    #[test]
    fn tasks_table_declares_every_entity_column() {
        for column in entity::tasks::Column::iter() {
            let name = sea_orm_migration::prelude::Iden::to_string(&column);
            assert!(
                CREATE_TASKS_TABLE_SQL.contains(&name),
                "tasks DDL is missing column {name}"
            );
        }
    }
}
