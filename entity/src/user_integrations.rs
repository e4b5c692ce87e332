//! SeaORM Entity for the user_integrations table.
//! Stores per-user Zoom OAuth credentials used to download cloud recordings.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::user_integrations::Model)]
#[sea_orm(schema_name = "tasklens", table_name = "user_integrations")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String, format = Uuid)]
    pub id: Id,

    #[schema(value_type = String, format = Uuid)]
    pub user_id: Id,

    // Zoom OAuth (encrypted in database)
    #[serde(skip)]
    pub zoom_access_token: Option<String>,
    #[serde(skip)]
    pub zoom_refresh_token: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub zoom_token_expiry: Option<DateTimeWithTimeZone>,
    pub zoom_email: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True when there is a usable (present and unexpired) Zoom access token.
    pub fn zoom_token_usable(&self, now: DateTimeWithTimeZone) -> bool {
        match (&self.zoom_access_token, &self.zoom_token_expiry) {
            (Some(_), Some(expiry)) => *expiry > now,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn integration(token: Option<&str>, expiry: Option<DateTimeWithTimeZone>) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            zoom_access_token: token.map(String::from),
            zoom_refresh_token: None,
            zoom_token_expiry: expiry,
            zoom_email: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn token_with_future_expiry_is_usable() {
        let expiry = (Utc::now() + Duration::hours(1)).into();
        let model = integration(Some("tok"), Some(expiry));
        assert!(model.zoom_token_usable(Utc::now().into()));
    }

    #[test]
    fn expired_or_missing_token_is_not_usable() {
        let expiry = (Utc::now() - Duration::minutes(5)).into();
        assert!(!integration(Some("tok"), Some(expiry)).zoom_token_usable(Utc::now().into()));
        assert!(!integration(None, None).zoom_token_usable(Utc::now().into()));
    }
}
