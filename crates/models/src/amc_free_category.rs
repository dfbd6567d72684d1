//! Service categories an AMC customer is entitled to without a fee.
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{service_category, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "amc_free_category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_category_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User, ServiceCategory }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::ServiceCategory => Entity::belongs_to(service_category::Entity)
                .from(Column::ServiceCategoryId)
                .to(service_category::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn category_ids_for_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Vec<Uuid>, crate::errors::ModelError> {
    let rows = Entity::find()
        .filter(Column::UserId.eq(user_id))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.service_category_id).collect())
}

/// Free categories for many users in one query, keyed by user id.
pub async fn category_ids_by_user<C: ConnectionTrait>(
    db: &C,
    user_ids: &[Uuid],
) -> Result<std::collections::HashMap<Uuid, Vec<Uuid>>, crate::errors::ModelError> {
    let mut out: std::collections::HashMap<Uuid, Vec<Uuid>> = std::collections::HashMap::new();
    if user_ids.is_empty() {
        return Ok(out);
    }
    let rows = Entity::find()
        .filter(Column::UserId.is_in(user_ids.iter().copied()))
        .all(db)
        .await?;
    for r in rows {
        out.entry(r.user_id).or_default().push(r.service_category_id);
    }
    Ok(out)
}
