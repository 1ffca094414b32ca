use async_trait::async_trait;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{Operation, UserError, UserResult},
    models::{CreateUser, Pagination, User, UserChanges},
    repository::UserRepository,
};

/// Postgres-backed repository via sea-orm
#[derive(Clone, Debug)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Remove every user. Test harness cleanup only; not exposed over HTTP.
    pub async fn delete_all(&self) -> Result<u64, DbErr> {
        let result = entity::Entity::delete_many().exec(&self.db).await?;
        tracing::debug!(rows = result.rows_affected, "Deleted all users");
        Ok(result.rows_affected)
    }
}

fn classify(op: Operation, err: DbErr) -> UserError {
    let err = UserError::from_db(op, err);
    tracing::error!(error = %err, kind = ?err.kind(), "User repository operation failed");
    err
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[tracing::instrument(skip(self))]
    async fn list_paginated(&self, pagination: Pagination) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::CreatedAt)
            .order_by_asc(entity::Column::Id)
            .limit(pagination.limit)
            .offset(pagination.offset)
            .all(&self.db)
            .await
            .map_err(|e| classify(Operation::Find, e))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn create(&self, input: CreateUser) -> UserResult<User> {
        let active_model = entity::ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| classify(Operation::Create, e))?;

        tracing::info!(user_id = %model.id, "Created user");
        Ok(model.into())
    }

    #[tracing::instrument(skip(self))]
    async fn update_by_id(&self, id: &str, changes: UserChanges) -> UserResult<User> {
        let uuid = Uuid::parse_str(id).map_err(|_| {
            let err = UserError::not_found(Operation::Update, format!("invalid user id '{}'", id));
            tracing::error!(error = %err, "User repository operation failed");
            err
        })?;

        if changes.is_empty() {
            let model = entity::Entity::find_by_id(uuid)
                .one(&self.db)
                .await
                .map_err(|e| classify(Operation::Update, e))?
                .ok_or_else(|| {
                    UserError::not_found(Operation::Update, format!("no user with id {}", uuid))
                })?;
            return Ok(model.into());
        }

        let mut active_model = entity::ActiveModel {
            id: Unchanged(uuid),
            ..Default::default()
        };
        if let Some(name) = changes.name {
            active_model.name = Set(name);
        }
        if let Some(email) = changes.email {
            active_model.email = Set(email);
        }

        // UPDATE ... RETURNING; no matching row surfaces as RecordNotUpdated
        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| classify(Operation::Update, e))?;

        tracing::info!(user_id = %uuid, "Updated user");
        Ok(model.into())
    }
}
