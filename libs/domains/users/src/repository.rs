use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Operation, UserError, UserResult};
use crate::models::{CreateUser, Pagination, User, UserChanges};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Page of users ordered by creation time, then id
    async fn list_paginated(&self, pagination: Pagination) -> UserResult<Vec<User>>;

    /// Insert a user; id and timestamps are assigned by the store
    async fn create(&self, input: CreateUser) -> UserResult<User>;

    /// Apply `changes` to the user with `id`.
    ///
    /// Fails with [`UserError::NotFound`] when no user matches, including
    /// when `id` is not a UUID.
    async fn update_by_id(&self, id: &str, changes: UserChanges) -> UserResult<User>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list_paginated(&self, pagination: Pagination) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(result
            .into_iter()
            .skip(usize::try_from(pagination.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(pagination.limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn create(&self, input: CreateUser) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == input.email) {
            return Err(UserError::Conflict {
                op: Operation::Create,
                cause: format!("email '{}' already exists", input.email),
            });
        }

        let now = Utc::now();
        let user = User {
            // v7 ids sort by creation within the process
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn update_by_id(&self, id: &str, changes: UserChanges) -> UserResult<User> {
        let uuid = Uuid::parse_str(id).map_err(|_| {
            UserError::not_found(Operation::Update, format!("invalid user id '{}'", id))
        })?;

        let mut users = self.users.write().await;

        if let Some(email) = &changes.email {
            if users.values().any(|u| u.id != uuid && &u.email == email) {
                return Err(UserError::Conflict {
                    op: Operation::Update,
                    cause: format!("email '{}' already exists", email),
                });
            }
        }

        let user = users.get_mut(&uuid).ok_or_else(|| {
            UserError::not_found(Operation::Update, format!("no user with id {}", uuid))
        })?;

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        user.updated_at = Utc::now();

        tracing::info!(user_id = %uuid, "Updated user");
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn input(email: &str) -> CreateUser {
        CreateUser {
            name: None,
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_keeps_null_name() {
        let repo = InMemoryUserRepository::new();

        let user = repo.create(input("a@b.com")).await.unwrap();
        assert_eq!(user.name, None);
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = InMemoryUserRepository::new();
        repo.create(input("a@b.com")).await.unwrap();

        let err = repo.create(input("a@b.com")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_list_paginates_in_creation_order() {
        let repo = InMemoryUserRepository::new();
        for i in 0..5 {
            repo.create(input(&format!("user{}@b.com", i))).await.unwrap();
        }

        let page = repo
            .list_paginated(Pagination { limit: 2, offset: 1 })
            .await
            .unwrap();
        let emails: Vec<_> = page.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["user1@b.com", "user2@b.com"]);
    }

    #[tokio::test]
    async fn test_offset_past_end_is_empty() {
        let repo = InMemoryUserRepository::new();
        repo.create(input("a@b.com")).await.unwrap();

        let page = repo
            .list_paginated(Pagination { limit: 10, offset: 5 })
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_update_applies_only_given_fields() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(CreateUser {
                name: Some("Ada".into()),
                email: "a@b.com".into(),
            })
            .await
            .unwrap();

        let updated = repo
            .update_by_id(
                &user.id.to_string(),
                UserChanges {
                    name: None,
                    email: Some("new@b.com".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("Ada"));
        assert_eq!(updated.email, "new@b.com");
        assert_eq!(updated.id, user.id);
    }

    #[tokio::test]
    async fn test_update_can_clear_name() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(CreateUser {
                name: Some("Ada".into()),
                email: "a@b.com".into(),
            })
            .await
            .unwrap();

        let updated = repo
            .update_by_id(
                &user.id.to_string(),
                UserChanges {
                    name: Some(None),
                    email: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, None);
    }

    #[tokio::test]
    async fn test_update_missing_or_malformed_id_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let changes = UserChanges {
            name: Some(Some("x".into())),
            email: None,
        };

        let err = repo
            .update_by_id(&Uuid::new_v4().to_string(), changes.clone())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = repo.update_by_id("not-a-uuid", changes).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().starts_with("Could not update user"));
    }
}
