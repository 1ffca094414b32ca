//! Public representation of a user.

use crate::models::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A user as returned by the API; timestamps are not exposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

pub fn serialize_user(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        serialize_user(user)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn user(name: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.map(String::from),
            email: "ada@example.com".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_drops_timestamps() {
        let user = user(Some("Ada"));
        let id = user.id;

        let value = serde_json::to_value(serialize_user(user)).unwrap();
        assert_eq!(
            value,
            json!({ "id": id, "name": "Ada", "email": "ada@example.com" })
        );
    }

    #[test]
    fn test_null_name_is_kept() {
        let value = serde_json::to_value(serialize_user(user(None))).unwrap();
        assert!(value["name"].is_null());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_serializing_twice_is_stable() {
        let user = user(Some("Ada"));
        assert_eq!(serialize_user(user.clone()), serialize_user(user));
    }
}
