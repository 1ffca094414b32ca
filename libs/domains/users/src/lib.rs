//! Users Domain
//!
//! Paginated listing, creation and partial update of users.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, auth layers, validation extractors
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory and Postgres implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entity, DTOs, request bodies, serializer
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_users::{handlers, PgUserRepository};
//!
//! let repository = PgUserRepository::new(db);
//! let router = handlers::router(repository, verifier);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod serializer;

// Re-export commonly used types
pub use error::{ApiError, ErrorBody, ErrorKind, Operation, UserError, UserResult};
pub use models::{
    CreateUser, CreateUserBody, Pagination, PaginationQuery, UpdateUserBody, User, UserChanges,
    UserIdPath,
};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use serializer::{UserEnvelope, UserResponse, UsersResponse, serialize_user};
