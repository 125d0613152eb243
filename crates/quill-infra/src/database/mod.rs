//! Relational storage: connection pool, SeaORM entities and repository adapters.

mod connections;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod post_repo;
#[cfg(feature = "postgres")]
mod user_repo;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use connections::connect;
#[cfg(feature = "postgres")]
pub use post_repo::PostgresPostRepository;
#[cfg(feature = "postgres")]
pub use user_repo::PostgresUserRepository;

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
