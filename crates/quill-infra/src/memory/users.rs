use async_trait::async_trait;

use quill_core::domain::User;
use quill_core::error::RepoError;
use quill_core::ports::UserRepository;

use super::InMemoryStore;

/// In-memory implementation of `UserRepository`.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    store: InMemoryStore,
}

impl InMemoryUserRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: i64) -> Result<User, RepoError> {
        let tables = self.store.tables.read().await;
        tables.users.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &User) -> Result<User, RepoError> {
        let mut tables = self.store.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepoError::storage(
                "failed to insert user",
                "duplicate key value violates unique constraint on email",
            ));
        }

        tables.last_user_id += 1;
        let mut saved = user.clone();
        saved.id = tables.last_user_id;
        tables.users.insert(saved.id, saved.clone());

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new("Jane".to_string(), email.to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let repo = InMemoryStore::new().users();

        let first = repo.create(&user("a@example.com")).await.unwrap();
        let second = repo.create(&user("b@example.com")).await.unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(repo.get_by_id(2).await.unwrap().email, "b@example.com");
    }

    #[tokio::test]
    async fn lookups_miss_cleanly() {
        let repo = InMemoryStore::new().users();

        assert!(matches!(repo.get_by_id(1).await, Err(RepoError::NotFound)));
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryStore::new().users();
        repo.create(&user("a@example.com")).await.unwrap();

        let err = repo.create(&user("a@example.com")).await.unwrap_err();

        assert!(matches!(err, RepoError::Storage { .. }));
    }
}
