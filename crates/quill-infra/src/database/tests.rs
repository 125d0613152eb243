use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, MockDatabase, MockExecResult, PaginatorTrait, QueryFilter,
};
use tempfile::TempDir;

use quill_core::domain::{Post, User};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

use crate::database::entity::{comment, post, user};
use crate::database::post_repo::PostgresPostRepository;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
}

fn user_row(id: i64, name: &str) -> user::Model {
    user::Model {
        id,
        name: name.to_owned(),
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: "hash".to_owned(),
        created_at: at(0).into(),
        updated_at: at(0).into(),
    }
}

fn post_row(id: i64, user_id: i64, title: &str, created: DateTime<Utc>) -> post::Model {
    post::Model {
        id,
        user_id,
        title: title.to_owned(),
        body: "Test Body".to_owned(),
        created_at: created.into(),
        updated_at: created.into(),
        deleted_at: None,
    }
}

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

/// Everything the mock connection saw, as one searchable string.
fn statement_log(db: Arc<DatabaseConnection>) -> String {
    let db = Arc::try_unwrap(db).unwrap_or_else(|_| panic!("mock connection is still shared"));
    format!("{:?}", db.into_transaction_log())
}

#[tokio::test]
async fn get_all_returns_posts_with_owners_newest_first() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            (post_row(2, 1, "Newer", at(10)), user_row(1, "User1")),
            (post_row(1, 2, "Older", at(9)), user_row(2, "User2")),
        ]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let posts = repo.get_all(10, 0).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "Newer");
    assert_eq!(posts[0].user.name, "User1");
    assert_eq!(posts[1].user.id, 2);
    assert!(posts.iter().all(|p| p.user.id != 0));

    let log = statement_log(repo.db);
    assert!(log.contains("LEFT JOIN"), "owner must be joined: {log}");
    assert!(log.contains("IS NULL"), "soft-deleted rows must be filtered: {log}");
    assert!(log.contains("ORDER BY") && log.contains("DESC"), "{log}");
    assert!(log.contains("LIMIT") && log.contains("OFFSET"), "{log}");
    assert_eq!(log.matches("SELECT").count(), 1, "one round trip: {log}");
}

#[tokio::test]
async fn get_all_on_empty_table_is_empty_not_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<(post::Model, user::Model)>::new()])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let posts = repo.get_all(20, 40).await.unwrap();

    assert!(posts.is_empty());
}

#[tokio::test]
async fn get_by_id_returns_post_with_owner() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![(
            post_row(1, 1, "Test Post", at(8)),
            user_row(1, "User1"),
        )]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let post = repo.get_by_id(1).await.unwrap();

    assert_eq!(post.id, 1);
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.user.name, "User1");
}

#[tokio::test]
async fn get_by_id_miss_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<(post::Model, user::Model)>::new()])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let err = repo.get_by_id(404).await.unwrap_err();

    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn get_by_id_query_failure_is_storage_failure() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset".to_owned())])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let err = repo.get_by_id(1).await.unwrap_err();

    assert!(matches!(
        err,
        RepoError::Storage {
            context: "failed to fetch post",
            ..
        }
    ));
}

#[tokio::test]
async fn create_re_reads_owner_instead_of_echoing_it() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_row(1, 1, "Test Post", at(8))]])
        .append_query_results([vec![user_row(1, "User1")]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let stale_author = User::from(user_row(1, "Old Name"));
    let mut draft = Post::new("Test Post".to_owned(), "Test Body".to_owned(), stale_author);
    draft.id = 777;

    let created = repo.create(&draft).await.unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.title, "Test Post");
    assert_eq!(created.body, "Test Body");
    assert_eq!(created.user.id, 1);
    assert_eq!(created.user.name, "User1");
}

#[tokio::test]
async fn create_with_missing_owner_is_storage_failure() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_row(1, 5, "Test Post", at(8))]])
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let repo = PostgresPostRepository::new(db);
    let author = User::from(user_row(5, "Ghost"));

    let err = repo
        .create(&Post::new("Test Post".to_owned(), String::new(), author))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::Storage {
            context: "failed to fetch post owner",
            ..
        }
    ));
}

#[tokio::test]
async fn update_of_missing_row_is_silent() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(0)])
        .into_connection();
    let repo = PostgresPostRepository::new(db);
    let mut post = Post::new("Edited".to_owned(), "Body".to_owned(), user_row(1, "User1").into());
    post.id = 42;

    let updated = repo.update(&post).await.unwrap();

    assert_eq!(updated, post);
    let log = statement_log(repo.db);
    assert!(log.contains("UPDATE"), "{log}");
    assert!(!log.contains("SELECT"), "update must not pre-check existence: {log}");
}

#[tokio::test]
async fn delete_removes_comments_then_post_and_commits() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(3), exec(1)])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    repo.delete(1).await.unwrap();

    let log = statement_log(repo.db);
    assert!(log.contains("BEGIN"), "{log}");
    assert!(log.contains("COMMIT"), "{log}");
    assert!(!log.contains("ROLLBACK"), "{log}");
    let comments_at = log
        .find("DELETE FROM \\\"comments\\\"")
        .expect("comments deleted");
    let posts_at = log
        .find("DELETE FROM \\\"posts\\\"")
        .expect("post deleted");
    assert!(comments_at < posts_at, "children must go first: {log}");
}

#[tokio::test]
async fn delete_of_missing_post_is_a_successful_no_op() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(0), exec(0)])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    repo.delete(999).await.unwrap();

    assert!(statement_log(repo.db).contains("COMMIT"));
}

#[tokio::test]
async fn delete_failing_on_comments_rolls_back_without_touching_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_errors([DbErr::Custom("lock timeout".to_owned())])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let err = repo.delete(1).await.unwrap_err();

    assert!(matches!(
        err,
        RepoError::Storage {
            context: "failed to delete comments",
            ..
        }
    ));
    let log = statement_log(repo.db);
    assert!(log.contains("ROLLBACK"), "{log}");
    assert!(!log.contains("COMMIT"), "{log}");
    assert_eq!(log.matches("DELETE FROM").count(), 1, "{log}");
}

#[tokio::test]
async fn delete_failing_on_post_rolls_back_comment_removal() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(2)])
        .append_exec_errors([DbErr::Custom("serialization failure".to_owned())])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let err = repo.delete(1).await.unwrap_err();

    assert!(matches!(
        err,
        RepoError::Storage {
            context: "failed to delete post",
            ..
        }
    ));
    let log = statement_log(repo.db);
    assert!(log.contains("ROLLBACK"), "{log}");
    assert!(!log.contains("COMMIT"), "{log}");
}

// The cases below run the adapter against a real SQLite file so that a failed
// delete can be checked by reading the tables back from a second connection.

const SQLITE_SCHEMA: [&str; 2] = [
    "CREATE TABLE posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )",
    "CREATE TABLE comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        post_id INTEGER NOT NULL REFERENCES posts (id),
        user_id INTEGER NOT NULL,
        body TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
];

/// Post 1 with three comments, post 2 with one, then any `extra` statements.
async fn seeded_sqlite(extra: &[&str]) -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("quill.db").display());
    let db = Database::connect(url.as_str()).await.unwrap();

    let now = "2024-05-01T09:00:00+00:00";
    let mut statements: Vec<String> = SQLITE_SCHEMA.iter().map(|s| s.to_string()).collect();
    for post_id in [1, 2] {
        statements.push(format!(
            "INSERT INTO posts (id, user_id, title, body, created_at, updated_at) \
             VALUES ({post_id}, 1, 'Post {post_id}', 'Body', '{now}', '{now}')"
        ));
    }
    for post_id in [1, 1, 1, 2] {
        statements.push(format!(
            "INSERT INTO comments (post_id, user_id, body, created_at, updated_at) \
             VALUES ({post_id}, 1, 'Comment', '{now}', '{now}')"
        ));
    }
    statements.extend(extra.iter().map(|s| s.to_string()));

    for sql in &statements {
        db.execute_unprepared(sql).await.unwrap();
    }
    db.close().await.unwrap();

    (dir, url)
}

/// (comments on post 1, comments on post 2, posts), read on a fresh connection.
async fn sqlite_counts(url: &str) -> (u64, u64, u64) {
    let db = Database::connect(url).await.unwrap();
    let comments_on = |post_id: i64| {
        comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(&db)
    };

    let first = comments_on(1).await.unwrap();
    let second = comments_on(2).await.unwrap();
    let posts = post::Entity::find().count(&db).await.unwrap();
    (first, second, posts)
}

async fn sqlite_repo(url: &str) -> PostgresPostRepository {
    PostgresPostRepository::new(Database::connect(url).await.unwrap())
}

#[tokio::test]
async fn sqlite_delete_removes_only_that_posts_comments() {
    let (_dir, url) = seeded_sqlite(&[]).await;

    sqlite_repo(&url).await.delete(1).await.unwrap();

    assert_eq!(sqlite_counts(&url).await, (0, 1, 1));
}

#[tokio::test]
async fn sqlite_failed_post_delete_keeps_comments_and_post() {
    let (_dir, url) = seeded_sqlite(&["CREATE TRIGGER posts_locked BEFORE DELETE ON posts
         BEGIN
             SELECT RAISE(ABORT, 'post is locked');
         END"])
    .await;

    let err = sqlite_repo(&url).await.delete(1).await.unwrap_err();

    assert!(
        matches!(
            err,
            RepoError::Storage {
                context: "failed to delete post",
                ..
            }
        ),
        "{err}"
    );
    assert_eq!(sqlite_counts(&url).await, (3, 1, 2));
}

#[tokio::test]
async fn sqlite_failed_commit_keeps_comments_and_post() {
    // The pin is only checked at COMMIT, after both deletes have succeeded.
    let (_dir, url) = seeded_sqlite(&[
        "CREATE TABLE post_pins (
            post_id INTEGER NOT NULL REFERENCES posts (id) DEFERRABLE INITIALLY DEFERRED
        )",
        "INSERT INTO post_pins (post_id) VALUES (1)",
    ])
    .await;

    let repo = sqlite_repo(&url).await;
    let err = repo.delete(1).await.unwrap_err();

    assert!(
        matches!(
            err,
            RepoError::Storage {
                context: "failed to commit transaction",
                ..
            }
        ),
        "{err}"
    );
    assert_eq!(sqlite_counts(&url).await, (3, 1, 2));
}
