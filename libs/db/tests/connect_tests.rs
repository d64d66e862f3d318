use db::{errors, ConnectOpts, DbEngine, DbHandle};
use sea_orm::{ConnectionTrait, Statement};

#[tokio::test]
async fn memory_database_keeps_state_across_statements() {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("connect");
    assert_eq!(db.engine(), DbEngine::Sqlite);

    let conn = db.sea();
    let backend = conn.get_database_backend();
    conn.execute(Statement::from_string(
        backend,
        "CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT NOT NULL UNIQUE)",
    ))
    .await
    .expect("create");
    conn.execute(Statement::from_string(backend, "INSERT INTO t (v) VALUES ('a')"))
        .await
        .expect("insert");

    // A second pooled handle must see the same in-memory database.
    let again = db.sea();
    let err = again
        .execute(Statement::from_string(backend, "INSERT INTO t (v) VALUES ('a')"))
        .await
        .expect_err("duplicate must fail");
    let msg = errors::unique_violation_message(&err).expect("unique violation");
    assert!(errors::violation_mentions(&msg, "t.v"));

    db.close().await.expect("close");
}

#[tokio::test]
async fn file_database_creates_parent_dirs() {
    let tmp = tempfile::tempdir().unwrap();
    let dsn = db::absolutize_sqlite_dsn("sqlite://nested/dir/app.db", tmp.path(), false).unwrap();

    let db = DbHandle::connect(&dsn, ConnectOpts::default())
        .await
        .expect("connect file db");
    assert!(tmp.path().join("nested/dir").exists());
    assert_eq!(db.dsn(), dsn);
    db.close().await.expect("close");
}
