//! Data-access layer tests: ownership, cascade, conflict, and timestamp rules.

use std::time::Duration;

use quadra_db::{DbError, LabelPatch, NewLabel, NewTask, Patch, QuadraDb, TaskPatch};
use tempfile::TempDir;

async fn open_db(tmp: &TempDir) -> QuadraDb {
    QuadraDb::open(tmp.path().join("store.db")).await.unwrap()
}

async fn count(db: &QuadraDb, sql: &str) -> i64 {
    sqlx::query_scalar(sql).fetch_one(db.pool()).await.unwrap()
}

fn new_label(name: &str) -> NewLabel {
    NewLabel {
        name: name.to_string(),
        color: None,
    }
}

fn new_task(title: &str, label_ids: Vec<i64>) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        quadrant: "urgent_important".to_string(),
        label_ids,
    }
}

#[tokio::test]
async fn test_matrix_cascade_delete_leaves_no_orphans() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await;

    let matrix = db.create_matrix().await.unwrap();
    let work = db.create_label(&matrix.id, new_label("Work")).await.unwrap();
    let home = db.create_label(&matrix.id, new_label("Home")).await.unwrap();
    db.create_task(&matrix.id, new_task("a", vec![work.id, home.id]))
        .await
        .unwrap();
    db.create_task(&matrix.id, new_task("b", vec![home.id]))
        .await
        .unwrap();

    // A second matrix that must survive the delete untouched
    let other = db.create_matrix().await.unwrap();
    let other_label = db.create_label(&other.id, new_label("Keep")).await.unwrap();
    db.create_task(&other.id, new_task("keep", vec![other_label.id]))
        .await
        .unwrap();

    db.delete_matrix(&matrix.id).await.unwrap();

    let err = db.get_matrix(&matrix.id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));

    assert_eq!(count(&db, "SELECT COUNT(*) FROM matrices").await, 1);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM labels").await, 1);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM tasks").await, 1);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM task_labels").await, 1);

    // Deleting again reports NotFound
    let err = db.delete_matrix(&matrix.id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));

    db.close().await;
}

#[tokio::test]
async fn test_duplicate_label_name_conflicts_within_matrix_only() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await;

    let first = db.create_matrix().await.unwrap();
    let second = db.create_matrix().await.unwrap();

    db.create_label(&first.id, new_label("Work")).await.unwrap();

    let err = db.create_label(&first.id, new_label("Work")).await.unwrap_err();
    match err {
        DbError::Conflict(msg) => assert!(msg.contains("Work")),
        other => panic!("expected Conflict, got {:?}", other),
    }

    // Same name under a different matrix is fine
    db.create_label(&second.id, new_label("Work")).await.unwrap();

    // Names are case-sensitive: a different casing is a different label
    db.create_label(&first.id, new_label("work")).await.unwrap();

    db.close().await;
}

#[tokio::test]
async fn test_update_label_rename_and_conflict() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await;

    let matrix = db.create_matrix().await.unwrap();
    let work = db.create_label(&matrix.id, new_label("Work")).await.unwrap();
    let home = db.create_label(&matrix.id, new_label("Home")).await.unwrap();

    // Renaming onto another label's name conflicts
    let err = db
        .update_label(
            &matrix.id,
            home.id,
            LabelPatch {
                name: Some("Work".to_string()),
                color: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));

    // Re-submitting a label's own name is not a conflict
    let unchanged = db
        .update_label(
            &matrix.id,
            work.id,
            LabelPatch {
                name: Some("Work".to_string()),
                color: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(unchanged.name, "Work");

    // Partial update: color only, name untouched
    let recolored = db
        .update_label(
            &matrix.id,
            work.id,
            LabelPatch {
                name: None,
                color: Some("#00FF00".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(recolored.name, "Work");
    assert_eq!(recolored.color.as_deref(), Some("#00FF00"));

    let err = db
        .update_label(&matrix.id, 9999, LabelPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));

    db.close().await;
}

#[tokio::test]
async fn test_child_mutations_advance_matrix_updated_at() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await;

    let matrix = db.create_matrix().await.unwrap();

    let mut last = db.get_matrix(&matrix.id).await.unwrap().updated_at;
    let mut expect_advanced = |updated_at: chrono::DateTime<chrono::Utc>| {
        assert!(updated_at > last, "expected {} > {}", updated_at, last);
        last = updated_at;
    };

    // Timestamps have millisecond resolution; space the mutations out
    tokio::time::sleep(Duration::from_millis(10)).await;
    let label = db.create_label(&matrix.id, new_label("Work")).await.unwrap();
    expect_advanced(db.get_matrix(&matrix.id).await.unwrap().updated_at);

    tokio::time::sleep(Duration::from_millis(10)).await;
    db.update_label(
        &matrix.id,
        label.id,
        LabelPatch {
            name: None,
            color: Some("#FF0000".to_string()),
        },
    )
    .await
    .unwrap();
    expect_advanced(db.get_matrix(&matrix.id).await.unwrap().updated_at);

    tokio::time::sleep(Duration::from_millis(10)).await;
    let task = db
        .create_task(&matrix.id, new_task("Write report", vec![label.id]))
        .await
        .unwrap();
    expect_advanced(db.get_matrix(&matrix.id).await.unwrap().updated_at);

    tokio::time::sleep(Duration::from_millis(10)).await;
    db.update_task(
        &matrix.id,
        task.id,
        TaskPatch {
            title: Some("Write the report".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    expect_advanced(db.get_matrix(&matrix.id).await.unwrap().updated_at);

    tokio::time::sleep(Duration::from_millis(10)).await;
    db.delete_task(&matrix.id, task.id).await.unwrap();
    expect_advanced(db.get_matrix(&matrix.id).await.unwrap().updated_at);

    tokio::time::sleep(Duration::from_millis(10)).await;
    db.delete_label(&matrix.id, label.id).await.unwrap();
    expect_advanced(db.get_matrix(&matrix.id).await.unwrap().updated_at);

    db.close().await;
}

#[tokio::test]
async fn test_create_task_with_invalid_label_persists_nothing() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await;

    let matrix = db.create_matrix().await.unwrap();
    let label = db.create_label(&matrix.id, new_label("Work")).await.unwrap();
    let before = db.get_matrix(&matrix.id).await.unwrap().updated_at;

    tokio::time::sleep(Duration::from_millis(10)).await;
    let err = db
        .create_task(&matrix.id, new_task("bad", vec![label.id, 9999]))
        .await
        .unwrap_err();
    match err {
        DbError::NotFound(msg) => assert!(msg.contains("9999")),
        other => panic!("expected NotFound, got {:?}", other),
    }

    // Neither the task nor the valid association survived
    assert!(db.list_tasks(&matrix.id).await.unwrap().is_empty());
    assert_eq!(count(&db, "SELECT COUNT(*) FROM task_labels").await, 0);

    // The touch rolled back with everything else
    let after = db.get_matrix(&matrix.id).await.unwrap().updated_at;
    assert_eq!(before, after);

    db.close().await;
}

#[tokio::test]
async fn test_create_task_deduplicates_label_ids() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await;

    let matrix = db.create_matrix().await.unwrap();
    let label = db.create_label(&matrix.id, new_label("Work")).await.unwrap();

    let task = db
        .create_task(&matrix.id, new_task("t", vec![label.id, label.id]))
        .await
        .unwrap();
    assert_eq!(task.labels.len(), 1);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM task_labels").await, 1);

    db.close().await;
}

#[tokio::test]
async fn test_task_labels_are_matrix_scoped() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await;

    let first = db.create_matrix().await.unwrap();
    let second = db.create_matrix().await.unwrap();
    let foreign = db.create_label(&second.id, new_label("Work")).await.unwrap();

    // A label from another matrix does not resolve
    let err = db
        .create_task(&first.id, new_task("t", vec![foreign.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));

    db.close().await;
}

#[tokio::test]
async fn test_update_task_label_ids_tristate() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await;

    let matrix = db.create_matrix().await.unwrap();
    let work = db.create_label(&matrix.id, new_label("Work")).await.unwrap();
    let home = db.create_label(&matrix.id, new_label("Home")).await.unwrap();
    let task = db
        .create_task(&matrix.id, new_task("t", vec![work.id]))
        .await
        .unwrap();

    // Absent: associations untouched, scalars still update
    let updated = db
        .update_task(
            &matrix.id,
            task.id,
            TaskPatch {
                title: Some("renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "renamed");
    assert_eq!(updated.labels.len(), 1);
    assert_eq!(updated.labels[0].id, work.id);

    // Value: replaces the whole set
    let updated = db
        .update_task(
            &matrix.id,
            task.id,
            TaskPatch {
                label_ids: Patch::Value(vec![work.id, home.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.labels.len(), 2);

    // Empty list: clears
    let updated = db
        .update_task(
            &matrix.id,
            task.id,
            TaskPatch {
                label_ids: Patch::Value(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.labels.is_empty());

    // Null: also clears
    db.update_task(
        &matrix.id,
        task.id,
        TaskPatch {
            label_ids: Patch::Value(vec![work.id]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let updated = db
        .update_task(
            &matrix.id,
            task.id,
            TaskPatch {
                label_ids: Patch::Null,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.labels.is_empty());

    db.close().await;
}

#[tokio::test]
async fn test_update_task_invalid_label_rolls_back_clear() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await;

    let matrix = db.create_matrix().await.unwrap();
    let work = db.create_label(&matrix.id, new_label("Work")).await.unwrap();
    let task = db
        .create_task(&matrix.id, new_task("t", vec![work.id]))
        .await
        .unwrap();

    let err = db
        .update_task(
            &matrix.id,
            task.id,
            TaskPatch {
                title: Some("should not stick".to_string()),
                label_ids: Patch::Value(vec![9999]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));

    // The clear and the title change were both rolled back
    let tasks = db.list_tasks(&matrix.id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "t");
    assert_eq!(tasks[0].labels.len(), 1);
    assert_eq!(tasks[0].labels[0].id, work.id);

    db.close().await;
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await;

    // Create matrix
    let matrix = db.create_matrix().await.unwrap();

    // Create Label(name="Work", color="#FF0000")
    let work = db
        .create_label(
            &matrix.id,
            NewLabel {
                name: "Work".to_string(),
                color: Some("#FF0000".to_string()),
            },
        )
        .await
        .unwrap();

    // Creating Label(name="Work") again conflicts
    let err = db.create_label(&matrix.id, new_label("Work")).await.unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));

    // Create Task with the label attached; the result resolves label objects
    let task = db
        .create_task(&matrix.id, new_task("Write report", vec![work.id]))
        .await
        .unwrap();
    assert_eq!(task.labels.len(), 1);
    assert_eq!(task.labels[0].id, work.id);
    assert_eq!(task.labels[0].name, "Work");
    assert_eq!(task.labels[0].color.as_deref(), Some("#FF0000"));

    // Delete the label; the task loses the association silently
    db.delete_label(&matrix.id, work.id).await.unwrap();
    let tasks = db.list_tasks(&matrix.id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].labels.is_empty());

    // Delete the matrix; it is gone
    db.delete_matrix(&matrix.id).await.unwrap();
    let err = db.get_matrix(&matrix.id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));

    db.close().await;
}
