use serde_json::json;
use todolist::application::error::TodoError;
use todolist::application::todo_service::{TodoService, TodoServiceImpl};
use todolist::domain::todo::{Todo, TodoDraft};
use todolist::domain::validation::ValidationError;
use todolist::infrastructure::open_store;

fn draft(value: serde_json::Value) -> TodoDraft { serde_json::from_value(value).unwrap() }

#[tokio::test]
async fn acceptance_add_list_update_on_sqlite() {
    // use in-memory sqlite for tests
    let service = TodoServiceImpl::new(open_store("sqlite::memory:").await.unwrap());

    assert!(service.get_all().await.unwrap().is_empty());

    let added = service.add(draft(json!({ "todo": "buy milk", "complete": false }))).await.unwrap();
    assert!(!added.id.is_empty());
    assert_eq!(service.get_all().await.unwrap(), vec![Todo { id: added.id.clone(), todo: "buy milk".into(), complete: false }]);

    service.update(draft(json!({ "todo": "buy milk", "complete": true, "id": added.id.as_str() }))).await.unwrap();
    assert_eq!(service.get_all().await.unwrap(), vec![Todo { id: added.id, todo: "buy milk".into(), complete: true }]);
}

#[tokio::test]
async fn acceptance_file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("file://{}", dir.path().join("z-todo.json").display());

    let first = {
        let service = TodoServiceImpl::new(open_store(&url).await.unwrap());
        let first = service.add(TodoDraft::new("buy milk", false)).await.unwrap();
        service.add(TodoDraft::new("walk dog", false)).await.unwrap();
        first
    };

    let service = TodoServiceImpl::new(open_store(&url).await.unwrap());
    let all = service.get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], first);

    let err = service
        .override_all(vec![first.clone().into(), TodoDraft::new("stranger", true).with_id("unknown")])
        .await
        .unwrap_err();
    assert!(matches!(err, TodoError::Validation(ValidationError::Id)));
    assert_eq!(service.get_all().await.unwrap(), all);

    let kept = service.override_all(vec![first.clone().into()]).await.unwrap();
    assert_eq!(kept, vec![first]);

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(dir.path().join("z-todo.json")).unwrap()).unwrap();
    assert_eq!(raw["todos"].as_array().map(Vec::len), Some(1));
}
