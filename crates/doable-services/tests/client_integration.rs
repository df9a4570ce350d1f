//! Integration tests for TaskServiceClient using wiremock.
//!
//! These tests verify the client behavior against a mock HTTP server.

use doable_services::{CreateTaskRequest, RemoteServiceError, TaskServiceClient, UpdateTaskRequest};
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a wire task
fn api_task(id: &str, content: &str, project_id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "content": content,
        "description": "",
        "project_id": project_id,
        "due": {
            "date": "2024-01-01",
            "string": "Jan 1",
            "is_recurring": false
        },
        "priority": 1,
        "labels": [],
        "created_at": "2023-12-30T10:00:00.000000Z",
        "is_completed": false
    })
}

fn client_for(server: &MockServer) -> TaskServiceClient {
    TaskServiceClient::new(&server.uri(), "test-token").unwrap()
}

#[tokio::test]
async fn test_list_projects_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "1", "name": "Inbox", "is_inbox_project": true, "color": "grey"},
            {"id": "2", "name": "Work", "is_inbox_project": false, "color": "blue"}
        ])))
        .mount(&mock_server)
        .await;

    let projects = client_for(&mock_server).list_projects().await.unwrap();

    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].name, "Inbox");
    assert_eq!(projects[1].id, "2");
}

#[tokio::test]
async fn test_bearer_token_included() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).list_projects().await;

    // If the header wasn't present, the mock wouldn't match and we'd get a 404
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_project_sends_name_and_request_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects"))
        .and(body_json(serde_json::json!({"name": "Garden"})))
        .and(header_exists("X-Request-Id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "99", "name": "Garden", "color": "green"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let project = client_for(&mock_server).create_project("Garden").await.unwrap();

    assert_eq!(project.id, "99");
    assert_eq!(project.name, "Garden");
}

#[tokio::test]
async fn test_delete_project_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/projects/99"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).delete_project("99").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_list_all_tasks_normalizes_datetime() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            api_task("t1", "Buy milk", "1"),
            {
                "id": "t2",
                "content": "Call mom",
                "project_id": "2",
                "due": {
                    "date": "2024-01-02",
                    "datetime": "2024-01-02T18:00:00Z",
                    "string": "jan 2 6pm",
                    "is_recurring": false
                },
                "priority": 4,
                "created_at": "2023-12-31T10:00:00.000000Z"
            }
        ])))
        .mount(&mock_server)
        .await;

    let tasks = client_for(&mock_server).list_tasks(None).await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].due.as_ref().unwrap().datetime, "");
    assert_eq!(tasks[1].due.as_ref().unwrap().datetime, "2024-01-02T18:00:00Z");
    assert_eq!(tasks[1].priority, 4);
    assert!(tasks[1].labels.is_empty());
}

#[tokio::test]
async fn test_list_tasks_by_project_uses_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("project_id", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([api_task("t9", "Ship it", "2")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let tasks = client_for(&mock_server).list_tasks(Some("2")).await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].project_id, "2");
}

#[tokio::test]
async fn test_create_task_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_json(serde_json::json!({
            "content": "Buy milk",
            "project_id": "1",
            "due_date": "2024-01-01",
            "priority": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(api_task("new-id", "Buy milk", "1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let task = client_for(&mock_server)
        .create_task(&CreateTaskRequest {
            content: "Buy milk".to_string(),
            project_id: "1".to_string(),
            description: None,
            due_date: Some("2024-01-01".to_string()),
            priority: Some(2),
            labels: Vec::new(),
        })
        .await
        .unwrap();

    assert_eq!(task.id, "new-id");
    assert!(!task.completed);
}

#[tokio::test]
async fn test_update_task_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(api_task("t1", "Buy oat milk", "1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let task = client_for(&mock_server)
        .update_task(
            "t1",
            &UpdateTaskRequest {
                content: Some("Buy oat milk".to_string()),
                ..UpdateTaskRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(task.content, "Buy oat milk");
}

#[tokio::test]
async fn test_close_task_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/t1/close"))
        .and(header_exists("X-Request-Id"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert!(client_for(&mock_server).close_task("t1").await.is_ok());
}

#[tokio::test]
async fn test_delete_task_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert!(client_for(&mock_server).delete_task("t1").await.is_ok());
}

#[tokio::test]
async fn test_list_labels_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "l1", "name": "errand", "color": "red", "order": 1, "is_favorite": false}
        ])))
        .mount(&mock_server)
        .await;

    let labels = client_for(&mock_server).list_labels().await.unwrap();

    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].name, "errand");
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).list_tasks(None).await;

    match result {
        Err(RemoteServiceError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/tasks/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Task not found"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .delete_task("missing")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("404"), "Error should mention 404 status: {}", err);
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).list_projects().await;
    assert!(matches!(result, Err(RemoteServiceError::Decode(_))));
}
