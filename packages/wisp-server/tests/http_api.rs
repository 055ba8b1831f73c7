//! End-to-end tests against a real listener.

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;
use wisp_server::{router, AppState, ServerConfig};

/// Start a server on an ephemeral port and return its base URL and state.
async fn spawn_server(config: ServerConfig) -> (String, AppState) {
    let state = AppState::new(config);
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

fn file_form(name: &str, data: Vec<u8>) -> Form {
    Form::new().part("file", Part::bytes(data).file_name(name.to_string()))
}

#[tokio::test]
async fn test_file_round_trip_is_single_use() {
    let (base, state) = spawn_server(ServerConfig::default()).await;
    let client = reqwest::Client::new();

    let payload = b"the eagle has landed".to_vec();
    let resp = client
        .post(format!("{base}/api/files/upload"))
        .multipart(file_form("note.txt", payload.clone()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "File uploaded successfully");
    assert_eq!(body["expiresInMinutes"], 60);
    let id = body["fileId"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 3);

    let status = client
        .get(format!("{base}/api/files/status"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(status, "Server running - 1 files in memory");

    let check: Value = client
        .get(format!("{base}/api/files/check/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(check["success"], true);
    assert_eq!(check["fileId"], id.as_str());

    let resp = client
        .get(format!("{base}/api/files/download/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=\"note.txt\""
    );
    assert_eq!(resp.headers()["content-type"], "application/octet-stream");
    assert_eq!(resp.bytes().await.unwrap().to_vec(), payload);

    let resp = client
        .get(format!("{base}/api/files/download/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let check: Value = client
        .get(format!("{base}/api/files/check/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(check["success"], false);
    assert_eq!(check["message"], "File not found or expired");

    assert_eq!(state.files.count(), 0);
}

#[tokio::test]
async fn test_upload_validation() {
    let config = ServerConfig {
        max_upload_bytes: 1024 * 1024,
        ..ServerConfig::default()
    };
    let (base, state) = spawn_server(config).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/files/upload"))
        .multipart(file_form("empty.bin", Vec::new()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "File is empty");

    let resp = client
        .post(format!("{base}/api/files/upload"))
        .multipart(file_form("big.bin", vec![7u8; 1024 * 1024 + 1]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "File too large (max 1MB)");

    // No `file` field at all
    let resp = client
        .post(format!("{base}/api/files/upload"))
        .multipart(Form::new().text("other", "value"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(state.files.count(), 0);
}

#[tokio::test]
async fn test_upload_at_default_limit() {
    let (base, _) = spawn_server(ServerConfig::default()).await;
    let client = reqwest::Client::new();

    // Above axum's 2 MB default body limit but within the upload limit
    let payload = vec![0xA5u8; 3 * 1024 * 1024];
    let resp = client
        .post(format!("{base}/api/files/upload"))
        .multipart(file_form("big.bin", payload.clone()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let id = body["fileId"].as_str().unwrap().to_string();

    let bytes = client
        .get(format!("{base}/api/files/download/{id}"))
        .send()
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(bytes.len(), payload.len());
    assert!(bytes.iter().all(|b| *b == 0xA5));
}

#[tokio::test]
async fn test_clear_files() {
    let (base, state) = spawn_server(ServerConfig::default()).await;
    let client = reqwest::Client::new();

    for name in ["a.txt", "b.txt", "c.txt"] {
        let resp = client
            .post(format!("{base}/api/files/upload"))
            .multipart(file_form(name, name.as_bytes().to_vec()))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert_eq!(state.files.count(), 3);

    let body: Value = client
        .post(format!("{base}/api/files/clear"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "All files cleared from memory");
    assert_eq!(state.files.count(), 0);
}

#[tokio::test]
async fn test_message_flow() {
    let (base, _) = spawn_server(ServerConfig::default()).await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for (content, sender) in [("first", "alice"), ("second", "bob")] {
        let resp = client
            .post(format!("{base}/api/messages/send"))
            .json(&serde_json::json!({ "content": content, "senderId": sender }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["content"], content);
        assert_eq!(body["senderId"], sender);
        assert!(body["timestamp"].is_string());
        ids.push(body["messageId"].as_str().unwrap().to_string());
    }

    let all: Vec<Value> = client
        .get(format!("{base}/api/messages/all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listed: Vec<&str> = all
        .iter()
        .map(|m| m["messageId"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[0].as_str(), ids[1].as_str()]);
    assert!(all.iter().all(|m| m["success"] == true));

    let one: Value = client
        .get(format!("{base}/api/messages/{}", ids[0]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(one["messageId"], ids[0].as_str());
    assert_eq!(one["content"], "first");
    assert_eq!(one["senderId"], "alice");
    assert_eq!(one["success"], true);

    let resp = client
        .delete(format!("{base}/api/messages/{}", ids[0]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base}/api/messages/{}", ids[0]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = client
        .post(format!("{base}/api/messages/clear"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);

    let all: Vec<Value> = client
        .get(format!("{base}/api/messages/all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_message_validation() {
    let (base, state) = spawn_server(ServerConfig::default()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/messages/send"))
        .json(&serde_json::json!({ "content": "   ", "senderId": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Message content cannot be empty");

    let resp = client
        .post(format!("{base}/api/messages/send"))
        .json(&serde_json::json!({ "content": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Sender ID is required");

    assert_eq!(state.messages.count(), 0);
}

#[tokio::test]
async fn test_health() {
    let (base, _) = spawn_server(ServerConfig::default()).await;
    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "wisp-server");
}
