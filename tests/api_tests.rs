//! API integration tests
//!
//! Run with: cargo test -- --ignored
//! Requires a running server with its database migrated, plus the identity
//! directory stub for the admin listing and dashboard tests.

use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string())
}

/// Mint a token the way the identity provider would
fn token_for(sub: &str, role: &str) -> String {
    let claims = json!({
        "sub": sub,
        "role": role,
        "exp": 4102444800i64,
        "iat": 0
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .expect("Failed to encode test token")
}

fn admin_token() -> String {
    token_for("test-admin", "admin")
}

fn employee_token() -> String {
    token_for("test-employee", "employee")
}

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

fn unique_name(prefix: &str) -> String {
    format!("{} {}", prefix, unique_suffix())
}

/// Create a tool as admin and return its id
async fn create_tool(client: &Client, name: &str, stock_total: i32) -> i64 {
    let response = client
        .post(format!("{}/tools", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .json(&json!({
            "name": name,
            "description": "Herramienta de prueba",
            "image_url": "https://media.example/tool.jpg",
            "stock_total": stock_total
        }))
        .send()
        .await
        .expect("Failed to create tool");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse tool");
    body["id"].as_i64().expect("No tool ID")
}

async fn delete_tool(client: &Client, tool_id: i64) {
    let _ = client
        .delete(format!("{}/tools/{}", BASE_URL, tool_id))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .send()
        .await;
}

async fn get_tool(client: &Client, tool_id: i64) -> Value {
    client
        .get(format!("{}/tools/{}", BASE_URL, tool_id))
        .header("Authorization", format!("Bearer {}", employee_token()))
        .send()
        .await
        .expect("Failed to get tool")
        .json()
        .await
        .expect("Failed to parse tool")
}

/// Create a request as the given user and return its id
async fn create_request(client: &Client, token: &str, tool_id: i64) -> i64 {
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "tool_id": tool_id,
            "justification": "Necesito la herramienta para una obra."
        }))
        .send()
        .await
        .expect("Failed to create request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse request");
    assert_eq!(body["status"], "pendiente");
    body["id"].as_i64().expect("No request ID")
}

async fn transition(client: &Client, request_id: i64, status: &str) -> reqwest::Response {
    client
        .put(format!("{}/admin/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .json(&json!({ "status": status }))
        .send()
        .await
        .expect("Failed to send transition")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/tools", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_employee_cannot_create_tool() {
    let client = Client::new();

    let response = client
        .post(format!("{}/tools", BASE_URL))
        .header("Authorization", format!("Bearer {}", employee_token()))
        .json(&json!({
            "name": unique_name("Taladro"),
            "description": "Taladro percutor",
            "image_url": "https://media.example/taladro.jpg",
            "stock_total": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_create_search_and_delete_tool() {
    let client = Client::new();
    let name = unique_name("Llave inglesa");
    let tool_id = create_tool(&client, &name, 2).await;

    let response = client
        .get(format!("{}/tools", BASE_URL))
        .query(&[("search", name.as_str())])
        .header("Authorization", format!("Bearer {}", employee_token()))
        .send()
        .await
        .expect("Failed to search tools");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let tools = body.as_array().expect("Expected a tool array");
    assert!(tools.iter().any(|t| t["id"].as_i64() == Some(tool_id)));

    delete_tool(&client, tool_id).await;

    let response = client
        .get(format!("{}/tools/{}", BASE_URL, tool_id))
        .header("Authorization", format!("Bearer {}", employee_token()))
        .send()
        .await
        .expect("Failed to get tool");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_tool_name_is_conflict() {
    let client = Client::new();
    let name = unique_name("Martillo");
    let tool_id = create_tool(&client, &name, 1).await;

    let response = client
        .post(format!("{}/tools", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .json(&json!({
            "name": name,
            "description": "Otro martillo",
            "image_url": "https://media.example/martillo.jpg",
            "stock_total": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    delete_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_empty_justification_is_rejected() {
    let client = Client::new();
    let tool_id = create_tool(&client, &unique_name("Sierra"), 1).await;

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", employee_token()))
        .json(&json!({ "tool_id": tool_id, "justification": "   " }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    delete_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_request_for_unknown_tool_is_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", employee_token()))
        .json(&json!({ "tool_id": 999999999, "justification": "Obra nueva" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_approve_then_return_moves_stock_once_each_way() {
    let client = Client::new();
    let tool_id = create_tool(&client, &unique_name("Taladro"), 3).await;
    let request_id = create_request(&client, &employee_token(), tool_id).await;

    // Approve: stock moves out
    let response = transition(&client, request_id, "aprobada").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "aprobada");
    assert!(body["approved_or_rejected_at"].is_string());
    assert_eq!(get_tool(&client, tool_id).await["stock_on_loan"], 1);

    // A second approval of the same request must lose
    let response = transition(&client, request_id, "aprobada").await;
    assert_eq!(response.status(), 409);
    assert_eq!(get_tool(&client, tool_id).await["stock_on_loan"], 1);

    // Return: stock comes back, return stamped
    let response = transition(&client, request_id, "devuelta").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "devuelta");
    assert!(body["returned_at"].is_string());
    assert_eq!(get_tool(&client, tool_id).await["stock_on_loan"], 0);

    // devuelta is terminal
    let response = transition(&client, request_id, "devuelta").await;
    assert_eq!(response.status(), 409);

    delete_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_rejection_never_touches_stock() {
    let client = Client::new();
    let tool_id = create_tool(&client, &unique_name("Lijadora"), 2).await;
    let request_id = create_request(&client, &employee_token(), tool_id).await;

    let response = transition(&client, request_id, "rechazada").await;
    assert_eq!(response.status(), 200);
    assert_eq!(get_tool(&client, tool_id).await["stock_on_loan"], 0);

    // rechazada is terminal
    let response = transition(&client, request_id, "aprobada").await;
    assert_eq!(response.status(), 409);

    delete_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_my_requests_and_stats() {
    let client = Client::new();
    let user = format!("stats-user-{}", unique_suffix());
    let token = token_for(&user, "employee");
    let tool_id = create_tool(&client, &unique_name("Atornillador"), 1).await;
    let request_id = create_request(&client, &token, tool_id).await;

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list requests");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let requests = body.as_array().expect("Expected a request array");
    assert!(requests.iter().any(|r| r["id"].as_i64() == Some(request_id)));

    let response = client
        .get(format!("{}/requests/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to get stats");
    assert!(response.status().is_success());
    let stats: Value = response.json().await.expect("Failed to parse stats");
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["pendiente"], 1);

    delete_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_notification_read_semantics() {
    let client = Client::new();
    let user = format!("notif-user-{}", unique_suffix());
    let token = token_for(&user, "employee");
    let tool_id = create_tool(&client, &unique_name("Cizalla"), 1).await;
    let request_id = create_request(&client, &token, tool_id).await;

    transition(&client, request_id, "aprobada").await;
    // The requester notification is dispatched after the commit
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let response = client
        .get(format!("{}/notifications", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list notifications");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let notifications = body.as_array().expect("Expected a notification array");
    let notification = notifications
        .iter()
        .find(|n| n["message"].as_str().unwrap_or("").contains("APROBADA"))
        .expect("No approval notification");
    let notification_id = notification["id"].as_i64().expect("No notification ID");

    // Someone else cannot mark it read, and cannot tell it exists
    let response = client
        .put(format!("{}/notifications/{}/read", BASE_URL, notification_id))
        .header("Authorization", format!("Bearer {}", employee_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    // The owner can, exactly once
    let response = client
        .put(format!("{}/notifications/{}/read", BASE_URL, notification_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["read"], true);

    let response = client
        .put(format!("{}/notifications/{}/read", BASE_URL, notification_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    delete_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_admin_request_listing() {
    let client = Client::new();
    let tool_id = create_tool(&client, &unique_name("Fresadora"), 1).await;
    let request_id = create_request(&client, &employee_token(), tool_id).await;

    let response = client
        .get(format!("{}/admin/requests", BASE_URL))
        .query(&[("status", "pendiente"), ("page", "1"), ("limit", "50")])
        .header("Authorization", format!("Bearer {}", admin_token()))
        .send()
        .await
        .expect("Failed to list requests");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
    assert!(body["total_pages"].is_number());
    let items = body["items"].as_array().unwrap();
    assert!(items.iter().any(|r| r["id"].as_i64() == Some(request_id)));

    // Employees cannot see the admin listing
    let response = client
        .get(format!("{}/admin/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", employee_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    delete_tool(&client, tool_id).await;
}

#[tokio::test]
#[ignore]
async fn test_dashboard_stats() {
    let client = Client::new();

    let response = client
        .get(format!("{}/admin/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .send()
        .await
        .expect("Failed to get stats");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["requests"]["total"].is_number());
    assert!(body["tools"]["total_tools"].is_number());
    assert!(body["users"]["total_users"].is_number());
}
