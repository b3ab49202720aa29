//! Account and session flows over HTTP.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use iqra_integration_tests::{PASSWORD, TestServer, sign_up};

#[tokio::test]
async fn test_signup_then_check() {
    let server = TestServer::spawn().await.unwrap();
    let client = TestServer::client().unwrap();

    let response = sign_up(&client, &server, "hafsa@example.com", "student")
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "student");

    let check: Value = client
        .get(server.url("/auth/check"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(check["isAuthenticated"], true);
    assert_eq!(check["user"]["email"], "hafsa@example.com");
}

#[tokio::test]
async fn test_wrong_password_is_rejected_without_session() {
    let server = TestServer::spawn().await.unwrap();
    let setup = TestServer::client().unwrap();
    sign_up(&setup, &server, "bilal@example.com", "teacher")
        .await
        .unwrap();

    let client = TestServer::client().unwrap();
    let response = client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "bilal@example.com", "password": "wrong password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get("set-cookie").is_none());

    let check: Value = client
        .get(server.url("/auth/check"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(check["isAuthenticated"], false);
}

#[tokio::test]
async fn test_login_logout_and_password_change() {
    let server = TestServer::spawn().await.unwrap();
    let setup = TestServer::client().unwrap();
    sign_up(&setup, &server, "maryam@example.com", "teacher")
        .await
        .unwrap();

    let client = TestServer::client().unwrap();
    let login = client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "Maryam@Example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);

    let change = client
        .put(server.url("/auth/password"))
        .json(&json!({ "currentPassword": PASSWORD, "newPassword": "a brand new passphrase" }))
        .send()
        .await
        .unwrap();
    assert_eq!(change.status(), StatusCode::OK);

    let logout = client.post(server.url("/auth/logout")).send().await.unwrap();
    assert_eq!(logout.status(), StatusCode::OK);

    let students = client
        .get(server.url("/teacher/students"))
        .send()
        .await
        .unwrap();
    assert_eq!(students.status(), StatusCode::UNAUTHORIZED);

    let old = client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "maryam@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "maryam@example.com", "password": "a brand new passphrase" }))
        .send()
        .await
        .unwrap();
    assert_eq!(new.status(), StatusCode::OK);
}
