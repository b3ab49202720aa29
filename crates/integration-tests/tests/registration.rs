//! Course registration and roster seeding.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use iqra_core::CATALOG;
use iqra_integration_tests::{TestServer, sign_up};

async fn roster(client: &Client, server: &TestServer) -> Vec<Value> {
    let body: Value = client
        .get(server.url("/teacher/students"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["students"].as_array().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_catalog() {
    let server = TestServer::spawn().await.unwrap();
    let client = TestServer::client().unwrap();

    let body: Value = client
        .get(server.url("/courses"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["courses"].as_array().map(Vec::len), Some(CATALOG.len()));

    let missing = client
        .get(server.url("/courses/no-such-course"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Course not found");
}

#[tokio::test]
async fn test_registration_seeds_teacher_roster() {
    let server = TestServer::spawn().await.unwrap();
    let teacher = TestServer::client().unwrap();
    sign_up(&teacher, &server, "ustadh@example.com", "teacher")
        .await
        .unwrap();

    let visitor = TestServer::client().unwrap();
    let response = visitor
        .post(server.url("/courses/register"))
        .json(&json!({
            "name": "Alice",
            "email": "alice@example.com",
            "age": 10,
            "courseId": "pearls-of-juz-amma",
            "hifzParasCompleted": 2,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["registration"]["amount"], 450);
    assert_eq!(body["registration"]["status"], "pending");
    assert_eq!(body["registration"]["courseName"], "Pearls of Juz Amma");

    // Seeding runs after the response; poll until it lands.
    let mut students = Vec::new();
    for _ in 0..50 {
        students = roster(&teacher, &server).await;
        if !students.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["email"], "alice@example.com");
    assert_eq!(students[0]["course"], "Hifz");
    assert_eq!(students[0]["monthlyFee"], 450);
    assert_eq!(students[0]["parasCompleted"], 2);
}

#[tokio::test]
async fn test_duplicate_registration() {
    let server = TestServer::spawn().await.unwrap();
    let client = TestServer::client().unwrap();
    let form = json!({
        "name": "Omar",
        "email": "omar@example.com",
        "age": 30,
        "courseId": "noorani-qaida",
    });

    let first = client
        .post(server.url("/courses/register"))
        .json(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let mut again = form.clone();
    again["email"] = json!("OMAR@example.com");
    let second = client
        .post(server.url("/courses/register"))
        .json(&again)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    let other_course = client
        .post(server.url("/courses/register"))
        .json(&json!({
            "name": "Omar",
            "email": "omar@example.com",
            "age": 30,
            "courseId": "tajweed-mastery",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(other_course.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_registration_validation() {
    let server = TestServer::spawn().await.unwrap();
    let client = TestServer::client().unwrap();

    for form in [
        json!({ "name": "", "email": "a@example.com", "age": 12, "courseId": "noorani-qaida" }),
        json!({ "name": "A", "email": "not-an-email", "age": 12, "courseId": "noorani-qaida" }),
        json!({ "name": "A", "email": "a@example.com", "age": 2, "courseId": "noorani-qaida" }),
        json!({ "name": "A", "email": "a@example.com", "age": 12, "courseId": "astronomy" }),
        json!({
            "name": "A",
            "email": "a@example.com",
            "age": 12,
            "courseId": "complete-hifz",
            "hifzParasCompleted": 31,
        }),
    ] {
        let response = client
            .post(server.url("/courses/register"))
            .json(&form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{form}");
    }
}

#[tokio::test]
async fn test_my_registrations() {
    let server = TestServer::spawn().await.unwrap();
    let client = TestServer::client().unwrap();

    let anonymous = client
        .get(server.url("/courses/registrations"))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    sign_up(&client, &server, "zaid@example.com", "student")
        .await
        .unwrap();
    client
        .post(server.url("/courses/register"))
        .json(&json!({
            "name": "Zaid",
            "email": "zaid@example.com",
            "age": 16,
            "courseId": "fluent-recitation",
        }))
        .send()
        .await
        .unwrap();

    let body: Value = client
        .get(server.url("/courses/registrations"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let registrations = body["registrations"].as_array().unwrap();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0]["courseId"], "fluent-recitation");
}
