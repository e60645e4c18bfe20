//! End-to-end tests driving the router over the in-memory store

use std::sync::Arc;

use api::{
    AppState,
    jwt::{JwtConfig, JwtService},
    models::{BadgeDefinition, Course, DAILY_CHALLENGES_COURSE, Lesson},
    repositories::{Repositories, memory::MemoryStore},
    routes::create_router,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use serde_json::{Value, json};
use tower::ServiceExt;

fn lesson(lesson_id: &str, course_id: &str, order: i32, coins_reward: i64) -> Lesson {
    Lesson {
        lesson_id: lesson_id.to_string(),
        course_id: course_id.to_string(),
        title: format!("Lesson {}", lesson_id),
        title_ar: String::new(),
        description: String::new(),
        description_ar: String::new(),
        order,
        difficulty: "easy".to_string(),
        duration_minutes: 10,
        content_blocks: json!([{ "type": "text", "content": "Hello Scratch!" }]),
        scratch_blocks: vec!["move_steps".to_string()],
        has_puzzle: false,
        has_activity: true,
        has_video: false,
        coins_reward,
        character_name: "Scratchy".to_string(),
        character_intro_joke: Some("Why did the cat sit on the computer?".to_string()),
        character_intro_joke_ar: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn course(course_id: &str, is_published: bool) -> Course {
    Course {
        course_id: course_id.to_string(),
        title: "Scratch Basics".to_string(),
        title_ar: String::new(),
        description: String::new(),
        description_ar: String::new(),
        difficulty: "beginner".to_string(),
        estimated_hours: 2.0,
        order: 1,
        thumbnail: None,
        color_theme: "#FF6B6B".to_string(),
        lesson_ids: vec!["lesson_001".to_string()],
        total_lessons: 1,
        completion_coins: 50,
        completion_badge: None,
        is_published,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn first_steps_badge() -> BadgeDefinition {
    BadgeDefinition {
        achievement_id: "first_steps".to_string(),
        title: "First Steps!".to_string(),
        title_ar: String::new(),
        description: "Complete your first lesson".to_string(),
        description_ar: String::new(),
        icon: "👣".to_string(),
        category: "general".to_string(),
        requirement_type: "lessons_completed".to_string(),
        requirement_value: 1,
        coins_reward: 10,
        funny_message: String::new(),
        funny_message_ar: String::new(),
    }
}

async fn seeded_store(with_rotation: bool) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert_lesson(lesson("lesson_001", "scratch_basics", 1, 10)).await;
    store.insert_lesson(lesson("lesson_002", "scratch_basics", 2, 15)).await;
    if with_rotation {
        for order in 1..=7 {
            store
                .insert_lesson(lesson(
                    &format!("dc_00{}", order),
                    DAILY_CHALLENGES_COURSE,
                    order,
                    20,
                ))
                .await;
        }
    }
    store.insert_course(course("scratch_basics", true)).await;
    store.insert_course(course("unreleased", false)).await;
    store.insert_badge(first_steps_badge()).await;
    store
}

fn app_with(store: Arc<MemoryStore>) -> Router {
    let jwt = JwtService::new(JwtConfig {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        token_expiry_days: 7,
    })
    .unwrap();
    create_router(AppState::new(Repositories::shared(store), jwt))
}

async fn app() -> Router {
    app_with(seeded_store(true).await)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn signup(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "meow1234",
            "display_name": "Coder Kid",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn root_and_health_respond() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to Lets Learn API!");

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn signup_returns_a_token_for_the_new_user() {
    let app = app().await;
    let token = signup(&app, "coder_kid").await;

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    let user = &body["user"];
    assert_eq!(user["username"], "coder_kid");
    assert_eq!(user["displayName"], "Coder Kid");
    assert_eq!(user["scratchyCoins"], 10);
    assert_eq!(user["preferredLanguage"], "en");
    assert_eq!(user["avatarColor"], "blue");
    assert_eq!(user["role"], "student");
    assert!(user.get("password_hash").is_none());
    assert!(user.get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let app = app().await;
    signup(&app, "coder_kid").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "username": "coder_kid",
            "email": "someone_else@example.com",
            "password": "meow1234",
            "display_name": "Copy Cat",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already taken");
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/progress", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn login_checks_the_password() {
    let app = app().await;
    signup(&app, "coder_kid").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "coder_kid@example.com", "password": "not-it" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "coder_kid@example.com", "password": "meow1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "coder_kid");
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn add_coins_requires_a_positive_amount() {
    let app = app().await;
    let token = signup(&app, "coder_kid").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/add-coins?amount=0",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Amount must be positive");
    assert_eq!(body["detail"], "Amount must be positive");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/add-coins?amount=5",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Added 5 coins");
    assert_eq!(body["total_coins"], 15);
}

#[tokio::test]
async fn coin_amounts_past_the_balance_limit_are_rejected() {
    let app = app().await;
    let token = signup(&app, "coder_kid").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/add-coins?amount=9223372036854775807",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Amount is too large");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/progress/lesson/lesson_001/complete?coins_earned=9223372036854775807",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(body["user"]["scratchyCoins"], 10);

    let (_, body) = send(&app, Method::GET, "/api/progress", Some(&token), None).await;
    assert_eq!(body["total_lessons_completed"], 0);
}

#[tokio::test]
async fn profile_updates_ignore_unknown_fields() {
    let app = app().await;
    let token = signup(&app, "coder_kid").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/auth/me",
        Some(&token),
        Some(json!({
            "display_name": "Captain Code",
            "preferred_language": "ar",
            "scratchy_coins": 9999,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["displayName"], "Captain Code");
    assert_eq!(body["user"]["preferredLanguage"], "ar");
    assert_eq!(body["user"]["scratchyCoins"], 10);
}

#[tokio::test]
async fn lesson_completion_updates_progress_and_badges() {
    let app = app().await;
    let token = signup(&app, "coder_kid").await;

    let (status, body) = send(&app, Method::GET, "/api/progress", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_lessons_completed"], 0);
    assert_eq!(body["current_streak"], 0);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/progress/lesson/lesson_001/complete",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Lesson completed!");
    assert_eq!(body["coins_earned"], 10);
    assert_eq!(body["total_coins"], 20);
    assert_eq!(body["current_streak"], 1);
    assert_eq!(body["new_badges"], json!(["first_steps"]));

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/progress/lesson/lesson_002/complete?coins_earned=15",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["total_coins"], 35);
    assert_eq!(body["current_streak"], 1);
    assert_eq!(body["new_badges"], json!([]));

    let (_, body) = send(&app, Method::GET, "/api/progress", Some(&token), None).await;
    assert_eq!(body["total_lessons_completed"], 2);
    assert_eq!(body["longest_streak"], 1);

    let (status, body) = send(&app, Method::GET, "/api/achievements", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["achievement_id"], "first_steps");
}

#[tokio::test]
async fn daily_challenge_pays_out_once_per_day() {
    let app = app().await;
    let token = signup(&app, "coder_kid").await;

    let (status, challenge) = send(&app, Method::GET, "/api/daily-challenge", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(challenge["date"], Utc::now().date_naive().format("%Y-%m-%d").to_string());
    assert_eq!(challenge["puzzle_type"], "drag-drop");
    assert!(challenge["id"].as_str().unwrap().starts_with("dc_"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/daily-challenge/complete",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["coins_earned"], 20);
    assert_eq!(body["total_coins"], 30);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/daily-challenge/complete",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Already completed today's challenge");

    let (_, body) = send(&app, Method::GET, "/api/progress", Some(&token), None).await;
    assert_eq!(body["total_challenges_completed"], 1);

    let (_, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(body["user"]["scratchyCoins"], 30);
}

#[tokio::test]
async fn daily_challenge_is_not_found_without_rotation() {
    let app = app_with(seeded_store(false).await);
    let token = signup(&app, "coder_kid").await;

    let (status, _) = send(&app, Method::GET, "/api/daily-challenge", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/daily-challenge/complete",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn leaderboard_ranks_by_coins() {
    let app = app().await;
    let rich = signup(&app, "rich_kid").await;
    signup(&app, "new_kid").await;
    let middle = signup(&app, "middle_kid").await;

    send(&app, Method::POST, "/api/auth/add-coins?amount=40", Some(&rich), None).await;
    send(&app, Method::POST, "/api/auth/add-coins?amount=20", Some(&middle), None).await;

    let (status, body) = send(&app, Method::GET, "/api/leaderboard?limit=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[0]["scratchy_coins"], 50);
    assert_eq!(entries[1]["rank"], 2);
    assert_eq!(entries[1]["scratchy_coins"], 30);
}

#[tokio::test]
async fn content_endpoints_list_reference_data() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/lessons", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|lesson| lesson["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["lesson_001", "lesson_002"]);

    let (status, body) = send(&app, Method::GET, "/api/lessons/lesson_002", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["coins_reward"], 15);

    let (status, _) = send(&app, Method::GET, "/api/lessons/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/courses", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["course_id"], "scratch_basics");

    let (_, body) = send(&app, Method::GET, "/api/badges", None, None).await;
    assert_eq!(body[0]["id"], "first_steps");
}
