use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bookviewer::auth::create_jwt;
use bookviewer::config::Config;
use bookviewer::db;
use bookviewer::domain::{BookInput, BookRepository, BookcaseRepository};
use bookviewer::infrastructure::{AppState, SeaOrmBookRepository, SeaOrmBookcaseRepository};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn test_state(db: DatabaseConnection) -> AppState {
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        cors_allowed_origins: Vec::new(),
        media_dir: std::env::temp_dir()
            .join("bookviewer-test-media")
            .to_string_lossy()
            .into_owned(),
        profile: "test".to_string(),
    };
    AppState::new(db, config)
}

// Helper to create a test user, returning its id and a bearer token
async fn create_test_user(db: &DatabaseConnection, username: &str) -> (i32, String) {
    let now = chrono::Utc::now().to_rfc3339();
    let account = bookviewer::models::user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("hash".to_string()),
        role: Set("user".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = bookviewer::models::user::Entity::insert(account)
        .exec(db)
        .await
        .expect("Failed to create user");
    let token = create_jwt(res.last_insert_id, username, "user").expect("Failed to create token");
    (res.last_insert_id, token)
}

// Helper to create a test author
async fn create_test_author(db: &DatabaseConnection, firstname: &str, lastname: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let author = bookviewer::models::book_author::ActiveModel {
        firstname: Set(firstname.to_string()),
        lastname: Set(lastname.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = bookviewer::models::book_author::Entity::insert(author)
        .exec(db)
        .await
        .expect("Failed to create author");
    res.last_insert_id
}

fn json_request(method: &str, uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn app_with_user(username: &str) -> (Router, DatabaseConnection, i32, String) {
    let db = setup_test_db().await;
    let (uid, token) = create_test_user(&db, username).await;
    let app = bookviewer::api::api_router(test_state(db.clone()));
    (app, db, uid, token)
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let db = setup_test_db().await;
    let app = bookviewer::api::api_router(test_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/bookcases")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let db = setup_test_db().await;
    let app = bookviewer::api::api_router(test_state(db));

    let response = app
        .oneshot(get_request("/api/bookcases", "not-a-jwt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_missing_entities_not_found() {
    let (app, _db, _uid, token) = app_with_user("owner").await;

    for uri in ["/api/bookcases/999", "/api/authors/999", "/api/books/999"] {
        let response = app.clone().oneshot(get_request(uri, &token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {}", uri);
    }
}

#[tokio::test]
async fn test_update_missing_book_not_found() {
    let (app, _db, _uid, token) = app_with_user("owner").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/books/999",
            &token,
            serde_json::json!({
                "name": "Ghost",
                "author_id": 1,
                "bookcase_slot_id": null
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_out_of_range_shelf_dimensions_rejected() {
    let (app, db, _uid, token) = app_with_user("owner").await;

    for (shelf_count, shelf_capacity) in [(0, 4), (11, 4), (3, 0), (3, 11)] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/bookcases",
                &token,
                serde_json::json!({
                    "name": "Bad",
                    "shelf_count": shelf_count,
                    "shelf_capacity": shelf_capacity
                }),
            ))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "({}, {})",
            shelf_count,
            shelf_capacity
        );
    }

    // Nothing was written
    let count = bookviewer::models::bookcase::Entity::find()
        .count(&db)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_duplicate_bookcase_name_conflicts() {
    let (app, _db, _uid, token) = app_with_user("owner").await;

    let payload = serde_json::json!({
        "name": "Living Room",
        "shelf_count": 2,
        "shelf_capacity": 2
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/bookcases", &token, payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/bookcases", &token, payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_duplicate_author_name_conflicts() {
    let (app, _db, _uid, token) = app_with_user("owner").await;

    let payload = serde_json::json!({ "firstname": "Frank", "lastname": "Herbert" });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/authors", &token, payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/authors", &token, payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_foreign_bookcase_is_invisible() {
    let db = setup_test_db().await;
    let (owner, _) = create_test_user(&db, "owner").await;
    let (_, stranger_token) = create_test_user(&db, "stranger").await;
    let app = bookviewer::api::api_router(test_state(db.clone()));

    let repo = SeaOrmBookcaseRepository::new(db.clone());
    let case = repo
        .create_with_slots(owner, "Living Room".to_string(), 2, 2)
        .await
        .unwrap();

    // Reads, renames and deletes by another account all answer 404;
    // ownership failures are indistinguishable from missing rows
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/bookcases/{}", case.id),
            &stranger_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/bookcases/{}", case.id),
            &stranger_token,
            serde_json::json!({ "name": "Hijacked" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/bookcases/{}/slots", case.id))
                .method("GET")
                .header(header::AUTHORIZATION, format!("Bearer {}", stranger_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/bookcases/{}", case.id))
                .method("DELETE")
                .header(header::AUTHORIZATION, format!("Bearer {}", stranger_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_cannot_use_foreign_slot() {
    let db = setup_test_db().await;
    let (owner, _) = create_test_user(&db, "owner").await;
    let (_, stranger_token) = create_test_user(&db, "stranger").await;
    let app = bookviewer::api::api_router(test_state(db.clone()));

    let repo = SeaOrmBookcaseRepository::new(db.clone());
    let case = repo
        .create_with_slots(owner, "Living Room".to_string(), 1, 1)
        .await
        .unwrap();
    let slots = repo.find_slots(owner, Some(case.id)).await.unwrap();
    let author_id = create_test_author(&db, "Frank", "Herbert").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/books",
            &stranger_token,
            serde_json::json!({
                "name": "Dune",
                "author_id": author_id,
                "bookcase_slot_id": slots[0].id
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_occupied_slot_conflicts() {
    let (app, db, uid, token) = app_with_user("owner").await;

    let bookcase_repo = SeaOrmBookcaseRepository::new(db.clone());
    let book_repo = SeaOrmBookRepository::new(db.clone());

    let case = bookcase_repo
        .create_with_slots(uid, "Living Room".to_string(), 1, 1)
        .await
        .unwrap();
    let slots = bookcase_repo.find_slots(uid, Some(case.id)).await.unwrap();
    let author_id = create_test_author(&db, "Frank", "Herbert").await;

    book_repo
        .create(
            uid,
            BookInput {
                name: "Dune".to_string(),
                author_id,
                bookcase_slot_id: Some(slots[0].id),
            },
        )
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/books",
            &token,
            serde_json::json!({
                "name": "Dune Messiah",
                "author_id": author_id,
                "bookcase_slot_id": slots[0].id
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_author_rejected() {
    let (app, _db, _uid, token) = app_with_user("owner").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/books",
            &token,
            serde_json::json!({
                "name": "Orphan",
                "author_id": 999,
                "bookcase_slot_id": null
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_bookcase_twice_not_found() {
    let (app, db, uid, token) = app_with_user("owner").await;

    let repo = SeaOrmBookcaseRepository::new(db.clone());
    let case = repo
        .create_with_slots(uid, "Living Room".to_string(), 1, 1)
        .await
        .unwrap();

    let delete_request = || {
        Request::builder()
            .uri(format!("/api/bookcases/{}", case.id))
            .method("DELETE")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(delete_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(delete_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let db = setup_test_db().await;
    let app = bookviewer::api::api_router(test_state(db));

    let register = |app: Router| async move {
        app.oneshot(
            Request::builder()
                .uri("/api/auth/register")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&serde_json::json!({
                        "username": "reader",
                        "password": "paperback"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap()
    };

    let response = register(app.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = register(app.clone()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
