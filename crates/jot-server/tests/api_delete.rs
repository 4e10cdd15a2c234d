use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use jot_db::{create_pool, run_migrations, DbRuntimeSettings};
use jot_server::{app, config::AuthConfig, session::SessionStore, AppState};
use tower::ServiceExt;

fn setup_app() -> (Router, jot_db::DbPool) {
    // One pooled connection so every request sees the same in-memory database.
    let pool = create_pool(
        ":memory:",
        DbRuntimeSettings {
            busy_timeout_ms: 1_000,
            pool_max_size: 1,
        },
    )
    .unwrap();
    {
        let conn = pool.get().unwrap();
        run_migrations(&conn).unwrap();
    }

    let state = AppState {
        pool: pool.clone(),
        sessions: SessionStore::new(),
        auth: AuthConfig::default(),
    };
    (app(state), pool)
}

async fn login_cookie(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/login")
                .method("POST")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("username=admin&password=admin"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

#[tokio::test]
async fn test_delete_requires_login() {
    let (app, pool) = setup_app();
    let id = {
        let conn = pool.get().unwrap();
        jot_posts::create_post(&conn, "Keep", "still here").unwrap()
    };

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/delete/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["status"], 0);
    assert_eq!(json["message"], "Please log in.");

    // The post survived.
    let conn = pool.get().unwrap();
    assert_eq!(jot_posts::list_posts(&conn).unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_existing_post() {
    let (app, pool) = setup_app();
    let cookie = login_cookie(&app).await;
    let id = {
        let conn = pool.get().unwrap();
        jot_posts::create_post(&conn, "Doomed", "gone soon").unwrap()
    };

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/delete/{id}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], 1);
    assert_eq!(json["message"], "Post Deleted");

    let conn = pool.get().unwrap();
    assert!(jot_posts::list_posts(&conn).unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_post_reports_status_zero() {
    let (app, _pool) = setup_app();
    let cookie = login_cookie(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/delete/999")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], 0);
}

#[tokio::test]
async fn test_delete_with_non_numeric_id_is_rejected() {
    let (app, _pool) = setup_app();
    let cookie = login_cookie(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/delete/notanumber")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
