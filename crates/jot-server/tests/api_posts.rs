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

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_renders() {
    let (app, _pool) = setup_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_empty_db_shows_placeholder() {
    let (app, _pool) = setup_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let page = body_string(response).await;
    assert!(page.contains("No entries yet. Add some!"));
}

#[tokio::test]
async fn test_add_post_escapes_title_keeps_body_raw() {
    let (app, _pool) = setup_app();
    let cookie = login_cookie(&app).await;

    // title=<Hello>  text=<strong>HTML</strong> allowed here
    let form = "title=%3CHello%3E&text=%3Cstrong%3EHTML%3C%2Fstrong%3E+allowed+here";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/add")
                .method("POST")
                .header(header::COOKIE, &cookie)
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let page = body_string(response).await;

    assert!(page.contains("New entry was successfully posted"));
    assert!(!page.contains("No entries yet. Add some!"));
    assert!(page.contains("&lt;Hello&gt;"), "title must be escaped");
    assert!(
        page.contains("<strong>HTML</strong> allowed here"),
        "body must be rendered raw"
    );
}

#[tokio::test]
async fn test_add_requires_login() {
    let (app, pool) = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/add")
                .method("POST")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("title=nope&text=nope"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).expect("401 body should be JSON");
    assert_eq!(json["status"], 0);
    assert_eq!(json["message"], "Please log in.");

    // Nothing was written.
    let conn = pool.get().unwrap();
    assert!(jot_posts::list_posts(&conn).unwrap().is_empty());
}

#[tokio::test]
async fn test_add_rejects_empty_title() {
    let (app, _pool) = setup_app();
    let cookie = login_cookie(&app).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/add")
                .method("POST")
                .header(header::COOKIE, &cookie)
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("title=&text=body+without+title"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_posts_listed_newest_first() {
    let (app, pool) = setup_app();
    {
        let conn = pool.get().unwrap();
        jot_posts::create_post(&conn, "older", "first entry").unwrap();
        jot_posts::create_post(&conn, "newer", "second entry").unwrap();
    }

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let page = body_string(response).await;

    let newer = page.find("newer").expect("newer post should render");
    let older = page.find("older").expect("older post should render");
    assert!(newer < older, "newest post should come first");
}
