//! End-to-end tests of the games API through the axum router.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use tictactoe_server::{
    AppState, Board, DbError, GameRepository, GameService, Move, Mover, ScriptedIndex, User,
    router,
};

struct TestApp {
    _db: NamedTempFile,
    repo: GameRepository,
    app: Router,
    alice: User,
    bob: User,
}

/// Two users and a router whose computer opponent always draws `draw`.
fn setup_app(draw: usize) -> TestApp {
    let db = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db.path().to_str().expect("Invalid path").to_string();
    let repo = GameRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");

    let alice = repo.create_user("alice".to_string()).expect("Create failed");
    let bob = repo.create_user("bob".to_string()).expect("Create failed");

    let service = GameService::new(repo.clone(), ScriptedIndex::fixed(draw));
    let app = router(AppState::new(service));
    TestApp {
        _db: db,
        repo,
        app,
        alice,
        bob,
    }
}

/// Creates a game for `user` whose latest board is `json`.
fn seed_game(repo: &GameRepository, user: &User, json: &str) -> i32 {
    let game = repo.create_game(*user.id()).expect("Create game failed");
    let board: Board = serde_json::from_str(json).expect("Invalid board literal");
    repo.transaction(|conn| {
        GameRepository::insert_move(conn, *game.id(), &Move::new(Mover::Computer, board))?;
        Ok::<_, DbError>(())
    })
    .expect("Insert failed");
    *game.id()
}

async fn send(app: &Router, method: &str, uri: &str, user: Option<&User>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", user.api_token()));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body is not JSON")
    };
    (status, value)
}

const GAME_ONE: &str = r#"[["O","X","."],[".","X","O"],[".",".","."]]"#;

#[tokio::test]
async fn test_health_needs_no_auth() {
    let t = setup_app(0);
    let (status, body) = send(&t.app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_unauthenticated_requests_forbidden() {
    let t = setup_app(0);
    let game_id = seed_game(&t.repo, &t.alice, GAME_ONE);

    for (method, uri) in [
        ("GET", "/games".to_string()),
        ("POST", "/games".to_string()),
        ("GET", format!("/games/{}", game_id)),
        ("GET", format!("/games/{}/moves", game_id)),
    ] {
        let (status, body) = send(&t.app, method, &uri, None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        assert_eq!(body["detail"], "Authentication credentials were not provided.");
    }

    let (status, _) = send(
        &t.app,
        "POST",
        &format!("/games/{}/move", game_id),
        None,
        Some(json!({"x": 1, "y": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_token_forbidden() {
    let t = setup_app(0);
    let request = Request::builder()
        .uri("/games")
        .header(header::AUTHORIZATION, "Token not-a-real-token")
        .body(Body::empty())
        .expect("Failed to build request");
    let response = t.app.clone().oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_returns_only_own_games() {
    let t = setup_app(0);
    let own = seed_game(&t.repo, &t.alice, GAME_ONE);
    seed_game(&t.repo, &t.bob, GAME_ONE);

    let (status, body) = send(&t.app, "GET", "/games", Some(&t.alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "id": own,
            "board": [["O","X","."],[".","X","O"],[".",".","."]],
            "game_winner": null,
        }])
    );
}

#[tokio::test]
async fn test_create_game_returns_id() {
    let t = setup_app(0);
    let (status, body) = send(&t.app, "POST", "/games", Some(&t.alice), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().expect("Missing id");

    let (status, body) = send(&t.app, "GET", &format!("/games/{}", id), Some(&t.alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["board"], json!([[".",".","."],[".",".","."],[".",".","."]]));
    assert_eq!(body["game_winner"], Value::Null);
}

#[tokio::test]
async fn test_foreign_game_not_found() {
    let t = setup_app(0);
    let game_id = seed_game(&t.repo, &t.bob, GAME_ONE);

    let (status, _) = send(&t.app, "GET", &format!("/games/{}", game_id), Some(&t.alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&t.app, "GET", &format!("/games/{}/moves", game_id), Some(&t.alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &t.app,
        "POST",
        &format!("/games/{}/move", game_id),
        Some(&t.alice),
        Some(json!({"x": 1, "y": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&t.app, "GET", "/games/424242", Some(&t.alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_move_without_winner() {
    let t = setup_app(3);
    let game_id = seed_game(&t.repo, &t.alice, GAME_ONE);

    let (status, body) = send(
        &t.app,
        "POST",
        &format!("/games/{}/move", game_id),
        Some(&t.alice),
        Some(json!({"x": 1, "y": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "board": [["O","X","."],["X","X","O"],[".",".","O"]],
            "game_winner": null,
        })
    );

    let (status, body) = send(&t.app, "GET", &format!("/games/{}/moves", game_id), Some(&t.alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            [["O","X","."],[".","X","O"],[".",".","."]],
            [["O","X","."],["X","X","O"],[".",".","."]],
            [["O","X","."],["X","X","O"],[".",".","O"]],
        ])
    );
}

#[tokio::test]
async fn test_winning_move_skips_computer() {
    let t = setup_app(0);
    let game_id = seed_game(&t.repo, &t.alice, GAME_ONE);

    let (status, body) = send(
        &t.app,
        "POST",
        &format!("/games/{}/move", game_id),
        Some(&t.alice),
        Some(json!({"x": 2, "y": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game_winner"], "player");
    assert_eq!(body["board"], json!([["O","X","."],[".","X","O"],[".","X","."]]));

    let (_, moves) = send(&t.app, "GET", &format!("/games/{}/moves", game_id), Some(&t.alice), None).await;
    assert_eq!(moves.as_array().map(Vec::len), Some(2));

    let (status, body) = send(
        &t.app,
        "POST",
        &format!("/games/{}/move", game_id),
        Some(&t.alice),
        Some(json!({"x": 2, "y": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Cannot make a move, game is already over.");
}

#[tokio::test]
async fn test_computer_wins() {
    let t = setup_app(1);
    let game_id = seed_game(&t.repo, &t.alice, r#"[["O","X","O"],[".","X","O"],["X",".","."]]"#);

    let (status, body) = send(
        &t.app,
        "POST",
        &format!("/games/{}/move", game_id),
        Some(&t.alice),
        Some(json!({"x": 1, "y": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game_winner"], "computer");
    assert_eq!(body["board"], json!([["O","X","O"],["X","X","O"],["X",".","O"]]));

    let (_, game) = send(&t.app, "GET", &format!("/games/{}", game_id), Some(&t.alice), None).await;
    assert_eq!(game["game_winner"], "computer");
}

#[tokio::test]
async fn test_last_square_ties() {
    let t = setup_app(0);
    let game_id = seed_game(&t.repo, &t.alice, r#"[["X","O","X"],["X","O","O"],["O","X","."]]"#);

    let (status, body) = send(
        &t.app,
        "POST",
        &format!("/games/{}/move", game_id),
        Some(&t.alice),
        Some(json!({"x": 2, "y": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game_winner"], "tie");
}

#[tokio::test]
async fn test_invalid_moves_rejected() {
    let t = setup_app(0);
    let game_id = seed_game(&t.repo, &t.alice, GAME_ONE);
    let uri = format!("/games/{}/move", game_id);

    let (status, body) = send(&t.app, "POST", &uri, Some(&t.alice), Some(json!({"x": 0, "y": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Space (0, 0) is already occupied");

    let (status, body) = send(&t.app, "POST", &uri, Some(&t.alice), Some(json!({"x": 3, "y": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "X coordinate must be an integer between 0 and 2");

    let (status, _) = send(&t.app, "POST", &uri, Some(&t.alice), Some(json!({"x": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, moves) = send(&t.app, "GET", &format!("/games/{}/moves", game_id), Some(&t.alice), None).await;
    assert_eq!(moves.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_bearer_scheme_accepted() {
    let t = setup_app(0);
    let request = Request::builder()
        .uri("/games")
        .header(header::AUTHORIZATION, format!("Bearer {}", t.alice.api_token()))
        .body(Body::empty())
        .expect("Failed to build request");
    let response = t.app.clone().oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_non_numeric_game_id_rejected_as_json() {
    let t = setup_app(0);

    let (status, body) = send(&t.app, "GET", "/games/abc", Some(&t.alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, body) = send(&t.app, "GET", "/games/abc/moves", Some(&t.alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, body) = send(
        &t.app,
        "POST",
        "/games/abc/move",
        Some(&t.alice),
        Some(json!({"x": 0, "y": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}
