use std::sync::Arc;

use chrono::Utc;
use telluria_data::User;
use telluria_lib::auth::handler::{
    AuthHandler, ERR_INVALID_CREDENTIALS, ERR_RATE_LIMITED,
};
use telluria_lib::auth::password::hash_password;
use telluria_lib::auth::rate_limit::RateLimiter;
use telluria_lib::auth::session::SessionManager;
use telluria_lib::auth::token::{TokenManager, TOKEN_TTL_SECS};
use telluria_lib::infra::memory::{InMemoryStore, InMemoryUserRepository};
use telluria_lib::ports::UserRepository;
use uuid::Uuid;

async fn handler_with_admin() -> (AuthHandler, Arc<SessionManager>, Arc<TokenManager>) {
    let store = Arc::new(InMemoryStore::new());
    let users = Arc::new(InMemoryUserRepository::new());
    users
        .insert(User {
            id: Uuid::new_v4(),
            email: "admin@telluria.io".into(),
            username: "admin".into(),
            password_hash: hash_password("password123").expect("hash"),
            created_at: Utc::now(),
            last_login_at: None,
        })
        .await
        .expect("seed user");
    let sessions = Arc::new(SessionManager::new(store.clone()));
    let tokens = Arc::new(TokenManager::new(&[5u8; 32], &[6u8; 32]).expect("keys"));
    let handler = AuthHandler::new(
        users,
        sessions.clone(),
        tokens.clone(),
        RateLimiter::new(store),
    );
    (handler, sessions, tokens)
}

#[tokio::test]
async fn login_happy_path_issues_a_working_token() {
    let (handler, _, tokens) = handler_with_admin().await;
    let reply = handler
        .handle_login(br#"{"username":"admin","password":"password123"}"#)
        .await;
    assert_eq!(reply.error, "");
    assert_eq!(reply.username, "admin");

    let claims = tokens.validate(&reply.token).expect("token must validate");
    assert_eq!(claims.username, "admin");
    assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
}

#[tokio::test]
async fn five_failures_then_rate_limited() {
    let (handler, _, _) = handler_with_admin().await;
    for _ in 0..5 {
        let reply = handler
            .handle_login(br#"{"username":"admin","password":"nope"}"#)
            .await;
        assert_eq!(reply.error, ERR_INVALID_CREDENTIALS);
    }
    let reply = handler
        .handle_login(br#"{"username":"admin","password":"password123"}"#)
        .await;
    assert_eq!(reply.error, ERR_RATE_LIMITED);
    assert_eq!(reply.token, "");
    assert_eq!(reply.username, "");
}

#[tokio::test]
async fn missing_user_and_wrong_password_are_indistinguishable() {
    let (handler, _, _) = handler_with_admin().await;
    let ghost = handler
        .handle_login(br#"{"username":"ghost","password":"password123"}"#)
        .await;
    let wrong = handler
        .handle_login(br#"{"username":"admin","password":"wrong"}"#)
        .await;
    assert_eq!(ghost.error, wrong.error);
    assert_eq!(ghost.token, wrong.token);
}

#[tokio::test]
async fn sessions_survive_login_and_die_on_invalidation() {
    let (handler, sessions, _) = handler_with_admin().await;
    let reply = handler
        .handle_login(br#"{"username":"admin","password":"password123"}"#)
        .await;
    assert_eq!(reply.error, "");

    let created = sessions.create_session(Uuid::new_v4(), "admin").await.unwrap();
    let fetched = sessions.get_session(created.id).await.unwrap();
    assert_eq!(fetched.username, "admin");

    sessions.invalidate_session(created.id).await.unwrap();
    assert!(sessions.get_session(created.id).await.is_err());
}

#[tokio::test]
async fn token_expiry_boundary_holds_end_to_end() {
    let tokens = TokenManager::new(&[5u8; 32], &[6u8; 32]).unwrap();
    let token = tokens
        .mint_at(Uuid::new_v4(), "admin", &["player".to_string()], 50_000)
        .unwrap();
    let exp = 50_000 + TOKEN_TTL_SECS;
    assert!(tokens.validate_at(&token, exp - 1).is_ok());
    assert!(tokens.validate_at(&token, exp + 1).is_err());
}

#[tokio::test]
async fn register_validate_round_trip() {
    let (handler, _, _) = handler_with_admin().await;
    let register = handler
        .handle_register(
            br#"{"username":"scout","email":"scout@telluria.io","password":"longway99"}"#,
        )
        .await;
    assert_eq!(register.error, "");

    let login = handler
        .handle_login(br#"{"username":"scout","password":"longway99"}"#)
        .await;
    assert_eq!(login.error, "");

    let payload = serde_json::to_vec(&serde_json::json!({ "token": login.token })).unwrap();
    let validated = handler.handle_validate(&payload).await;
    assert_eq!(validated.error, "");
    assert_eq!(validated.username, "scout");
}
