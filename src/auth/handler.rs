//! Message-bus endpoints for the auth plane: `auth.login`,
//! `auth.register`, `auth.validate`.
//!
//! Every handler returns a reply envelope whose `error` field is the
//! only failure channel; infrastructure details are logged with a
//! correlation id and surfaced as a generic `internal_error`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use telluria_data::User;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::rate_limit::RateLimiter;
use crate::auth::session::SessionManager;
use crate::auth::token::TokenManager;
use crate::ports::{StoreError, UserRepository};

pub const SUBJECT_LOGIN: &str = "auth.login";
pub const SUBJECT_REGISTER: &str = "auth.register";
pub const SUBJECT_VALIDATE: &str = "auth.validate";

pub const ERR_RATE_LIMITED: &str = "rate_limited";
pub const ERR_INVALID_CREDENTIALS: &str = "invalid_credentials";
pub const ERR_INTERNAL: &str = "internal_error";
pub const ERR_INVALID_REQUEST: &str = "invalid_request";
pub const ERR_USERNAME_TAKEN: &str = "username_taken";
pub const ERR_INVALID_TOKEN: &str = "invalid_token";

/// Login attempts allowed per username per window.
pub const LOGIN_LIMIT: u64 = 5;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(60);

/// Hard deadline for one auth request.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginReply {
    pub token: String,
    pub username: String,
    pub error: String,
}

impl LoginReply {
    fn ok(token: String, username: String) -> Self {
        Self {
            token,
            username,
            error: String::new(),
        }
    }

    fn error(kind: &str) -> Self {
        Self {
            token: String::new(),
            username: String::new(),
            error: kind.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterReply {
    pub username: String,
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateReply {
    pub user_id: String,
    pub username: String,
    pub roles: Vec<String>,
    pub error: String,
}

pub struct AuthHandler {
    users: Arc<dyn UserRepository>,
    sessions: Arc<SessionManager>,
    tokens: Arc<TokenManager>,
    limiter: RateLimiter,
}

impl AuthHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<SessionManager>,
        tokens: Arc<TokenManager>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            limiter,
        }
    }

    /// The login pipeline: parse, rate limit, look up, verify, mint.
    /// Whether the user exists is never distinguishable from a wrong
    /// password.
    pub async fn handle_login(&self, payload: &[u8]) -> LoginReply {
        let correlation = Uuid::new_v4();
        let request: LoginRequest = match serde_json::from_slice(payload) {
            Ok(request) => request,
            Err(_) => return LoginReply::error(ERR_INVALID_REQUEST),
        };

        let bucket = format!("login:{}", request.username);
        match self.limiter.allow(&bucket, LOGIN_LIMIT, LOGIN_WINDOW).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(%correlation, username = %request.username, "login rate limited");
                return LoginReply::error(ERR_RATE_LIMITED);
            }
            Err(e) => {
                tracing::error!(%correlation, error = %e, "rate limiter unavailable");
                return LoginReply::error(ERR_INTERNAL);
            }
        }

        let user = match self.users.find_by_username(&request.username).await {
            Ok(Some(user)) => user,
            Ok(None) => return LoginReply::error(ERR_INVALID_CREDENTIALS),
            Err(e) => {
                tracing::error!(%correlation, error = %e, "user lookup failed");
                return LoginReply::error(ERR_INTERNAL);
            }
        };

        let password = request.password;
        let stored_hash = user.password_hash.clone();
        let verified =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await;
        match verified {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => return LoginReply::error(ERR_INVALID_CREDENTIALS),
            Ok(Err(e)) => {
                tracing::error!(%correlation, user = %user.id, error = %e, "stored hash unusable");
                return LoginReply::error(ERR_INTERNAL);
            }
            Err(e) => {
                tracing::error!(%correlation, error = %e, "verification task failed");
                return LoginReply::error(ERR_INTERNAL);
            }
        }

        let session = match self.sessions.create_session(user.id, &user.username).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(%correlation, error = %e, "session creation failed");
                return LoginReply::error(ERR_INTERNAL);
            }
        };
        let roles = vec!["player".to_string()];
        let token = match self.tokens.mint(user.id, &user.username, &roles) {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(%correlation, error = %e, "token mint failed");
                return LoginReply::error(ERR_INTERNAL);
            }
        };
        if let Err(e) = self.users.touch_last_login(user.id, Utc::now()).await {
            tracing::warn!(%correlation, error = %e, "last-login update failed");
        }
        tracing::info!(%correlation, user = %user.id, session = %session.id, "login succeeded");
        LoginReply::ok(token, user.username)
    }

    /// Registration: hash, insert, surface conflicts.
    pub async fn handle_register(&self, payload: &[u8]) -> RegisterReply {
        let correlation = Uuid::new_v4();
        let request: RegisterRequest = match serde_json::from_slice(payload) {
            Ok(request) => request,
            Err(_) => {
                return RegisterReply {
                    username: String::new(),
                    error: ERR_INVALID_REQUEST.to_string(),
                }
            }
        };
        if request.username.is_empty() || request.email.is_empty() || request.password.is_empty() {
            return RegisterReply {
                username: String::new(),
                error: ERR_INVALID_REQUEST.to_string(),
            };
        }

        let password = request.password;
        let hashed = tokio::task::spawn_blocking(move || hash_password(&password)).await;
        let password_hash = match hashed {
            Ok(Ok(hash)) => hash,
            Ok(Err(e)) => {
                tracing::error!(%correlation, error = %e, "password hashing failed");
                return RegisterReply {
                    username: String::new(),
                    error: ERR_INTERNAL.to_string(),
                };
            }
            Err(e) => {
                tracing::error!(%correlation, error = %e, "hashing task failed");
                return RegisterReply {
                    username: String::new(),
                    error: ERR_INTERNAL.to_string(),
                };
            }
        };

        let user = User {
            id: Uuid::new_v4(),
            email: request.email,
            username: request.username.clone(),
            password_hash,
            created_at: Utc::now(),
            last_login_at: None,
        };
        match self.users.insert(user).await {
            Ok(()) => RegisterReply {
                username: request.username,
                error: String::new(),
            },
            Err(StoreError::Conflict(_)) => RegisterReply {
                username: String::new(),
                error: ERR_USERNAME_TAKEN.to_string(),
            },
            Err(e) => {
                tracing::error!(%correlation, error = %e, "user insert failed");
                RegisterReply {
                    username: String::new(),
                    error: ERR_INTERNAL.to_string(),
                }
            }
        }
    }

    /// Token validation: returns the decrypted claims.
    pub async fn handle_validate(&self, payload: &[u8]) -> ValidateReply {
        let request: ValidateRequest = match serde_json::from_slice(payload) {
            Ok(request) => request,
            Err(_) => {
                return ValidateReply {
                    user_id: String::new(),
                    username: String::new(),
                    roles: Vec::new(),
                    error: ERR_INVALID_REQUEST.to_string(),
                }
            }
        };
        match self.tokens.validate(&request.token) {
            Ok(claims) => ValidateReply {
                user_id: claims.user_id.to_string(),
                username: claims.username,
                roles: claims.roles,
                error: String::new(),
            },
            Err(e) => {
                tracing::debug!(error = %e, "token validation rejected");
                ValidateReply {
                    user_id: String::new(),
                    username: String::new(),
                    roles: Vec::new(),
                    error: ERR_INVALID_TOKEN.to_string(),
                }
            }
        }
    }

    /// Binds the three subjects on the bus and serves until the
    /// subscriptions close. Each request runs in its own task under
    /// the auth deadline.
    pub async fn run(self: Arc<Self>, client: async_nats::Client) -> anyhow::Result<()> {
        let mut login = client.subscribe(SUBJECT_LOGIN).await?;
        let mut register = client.subscribe(SUBJECT_REGISTER).await?;
        let mut validate = client.subscribe(SUBJECT_VALIDATE).await?;
        tracing::info!("auth handler bound to {SUBJECT_LOGIN}, {SUBJECT_REGISTER}, {SUBJECT_VALIDATE}");

        loop {
            tokio::select! {
                Some(message) = login.next() => {
                    let handler = self.clone();
                    let client = client.clone();
                    tokio::spawn(async move {
                        let reply = match tokio::time::timeout(
                            AUTH_TIMEOUT,
                            handler.handle_login(&message.payload),
                        )
                        .await
                        {
                            Ok(reply) => reply,
                            Err(_) => LoginReply::error(ERR_INTERNAL),
                        };
                        respond(&client, message.reply, &reply).await;
                    });
                }
                Some(message) = register.next() => {
                    let handler = self.clone();
                    let client = client.clone();
                    tokio::spawn(async move {
                        let reply = match tokio::time::timeout(
                            AUTH_TIMEOUT,
                            handler.handle_register(&message.payload),
                        )
                        .await
                        {
                            Ok(reply) => reply,
                            Err(_) => RegisterReply {
                                username: String::new(),
                                error: ERR_INTERNAL.to_string(),
                            },
                        };
                        respond(&client, message.reply, &reply).await;
                    });
                }
                Some(message) = validate.next() => {
                    let handler = self.clone();
                    let client = client.clone();
                    tokio::spawn(async move {
                        let reply = handler.handle_validate(&message.payload).await;
                        respond(&client, message.reply, &reply).await;
                    });
                }
                else => break,
            }
        }
        Ok(())
    }
}

async fn respond<T: Serialize>(
    client: &async_nats::Client,
    reply: Option<async_nats::Subject>,
    body: &T,
) {
    let Some(subject) = reply else { return };
    let Ok(bytes) = serde_json::to_vec(body) else {
        return;
    };
    if let Err(e) = client.publish(subject, bytes.into()).await {
        tracing::error!(error = %e, "reply publish failed");
    }
}
