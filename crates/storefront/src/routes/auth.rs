//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::baskets::BasketRepository;
use crate::error::Result;
use crate::middleware::session::{basket_token, clear_basket_token};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct SignInBody {
    pub username: String,
    pub password: String,
}

/// Registration request body. `name` is the display name.
#[derive(Debug, Deserialize)]
pub struct SignUpBody {
    pub name: String,
    pub username: String,
    pub password: String,
}

/// `POST /api/sign-in`
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SignInBody>,
) -> Result<StatusCode> {
    let user = AuthService::new(state.pool())
        .sign_in(&body.username, &body.password)
        .await?;

    start_user_session(&state, &session, user.id, user.username).await?;

    Ok(StatusCode::OK)
}

/// `POST /api/sign-up`
///
/// Registers the account and signs it in right away.
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SignUpBody>,
) -> Result<StatusCode> {
    let user = AuthService::new(state.pool())
        .sign_up(&body.name, &body.username, &body.password)
        .await?;

    start_user_session(&state, &session, user.id, user.username).await?;

    Ok(StatusCode::CREATED)
}

/// `POST /api/sign-out`
pub async fn sign_out(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    Ok(StatusCode::OK)
}

/// Put the user into the session and fold any anonymous basket collected
/// before login into theirs.
async fn start_user_session(
    state: &AppState,
    session: &Session,
    user_id: mercato_core::UserId,
    username: String,
) -> Result<()> {
    let current = CurrentUser {
        id: user_id,
        username,
    };
    set_current_user(session, &current).await?;

    if let Some(token) = basket_token(session).await? {
        BasketRepository::new(state.pool())
            .merge_into_user(&token, current.id)
            .await?;
        clear_basket_token(session).await?;
    }

    Ok(())
}
