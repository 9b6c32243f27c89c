//! Profile route handlers.

use std::path::Path as FsPath;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use mercato_core::Email;

use crate::db::profiles::ProfileRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::profile::{PasswordChange, ProfileUpdate, ProfileView};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// `GET /api/profile`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<ProfileView>> {
    let profile = ProfileRepository::new(state.pool())
        .get(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("profile".to_string()))?;
    Ok(Json(profile))
}

/// `POST /api/profile`
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<ProfileView>> {
    let email = Email::parse(&body.email).map_err(AuthError::from)?;

    let profiles = ProfileRepository::new(state.pool());
    profiles
        .upsert(current.id, body.full_name.trim(), email.as_str(), &body.phone)
        .await?;

    let profile = profiles
        .get(current.id)
        .await?
        .ok_or_else(|| AppError::Internal("profile vanished after upsert".to_string()))?;
    Ok(Json(profile))
}

/// `POST /api/profile/avatar`
///
/// Multipart upload. An empty profile is created on the fly so an avatar
/// can be set before any details were saved.
pub async fn upload_avatar(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    mut multipart: Multipart,
) -> Result<Json<ProfileView>> {
    let mut stored: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let file_name = sanitize_file_name(field.file_name().unwrap_or("avatar"));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }

        let dir = state
            .config()
            .media_root
            .join("avatars")
            .join(current.id.as_i32().to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("failed to create media directory: {e}")))?;
        tokio::fs::write(dir.join(&file_name), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("failed to store upload: {e}")))?;

        stored = Some(format!("/media/avatars/{}/{file_name}", current.id.as_i32()));
        break;
    }

    let Some(src) = stored else {
        return Err(AppError::BadRequest(
            "Multipart field 'avatar' is required".to_string(),
        ));
    };

    let profiles = ProfileRepository::new(state.pool());
    let profile_id = profiles.ensure(current.id).await?;
    let alt = format!("avatar of {}", current.username);
    profiles.set_avatar(profile_id, &src, &alt).await?;

    let profile = profiles
        .get(current.id)
        .await?
        .ok_or_else(|| AppError::Internal("profile vanished after avatar upsert".to_string()))?;
    Ok(Json(profile))
}

/// `POST /api/profile/password`
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<PasswordChange>,
) -> Result<StatusCode> {
    AuthService::new(state.pool())
        .change_password(current.id, &body.current_password, &body.new_password)
        .await?;

    Ok(StatusCode::OK)
}

/// Keep only the final path component and replace anything outside a
/// conservative character set, so uploads cannot escape the media root.
fn sanitize_file_name(name: &str) -> String {
    let base = FsPath::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("avatar");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "avatar".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("photo.png"), "photo.png");
    }

    #[test]
    fn test_sanitize_file_name_replaces_odd_characters() {
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo__1_.png");
    }

    #[test]
    fn test_sanitize_file_name_rejects_dot_only_names() {
        assert_eq!(sanitize_file_name(".."), "avatar");
        assert_eq!(sanitize_file_name(""), "avatar");
    }
}
