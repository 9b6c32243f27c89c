//! Profile wire shapes.

use serde::{Deserialize, Serialize};

use super::catalog::ImageView;

/// Profile payload returned by and accepted on the profile endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<ImageView>,
}

/// Body of a profile update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// Body of a password change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_view_wire_shape() {
        let view = ProfileView {
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "0".to_string(),
            avatar: Some(ImageView {
                src: Some("/media/avatars/1/pic.png".to_string()),
                alt: "avatar".to_string(),
            }),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["fullName"], "Jane Doe");
        assert_eq!(json["avatar"]["src"], "/media/avatars/1/pic.png");
    }

    #[test]
    fn test_profile_update_parses_camel_case() {
        let update: ProfileUpdate = serde_json::from_str(
            r#"{"fullName": "Jane Doe", "email": "jane@example.com", "phone": "555"}"#,
        )
        .unwrap();
        assert_eq!(update.full_name, "Jane Doe");
    }
}
