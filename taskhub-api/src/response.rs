/// Response envelopes
///
/// Every endpoint answers with
///
/// ```json
/// { "success": true, "data": ..., "message": "...", "count": 3 }
/// ```
///
/// where `data`, `message` and `count` are omitted when absent. Register and
/// login use [`AuthResponse`], which carries `token` and `user` at the top
/// level instead of under `data`.

use serde::Serialize;
use taskhub_shared::models::user::User;

/// Uniform JSON envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            count: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            count: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// A list with its length in `count`
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            success: true,
            data: Some(items),
            message: None,
            count: Some(count),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            count: None,
        }
    }
}

/// Register and login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub token: String,
    pub user: User,
}

impl AuthResponse {
    pub fn new(token: String, user: User) -> Self {
        Self {
            success: true,
            message: None,
            token,
            user,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_fields_are_omitted() {
        let json = serde_json::to_value(ApiResponse::message("Task deleted successfully")).unwrap();
        assert_eq!(json, json!({ "success": true, "message": "Task deleted successfully" }));
    }

    #[test]
    fn test_list_counts_items() {
        let json = serde_json::to_value(ApiResponse::list(vec![1, 2, 3])).unwrap();
        assert_eq!(json, json!({ "success": true, "data": [1, 2, 3], "count": 3 }));

        let json = serde_json::to_value(ApiResponse::<Vec<i32>>::list(vec![])).unwrap();
        assert_eq!(json["count"], 0);
        assert_eq!(json["data"], json!([]));
    }

    #[test]
    fn test_auth_response_hides_password_hash() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: chrono::Utc::now(),
        };

        let json = serde_json::to_value(AuthResponse::new("tok".to_string(), user)).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("message").is_none());
        assert_eq!(json["token"], "tok");
        assert_eq!(json["user"]["username"], "alice");
        assert!(json["user"].get("password_hash").is_none());
    }
}
