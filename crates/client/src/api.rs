//! HTTP client for the Velithra backend.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use velithra_auth::{Role, Session};
use velithra_modules::{BackendModule, ModuleStatusPayload};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const MODULES_PATH: &str = "/api/modules";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Status(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// HTTP status for errors the backend answered; `None` if it never did.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status(code, _) => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Login/register response body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl AuthResponse {
    pub fn into_session(self) -> Session {
        let session = Session::new(self.user_name, self.email, self.roles);
        match self.token {
            Some(token) => session.with_access_token(token),
            None => session,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        send(self.http.post(self.url(LOGIN_PATH)).json(&body)).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        send(self.http.post(self.url(REGISTER_PATH)).json(request)).await
    }

    /// Module-status list; accepts both bare and `{ "data": [...] }` bodies.
    pub async fn fetch_modules(&self, token: Option<&str>) -> Result<Vec<BackendModule>, ApiError> {
        let payload: ModuleStatusPayload =
            send(with_token(self.http.get(self.url(MODULES_PATH)), token)).await?;
        Ok(payload.into_modules())
    }

    pub async fn get_json(&self, path: &str, token: Option<&str>) -> Result<serde_json::Value, ApiError> {
        send(with_token(self.http.get(self.url(path)), token)).await
    }
}

fn with_token(req: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => req.bearer_auth(token),
        None => req,
    }
}

async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ApiError> {
    let resp = req.send().await.map_err(|e| ApiError::Network(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(ApiError::Status(
            resp.status().as_u16(),
            resp.text().await.unwrap_or_default(),
        ));
    }

    resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_becomes_session() {
        let raw = r#"{"token":"t-1","userName":"hana","email":"hana@velithra.io","roles":["HR","HR","Employee"]}"#;
        let resp: AuthResponse = serde_json::from_str(raw).unwrap();

        let session = resp.into_session();

        assert_eq!(session.user_name, "hana");
        assert_eq!(session.roles, vec![Role::HR, Role::EMPLOYEE]);
        assert_eq!(session.access_token.as_deref(), Some("t-1"));
    }

    #[test]
    fn missing_roles_and_token_are_tolerated() {
        let resp: AuthResponse =
            serde_json::from_str(r#"{"userName":"u","email":"u@velithra.io"}"#).unwrap();
        let session = resp.into_session();
        assert!(session.roles.is_empty());
        assert_eq!(session.access_token, None);
    }

    #[test]
    fn only_status_errors_carry_a_code() {
        assert_eq!(ApiError::Status(401, "Unauthorized".to_string()).status(), Some(401));
        assert_eq!(ApiError::Network("refused".to_string()).status(), None);
        assert_eq!(ApiError::Parse("eof".to_string()).status(), None);
    }

    #[test]
    fn urls_join_with_single_slash() {
        let api = ApiClient::new("http://localhost:5000/");
        assert_eq!(api.url("/api/modules"), "http://localhost:5000/api/modules");
        assert_eq!(api.url("api/user"), "http://localhost:5000/api/user");
    }

    #[test]
    fn register_request_uses_camel_case() {
        let body = serde_json::to_value(RegisterRequest {
            user_name: "sam".to_string(),
            email: "sam@velithra.io".to_string(),
            password: "pw".to_string(),
        })
        .unwrap();
        assert_eq!(body["userName"], "sam");
    }
}
