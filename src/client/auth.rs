//! Login, registration and logout against the auth backend.
//!
//! The service owns the write path of the session token: a successful
//! exchange saves the token before returning, and logout clears it before
//! talking to the network. Whatever store is plugged in (file, memory, or the
//! per-request cookie slot) is therefore current the moment a call returns.

use super::http::{message_or, ApiClient, ApiError, RequestOptions};
use crate::{
    session::{Session, StoreError, TokenStore},
    token::User,
};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, sync::Arc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    Authentication { status: u16, message: String },
    #[error("Request aborted")]
    Aborted,
    #[error("Network error")]
    Network(#[source] ApiError),
    #[error("Invalid auth response: {0}")]
    Decode(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Aborted => Self::Aborted,
            ApiError::Decode(message) => Self::Decode(message),
            ApiError::Http {
                status, message, ..
            } => Self::Authentication { status, message },
            other => Self::Network(other),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

// Passwords stay out of logs and traces.
impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
    pub user: User,
}

/// Paths on the auth backend, relative to its base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthEndpoints {
    pub login: String,
    pub register: String,
    pub logout: String,
    pub send_code: String,
    pub verify_code: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login: "/api/auth/login".to_string(),
            register: "/api/auth/register".to_string(),
            logout: "/api/auth/logout".to_string(),
            send_code: "/api/auth/send-code".to_string(),
            verify_code: "/api/auth/verify-code".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    endpoints: AuthEndpoints,
    store: Arc<dyn TokenStore>,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("api", &self.api)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            endpoints: AuthEndpoints::default(),
            store,
        }
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Exchange credentials for a token and persist it.
    ///
    /// # Errors
    /// [`AuthError::Authentication`] on a non-2xx answer (server message or
    /// `"Login failed"`), [`AuthError::Aborted`] when cancelled, otherwise a
    /// transport or store error.
    pub async fn login(
        &self,
        credentials: &LoginRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<AuthResponse, AuthError> {
        let response = self
            .exchange(&self.endpoints.login, credentials, LOGIN_FAILED, cancel)
            .await?;
        self.store.save(&response.token)?;
        info!("Signed in as {}", response.user.username);
        Ok(response)
    }

    /// Create an account and persist the returned token.
    ///
    /// # Errors
    /// Same as [`AuthService::login`], with `"Registration failed"` as the
    /// default message.
    pub async fn register(
        &self,
        user_data: &RegisterRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<AuthResponse, AuthError> {
        let response = self
            .exchange(
                &self.endpoints.register,
                user_data,
                REGISTRATION_FAILED,
                cancel,
            )
            .await?;
        self.store.save(&response.token)?;
        info!("Registered {}", response.user.username);
        Ok(response)
    }

    /// Clear the local token, then tell the backend. The notification is
    /// best-effort: its failure is logged and otherwise ignored.
    ///
    /// # Errors
    /// Only when the local slot cannot be cleared.
    pub async fn logout(&self, cancel: Option<&CancellationToken>) -> Result<(), AuthError> {
        let token = self.store.load();
        self.store.clear()?;

        let options = RequestOptions::default()
            .bearer(token.as_deref())
            .cancel(cancel);
        match self
            .api
            .send_raw::<()>(Method::POST, &self.endpoints.logout, None, options)
            .await
        {
            Ok((status, _)) if status.is_success() => debug!("Backend acknowledged logout"),
            Ok((status, _)) => warn!("Backend logout returned {status}"),
            Err(err) => warn!("Backend logout notification failed: {err}"),
        }
        Ok(())
    }

    /// Forward a password-reset code request and return the backend's answer as-is.
    ///
    /// # Errors
    /// Only when no response arrives.
    pub async fn send_code(
        &self,
        body: &Value,
        cancel: Option<&CancellationToken>,
    ) -> Result<(StatusCode, Value), AuthError> {
        self.pass_through(&self.endpoints.send_code, body, cancel)
            .await
    }

    /// Forward a password-reset code check and return the backend's answer as-is.
    ///
    /// # Errors
    /// Only when no response arrives.
    pub async fn verify_code(
        &self,
        body: &Value,
        cancel: Option<&CancellationToken>,
    ) -> Result<(StatusCode, Value), AuthError> {
        self.pass_through(&self.endpoints.verify_code, body, cancel)
            .await
    }

    /// Session derived from the store as it is right now.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::resolve(self.store.as_ref())
    }

    async fn exchange<B: Serialize + fmt::Debug>(
        &self,
        path: &str,
        body: &B,
        default_message: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<AuthResponse, AuthError> {
        debug!("Auth exchange {path}: {body:?}");
        let options = RequestOptions::default().cancel(cancel);
        let (status, value) = self
            .api
            .send_raw(Method::POST, path, Some(body), options)
            .await?;
        if !status.is_success() {
            return Err(AuthError::Authentication {
                status: status.as_u16(),
                message: message_or(&value, default_message),
            });
        }
        serde_json::from_value(value).map_err(|err| AuthError::Decode(err.to_string()))
    }

    async fn pass_through(
        &self,
        path: &str,
        body: &Value,
        cancel: Option<&CancellationToken>,
    ) -> Result<(StatusCode, Value), AuthError> {
        let options = RequestOptions::default().cancel(cancel);
        Ok(self
            .api
            .send_raw(Method::POST, path, Some(body), options)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{is_authenticated, MemoryTokenStore};
    use crate::token::{issue, now_unix, Claims};
    use serde_json::{json, Map, Number};
    use std::time::Duration;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn token_for(username: &str, email: &str) -> String {
        let claims = Claims {
            sub: "u-1".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            iat: Some(Number::from(now_unix())),
            exp: Some(Number::from(now_unix() + 3600)),
            extra: Map::new(),
        };
        issue(&claims, b"backend-secret").unwrap_or_default()
    }

    fn service(server: &MockServer, store: Arc<MemoryTokenStore>) -> Result<AuthService, ApiError> {
        Ok(AuthService::new(ApiClient::new(&server.uri())?, store))
    }

    #[tokio::test]
    async fn login_persists_token_and_session_is_immediate() -> Result<(), Box<dyn std::error::Error>>
    {
        let server = MockServer::start().await;
        let token = token_for("ana", "ana@example.com");
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"username": "ana", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "ok",
                "token": token,
                "user": {"id": 1, "username": "ana", "email": "ana@example.com"}
            })))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let auth = service(&server, store.clone())?;
        let response = auth
            .login(
                &LoginRequest {
                    username: "ana".to_string(),
                    password: "pw".to_string(),
                },
                None,
            )
            .await?;

        assert_eq!(response.user.id, "1");
        assert_eq!(store.load().as_deref(), Some(token.as_str()));
        assert!(is_authenticated(store.as_ref()));
        let session = auth.session();
        assert!(session.is_authenticated);
        assert_eq!(
            session.user.map(|user| (user.username, user.email)),
            Some(("ana".to_string(), "ana@example.com".to_string()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn login_failure_carries_server_message() -> Result<(), ApiError> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
            )
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let auth = service(&server, store.clone())?;
        let credentials = LoginRequest {
            username: "ana".to_string(),
            password: "wrong".to_string(),
        };
        let err = auth.login(&credentials, None).await.err();
        assert!(matches!(
            err,
            Some(AuthError::Authentication { status: 401, ref message }) if message == "Bad credentials"
        ));
        assert_eq!(store.load(), None);
        Ok(())
    }

    #[tokio::test]
    async fn login_failure_defaults_message() -> Result<(), ApiError> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let auth = service(&server, Arc::new(MemoryTokenStore::new()))?;
        let credentials = LoginRequest {
            username: "ana".to_string(),
            password: "pw".to_string(),
        };
        let message = auth
            .login(&credentials, None)
            .await
            .err()
            .map(|err| err.to_string());
        assert_eq!(message.as_deref(), Some("Login failed"));
        Ok(())
    }

    #[tokio::test]
    async fn register_failure_defaults_message() -> Result<(), ApiError> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({})))
            .mount(&server)
            .await;

        let auth = service(&server, Arc::new(MemoryTokenStore::new()))?;
        let user_data = RegisterRequest {
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "pw".to_string(),
        };
        let err = auth.register(&user_data, None).await.err();
        assert!(matches!(
            err,
            Some(AuthError::Authentication { status: 409, ref message }) if message == "Registration failed"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn register_persists_token() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        let token = token_for("bia", "bia@example.com");
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_json(
                json!({"username": "bia", "email": "bia@example.com", "password": "pw"}),
            ))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "created",
                "token": token,
                "user": {"id": "u-1", "username": "bia", "email": "bia@example.com"}
            })))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let auth = service(&server, store.clone())?;
        let user_data = RegisterRequest {
            username: "bia".to_string(),
            email: "bia@example.com".to_string(),
            password: "pw".to_string(),
        };
        let response = auth.register(&user_data, None).await?;
        assert_eq!(response.message, "created");
        assert!(is_authenticated(store.as_ref()));
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_even_when_backend_is_down() -> Result<(), ApiError> {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .map(|addr| addr.port())
            .map_err(|err| ApiError::Request(err.to_string()))?;
        let store = Arc::new(MemoryTokenStore::with_token(token_for(
            "ana",
            "ana@example.com",
        )));
        assert!(is_authenticated(store.as_ref()));

        let auth = AuthService::new(
            ApiClient::new(&format!("http://127.0.0.1:{port}"))?,
            store.clone(),
        );
        assert!(auth.logout(None).await.is_ok());
        assert_eq!(store.load(), None);
        assert!(!is_authenticated(store.as_ref()));
        Ok(())
    }

    #[tokio::test]
    async fn logout_notifies_backend_with_old_token() -> Result<(), ApiError> {
        let server = MockServer::start().await;
        let token = token_for("ana", "ana@example.com");
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_token(token));
        let auth = service(&server, store.clone())?;
        assert!(auth.logout(None).await.is_ok());
        assert_eq!(store.load(), None);
        Ok(())
    }

    #[tokio::test]
    async fn cancelled_login_is_aborted_and_stores_nothing() -> Result<(), ApiError> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let auth = service(&server, store.clone())?;
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let credentials = LoginRequest {
            username: "ana".to_string(),
            password: "pw".to_string(),
        };
        let result = auth.login(&credentials, Some(&cancel)).await;
        assert!(matches!(result, Err(AuthError::Aborted)));
        assert_eq!(store.load(), None);
        Ok(())
    }

    #[tokio::test]
    async fn verify_code_passes_status_through() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/verify-code"))
            .and(body_json(json!({"email": "a@b.co", "code": "123456"})))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid code"})),
            )
            .mount(&server)
            .await;

        let auth = service(&server, Arc::new(MemoryTokenStore::new()))?;
        let (status, body) = auth
            .verify_code(&json!({"email": "a@b.co", "code": "123456"}), None)
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Invalid code"}));
        Ok(())
    }

    #[test]
    fn debug_output_hides_passwords() {
        let credentials = LoginRequest {
            username: "ana".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("ana"));
        assert!(!rendered.contains("hunter2"));
    }
}
