// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Authentication client over the Identity Toolkit REST API.
//!
//! Handles:
//! - Email/password sign-up and sign-in
//! - Federated sign-in (Google, GitHub) via `createAuthUri` + `signInWithIdp`
//! - ID token renewal via the Secure Token API
//! - Display name updates, verification and password reset emails
//! - Account deletion
//!
//! REST error codes are translated to the SDK-style `auth/...` codes the
//! workflow branches on, with the SDK's human-readable message format.

use crate::error::AppError;
use crate::models::Session;
use crate::services::identity::{
    AuthRedirect, FederatedCredential, FederatedProvider, IdentityService, RefreshedTokens,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

/// Identity Toolkit client.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    api_key: String,
}

impl FirebaseAuthClient {
    /// Create a client for the hosted service.
    ///
    /// For local development with emulator, set FIREBASE_AUTH_EMULATOR_HOST.
    pub fn new(api_key: String) -> Self {
        match std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
            Ok(host) => {
                tracing::info!(host = %host, "Using Firebase Auth emulator");
                let mut client = Self::with_base_url(
                    api_key,
                    format!("http://{}/identitytoolkit.googleapis.com/v1", host),
                );
                client.token_url = format!("http://{}/securetoken.googleapis.com/v1/token", host);
                client
            }
            Err(_) => {
                let mut client = Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string());
                client.token_url = DEFAULT_TOKEN_URL.to_string();
                client
            }
        }
    }

    /// Create a client against an explicit endpoint (tests, proxies). Token
    /// renewal goes to `{base_url}/token`.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            token_url: format!("{}/token", base_url),
            base_url,
            api_key,
        }
    }

    /// POST a JSON body to `accounts:{method}` and parse the response.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/accounts:{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::provider("auth/network-request-failed", e.to_string()))?;

        parse_response(method, response).await
    }

    /// Resolve full account info (verification flag, display name) for a token.
    async fn lookup(&self, id_token: &str) -> Result<Session, AppError> {
        let response: LookupResponse = self.call("lookup", &json!({ "idToken": id_token })).await?;
        let user = response.users.into_iter().next().ok_or_else(|| {
            AppError::provider(
                "auth/user-not-found",
                "Firebase: Error (auth/user-not-found).",
            )
        })?;

        Ok(Session {
            uid: user.local_id,
            email: user.email,
            display_name: user.display_name,
            email_verified: user.email_verified,
            id_token: id_token.to_string(),
            refresh_token: None,
        })
    }
}

#[async_trait]
impl IdentityService for FirebaseAuthClient {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let response: TokenResponse = self
            .call(
                "signUp",
                &json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;

        tracing::info!(uid = %response.local_id, "Account created");
        Ok(response.into_session(false))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let response: TokenResponse = self
            .call(
                "signInWithPassword",
                &json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;

        // The sign-in response does not carry emailVerified.
        let mut session = self.lookup(&response.id_token).await?;
        session.refresh_token = response.refresh_token;
        Ok(session)
    }

    async fn create_auth_uri(
        &self,
        provider: FederatedProvider,
        continue_uri: &str,
    ) -> Result<AuthRedirect, AppError> {
        let response: AuthUriResponse = self
            .call(
                "createAuthUri",
                &json!({
                    "providerId": provider.provider_id(),
                    "continueUri": continue_uri,
                }),
            )
            .await?;

        match (response.auth_uri, response.session_id) {
            (Some(auth_uri), Some(session_id)) => Ok(AuthRedirect {
                auth_uri,
                session_id,
            }),
            _ => {
                tracing::warn!(
                    provider = provider.provider_id(),
                    "createAuthUri returned no authorization URL"
                );
                Err(AppError::provider(
                    "auth/operation-not-allowed",
                    sdk_message("auth/operation-not-allowed"),
                ))
            }
        }
    }

    async fn sign_in_with_provider(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Session, AppError> {
        let provider_id = credential.provider.provider_id();

        let response: IdpResponse = self
            .call(
                "signInWithIdp",
                &json!({
                    "requestUri": credential.request_uri,
                    "sessionId": credential.session_id,
                    "returnSecureToken": true,
                    "returnIdpCredential": true,
                }),
            )
            .await?;

        if response.need_confirmation {
            return Err(AppError::provider(
                AppError::ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL,
                sdk_message(AppError::ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL),
            ));
        }

        let id_token = response.id_token.ok_or_else(|| {
            AppError::provider(
                "auth/internal-error",
                "Firebase: Error (auth/internal-error).",
            )
        })?;

        tracing::info!(provider = provider_id, uid = %response.local_id, "Federated sign-in");

        Ok(Session {
            uid: response.local_id,
            email: response.email,
            display_name: response.display_name,
            email_verified: response.email_verified,
            id_token,
            refresh_token: response.refresh_token,
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<RefreshedTokens, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::provider("auth/network-request-failed", e.to_string()))?;

        let tokens: SecureTokenResponse = parse_response("token", response).await?;
        tracing::debug!(uid = %tokens.user_id, "ID token refreshed");

        Ok(RefreshedTokens {
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
        })
    }

    async fn update_display_name(
        &self,
        session: &Session,
        display_name: &str,
    ) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .call(
                "update",
                &json!({
                    "idToken": session.id_token,
                    "displayName": display_name,
                    "returnSecureToken": false,
                }),
            )
            .await?;
        Ok(())
    }

    async fn send_verification_email(&self, session: &Session) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &json!({ "requestType": "VERIFY_EMAIL", "idToken": session.id_token }),
            )
            .await?;
        tracing::debug!(uid = %session.uid, "Verification email requested");
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await?;
        Ok(())
    }

    async fn delete_account(&self, session: &Session) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .call("delete", &json!({ "idToken": session.id_token }))
            .await?;
        tracing::info!(uid = %session.uid, "Identity deleted");
        Ok(())
    }
}

/// Parse a JSON success body, or translate the REST error body.
async fn parse_response<T: DeserializeOwned>(
    method: &str,
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(method, %status, "Identity call failed");
        return Err(map_rest_error(&body));
    }

    response.json().await.map_err(|e| {
        AppError::provider("auth/internal-error", format!("JSON parse error: {}", e))
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_session(self, email_verified: bool) -> Session {
        Session {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name.filter(|n| !n.is_empty()),
            email_verified,
            id_token: self.id_token,
            refresh_token: self.refresh_token,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthUriResponse {
    auth_uri: Option<String>,
    session_id: Option<String>,
}

/// Secure Token API response; unlike Identity Toolkit it uses snake_case.
#[derive(Debug, Deserialize)]
struct SecureTokenResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdpResponse {
    #[serde(default)]
    local_id: String,
    id_token: Option<String>,
    email: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    need_confirmation: bool,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestErrorBody {
    error: RestError,
}

#[derive(Debug, Deserialize)]
struct RestError {
    message: String,
}

/// Translate an Identity Toolkit error body into an `auth/...` provider error.
fn map_rest_error(body: &str) -> AppError {
    let raw = serde_json::from_str::<RestErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_default();

    // Messages look like "CODE" or "CODE : detail".
    let rest_code = raw.split(" : ").next().unwrap_or("").trim();

    let code = match rest_code {
        "EMAIL_EXISTS" => "auth/email-already-in-use",
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" => "auth/invalid-credential",
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => "auth/user-not-found",
        "USER_DISABLED" => "auth/user-disabled",
        "WEAK_PASSWORD" => "auth/weak-password",
        "INVALID_EMAIL" => "auth/invalid-email",
        "MISSING_PASSWORD" => "auth/missing-password",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "auth/too-many-requests",
        "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => AppError::REQUIRES_RECENT_LOGIN,
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" => "auth/user-token-expired",
        "INVALID_REFRESH_TOKEN" | "INVALID_GRANT_TYPE" | "MISSING_REFRESH_TOKEN" => {
            "auth/invalid-user-token"
        }
        "FEDERATED_USER_ID_ALREADY_LINKED" => "auth/credential-already-in-use",
        "OPERATION_NOT_ALLOWED" => "auth/operation-not-allowed",
        _ => "auth/internal-error",
    };

    if code == "auth/internal-error" {
        tracing::warn!(rest_code, "Unmapped Identity Toolkit error");
    }

    AppError::provider(code, sdk_message(code))
}

fn sdk_message(code: &str) -> String {
    format!("Firebase: Error ({}).", code)
}
