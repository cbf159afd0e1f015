// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use yourverse::config::Config;
use yourverse::db::{FirestoreDb, MemoryProfileStore};
use yourverse::error::{AppError, ProviderError};
use yourverse::models::Session;
use yourverse::routes::create_router;
use yourverse::services::{
    AuthRedirect, FederatedCredential, FederatedProvider, FirebaseTokenVerifier, IdentityService,
    MemoryMediaStorage, RefreshedTokens,
};
use yourverse::workflow::{Backends, EffectLog, Microphone, PageContext};
use yourverse::AppState;

pub const TEST_PROJECT: &str = "test-project";
const TEST_KID: &str = "test-kid";
const TEST_SECRET: &[u8] = b"integration-test-secret";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new(TEST_PROJECT)
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Sign an ID token the test verifier accepts.
#[allow(dead_code)]
pub fn sign_token(uid: &str, email: &str, verified: bool, name: Option<&str>) -> String {
    sign_token_expiring(uid, email, verified, name, 3600)
}

/// Correctly signed token for `uid` whose `exp` passed an hour ago.
#[allow(dead_code)]
pub fn sign_expired_token(uid: &str) -> String {
    sign_token_expiring(uid, &format!("{uid}@example.com"), true, Some("Ada"), -3600)
}

fn sign_token_expiring(
    uid: &str,
    email: &str,
    verified: bool,
    name: Option<&str>,
    expires_in: i64,
) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let claims = json!({
        "iss": format!("https://securetoken.google.com/{TEST_PROJECT}"),
        "aud": TEST_PROJECT,
        "sub": uid,
        "iat": now - 7200,
        "exp": now + expires_in,
        "auth_time": now - 7200,
        "email": email,
        "email_verified": verified,
        "name": name,
    });
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(TEST_KID.to_string());
    encode(&header, &claims, &EncodingKey::from_secret(TEST_SECRET)).unwrap()
}

/// Verifier matching [`sign_token`].
#[allow(dead_code)]
pub fn test_verifier() -> FirebaseTokenVerifier {
    FirebaseTokenVerifier::new_with_static_key(
        TEST_PROJECT,
        TEST_KID,
        Algorithm::HS256,
        DecodingKey::from_secret(TEST_SECRET),
    )
    .unwrap()
}

/// A verified session for `uid` with a valid signed token.
#[allow(dead_code)]
pub fn session(uid: &str) -> Session {
    let email = format!("{uid}@example.com");
    Session {
        uid: uid.to_string(),
        email: Some(email.clone()),
        display_name: Some("Ada".to_string()),
        email_verified: true,
        id_token: sign_token(uid, &email, true, Some("Ada")),
        refresh_token: Some(refresh_token_for(uid)),
    }
}

/// Refresh token [`FakeIdentity`] accepts for `uid`.
#[allow(dead_code)]
pub fn refresh_token_for(uid: &str) -> String {
    format!("refresh-{uid}")
}

#[derive(Debug, Clone)]
struct FakeUser {
    uid: String,
    password: String,
    display_name: Option<String>,
    verified: bool,
}

/// Identity provider double. Records every call in order and fails any
/// method configured with [`FakeIdentity::fail_on`].
#[derive(Default)]
pub struct FakeIdentity {
    users: Mutex<HashMap<String, FakeUser>>,
    calls: Mutex<Vec<String>>,
    federated_requests: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, ProviderError>>,
}

#[allow(dead_code)]
impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing account.
    pub fn add_user(&self, uid: &str, email: &str, password: &str, verified: bool) {
        self.users.lock().unwrap().insert(
            email.to_string(),
            FakeUser {
                uid: uid.to_string(),
                password: password.to_string(),
                display_name: None,
                verified,
            },
        );
    }

    pub fn display_name(&self, email: &str) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .get(email)
            .and_then(|u| u.display_name.clone())
    }

    pub fn has_user(&self, email: &str) -> bool {
        self.users.lock().unwrap().contains_key(email)
    }

    /// Method names called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// `requestUri` values passed to federated sign-in.
    pub fn federated_requests(&self) -> Vec<String> {
        self.federated_requests.lock().unwrap().clone()
    }

    pub fn fail_on(&self, method: &'static str, code: &str) {
        self.failures.lock().unwrap().insert(
            method,
            ProviderError::new(code, format!("Firebase: Error ({code}).")),
        );
    }

    fn enter(&self, method: &'static str) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(method.to_string());
        match self.failures.lock().unwrap().get(method) {
            Some(e) => Err(AppError::Provider(e.clone())),
            None => Ok(()),
        }
    }

    fn session_for(&self, email: &str, user: &FakeUser) -> Session {
        Session {
            uid: user.uid.clone(),
            email: Some(email.to_string()),
            display_name: user.display_name.clone(),
            email_verified: user.verified,
            id_token: sign_token(&user.uid, email, user.verified, user.display_name.as_deref()),
            refresh_token: Some(refresh_token_for(&user.uid)),
        }
    }
}

#[async_trait]
impl IdentityService for FakeIdentity {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, AppError> {
        self.enter("create_account")?;
        let mut users = self.users.lock().unwrap();
        if users.contains_key(email) {
            return Err(AppError::provider(
                "auth/email-already-in-use",
                "Firebase: Error (auth/email-already-in-use).",
            ));
        }
        let user = FakeUser {
            uid: format!("uid-{}", users.len() + 1),
            password: password.to_string(),
            display_name: None,
            verified: false,
        };
        users.insert(email.to_string(), user.clone());
        Ok(self.session_for(email, &user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        self.enter("sign_in")?;
        let users = self.users.lock().unwrap();
        match users.get(email) {
            Some(user) if user.password == password => Ok(self.session_for(email, user)),
            _ => Err(AppError::provider(
                "auth/invalid-credential",
                "Firebase: Error (auth/invalid-credential).",
            )),
        }
    }

    async fn sign_in_with_provider(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Session, AppError> {
        self.enter("sign_in_with_provider")?;
        self.federated_requests
            .lock()
            .unwrap()
            .push(credential.request_uri.clone());
        let email = format!("{}@federated.example.com", credential.session_id);
        let user = FakeUser {
            uid: format!("fed-{}", credential.session_id),
            password: String::new(),
            display_name: Some("Grace".to_string()),
            verified: true,
        };
        self.users
            .lock()
            .unwrap()
            .insert(email.clone(), user.clone());
        Ok(self.session_for(&email, &user))
    }

    async fn create_auth_uri(
        &self,
        provider: FederatedProvider,
        _continue_uri: &str,
    ) -> Result<AuthRedirect, AppError> {
        self.enter("create_auth_uri")?;
        let name = provider.as_str();
        Ok(AuthRedirect {
            auth_uri: format!("https://accounts.example.com/{name}?session=sess-{name}"),
            session_id: format!("sess-{name}"),
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<RefreshedTokens, AppError> {
        self.enter("refresh_session")?;
        let Some(uid) = refresh_token.strip_prefix("refresh-") else {
            return Err(AppError::provider(
                "auth/invalid-user-token",
                "Firebase: Error (auth/invalid-user-token).",
            ));
        };
        Ok(RefreshedTokens {
            id_token: sign_token(uid, &format!("{uid}@example.com"), true, Some("Ada")),
            refresh_token: refresh_token_for(uid),
        })
    }

    async fn update_display_name(
        &self,
        session: &Session,
        display_name: &str,
    ) -> Result<(), AppError> {
        self.enter("update_display_name")?;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.values_mut().find(|u| u.uid == session.uid) {
            user.display_name = Some(display_name.to_string());
        }
        Ok(())
    }

    async fn send_verification_email(&self, _session: &Session) -> Result<(), AppError> {
        self.enter("send_verification_email")
    }

    async fn send_password_reset(&self, _email: &str) -> Result<(), AppError> {
        self.enter("send_password_reset")
    }

    async fn delete_account(&self, session: &Session) -> Result<(), AppError> {
        self.enter("delete_account")?;
        self.users
            .lock()
            .unwrap()
            .retain(|_, u| u.uid != session.uid);
        Ok(())
    }
}

/// Microphone that grants or refuses every request.
#[allow(dead_code)]
pub struct FakeMicrophone {
    pub granted: bool,
}

#[async_trait]
impl Microphone for FakeMicrophone {
    async fn request_access(&self) -> Result<(), AppError> {
        if self.granted {
            Ok(())
        } else {
            Err(AppError::Precondition("NotAllowedError".to_string()))
        }
    }
}

/// In-memory collaborators plus handles for inspecting them.
#[allow(dead_code)]
pub struct Harness {
    pub identity: Arc<FakeIdentity>,
    pub profiles: MemoryProfileStore,
    pub media: MemoryMediaStorage,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self {
            identity: Arc::new(FakeIdentity::new()),
            profiles: MemoryProfileStore::new(),
            media: MemoryMediaStorage::new(),
        }
    }

    pub fn backends(&self) -> Backends {
        Backends {
            identity: self.identity.clone(),
            profiles: Arc::new(self.profiles.clone()),
            media: Arc::new(self.media.clone()),
        }
    }

    /// Page context with no session.
    pub fn page(&self, log: &Arc<EffectLog>) -> PageContext {
        PageContext::new(self.backends(), log.clone())
    }

    /// Page context signed in as `session`.
    pub fn signed_in(&self, log: &Arc<EffectLog>, session: Session) -> PageContext {
        PageContext::with_session(self.backends(), log.clone(), session)
    }
}

/// Create a test app over in-memory backends.
/// Returns the router, the shared state, and the backend handles.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Harness) {
    create_test_app_with(|_| {})
}

/// Like [`create_test_app`], with the config adjusted first.
#[allow(dead_code)]
pub fn create_test_app_with(
    configure: impl FnOnce(&mut Config),
) -> (axum::Router, Arc<AppState>, Harness) {
    let harness = Harness::new();

    let mut config = Config::test_default();
    config.static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("web");
    configure(&mut config);

    let state = Arc::new(AppState {
        config,
        backends: harness.backends(),
        verifier: Arc::new(test_verifier()),
    });

    (create_router(state.clone()), state, harness)
}
