// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - hosted identity and media backends.

pub mod cloudinary;
pub mod firebase_auth;
pub mod id_token;
pub mod identity;
pub mod storage;

pub use cloudinary::CloudinaryClient;
pub use firebase_auth::FirebaseAuthClient;
pub use id_token::{FirebaseTokenVerifier, TokenError};
pub use identity::{
    AuthRedirect, FederatedCredential, FederatedProvider, IdentityService, RefreshedTokens,
    SessionState,
};
pub use storage::{FirebaseStorageClient, MediaStorage, MemoryMediaStorage};
