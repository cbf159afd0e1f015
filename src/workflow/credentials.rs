// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login, federated sign-in, password reset, sign-out.
//!
//! Provider errors are shown verbatim; only the "account exists with a
//! different credential" case gets its own wording.

use super::{Navigation, PageContext, Route};
use crate::error::AppError;
use crate::services::{AuthRedirect, FederatedCredential, FederatedProvider};
use serde::Deserialize;
use validator::Validate;

pub const REGISTERED: &str =
    "Registration successful! Please check your inbox to verify your email.";
pub const VERIFY_FIRST: &str = "Please verify your email before logging in.";
pub const ACCOUNT_EXISTS: &str =
    "An account already exists with this email. Try signing in with the original method.";
pub const RESET_SENT: &str = "Password reset link sent! Check your email.";
pub const SIGN_IN_EXPIRED: &str = "Your sign-in attempt expired. Please try again.";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "Please enter your name."))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Please enter a password."))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Please enter a password."))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordResetForm {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
}

/// Show the first validation failure as a form error.
fn check_form<T: Validate>(ctx: &PageContext, form: &T) -> Result<(), AppError> {
    match form.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "Please check the form and try again.".to_string());
            ctx.surface.show_message(&message, true);
            Err(AppError::BadRequest(message))
        }
    }
}

/// Create the identity, set its display name, then request verification.
///
/// The new account is not signed in here; verification happens out-of-band.
pub async fn register(ctx: &PageContext, form: &RegisterForm) -> Result<(), AppError> {
    check_form(ctx, form)?;

    let identity = &ctx.backends.identity;
    let result = async {
        let session = identity.create_account(&form.email, &form.password).await?;
        identity.update_display_name(&session, &form.name).await?;
        identity.send_verification_email(&session).await?;
        Ok::<_, AppError>(session)
    }
    .await;

    match result {
        Ok(session) => {
            tracing::info!(uid = %session.uid, "Registration complete, verification sent");
            ctx.surface.show_message(REGISTERED, false);
            ctx.surface.reset_form();
            Ok(())
        }
        Err(e) => {
            ctx.surface.show_message(&e.user_message(), true);
            Err(e)
        }
    }
}

/// Sign in with email and password; unverified accounts are signed out again.
pub async fn login(ctx: &PageContext, form: &LoginForm) -> Result<(), AppError> {
    check_form(ctx, form)?;

    let session = match ctx
        .backends
        .identity
        .sign_in(&form.email, &form.password)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            ctx.surface.show_message(&e.user_message(), true);
            return Err(e);
        }
    };

    if !session.email_verified {
        tracing::info!(uid = %session.uid, "Login refused: email not verified");
        ctx.surface.show_message(VERIFY_FIRST, true);
        ctx.session.publish(None);
        return Ok(());
    }

    tracing::info!(uid = %session.uid, "Signed in");
    ctx.session.publish(Some(session));
    ctx.surface.navigate(Navigation::assign(Route::Home));
    Ok(())
}

/// Ask the identity service where to send the browser for `provider`.
///
/// The provider returns to `continue_uri`; that URL and the returned
/// `session_id` later form the [`FederatedCredential`].
pub async fn begin_federated_sign_in(
    ctx: &PageContext,
    provider: FederatedProvider,
    continue_uri: &str,
) -> Result<AuthRedirect, AppError> {
    match ctx
        .backends
        .identity
        .create_auth_uri(provider, continue_uri)
        .await
    {
        Ok(redirect) => {
            tracing::debug!(provider = provider.provider_id(), "Federated sign-in started");
            Ok(redirect)
        }
        Err(e) => {
            ctx.surface.show_message(&e.user_message(), true);
            Err(e)
        }
    }
}

/// Sign in through an OAuth provider (Google or GitHub).
pub async fn federated_sign_in(
    ctx: &PageContext,
    credential: &FederatedCredential,
) -> Result<(), AppError> {
    match ctx
        .backends
        .identity
        .sign_in_with_provider(credential)
        .await
    {
        Ok(session) => {
            tracing::info!(
                uid = %session.uid,
                provider = credential.provider.provider_id(),
                "Signed in with provider"
            );
            ctx.session.publish(Some(session));
            ctx.surface.navigate(Navigation::assign(Route::Home));
            Ok(())
        }
        Err(e) => {
            if e.is_account_exists_with_different_credential() {
                ctx.surface.show_message(ACCOUNT_EXISTS, true);
            } else {
                ctx.surface.show_message(&e.user_message(), true);
            }
            Err(e)
        }
    }
}

/// Report a provider return that matches no started sign-in.
pub fn federated_sign_in_expired(ctx: &PageContext) -> AppError {
    tracing::info!("Federated sign-in returned without a pending attempt");
    ctx.surface.show_message(SIGN_IN_EXPIRED, true);
    AppError::Precondition(SIGN_IN_EXPIRED.to_string())
}

pub async fn request_password_reset(
    ctx: &PageContext,
    form: &PasswordResetForm,
) -> Result<(), AppError> {
    check_form(ctx, form)?;

    match ctx.backends.identity.send_password_reset(&form.email).await {
        Ok(()) => {
            ctx.surface.show_message(RESET_SENT, false);
            Ok(())
        }
        Err(e) => {
            ctx.surface.show_message(&e.user_message(), true);
            Err(e)
        }
    }
}

/// End the session and leave the authenticated area.
pub fn sign_out(ctx: &PageContext) {
    if let Some(session) = ctx.current_session() {
        tracing::info!(uid = %session.uid, "Signed out");
    }
    ctx.session.publish(None);
    ctx.surface.navigate(Navigation::replace(Route::Login));
}
