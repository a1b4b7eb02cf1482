//! Credential validation, the auth gate, and the login/logout handlers.

use axum::body::Body as AxumBody;
use axum::extract::{Extension, Form};
use axum::http::{Request, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::middleware;
use axum_extra::extract::{CookieJar, cookie::Cookie, cookie::SameSite};
use cookie::time::Duration as CookieDuration;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::SESSION_COOKIE_NAME;
use crate::error::ApiError;
use crate::pages;
use crate::session::SessionStore;

/// Credential pair and gate wiring, built once at startup.
#[derive(Debug)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    /// When set, `/uploads/{name}` is routed through the gate as well. Off by
    /// default: once a stored name is known the file is public.
    pub protect_downloads: bool,
}

impl AuthConfig {
    /// Case-sensitive equality against the configured pair. No hashing, no
    /// lockout; the credential is a single fixed pair.
    pub fn validate(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Username resolved by the auth gate, passed to handlers through request
/// extensions rather than ambient state.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);

/// Auth gate: guarded routes continue only with a live session; anonymous
/// requests are redirected to the login page.
pub async fn auth_gate(
    Extension(auth): Extension<Arc<AuthConfig>>,
    Extension(sessions): Extension<Arc<SessionStore>>,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: middleware::Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path();
    if !is_guarded_path(path, auth.protect_downloads) {
        return Ok(next.run(req).await);
    }

    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME)
        && let Some(user) = sessions.user_for(cookie.value()).await
    {
        req.extensions_mut().insert(CurrentUser(user));
        return Ok(next.run(req).await);
    }

    Err(ApiError::LoginRequired)
}

fn is_guarded_path(path: &str, protect_downloads: bool) -> bool {
    if path == "/upload" || path == "/list" || path.starts_with("/delete/") {
        return true;
    }
    protect_downloads && path.starts_with("/uploads/")
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    username: String,
    password: String,
}

/// Login handler: validates the submitted pair, creates a session, and sets
/// the cookie. Failure renders an inline retry page; no session is created.
pub async fn login(
    Extension(auth): Extension<Arc<AuthConfig>>,
    Extension(sessions): Extension<Arc<SessionStore>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Response), ApiError> {
    if !auth.validate(&form.username, &form.password) {
        warn!(username = %form.username, "login rejected");
        return Ok((
            jar,
            (StatusCode::UNAUTHORIZED, Html(pages::login_failed())).into_response(),
        ));
    }

    let token = sessions.create(&form.username).await;
    info!(username = %form.username, "login accepted");

    let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(sessions.ttl().as_secs() as i64))
        .build();
    Ok((jar.add(cookie), Redirect::to("/").into_response()))
}

/// Logout handler: destroys the session if one exists and clears the cookie.
/// Harmless to call without a session.
pub async fn logout(
    Extension(sessions): Extension<Arc<SessionStore>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        sessions.destroy(cookie.value()).await;
        info!("session destroyed");
    }

    (
        jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/").build()),
        Redirect::to("/login"),
    )
}
