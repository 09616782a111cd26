//! Browser facing routes, authenticated with the session cookie.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{debug, error, info};

use super::api::catch_response;
use super::session::{Session, COOKIE_SESSION_TOKEN_KEY};
use super::state::{GuardedCatchWorkflow, GuardedCollectionManager, GuardedUserManager, ServerState};
use super::views::{self, Flash};
use crate::errors::PokeError;
use crate::messages;
use crate::user::{normalize_email, AuthTokenValue};

const FLASH_NOTICE_COOKIE: &str = "flash_notice";
const FLASH_ALERT_COOKIE: &str = "flash_alert";
const SESSION_MAX_AGE_DAYS: i64 = 14;

const RELEASE_NOT_FOUND_ALERT: &str = "Couldn't find that Pokémon in your collection.";
const LOGIN_NOT_FOUND_ALERT: &str = "Email not found. Please check your email address.";

fn flash_cookie(name: &'static str, message: &str) -> Cookie<'static> {
    Cookie::build((name, urlencoding::encode(message).into_owned()))
        .path("/")
        .http_only(true)
        .into()
}

fn with_notice(jar: CookieJar, message: &str) -> CookieJar {
    jar.add(flash_cookie(FLASH_NOTICE_COOKIE, message))
}

fn with_alert(jar: CookieJar, message: &str) -> CookieJar {
    jar.add(flash_cookie(FLASH_ALERT_COOKIE, message))
}

/// Reads the pending flash messages and clears them, so each is shown once.
fn take_flash(jar: CookieJar) -> (CookieJar, Flash) {
    let read = |name: &str| {
        jar.get(name).map(|c| {
            urlencoding::decode(c.value())
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| c.value().to_string())
        })
    };
    let flash = Flash {
        notice: read(FLASH_NOTICE_COOKIE),
        alert: read(FLASH_ALERT_COOKIE),
    };
    let jar = jar
        .remove(Cookie::build(FLASH_NOTICE_COOKIE).path("/"))
        .remove(Cookie::build(FLASH_ALERT_COOKIE).path("/"));
    (jar, flash)
}

async fn up() -> &'static str {
    "OK"
}

async fn random_pokemon_page(
    State(workflow): State<GuardedCatchWorkflow>,
    _session: Session,
    jar: CookieJar,
) -> Response {
    let (jar, mut flash) = take_flash(jar);
    let pokemon = match workflow.random_pokemon().await {
        Ok(pokemon) => Some(pokemon),
        Err(e) => {
            info!("Random lookup failed: {}", e);
            flash.alert = Some(e.to_string());
            None
        }
    };
    (jar, Html(views::random_page(pokemon.as_ref(), &flash))).into_response()
}

async fn catch_pokemon(
    State(workflow): State<GuardedCatchWorkflow>,
    session: Session,
    Path(identifier): Path<String>,
) -> Response {
    catch_response(workflow.attempt_catch(session.user_id, &identifier).await)
}

async fn collection_page(
    State(collection): State<GuardedCollectionManager>,
    session: Session,
    jar: CookieJar,
) -> Response {
    let (jar, flash) = take_flash(jar);
    match collection.list(session.user_id) {
        Ok(caught) => (jar, Html(views::collection_page(&caught, &flash))).into_response(),
        Err(e) => {
            error!("Failed to list collection of user {}: {}", session.user_id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn release_pokemon(
    State(collection): State<GuardedCollectionManager>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let result = match id.parse::<usize>() {
        Ok(id) => collection.release(session.user_id, id),
        Err(_) => Err(PokeError::NotFound(RELEASE_NOT_FOUND_ALERT.to_string())),
    };
    let jar = match result {
        Ok(released) => with_notice(jar, &messages::released_message(&released.pokemon.name)),
        Err(PokeError::NotFound(_)) => with_alert(jar, RELEASE_NOT_FOUND_ALERT),
        Err(e) => {
            error!("Failed to release {} for user {}: {}", id, session.user_id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    (jar, Redirect::to("/caught")).into_response()
}

async fn login_page(session: Option<Session>, jar: CookieJar) -> Response {
    if session.is_some() {
        return Redirect::to("/").into_response();
    }
    let (jar, flash) = take_flash(jar);
    (jar, Html(views::login_page(&flash))).into_response()
}

#[derive(Deserialize, Debug)]
struct LoginForm {
    #[serde(default)]
    email: String,
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = normalize_email(&form.email);
    let user = match user_manager.find_user_by_email(&email) {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!("Login attempt for unknown email {:?}", email);
            let flash = Flash {
                alert: Some(LOGIN_NOT_FOUND_ALERT.to_string()),
                ..Default::default()
            };
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(views::login_page(&flash)),
            )
                .into_response();
        }
        Err(e) => {
            error!("Failed to look up user {}: {}", email, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let auth_token = match user_manager.generate_auth_token(user.id) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to create session for user {}: {}", user.id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    info!("User {} logged in", user.id);

    let session_cookie = Cookie::build((COOKIE_SESSION_TOKEN_KEY, auth_token.value.0))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_MAX_AGE_DAYS));
    let jar = with_notice(jar.add(session_cookie), &format!("Welcome back, {}!", user.email));
    (jar, Redirect::to("/")).into_response()
}

async fn logout(
    State(user_manager): State<GuardedUserManager>,
    session: Option<Session>,
    jar: CookieJar,
) -> Response {
    if let Some(session) = session {
        if let Err(e) = user_manager.delete_auth_token(&AuthTokenValue(session.token)) {
            error!("Failed to delete session of user {}: {}", session.user_id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }
    let jar = jar.remove(Cookie::build(COOKIE_SESSION_TOKEN_KEY).path("/"));
    let jar = with_notice(jar, "You have been logged out.");
    (jar, Redirect::to("/login")).into_response()
}

pub fn make_web_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(random_pokemon_page))
        .route("/up", get(up))
        .route("/pokemon/random", get(random_pokemon_page))
        .route("/pokemon/{identifier}/catch", post(catch_pokemon))
        .route("/caught", get(collection_page))
        .route("/caught/{id}/release", post(release_pokemon))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .with_state(state)
}
