use crate::errors::{AppError, FetchError};
use crate::profile::{build_view, ProfileView};
use crate::session::{session_cookie, session_id_from_cookie, SessionStore};
use crate::state::AppState;
use crate::ui::{render_login, render_profile, LOGIN_ERROR};
use axum::{
    extract::{Query, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct WidthQuery {
    pub width: Option<u32>,
}

enum ProfileLoad {
    Ready(Box<ProfileView>),
    SignIn,
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    let signed_in = match session_id(&headers) {
        Some(id) => state.sessions.get(id).await.is_some(),
        None => false,
    };
    if signed_in {
        Redirect::to("/profile")
    } else {
        Redirect::to("/login")
    }
}

pub async fn login_page() -> Html<String> {
    Html(render_login(None))
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    if let Some(previous) = session_id(&headers) {
        state.sessions.clear(previous).await;
    }
    info!(username = %form.username, "login attempt");

    match state
        .client
        .authenticate(form.username.trim(), &form.password)
        .await
    {
        Ok(token) => {
            let id = SessionStore::new_id();
            state.sessions.set(&id, token).await;
            info!(username = %form.username, "login succeeded");
            (
                [(SET_COOKIE, session_cookie(&id))],
                Redirect::to("/profile"),
            )
                .into_response()
        }
        Err(err) => {
            warn!(username = %form.username, "login failed: {err}");
            (StatusCode::UNAUTHORIZED, Html(render_login(Some(LOGIN_ERROR)))).into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if let Some(id) = session_id(&headers) {
        state.sessions.clear(id).await;
    }
    Redirect::to("/login")
}

pub async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WidthQuery>,
) -> Response {
    match load_profile(&state, &headers, query.width).await {
        ProfileLoad::Ready(view) => Html(render_profile(&view)).into_response(),
        ProfileLoad::SignIn => Redirect::to("/login").into_response(),
    }
}

pub async fn api_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WidthQuery>,
) -> Result<Json<ProfileView>, AppError> {
    match load_profile(&state, &headers, query.width).await {
        ProfileLoad::Ready(view) => Ok(Json(*view)),
        ProfileLoad::SignIn => Err(AppError::unauthorized("not signed in")),
    }
}

async fn load_profile(state: &AppState, headers: &HeaderMap, width: Option<u32>) -> ProfileLoad {
    let Some(id) = session_id(headers) else {
        return ProfileLoad::SignIn;
    };
    let Some(token) = state.sessions.get(id).await else {
        info!("no session token, sending to sign-in");
        return ProfileLoad::SignIn;
    };

    match state.client.fetch_profile(&token).await {
        Ok(fetched) => {
            let width = state.config.chart_width(width);
            ProfileLoad::Ready(Box::new(build_view(
                &fetched,
                width,
                &state.config.ratio_copy,
            )))
        }
        Err(err) => {
            warn!("failed to load profile: {err}");
            if err.invalidates_session() {
                info!("clearing session after {}", kind(&err));
                state.sessions.clear(id).await;
            }
            ProfileLoad::SignIn
        }
    }
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(session_id_from_cookie)
}

fn kind(err: &FetchError) -> &'static str {
    match err {
        FetchError::Auth(_) => "auth error",
        FetchError::Network(_) => "network error",
        FetchError::Data(_) => "data error",
        FetchError::Format(_) => "format error",
    }
}
