//! Session handler

use crate::api::rest::state::AppState;
use axum::{extract::State, Json};
use axum_extra::extract::CookieJar;
use rivers_session::SessionVerdict;

/// Report whether the session cookie grants chat access
pub async fn get_session(State(state): State<AppState>, jar: CookieJar) -> Json<SessionVerdict> {
    let token = jar.get(state.gate.cookie_name()).map(|cookie| cookie.value());
    Json(state.gate.check_session(token, state.now_millis()))
}
