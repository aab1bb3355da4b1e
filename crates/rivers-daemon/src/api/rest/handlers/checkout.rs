//! Checkout handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use rivers_checkout::CheckoutRedirect;
use tracing::{error, info};

/// Open a hosted checkout session
pub async fn create_checkout(State(state): State<AppState>) -> ApiResult<Json<CheckoutRedirect>> {
    let redirect = state.checkout.create_checkout().await.map_err(|err| {
        error!(error = %err, "failed to create checkout session");
        ApiError::Internal("Failed to create checkout session".to_string())
    })?;

    Ok(Json(redirect))
}

pub async fn checkout_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// First `session_id` in the query pairs. Repeated keys are ignored.
fn first_session_id(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "session_id")
        .map(|(_, value)| value.as_str())
}

/// Return from the hosted checkout page.
///
/// Sets the session cookie and redirects to chat when the payment is
/// confirmed, otherwise redirects to the landing page with the failure kind.
pub async fn checkout_success(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
    jar: CookieJar,
) -> Response {
    match state
        .checkout
        .complete_checkout(first_session_id(&params), state.now_millis())
        .await
    {
        Ok(confirmed) => {
            info!(session_id = %confirmed.payment_reference, "session cookie issued");
            let jar = jar.add(state.gate.session_cookie(confirmed.token));
            (jar, Redirect::to(&state.checkout.chat_url())).into_response()
        }
        Err(failure) => Redirect::to(&failure.redirect_target()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_session_id_wins() {
        let params = pairs(&[("session_id", "cs_a"), ("session_id", "cs_b")]);
        assert_eq!(first_session_id(&params), Some("cs_a"));

        let params = pairs(&[("utm", "x")]);
        assert_eq!(first_session_id(&params), None);
    }
}
