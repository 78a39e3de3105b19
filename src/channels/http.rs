//! HTTP messaging endpoint.
//!
//! `POST /api/messages` takes one activity and answers with everything the turn
//! produced once its state is committed. `GET /health` is a liveness probe.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::bot::DialogBot;
use crate::channels::Activity;
use crate::error::{ChannelError, Error};

/// Build the router for the bot's HTTP surface.
pub fn bot_routes(bot: Arc<DialogBot>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/api/messages", post(post_activity))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(bot)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn post_activity(
    State(bot): State<Arc<DialogBot>>,
    payload: Result<Json<Activity>, JsonRejection>,
) -> Response {
    let activity = match payload {
        Ok(Json(activity)) => activity,
        Err(rejection) => {
            let err = ChannelError::InvalidActivity(rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };
    if let Err(err) = check_activity(&activity) {
        return error_response(StatusCode::BAD_REQUEST, &err.to_string());
    }

    match bot.on_turn(&activity).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status == StatusCode::CONFLICT {
                warn!(conversation_id = %activity.conversation.id, error = %e, "Turn abandoned after conflicts");
            } else {
                error!(conversation_id = %activity.conversation.id, error = %e, "Turn failed");
            }
            error_response(status, &e.to_string())
        }
    }
}

/// Reject activities that cannot be keyed to a conversation.
fn check_activity(activity: &Activity) -> Result<(), ChannelError> {
    if activity.channel_id.trim().is_empty() {
        return Err(ChannelError::InvalidActivity("missing channelId".into()));
    }
    if activity.conversation.id.trim().is_empty() {
        return Err(ChannelError::InvalidActivity("missing conversation.id".into()));
    }
    Ok(())
}

fn status_for(err: &Error) -> StatusCode {
    if err.is_conflict() {
        StatusCode::CONFLICT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, StorageError};

    #[test]
    fn conflicts_map_to_409() {
        let conflict: Error = StorageError::Conflict { key: "k".into() }.into();
        assert_eq!(status_for(&conflict), StatusCode::CONFLICT);

        let config: Error = ConfigError::DialogNotFound { id: "X".into() }.into();
        assert_eq!(status_for(&config), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn activity_needs_conversation() {
        let mut activity = Activity::message("test", "c", "u", "hi");
        assert!(check_activity(&activity).is_ok());
        activity.conversation.id.clear();
        assert!(matches!(
            check_activity(&activity),
            Err(ChannelError::InvalidActivity(_))
        ));
    }
}
