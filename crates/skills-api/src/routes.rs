use axum::{
    Json, Router, middleware,
    routing::{delete, get, post},
};
use serde_json::{Value, json};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, conversations, matching, messages, profiles, stream, tasks};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/ai/match", post(matching::ai_match))
        .route("/match", post(matching::match_user_to_task));

    let protected_routes = Router::new()
        .route(
            "/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route("/conversations/stream", get(stream::conversation_stream))
        .route(
            "/messages",
            get(messages::get_messages).post(messages::send_message),
        )
        .route("/messages/stream", get(stream::message_stream))
        .route("/messages/{message_id}", delete(messages::delete_message))
        .route("/profiles/users", get(profiles::list_users))
        .route(
            "/profiles/users/{id}",
            get(profiles::get_profile)
                .put(profiles::update_profile)
                .delete(profiles::delete_profile),
        )
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
