//! Server-sent event endpoints. Failures before the stream starts are plain
//! JSON errors; after that the connection is simply closed.

use std::convert::Infallible;

use axum::{
    Extension,
    extract::{Query, State},
    response::sse::{Event, Sse},
};
use axum_extra::extract::WithRejection;
use futures_util::{Stream, StreamExt, future};
use tracing::error;

use skills_core::live::LiveStream;
use skills_core::membership::parse_conversation_id;
use skills_types::api::StreamQuery;
use skills_types::events::StreamEvent;
use skills_types::models::Principal;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn message_stream(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    WithRejection(Query(query), _): WithRejection<Query<StreamQuery>, ApiError>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let conversation_id = parse_conversation_id(query.conversation_id.as_deref())?;
    let live = state
        .broadcaster
        .message_stream(principal.user_id, conversation_id)
        .await?;
    Ok(into_sse(live))
}

pub async fn conversation_stream(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    into_sse(state.broadcaster.conversation_stream(principal.user_id))
}

fn into_sse(live: LiveStream) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(live.filter_map(|frame| future::ready(to_event(frame).map(Ok))))
}

fn to_event(frame: StreamEvent) -> Option<Event> {
    let Some(name) = frame.event_name() else {
        return Some(Event::default().comment("ping"));
    };
    match frame.data()? {
        Ok(data) => Some(Event::default().event(name).data(data)),
        Err(e) => {
            error!("failed to serialize {} event: {}", name, e);
            None
        }
    }
}
