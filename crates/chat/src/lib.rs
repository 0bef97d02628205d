#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Conversation state and transcripts for the chat client

mod session;
mod transcript;

pub use session::ChatSession;
pub use transcript::Transcript;

use sov_errors::Error;
use sov_net::{ChatApi, CompletionParams};
use sov_types::Role;

/// Run one request/response turn
///
/// The user message is added to the session and transcript first. On
/// success the reply is added to both and returned. On failure the user
/// message stays in the session and the error is returned.
///
/// # Errors
///
/// Returns an error if the transcript cannot be written or the completion
/// request fails.
pub async fn send_turn(
    api: &ChatApi,
    params: &CompletionParams,
    session: &mut ChatSession,
    transcript: &Transcript,
    message: &str,
) -> Result<String, Error> {
    session.push_user(message);
    transcript.append(Role::User, message).await?;

    let reply = api.chat_completion(session.messages(), params).await?;
    tracing::debug!(turn = session.turns(), chars = reply.len(), "received reply");

    session.push_assistant(reply.clone());
    transcript.append(Role::Assistant, &reply).await?;
    Ok(reply)
}
