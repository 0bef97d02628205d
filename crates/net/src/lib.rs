#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for the chat client
//!
//! This crate wraps reqwest with pooling and retry logic and exposes the
//! two OpenAI-compatible endpoints the chat client needs.

mod client;
mod completions;

pub use client::{NetClient, NetConfig};
pub use completions::{
    ChatApi, ChatCompletionRequest, ChatCompletionResponse, Choice, ChoiceMessage,
    CompletionParams,
};
