//! blogchat is a terminal client for a blog-generation agent.
//!
//! The interesting part is how streamed answers are consumed:
//! - [`core::frame_parser`] turns raw network reads into `data:` frames,
//!   holding back partial lines between reads.
//! - [`core::reconcile`] trims text that a frame restates from the previous
//!   frame, so only new text is delivered.
//! - [`core::chat_stream`] drives one session per request over a reqwest body
//!   stream and produces the final [`api::ChatResult`].
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
