pub mod chat_stream;
pub mod config;
pub mod frame_parser;
pub mod reconcile;
