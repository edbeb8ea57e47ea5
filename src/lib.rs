//! spind - a music playback daemon with a transport-agnostic command bridge.
//!
//! The daemon owns one playback [`session::Session`] and exposes a fixed
//! [`commands`] catalogue over two transports: an HTTP bridge
//! (`GET /api/<command>/<args...>`, see [`http`]) and a line-oriented TCP
//! [`gateway`]. Both feed the same [`dispatch::Dispatcher`], which matches
//! requests by command name and arity and delivers results through
//! single-use completion channels.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod http;
pub mod metrics;
pub mod session;
pub mod telemetry;
