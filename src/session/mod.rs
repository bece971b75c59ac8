//! Application flow and per-client session management

pub mod flow;
pub mod service;

#[cfg(test)]
mod tests;

pub use flow::{FlowEffect, FlowEvent, GameFlow};
pub use service::{GameSession, SessionHandle, SessionRegistry};
