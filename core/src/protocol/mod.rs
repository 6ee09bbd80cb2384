//! Wire protocol for the timer service
//!
//! Requests are single text lines of the form `VERB:ID:TIMEOUT` with
//! VERB one of `SET`, `CANCEL`, `RESET`, decimal ID and TIMEOUT in whole
//! seconds (`SET:0:30`, `CANCEL:0:`, `RESET:0:30`). Replies and fired
//! notifications are single lines too (`SET DONE:0`, `CALLBACK EXECUTED:0`).

mod command;
mod error;

#[cfg(test)]
mod command_tests;

pub use command::{Command, Reply, Verb};
pub use error::ProtocolError;
