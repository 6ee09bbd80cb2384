pub mod client;
pub mod repl;

pub use client::Connection;
pub use repl::readline;
