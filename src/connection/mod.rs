//! Connections: the async surface over a decode session

mod link;

#[cfg(test)]
mod tests;

pub use link::LinkConnection;
