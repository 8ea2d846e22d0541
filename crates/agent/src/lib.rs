//! Meme coin creation agent
//!
//! Sequences generation, deployment and record keeping.

mod agent;

pub use agent::MemeCoinAgent;
