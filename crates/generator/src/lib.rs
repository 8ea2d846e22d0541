//! Coin detail generation
//!
//! Asks a completion service for a coin identity and tokenomics, then holds
//! the free-form answers to a strict shape contract before anything
//! downstream gets to see them.

pub mod client;
pub mod extract;
pub mod generator;
pub mod validation;

pub use client::{ChatMessage, CompletionClient, CompletionRequest, HttpCompletionClient};
pub use extract::extract_json_object;
pub use generator::CoinGenerator;
pub use validation::{parse_identity, parse_tokenomics, validate_identity, validate_tokenomics};
