// Recommendation client: prompt construction and the streaming chat
// completions client that implements `Recommender`.

pub mod client;
pub mod prompt;

pub use client::OpenAiClient;
