//! AI outreach copy generation over an OpenAI-compatible chat API.
//!
//! Given the context of a captured comment (campaign persona, post, comment
//! text), produces a public reply and a direct message tailored to the lead.

mod client;
mod error;
mod prompt;

pub use client::OutreachClient;
pub use error::OutreachClientError;
