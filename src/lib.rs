//! # Switchboard
//!
//! An assistant service that routes free-text user queries to one of three
//! specialized responders and length-checks research summaries before
//! returning them.
//!
//! ```text
//!                 ┌──────────────┐      ┌────────┐
//!   user query ──►│  Supervisor  │─────►│ Router │
//!                 │  (classify)  │      └───┬────┘
//!                 └──────────────┘          │
//!                          ┌────────────────┼─────────────────┐
//!                          ▼                ▼                 ▼
//!                   retrieval worker  chitchat worker  research worker
//!                   (RAG service)     (LLM persona)    (lookup + summarize
//!                                                       + length verifier)
//! ```
//!
//! ## Turn Flow
//! 1. Receive a query via the HTTP API (or directly through [`workflow::Orchestrator`])
//! 2. Classify it against the running conversation history
//! 3. Route the raw label to a worker by keyword precedence
//! 4. Dispatch, length-verify research summaries, and append the exchange to
//!    the session history
//!
//! ## Modules
//! - `workflow`: the classification, routing, dispatch, and verification loop
//! - `capability`: the external seams (classifier, lookup, summarizer, responders)
//! - `llm`: chat-completion client used by the live capabilities
//! - `session`: conversation sessions and append-only history
//! - `api`: HTTP surface
//! - `config`: environment-based configuration

pub mod api;
pub mod capability;
pub mod config;
pub mod llm;
pub mod session;
pub mod workflow;

pub use config::Config;
pub use session::Session;
pub use workflow::Orchestrator;
