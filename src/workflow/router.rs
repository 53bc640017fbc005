//! Label-to-worker routing with fixed keyword precedence.

/// Worker category resolved from a raw classifier label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Research worker: source lookup plus length-verified summarization
    Research,
    /// Retrieval worker: external RAG service
    Retrieve,
    /// Chitchat worker: conversational LLM responder
    General,
    /// No recognized keyword in the label; the turn ends with a static reply
    Unknown,
}

impl Category {
    /// Short worker name used as a structured log field.
    pub fn worker_name(&self) -> &'static str {
        match self {
            Category::Research => "research",
            Category::Retrieve => "rag",
            Category::General => "chitchat",
            Category::Unknown => "none",
        }
    }
}

/// Reply returned when the classifier label matches no known worker.
///
/// The turn must always produce a user-visible answer, so an unrecognized
/// label terminates with this text instead of an error.
pub const UNRECOGNIZED_REPLY: &str = "Apologies, I am not sure what to say. \
I can answer general questions, retrieve information from the document store, \
and research topics from reference sources, but nothing more.";

/// Map a raw classifier label onto a worker category.
///
/// The classifier returns free text rather than a constrained enum, so
/// matching is case-insensitive substring search with fixed precedence:
/// "retrieve" wins over "general", which wins over "research".
pub fn route(label: &str) -> Category {
    let label = label.to_lowercase();
    if label.contains("retrieve") {
        Category::Retrieve
    } else if label.contains("general") {
        Category::General
    } else if label.contains("research") {
        Category::Research
    } else {
        Category::Unknown
    }
}
