use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::llm::LlmProvider;
use crate::vector::{RetrievalMatch, VectorStore};

/// Fixed response when retrieval yields nothing usable. A normal outcome,
/// not an error.
pub const NO_RELEVANT_INFORMATION: &str = "I couldn't find any relevant information in your \
documents. Please upload a document first, or ask a question about the documents you've uploaded.";

const SUMMARY_TOP_K: usize = 20;
const QUESTION_TOP_K: usize = 12;
const MAX_CITATIONS: usize = 5;
const SNIPPET_CHARS: usize = 150;
const HISTORY_TURNS: usize = 4;

const SUMMARY_PROMPT: &str = "You are an AI assistant that provides comprehensive document \
summaries. Based on the uploaded documents, create a detailed and well-organized summary that:

1. Highlights key information and main points from each document
2. Organizes information logically by topic or document type
3. Includes specific details like names, dates, numbers, and important facts
4. Provides context about what each document contains
5. Uses clear headings and bullet points for easy reading

Be thorough and include all important information while keeping it well-structured and easy to \
understand. When you reference information from documents, be specific about the source and \
location when possible.";

const QUESTION_PROMPT: &str = "You are a helpful AI assistant that answers questions about \
uploaded documents. You have access to relevant chunks of information from the user's documents.

Guidelines for your responses:
1. Always base your answers on the provided document content
2. Be specific and cite the document names when referencing information
3. If you find specific information like names, dates, or numbers, include them in your response
4. If the question is about certificates or official documents, be precise with details
5. If you cannot find the specific information requested, say so clearly
6. Maintain context from previous conversation when relevant

When you reference information from documents, be specific about the source and location when \
possible.";

/// One prior conversation turn as the client sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub is_user: bool,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct AnswerOptions {
    pub is_summary: bool,
    pub selected_documents: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    pub snippet: String,
    /// 1-based position of the match in the assembled context.
    pub chunk_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub response: String,
    pub citations: Vec<Citation>,
    pub sources: Vec<String>,
}

pub struct RagAnswerer {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStore>,
}

impl RagAnswerer {
    pub fn new(provider: Arc<dyn LlmProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { provider, store }
    }

    /// Answer a question from the indexed documents.
    ///
    /// Embeds the question, retrieves the top matches, assembles a cited
    /// context and delegates to the chat backend. Matches are used in store
    /// order; no re-ranking happens here.
    pub async fn answer(
        &self,
        question: &str,
        history: &[ChatTurn],
        opts: &AnswerOptions,
    ) -> Result<Answer, ApiError> {
        let embedding = self.provider.embed(question).await?;

        let top_k = if opts.is_summary {
            SUMMARY_TOP_K
        } else {
            QUESTION_TOP_K
        };
        let mut matches = self.store.query(&embedding, top_k, None).await?;

        if let Some(selected) = opts
            .selected_documents
            .as_deref()
            .filter(|s| !s.is_empty())
        {
            matches.retain(|m| selected.contains(&m.filename));
        }
        matches.retain(|m| !m.text.trim().is_empty());

        if matches.is_empty() {
            return Ok(Answer {
                response: NO_RELEVANT_INFORMATION.to_string(),
                citations: Vec::new(),
                sources: Vec::new(),
            });
        }

        let context = build_context(&matches);
        let citations = build_citations(&matches);
        let sources = distinct_sources(&matches);
        let prompt = build_prompt(question, history, &context, opts.is_summary);

        let response = self.provider.generate(&prompt).await?;

        Ok(Answer {
            response: response.trim().to_string(),
            citations,
            sources,
        })
    }
}

/// Per-match `[Document: name (Page N)]` headers, joined by blank lines.
fn build_context(matches: &[RetrievalMatch]) -> String {
    matches
        .iter()
        .map(|m| {
            let page_info = m
                .page_number
                .map(|p| format!(" (Page {p})"))
                .unwrap_or_default();
            format!("[Document: {}{}]\n{}", m.filename, page_info, m.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_citations(matches: &[RetrievalMatch]) -> Vec<Citation> {
    matches
        .iter()
        .take(MAX_CITATIONS)
        .enumerate()
        .map(|(i, m)| Citation {
            filename: m.filename.clone(),
            page_number: m.page_number,
            snippet: snippet(&m.text),
            chunk_index: i + 1,
        })
        .collect()
}

fn snippet(text: &str) -> String {
    let mut out: String = text.chars().take(SNIPPET_CHARS).collect();
    if text.chars().count() > SNIPPET_CHARS {
        out.push_str("...");
    }
    out
}

fn distinct_sources(matches: &[RetrievalMatch]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for m in matches {
        if !sources.contains(&m.filename) {
            sources.push(m.filename.clone());
        }
    }
    sources
}

fn conversation_tail(history: &[ChatTurn]) -> String {
    let start = history.len().saturating_sub(HISTORY_TURNS);
    history[start..]
        .iter()
        .map(|turn| {
            let speaker = if turn.is_user { "User" } else { "Assistant" };
            format!("{speaker}: {}", turn.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_prompt(question: &str, history: &[ChatTurn], context: &str, is_summary: bool) -> String {
    let system = if is_summary {
        SUMMARY_PROMPT
    } else {
        QUESTION_PROMPT
    };
    format!(
        "{system}\n\nPrevious conversation:\n{}\n\nContext from documents:\n{context}\n\n\
User question: {question}\n\nPlease provide a helpful and accurate response based on the \
document content:",
        conversation_tail(history)
    )
}
