//! AI rewrite actions.
//!
//! The rewriter itself is an external service. This module owns the action
//! kinds, the prompt each one sends, and how a response is merged back into
//! the document.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::RewriteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AiAction {
    Summarize,
    FixGrammar,
    Expand,
    TechPolish,
}

impl AiAction {
    pub const ALL: [AiAction; 4] = [
        AiAction::Summarize,
        AiAction::FixGrammar,
        AiAction::Expand,
        AiAction::TechPolish,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AiAction::Summarize => "Summarize",
            AiAction::FixGrammar => "Fix Grammar",
            AiAction::Expand => "Expand",
            AiAction::TechPolish => "Tech Polish",
        }
    }

    /// Prompt sent to the rewriter for `text`.
    pub fn prompt(&self, text: &str) -> String {
        let instruction = match self {
            AiAction::Summarize => "Summarize the following markdown content concisely:",
            AiAction::FixGrammar => {
                "Fix grammar and spelling in the following markdown content. Do not change the tone:"
            }
            AiAction::Expand => {
                "Expand on the following markdown content, adding more technical details and examples where appropriate:"
            }
            AiAction::TechPolish => {
                "Rewrite the following text to sound more technical, professional, and clear. Maintain markdown formatting:"
            }
        };
        format!("{instruction}\n\n{text}")
    }

    /// Whether the response is appended to the document instead of replacing it.
    pub fn appends(&self) -> bool {
        matches!(self, AiAction::Summarize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRequest {
    pub action: AiAction,
    pub text: String,
}

impl RewriteRequest {
    pub fn prompt(&self) -> String {
        self.action.prompt(&self.text)
    }
}

/// Service that turns a rewrite request into new text.
pub trait AiRewriter {
    fn rewrite(
        &self,
        request: &RewriteRequest,
    ) -> impl Future<Output = Result<String, RewriteError>>;
}

/// Unit type implementation - no service configured.
impl AiRewriter for () {
    async fn rewrite(&self, _request: &RewriteRequest) -> Result<String, RewriteError> {
        Err(RewriteError::Unavailable)
    }
}

/// Send `request` to `rewriter`. Blank text never reaches the service and
/// yields an empty response.
pub async fn request_rewrite<R: AiRewriter>(
    rewriter: &R,
    request: &RewriteRequest,
) -> Result<String, RewriteError> {
    if request.text.trim().is_empty() {
        return Ok(String::new());
    }
    tracing::debug!(action = ?request.action, bytes = request.text.len(), "requesting rewrite");
    rewriter.rewrite(request).await
}

/// Merge a rewrite response into the current document text.
pub fn apply_rewrite(action: AiAction, current: &str, response: &str) -> String {
    if action.appends() {
        format!("{current}\n\n### AI Summary\n{response}")
    } else {
        response.to_string()
    }
}
