use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

/// Which backend tool an answer is attributed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Weather,
    Dictionary,
    WebSearch,
    #[default]
    Assistant,
}

impl ToolCategory {
    /// Display label shown above the answer.
    pub fn label(self) -> &'static str {
        match self {
            ToolCategory::Weather => "Weather Information",
            ToolCategory::Dictionary => "Dictionary Lookup",
            ToolCategory::WebSearch => "Web Search Results",
            ToolCategory::Assistant => "Travel Assistant",
        }
    }

    /// Font Awesome icon class used by the HTML renderer.
    pub fn icon(self) -> &'static str {
        match self {
            ToolCategory::Weather => "fa-cloud-sun",
            ToolCategory::Dictionary => "fa-book",
            ToolCategory::WebSearch => "fa-search",
            ToolCategory::Assistant => "fa-robot",
        }
    }

    /// Glyph used by the terminal renderer.
    pub fn glyph(self) -> &'static str {
        match self {
            ToolCategory::Weather => "⛅",
            ToolCategory::Dictionary => "📖",
            ToolCategory::WebSearch => "🔍",
            ToolCategory::Assistant => "🤖",
        }
    }
}

/// A single entry in the chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub author: Author,
    pub content: String,
    /// Resolved tool for assistant answers. Notices carry none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolCategory>,
    /// Status line from the client itself (e.g. the connection banner).
    #[serde(default)]
    pub system: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(author: Author, content: String, tool: Option<ToolCategory>, system: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            author,
            content,
            tool,
            system,
            timestamp: Utc::now(),
        }
    }

    /// The user's question, echoed verbatim.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Author::User, content.into(), None, false)
    }

    /// An answer from the backend, attributed to a tool.
    pub fn answer(content: impl Into<String>, tool: ToolCategory) -> Self {
        Self::new(Author::Assistant, content.into(), Some(tool), false)
    }

    /// A fixed assistant-authored message (errors, fallbacks, warnings).
    pub fn notice(content: impl Into<String>) -> Self {
        Self::new(Author::Assistant, content.into(), None, false)
    }

    /// A client status message shown under the "System" badge.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Author::Assistant, content.into(), None, true)
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

/// Body of `POST /api/assist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistRequest {
    pub question: String,
    /// Serialized as `null` when absent, never as an empty string.
    pub city: Option<String>,
}

impl AssistRequest {
    /// Build a request from raw field values. Returns `None` when the question is blank.
    pub fn from_fields(question: &str, city: &str) -> Option<Self> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        let city = city.trim();
        Some(Self {
            question: question.to_string(),
            city: (!city.is_empty()).then(|| city.to_string()),
        })
    }
}

/// Response of `POST /api/assist`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistResponse {
    pub success: bool,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub tool_used: Option<String>,
}

/// One entry of `GET /api/tools`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolList {
    #[serde(default)]
    pub tools: Vec<ToolInfo>,
}
