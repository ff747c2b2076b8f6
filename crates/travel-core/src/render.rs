//! Turn chat messages into display fragments.
//!
//! Assistant text goes through a fixed pipeline of single-pass substitutions:
//! line breaks, then `**bold**`, then `*italic*`, then `- ` bullets at the start
//! of a line. There is no nested markdown parsing. User text is never formatted.
//!
//! The same pipeline produces HTML (for transcripts) or ANSI (for the terminal),
//! depending on the [`Markup`] it is built with.

use crate::types::{ChatMessage, ToolCategory};

/// Tokens a renderer emits for each substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markup {
    pub line_break: &'static str,
    pub strong: (&'static str, &'static str),
    pub em: (&'static str, &'static str),
    pub bullet: &'static str,
    /// Escape `&`, `<` and `>` before substituting.
    pub escape_html: bool,
    /// Drop control characters other than `\n` and `\t` before substituting.
    pub strip_controls: bool,
}

impl Markup {
    pub const HTML: Markup = Markup {
        line_break: "<br>",
        strong: ("<strong>", "</strong>"),
        em: ("<em>", "</em>"),
        bullet: "• ",
        escape_html: true,
        strip_controls: false,
    };

    pub const ANSI: Markup = Markup {
        line_break: "\n",
        strong: ("\x1b[1m", "\x1b[22m"),
        em: ("\x1b[3m", "\x1b[23m"),
        bullet: "• ",
        escape_html: false,
        strip_controls: true,
    };

    /// Terminal output without escape sequences.
    pub const PLAIN: Markup = Markup {
        line_break: "\n",
        strong: ("", ""),
        em: ("", ""),
        bullet: "• ",
        escape_html: false,
        strip_controls: true,
    };
}

/// Header shown above an assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub icon: &'static str,
    pub glyph: &'static str,
}

impl Badge {
    pub const SYSTEM: Badge = Badge {
        label: "System",
        icon: "fa-check",
        glyph: "✓",
    };

    pub const THINKING: Badge = Badge {
        label: "Thinking...",
        icon: "fa-cog",
        glyph: "⚙",
    };

    pub fn for_category(category: ToolCategory) -> Self {
        Self {
            label: category.label(),
            icon: category.icon(),
            glyph: category.glyph(),
        }
    }

    /// The badge for a message, if it carries one. Notices and user messages don't.
    pub fn for_message(message: &ChatMessage) -> Option<Self> {
        if message.system {
            return Some(Self::SYSTEM);
        }
        message.tool.map(Self::for_category)
    }
}

/// Formats message bodies with a fixed [`Markup`].
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    markup: Markup,
}

impl Renderer {
    pub fn new(markup: Markup) -> Self {
        Self { markup }
    }

    pub fn html() -> Self {
        Self::new(Markup::HTML)
    }

    /// ANSI-styled output when `color` is set, bare text otherwise.
    pub fn terminal(color: bool) -> Self {
        Self::new(if color { Markup::ANSI } else { Markup::PLAIN })
    }

    /// Run the assistant-text pipeline.
    pub fn format(&self, text: &str) -> String {
        let m = &self.markup;
        let text = self.plain(text);

        let text = if m.line_break == "\n" {
            text
        } else {
            text.replace('\n', m.line_break)
        };
        let text = wrap_pairs(&text, "**", m.strong.0, m.strong.1);
        let text = wrap_pairs(&text, "*", m.em.0, m.em.1);
        bullets(&text, m.line_break, m.bullet)
    }

    /// User text: escaped for HTML, stripped of control characters for a terminal.
    pub fn plain(&self, text: &str) -> String {
        let text = if self.markup.strip_controls {
            strip_controls(text)
        } else {
            text.to_string()
        };
        if self.markup.escape_html {
            escape_html(&text)
        } else {
            text
        }
    }

    /// Body of a message: formatted for the assistant, plain for the user.
    pub fn body(&self, message: &ChatMessage) -> String {
        if message.is_user() {
            self.plain(&message.content)
        } else {
            self.format(&message.content)
        }
    }

    /// A complete HTML fragment for one message.
    pub fn html_fragment(&self, message: &ChatMessage) -> String {
        let class = if message.is_user() {
            "user-message"
        } else {
            "assistant-message"
        };
        let header = Badge::for_message(message)
            .map(|b| badge_html(&b))
            .unwrap_or_default();
        format!(
            "<div class=\"message {}\">{}{}</div>",
            class,
            header,
            self.body(message)
        )
    }
}

fn badge_html(badge: &Badge) -> String {
    format!(
        "<div class=\"tool-indicator\"><i class=\"fas {} tool-icon\"></i> {}</div>",
        badge.icon, badge.label
    )
}

/// Render a standalone HTML page for a transcript.
pub fn transcript_html(messages: &[ChatMessage]) -> String {
    let renderer = Renderer::html();
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Travel Assistant</title>\n\
         <style>\n\
         .message { margin: 8px 0; padding: 10px 14px; border-radius: 10px; max-width: 80%; }\n\
         .user-message { background: #667eea; color: #fff; margin-left: auto; }\n\
         .assistant-message { background: #f1f3f5; }\n\
         .tool-indicator { font-size: 0.8rem; font-weight: 600; opacity: 0.7; margin-bottom: 4px; }\n\
         </style>\n</head>\n<body>\n<div id=\"messagesContainer\">\n",
    );
    for message in messages {
        html.push_str(&renderer.html_fragment(message));
        html.push('\n');
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

/// Replace each `delim ... delim` pair, scanning left to right without re-scanning output.
fn wrap_pairs(text: &str, delim: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(delim) {
        let after = &rest[start + delim.len()..];
        let Some(end) = after.find(delim) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(open);
        out.push_str(&after[..end]);
        out.push_str(close);
        rest = &after[end + delim.len()..];
    }
    out.push_str(rest);
    out
}

/// `- ` at the start of the text or right after a line break becomes a bullet.
fn bullets(text: &str, line_break: &str, bullet: &str) -> String {
    let text = match text.strip_prefix("- ") {
        Some(rest) => format!("{}{}", bullet, rest),
        None => text.to_string(),
    };
    text.replace(
        &format!("{}- ", line_break),
        &format!("{}{}", line_break, bullet),
    )
}

/// Keeps terminal escape sequences sent by the backend from reaching the tty.
fn strip_controls(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
