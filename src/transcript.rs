use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::markup;

/// Who wrote a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Ai => "AI",
        }
    }
}

/// A single message in the transcript. AI `text` holds display markup; user
/// `text` is exactly what was typed and is never interpreted as markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub text: String,
}

impl TranscriptEntry {
    pub fn plain_text(&self) -> Cow<'_, str> {
        match self.sender {
            Sender::User => Cow::Borrowed(&self.text),
            Sender::Ai => Cow::Owned(markup::to_plain(&self.text)),
        }
    }
}

/// Ordered log of user and AI messages.
///
/// Entries can only be appended; the only way to remove anything is
/// [`Transcript::clear`], which drops the whole history.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, sender: Sender, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            sender,
            text: text.into(),
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Plain-text rendering, one sender-prefixed entry per line.
    ///
    /// Multi-line AI answers keep their internal line breaks, so a single
    /// entry may span several output lines.
    pub fn render_plain_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}: {}", entry.sender.label(), entry.plain_text()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.append(Sender::User, "2 + 2");
        transcript.append(Sender::Ai, "4");
        transcript.append(Sender::User, "thanks");

        let senders: Vec<Sender> = transcript.entries().iter().map(|e| e.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Ai, Sender::User]);
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn test_render_plain_text() {
        let mut transcript = Transcript::new();
        transcript.append(Sender::User, "solve 3x = 9");
        transcript.append(Sender::Ai, "<b>Step 1:</b> divide<br>x = 3");

        assert_eq!(
            transcript.render_plain_text(),
            "You: solve 3x = 9\nAI: Step 1: divide\nx = 3"
        );
    }

    #[test]
    fn test_user_text_is_not_treated_as_markup() {
        let mut transcript = Transcript::new();
        transcript.append(Sender::User, "is <b>x</b> &lt; 3<br>?");
        transcript.append(Sender::Ai, "x &lt; 3");

        assert_eq!(
            transcript.render_plain_text(),
            "You: is <b>x</b> &lt; 3<br>?\nAI: x < 3"
        );
    }

    #[test]
    fn test_clear_empties_rendering() {
        let mut transcript = Transcript::new();
        transcript.append(Sender::Ai, "Welcome");
        transcript.clear();

        assert!(transcript.is_empty());
        assert_eq!(transcript.render_plain_text(), "");
    }
}
