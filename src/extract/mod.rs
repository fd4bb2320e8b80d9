//! Fenced code block extraction.
//!
//! Scans a markdown document for fenced blocks that carry a language tag
//! and concatenates their bodies per output channel:
//!
//! | Tag                    | Channel           |
//! |------------------------|-------------------|
//! | `html`                 | `markup`          |
//! | `css`                  | `style`           |
//! | `js`, `javascript`     | `behavior_plain`  |
//! | `ts`, `typescript`     | `behavior_typed`  |
//!
//! Untagged fences, unknown tags, empty bodies and fences that never close
//! are skipped without error.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Tagged fence: ``` + tag + line break(s) + body + ```.
///
/// The body is matched lazily so each block ends at the first closing fence.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([A-Za-z0-9_]+)[\r\n]+(.*?)```").expect("fence pattern is valid")
});

/// Output channel a fenced block is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Markup,
    Style,
    BehaviorPlain,
    BehaviorTyped,
}

impl Channel {
    /// Classify a fence tag (case-insensitive). Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "html" => Some(Self::Markup),
            "css" => Some(Self::Style),
            "js" | "javascript" => Some(Self::BehaviorPlain),
            "ts" | "typescript" => Some(Self::BehaviorTyped),
            _ => None,
        }
    }
}

/// Per-channel concatenation of every block body, in document order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedBundle {
    pub markup: String,
    pub style: String,
    pub behavior_typed: String,
    pub behavior_plain: String,
}

impl ExtractedBundle {
    fn buffer_mut(&mut self, channel: Channel) -> &mut String {
        match channel {
            Channel::Markup => &mut self.markup,
            Channel::Style => &mut self.style,
            Channel::BehaviorPlain => &mut self.behavior_plain,
            Channel::BehaviorTyped => &mut self.behavior_typed,
        }
    }

    fn push(&mut self, channel: Channel, body: &str) {
        let buffer = self.buffer_mut(channel);
        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(body);
    }

    /// Combined behavior source: plain blocks first, then typed blocks.
    pub fn behavior(&self) -> String {
        [self.behavior_plain.as_str(), self.behavior_typed.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when no block was extracted into any channel.
    pub fn is_empty(&self) -> bool {
        self.markup.is_empty()
            && self.style.is_empty()
            && self.behavior_typed.is_empty()
            && self.behavior_plain.is_empty()
    }
}

/// Extract and concatenate tagged fenced blocks from `text`.
pub fn extract(text: &str) -> ExtractedBundle {
    let mut bundle = ExtractedBundle::default();

    for caps in FENCE.captures_iter(text) {
        let (Some(tag), Some(body)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let body = body.as_str().trim();
        if body.is_empty() {
            continue;
        }
        if let Some(channel) = Channel::from_tag(tag.as_str()) {
            bundle.push(channel, body);
        }
    }

    bundle
}
