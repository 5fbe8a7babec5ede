// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trigger-phrase matching for inbound text.

/// What an inbound text message asks the bot to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Callsign prefix: complete the remainder as text.
    Text(&'a str),
    /// Vision trigger prefix: hold the remainder until an image arrives.
    Vision(&'a str),
    /// No configured prefix matched.
    Unmatched,
}

/// The configured callsign and vision trigger prefixes.
#[derive(Debug, Clone)]
pub struct TriggerSet {
    callsign: String,
    vision_triggers: Vec<String>,
}

impl TriggerSet {
    pub fn new(callsign: impl Into<String>, vision_triggers: Vec<String>) -> Self {
        Self {
            callsign: callsign.into(),
            vision_triggers,
        }
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    /// The first vision trigger, used when rendering help texts.
    pub fn primary_vision_trigger(&self) -> &str {
        self.vision_triggers.first().map(String::as_str).unwrap_or("")
    }

    /// Classifies `text` and strips the matched prefix plus surrounding
    /// whitespace.
    ///
    /// The callsign is checked before the vision triggers. Matching is a
    /// plain prefix test on the raw text, so leading whitespace defeats it.
    /// The returned remainder may be empty.
    pub fn parse<'a>(&self, text: &'a str) -> Command<'a> {
        if !self.callsign.is_empty()
            && let Some(rest) = text.strip_prefix(self.callsign.as_str())
        {
            return Command::Text(rest.trim());
        }

        self.vision_triggers
            .iter()
            .filter(|t| !t.is_empty())
            .find_map(|t| text.strip_prefix(t.as_str()))
            .map(|rest| Command::Vision(rest.trim()))
            .unwrap_or(Command::Unmatched)
    }
}
