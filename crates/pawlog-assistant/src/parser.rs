//! Line-oriented parsing of structured assistant replies.
//!
//! Replies are split into sections by uppercase labels (`TITLE:`,
//! `URGENCY:`, ...). Text after a label's colon is the section's inline
//! value; following lines starting with `-`, `*` or `•` are its list items;
//! other lines continue its text. Anything unrecognised is dropped and
//! missing sections fall back to defaults, so parsing never fails.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The contents gathered under one label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub text: String,
    pub items: Vec<String>,
}

impl Section {
    fn push_text(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(line);
    }

    /// Non-empty text, if any.
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }
}

/// Result of splitting a reply into labelled sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReply {
    /// Text before the first recognised label
    pub preamble: String,
    pub sections: HashMap<&'static str, Section>,
}

impl ParsedReply {
    pub fn section(&self, label: &str) -> Option<&Section> {
        self.sections.get(label)
    }

    pub fn text(&self, label: &str) -> Option<String> {
        self.section(label)
            .and_then(Section::text)
            .map(str::to_string)
    }

    /// List items of a section. A section with text but no bullets yields
    /// its text as a single item.
    pub fn items(&self, label: &str) -> Vec<String> {
        match self.section(label) {
            Some(section) if !section.items.is_empty() => section.items.clone(),
            Some(section) => section.text().map(|t| vec![t.to_string()]).unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

/// Split `reply` into sections for the given labels.
///
/// Labels match case-insensitively and may be wrapped in markdown emphasis
/// or heading marks. A repeated label appends to the earlier section.
pub fn split_sections(reply: &str, labels: &[&'static str]) -> ParsedReply {
    let mut parsed = ParsedReply::default();
    let mut current: Option<&'static str> = None;

    for raw in reply.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((label, rest)) = match_label(line, labels) {
            current = Some(label);
            let section = parsed.sections.entry(label).or_default();
            if let Some(item) = list_item(rest) {
                section.items.push(item.to_string());
            } else if !rest.is_empty() {
                section.push_text(rest);
            }
            continue;
        }

        match current {
            Some(label) => {
                let section = parsed.sections.entry(label).or_default();
                match list_item(line) {
                    Some(item) => section.items.push(item.to_string()),
                    None => section.push_text(line),
                }
            }
            None => {
                if !parsed.preamble.is_empty() {
                    parsed.preamble.push(' ');
                }
                parsed.preamble.push_str(line);
            }
        }
    }

    parsed
}

fn match_label<'a>(line: &'a str, labels: &[&'static str]) -> Option<(&'static str, &'a str)> {
    let (key, rest) = line.split_once(':')?;
    let key = key.trim_matches(|c: char| c == '*' || c == '#' || c == '_' || c.is_whitespace());
    let label = labels.iter().find(|l| l.eq_ignore_ascii_case(key))?;
    let rest = rest.trim_start_matches(|c: char| c == '*' || c == '_').trim();
    Some((*label, rest))
}

fn list_item(line: &str) -> Option<&str> {
    let stripped = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .or_else(|| line.strip_prefix('•'))?;
    let item = stripped.trim();
    (!item.is_empty()).then_some(item)
}

// =========================================================================
// Triage
// =========================================================================

/// How soon the pet should be seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    #[default]
    Moderate,
    High,
    Emergency,
}

impl Urgency {
    /// Lenient parse; unrecognised text gives `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.to_lowercase();
        if lower.contains("emergency") {
            Some(Urgency::Emergency)
        } else if lower.contains("high") || lower.contains("urgent") {
            Some(Urgency::High)
        } else if lower.contains("moderate") || lower.contains("medium") {
            Some(Urgency::Moderate)
        } else if lower.contains("low") {
            Some(Urgency::Low)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Moderate => "Moderate",
            Urgency::High => "High",
            Urgency::Emergency => "Emergency",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageAssessment {
    pub title: String,
    pub urgency: Urgency,
    pub summary: String,
    pub actions: Vec<String>,
    pub warning_signs: Vec<String>,
}

pub const TRIAGE_LABELS: &[&str] = &["TITLE", "URGENCY", "SUMMARY", "ACTIONS", "WARNING SIGNS"];

const DEFAULT_TRIAGE_TITLE: &str = "Symptom Assessment";
const DEFAULT_TRIAGE_SUMMARY: &str =
    "We couldn't read a full assessment. Keep an eye on your pet and contact your veterinarian if you are worried.";
const DEFAULT_TRIAGE_ACTIONS: &[&str] = &[
    "Monitor your pet closely and log any changes",
    "Contact your veterinarian if symptoms persist or worsen",
];

pub fn parse_triage(reply: &str) -> TriageAssessment {
    let parsed = split_sections(reply, TRIAGE_LABELS);

    let urgency = parsed
        .text("URGENCY")
        .and_then(|u| Urgency::parse(&u))
        .unwrap_or_default();
    let mut actions = parsed.items("ACTIONS");
    if actions.is_empty() {
        actions = DEFAULT_TRIAGE_ACTIONS.iter().map(|a| a.to_string()).collect();
    }

    TriageAssessment {
        title: parsed
            .text("TITLE")
            .unwrap_or_else(|| DEFAULT_TRIAGE_TITLE.into()),
        urgency,
        summary: summary_or_preamble(&parsed, DEFAULT_TRIAGE_SUMMARY),
        actions,
        warning_signs: parsed.items("WARNING SIGNS"),
    }
}

// =========================================================================
// Care plan
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarePlan {
    pub title: String,
    pub duration: String,
    pub summary: String,
    pub steps: Vec<String>,
    pub tips: Vec<String>,
}

pub const CARE_PLAN_LABELS: &[&str] = &["TITLE", "DURATION", "SUMMARY", "STEPS", "TIPS"];

const DEFAULT_PLAN_TITLE: &str = "Care Plan";
const DEFAULT_PLAN_DURATION: &str = "1 week";

pub fn parse_care_plan(reply: &str) -> CarePlan {
    let parsed = split_sections(reply, CARE_PLAN_LABELS);
    CarePlan {
        title: parsed
            .text("TITLE")
            .unwrap_or_else(|| DEFAULT_PLAN_TITLE.into()),
        duration: parsed
            .text("DURATION")
            .unwrap_or_else(|| DEFAULT_PLAN_DURATION.into()),
        summary: summary_or_preamble(&parsed, ""),
        steps: parsed.items("STEPS"),
        tips: parsed.items("TIPS"),
    }
}

// =========================================================================
// Digest
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestSummary {
    pub headline: String,
    pub highlights: Vec<String>,
    pub concerns: Vec<String>,
}

pub const DIGEST_LABELS: &[&str] = &["HEADLINE", "HIGHLIGHTS", "CONCERNS"];

const DEFAULT_HEADLINE: &str = "Here's your pet's week at a glance.";

pub fn parse_digest(reply: &str) -> DigestSummary {
    let parsed = split_sections(reply, DIGEST_LABELS);
    let headline = parsed
        .text("HEADLINE")
        .or_else(|| non_empty(&parsed.preamble))
        .unwrap_or_else(|| DEFAULT_HEADLINE.into());

    DigestSummary {
        headline,
        highlights: parsed.items("HIGHLIGHTS"),
        concerns: parsed
            .items("CONCERNS")
            .into_iter()
            .filter(|c| !is_none_marker(c))
            .collect(),
    }
}

fn summary_or_preamble(parsed: &ParsedReply, default: &str) -> String {
    parsed
        .text("SUMMARY")
        .or_else(|| non_empty(&parsed.preamble))
        .unwrap_or_else(|| default.to_string())
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn is_none_marker(item: &str) -> bool {
    matches!(
        item.trim_end_matches('.').to_lowercase().as_str(),
        "none" | "n/a" | "nothing" | "no concerns"
    )
}
