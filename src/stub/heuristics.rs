//! Deterministic text helpers that stand in for the AI service.
//!
//! They are deliberately shallow: enough to give the stub plausible,
//! repeatable answers, nothing more.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::models::Priority;

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "been", "before", "being", "could", "does", "each", "from",
    "have", "into", "just", "like", "more", "most", "much", "need", "only", "other", "over",
    "should", "some", "such", "than", "that", "their", "them", "then", "there", "these",
    "they", "this", "those", "through", "very", "want", "were", "what", "when", "where",
    "which", "while", "will", "with", "would", "your",
];

const ACTION_MARKERS: &[&str] = &[
    "need to", "needs to", "have to", "has to", "must", "should", "remember to",
    "don't forget to", "please", "todo", "to-do", "submit", "finish", "prepare",
];

const SCHEDULE_PREFIXES: &[&str] = &[
    "schedule", "add", "create", "book", "set up", "plan", "remind me to", "remind me about",
];

pub const MAX_KEYWORDS: usize = 5;

/// First sentence, capped at 200 characters.
pub fn summarize(content: &str) -> String {
    let trimmed = content.trim();
    let end = trimmed
        .find(['.', '!', '?'])
        .map(|i| i + 1)
        .unwrap_or(trimmed.len());
    truncate(&trimmed[..end], 200)
}

/// Most frequent meaningful words, ties broken by first appearance.
pub fn keywords(text: &str) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, word) in words(text).enumerate() {
        if word.len() < 4 || STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        let entry = counts.entry(word).or_insert((0, position));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.1.1.cmp(&b.1.1)));
    ranked.into_iter().take(MAX_KEYWORDS).map(|(w, _)| w).collect()
}

pub fn insights(title: &str, content: &str) -> String {
    let word_count = words(content).count();
    let sentence_count = sentences(content).count().max(1);
    let themes = keywords(&format!("{} {}", title, content));
    if themes.is_empty() {
        format!("\"{}\" has {} words in {} sentences.", title, word_count, sentence_count)
    } else {
        format!(
            "\"{}\" has {} words in {} sentences. Key themes: {}.",
            title,
            word_count,
            sentence_count,
            themes.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTask {
    pub title: String,
    pub deadline: Option<String>,
    pub priority: Priority,
}

/// One task per sentence that reads like something to do.
pub fn extract_tasks(conversation: &str, today: NaiveDate) -> Vec<ExtractedTask> {
    sentences(conversation)
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            ACTION_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .map(|sentence| {
            let lower = sentence.to_lowercase();
            ExtractedTask {
                title: capitalize(&truncate(sentence, 80)),
                deadline: relative_date(&lower, today).map(|d| d.format("%Y-%m-%d").to_string()),
                priority: priority_of(&lower),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    pub title: String,
    pub date: String,
    pub time: String,
    pub description: String,
}

pub fn parse_schedule(text: &str, today: NaiveDate) -> ParsedEvent {
    let trimmed = text.trim().trim_end_matches(['.', '!']);
    let lower = trimmed.to_lowercase();

    let date = relative_date(&lower, today)
        .or_else(|| explicit_date(&lower))
        .unwrap_or(today);
    let time = clock_time(&lower).unwrap_or_else(|| "09:00".to_string());

    ParsedEvent {
        title: event_title(trimmed),
        date: date.format("%Y-%m-%d").to_string(),
        time,
        description: trimmed.to_string(),
    }
}

/// Strips a leading command word and everything from the first date or time
/// phrase on. Cut points are found on `original` itself so multi-byte text
/// keeps its boundaries.
fn event_title(original: &str) -> String {
    let start = SCHEDULE_PREFIXES
        .iter()
        .find_map(|prefix| {
            let head = original.get(..prefix.len())?;
            let rest = &original[prefix.len()..];
            (head.eq_ignore_ascii_case(prefix) && rest.starts_with(char::is_whitespace))
                .then_some(prefix.len())
        })
        .unwrap_or(0);

    let mut cuts = vec![
        " today", " tonight", " tomorrow", " next ", " this ", " on ", " at ", " in ",
    ];
    let weekday_cuts: Vec<String> = WEEKDAYS.iter().map(|(name, _)| format!(" {}", name)).collect();
    cuts.extend(weekday_cuts.iter().map(String::as_str));

    let end = original[start..]
        .char_indices()
        .map(|(i, _)| start + i)
        .find(|&i| cuts.iter().any(|cut| starts_with_ignore_ascii_case(&original[i..], cut)))
        .unwrap_or(original.len());

    let title = original[start..end].trim();
    let title = title
        .strip_prefix("a ")
        .or_else(|| title.strip_prefix("an "))
        .unwrap_or(title);
    if title.is_empty() {
        "Scheduled Event".to_string()
    } else {
        capitalize(title)
    }
}

fn starts_with_ignore_ascii_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

fn relative_date(lower: &str, today: NaiveDate) -> Option<NaiveDate> {
    if lower.contains("tomorrow") {
        return Some(today + Duration::days(1));
    }
    if lower.contains("today") || lower.contains("tonight") {
        return Some(today);
    }
    if lower.contains("next week") {
        return Some(today + Duration::days(7));
    }
    WEEKDAYS
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, weekday)| next_weekday(today, *weekday))
}

fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let mut ahead = (wanted - current).rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }
    today + Duration::days(ahead)
}

fn explicit_date(lower: &str) -> Option<NaiveDate> {
    lower
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_ascii_digit() && c != '-'))
        .find_map(|token| NaiveDate::parse_from_str(token, "%Y-%m-%d").ok())
}

/// Finds "3 pm", "3pm", "3:30 pm", "15:30" or "at 3". Bare numbers elsewhere
/// are ignored so that "Math 101" is not read as a time.
fn clock_time(lower: &str) -> Option<String> {
    let tokens: Vec<&str> = lower
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| c == ',' || c == '.' || c == '!' || c == '?'))
        .collect();

    for (i, token) in tokens.iter().enumerate() {
        let (number, suffix) = split_meridiem(token);
        let suffix = suffix.or_else(|| {
            tokens
                .get(i + 1)
                .and_then(|next| match *next {
                    "am" | "a.m" | "a.m." => Some("am"),
                    "pm" | "p.m" | "p.m." => Some("pm"),
                    _ => None,
                })
        });
        let after_at = i > 0 && tokens[i - 1] == "at";

        let Some((hour, minute)) = parse_clock(number) else {
            continue;
        };
        if suffix.is_none() && !number.contains(':') && !after_at {
            continue;
        }

        let hour = match suffix {
            Some("pm") if hour < 12 => hour + 12,
            Some("am") if hour == 12 => 0,
            _ => hour,
        };
        if hour < 24 && minute < 60 {
            return Some(format!("{:02}:{:02}", hour, minute));
        }
    }
    None
}

fn split_meridiem(token: &str) -> (&str, Option<&'static str>) {
    if let Some(number) = token.strip_suffix("am") {
        (number, Some("am"))
    } else if let Some(number) = token.strip_suffix("pm") {
        (number, Some("pm"))
    } else {
        (token, None)
    }
}

fn parse_clock(raw: &str) -> Option<(u32, u32)> {
    if raw.is_empty() {
        return None;
    }
    let (hour, minute) = match raw.split_once(':') {
        Some((h, m)) => (h.parse().ok()?, m.parse().ok()?),
        None => (raw.parse().ok()?, 0),
    };
    Some((hour, minute))
}

fn priority_of(lower: &str) -> Priority {
    if ["urgent", "asap", "immediately", "critical", "important"]
        .iter()
        .any(|w| lower.contains(w))
    {
        Priority::High
    } else if ["whenever", "eventually", "sometime", "no rush"]
        .iter()
        .any(|w| lower.contains(w))
    {
        Priority::Low
    } else {
        Priority::Medium
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '-' && c != '\'')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect::<String>().trim().to_string()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
