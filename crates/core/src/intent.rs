use once_cell::sync::Lazy;
use regex::Regex;

use crate::language;
use crate::models::{ExtractedIntent, Intent, IntentKind, Period};

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

static BUS_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{2,4})\b").expect("valid bus number regex"));

static GREETING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(hi|hii|hiii|hey|hello|namaste|namaskar)\b").expect("valid greeting regex")
});

// Route patterns, tried in order; the first match supplies source/destination.
static ROUTE_EN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:from\s+)?([a-zA-Z\x{0900}-\x{097F}]+)\s+to\s+([a-zA-Z\x{0900}-\x{097F}]+)")
        .expect("valid english route regex")
});
static ROUTE_SE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([a-zA-Z\x{0900}-\x{097F}]+)\s+se\s+([a-zA-Z\x{0900}-\x{097F}]+)(?:\s+(?:tak|ke\s+liye))?",
    )
    .expect("valid hinglish route regex")
});
static ROUTE_DEVANAGARI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z\x{0900}-\x{097F}]+)\s+से\s+([a-zA-Z\x{0900}-\x{097F}]+)(?:\s+तक)?")
        .expect("valid devanagari route regex")
});

pub fn extract_bus_number(text: &str) -> Option<String> {
    BUS_NUMBER_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

pub fn extract_route(text: &str) -> Option<(String, String)> {
    for pattern in [&*ROUTE_EN_RE, &*ROUTE_SE_RE, &*ROUTE_DEVANAGARI_RE] {
        if let Some(caps) = pattern.captures(text) {
            return Some((caps[1].to_string(), caps[2].to_string()));
        }
    }
    None
}

pub fn extract_period(lower: &str) -> Option<Period> {
    let table: [(&[&str], Period); 4] = [
        (&["morning", "subah", "सुबह"], Period::Morning),
        (&["afternoon", "dopahar", "दोपहर"], Period::Afternoon),
        (&["evening", "shaam", "शाम"], Period::Evening),
        (&["night", "raat", "रात"], Period::Night),
    ];

    table
        .iter()
        .find(|(markers, _)| contains_any(lower, markers))
        .map(|(_, period)| *period)
}

pub fn asks_next(lower: &str) -> bool {
    contains_any(lower, &["next", "agla", "agli", "aagle"])
}

pub struct ClassificationRule {
    pub kind: IntentKind,
    pub matches: fn(&str) -> bool,
}

/// Precedence is the slice order: the first matching rule wins, so text
/// carrying both fare and timing markers classifies as a fare query.
pub fn classification_rules() -> &'static [ClassificationRule] {
    static RULES: [ClassificationRule; 7] = [
        ClassificationRule {
            kind: IntentKind::Greeting,
            matches: is_greeting,
        },
        ClassificationRule {
            kind: IntentKind::FareQuery,
            matches: |t| contains_any(t, &["fare", "kiraya", "price", "ticket", "किराया"]),
        },
        ClassificationRule {
            kind: IntentKind::TimingQuery,
            matches: |t| {
                contains_any(
                    t,
                    &[
                        "time", "timing", "schedule", "kab", "baje", "कब", "समय", "टाइम", "बजे",
                    ],
                )
            },
        },
        ClassificationRule {
            kind: IntentKind::TrackQuery,
            matches: |t| {
                contains_any(
                    t,
                    &[
                        "track",
                        "kidhar",
                        "where",
                        "kahan",
                        "location",
                        "कहाँ",
                        "कहां",
                        "bus ka pata",
                    ],
                )
            },
        },
        ClassificationRule {
            kind: IntentKind::StatusQuery,
            matches: |t| {
                contains_any(
                    t,
                    &["status", "on time", "ontime", "late", "delay", "delayed", "लेट", "देरी"],
                )
            },
        },
        ClassificationRule {
            kind: IntentKind::Complaint,
            matches: |t| {
                contains_any(
                    t,
                    &[
                        "complaint",
                        "shikayat",
                        "issue",
                        "problem",
                        "rude",
                        "driver",
                        "bad",
                        "ganda",
                        "gandi",
                        "misbehave",
                        "not found",
                        "missing",
                        "unclean",
                        "dirty",
                        "बदतमीज",
                        "शिकायत",
                        "गंदा",
                        "गंदी",
                    ],
                )
            },
        },
        ClassificationRule {
            kind: IntentKind::RouteQuery,
            matches: |t| extract_route(t).is_some(),
        },
    ];
    &RULES
}

pub fn extract(raw: &str) -> ExtractedIntent {
    let text = normalize_text(raw);
    let lower = text.to_lowercase();
    let language = language::detect(&text);

    let matched = classification_rules()
        .iter()
        .find(|rule| (rule.matches)(&lower))
        .map(|rule| rule.kind)
        .unwrap_or(IntentKind::Unknown);

    let bus_number = extract_bus_number(&lower);

    let intent = match matched {
        IntentKind::Greeting => Intent::Greeting,
        IntentKind::FareQuery => Intent::FareQuery { bus_number },
        IntentKind::TimingQuery => Intent::TimingQuery { bus_number },
        IntentKind::TrackQuery => {
            let route = extract_route(&text);
            Intent::TrackQuery {
                bus_number,
                source: route.as_ref().map(|(src, _)| src.clone()),
                destination: route.map(|(_, dst)| dst),
            }
        }
        IntentKind::StatusQuery => Intent::StatusQuery { bus_number },
        IntentKind::Complaint => Intent::Complaint {
            bus_number,
            complaint_text: text.clone(),
        },
        IntentKind::RouteQuery => match extract_route(&text) {
            Some((source, destination)) => Intent::RouteQuery {
                source,
                destination,
                period: extract_period(&lower),
                ask_next: asks_next(&lower),
            },
            None => Intent::Unknown,
        },
        IntentKind::Unknown => Intent::Unknown,
    };

    ExtractedIntent { intent, language }
}

fn is_greeting(lower: &str) -> bool {
    GREETING_RE.is_match(lower) || lower.contains("नमस्ते") || lower.contains("नमस्कार")
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
