//! Local response generator used whenever the remote endpoint cannot answer.
//!
//! Maps free-text input to a canned reply with plain keyword heuristics:
//! - A personal greeting wins over everything else
//! - Categories are checked in table order; the first one with any keyword
//!   contained in the lowercased input wins (no scoring)
//! - Within a category the reply is picked through a [`ResponsePicker`]
//!
//! Matching is substring based, so short keywords like `hi` or `ai` also hit
//! inside longer words ("this", "rain").

use rand::RngExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulated "thinking" latency bounds for demo replies (milliseconds).
const SIMULATED_DELAY_MIN_MS: u64 = 500;
const SIMULATED_DELAY_MAX_MS: u64 = 1200;

/// Substrings that trigger the fixed personal greeting.
const PERSONAL_PATTERNS: &[&str] = &["norman", "dad"];

const PERSONAL_RESPONSES: &[&str] = &["Hello Norman! I'm currently in offline mode with limited connectivity to my knowledge center. While I can't access external information, I can still chat with you about general topics."];

// ── Categories ───────────────────────────────────────────────────

/// Which canned-reply bucket an input falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfflineCategory {
    /// Fixed personalized greeting.
    Personal,
    Greeting,
    Help,
    ArtificialIntelligence,
    /// Real-time weather is explicitly unsupported offline.
    Weather,
    Programming,
    Workflow,
    Brainstorming,
    /// Nothing matched; reply comes from the default pool.
    Default,
}

impl OfflineCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Greeting => "greeting",
            Self::Help => "help",
            Self::ArtificialIntelligence => "ai",
            Self::Weather => "weather",
            Self::Programming => "programming",
            Self::Workflow => "workflow",
            Self::Brainstorming => "brainstorming",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for OfflineCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

struct ResponseCategory {
    category: OfflineCategory,
    keywords: &'static [&'static str],
    responses: &'static [&'static str],
}

/// Ordered category table. Order is the tie-breaker.
const RESPONSE_CATEGORIES: &[ResponseCategory] = &[
    ResponseCategory {
        category: OfflineCategory::Greeting,
        keywords: &["hello", "hi", "hey", "greetings", "morning", "afternoon", "evening"],
        responses: &[
            "Hello! I'm operating in offline mode right now, but I'm still here to help with what I can.",
            "Hi there! While my connection to the knowledge center is limited, I can still assist you with basic information.",
            "Hey! I'm currently using my local knowledge base. What would you like to chat about?",
        ],
    },
    ResponseCategory {
        category: OfflineCategory::Help,
        keywords: &["help", "assist", "support", "guidance", "how to", "how do"],
        responses: &[
            "I'd be happy to help with what I can while in offline mode. What specifically do you need assistance with?",
            "I can provide general guidance even with limited connectivity. Could you describe what you need help with?",
            "While operating on local knowledge only, I can still try to assist. What's your question?",
        ],
    },
    ResponseCategory {
        category: OfflineCategory::ArtificialIntelligence,
        keywords: &[
            "ai",
            "artificial intelligence",
            "machine learning",
            "neural",
            "model",
            "algorithm",
            "data science",
        ],
        responses: &[
            "AI is a fascinating field! Even in offline mode, I can discuss general AI concepts. What specific aspect interests you?",
            "I know quite a bit about AI fundamentals even with limited connectivity. What would you like to explore?",
            "Artificial intelligence encompasses many areas from machine learning to neural networks. Is there a particular aspect you're curious about?",
        ],
    },
    ResponseCategory {
        category: OfflineCategory::Weather,
        keywords: &["weather", "forecast", "temperature", "rain", "snow", "sunny"],
        responses: &[
            "I'm sorry, I can't access real-time weather data in offline mode. I'd be happy to help with something else though!",
            "Without connectivity to my knowledge center, I can't provide current weather information. Is there something else I can assist with?",
            "Weather information requires online access to current data, which I can't retrieve right now. How about we talk about something else?",
        ],
    },
    ResponseCategory {
        category: OfflineCategory::Programming,
        keywords: &[
            "code",
            "programming",
            "develop",
            "software",
            "app",
            "application",
            "web",
            "javascript",
            "python",
            "java",
        ],
        responses: &[
            "I can still discuss programming concepts while offline. What are you working on?",
            "Even in offline mode, I can talk about general coding principles and practices. What language or framework are you using?",
            "Software development is a broad field. Even with limited connectivity, I can chat about programming fundamentals. What's your focus area?",
        ],
    },
    ResponseCategory {
        category: OfflineCategory::Workflow,
        keywords: &["framework", "work", "flow", "workflow", "process", "methodology"],
        responses: &[
            "I notice you're interested in frameworks or workflows. In offline mode, I can discuss general development methodologies. What specific approach are you considering?",
            "Even with limited connectivity, I can chat about different development frameworks and workflows. What particular aspect interests you?",
            "While working offline, I can still share information about software development processes. What methodology would you like to explore?",
        ],
    },
    ResponseCategory {
        category: OfflineCategory::Brainstorming,
        keywords: &["brainstorm", "idea", "creative", "think", "concept", "innovation", "solara"],
        responses: &[
            "I'd be happy to brainstorm with you, even in offline mode! What topic should we explore?",
            "Brainstorming is definitely something I can help with, even with limited connectivity. What are we thinking about?",
            "Creative thinking doesn't require online connectivity! What ideas are you considering that we could explore together?",
        ],
    },
];

const DEFAULT_RESPONSES: &[&str] = &[
    "I understand your message, but I'm currently operating with limited capabilities in offline mode. Could you try asking something else?",
    "While my connection to the knowledge center is limited, I can still chat about general topics. What else would you like to discuss?",
    "I'm currently in offline mode with access to only local knowledge. I might not be able to provide specific information, but I'm happy to continue our conversation on broader topics.",
];

// ── Random source ────────────────────────────────────────────────

/// Source of the uniform choice among a category's canned replies.
pub trait ResponsePicker {
    /// Return an index in `0..len`. `len` is always non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Picker backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngPicker;

impl ResponsePicker for ThreadRngPicker {
    fn pick(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Deterministic picker that cycles through a fixed index sequence.
///
/// Indices are reduced modulo `len`, so any sequence is valid for any table.
#[derive(Debug, Clone)]
pub struct SequencePicker {
    indices: Vec<usize>,
    cursor: usize,
}

impl SequencePicker {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices, cursor: 0 }
    }

    /// Always picks the first reply.
    pub fn first() -> Self {
        Self::new(vec![0])
    }
}

impl ResponsePicker for SequencePicker {
    fn pick(&mut self, len: usize) -> usize {
        if self.indices.is_empty() {
            return 0;
        }
        let idx = self.indices[self.cursor % self.indices.len()];
        self.cursor = self.cursor.wrapping_add(1);
        idx % len
    }
}

// ── Generation ───────────────────────────────────────────────────

/// Decide which category an input falls into. Stable: no randomness.
pub fn classify_offline_input(input: &str) -> OfflineCategory {
    let lower = input.to_lowercase();

    if PERSONAL_PATTERNS.iter().any(|p| lower.contains(p)) {
        return OfflineCategory::Personal;
    }

    RESPONSE_CATEGORIES
        .iter()
        .find(|c| c.keywords.iter().any(|k| lower.contains(k)))
        .map_or(OfflineCategory::Default, |c| c.category)
}

/// Produce a local reply for `input`, choosing among canned replies with `picker`.
///
/// Never fails and never returns an empty string.
pub fn generate_offline_response(
    input: &str,
    user: &str,
    picker: &mut dyn ResponsePicker,
) -> String {
    let category = classify_offline_input(input);
    tracing::debug!(user, category = %category, "Generating offline response");

    let pool = responses_for(category);
    if pool.len() == 1 {
        return pool[0].to_string();
    }
    pool[picker.pick(pool.len()) % pool.len()].to_string()
}

/// [`generate_offline_response`] with the thread RNG.
pub fn generate_offline_response_random(input: &str, user: &str) -> String {
    generate_offline_response(input, user, &mut ThreadRngPicker)
}

/// Local reply delivered after a random 500–1200 ms pause, for demo mode.
pub async fn simulated_offline_response(input: &str, user: &str) -> String {
    let delay_ms = rand::rng().random_range(SIMULATED_DELAY_MIN_MS..=SIMULATED_DELAY_MAX_MS);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    generate_offline_response_random(input, user)
}

/// All canned replies a category can produce.
pub fn responses_for(category: OfflineCategory) -> &'static [&'static str] {
    match category {
        OfflineCategory::Personal => PERSONAL_RESPONSES,
        OfflineCategory::Default => DEFAULT_RESPONSES,
        other => RESPONSE_CATEGORIES
            .iter()
            .find(|c| c.category == other)
            .map_or(DEFAULT_RESPONSES, |c| c.responses),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(input: &str) -> String {
        generate_offline_response(input, "tester", &mut SequencePicker::first())
    }

    #[test]
    fn hello_is_always_a_greeting() {
        for _ in 0..20 {
            assert_eq!(classify_offline_input("hello"), OfflineCategory::Greeting);
            let text = generate_offline_response_random("hello", "tester");
            assert!(responses_for(OfflineCategory::Greeting).iter().any(|r| *r == text));
        }
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify_offline_input("HELLO THERE"), OfflineCategory::Greeting);
        assert_eq!(classify_offline_input("Python Code"), OfflineCategory::Programming);
    }

    #[test]
    fn personal_greeting_beats_categories() {
        assert_eq!(classify_offline_input("hello norman"), OfflineCategory::Personal);
        assert_eq!(classify_offline_input("Hey Dad"), OfflineCategory::Personal);
        assert!(reply("norman here").starts_with("Hello Norman!"));
    }

    #[test]
    fn categories_follow_table_order() {
        assert_eq!(classify_offline_input("can you assist me"), OfflineCategory::Help);
        assert_eq!(classify_offline_input("neural networks"), OfflineCategory::ArtificialIntelligence);
        assert_eq!(classify_offline_input("weather forecast tomorrow"), OfflineCategory::Weather);
        assert_eq!(classify_offline_input("python code"), OfflineCategory::Programming);
        assert_eq!(classify_offline_input("workflow process"), OfflineCategory::Workflow);
        assert_eq!(classify_offline_input("a new idea"), OfflineCategory::Brainstorming);
    }

    #[test]
    fn substring_matching_lets_earlier_categories_win() {
        // "rain" contains "ai", and the AI category precedes weather.
        assert_eq!(classify_offline_input("will it rain"), OfflineCategory::ArtificialIntelligence);
        // "think" contains "hi", and greetings come first.
        assert_eq!(classify_offline_input("think"), OfflineCategory::Greeting);
    }

    #[test]
    fn unmatched_input_uses_default_pool() {
        assert_eq!(classify_offline_input("qwerty zxcv"), OfflineCategory::Default);
        assert_eq!(reply("qwerty zxcv"), DEFAULT_RESPONSES[0]);
        assert_eq!(classify_offline_input(""), OfflineCategory::Default);
        assert!(!reply("").is_empty());
    }

    #[test]
    fn picker_selects_within_category() {
        let mut picker = SequencePicker::new(vec![2, 1]);
        let first = generate_offline_response("python", "tester", &mut picker);
        let second = generate_offline_response("python", "tester", &mut picker);
        let pool = responses_for(OfflineCategory::Programming);
        assert_eq!(first, pool[2]);
        assert_eq!(second, pool[1]);
    }

    #[test]
    fn same_picker_sequence_gives_same_text() {
        let a = generate_offline_response("help me", "u", &mut SequencePicker::new(vec![1]));
        let b = generate_offline_response("help me", "u", &mut SequencePicker::new(vec![1]));
        assert_eq!(a, b);
    }

    #[test]
    fn out_of_range_indices_wrap() {
        let text = generate_offline_response("hello", "u", &mut SequencePicker::new(vec![7]));
        assert_eq!(text, responses_for(OfflineCategory::Greeting)[1]);
        let empty = generate_offline_response("hello", "u", &mut SequencePicker::new(Vec::new()));
        assert_eq!(empty, responses_for(OfflineCategory::Greeting)[0]);
    }

    #[test]
    fn every_category_has_replies() {
        for c in RESPONSE_CATEGORIES {
            assert!(!c.responses.is_empty(), "{} has no replies", c.category);
            assert!(c.responses.iter().all(|r| !r.is_empty()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_reply_waits_then_answers() {
        let start = tokio::time::Instant::now();
        let text = simulated_offline_response("hello", "tester").await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(SIMULATED_DELAY_MIN_MS));
        assert!(waited <= Duration::from_millis(SIMULATED_DELAY_MAX_MS + 50));
        assert!(responses_for(OfflineCategory::Greeting).iter().any(|r| *r == text));
    }
}
