//! Tool attribution for assistant answers.
//!
//! The backend usually reports which tool produced an answer. When it does not,
//! the answer text is scanned against an ordered rule table. The first rule that
//! matches decides the category; the table order is the priority order.

use regex::Regex;
use tracing::debug;

use crate::types::ToolCategory;

/// Substrings looked for in a lowercased server tag, in priority order.
const TAG_KEYWORDS: &[(&str, ToolCategory)] = &[
    ("weather", ToolCategory::Weather),
    ("dictionary", ToolCategory::Dictionary),
    ("define", ToolCategory::Dictionary),
    ("search", ToolCategory::WebSearch),
    ("assistant", ToolCategory::Assistant),
];

/// Substrings looked for in the lowercased answer text, grouped by category.
const TEXT_KEYWORDS: &[(ToolCategory, &[&str])] = &[
    (
        ToolCategory::Weather,
        &["weather", "temperature", "°c", "°f", "humidity", "condition:"],
    ),
    (
        ToolCategory::Dictionary,
        &["definition", "meaning", "means", "defined as"],
    ),
    (
        ToolCategory::WebSearch,
        &["search", "found", "according to", "source", "information about"],
    ),
];

/// Patterns checked after a category's keywords, against the text as written.
const TEXT_PATTERNS: &[(ToolCategory, &str)] = &[
    (ToolCategory::Weather, r"(?i)temperature:\s*\d+\.?\d*\s*°[cf]"),
    (ToolCategory::Dictionary, r#"(?i)"([^"]+)"\s+(means|is)"#),
];

/// What a rule looks for.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Substring of the lowercased text.
    Contains(&'static str),
    /// Regex over the text as received.
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, text: &str, lowered: &str) -> bool {
        match self {
            Matcher::Contains(needle) => lowered.contains(needle),
            Matcher::Pattern(re) => re.is_match(text),
        }
    }
}

/// One predicate → category row of the rule table.
#[derive(Debug, Clone)]
pub struct Rule {
    pub category: ToolCategory,
    pub matcher: Matcher,
}

/// Resolves the display category of an answer.
#[derive(Debug, Clone)]
pub struct ToolClassifier {
    rules: Vec<Rule>,
}

impl ToolClassifier {
    /// Build the classifier with the built-in rule table.
    pub fn new() -> Self {
        let mut rules = Vec::new();
        for (category, keywords) in TEXT_KEYWORDS {
            rules.extend(keywords.iter().map(|k| Rule {
                category: *category,
                matcher: Matcher::Contains(*k),
            }));
            rules.extend(
                TEXT_PATTERNS
                    .iter()
                    .filter(|(c, _)| c == category)
                    .filter_map(|(_, p)| Regex::new(p).ok())
                    .map(|re| Rule {
                        category: *category,
                        matcher: Matcher::Pattern(re),
                    }),
            );
        }
        Self { rules }
    }

    /// The text rules in the order they are evaluated.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Resolve the category of an answer, preferring the server's tag when present.
    pub fn classify(&self, answer: &str, tag: Option<&str>) -> ToolCategory {
        if let Some(category) = tag.and_then(Self::from_tag) {
            debug!(?tag, ?category, "Resolved tool from server tag");
            return category;
        }
        let category = self.from_text(answer);
        debug!(?category, "Resolved tool from answer text");
        category
    }

    /// Map a server tag to a category. Blank tags are inconclusive (`None`);
    /// anything else resolves, unknown tags to the default category.
    pub fn from_tag(tag: &str) -> Option<ToolCategory> {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return None;
        }
        let category = TAG_KEYWORDS
            .iter()
            .find(|(keyword, _)| tag.contains(keyword))
            .map(|(_, category)| *category)
            .unwrap_or_default();
        Some(category)
    }

    /// Classify by scanning the answer text. Falls back to the default category.
    pub fn from_text(&self, answer: &str) -> ToolCategory {
        let lowered = answer.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(answer, &lowered))
            .map(|rule| rule.category)
            .unwrap_or_default()
    }
}

impl Default for ToolClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_tag_wins_over_text() {
        let classifier = ToolClassifier::new();
        let answer = "\"Visa\" means an entry permit. Found via search.";
        for tag in ["weather", "get_weather", "GET_WEATHER", "LiveWeatherTool"] {
            assert_eq!(classifier.classify(answer, Some(tag)), ToolCategory::Weather);
        }
    }

    #[test]
    fn test_tag_mapping() {
        assert_eq!(ToolClassifier::from_tag("define_word"), Some(ToolCategory::Dictionary));
        assert_eq!(ToolClassifier::from_tag("Dictionary"), Some(ToolCategory::Dictionary));
        assert_eq!(ToolClassifier::from_tag("web_search"), Some(ToolCategory::WebSearch));
        assert_eq!(ToolClassifier::from_tag("assistant"), Some(ToolCategory::Assistant));
    }

    #[test]
    fn test_unknown_tag_resolves_to_default_without_text_scan() {
        let classifier = ToolClassifier::new();
        assert_eq!(ToolClassifier::from_tag("calculator"), Some(ToolCategory::Assistant));
        assert_eq!(
            classifier.classify("Temperature: 30°C", Some("calculator")),
            ToolCategory::Assistant
        );
    }

    #[test]
    fn test_blank_tag_falls_back_to_text() {
        let classifier = ToolClassifier::new();
        assert_eq!(ToolClassifier::from_tag("   "), None);
        assert_eq!(
            classifier.classify("Humidity is 80%", Some("")),
            ToolCategory::Weather
        );
    }

    #[test]
    fn test_temperature_reading_is_weather() {
        let classifier = ToolClassifier::new();
        assert_eq!(
            classifier.classify("Temperature: 18.5°C", None),
            ToolCategory::Weather
        );
    }

    #[test]
    fn test_temperature_pattern_alone() {
        let rule = ToolClassifier::new()
            .rules()
            .iter()
            .find_map(|r| match &r.matcher {
                Matcher::Pattern(re) if r.category == ToolCategory::Weather => Some(re.clone()),
                _ => None,
            })
            .unwrap();
        assert!(rule.is_match("TEMPERATURE:  21 °F"));
        assert!(rule.is_match("temperature:18.5°c"));
        assert!(!rule.is_match("temperature is mild"));
    }

    #[test]
    fn test_quoted_word_means_is_dictionary() {
        let classifier = ToolClassifier::new();
        assert_eq!(
            classifier.classify("\"Petrichor\" means the smell of rain", None),
            ToolCategory::Dictionary
        );
        assert_eq!(
            classifier.classify("\"Layover\" is a short stay between connecting flights.", None),
            ToolCategory::Dictionary
        );
    }

    #[test]
    fn test_web_search_keywords() {
        let classifier = ToolClassifier::new();
        assert_eq!(
            classifier.classify("According to recent travel advisories, Lagos is busy.", None),
            ToolCategory::WebSearch
        );
        assert_eq!(
            classifier.classify("- Route guide: buses leave hourly (source: travel blog)", None),
            ToolCategory::WebSearch
        );
    }

    #[test]
    fn test_no_keywords_is_default() {
        let classifier = ToolClassifier::new();
        assert_eq!(
            classifier.classify("Paris is lovely in spring.", None),
            ToolCategory::Assistant
        );
        assert_eq!(classifier.classify("", None), ToolCategory::Assistant);
    }

    #[test]
    fn test_weather_outranks_dictionary_and_search() {
        let classifier = ToolClassifier::new();
        let answer = "The meaning of today's forecast: humidity 70%, found online.";
        assert_eq!(classifier.classify(answer, None), ToolCategory::Weather);

        let answer = "The definition was found in a search.";
        assert_eq!(classifier.classify(answer, None), ToolCategory::Dictionary);
    }

    #[test]
    fn test_rule_table_order() {
        let classifier = ToolClassifier::new();
        let categories: Vec<ToolCategory> =
            classifier.rules().iter().map(|r| r.category).collect();
        let first_dictionary = categories
            .iter()
            .position(|c| *c == ToolCategory::Dictionary)
            .unwrap();
        let last_weather = categories
            .iter()
            .rposition(|c| *c == ToolCategory::Weather)
            .unwrap();
        let first_search = categories
            .iter()
            .position(|c| *c == ToolCategory::WebSearch)
            .unwrap();
        assert!(last_weather < first_dictionary);
        assert!(first_dictionary < first_search);
        assert!(!categories.contains(&ToolCategory::Assistant));
        // Both regex rules compiled.
        let patterns = classifier
            .rules()
            .iter()
            .filter(|r| matches!(r.matcher, Matcher::Pattern(_)))
            .count();
        assert_eq!(patterns, 2);
    }
}
