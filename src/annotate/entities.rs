//! Lightweight named-entity tagging.
//!
//! Two passes: pattern matches for structured spans (emails, URLs, money,
//! percentages, dates, times), then runs of capitalized words classified as
//! organizations, places, or people. A later pass never claims text an
//! earlier pass already matched.

use std::sync::LazyLock;

use regex::Regex;

use super::EntitySet;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid EMAIL regex")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bhttps?://[^\s<>"']*[^\s<>"'.,!?;:)]"#).expect("valid URL regex")
});

static MONEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[$€£¥]\s?\d[\d,]*(?:\.\d+)?(?:\s?(?:million|billion|thousand|bn|k)\b)?|\b\d[\d,]*(?:\.\d+)?\s?(?:dollars|euros|pounds|yen|usd|eur|gbp)\b",
    )
    .expect("valid MONEY regex")
});

static PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+(?:\.\d+)?(?:%|\s?percent\b)").expect("valid PERCENT regex")
});

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?\b|\b\d{4}-\d{2}-\d{2}\b|\b\d{1,2}/\d{1,2}/\d{2,4}\b|\b(?:(?:next|last|this)\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b|\b(?:next|last|this)\s+(?:week|month|year)\b|\b(?:today|tomorrow|yesterday)\b",
    )
    .expect("valid DATE regex")
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(?:[01]?\d|2[0-3]):[0-5]\d(?:\s?[ap]m)?|(?:1[0-2]|0?[1-9])\s?[ap]m)\b")
        .expect("valid TIME regex")
});

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'&-]*").expect("valid WORD regex"));

// Order matters: earlier patterns claim their spans first.
static PATTERNS: LazyLock<[(&'static str, &'static Regex); 6]> = LazyLock::new(|| {
    [
        ("EMAIL", &*EMAIL),
        ("URL", &*URL),
        ("MONEY", &*MONEY),
        ("PERCENT", &*PERCENT),
        ("DATE", &*DATE),
        ("TIME", &*TIME),
    ]
});

const HONORIFICS: &[&str] = &["Mr", "Mrs", "Ms", "Miss", "Dr", "Prof", "Sir", "Dame", "Lord", "Lady"];

/// Words joining capitalized words inside one name ("Bank of America").
const CONNECTORS: &[&str] = &["of", "de", "von", "van", "da", "del"];

/// Capitalized words that start sentences or questions rather than names.
const COMMON_CAPITALIZED: &[&str] = &[
    "I", "I'm", "I've", "I'll", "I'd", "A", "An", "The", "This", "That", "These", "Those",
    "What", "What's", "How", "Why", "When", "Where", "Who", "Which", "Hello", "Hi", "Hey",
    "My", "Your", "Our", "Their", "His", "Her", "Its", "Please", "Can", "Could", "Would",
    "Should", "Will", "Is", "Are", "Was", "Were", "Do", "Does", "Did", "Tell", "Give", "Show",
    "Explain", "Write", "Thanks", "Thank", "Yes", "No", "Ok", "OK", "We", "You", "He", "She",
    "They", "It", "In", "On", "At", "And", "But", "Or", "If", "So", "Also", "Then", "There",
    "Here", "Let", "Let's", "Maybe", "Today", "Tomorrow", "Yesterday", "Monday", "Tuesday",
    "Wednesday", "Thursday", "Friday", "Saturday", "Sunday", "January", "February", "March",
    "April", "May", "June", "July", "August", "September", "October", "November", "December",
];

const ORG_SUFFIXES: &[&str] = &[
    "Inc", "Corp", "Corporation", "Ltd", "LLC", "Co", "Company", "Group", "Bank", "Labs",
    "Technologies", "Systems", "Foundation", "Institute", "University", "College", "Agency",
    "Association", "Airlines", "Motors",
];

const ORG_PREFIXES: &[&str] = &["University", "Bank", "Institute", "Department", "Ministry"];

const KNOWN_ORGS: &[&str] = &[
    "google", "microsoft", "apple", "amazon", "meta", "facebook", "openai", "anthropic",
    "netflix", "tesla", "spacex", "nasa", "ibm", "intel", "nvidia", "amd", "samsung", "sony",
    "twitter", "discord", "telegram", "github", "mozilla", "unicef", "fbi", "cia", "nato",
    "un", "who", "unesco", "bbc", "cnn", "harvard", "stanford", "oxford", "cambridge", "mit",
];

const PLACES: &[&str] = &[
    "africa", "america", "amsterdam", "argentina", "asia", "athens", "australia", "austria",
    "bangkok", "barcelona", "beijing", "belgium", "berlin", "brazil", "brussels", "buenos aires",
    "cairo", "california", "canada", "chicago", "chile", "china", "colombia", "delhi", "denmark",
    "dubai", "dublin", "egypt", "england", "europe", "finland", "florida", "france", "germany",
    "greece", "hong kong", "india", "indonesia", "ireland", "istanbul", "italy", "japan",
    "kenya", "lagos", "lisbon", "london", "los angeles", "madrid", "mexico", "mexico city",
    "milan", "moscow", "mumbai", "nairobi", "netherlands", "new delhi", "new york",
    "new york city", "new zealand", "nigeria", "norway", "paris", "peru", "poland", "portugal",
    "prague", "rome", "russia", "san francisco", "scotland", "seoul", "singapore",
    "south africa", "south korea", "spain", "stockholm", "sweden", "switzerland", "sydney",
    "texas", "tokyo", "toronto", "turkey", "ukraine", "united kingdom", "united states", "usa",
    "uk", "vienna", "vietnam", "wales", "warsaw", "washington", "zurich",
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Mention {
    label: &'static str,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Copy)]
struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

fn overlaps(claimed: &[(usize, usize)], start: usize, end: usize) -> bool {
    claimed.iter().any(|&(s, e)| start < e && s < end)
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Whether two adjacent words belong to the same name.
fn joined(text: &str, left: &Word<'_>, right: &Word<'_>) -> bool {
    let gap = &text[left.end..right.start];
    if !gap.is_empty() && gap.chars().all(char::is_whitespace) {
        return true;
    }
    // "Dr. Smith"
    HONORIFICS.contains(&left.text)
        && gap.len() > 1
        && gap.starts_with('.')
        && gap[1..].chars().all(char::is_whitespace)
}

/// Index ranges of maximal capitalized runs in `words`.
fn capitalized_runs(text: &str, words: &[Word<'_>]) -> Vec<std::ops::Range<usize>> {
    let mut runs = Vec::new();
    let mut i = 0;

    while i < words.len() {
        if !is_capitalized(words[i].text) {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i + 1;
        loop {
            if end < words.len()
                && is_capitalized(words[end].text)
                && joined(text, &words[end - 1], &words[end])
            {
                end += 1;
            } else if end + 1 < words.len()
                && CONNECTORS.contains(&words[end].text)
                && is_capitalized(words[end + 1].text)
                && joined(text, &words[end - 1], &words[end])
                && joined(text, &words[end], &words[end + 1])
            {
                end += 2;
            } else {
                break;
            }
        }

        runs.push(start..end);
        i = end;
    }

    runs
}

fn classify_run(text: &str, run: &[Word<'_>]) -> Option<Mention> {
    let is_common = |w: &&Word<'_>| COMMON_CAPITALIZED.contains(&w.text);
    let skip = run.iter().take_while(is_common).count();
    let run = &run[skip..];
    let keep = run.len()
        - run
            .iter()
            .rev()
            .take_while(|w| is_common(w) || CONNECTORS.contains(&w.text))
            .count();
    let run = &run[..keep];
    let first = run.first()?;
    let last = run.last()?;

    if HONORIFICS.contains(&first.text) {
        let name = &run[1..];
        return Some(Mention {
            label: "PERSON",
            start: name.first()?.start,
            end: name.last()?.end,
        });
    }

    let lower = text[first.start..last.end].to_lowercase();
    let label = if ORG_SUFFIXES.contains(&last.text)
        || (run.len() > 1 && ORG_PREFIXES.contains(&first.text))
        || KNOWN_ORGS.contains(&lower.as_str())
    {
        "ORG"
    } else if PLACES.contains(&lower.as_str()) {
        "GPE"
    } else if run.len() >= 2 {
        "PERSON"
    } else {
        return None;
    };

    Some(Mention {
        label,
        start: first.start,
        end: last.end,
    })
}

fn mentions(text: &str) -> Vec<Mention> {
    let mut found = Vec::new();
    let mut claimed: Vec<(usize, usize)> = Vec::new();

    for &(label, pattern) in PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            if overlaps(&claimed, m.start(), m.end()) {
                continue;
            }
            claimed.push((m.start(), m.end()));
            found.push(Mention {
                label,
                start: m.start(),
                end: m.end(),
            });
        }
    }

    let words: Vec<Word<'_>> = WORD
        .find_iter(text)
        .map(|m| Word {
            text: m.as_str(),
            start: m.start(),
            end: m.end(),
        })
        .collect();

    for run in capitalized_runs(text, &words) {
        let Some(mention) = classify_run(text, &words[run]) else {
            continue;
        };
        if overlaps(&claimed, mention.start, mention.end) {
            continue;
        }
        claimed.push((mention.start, mention.end));
        found.push(mention);
    }

    found.sort_by_key(|m| m.start);
    found
}

/// Tag the entities in `text`, keeping the last span seen for each label.
#[must_use]
pub fn extract_entities(text: &str) -> EntitySet {
    let mut set = EntitySet::new();
    for mention in mentions(text) {
        set.insert(mention.label, text[mention.start..mention.end].trim());
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message_has_no_entities() {
        assert!(extract_entities("I love this!").is_empty());
        assert!(extract_entities("how do i boil an egg?").is_empty());
    }

    #[test]
    fn tags_places_and_people() {
        let set = extract_entities("Did Ada Lovelace ever visit Paris?");
        assert_eq!(set.get("PERSON"), Some("Ada Lovelace"));
        assert_eq!(set.get("GPE"), Some("Paris"));
    }

    #[test]
    fn honorific_marks_a_person() {
        let set = extract_entities("Tell me about Dr. Watson");
        assert_eq!(set.get("PERSON"), Some("Watson"));
    }

    #[test]
    fn organizations_by_suffix_prefix_and_name() {
        assert_eq!(
            extract_entities("I work at Acme Corp now").get("ORG"),
            Some("Acme Corp")
        );
        assert_eq!(
            extract_entities("She studied at University of Toronto").get("ORG"),
            Some("University of Toronto")
        );
        assert_eq!(
            extract_entities("is Google hiring?").get("ORG"),
            Some("Google")
        );
    }

    #[test]
    fn structured_spans() {
        let set = extract_entities(
            "Email bob@example.com about the $1,200 invoice due March 3, 2025 at 10:30 am, 15% off",
        );
        assert_eq!(set.get("EMAIL"), Some("bob@example.com"));
        assert_eq!(set.get("MONEY"), Some("$1,200"));
        assert_eq!(set.get("DATE"), Some("March 3, 2025"));
        assert_eq!(set.get("TIME"), Some("10:30 am"));
        assert_eq!(set.get("PERCENT"), Some("15%"));
    }

    #[test]
    fn url_excludes_trailing_punctuation() {
        let set = extract_entities("see https://example.com/docs.");
        assert_eq!(set.get("URL"), Some("https://example.com/docs"));
    }

    #[test]
    fn last_span_of_a_label_wins() {
        let set = extract_entities("Should I fly from London to Tokyo?");
        assert_eq!(set.get("GPE"), Some("Tokyo"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn multi_word_places_beat_people() {
        let set = extract_entities("What is the weather in New York today");
        assert_eq!(set.get("GPE"), Some("New York"));
        assert_eq!(set.get("PERSON"), None);
        assert_eq!(set.get("DATE"), Some("today"));
    }

    #[test]
    fn sentence_starters_are_not_names() {
        let set = extract_entities("Hello there. What can you do?");
        assert!(set.is_empty());
    }

    #[test]
    fn trailing_pronoun_does_not_join_a_place() {
        let set = extract_entities("Have you been to Paris I wonder");
        assert_eq!(set.get("GPE"), Some("Paris"));
        assert_eq!(set.get("PERSON"), None);

        let set = extract_entities("Ada Lovelace and I met");
        assert_eq!(set.get("PERSON"), Some("Ada Lovelace"));
    }
}
