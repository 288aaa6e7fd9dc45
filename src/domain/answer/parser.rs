//! Tag-based answer-format parser
//!
//! The answer-generation model emits a flat text blob with inline tags
//! (`<answer>`, `<english-answer>`, `<citation-url>`, `<s-1>`...). Parsing is
//! a fixed sequence of extractions, each operating on the result of the
//! previous one; the order is load-bearing and must not be rearranged.

use once_cell::sync::Lazy;
use regex::Regex;

use super::record::{AnswerRecord, AnswerType};

/// Verbatim marker the model emits when nothing was found on canonical
/// sites; forces `not-gc` regardless of tags.
const NOT_FOUND_SENTENCE: &str =
    "An answer to your question wasn't found on Government of Canada websites.";

static PRELIMINARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<preliminary-checks>(.*?)</preliminary-checks>").unwrap());

static CITATION_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<citation-head>(.*?)</citation-head>").unwrap());

static CITATION_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<citation-url>(.*?)</citation-url>").unwrap());

static ENGLISH_ANSWER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<english-answer>(.*?)</english-answer>").unwrap());

static ANSWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<answer>(.*?)</answer>").unwrap());

static CONFIDENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<confidence>(.*?)</confidence>").unwrap());

static NOT_GC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<not-gc>(.*?)</not-gc>").unwrap());

static PT_MUNI: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<pt-muni>(.*?)</pt-muni>").unwrap());

static CLARIFYING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<clarifying-question>(.*?)</clarifying-question>").unwrap());

static SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<s-(\d+)>(.*?)</s-\d+>").unwrap());

/// Scan for `<s-N>` sentence tags (N = 1..4); `None` when no in-range tag
/// carries content.
fn sentence_tags(text: &str) -> Option<[String; 4]> {
    let mut sentences: [String; 4] = Default::default();
    let mut found = false;

    for caps in SENTENCE.captures_iter(text) {
        let Some(n) = caps[1].parse::<usize>().ok() else {
            continue;
        };
        if (1..=4).contains(&n) {
            let body = caps[2].trim();
            if !body.is_empty() {
                sentences[n - 1] = body.to_string();
                found = true;
            }
        }
    }

    found.then_some(sentences)
}

/// Extract `<s-N>` sentence tags (N = 1..4) into a fixed four-slot array.
/// Missing slots are empty strings. When no tag carries content, the whole
/// trimmed text lands in slot 0.
pub fn parse_sentences(text: &str) -> [String; 4] {
    sentence_tags(text).unwrap_or_else(|| {
        let mut sentences: [String; 4] = Default::default();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            sentences[0] = trimmed.to_string();
        }
        sentences
    })
}

fn strip_first(re: &Regex, text: &str) -> String {
    re.replace(text, "").trim().to_string()
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].trim().to_string())
}

/// Parse a raw model response into a structured [`AnswerRecord`].
///
/// Pure and deterministic; performs no I/O.
pub fn parse_response(text: &str) -> AnswerRecord {
    if text.is_empty() {
        return AnswerRecord::default();
    }

    let mut record = AnswerRecord::default();
    let mut content = text.to_string();
    let mut english_answer: Option<String> = None;
    let mut answer_type = AnswerType::Normal;

    // 1. Preliminary checks are kept aside and never shown to the user.
    if let Some(checks) = first_capture(&PRELIMINARY, text) {
        record.preliminary_checks = Some(checks);
        content = strip_first(&PRELIMINARY, &content);
    }

    // 2. Citation fields come out of the working text before any narrowing.
    record.citation_head = first_capture(&CITATION_HEAD, &content);
    record.citation_url = first_capture(&CITATION_URL, &content);

    // 3. The English answer becomes the working content when present.
    if let Some(english) = first_capture(&ENGLISH_ANSWER, &content) {
        content = english.clone();
        english_answer = Some(english);
    }

    // 4. An <answer> tag anywhere in the original text overrides content.
    if let Some(answer) = first_capture(&ANSWER, text) {
        content = answer;
    }

    // 5. Citation and confidence tags never appear in displayed content.
    content = strip_first(&CITATION_HEAD, &content);
    content = strip_first(&CITATION_URL, &content);
    content = strip_first(&CONFIDENCE, &content);

    // 6. Special tags in declared priority order; the first hit wins and
    //    narrows whichever of english/content carried it.
    let special_tags: [(AnswerType, &Regex); 3] = [
        (AnswerType::NotGc, &NOT_GC),
        (AnswerType::PtMuni, &PT_MUNI),
        (AnswerType::ClarifyingQuestion, &CLARIFYING),
    ];
    for (tag_type, re) in special_tags {
        let english_hit = english_answer.as_deref().and_then(|e| first_capture(re, e));
        let content_hit = first_capture(re, &content);

        if english_hit.is_some() || content_hit.is_some() {
            answer_type = tag_type;
            if let Some(hit) = english_hit {
                english_answer = Some(hit);
            }
            if let Some(hit) = content_hit {
                content = hit;
            }
            break;
        }
    }

    // 7. The not-found sentence overrides whatever the tags said.
    if english_answer
        .as_deref()
        .is_some_and(|e| e.contains(NOT_FOUND_SENTENCE))
    {
        answer_type = AnswerType::NotGc;
    }

    // 8. Confidence is read from the original, untouched text.
    record.confidence_rating = first_capture(&CONFIDENCE, text);

    // 9-10. Paragraph split and the four-slot sentence array.
    record.paragraphs = content
        .split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    // Sentence tags can sit outside the narrowed answer body, so the scan
    // covers the original text; only a fully untagged response falls back
    // to the displayed content in slot 0.
    record.sentences = sentence_tags(text).unwrap_or_else(|| parse_sentences(&content));

    record.answer_type = answer_type;
    record.english_answer = english_answer;
    record.content = content;
    record
}
