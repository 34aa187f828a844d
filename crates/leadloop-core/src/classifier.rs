//! Comment classification: capture decision and purchase-intent scoring.
//!
//! Both operations are pure and deterministic. Text handling is
//! diacritic-insensitive: "interésse" and "interesse" classify identically.

use crate::types::CaptureMode;

/// Baseline score every comment starts from.
const BASE_SCORE: u32 = 30;

/// Cap on the cumulative high-intent phrase bonus.
const MAX_PHRASE_BONUS: u32 = 40;

/// Phrases (in normalized form) that signal purchase or engagement intent.
/// Matched as substrings of the normalized comment; each distinct phrase
/// counts once.
const HIGH_INTENT_PHRASES: &[&str] = &[
    "quero",
    "guia",
    "me manda",
    "manda",
    "interesse",
    "interessado",
    "interessada",
    "quanto custa",
    "preco",
    "como funciona",
    "me envia",
    "want",
    "interested",
    "send me",
    "how much",
    "price",
    "sign me up",
    "tell me more",
];

/// Emoji that signal positive engagement. Checked against the raw text.
const ENGAGEMENT_EMOJI: &[char] = &['🔥', '👏', '🙌', '💯', '❤', '😍', '🚀', '👍'];

/// Result of a capture decision for one comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub should_capture: bool,
    /// The first configured keyword that matched, in its raw (configured)
    /// spelling. `None` in `any` mode or when nothing matched.
    pub keyword_matched: Option<String>,
}

impl Classification {
    fn rejected() -> Self {
        Self {
            should_capture: false,
            keyword_matched: None,
        }
    }
}

/// Normalizes text for matching: lowercase, diacritics folded to their base
/// letter, and every non-alphanumeric character replaced with a space so
/// punctuation separates words instead of merging them.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(fold_diacritic)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

/// Folds common Latin diacritics to their unaccented base letter.
/// Characters outside the table pass through unchanged.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Computes a 0-100 heuristic purchase-intent score for a comment.
///
/// Starts at 30 and adds: +15 for >= 10 words plus another +10 for >= 20
/// words; +10 per distinct high-intent phrase match (capped at +40); +10 if
/// the raw text contains a question mark; +5 if it contains an engagement
/// emoji. The result is clamped to 100.
#[must_use]
pub fn compute_intent_score(comment_text: &str) -> u8 {
    let normalized = normalize(comment_text);
    let word_count = normalized.split_whitespace().count();

    let mut score = BASE_SCORE;

    if word_count >= 10 {
        score += 15;
    }
    if word_count >= 20 {
        score += 10;
    }

    let phrase_matches = HIGH_INTENT_PHRASES
        .iter()
        .filter(|phrase| normalized.contains(*phrase))
        .count();
    score += (u32::try_from(phrase_matches).unwrap_or(u32::MAX) * 10).min(MAX_PHRASE_BONUS);

    if comment_text.contains('?') {
        score += 10;
    }
    if comment_text.chars().any(|c| ENGAGEMENT_EMOJI.contains(&c)) {
        score += 5;
    }

    u8::try_from(score.min(100)).unwrap_or(100)
}

/// Decides whether a commenter should be captured as a lead.
///
/// Comments with no meaningful words are never captured. In `any` mode every
/// remaining comment is captured. In `keyword` mode the configured keywords
/// are checked in list order against the normalized comment; the first match
/// wins and its raw configured spelling is returned for display.
#[must_use]
pub fn classify_comment(
    comment_text: &str,
    capture_mode: CaptureMode,
    keywords: &[String],
) -> Classification {
    let normalized = normalize(comment_text);
    if normalized.split_whitespace().next().is_none() {
        return Classification::rejected();
    }

    match capture_mode {
        CaptureMode::Any => Classification {
            should_capture: true,
            keyword_matched: None,
        },
        CaptureMode::Keyword => {
            for keyword in keywords {
                let needle = normalize(keyword);
                if !needle.trim().is_empty() && normalized.contains(needle.trim()) {
                    return Classification {
                        should_capture: true,
                        keyword_matched: Some(keyword.clone()),
                    };
                }
            }
            Classification::rejected()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn score_is_deterministic() {
        let text = "Quero o GUIA, me manda!";
        assert_eq!(compute_intent_score(text), compute_intent_score(text));
    }

    #[test]
    fn score_stays_within_bounds() {
        for text in [
            "",
            "?",
            "🔥🔥🔥",
            "quero guia me manda interesse preco want price how much send me \
             sign me up tell me more como funciona quanto custa interested? 🔥",
        ] {
            let score = compute_intent_score(text);
            assert!(score <= 100, "score {score} out of bounds for {text:?}");
        }
    }

    #[test]
    fn empty_text_scores_base_only() {
        assert_eq!(compute_intent_score(""), 30);
    }

    #[test]
    fn word_count_bonus_is_cumulative() {
        let ten = "one two three four five six seven eight nine ten";
        let twenty = format!("{ten} {ten}");
        assert_eq!(compute_intent_score(ten), 45);
        assert_eq!(compute_intent_score(&twenty), 55);
    }

    #[test]
    fn phrase_bonus_caps_at_forty() {
        // Six distinct phrases; only four count.
        let text = "quero interesse preco want price guia";
        assert_eq!(compute_intent_score(text), 30 + 40);
    }

    #[test]
    fn question_mark_and_emoji_add_bonuses() {
        assert_eq!(compute_intent_score("ok then"), 30);
        assert_eq!(compute_intent_score("ok then?"), 40);
        assert_eq!(compute_intent_score("ok then 🔥"), 35);
        assert_eq!(compute_intent_score("ok then? 🔥"), 45);
    }

    #[test]
    fn guide_request_scores_high_intent() {
        // "quero", "guia", "me manda", and "manda" all match.
        let score = compute_intent_score("Quero o GUIA, me manda!");
        assert!(score >= 70, "expected >= 70, got {score}");
    }

    #[test]
    fn any_mode_rejects_empty_text() {
        let c = classify_comment("", CaptureMode::Any, &[]);
        assert!(!c.should_capture);
        let c = classify_comment("!!! ...", CaptureMode::Any, &[]);
        assert!(!c.should_capture, "punctuation-only text must not capture");
    }

    #[test]
    fn any_mode_captures_non_empty_text() {
        let c = classify_comment("ok", CaptureMode::Any, &[]);
        assert!(c.should_capture);
        assert_eq!(c.keyword_matched, None);
    }

    #[test]
    fn keyword_mode_is_diacritic_insensitive() {
        let keywords = kw(&["interesse"]);
        let upper = classify_comment("Tenho INTERESSE!", CaptureMode::Keyword, &keywords);
        let accented = classify_comment("tenho interésse", CaptureMode::Keyword, &keywords);
        assert!(upper.should_capture);
        assert!(accented.should_capture);
        assert_eq!(upper.keyword_matched.as_deref(), Some("interesse"));
        assert_eq!(accented.keyword_matched.as_deref(), Some("interesse"));
    }

    #[test]
    fn keyword_mode_first_match_wins_in_list_order() {
        let keywords = kw(&["ebook", "guia", "planilha"]);
        let c = classify_comment(
            "me manda a planilha e o guia",
            CaptureMode::Keyword,
            &keywords,
        );
        assert_eq!(c.keyword_matched.as_deref(), Some("guia"));
    }

    #[test]
    fn keyword_mode_returns_raw_keyword_spelling() {
        let keywords = kw(&["GUIA"]);
        let c = classify_comment("quero o guia", CaptureMode::Keyword, &keywords);
        assert!(c.should_capture);
        assert_eq!(c.keyword_matched.as_deref(), Some("GUIA"));
    }

    #[test]
    fn keyword_mode_rejects_without_match() {
        let c = classify_comment("parabéns pelo post", CaptureMode::Keyword, &kw(&["guia"]));
        assert!(!c.should_capture);
        assert_eq!(c.keyword_matched, None);
    }

    #[test]
    fn punctuation_separates_words_instead_of_merging() {
        // "foo,bar" must normalize to two words, so "foobar" cannot match.
        let c = classify_comment("foo,bar", CaptureMode::Keyword, &kw(&["foobar"]));
        assert!(!c.should_capture);
        let c = classify_comment("foo,bar", CaptureMode::Keyword, &kw(&["bar"]));
        assert!(c.should_capture);
    }

    #[test]
    fn normalize_folds_accents_and_punctuation() {
        assert_eq!(normalize("Olá, você!"), "ola  voce ");
    }
}
