//! Final-result parsing.

const SCORE_SENTENCE: &str = "Final score is B";

/// Parse a final-result payload into a signed score from black's point of view.
///
/// Recognized forms, in order:
///
/// 1. `0` - a draw.
/// 2. `B+<n>` / `W+<n>` (either case) - black resp. white ahead by `n`.
/// 3. `Final score is B <b> and W <w>` anywhere in the text - `b - w`.
///
/// Anything else scores 0, so an unknown result format reads as a draw.
///
/// # Example
///
/// ```
/// use gtp::parse_final_score;
///
/// assert_eq!(parse_final_score("B+12"), 12);
/// assert_eq!(parse_final_score("W+5"), -5);
/// assert_eq!(parse_final_score("Final score is B 34 and W 30"), 4);
/// assert_eq!(parse_final_score("garbage"), 0);
/// ```
pub fn parse_final_score(text: &str) -> i32 {
    try_parse_final_score(text).unwrap_or(0)
}

/// Like [`parse_final_score`], but `None` when no form is recognized.
pub fn try_parse_final_score(text: &str) -> Option<i32> {
    let text = text.trim();
    if text == "0" {
        return Some(0);
    }
    text.split_whitespace()
        .find_map(parse_margin)
        .or_else(|| parse_score_sentence(text))
}

/// `B+12` -> 12, `w+5` -> -5.
fn parse_margin(token: &str) -> Option<i32> {
    let mut chars = token.chars();
    let sign = match chars.next()? {
        'B' | 'b' => 1,
        'W' | 'w' => -1,
        _ => return None,
    };
    if chars.next()? != '+' {
        return None;
    }
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i32>().ok().map(|n| sign * n)
}

fn parse_score_sentence(text: &str) -> Option<i32> {
    let start = text.find(SCORE_SENTENCE)?;
    let rest = &text[start + SCORE_SENTENCE.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut tokens = rest.split_whitespace();
    let black = parse_count(tokens.next()?)?;
    if tokens.next()? != "and" || tokens.next()? != "W" {
        return None;
    }
    let white = parse_count(tokens.next()?)?;
    Some(black - white)
}

/// Leading decimal digits of a token, so `30.` or `30,` still count.
fn parse_count(token: &str) -> Option<i32> {
    let end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    token[..end].parse().ok()
}
