//! Turns free-form model output into a well-formed [`Verdict`].
//!
//! Models asked to answer in JSON do not always comply: they wrap the object
//! in prose, drop fields or emit confidences outside `[0, 1]`. [`normalize`]
//! recovers what it can in three ordered tiers and never fails:
//!
//! 1. parse the whole text as a JSON object,
//! 2. parse the greedy span from the first `{` to the last `}`,
//! 3. fall back to an `Uncertain` verdict carrying the start of the raw text.
//!
//! Objects recovered by tiers 1 and 2 are passed through [`sanitize`], which
//! coerces each field independently and drops unknown keys.

use nc_core::coerce::{is_truthy, to_number, to_text, to_text_or_empty};
use nc_core::{Verdict, DEFAULT_CONFIDENCE, DEFAULT_VERDICT};
use serde_json::{Map, Value};
use tracing::debug;

/// Number of characters of raw text kept as the rationale of a fallback verdict.
pub const FALLBACK_RATIONALE_CHARS: usize = 800;

pub fn normalize(raw: &str) -> Verdict {
    if let Some(object) = parse_object(raw) {
        return sanitize(&object);
    }

    if let Some(object) = extract_json_object(raw).and_then(parse_object) {
        debug!("🧹 Recovered verdict object embedded in model output");
        return sanitize(&object);
    }

    debug!("🤷 Model output is not JSON, falling back to raw rationale");
    fallback(raw)
}

/// Greedy span from the first `{` to the last `}`. No bracket matching is attempted.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end >= start).then(|| &raw[start..=end])
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    let value = serde_json::from_str::<Value>(text)
        .or_else(|e| {
            let repaired = repair(text).ok_or(e)?;
            debug!("🩹 Retrying model output after repairing JSON literals");
            serde_json::from_str::<Value>(&repaired)
        })
        .ok()?;
    match value {
        Value::Object(object) => Some(object),
        _ => None,
    }
}

/// Rewrites literals that are valid JSON text but that serde_json refuses.
///
/// Numbers beyond the `f64` range become the strings `"Infinity"` / `"-Infinity"`,
/// which coerce the same way an infinite number does. Unpaired UTF-16 surrogate
/// escapes become `\uFFFD`. Returns `None` when nothing needed rewriting.
fn repair(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut changed = false;
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            match c {
                '"' => {
                    in_string = false;
                    out.push(c);
                    i += 1;
                }
                '\\' if chars.get(i + 1) == Some(&'u') => match utf16_unit(&chars, i + 2) {
                    Some(0xD800..=0xDBFF) if is_low_surrogate_escape(&chars, i + 6) => {
                        out.extend(&chars[i..i + 12]);
                        i += 12;
                    }
                    Some(0xD800..=0xDFFF) => {
                        out.push_str("\\uFFFD");
                        changed = true;
                        i += 6;
                    }
                    _ => {
                        out.push(c);
                        i += 1;
                    }
                },
                '\\' => {
                    out.extend(&chars[i..(i + 2).min(chars.len())]);
                    i += 2;
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            '-' | '0'..='9' => {
                let end = (i + 1..chars.len())
                    .find(|&j| !matches!(chars[j], '0'..='9' | '.' | 'e' | 'E' | '+' | '-'))
                    .unwrap_or(chars.len());
                let token: String = chars[i..end].iter().collect();
                match token.parse::<f64>() {
                    Ok(n) if n.is_infinite() => {
                        out.push_str(if n < 0.0 { "\"-Infinity\"" } else { "\"Infinity\"" });
                        changed = true;
                    }
                    _ => out.push_str(&token),
                }
                i = end;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    changed.then_some(out)
}

/// Value of the four hex digits starting at `at`.
fn utf16_unit(chars: &[char], at: usize) -> Option<u32> {
    let digits = chars.get(at..at + 4)?;
    if !digits.iter().all(char::is_ascii_hexdigit) {
        return None;
    }
    u32::from_str_radix(&digits.iter().collect::<String>(), 16).ok()
}

fn is_low_surrogate_escape(chars: &[char], at: usize) -> bool {
    chars.get(at) == Some(&'\\')
        && chars.get(at + 1) == Some(&'u')
        && matches!(utf16_unit(chars, at + 2), Some(0xDC00..=0xDFFF))
}

fn fallback(raw: &str) -> Verdict {
    Verdict {
        verdict: DEFAULT_VERDICT.to_string(),
        confidence: DEFAULT_CONFIDENCE,
        rationale: raw.chars().take(FALLBACK_RATIONALE_CHARS).collect(),
        signals: Vec::new(),
    }
}

pub fn sanitize(object: &Map<String, Value>) -> Verdict {
    Verdict {
        verdict: coerce_verdict(object.get("verdict")),
        confidence: coerce_confidence(object.get("confidence")),
        rationale: object.get("rationale").map(to_text_or_empty).unwrap_or_default(),
        signals: coerce_signals(object.get("signals")),
    }
}

fn coerce_verdict(value: Option<&Value>) -> String {
    match value {
        Some(v) if is_truthy(v) => to_text(v),
        _ => DEFAULT_VERDICT.to_string(),
    }
}

fn coerce_confidence(value: Option<&Value>) -> f64 {
    let confidence = value.map(to_number).unwrap_or(f64::NAN);
    if (0.0..=1.0).contains(&confidence) {
        confidence
    } else {
        DEFAULT_CONFIDENCE
    }
}

fn coerce_signals(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(to_text).collect(),
        _ => Vec::new(),
    }
}
