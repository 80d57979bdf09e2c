use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// A labeled utterance interval, in seconds from the start of the video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Intervals with `end <= start` carry no audio and are filtered out.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }
}

fn start_duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Start\s+and\s+Duration\s*:\s*([0-9]*\.?[0-9]+)\s+([0-9]*\.?[0-9]+)")
            .expect("invalid start/duration regex")
    })
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]*\.?[0-9]+").expect("invalid number regex"))
}

/// Parse one utterance label into an interval.
///
/// Label files come in three encodings, tried in strict priority order:
///
/// 1. `"Start and Duration : <start> <duration>"` (case-insensitive)
/// 2. a JSON object with `start`/`st` and `end`/`ed` keys
/// 3. any text containing at least two numbers, taken as `(start, end)`
///
/// The order is a precedence policy: rules 2 and 3 are lossy fallbacks and
/// never run once an earlier rule has matched. Rule 3 in particular will
/// happily pick up unrelated leading numbers; that is a known limitation
/// inherited from the upstream metadata format, kept for compatibility.
///
/// Returns `None` when no rule yields a pair of floats; callers treat that
/// as "skip this label", not as an error.
pub fn parse_interval(text: &str) -> Option<Interval> {
    let raw = text.trim();

    if let Some(caps) = start_duration_re().captures(raw) {
        let start: f64 = caps[1].parse().ok()?;
        let duration: f64 = caps[2].parse().ok()?;
        return Some(Interval {
            start,
            end: start + duration,
        });
    }

    if let Ok(obj) = serde_json::from_str::<Value>(raw) {
        let start = obj.get("start").or_else(|| obj.get("st")).and_then(as_f64);
        let end = obj.get("end").or_else(|| obj.get("ed")).and_then(as_f64);
        if let (Some(start), Some(end)) = (start, end) {
            return Some(Interval { start, end });
        }
    }

    let mut numbers = number_re()
        .find_iter(raw)
        .filter_map(|m| m.as_str().parse::<f64>().ok());
    let start = numbers.next()?;
    let end = numbers.next()?;
    Some(Interval { start, end })
}

/// Numeric JSON values and numeric strings both count.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
