use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

const MAX_TEXTS_SCANNED: usize = 20;
const MAX_LINES_SCANNED: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `ConfidenceLevel` colors.
pub enum ConfidenceLevel {
    Green,
    Yellow,
    Red,
}

impl ConfidenceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }

    fn from_emoji(raw: &str) -> Option<Self> {
        match raw {
            "🟢" => Some(Self::Green),
            "🟡" => Some(Self::Yellow),
            "🔴" => Some(Self::Red),
            _ => None,
        }
    }

    fn from_label(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "green" | "high" => Some(Self::Green),
            "yellow" | "medium" => Some(Self::Yellow),
            "red" | "low" => Some(Self::Red),
            _ => None,
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A confidence color plus the agent's rationale, if it gave one.
pub struct ConfidenceSignal {
    pub level: ConfidenceLevel,
    pub rationale: Option<String>,
}

fn confidence_line_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?ix)
            ^\s*confidence[^:\n]*:\s*
            (?P<label>high|medium|low|green|yellow|red)?\s*
            (?P<emoji>[🟢🟡🔴])?
            (?:\s*[-–—:]\s*(?P<why>.+))?
            $",
        )
        .expect("confidence line regex should compile")
    })
}

/// Parses one line; `None` when the line is not a confidence line or names
/// no recognizable color.
fn parse_confidence_line(line: &str) -> Option<ConfidenceSignal> {
    let captures = confidence_line_regex().captures(line.trim_end())?;
    let rationale = captures
        .name("why")
        .map(|why| why.as_str().trim().to_string())
        .filter(|why| !why.is_empty());
    let level = captures
        .name("emoji")
        .and_then(|emoji| ConfidenceLevel::from_emoji(emoji.as_str()))
        .or_else(|| {
            captures
                .name("label")
                .and_then(|label| ConfidenceLevel::from_label(label.as_str()))
        })?;
    Some(ConfidenceSignal { level, rationale })
}

/// Scans the newest 20 texts, newest first, and within each the last 12
/// lines, newest first. The first line naming a color wins; an emoji takes
/// precedence over a label on the same line.
pub fn extract_confidence_from_texts<S: AsRef<str>>(texts: &[S]) -> Option<ConfidenceSignal> {
    let start = texts.len().saturating_sub(MAX_TEXTS_SCANNED);
    texts[start..].iter().rev().find_map(|text| {
        let lines = text.as_ref().lines().collect::<Vec<_>>();
        let first_line = lines.len().saturating_sub(MAX_LINES_SCANNED);
        lines[first_line..]
            .iter()
            .rev()
            .find_map(|line| parse_confidence_line(line))
    })
}

#[cfg(test)]
mod tests {
    use super::{extract_confidence_from_texts, parse_confidence_line, ConfidenceLevel};

    fn level_of(text: &str) -> Option<ConfidenceLevel> {
        extract_confidence_from_texts(&[text]).map(|signal| signal.level)
    }

    #[test]
    fn unit_labels_map_to_fixed_colors() {
        assert_eq!(level_of("Confidence: High"), Some(ConfidenceLevel::Green));
        assert_eq!(level_of("Confidence: medium"), Some(ConfidenceLevel::Yellow));
        assert_eq!(level_of("Confidence: LOW"), Some(ConfidenceLevel::Red));
        assert_eq!(level_of("confidence: Yellow"), Some(ConfidenceLevel::Yellow));
        assert_eq!(level_of("Confidence: red"), Some(ConfidenceLevel::Red));
    }

    #[test]
    fn unit_emoji_overrides_conflicting_label() {
        assert_eq!(level_of("Confidence: Low 🟢"), Some(ConfidenceLevel::Green));
        assert_eq!(level_of("Confidence: High 🔴"), Some(ConfidenceLevel::Red));
        assert_eq!(level_of("Confidence: 🟡"), Some(ConfidenceLevel::Yellow));
    }

    #[test]
    fn functional_rationale_is_captured_after_separator() {
        let signal = extract_confidence_from_texts(&["Confidence: High 🟢 - clear requirements"])
            .expect("signal");
        assert_eq!(signal.level, ConfidenceLevel::Green);
        assert_eq!(signal.rationale.as_deref(), Some("clear requirements"));

        let signal = extract_confidence_from_texts(&["  Confidence level: Medium — needs repro"])
            .expect("signal");
        assert_eq!(signal.level, ConfidenceLevel::Yellow);
        assert_eq!(signal.rationale.as_deref(), Some("needs repro"));

        let signal = extract_confidence_from_texts(&["Confidence: Red"]).expect("signal");
        assert_eq!(signal.rationale, None);
    }

    #[test]
    fn unit_unrecognized_label_without_emoji_does_not_match() {
        assert_eq!(parse_confidence_line("Confidence: unknown"), None);
        assert_eq!(parse_confidence_line("Confidence: - no color given"), None);
        assert_eq!(parse_confidence_line("My confidence: High"), None);
    }

    #[test]
    fn functional_unmatched_newer_line_falls_through_to_older_line() {
        let text = "Confidence: High 🟢 - first pass\nConfidence: unsure";
        let signal = extract_confidence_from_texts(&[text]).expect("signal");
        assert_eq!(signal.level, ConfidenceLevel::Green);
        assert_eq!(signal.rationale.as_deref(), Some("first pass"));
    }

    #[test]
    fn functional_newest_blob_and_newest_line_win() {
        let texts = [
            "Confidence: Low 🔴 - old",
            "Summary\nConfidence: Medium 🟡 - earlier\nConfidence: High 🟢 - latest",
        ];
        let signal = extract_confidence_from_texts(&texts).expect("signal");
        assert_eq!(signal.level, ConfidenceLevel::Green);
        assert_eq!(signal.rationale.as_deref(), Some("latest"));
    }

    #[test]
    fn regression_only_last_twelve_lines_are_scanned() {
        let mut lines = vec!["Confidence: High 🟢 - buried".to_string()];
        lines.extend((0..12).map(|index| format!("detail line {index}")));
        let text = lines.join("\n");
        assert_eq!(extract_confidence_from_texts(&[text.as_str()]), None);

        lines.remove(1);
        let text = lines.join("\n");
        assert!(extract_confidence_from_texts(&[text.as_str()]).is_some());
    }

    #[test]
    fn regression_only_last_twenty_texts_are_scanned() {
        let mut texts = vec!["Confidence: Low 🔴".to_string()];
        texts.extend((0..20).map(|index| format!("progress update {index}")));
        assert_eq!(extract_confidence_from_texts(&texts), None);

        texts.remove(1);
        assert_eq!(
            extract_confidence_from_texts(&texts).map(|signal| signal.level),
            Some(ConfidenceLevel::Red)
        );
    }

    #[test]
    fn unit_extraction_is_deterministic_and_empty_input_is_absent() {
        let texts = ["noise", "Confidence: Medium 🟡 - partial repro"];
        let first = extract_confidence_from_texts(&texts);
        let second = extract_confidence_from_texts(&texts);
        assert_eq!(first, second);
        assert_eq!(extract_confidence_from_texts::<&str>(&[]), None);
    }
}
