const CONFIDENCE_MARKER: &str = "confidence:";
const SCOPING_KEYWORDS: [&str; 5] = ["current", "requested", "files", "tests", "risks"];
const MIN_KEYWORD_HITS: usize = 2;

/// Loose structural check for a completed scoping report.
///
/// True when the text carries a `confidence:` marker or mentions at least two
/// of the report section keywords. Both false positives and false negatives
/// are possible; callers treat a match as "probably done".
pub fn looks_like_scoping(text: &str) -> bool {
    let lowered = text.to_lowercase();
    if lowered.contains(CONFIDENCE_MARKER) {
        return true;
    }
    SCOPING_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .count()
        >= MIN_KEYWORD_HITS
}
