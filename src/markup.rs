use once_cell::sync::Lazy;
use regex::Regex;

static BOXED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\boxed\{(.*?)\}").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static EMPHASIS_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?[bi]>").unwrap());

/// Convert model output into display markup.
///
/// Rules run in a fixed order: `\boxed{X}` is unwrapped, then `**X**` becomes
/// `<b>X</b>`, then `*X*` becomes `<i>X</i>`, then newlines become `<br>`.
/// Bold must run before italic so a `**` pair is never read as two italics.
pub fn to_display(text: &str) -> String {
    let text = BOXED.replace_all(text, "$1");
    let text = BOLD.replace_all(&text, "<b>$1</b>");
    let text = ITALIC.replace_all(&text, "<i>$1</i>");
    text.replace('\n', "<br>")
}

/// Strip display markup back to plain text (used for export).
///
/// Only the tags produced by [`to_display`] and the canned replies are
/// removed, so comparisons like `x < 5` in a solution survive untouched.
pub fn to_plain(display: &str) -> String {
    let text = LINE_BREAK.replace_all(display, "\n");
    let text = EMPHASIS_TAG.replace_all(&text, "");
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_boxed_and_italic() {
        let out = to_display(r"**answer: \boxed{42}** done *ok*");
        assert_eq!(out, "<b>answer: 42</b> done <i>ok</i>");
        assert!(!out.contains("**"));
        assert!(!out.contains('*'));
        assert!(!out.contains(r"\boxed"));
    }

    #[test]
    fn test_multiple_boxed_answers() {
        assert_eq!(to_display(r"x = \boxed{3}, y = \boxed{-1}"), "x = 3, y = -1");
    }

    #[test]
    fn test_newlines_become_breaks() {
        assert_eq!(to_display("Step 1\nStep 2"), "Step 1<br>Step 2");
    }

    #[test]
    fn test_other_markdown_passes_through() {
        let text = "# Heading\n- item\n`code`";
        assert_eq!(to_display(text), "# Heading<br>- item<br>`code`");
    }

    #[test]
    fn test_markers_do_not_span_lines() {
        // `.` stops at newlines, so each `**` collapses into an empty italic.
        assert_eq!(to_display("**open\nclose**"), "<i></i>open<br>close<i></i>");
    }

    #[test]
    fn test_to_plain_removes_known_tags_only() {
        let plain = to_plain("<b>Answer:</b> x < 5<br>and <i>y</i> > 2");
        assert_eq!(plain, "Answer: x < 5\nand y > 2");
    }

    #[test]
    fn test_to_plain_unescapes_entities() {
        assert_eq!(to_plain("a &lt; b &amp;&amp; c"), "a < b && c");
    }
}
