use std::sync::OnceLock;

use regex::Regex;

/// One `<sysAction>` marker lifted out of a model reply. Transient: the
/// dispatcher consumes it immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub name: String,
    pub raw_args: String,
}

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Dot-all so argument payloads may span lines; non-greedy so one
        // marker never swallows the next.
        Regex::new(r"(?s)<sysAction>\s*(\w+)\s*\((.*?)\)\s*</sysAction>")
            .expect("action marker pattern compiles")
    })
}

/// Lazily yields every action marker in `text`, in appearance order.
/// Single pass, bounded by the number of markers; the argument payload
/// between the outer parentheses is extracted verbatim.
pub fn scan(text: &str) -> impl Iterator<Item = ActionRequest> + '_ {
    marker_pattern().captures_iter(text).map(|captures| ActionRequest {
        name: captures[1].to_string(),
        raw_args: captures[2].to_string(),
    })
}

/// Removes every matched marker span so raw markers never leak into stored
/// or displayed replies. A line the removal empties out stays behind as a
/// blank line, keeping the surrounding prose in shape.
pub fn strip_markers(text: &str) -> String {
    marker_pattern().replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_markers_yields_nothing() {
        assert_eq!(scan("plain reply, no actions here").count(), 0);
        assert_eq!(strip_markers("plain reply"), "plain reply");
    }

    #[test]
    fn extracts_name_and_verbatim_payload() {
        let requests: Vec<_> = scan(r#"Testing <sysAction>echo("hi")</sysAction> now"#).collect();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "echo");
        assert_eq!(requests[0].raw_args, r#""hi""#);
    }

    #[test]
    fn tolerates_whitespace_around_name_and_parens() {
        let requests: Vec<_> =
            scan("<sysAction> bash (\"ls -la\") </sysAction>").collect();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "bash");
        assert_eq!(requests[0].raw_args, "\"ls -la\"");
    }

    #[test]
    fn payload_may_span_lines() {
        let text = "<sysAction>str_replace_editor(command=\"create\",\npath=\"/tmp/x\",\nfile_text=\"a\nb\")</sysAction>";
        let requests: Vec<_> = scan(text).collect();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "str_replace_editor");
        assert!(requests[0].raw_args.contains("file_text=\"a\nb\""));
    }

    #[test]
    fn parens_inside_quoted_payload_stay_inside() {
        let requests: Vec<_> = scan(r#"<sysAction>bash("echo (hi)")</sysAction>"#).collect();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].raw_args, r#""echo (hi)""#);
    }

    #[test]
    fn markers_come_back_in_appearance_order() {
        let text = "<sysAction>a(1)</sysAction> mid <sysAction>b(2)</sysAction>";
        let names: Vec<_> = scan(text).map(|request| request.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn empty_argument_list_is_valid() {
        let requests: Vec<_> = scan("<sysAction>view_tools()</sysAction>").collect();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "view_tools");
        assert_eq!(requests[0].raw_args, "");
    }

    #[test]
    fn strip_removes_marker_but_keeps_surrounding_text() {
        let stripped = strip_markers(r#"Testing <sysAction>echo("hi")</sysAction> now"#);
        assert_eq!(stripped, "Testing  now");
        assert!(!stripped.contains("<sysAction>"));
    }

    #[test]
    fn strip_leaves_a_blank_line_for_marker_only_lines() {
        let stripped = strip_markers("before\n<sysAction>bash(\"ls\")</sysAction>\nafter");
        assert_eq!(stripped, "before\n\nafter");
    }
}
