//! Picks the pipeline for a message.

use command_runner::{CommandSet, Invocation};

/// Whether `text` should be treated as a link to summarize.
///
/// A plain, case-sensitive prefix check; no further URL validation.
pub fn is_url(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

/// Render the invocation that answers `text`.
///
/// Links go to the summarizer with the text on the command line; anything
/// else goes to the assistant on stdin.
pub fn plan(commands: &CommandSet, text: &str) -> Invocation {
    if is_url(text) {
        commands.summarize(text)
    } else {
        commands.ask(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("http://example.com"));
        assert!(is_url("https://example.com/a"));
        assert!(is_url("https://"));
    }

    #[test]
    fn test_is_not_url() {
        assert!(!is_url(""));
        assert!(!is_url("httpx://example.com"));
        assert!(!is_url("HTTPS://example.com"));
        assert!(!is_url(" https://example.com"));
        assert!(!is_url("see https://example.com"));
        assert!(!is_url("ftp://example.com"));
    }

    #[test]
    fn test_plan_routes_by_kind() {
        let commands = CommandSet::new("summarize {url}", "ask");

        let invocation = plan(&commands, "https://example.com/a");
        assert_eq!(invocation.command_line, "summarize 'https://example.com/a'");
        assert!(invocation.stdin.is_none());

        let invocation = plan(&commands, "what is rust?");
        assert_eq!(invocation.command_line, "ask");
        assert_eq!(invocation.stdin.as_deref(), Some("what is rust?".as_bytes()));
    }
}
