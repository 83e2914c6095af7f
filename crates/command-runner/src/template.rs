//! Command templates.

/// Placeholder replaced by the quoted URL in the summary template.
pub const URL_PLACEHOLDER: &str = "{url}";

/// A rendered command line plus what to feed it on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command_line: String,
    pub stdin: Option<Vec<u8>>,
}

/// The two pipelines the relay dispatches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSet {
    /// Summarizer; must contain [`URL_PLACEHOLDER`].
    pub summary: String,
    /// General assistant; reads the question on stdin.
    pub ask: String,
}

impl CommandSet {
    pub fn new(summary: impl Into<String>, ask: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ask: ask.into(),
        }
    }

    /// Whether the summary template can receive a URL.
    pub fn has_url_placeholder(&self) -> bool {
        self.summary.contains(URL_PLACEHOLDER)
    }

    /// Summarize the page at `url`.
    ///
    /// The URL is single-quoted before substitution, so it is always one
    /// shell word no matter what characters it contains.
    pub fn summarize(&self, url: &str) -> Invocation {
        Invocation {
            command_line: self.summary.replace(URL_PLACEHOLDER, &shell_quote(url)),
            stdin: None,
        }
    }

    /// Ask the assistant, passing `text` on stdin.
    pub fn ask(&self, text: &str) -> Invocation {
        Invocation {
            command_line: self.ask.clone(),
            stdin: Some(text.as_bytes().to_vec()),
        }
    }
}

/// Quote `value` as a single POSIX shell word.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("https://example.com/a"), "'https://example.com/a'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_summarize_substitutes_quoted_url() {
        let commands = CommandSet::new("curl -s {url} | llm", "llm");
        let invocation = commands.summarize("https://example.com/a?x=1&y=2");
        assert_eq!(
            invocation.command_line,
            "curl -s 'https://example.com/a?x=1&y=2' | llm"
        );
        assert!(invocation.stdin.is_none());
    }

    #[test]
    fn test_summarize_neutralizes_shell_syntax() {
        let commands = CommandSet::new("echo {url}", "llm");
        let invocation = commands.summarize("https://x;rm -rf ~");
        assert_eq!(invocation.command_line, "echo 'https://x;rm -rf ~'");
    }

    #[test]
    fn test_ask_pipes_text() {
        let commands = CommandSet::new("echo {url}", "llm");
        let invocation = commands.ask("hello @bot");
        assert_eq!(invocation.command_line, "llm");
        assert_eq!(invocation.stdin.as_deref(), Some("hello @bot".as_bytes()));
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(CommandSet::new("curl {url}", "llm").has_url_placeholder());
        assert!(!CommandSet::new("curl", "llm").has_url_placeholder());
    }
}
