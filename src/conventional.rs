use std::sync::LazyLock;

use regex::Regex;

/// Commit subject grammar: `type(scope)!: [TICKET-1] message`.
///
/// Only the type token is case-insensitive; tickets must be upper-case.
static SUBJECT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        // `\b` after the type: `fixed typo` and `fix2 typo` are not `fix` commits
        r"^(?P<type>(?i:feature|feat|fix|docs|style|refactor|test|chore|enhance|config))\b(?P<scope>\([^()\r\n]*\))?(?P<breaking>!)?(?P<separator>:)?\s*(?P<ticket>\[[A-Z][A-Z]+-[0-9]+\])?\s*(?P<message>.+)?$",
    )
    .expect("Invalid regex")
});

pub const TYPE_FEATURE: &str = "feature";
pub const TYPE_FEAT: &str = "feat";
pub const TYPE_FIX: &str = "fix";

/// A changelog-worthy commit extracted from its subject line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    commit_type: String,
    scope: Option<String>,
    message: String,
    breaking: bool,
    ticket: Option<String>,
    commit_ref: Option<String>,
}

impl ChangelogEntry {
    /// Lower-cased commit type, e.g. `feat`
    pub fn commit_type(&self) -> &str {
        &self.commit_type
    }

    /// Lower-cased scope without its parentheses
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_breaking(&self) -> bool {
        self.breaking
    }

    /// Issue key without its brackets, e.g. `ABC-123`
    pub fn ticket(&self) -> Option<&str> {
        self.ticket.as_deref()
    }

    /// Hash of the commit this entry was parsed from
    pub fn commit_ref(&self) -> Option<&str> {
        self.commit_ref.as_deref()
    }

    /// Attach the source commit hash
    pub fn with_commit_ref(mut self, commit_ref: impl Into<String>) -> Self {
        self.commit_ref = Some(commit_ref.into());
        self
    }
}

/// Parses commit subjects into [`ChangelogEntry`] values.
#[derive(Debug, Clone)]
pub struct CommitParser {
    pattern: Regex,
}

impl CommitParser {
    pub fn new() -> Self {
        CommitParser {
            pattern: SUBJECT_REGEX.clone(),
        }
    }

    /// Parse a single commit subject.
    ///
    /// Returns `None` for subjects that don't follow the grammar or that carry
    /// no message after the prefix.
    pub fn parse(&self, subject: &str) -> Option<ChangelogEntry> {
        let subject = subject.trim();
        let captures = self.pattern.captures(subject)?;

        let message = captures.name("message")?.as_str().trim();
        if message.is_empty() {
            return None;
        }

        let commit_type = captures.name("type")?.as_str().to_lowercase();
        let scope = captures
            .name("scope")
            .map(|m| strip_delimiters(m.as_str(), '(', ')').to_lowercase())
            .filter(|s| !s.is_empty());
        let ticket = captures
            .name("ticket")
            .map(|m| strip_delimiters(m.as_str(), '[', ']').to_string());

        Some(ChangelogEntry {
            commit_type,
            scope,
            message: message.to_string(),
            breaking: captures.name("breaking").is_some(),
            ticket,
            commit_ref: None,
        })
    }
}

impl Default for CommitParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a commit subject with the default parser
pub fn parse_commit_subject(subject: &str) -> Option<ChangelogEntry> {
    CommitParser::new().parse(subject)
}

fn strip_delimiters(value: &str, open: char, close: char) -> &str {
    value
        .strip_prefix(open)
        .and_then(|v| v.strip_suffix(close))
        .unwrap_or(value)
}
