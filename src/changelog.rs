//! Changelog aggregation and markdown rendering.
//!
//! Entries are grouped by scope, then split into three buckets (features,
//! fixes, everything else). Each scope renders as a three-column table where
//! row *i* holds the *i*-th entry of every bucket.

use std::fmt;

use indexmap::IndexMap;

use crate::conventional::{ChangelogEntry, TYPE_FEAT, TYPE_FEATURE, TYPE_FIX};

/// Heading used for entries that carry no scope.
///
/// Parsed scopes never contain parentheses, so this can't clash with one.
pub const UNSCOPED_HEADING: &str = "(no scope)";

const TABLE_HEADER: &str =
    "| **New Features** | **Bug Fixes** | **Others** |\n| --- | --- | --- |\n";

/// Options controlling which entries are rendered and how tickets link out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogOptions {
    /// Only keep entries whose scope equals this value
    pub scope_filter: Option<String>,
    /// Issue tracker base URL; tickets link to `<base>/browse/<TICKET>`
    pub ticket_base_url: String,
}

impl ChangelogOptions {
    pub fn new(scope_filter: Option<String>, ticket_base_url: impl Into<String>) -> Self {
        ChangelogOptions {
            scope_filter: scope_filter.filter(|s| !s.is_empty()),
            ticket_base_url: ticket_base_url.into(),
        }
    }
}

/// Reduced category an entry is rendered under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Features,
    Fixes,
    Others,
}

impl Bucket {
    pub fn for_type(commit_type: &str) -> Self {
        match commit_type {
            TYPE_FEATURE | TYPE_FEAT => Bucket::Features,
            TYPE_FIX => Bucket::Fixes,
            _ => Bucket::Others,
        }
    }
}

#[derive(Debug, Default)]
struct ScopeGroup<'a> {
    features: Vec<&'a ChangelogEntry>,
    fixes: Vec<&'a ChangelogEntry>,
    others: Vec<&'a ChangelogEntry>,
}

impl<'a> ScopeGroup<'a> {
    fn push(&mut self, entry: &'a ChangelogEntry) {
        match Bucket::for_type(entry.commit_type()) {
            Bucket::Features => self.features.push(entry),
            Bucket::Fixes => self.fixes.push(entry),
            Bucket::Others => self.others.push(entry),
        }
    }

    fn row_count(&self) -> usize {
        self.features
            .len()
            .max(self.fixes.len())
            .max(self.others.len())
    }
}

/// Ordered collection of changelog entries for one release
#[derive(Debug, Clone, Default)]
pub struct ChangelogCollection {
    entries: Vec<ChangelogEntry>,
    options: ChangelogOptions,
}

impl ChangelogCollection {
    pub fn new(options: ChangelogOptions) -> Self {
        ChangelogCollection {
            entries: Vec::new(),
            options,
        }
    }

    /// Append an entry; order of insertion is kept within each bucket
    pub fn add(&mut self, entry: ChangelogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChangelogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render one heading and table per scope, in scope discovery order.
    pub fn render(&self) -> String {
        let mut markdown = String::new();

        for (scope, group) in self.group_by_scope() {
            let heading = if scope.is_empty() {
                UNSCOPED_HEADING
            } else {
                scope
            };
            markdown.push_str("### ");
            markdown.push_str(heading);
            markdown.push_str("\n\n");
            markdown.push_str(TABLE_HEADER);

            for row in 0..group.row_count() {
                let feature = self.cell(group.features.get(row).copied(), false);
                let fix = self.cell(group.fixes.get(row).copied(), false);
                let other = self.cell(group.others.get(row).copied(), true);
                markdown.push_str(&format!("| {} | {} | {} |\n", feature, fix, other));
            }
            markdown.push('\n');
        }

        markdown
    }

    fn group_by_scope(&self) -> IndexMap<&str, ScopeGroup<'_>> {
        let mut groups: IndexMap<&str, ScopeGroup<'_>> = IndexMap::new();

        for entry in &self.entries {
            let scope = entry.scope().unwrap_or("");
            if let Some(filter) = self.options.scope_filter.as_deref() {
                if scope != filter {
                    continue;
                }
            }
            groups.entry(scope).or_default().push(entry);
        }

        groups
    }

    fn cell(&self, entry: Option<&ChangelogEntry>, prefix_type: bool) -> String {
        let Some(entry) = entry else {
            return String::new();
        };

        let mut text = if prefix_type {
            format!("{}: {}", entry.commit_type(), entry.message())
        } else {
            entry.message().to_string()
        };

        if let Some(ticket) = entry.ticket() {
            text.push_str(&format!(
                " ([{}]({}/browse/{}))",
                ticket,
                self.options.ticket_base_url.trim_end_matches('/'),
                ticket
            ));
        }

        text.replace('|', "\\|")
    }
}

impl fmt::Display for ChangelogCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
