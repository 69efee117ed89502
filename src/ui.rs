//! Terminal output for the CLI.

use std::path::Path;
use std::time::Duration;

use console::style;

use crate::report::ReleaseReport;
use crate::tag::LatestTag;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Show which tag the report compares against.
pub fn display_latest_tag(tag: Option<&LatestTag>) {
    match tag {
        Some(tag) => display_status(&format!(
            "Latest tag: {} ({})",
            style(&tag.name).cyan(),
            tag.commit
        )),
        None => display_status("No tags found, reporting the whole trunk history"),
    }
}

/// One-line summary of what went into the report.
pub fn summarize(report: &ReleaseReport) -> String {
    format!(
        "{}: {} changelog entries, {} lines of schema script",
        report.service_name,
        report.changelog.len(),
        report.schema_script.lines().count()
    )
}

/// Report where the document was written and how long it took.
pub fn display_generated(output: &Path, elapsed: Duration) {
    display_success(&format!(
        "Wrote {} (generated in {:.2?})",
        style(output.display()).bold(),
        elapsed
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::{ChangelogCollection, ChangelogOptions};
    use crate::conventional::parse_commit_subject;

    #[test]
    fn test_summarize_counts_entries_and_script_lines() {
        let mut changelog = ChangelogCollection::new(ChangelogOptions::default());
        changelog.add(parse_commit_subject("feat: a").unwrap());
        changelog.add(parse_commit_subject("fix: b").unwrap());

        let report = ReleaseReport {
            service_name: "billing".to_string(),
            latest_tag: None,
            changelog,
            schema_script: "-- db/a.sql\nselect 1;\n\n-- db/b.sql\nselect 2;\n\n".to_string(),
        };

        assert_eq!(summarize(&report), "billing: 2 changelog entries, 6 lines of schema script");
    }
}
