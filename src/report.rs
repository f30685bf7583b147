//! Report rendering
//!
//! Prints the search results as plain text, one section per resource type.

use crate::aws::errors::format_aws_error;
use crate::resource::{DetailValue, ProbeOutcome, ResourceMatch};
use std::io::{self, Write};

/// Line printed for a section without matches
pub const NO_MATCHES: &str = "No matches found.";

#[derive(Debug, Clone, Copy)]
pub struct ReportStyle {
    /// Prefix headers and detail blocks with emoji
    pub icons: bool,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self { icons: true }
    }
}

/// Print the banner shown before any probe runs
pub fn render_header<W: Write>(out: &mut W, term: &str, style: ReportStyle) -> io::Result<()> {
    let icon = if style.icons { "🔍 " } else { "" };
    writeln!(out)?;
    writeln!(out, "{}Searching AWS resources for: {}", icon, term)?;
    out.flush()
}

/// Print one section per outcome, in the order given
pub fn render_sections<W: Write>(
    out: &mut W,
    outcomes: &[ProbeOutcome<'_>],
    style: ReportStyle,
) -> io::Result<()> {
    for outcome in outcomes {
        let resource = outcome.resource;

        writeln!(out)?;
        if style.icons && !resource.icon.is_empty() {
            writeln!(out, "{} Matching {}:", resource.icon, resource.display_name)?;
        } else {
            writeln!(out, "Matching {}:", resource.display_name)?;
        }

        match &outcome.result {
            Err(e) => writeln!(
                out,
                "Error querying {}: {}",
                resource.display_name,
                format_aws_error(e)
            )?,
            Ok(matches) if matches.is_empty() => writeln!(out, "{}", NO_MATCHES)?,
            Ok(matches) if resource.details.is_empty() => {
                for m in matches {
                    writeln!(out, "{}", m.reference)?;
                }
            }
            Ok(matches) => {
                for m in matches {
                    render_block(out, m, style)?;
                }
            }
        }
    }

    out.flush()
}

/// Display names of the resource types whose search failed, in run order.
/// An empty list means the run succeeded, matches or not.
pub fn failed_types<'a>(outcomes: &[ProbeOutcome<'a>]) -> Vec<&'a str> {
    outcomes
        .iter()
        .filter(|o| o.result.is_err())
        .map(|o| o.resource.display_name.as_str())
        .collect()
}

/// A match with details spans several lines followed by a blank one
fn render_block<W: Write>(out: &mut W, m: &ResourceMatch, style: ReportStyle) -> io::Result<()> {
    let bullet = if style.icons { "🔹" } else { "*" };
    writeln!(out, "{} ARN: {}", bullet, m.reference)?;

    for detail in &m.details {
        let value = match &detail.value {
            DetailValue::Text(text) => text.clone(),
            DetailValue::List(list) => list.join(", "),
        };
        writeln!(out, "   {}: {}", detail.label, value)?;
    }

    writeln!(out)
}
