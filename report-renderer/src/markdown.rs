use crate::data::{PainPointSection, ReportData};
use crate::ReportRenderer;
use painpoint_core::CoreError;
use std::fmt::Write;

pub const REPORT_TITLE: &str = "Pain Point Analysis Report";

/// Renders the report as a Markdown document.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownReport;

impl ReportRenderer for MarkdownReport {
    fn file_extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, data: &ReportData) -> Result<String, CoreError> {
        render_markdown(data).map_err(|e| CoreError::Internal {
            message: format!("Failed to render report: {}", e),
        })
    }
}

fn render_markdown(data: &ReportData) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "# {}", REPORT_TITLE)?;
    writeln!(out)?;
    writeln!(out, "Date: {}", data.generated_on.format("%Y-%m-%d"))?;
    writeln!(out)?;
    writeln!(out, "Total Posts Analyzed: {}", data.total_posts)?;
    writeln!(out)?;
    writeln!(out, "Top Pain Points Identified: {}", data.pain_points.len())?;
    writeln!(out)?;

    writeln!(out, "## Summary Table")?;
    writeln!(out)?;
    if data.pain_points.is_empty() {
        writeln!(out, "No pain points were found.")?;
    } else {
        writeln!(
            out,
            "| Pain Point | Frequency | Avg Upvotes | Avg Comments | Top Subreddits |"
        )?;
        writeln!(out, "|---|---:|---:|---:|---|")?;
        for section in &data.pain_points {
            writeln!(
                out,
                "| {} | {} | {:.1} | {:.1} | {} |",
                table_cell(&section.keyword),
                section.frequency,
                section.avg_upvotes,
                section.avg_comments,
                table_cell(&section.top_subreddits.join(", "))
            )?;
        }
    }

    for section in &data.pain_points {
        writeln!(out)?;
        write_section(&mut out, section)?;
    }

    Ok(out)
}

fn write_section(out: &mut String, section: &PainPointSection) -> std::fmt::Result {
    writeln!(out, "## Pain Point: {}", section.keyword)?;
    writeln!(out)?;
    writeln!(out, "- Frequency: {}", section.frequency)?;
    writeln!(out, "- Average Upvotes: {:.1}", section.avg_upvotes)?;
    writeln!(out, "- Average Comments: {:.1}", section.avg_comments)?;
    writeln!(out, "- Top Subreddits: {}", section.top_subreddits.join(", "))?;
    writeln!(out)?;
    writeln!(out, "### Example Posts")?;
    writeln!(out)?;

    for post in &section.examples {
        writeln!(
            out,
            "- **{}** (r/{}, {} upvotes)",
            escape_inline(&post.title.replace('\n', " ")),
            post.subreddit,
            post.upvotes
        )?;
        if !post.excerpt.is_empty() {
            writeln!(out, "  > {}", escape_inline(&post.excerpt))?;
        }
        writeln!(out, "  [Link]({})", link_target(&post.url))?;
    }
    Ok(())
}

fn table_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Backslash-escapes characters that Markdown would read as formatting, so
/// post text renders literally.
fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '#' | '|' | '!'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Percent-encodes the characters that would end a link target early.
fn link_target(url: &str) -> String {
    url.replace(' ', "%20").replace('(', "%28").replace(')', "%29")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ExamplePost;
    use chrono::NaiveDate;

    fn section(keyword: &str, frequency: u64) -> PainPointSection {
        PainPointSection {
            keyword: keyword.to_string(),
            frequency,
            avg_upvotes: 12.345,
            avg_comments: 2.0,
            top_subreddits: vec!["Shopify".to_string(), "retail".to_string()],
            examples: vec![ExamplePost {
                title: "Checkout bug".to_string(),
                subreddit: "Shopify".to_string(),
                upvotes: 40,
                excerpt: "Orders fail...".to_string(),
                url: "https://reddit.com/r/Shopify/1".to_string(),
            }],
        }
    }

    fn data(pain_points: Vec<PainPointSection>) -> ReportData {
        ReportData {
            generated_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            total_posts: 17,
            pain_points,
        }
    }

    #[test]
    fn test_header_and_summary_table() {
        let rendered = MarkdownReport
            .render(&data(vec![section("bug", 9), section("issue", 4)]))
            .unwrap();

        assert!(rendered.starts_with("# Pain Point Analysis Report\n"));
        assert!(rendered.contains("Date: 2024-06-01"));
        assert!(rendered.contains("Total Posts Analyzed: 17"));
        assert!(rendered.contains("Top Pain Points Identified: 2"));
        assert!(rendered.contains("| bug | 9 | 12.3 | 2.0 | Shopify, retail |"));
        assert!(rendered.contains("## Pain Point: issue"));
        assert!(rendered.contains("- **Checkout bug** (r/Shopify, 40 upvotes)"));
        assert!(rendered.contains("[Link](https://reddit.com/r/Shopify/1)"));
    }

    #[test]
    fn test_sections_follow_priority_order() {
        let rendered = MarkdownReport
            .render(&data(vec![section("wish", 9), section("bug", 4)]))
            .unwrap();
        let wish = rendered.find("## Pain Point: wish").unwrap();
        let bug = rendered.find("## Pain Point: bug").unwrap();
        assert!(wish < bug);
    }

    #[test]
    fn test_post_text_cannot_change_layout() {
        let mut noisy = section("bug", 1);
        noisy.examples[0].title = "**Urgent** [help] #1".to_string();
        noisy.examples[0].excerpt = "> quoted * list _x_".to_string();
        noisy.examples[0].url = "https://reddit.com/r/a/(b)".to_string();

        let rendered = MarkdownReport.render(&data(vec![noisy])).unwrap();
        assert!(rendered
            .contains("- **\\*\\*Urgent\\*\\* \\[help\\] \\#1** (r/Shopify, 40 upvotes)"));
        assert!(rendered.contains("  > \\> quoted \\* list \\_x\\_"));
        assert!(rendered.contains("[Link](https://reddit.com/r/a/%28b%29)"));
    }

    #[test]
    fn test_empty_report_still_renders() {
        let rendered = MarkdownReport.render(&data(Vec::new())).unwrap();
        assert!(rendered.contains("Top Pain Points Identified: 0"));
        assert!(rendered.contains("No pain points were found."));
        assert!(!rendered.contains("## Pain Point:"));
    }
}
