use crate::cli::ReportFormat;
use analysis_engine::{
    group_by_subreddit_keyword, keyword_counts, prioritize, tag_pain_points, top_posts_for_keyword,
    top_words, DatasetOverview, RecordCleaner,
};
use anyhow::Result;
use chrono::Local;
use painpoint_core::{
    AppConfig, CleanedPost, ErrorExt, ErrorReporter, FetchStatus, KeywordPrioritySummary,
    RedditCredentials, ScrapeManifest, TaggedPost,
};
use reddit_client::{RedditClient, SubredditScraper};
use report_renderer::{
    write_report, JsonReport, MarkdownReport, ReportData, ReportOptions, ReportRenderer,
};
use std::path::{Path, PathBuf};
use storage::{RunLayout, Table};
use tracing::{info, warn};

/// Settings plus the timestamped output layout shared by every stage of one
/// invocation.
pub struct Workspace {
    pub config: AppConfig,
    pub layout: RunLayout,
}

impl Workspace {
    pub fn new(config: AppConfig, data_dir: Option<PathBuf>) -> Self {
        let dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
        Self {
            layout: RunLayout::now(dir),
            config,
        }
    }

    fn output_or_default(&self, output: Option<PathBuf>, table: Table) -> PathBuf {
        output.unwrap_or_else(|| self.layout.path(table))
    }
}

pub async fn scrape(
    ws: &Workspace,
    credentials: &RedditCredentials,
    limit: Option<u32>,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let client = RedditClient::new(credentials)?;
    client.authenticate().await?;

    let scraper = SubredditScraper::new(client);
    let limit = limit.unwrap_or(ws.config.fetch_limit);
    let manifest = scraper
        .scrape(&ws.config.subreddits(), &ws.config.pain_keywords(), limit)
        .await;

    let raw_path = ws.output_or_default(output, Table::RawPosts);
    storage::write_raw_posts(&raw_path, &manifest.posts)?;
    storage::write_manifest(&ws.layout.path(Table::Manifest), &manifest.outcomes)?;
    print_manifest(&manifest);

    Ok(raw_path)
}

fn print_manifest(manifest: &ScrapeManifest) {
    let failed = manifest.failed().count();
    println!(
        "Scraped {} posts from {} subreddits ({} failed)",
        manifest.posts.len(),
        manifest.outcomes.len(),
        failed
    );
    for outcome in manifest.failed() {
        if let FetchStatus::Failed { reason, error_code } = &outcome.status {
            println!("  r/{}: {} [{}]", outcome.subreddit, reason, error_code);
        }
    }
}

pub fn clean(ws: &Workspace, input: &Path, output: Option<PathBuf>) -> Result<PathBuf> {
    let raw = storage::read_raw_posts(input)?;
    let outcome = RecordCleaner::new(ws.config.cleaning()).clean(raw);

    let stats = outcome.stats;
    println!(
        "Cleaned {} posts: {} duplicates, {} incomplete, {} below thresholds removed, {} remaining",
        stats.input,
        stats.duplicates_removed,
        stats.incomplete_removed,
        stats.below_threshold_removed,
        stats.remaining
    );

    let path = ws.output_or_default(output, Table::CleanedPosts);
    storage::write_cleaned_posts(&path, &outcome.posts)?;
    Ok(path)
}

pub fn extract(ws: &Workspace, input: &Path, output: Option<PathBuf>) -> Result<PathBuf> {
    let cleaned = storage::read_cleaned_posts(input)?;
    let total = cleaned.len();
    let tagged = tag_pain_points(cleaned, &ws.config.pain_keywords());
    println!("{} of {} posts mention a pain point", tagged.len(), total);

    let path = ws.output_or_default(output, Table::TaggedPosts);
    storage::write_tagged_posts(&path, &tagged)?;

    let groups = group_by_subreddit_keyword(&tagged);
    storage::write_group_summary(&ws.layout.path(Table::GroupSummary), &groups)?;
    Ok(path)
}

pub fn prioritize_posts(
    ws: &Workspace,
    input: &Path,
    output: Option<PathBuf>,
    keyword: Option<&str>,
    top: usize,
) -> Result<PathBuf> {
    let tagged = storage::read_tagged_posts(input)?;
    let summary = prioritize(&tagged);
    print_priority(&summary);

    if let Some(keyword) = keyword {
        print_top_posts(&tagged, keyword, top);
    }

    let path = ws.output_or_default(output, Table::PrioritySummary);
    storage::write_priority_summary(&path, &summary)?;
    Ok(path)
}

fn print_priority(summary: &[KeywordPrioritySummary]) {
    println!("=== Pain Point Priority ===");
    if summary.is_empty() {
        println!("No pain points found.");
        return;
    }
    println!(
        "{:<20} {:>8} {:>12} {:>12}",
        "keyword", "posts", "avg upvotes", "avg comments"
    );
    for row in summary {
        println!(
            "{:<20} {:>8} {:>12.1} {:>12.1}",
            row.keyword, row.num_posts, row.avg_upvotes, row.avg_comments
        );
    }
}

fn print_top_posts(tagged: &[TaggedPost], keyword: &str, top: usize) {
    let posts = top_posts_for_keyword(tagged, keyword, top);
    println!();
    println!("=== Top posts for '{}' ===", keyword);
    if posts.is_empty() {
        println!("No posts mention '{}'.", keyword);
        return;
    }
    for tagged in posts {
        let post = tagged.post();
        println!(
            "[{}] r/{} ({} comments) {}",
            post.upvotes, post.subreddit, post.num_comments, post.title
        );
        println!("    {}", post.url);
    }
}

pub fn report(
    ws: &Workspace,
    priority: &Path,
    posts: &Path,
    output: Option<PathBuf>,
    format: ReportFormat,
) -> Result<PathBuf> {
    let summary = storage::read_priority_summary(priority)?;
    let tagged = storage::read_tagged_posts(posts)?;
    let options = ReportOptions::new(&ws.config.report, Local::now().date_naive());
    let data = ReportData::build(&summary, &tagged, &options);

    let renderer: &dyn ReportRenderer = match format {
        ReportFormat::Markdown => &MarkdownReport,
        ReportFormat::Json => &JsonReport,
    };
    let path = output.unwrap_or_else(|| {
        ws.layout
            .report_path()
            .with_extension(renderer.file_extension())
    });
    write_report(renderer, &data, &path)?;
    println!("Report written to {}", path.display());
    Ok(path)
}

pub fn stats(ws: &Workspace, input: &Path, top: usize) -> Result<()> {
    let posts = storage::read_cleaned_posts(input)?;
    print_stats(&posts, ws, top);
    Ok(())
}

fn print_stats(posts: &[CleanedPost], ws: &Workspace, top: usize) {
    print!("{}", DatasetOverview::from_posts(posts));

    let keywords = ws.config.pain_keywords();
    let columns: [(&str, Vec<&str>); 2] = [
        ("titles", posts.iter().map(|p| p.title_clean.as_str()).collect()),
        ("bodies", posts.iter().map(|p| p.body_clean.as_str()).collect()),
    ];
    for (label, texts) in columns {
        println!();
        println!("=== Top words in {} ===", label);
        for (word, count) in top_words(texts.iter().copied(), top) {
            println!("{:<20} {}", word, count);
        }

        println!();
        println!("=== Pain point keywords in {} ===", label);
        for (keyword, count) in keyword_counts(texts.iter().copied(), &keywords) {
            println!("{:<20} {}", keyword, count);
        }
    }
}

/// Every stage in order, each reading the previous stage's table.
pub async fn run(ws: &Workspace, credentials: &RedditCredentials, limit: Option<u32>) -> Result<()> {
    info!("Starting pipeline run {}", ws.layout.stamp());
    ws.layout.ensure_dir()?;

    let raw = scrape(ws, credentials, limit, None).await?;
    let cleaned = clean(ws, &raw, None)?;
    stats(ws, &cleaned, 20)?;
    let tagged = extract(ws, &cleaned, None)?;
    let priority = prioritize_posts(ws, &tagged, None, None, 0)?;
    let report_path = report(ws, &priority, &tagged, None, ReportFormat::Markdown)?;

    info!("Pipeline complete: {}", report_path.display());
    Ok(())
}

/// Logs a fatal error through the shared reporter and prints it for the
/// terminal. Non-domain errors are printed as-is.
pub fn report_failure(error: &anyhow::Error) {
    match error.downcast_ref::<painpoint_core::CoreError>() {
        Some(core) => {
            ErrorReporter::new().report_error(core);
            eprintln!("Error [{}]: {}", core.error_code(), core.user_friendly_message());
        }
        None => {
            warn!("Unclassified failure: {:#}", error);
            eprintln!("Error: {:#}", error);
        }
    }
}
