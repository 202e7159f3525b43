//! Flat CSV tables written at every pipeline stage boundary.
//!
//! Every reader checks the header against the columns the stage needs before
//! touching any row, so a table from the wrong stage fails with a
//! [`SchemaError::MissingColumn`] instead of a confusing per-row error.

pub mod keyword_list;
pub mod layout;
mod rows;


pub use keyword_list::{decode_keywords, encode_keywords};
pub use layout::RunLayout;

use painpoint_core::{
    CleanedPost, CoreError, KeywordGroupSummary, KeywordPrioritySummary, RawPost, SchemaError,
    SourceOutcome, TaggedPost,
};
use rows::{CleanedPostRow, ManifestRow, RawPostRow, TaggedPostRow};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

const POST_COLUMNS: &[&str] = &[
    "subreddit",
    "title",
    "body",
    "author",
    "created_utc",
    "upvotes",
    "num_comments",
    "url",
];

const CLEANED_COLUMNS: &[&str] = &[
    "subreddit",
    "title",
    "body",
    "author",
    "created_utc",
    "upvotes",
    "num_comments",
    "url",
    "title_clean",
    "body_clean",
];

const TAGGED_COLUMNS: &[&str] = &[
    "subreddit",
    "title",
    "body",
    "author",
    "created_utc",
    "upvotes",
    "num_comments",
    "url",
    "title_clean",
    "body_clean",
    "matched_keywords",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    RawPosts,
    CleanedPosts,
    TaggedPosts,
    GroupSummary,
    PrioritySummary,
    Manifest,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::RawPosts => "raw posts",
            Table::CleanedPosts => "cleaned posts",
            Table::TaggedPosts => "tagged posts",
            Table::GroupSummary => "group summary",
            Table::PrioritySummary => "priority summary",
            Table::Manifest => "scrape manifest",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::RawPosts => POST_COLUMNS,
            Table::CleanedPosts => CLEANED_COLUMNS,
            Table::TaggedPosts => TAGGED_COLUMNS,
            Table::GroupSummary => &["subreddit", "keyword", "count"],
            Table::PrioritySummary => &[
                "keyword",
                "num_posts",
                "total_upvotes",
                "avg_upvotes",
                "total_comments",
                "avg_comments",
            ],
            Table::Manifest => &[
                "subreddit",
                "status",
                "fetched",
                "matched",
                "error_code",
                "error",
            ],
        }
    }

    /// File name prefix used by [`RunLayout`].
    pub fn file_stem(&self) -> &'static str {
        match self {
            Table::RawPosts => "reddit_scrape_raw",
            Table::CleanedPosts => "reddit_scrape_cleaned",
            Table::TaggedPosts => "pain_point_posts",
            Table::GroupSummary => "pain_point_summary",
            Table::PrioritySummary => "pain_point_priority_summary",
            Table::Manifest => "scrape_manifest",
        }
    }
}

/// Fails with the first required column absent from `headers`.
pub fn check_headers(table: Table, headers: &csv::StringRecord) -> Result<(), SchemaError> {
    for column in table.columns() {
        if !headers.iter().any(|h| h.trim() == *column) {
            return Err(SchemaError::MissingColumn {
                table: table.name().to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Reads every row of `table` from `reader`. The second element of each item
/// is the 1-based data row number, for error messages.
pub(crate) fn read_rows<R, T>(reader: R, table: Table) -> Result<Vec<(u64, T)>, CoreError>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    check_headers(table, &headers)?;

    let mut rows = Vec::new();
    for (index, record) in csv_reader.deserialize::<T>().enumerate() {
        let row = index as u64 + 1;
        let value = record.map_err(|e| SchemaError::MalformedRow {
            table: table.name().to_string(),
            row,
            reason: e.to_string(),
        })?;
        rows.push((row, value));
    }
    Ok(rows)
}

/// Writes the header for `table` and then one line per row. The header is
/// written even when `rows` is empty.
pub(crate) fn write_rows<W, T, I>(writer: W, table: Table, rows: I) -> Result<usize, CoreError>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(table.columns())?;

    let mut count = 0;
    for row in rows {
        csv_writer.serialize(row)?;
        count += 1;
    }
    csv_writer.flush()?;
    Ok(count)
}

fn open(path: &Path) -> Result<File, CoreError> {
    debug!("Reading {}", path.display());
    Ok(File::open(path)?)
}

fn create(path: &Path) -> Result<File, CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

fn saved(table: Table, path: &Path, count: usize) {
    info!("Saved {} {} rows to {}", count, table.name(), path.display());
}

pub fn read_raw_posts(path: &Path) -> Result<Vec<RawPost>, CoreError> {
    let rows: Vec<(u64, RawPostRow)> = read_rows(open(path)?, Table::RawPosts)?;
    Ok(rows.into_iter().map(|(_, row)| row.into()).collect())
}

pub fn write_raw_posts(path: &Path, posts: &[RawPost]) -> Result<(), CoreError> {
    let count = write_rows(create(path)?, Table::RawPosts, posts.iter().map(RawPostRow::from))?;
    saved(Table::RawPosts, path, count);
    Ok(())
}

pub fn read_cleaned_posts(path: &Path) -> Result<Vec<CleanedPost>, CoreError> {
    let rows: Vec<(u64, CleanedPostRow)> = read_rows(open(path)?, Table::CleanedPosts)?;
    Ok(rows.into_iter().map(|(_, row)| row.into()).collect())
}

pub fn write_cleaned_posts(path: &Path, posts: &[CleanedPost]) -> Result<(), CoreError> {
    let count = write_rows(
        create(path)?,
        Table::CleanedPosts,
        posts.iter().map(CleanedPostRow::from),
    )?;
    saved(Table::CleanedPosts, path, count);
    Ok(())
}

pub fn read_tagged_posts(path: &Path) -> Result<Vec<TaggedPost>, CoreError> {
    tagged_posts_from_reader(open(path)?)
}

pub fn tagged_posts_from_reader<R: Read>(reader: R) -> Result<Vec<TaggedPost>, CoreError> {
    let table = Table::TaggedPosts;
    let rows: Vec<(u64, TaggedPostRow)> = read_rows(reader, table)?;
    rows.into_iter()
        .map(|(row_number, row)| Ok(row.into_tagged(table.name(), row_number)?))
        .collect()
}

pub fn write_tagged_posts(path: &Path, posts: &[TaggedPost]) -> Result<(), CoreError> {
    let count = tagged_posts_to_writer(create(path)?, posts)?;
    saved(Table::TaggedPosts, path, count);
    Ok(())
}

pub fn tagged_posts_to_writer<W: Write>(writer: W, posts: &[TaggedPost]) -> Result<usize, CoreError> {
    let rows = posts
        .iter()
        .map(TaggedPostRow::from_tagged)
        .collect::<Result<Vec<_>, _>>()?;
    write_rows(writer, Table::TaggedPosts, rows)
}

pub fn read_group_summary(path: &Path) -> Result<Vec<KeywordGroupSummary>, CoreError> {
    let rows: Vec<(u64, KeywordGroupSummary)> = read_rows(open(path)?, Table::GroupSummary)?;
    Ok(rows.into_iter().map(|(_, row)| row).collect())
}

pub fn write_group_summary(path: &Path, summary: &[KeywordGroupSummary]) -> Result<(), CoreError> {
    let count = write_rows(create(path)?, Table::GroupSummary, summary)?;
    saved(Table::GroupSummary, path, count);
    Ok(())
}

pub fn read_priority_summary(path: &Path) -> Result<Vec<KeywordPrioritySummary>, CoreError> {
    let rows: Vec<(u64, KeywordPrioritySummary)> =
        read_rows(open(path)?, Table::PrioritySummary)?;
    Ok(rows.into_iter().map(|(_, row)| row).collect())
}

pub fn write_priority_summary(
    path: &Path,
    summary: &[KeywordPrioritySummary],
) -> Result<(), CoreError> {
    let count = write_rows(create(path)?, Table::PrioritySummary, summary)?;
    saved(Table::PrioritySummary, path, count);
    Ok(())
}

pub fn write_manifest(path: &Path, outcomes: &[SourceOutcome]) -> Result<(), CoreError> {
    let count = write_rows(
        create(path)?,
        Table::Manifest,
        outcomes.iter().map(ManifestRow::from),
    )?;
    saved(Table::Manifest, path, count);
    Ok(())
}
