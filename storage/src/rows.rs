use crate::keyword_list::{decode_keywords, encode_keywords};
use chrono::{DateTime, Utc};
use painpoint_core::{
    CleanedPost, CoreError, FetchStatus, NormalizedText, Post, RawPost, SchemaError,
    SourceOutcome, TaggedPost,
};
use serde::{Deserialize, Serialize};

// Field order in every row struct must match `Table::columns`, because the
// header is written separately from the rows.

/// An empty title cell reads back as a missing title. An empty body cell is
/// an empty body: link and image posts have no selftext.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RawPostRow {
    subreddit: String,
    title: Option<String>,
    body: String,
    author: String,
    created_utc: DateTime<Utc>,
    upvotes: i64,
    num_comments: u64,
    url: String,
}

impl From<&RawPost> for RawPostRow {
    fn from(post: &RawPost) -> Self {
        Self {
            subreddit: post.subreddit.clone(),
            title: post.title.clone(),
            body: post.body.clone().unwrap_or_default(),
            author: post.author.clone(),
            created_utc: post.created_utc,
            upvotes: post.upvotes,
            num_comments: post.num_comments,
            url: post.url.clone(),
        }
    }
}

impl From<RawPostRow> for RawPost {
    fn from(row: RawPostRow) -> Self {
        Self {
            subreddit: row.subreddit,
            title: row.title,
            body: Some(row.body),
            author: row.author,
            created_utc: row.created_utc,
            upvotes: row.upvotes,
            num_comments: row.num_comments,
            url: row.url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CleanedPostRow {
    subreddit: String,
    title: String,
    body: String,
    author: String,
    created_utc: DateTime<Utc>,
    upvotes: i64,
    num_comments: u64,
    url: String,
    title_clean: NormalizedText,
    body_clean: NormalizedText,
}

impl From<&CleanedPost> for CleanedPostRow {
    fn from(cleaned: &CleanedPost) -> Self {
        let post = &cleaned.post;
        Self {
            subreddit: post.subreddit.clone(),
            title: post.title.clone(),
            body: post.body.clone(),
            author: post.author.clone(),
            created_utc: post.created_utc,
            upvotes: post.upvotes,
            num_comments: post.num_comments,
            url: post.url.clone(),
            title_clean: cleaned.title_clean.clone(),
            body_clean: cleaned.body_clean.clone(),
        }
    }
}

impl From<CleanedPostRow> for CleanedPost {
    fn from(row: CleanedPostRow) -> Self {
        Self {
            post: Post {
                subreddit: row.subreddit,
                title: row.title,
                body: row.body,
                author: row.author,
                created_utc: row.created_utc,
                upvotes: row.upvotes,
                num_comments: row.num_comments,
                url: row.url,
            },
            title_clean: row.title_clean,
            body_clean: row.body_clean,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TaggedPostRow {
    subreddit: String,
    title: String,
    body: String,
    author: String,
    created_utc: DateTime<Utc>,
    upvotes: i64,
    num_comments: u64,
    url: String,
    title_clean: NormalizedText,
    body_clean: NormalizedText,
    matched_keywords: String,
}

impl TaggedPostRow {
    pub(crate) fn from_tagged(tagged: &TaggedPost) -> Result<Self, CoreError> {
        let CleanedPostRow {
            subreddit,
            title,
            body,
            author,
            created_utc,
            upvotes,
            num_comments,
            url,
            title_clean,
            body_clean,
        } = CleanedPostRow::from(&tagged.cleaned);

        Ok(Self {
            subreddit,
            title,
            body,
            author,
            created_utc,
            upvotes,
            num_comments,
            url,
            title_clean,
            body_clean,
            matched_keywords: encode_keywords(&tagged.matched_keywords)?,
        })
    }

    pub(crate) fn into_tagged(self, table: &str, row: u64) -> Result<TaggedPost, SchemaError> {
        let matched_keywords = decode_keywords(&self.matched_keywords, table, row)?;
        let cleaned = CleanedPostRow {
            subreddit: self.subreddit,
            title: self.title,
            body: self.body,
            author: self.author,
            created_utc: self.created_utc,
            upvotes: self.upvotes,
            num_comments: self.num_comments,
            url: self.url,
            title_clean: self.title_clean,
            body_clean: self.body_clean,
        };
        Ok(TaggedPost {
            cleaned: cleaned.into(),
            matched_keywords,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ManifestRow<'a> {
    subreddit: &'a str,
    status: &'static str,
    fetched: Option<usize>,
    matched: Option<usize>,
    error_code: Option<&'a str>,
    error: Option<&'a str>,
}

impl<'a> From<&'a SourceOutcome> for ManifestRow<'a> {
    fn from(outcome: &'a SourceOutcome) -> Self {
        match &outcome.status {
            FetchStatus::Fetched { fetched, matched } => Self {
                subreddit: &outcome.subreddit,
                status: "fetched",
                fetched: Some(*fetched),
                matched: Some(*matched),
                error_code: None,
                error: None,
            },
            FetchStatus::Failed { reason, error_code } => Self {
                subreddit: &outcome.subreddit,
                status: "failed",
                fetched: None,
                matched: None,
                error_code: Some(error_code),
                error: Some(reason),
            },
        }
    }
}
