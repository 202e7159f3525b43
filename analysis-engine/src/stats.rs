use painpoint_core::{CleanedPost, PainKeywords};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Summary of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl Distribution {
    /// `None` for an empty column.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let len = values.len();
        let median = if len % 2 == 0 {
            (values[len / 2 - 1] + values[len / 2]) / 2.0
        } else {
            values[len / 2]
        };

        Some(Self {
            min: values[0],
            max: values[len - 1],
            mean: values.iter().sum::<f64>() / len as f64,
            median,
        })
    }
}

/// Overview of a cleaned dataset, used for exploratory output.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOverview {
    pub total_posts: usize,
    /// Most posts first; ties by subreddit name.
    pub posts_per_subreddit: Vec<(String, usize)>,
    pub upvotes: Option<Distribution>,
    pub comments: Option<Distribution>,
}

impl DatasetOverview {
    pub fn from_posts(posts: &[CleanedPost]) -> Self {
        let mut per_subreddit: BTreeMap<&str, usize> = BTreeMap::new();
        for post in posts {
            *per_subreddit.entry(post.post.subreddit.as_str()).or_default() += 1;
        }
        let mut posts_per_subreddit: Vec<(String, usize)> = per_subreddit
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        posts_per_subreddit.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            total_posts: posts.len(),
            posts_per_subreddit,
            upvotes: Distribution::from_values(
                posts.iter().map(|p| p.post.upvotes as f64).collect(),
            ),
            comments: Distribution::from_values(
                posts.iter().map(|p| p.post.num_comments as f64).collect(),
            ),
        }
    }
}

impl fmt::Display for DatasetOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Data Overview ===")?;
        writeln!(f, "Total posts: {}", self.total_posts)?;
        for (label, dist) in [("Upvotes", &self.upvotes), ("Comments", &self.comments)] {
            match dist {
                Some(d) => writeln!(
                    f,
                    "{label}: min {:.0}, max {:.0}, mean {:.1}, median {:.1}",
                    d.min, d.max, d.mean, d.median
                )?,
                None => writeln!(f, "{label}: no data")?,
            }
        }
        writeln!(f)?;
        writeln!(f, "=== Posts per Subreddit ===")?;
        for (subreddit, count) in &self.posts_per_subreddit {
            writeln!(f, "{subreddit:<28} {count}")?;
        }
        Ok(())
    }
}

/// The `n` most frequent words across `texts`. Words are runs of
/// alphanumerics or underscores, compared case-insensitively. Ties are
/// ordered alphabetically.
pub fn top_words<'a, I>(texts: I, n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in text
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|w| !w.is_empty())
        {
            *counts.entry(word.to_lowercase()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

/// For every keyword, the number of texts containing it. Includes zero
/// counts. Sorted by count, ties in configured keyword order.
pub fn keyword_counts<'a, I>(texts: I, keywords: &PainKeywords) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, usize)> = keywords.iter().map(|k| (k.to_string(), 0)).collect();
    for text in texts {
        for (keyword, count) in counts.iter_mut() {
            if text.contains(keyword.as_str()) {
                *count += 1;
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::raw_post;
    use painpoint_core::Post;

    fn cleaned(subreddit: &str, title: &str, upvotes: i64, comments: u64) -> CleanedPost {
        let mut raw = raw_post(title, "", upvotes, comments);
        raw.subreddit = subreddit.to_string();
        CleanedPost::new(Post::from_raw(raw).unwrap())
    }

    #[test]
    fn test_distribution() {
        let dist = Distribution::from_values(vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(dist.min, 1.0);
        assert_eq!(dist.max, 4.0);
        assert_eq!(dist.mean, 2.5);
        assert_eq!(dist.median, 2.5);

        let odd = Distribution::from_values(vec![9.0, 1.0, 5.0]).unwrap();
        assert_eq!(odd.median, 5.0);

        assert!(Distribution::from_values(Vec::new()).is_none());
    }

    #[test]
    fn test_overview() {
        let posts = vec![
            cleaned("retail", "a", 1, 0),
            cleaned("Shopify", "b", 5, 2),
            cleaned("Shopify", "c", 3, 4),
        ];
        let overview = DatasetOverview::from_posts(&posts);

        assert_eq!(overview.total_posts, 3);
        assert_eq!(
            overview.posts_per_subreddit,
            vec![("Shopify".to_string(), 2), ("retail".to_string(), 1)]
        );
        assert_eq!(overview.upvotes.unwrap().max, 5.0);
        assert_eq!(overview.comments.unwrap().mean, 2.0);

        let rendered = overview.to_string();
        assert!(rendered.contains("Total posts: 3"));
        assert!(rendered.contains("Shopify"));
    }

    #[test]
    fn test_overview_of_empty_dataset() {
        let overview = DatasetOverview::from_posts(&[]);
        assert_eq!(overview.total_posts, 0);
        assert!(overview.upvotes.is_none());
        assert!(overview.to_string().contains("Upvotes: no data"));
    }

    #[test]
    fn test_top_words() {
        let texts = ["the bug is a bug", "The app", "bug_tracker rocks"];
        let top = top_words(texts, 3);
        assert_eq!(
            top,
            vec![
                ("bug".to_string(), 2),
                ("the".to_string(), 2),
                ("a".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_keyword_counts_include_zeros() {
        let keywords = PainKeywords::new(["bug", "issue", "wish"]);
        let texts = ["a bug", "another bug", "some issues"];
        let counts = keyword_counts(texts, &keywords);
        assert_eq!(
            counts,
            vec![
                ("bug".to_string(), 2),
                ("issue".to_string(), 1),
                ("wish".to_string(), 0)
            ]
        );
    }
}
