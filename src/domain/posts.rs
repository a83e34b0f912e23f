mod data;

use time::{Date, format_description::FormatItem, macros::format_description};

pub use blogfront_api_types::Post;
pub use data::seed_posts;

use super::error::DomainError;

pub const PUBLISH_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month padding:zero]-[day padding:zero]");

const DEFAULT_IMAGE_BASE: &str = "https://picsum.photos/400/250?random=";

/// Server-side query over the post list. Both criteria combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Case-insensitive category equality.
    pub category: Option<String>,
    pub featured: Option<bool>,
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn featured_only() -> Self {
        Self {
            category: None,
            featured: Some(true),
        }
    }

    pub fn category(name: impl Into<String>) -> Self {
        Self {
            category: Some(name.into()),
            featured: None,
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        let category_matches = self
            .category
            .as_deref()
            .is_none_or(|wanted| post.category.to_lowercase() == wanted.to_lowercase());
        let featured_matches = self.featured.is_none_or(|wanted| post.featured == wanted);
        category_matches && featured_matches
    }
}

pub fn filter_posts<'a>(
    posts: impl IntoIterator<Item = &'a Post>,
    filter: &PostFilter,
) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| filter.matches(post))
        .cloned()
        .collect()
}

/// Distinct categories in order of first appearance.
pub fn distinct_categories<'a>(posts: impl IntoIterator<Item = &'a Post>) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for post in posts {
        if !categories.iter().any(|known| known == &post.category) {
            categories.push(post.category.clone());
        }
    }
    categories
}

/// `max(existing) + 1`, or 1 for an empty list.
pub fn next_id(posts: &[Post]) -> u64 {
    posts.iter().map(|post| post.id).max().unwrap_or(0) + 1
}

pub fn default_image_url(id: u64) -> String {
    format!("{DEFAULT_IMAGE_BASE}{id}")
}

pub fn format_publish_date(date: Date) -> Result<String, DomainError> {
    date.format(PUBLISH_DATE_FORMAT)
        .map_err(|err| DomainError::invariant(format!("unformattable publish date: {err}")))
}

/// Unsaved post as submitted by a client. The store turns it into a [`Post`]
/// once it has picked an id.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub image_url: Option<String>,
}

impl PostDraft {
    /// Required fields that are absent or blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("content", &self.content),
            ("author", &self.author),
            ("category", &self.category),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|text| text.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }

    pub fn ensure_complete(&self) -> Result<(), DomainError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::missing_fields(missing))
        }
    }

    pub fn into_post(self, id: u64, publish_date: String) -> Result<Post, DomainError> {
        self.ensure_complete()?;
        if id == 0 {
            return Err(DomainError::invariant("post ids start at 1"));
        }

        Ok(Post {
            id,
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            publish_date,
            category: self.category.unwrap_or_default(),
            tags: self.tags,
            featured: self.featured,
            image_url: self
                .image_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| default_image_url(id)),
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn seed_data_covers_three_categories() {
        let posts = seed_posts();
        assert_eq!(posts.len(), 5);
        assert_eq!(
            distinct_categories(&posts),
            vec!["Angular", "CSS", "TypeScript"]
        );
    }

    #[test]
    fn category_filter_ignores_case() {
        let posts = seed_posts();
        let matched = filter_posts(&posts, &PostFilter::category("angular"));
        let ids: Vec<u64> = matched.iter().map(|post| post.id).collect();
        assert_eq!(ids, vec![1, 5]);

        let mut post = posts[0].clone();
        post.category = "Ökologie".into();
        assert!(PostFilter::category("ökologie").matches(&post));
        assert!(PostFilter::category("ÖKOLOGIE").matches(&post));
        assert!(!PostFilter::category("okologie").matches(&post));
    }

    #[test]
    fn filters_combine_with_and() {
        let posts = seed_posts();
        let filter = PostFilter {
            category: Some("CSS".into()),
            featured: Some(true),
        };
        let ids: Vec<u64> = filter_posts(&posts, &filter)
            .iter()
            .map(|post| post.id)
            .collect();
        assert_eq!(ids, vec![3]);

        let non_featured = PostFilter {
            category: None,
            featured: Some(false),
        };
        assert!(
            filter_posts(&posts, &non_featured)
                .iter()
                .all(|post| !post.featured)
        );
    }

    #[test]
    fn next_id_follows_the_maximum() {
        let mut posts = seed_posts();
        assert_eq!(next_id(&posts), 6);
        posts.retain(|post| post.id != 3);
        assert_eq!(next_id(&posts), 6);
        assert_eq!(next_id(&[]), 1);
    }

    #[test]
    fn draft_reports_every_blank_field() {
        let draft = PostDraft {
            title: Some("  ".into()),
            content: Some("body".into()),
            author: None,
            ..Default::default()
        };
        assert_eq!(draft.missing_fields(), vec!["title", "author", "category"]);

        let err = draft
            .into_post(1, "2024-01-01".into())
            .expect_err("incomplete draft");
        assert_eq!(
            err.to_string(),
            "Missing required fields: title, author, category"
        );
    }

    #[test]
    fn draft_defaults_the_image_url() {
        let draft = PostDraft {
            title: Some("Title".into()),
            content: Some("Body".into()),
            author: Some("Author".into()),
            category: Some("Rust".into()),
            ..Default::default()
        };
        let post = draft.into_post(9, "2024-02-03".into()).expect("complete draft");
        assert_eq!(post.image_url, "https://picsum.photos/400/250?random=9");
        assert!(post.tags.is_empty());
        assert!(!post.featured);
    }

    #[test]
    fn publish_dates_are_zero_padded() {
        assert_eq!(
            format_publish_date(date!(2024 - 03 - 07)).expect("format date"),
            "2024-03-07"
        );
    }
}
