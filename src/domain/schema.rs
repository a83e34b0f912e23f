//! Structural validation of post payloads received from the network.
//!
//! Every shape has exactly one rule function (`check_post`, `check_posts`,
//! `check_categories`). The strict entry points return `Result` so callers can
//! use `?`; the `safe_parse_*` variants wrap the same outcome in [`SafeParse`]
//! for callers that branch on success. A payload is accepted whole or not at
//! all: the typed value is only built once the rule function reported nothing.
//! [`screen_posts`] applies that rule per element of a post list instead.

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use thiserror::Error;
use url::Url;

use super::posts::Post;

const TITLE_MAX: usize = 200;
const CONTENT_MAX: usize = 10_000;
const AUTHOR_MAX: usize = 100;
const CATEGORY_MAX: usize = 50;
const TAG_MAX_LEN: usize = 30;
const TAGS_MIN: usize = 1;
const TAGS_MAX: usize = 10;

/// One violated constraint, addressed by a path such as `tags[1]` or `[0].title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payload failed validation: {}", summarize(.issues))]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// True when some issue is reported at exactly `path`.
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

fn summarize(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| {
            if issue.path.is_empty() {
                issue.message.clone()
            } else {
                format!("{}: {}", issue.path, issue.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Outcome of a non-failing parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafeParse<T> {
    Success(T),
    Failure(ValidationError),
}

impl<T> SafeParse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, SafeParse::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            SafeParse::Success(data) => Some(data),
            SafeParse::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            SafeParse::Success(_) => None,
            SafeParse::Failure(error) => Some(error),
        }
    }
}

impl<T> From<Result<T, ValidationError>> for SafeParse<T> {
    fn from(result: Result<T, ValidationError>) -> Self {
        match result {
            Ok(data) => SafeParse::Success(data),
            Err(error) => SafeParse::Failure(error),
        }
    }
}

pub fn validate_post(value: &Value) -> Result<Post, ValidationError> {
    parse_with(value, check_post)
}

pub fn safe_parse_post(value: &Value) -> SafeParse<Post> {
    validate_post(value).into()
}

pub fn validate_posts(value: &Value) -> Result<Vec<Post>, ValidationError> {
    parse_with(value, check_posts)
}

pub fn safe_parse_posts(value: &Value) -> SafeParse<Vec<Post>> {
    validate_posts(value).into()
}

/// A post list screened element by element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostList {
    pub posts: Vec<Post>,
    /// Payload index and issues of every dropped element.
    pub rejected: Vec<(usize, ValidationError)>,
}

/// Keep each element that passes the post rules and drop the rest. Only a
/// payload that is not an array fails as a whole.
pub fn screen_posts(value: &Value) -> Result<PostList, ValidationError> {
    let Some(items) = value.as_array() else {
        return validate_posts(value).map(|posts| PostList {
            posts,
            rejected: Vec::new(),
        });
    };

    let mut list = PostList::default();
    for (index, item) in items.iter().enumerate() {
        match safe_parse_post(item) {
            SafeParse::Success(post) => list.posts.push(post),
            SafeParse::Failure(error) => list.rejected.push((index, error)),
        }
    }
    Ok(list)
}

pub fn validate_categories(value: &Value) -> Result<Vec<String>, ValidationError> {
    parse_with(value, check_categories)
}

pub fn safe_parse_categories(value: &Value) -> SafeParse<Vec<String>> {
    validate_categories(value).into()
}

type Rules = fn(&Value, &str, &mut Vec<FieldIssue>);

fn parse_with<T: DeserializeOwned>(value: &Value, rules: Rules) -> Result<T, ValidationError> {
    let mut issues = Vec::new();
    rules(value, "", &mut issues);
    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    let mut value = value.clone();
    widen_integral_ids(&mut value);
    serde_json::from_value(value).map_err(|err| ValidationError {
        issues: vec![FieldIssue {
            path: String::new(),
            message: err.to_string(),
        }],
    })
}

fn check_posts(value: &Value, path: &str, issues: &mut Vec<FieldIssue>) {
    let Some(items) = value.as_array() else {
        push(issues, path, expected("array", value));
        return;
    };
    for (index, item) in items.iter().enumerate() {
        check_post(item, &index_path(path, index), issues);
    }
}

fn check_post(value: &Value, path: &str, issues: &mut Vec<FieldIssue>) {
    let Some(object) = value.as_object() else {
        push(issues, path, expected("object", value));
        return;
    };

    check_id(object, path, issues);
    check_text(
        object,
        path,
        "title",
        TextRule::new(1, TITLE_MAX, "Title is required", "Title must be less than 200 characters"),
        issues,
    );
    check_text(
        object,
        path,
        "content",
        TextRule::new(
            1,
            CONTENT_MAX,
            "Content is required",
            "Content must be less than 10,000 characters",
        ),
        issues,
    );
    check_text(
        object,
        path,
        "author",
        TextRule::new(
            1,
            AUTHOR_MAX,
            "Author is required",
            "Author name must be less than 100 characters",
        ),
        issues,
    );
    if let Some(date) = string_field(object, path, "publishDate", issues)
        && !is_iso_date_shape(date)
    {
        push(
            issues,
            &key_path(path, "publishDate"),
            "Publish date must be in YYYY-MM-DD format",
        );
    }
    check_text(
        object,
        path,
        "category",
        TextRule::new(
            1,
            CATEGORY_MAX,
            "Category is required",
            "Category must be less than 50 characters",
        ),
        issues,
    );
    check_tags(object, path, issues);
    match object.get("featured") {
        None => push(issues, &key_path(path, "featured"), "Required"),
        Some(Value::Bool(_)) => {}
        Some(other) => push(issues, &key_path(path, "featured"), expected("boolean", other)),
    }
    if let Some(url) = string_field(object, path, "imageUrl", issues)
        && Url::parse(url).is_err()
    {
        push(
            issues,
            &key_path(path, "imageUrl"),
            "Image URL must be a valid URL",
        );
    }
}

fn check_categories(value: &Value, path: &str, issues: &mut Vec<FieldIssue>) {
    let Some(items) = value.as_array() else {
        push(issues, path, expected("array", value));
        return;
    };
    let rule = TextRule::new(
        1,
        CATEGORY_MAX,
        "Category name is required",
        "Category name must be less than 50 characters",
    );
    for (index, item) in items.iter().enumerate() {
        check_text_value(item, &index_path(path, index), &rule, issues);
    }
}

fn check_id(object: &Map<String, Value>, path: &str, issues: &mut Vec<FieldIssue>) {
    let field = key_path(path, "id");
    match object.get("id") {
        None => push(issues, &field, "Required"),
        Some(Value::Number(number)) => {
            if positive_integer(number).is_some() {
                return;
            }
            if number.as_f64().is_some_and(|float| float.fract() != 0.0) {
                push(issues, &field, "Expected integer, received float");
            } else {
                push(issues, &field, "ID must be a positive integer");
            }
        }
        Some(other) => push(issues, &field, expected("number", other)),
    }
}

/// `2.0` counts as the integer 2.
fn positive_integer(number: &Number) -> Option<u64> {
    if let Some(id) = number.as_u64() {
        return (id > 0).then_some(id);
    }
    let float = number.as_f64()?;
    (float >= 1.0 && float.fract() == 0.0 && float <= u64::MAX as f64).then_some(float as u64)
}

/// Rewrite integral float ids as integers so they deserialize into `u64`.
fn widen_integral_ids(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(widen_integral_ids),
        Value::Object(object) => {
            let id = match object.get("id") {
                Some(Value::Number(number)) if number.is_f64() => positive_integer(number),
                _ => None,
            };
            if let Some(id) = id {
                object.insert("id".to_string(), Value::from(id));
            }
        }
        _ => {}
    }
}

fn check_tags(object: &Map<String, Value>, path: &str, issues: &mut Vec<FieldIssue>) {
    let field = key_path(path, "tags");
    let tags = match object.get("tags") {
        None => {
            push(issues, &field, "Required");
            return;
        }
        Some(Value::Array(tags)) => tags,
        Some(other) => {
            push(issues, &field, expected("array", other));
            return;
        }
    };

    let rule = TextRule::new(
        1,
        TAG_MAX_LEN,
        "String must contain at least 1 character(s)",
        "String must contain at most 30 character(s)",
    );
    for (index, tag) in tags.iter().enumerate() {
        check_text_value(tag, &index_path(&field, index), &rule, issues);
    }
    if tags.len() < TAGS_MIN {
        push(issues, &field, "At least one tag is required");
    }
    if tags.len() > TAGS_MAX {
        push(issues, &field, "Maximum 10 tags allowed");
    }
}

struct TextRule {
    min: usize,
    max: usize,
    too_short: &'static str,
    too_long: &'static str,
}

impl TextRule {
    fn new(min: usize, max: usize, too_short: &'static str, too_long: &'static str) -> Self {
        Self {
            min,
            max,
            too_short,
            too_long,
        }
    }
}

fn check_text(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    rule: TextRule,
    issues: &mut Vec<FieldIssue>,
) {
    let field = key_path(path, key);
    match object.get(key) {
        None => push(issues, &field, "Required"),
        Some(value) => check_text_value(value, &field, &rule, issues),
    }
}

fn check_text_value(value: &Value, path: &str, rule: &TextRule, issues: &mut Vec<FieldIssue>) {
    let Some(text) = value.as_str() else {
        push(issues, path, expected("string", value));
        return;
    };
    let length = text.chars().count();
    if length < rule.min {
        push(issues, path, rule.too_short);
    } else if length > rule.max {
        push(issues, path, rule.too_long);
    }
}

/// Returns the string at `key`, recording an issue when it is absent or not a string.
fn string_field<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    key: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<&'a str> {
    match object.get(key) {
        None => {
            push(issues, &key_path(path, key), "Required");
            None
        }
        Some(Value::String(text)) => Some(text),
        Some(other) => {
            push(issues, &key_path(path, key), expected("string", other));
            None
        }
    }
}

/// Four digits, dash, two digits, dash, two digits. Calendar validity is not checked.
fn is_iso_date_shape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

fn push(issues: &mut Vec<FieldIssue>, path: &str, message: impl Into<String>) {
    issues.push(FieldIssue {
        path: path.to_string(),
        message: message.into(),
    });
}

fn expected(wanted: &str, actual: &Value) -> String {
    format!("Expected {wanted}, received {}", kind(actual))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn key_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_post() -> Value {
        json!({
            "id": 1,
            "title": "Angular Control Flow",
            "content": "Templates got simpler.",
            "author": "Mehmet Oezdag",
            "publishDate": "2024-01-15",
            "category": "Angular",
            "tags": ["Angular", "Templates"],
            "featured": true,
            "imageUrl": "https://picsum.photos/400/250?random=1"
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut post = valid_post();
        post[field] = value;
        post
    }

    #[test]
    fn accepts_a_complete_post() {
        let outcome = safe_parse_post(&valid_post());
        assert!(outcome.is_success());
        let post = outcome.data().expect("parsed post");
        assert_eq!(post.id, 1);
        assert_eq!(post.tags, vec!["Angular", "Templates"]);

        let strict = validate_post(&valid_post()).expect("strict parse");
        assert_eq!(&strict, post);
    }

    #[test]
    fn ignores_unknown_keys() {
        let post = with("views", json!(12));
        assert!(safe_parse_post(&post).is_success());
    }

    #[test]
    fn rejects_single_field_violations_without_erroring() {
        let cases = [
            ("id", json!("1")),
            ("id", json!(0)),
            ("id", json!(-4)),
            ("id", json!(1.5)),
            ("title", json!("")),
            ("content", json!("")),
            ("author", json!(42)),
            ("publishDate", json!("15.01.2024")),
            ("publishDate", json!("2024-1-15")),
            ("category", json!("x".repeat(51))),
            ("tags", json!([])),
            ("tags", json!("Angular")),
            ("featured", json!("true")),
            ("imageUrl", json!("not a url")),
        ];

        for (field, value) in cases {
            let outcome = safe_parse_post(&with(field, value.clone()));
            let error = outcome
                .error()
                .unwrap_or_else(|| panic!("{field}={value} should be rejected"));
            assert!(
                error.has_issue_at(field),
                "{field}={value} reported {:?}",
                error.issues()
            );
            assert_eq!(error.issues().len(), 1, "{field}={value}");
        }
    }

    #[test]
    fn strict_and_safe_agree() {
        let bad = with("title", json!(""));
        let strict = validate_post(&bad).expect_err("strict rejects");
        let safe = safe_parse_post(&bad);
        assert_eq!(safe.error(), Some(&strict));
        assert_eq!(strict.issues()[0].message, "Title is required");
    }

    #[test]
    fn reports_every_violation() {
        let mut post = valid_post();
        post["title"] = json!("");
        post["publishDate"] = json!("yesterday");
        post.as_object_mut().expect("object").remove("featured");

        let error = validate_post(&post).expect_err("three issues");
        let paths: Vec<&str> = error
            .issues()
            .iter()
            .map(|issue| issue.path.as_str())
            .collect();
        assert_eq!(paths, vec!["title", "publishDate", "featured"]);
    }

    #[test]
    fn tag_rules_cover_members_and_count() {
        let too_many: Vec<String> = (0..11).map(|n| format!("tag{n}")).collect();
        let error = validate_post(&with("tags", json!(too_many))).expect_err("too many tags");
        assert_eq!(error.issues()[0].message, "Maximum 10 tags allowed");

        let error = validate_post(&with("tags", json!(["ok", ""]))).expect_err("empty tag");
        assert!(error.has_issue_at("tags[1]"));

        let error =
            validate_post(&with("tags", json!(["y".repeat(31)]))).expect_err("long tag");
        assert!(error.has_issue_at("tags[0]"));
    }

    #[test]
    fn title_length_is_bounded() {
        assert!(safe_parse_post(&with("title", json!("t".repeat(200)))).is_success());
        let error =
            validate_post(&with("title", json!("t".repeat(201)))).expect_err("long title");
        assert_eq!(
            error.issues()[0].message,
            "Title must be less than 200 characters"
        );
    }

    #[test]
    fn arrays_are_rejected_as_a_whole() {
        let mut broken = valid_post();
        broken["id"] = json!(2);
        broken["tags"] = json!([]);
        let payload = json!([valid_post(), broken]);

        let error = validate_posts(&payload).expect_err("second element invalid");
        assert!(error.has_issue_at("[1].tags"));
        assert!(!safe_parse_posts(&payload).is_success());

        let ok = validate_posts(&json!([valid_post()])).expect("single valid element");
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn integral_float_ids_are_integers() {
        let post = validate_post(&with("id", json!(7.0))).expect("7.0 is an integer");
        assert_eq!(post.id, 7);

        let posts = validate_posts(&json!([with("id", json!(3.0))])).expect("array element");
        assert_eq!(posts[0].id, 3);

        let error = validate_post(&with("id", json!(0.0))).expect_err("zero");
        assert_eq!(error.issues()[0].message, "ID must be a positive integer");
        let error = validate_post(&with("id", json!(2.5))).expect_err("fraction");
        assert_eq!(error.issues()[0].message, "Expected integer, received float");
    }

    #[test]
    fn screening_drops_only_the_invalid_elements() {
        let mut untagged = valid_post();
        untagged["id"] = json!(2);
        untagged["tags"] = json!([]);
        let mut third = valid_post();
        third["id"] = json!(3);

        let list = screen_posts(&json!([valid_post(), untagged, third])).expect("array payload");
        let ids: Vec<u64> = list.posts.iter().map(|post| post.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(list.rejected.len(), 1);
        let (index, error) = &list.rejected[0];
        assert_eq!(*index, 1);
        assert!(error.has_issue_at("tags"));

        let error = screen_posts(&json!({"posts": []})).expect_err("not an array");
        assert_eq!(error.issues()[0].message, "Expected array, received object");
    }

    #[test]
    fn non_object_payload_is_a_root_issue() {
        let error = validate_post(&json!("post")).expect_err("not an object");
        assert_eq!(error.issues()[0].path, "");
        assert_eq!(error.issues()[0].message, "Expected object, received string");
        assert_eq!(
            error.to_string(),
            "payload failed validation: Expected object, received string"
        );
    }

    #[test]
    fn categories_must_be_non_empty_strings() {
        let ok = validate_categories(&json!(["Angular", "CSS"])).expect("valid categories");
        assert_eq!(ok, vec!["Angular", "CSS"]);

        let outcome = safe_parse_categories(&json!(["Angular", "", 3]));
        let error = outcome.error().expect("invalid categories");
        assert!(error.has_issue_at("[1]"));
        assert!(error.has_issue_at("[2]"));
    }
}
