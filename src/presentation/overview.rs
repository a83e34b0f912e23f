use std::fmt::Write;

use crate::application::overview::{FilterState, ViewState};
use crate::domain::posts::Post;
use crate::infra::preferences::Preferences;

const EXCERPT_CHARS: usize = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    fn heading(self) -> &'static str {
        match self {
            Theme::Light => "\x1b[1;34m",
            Theme::Dark => "\x1b[1;93m",
        }
    }

    fn muted(self) -> &'static str {
        match self {
            Theme::Light => "\x1b[2m",
            Theme::Dark => "\x1b[37m",
        }
    }

    fn reset(self) -> &'static str {
        "\x1b[0m"
    }
}

impl From<Preferences> for Theme {
    fn from(preferences: Preferences) -> Self {
        if preferences.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

fn filter_line(filters: &FilterState) -> String {
    let category = if filters.selected_category.is_empty() {
        "all categories"
    } else {
        filters.selected_category.as_str()
    };
    if filters.show_only_featured {
        format!("{category} · featured only")
    } else {
        category.to_string()
    }
}

fn excerpt(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

pub fn render_overview(view: &ViewState, filters: &FilterState, theme: Theme) -> String {
    let mut out = String::new();
    let (heading, muted, reset) = (theme.heading(), theme.muted(), theme.reset());

    let _ = writeln!(out, "{heading}Posts{reset} {muted}({}){reset}", filter_line(filters));
    if !view.categories.is_empty() {
        let _ = writeln!(out, "{muted}categories: {}{reset}", view.categories.join(", "));
    }

    if view.is_loading {
        let _ = writeln!(out, "loading…");
        return out;
    }
    if view.posts.is_empty() {
        let _ = writeln!(out, "no posts found");
        return out;
    }

    for post in &view.posts {
        let star = if post.featured { "★ " } else { "" };
        let _ = writeln!(out, "\n{heading}#{} {star}{}{reset}", post.id, post.title);
        let _ = writeln!(
            out,
            "{muted}{} · {} · {}{reset}",
            post.author, post.publish_date, post.category
        );
        let _ = writeln!(out, "{}", excerpt(&post.content));
    }
    out
}

pub fn render_post(post: &Post, theme: Theme) -> String {
    let (heading, muted, reset) = (theme.heading(), theme.muted(), theme.reset());
    let mut out = String::new();
    let _ = writeln!(out, "{heading}{}{reset}", post.title);
    let _ = writeln!(
        out,
        "{muted}#{} · {} · {} · {}{reset}",
        post.id, post.author, post.publish_date, post.category
    );
    if !post.tags.is_empty() {
        let _ = writeln!(out, "{muted}tags: {}{reset}", post.tags.join(", "));
    }
    let _ = writeln!(out, "{muted}{}{reset}\n", post.image_url);
    let _ = writeln!(out, "{}", post.content);
    out
}
