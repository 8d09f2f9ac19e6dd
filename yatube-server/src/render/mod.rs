//! Server-rendered HTML
//!
//! Each page is a typed context (see [`pages`]) that writes its own body;
//! [`page`] wraps it in the shared layout with navigation and footer.
//! Every piece of user content goes through [`escape`].

pub mod pages;

use std::fmt::{self, Write};

use axum::response::Html;
use chrono::{Datelike, Utc};

use crate::db::{Post, User};
use crate::models::{truncate_display, Paginated};
pub use pages::*;

/// Navigation and footer data every page needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chrome {
    /// Signed-in username
    pub user: Option<String>,
    /// Shown in the footer copyright line
    pub year: i32,
}

impl Chrome {
    pub fn new(user: Option<&User>) -> Self {
        Self {
            user: user.map(|u| u.username.clone()),
            year: Utc::now().year(),
        }
    }
}

/// A renderable page
pub trait Page {
    fn title(&self) -> String;

    fn chrome(&self) -> &Chrome;

    fn write_body(&self, out: &mut String) -> fmt::Result;
}

/// Escape text for HTML element content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape and keep line breaks.
pub fn linebreaks(s: &str) -> String {
    s.lines().map(escape).collect::<Vec<_>>().join("<br>\n")
}

/// URL of an author's profile page.
pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

/// URL of a group feed.
pub fn group_url(slug: &str) -> String {
    format!("/group/{}/", urlencoding::encode(slug))
}

/// Render a page inside the site layout.
pub fn page<P: Page>(page: &P) -> Html<String> {
    let mut out = String::with_capacity(4096);
    // fmt::Write for String never fails
    let _ = write_document(page, &mut out);
    Html(out)
}

fn write_document<P: Page>(page: &P, out: &mut String) -> fmt::Result {
    let chrome = page.chrome();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>{}</title>", escape(&page.title()))?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    write_nav(chrome, out)?;
    writeln!(out, "<main class=\"container\">")?;
    page.write_body(out)?;
    writeln!(out, "</main>")?;
    writeln!(out, "<footer>&copy; {} Yatube</footer>", chrome.year)?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

fn write_nav(chrome: &Chrome, out: &mut String) -> fmt::Result {
    writeln!(out, "<nav>")?;
    writeln!(out, "<a href=\"/\">Yatube</a>")?;
    match &chrome.user {
        Some(username) => {
            writeln!(out, "<a href=\"/create/\">New post</a>")?;
            writeln!(
                out,
                "<a href=\"{}\">{}</a>",
                escape(&profile_url(username)),
                escape(username)
            )?;
            writeln!(
                out,
                "<form method=\"post\" action=\"/auth/logout/\"><button type=\"submit\">Log out</button></form>"
            )?;
        }
        None => {
            writeln!(out, "<a href=\"/auth/login/\">Log in</a>")?;
            writeln!(out, "<a href=\"/auth/signup/\">Sign up</a>")?;
        }
    }
    writeln!(out, "</nav>")
}

/// One post in a feed.
pub(crate) fn write_post_card(post: &Post, show_group_link: bool, out: &mut String) -> fmt::Result {
    writeln!(out, "<article class=\"post\">")?;
    writeln!(out, "<ul>")?;
    writeln!(
        out,
        "<li>Author: <a href=\"{}\">{}</a></li>",
        escape(&profile_url(&post.author)),
        escape(&post.author)
    )?;
    writeln!(
        out,
        "<li>Published: <time datetime=\"{}\">{}</time></li>",
        post.pub_date.to_rfc3339(),
        post.pub_date.format("%d %b %Y")
    )?;
    writeln!(out, "</ul>")?;
    writeln!(out, "<p>{}</p>", linebreaks(&post.text))?;
    writeln!(
        out,
        "<a href=\"{}\">details</a>",
        escape(&post.absolute_url())
    )?;
    if show_group_link {
        if let Some(group) = &post.group {
            writeln!(
                out,
                "<a class=\"group-link\" href=\"{}\">all posts in {}</a>",
                escape(&group_url(&group.slug)),
                escape(truncate_display(&group.title))
            )?;
        }
    }
    writeln!(out, "</article>")
}

/// Page links under a feed.
pub(crate) fn write_paginator<T>(page: &Paginated<T>, out: &mut String) -> fmt::Result {
    if page.total_pages() <= 1 {
        return Ok(());
    }
    writeln!(out, "<nav class=\"pagination\">")?;
    if let Some(prev) = page.prev_page() {
        writeln!(out, "<a href=\"?page=1\">&laquo; first</a>")?;
        writeln!(out, "<a href=\"?page={prev}\">previous</a>")?;
    }
    writeln!(
        out,
        "<span class=\"current\">Page {} of {}</span>",
        page.page,
        page.total_pages()
    )?;
    if let Some(next) = page.next_page() {
        writeln!(out, "<a href=\"?page={next}\">next</a>")?;
        writeln!(
            out,
            "<a href=\"?page={}\">last &raquo;</a>",
            page.total_pages()
        )?;
    }
    writeln!(out, "</nav>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn linebreaks_escape_each_line() {
        assert_eq!(linebreaks("a<b\nc"), "a&lt;b<br>\nc");
    }

    #[test]
    fn urls_encode_segments() {
        assert_eq!(profile_url("author_post"), "/profile/author_post/");
        assert_eq!(profile_url("a@b"), "/profile/a%40b/");
        assert_eq!(group_url("test-slug"), "/group/test-slug/");
    }

    #[test]
    fn paginator_hidden_for_single_page() {
        let page: Paginated<()> = Paginated {
            items: vec![],
            total: 3,
            page: 1,
            per_page: 10,
        };
        let mut out = String::new();
        write_paginator(&page, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn paginator_links() {
        let page: Paginated<()> = Paginated {
            items: vec![],
            total: 13,
            page: 1,
            per_page: 10,
        };
        let mut out = String::new();
        write_paginator(&page, &mut out).unwrap();
        assert!(out.contains("?page=2"));
        assert!(out.contains("Page 1 of 2"));
        assert!(!out.contains("previous"));
    }
}
