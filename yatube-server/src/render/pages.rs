//! Page contexts

use std::fmt::{self, Write};

use axum::http::StatusCode;

use super::{escape, linebreaks, profile_url, write_paginator, write_post_card, Chrome, Page};
use crate::db::{Group, Post};
use crate::models::{truncate_display, FormErrors, Paginated, PostForm};

fn write_field_errors(errors: &FormErrors, field: &str, out: &mut String) -> fmt::Result {
    for err in errors.for_field(field) {
        writeln!(out, "<p class=\"error\">{}</p>", escape(&err.to_string()))?;
    }
    Ok(())
}

/// Site-wide feed
pub struct IndexPage {
    pub chrome: Chrome,
    pub page_obj: Paginated<Post>,
}

impl Page for IndexPage {
    fn title(&self) -> String {
        "Latest posts".to_owned()
    }

    fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "<h1>Latest posts</h1>")?;
        for post in &self.page_obj.items {
            write_post_card(post, true, out)?;
        }
        write_paginator(&self.page_obj, out)
    }
}

/// Posts of one group
pub struct GroupPage {
    pub chrome: Chrome,
    pub group: Group,
    pub page_obj: Paginated<Post>,
}

impl Page for GroupPage {
    fn title(&self) -> String {
        format!("Group posts {}", self.group)
    }

    fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "<h1>{}</h1>", escape(&self.group.title))?;
        writeln!(out, "<p class=\"description\">{}</p>", linebreaks(&self.group.description))?;
        for post in &self.page_obj.items {
            write_post_card(post, false, out)?;
        }
        write_paginator(&self.page_obj, out)
    }
}

/// Posts of one author
pub struct ProfilePage {
    pub chrome: Chrome,
    pub user_name: String,
    pub page_obj: Paginated<Post>,
}

impl Page for ProfilePage {
    fn title(&self) -> String {
        format!("Profile of {}", self.user_name)
    }

    fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "<h1>All posts of {}</h1>", escape(&self.user_name))?;
        writeln!(out, "<h3>Total posts: {}</h3>", self.page_obj.total)?;
        for post in &self.page_obj.items {
            write_post_card(post, true, out)?;
        }
        write_paginator(&self.page_obj, out)
    }
}

/// A single post
pub struct PostDetailPage {
    pub chrome: Chrome,
    pub post: Post,
    /// Number of posts by the same author
    pub author_posts: i64,
    /// The viewer wrote this post
    pub can_edit: bool,
}

impl Page for PostDetailPage {
    fn title(&self) -> String {
        format!("Post {}", self.post)
    }

    fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        let post = &self.post;
        writeln!(out, "<aside>")?;
        writeln!(
            out,
            "<p>Published: <time datetime=\"{}\">{}</time></p>",
            post.pub_date.to_rfc3339(),
            post.pub_date.format("%d %b %Y")
        )?;
        if let Some(group) = &post.group {
            writeln!(
                out,
                "<p>Group: <a href=\"{}\">{}</a></p>",
                escape(&super::group_url(&group.slug)),
                escape(truncate_display(&group.title))
            )?;
        }
        writeln!(
            out,
            "<p>Author: <a href=\"{}\">{}</a></p>",
            escape(&profile_url(&post.author)),
            escape(&post.author)
        )?;
        writeln!(out, "<p>Posts by this author: {}</p>", self.author_posts)?;
        writeln!(out, "</aside>")?;
        writeln!(out, "<article class=\"post-detail\">")?;
        writeln!(out, "<p>{}</p>", linebreaks(&post.text))?;
        if self.can_edit {
            writeln!(out, "<a href=\"/posts/{}/edit/\">edit post</a>", post.id)?;
        }
        writeln!(out, "</article>")
    }
}

/// Create or edit form
pub struct PostFormPage {
    pub chrome: Chrome,
    pub form: PostForm,
    pub errors: FormErrors,
    pub groups: Vec<Group>,
    /// Editing an existing post rather than creating one
    pub is_edit: bool,
    pub post_id: Option<i64>,
}

impl Page for PostFormPage {
    fn title(&self) -> String {
        if self.is_edit {
            "Edit post".to_owned()
        } else {
            "New post".to_owned()
        }
    }

    fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "<h1>{}</h1>", self.title())?;
        writeln!(out, "<form method=\"post\">")?;

        writeln!(out, "<label for=\"id_text\">Text</label>")?;
        write_field_errors(&self.errors, "text", out)?;
        writeln!(
            out,
            "<textarea name=\"text\" cols=\"40\" rows=\"10\" class=\"form-control\" required id=\"id_text\">{}</textarea>",
            escape(&self.form.text)
        )?;

        writeln!(out, "<label for=\"id_group\">Group</label>")?;
        write_field_errors(&self.errors, "group", out)?;
        writeln!(out, "<select name=\"group\" class=\"form-control\" id=\"id_group\">")?;
        let selected = self.form.group.as_deref().unwrap_or("");
        writeln!(
            out,
            "<option value=\"\"{}>---------</option>",
            if selected.is_empty() { " selected" } else { "" }
        )?;
        for group in &self.groups {
            let value = group.id.to_string();
            writeln!(
                out,
                "<option value=\"{}\"{}>{}</option>",
                value,
                if value == selected { " selected" } else { "" },
                escape(&group.to_string())
            )?;
        }
        writeln!(out, "</select>")?;

        writeln!(
            out,
            "<button type=\"submit\">{}</button>",
            if self.is_edit { "Save" } else { "Add" }
        )?;
        writeln!(out, "</form>")?;
        if let Some(id) = self.post_id {
            writeln!(out, "<a href=\"/posts/{id}/\">back to post</a>")?;
        }
        Ok(())
    }
}

/// Sign-in form
pub struct LoginPage {
    pub chrome: Chrome,
    pub username: String,
    pub next: Option<String>,
    pub error: Option<String>,
}

impl Page for LoginPage {
    fn title(&self) -> String {
        "Log in".to_owned()
    }

    fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "<h1>Log in</h1>")?;
        if let Some(error) = &self.error {
            writeln!(out, "<p class=\"error\">{}</p>", escape(error))?;
        }
        writeln!(out, "<form method=\"post\" action=\"/auth/login/\">")?;
        if let Some(next) = &self.next {
            writeln!(out, "<input type=\"hidden\" name=\"next\" value=\"{}\">", escape(next))?;
        }
        writeln!(
            out,
            "<input type=\"text\" name=\"username\" id=\"id_username\" value=\"{}\" required>",
            escape(&self.username)
        )?;
        writeln!(out, "<input type=\"password\" name=\"password\" id=\"id_password\" required>")?;
        writeln!(out, "<button type=\"submit\">Log in</button>")?;
        writeln!(out, "</form>")
    }
}

/// Registration form
pub struct SignupPage {
    pub chrome: Chrome,
    pub username: String,
    pub errors: FormErrors,
}

impl Page for SignupPage {
    fn title(&self) -> String {
        "Sign up".to_owned()
    }

    fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "<h1>Sign up</h1>")?;
        writeln!(out, "<form method=\"post\" action=\"/auth/signup/\">")?;
        write_field_errors(&self.errors, "username", out)?;
        writeln!(
            out,
            "<input type=\"text\" name=\"username\" id=\"id_username\" value=\"{}\" required>",
            escape(&self.username)
        )?;
        write_field_errors(&self.errors, "password", out)?;
        writeln!(out, "<input type=\"password\" name=\"password1\" id=\"id_password1\" required>")?;
        write_field_errors(&self.errors, "password confirmation", out)?;
        writeln!(out, "<input type=\"password\" name=\"password2\" id=\"id_password2\" required>")?;
        writeln!(out, "<button type=\"submit\">Sign up</button>")?;
        writeln!(out, "</form>")
    }
}

/// Error page for 4xx/5xx responses
pub struct ErrorPage {
    pub chrome: Chrome,
    pub status: StatusCode,
    pub message: String,
}

impl Page for ErrorPage {
    fn title(&self) -> String {
        format!(
            "{} {}",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Error")
        )
    }

    fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    fn write_body(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "<h1>{}</h1>", escape(&self.title()))?;
        writeln!(out, "<p>{}</p>", escape(&self.message))?;
        writeln!(out, "<a href=\"/\">Back to the main page</a>")
    }
}
