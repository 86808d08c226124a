//! Text renditions of a todo for SMS and email.

use crate::types::TodoItem;

pub const EMAIL_SUBJECT: &str = "Todo Item";

const NO_DESCRIPTION: &str = "No description provided.";

fn yes_no(done: bool) -> &'static str {
    if done {
        "Yes"
    } else {
        "No"
    }
}

pub fn sms_body(todo: &TodoItem) -> String {
    let mut body = format!(
        "Title: {}\nDescription: {}\nCompleted: {}",
        todo.title,
        todo.description.as_deref().unwrap_or_default(),
        yes_no(todo.is_completed)
    );
    if let Some(uri) = &todo.image_uri {
        body.push_str("\nImage: ");
        body.push_str(uri);
    }
    body
}

pub fn email_body(todo: &TodoItem) -> String {
    format!(
        "Todo Item: {}\n\nDescription: {}\n\nCompleted: {}\n\nImage: {}\n",
        todo.title,
        todo.description.as_deref().unwrap_or_default(),
        yes_no(todo.is_completed),
        todo.image_uri.as_deref().unwrap_or_default()
    )
}

/// HTML card with title, description, status, creation date and image.
pub fn email_html(todo: &TodoItem) -> String {
    let status = if todo.is_completed {
        "Completed"
    } else {
        "Not Completed"
    };
    let description = todo
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION);
    let image = todo
        .image_uri
        .as_deref()
        .map(|uri| format!("\n  <img src=\"{}\" alt=\"Todo Image\">", escape_html(uri)))
        .unwrap_or_default();
    format!(
        "<div>\n  <h2>{}</h2>\n  <p>{}</p>\n  <p>Status: <strong>{status}</strong></p>\n  <p>Created At: <strong>{}</strong></p>{image}\n</div>\n",
        escape_html(&todo.title),
        escape_html(description),
        todo.created_at.format("%B %-d, %Y"),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    fn todo(image: Option<&str>) -> TodoItem {
        TodoItem {
            id: Uuid::nil(),
            title: "Buy <milk>".to_string(),
            description: Some("2 litres".to_string()),
            is_completed: true,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            image_uri: image.map(str::to_string),
            location: None,
        }
    }

    #[test]
    fn sms_body_without_image() {
        assert_eq!(
            sms_body(&todo(None)),
            "Title: Buy <milk>\nDescription: 2 litres\nCompleted: Yes"
        );
    }

    #[test]
    fn sms_body_appends_image() {
        let body = sms_body(&todo(Some("http://cdn/a.jpg")));
        assert!(body.ends_with("\nImage: http://cdn/a.jpg"));
    }

    #[test]
    fn email_body_lists_every_field() {
        let body = email_body(&todo(Some("http://cdn/a.jpg")));
        assert_eq!(
            body,
            "Todo Item: Buy <milk>\n\nDescription: 2 litres\n\nCompleted: Yes\n\nImage: http://cdn/a.jpg\n"
        );
    }

    #[test]
    fn email_html_escapes_and_formats_date() {
        let html = email_html(&todo(None));
        assert!(html.contains("<h2>Buy &lt;milk&gt;</h2>"));
        assert!(html.contains("Created At: <strong>May 1, 2024</strong>"));
        assert!(html.contains("Status: <strong>Completed</strong>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn email_html_defaults_description() {
        let mut t = todo(Some("http://cdn/a.jpg"));
        t.description = None;
        let html = email_html(&t);
        assert!(html.contains(NO_DESCRIPTION));
        assert!(html.contains("<img src=\"http://cdn/a.jpg\""));
    }
}
