use crate::escape::escape_html;

/// A page ready for the layout shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Document and heading title.
    pub title: String,
    /// Flash message lines from the previous request, if any.
    pub flash_lines: Vec<String>,
    /// Pre-rendered body markup.
    pub body: String,
}

/// Wraps rendered body markup in the layout shell with the flash block.
#[must_use]
pub fn render_page(page: &Page) -> String {
    let mut flash = String::new();
    if !page.flash_lines.is_empty() {
        flash.push_str("<div class=\"alert alert-warning\">\n");
        for line in &page.flash_lines {
            flash.push_str(&format!("<p>{}</p>\n", escape_html(line)));
        }
        flash.push_str("</div>\n");
    }

    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<div class=\"container\">\n\
         <h1>{title}</h1>\n{flash}{body}</div>\n</body>\n</html>\n",
        title = escape_html(&page.title),
        body = page.body,
    )
}
