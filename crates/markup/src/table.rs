use formloom_application::TableModel;
use formloom_domain::scalar_to_string;
use serde_json::Value;

use crate::escape::escape_html;

/// Renders an index table: column headers from the first row's field order,
/// one action cell per row, and the collection actions below.
///
/// An empty collection renders a placeholder paragraph; with zero rows there
/// are no columns to guess headers from.
#[must_use]
pub fn render_table(table: &TableModel) -> String {
    let mut markup = String::new();

    if table.is_empty() {
        markup.push_str("<p>No content.</p>\n");
    } else {
        markup.push_str("<table class=\"table\">\n<tr>\n");
        for column in &table.columns {
            markup.push_str(&format!("<th>{}</th>\n", escape_html(column)));
        }
        markup.push_str("</tr>\n");

        for row in &table.rows {
            markup.push_str("<tr>\n");
            for cell in &row.cells {
                markup.push_str(&format!("<td>{}</td>\n", render_cell(cell)));
            }

            markup.push_str("<td>\n");
            for action in &row.actions {
                markup.push_str(&format!(
                    "<a href=\"{}\">{}</a>\n",
                    escape_html(&action.href),
                    escape_html(&action.label)
                ));
            }
            markup.push_str("</td>\n</tr>\n");
        }

        markup.push_str("</table>\n");
    }

    for action in &table.collection_actions {
        markup.push_str(&format!(
            "<a class=\"btn btn-primary\" href=\"{}\">{}</a>\n",
            escape_html(&action.href),
            escape_html(&action.label)
        ));
    }

    markup
}

/// A nested serialized value is a relationship; the flat table renders a
/// fixed placeholder instead of attempting structural rendering.
fn render_cell(value: &Value) -> String {
    match scalar_to_string(value) {
        Some(text) => escape_html(&text),
        None => "relationship?".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use formloom_application::{ActionLink, TableModel, TableRow};
    use serde_json::json;

    use super::render_table;

    #[test]
    fn empty_collection_renders_placeholder_not_headers() {
        let markup = render_table(&TableModel {
            columns: Vec::new(),
            rows: Vec::new(),
            collection_actions: Vec::new(),
        });
        assert!(markup.contains("<p>No content.</p>"));
        assert!(!markup.contains("<table"));
    }

    #[test]
    fn nested_values_render_the_placeholder() {
        let markup = render_table(&TableModel {
            columns: vec!["id".to_owned(), "owner".to_owned()],
            rows: vec![TableRow {
                cells: vec![json!("1"), json!({ "id": "2" })],
                actions: Vec::new(),
            }],
            collection_actions: Vec::new(),
        });
        assert!(markup.contains("<td>1</td>"));
        assert!(markup.contains("<td>relationship?</td>"));
    }

    #[test]
    fn row_and_collection_actions_render_as_links() {
        let markup = render_table(&TableModel {
            columns: vec!["id".to_owned()],
            rows: vec![TableRow {
                cells: vec![json!("1")],
                actions: vec![ActionLink {
                    label: "Edit".to_owned(),
                    href: "/projects/1/edit?return=%2Fprojects".to_owned(),
                }],
            }],
            collection_actions: vec![ActionLink {
                label: "Create Project".to_owned(),
                href: "/projects/create".to_owned(),
            }],
        });
        assert!(markup.contains("<a href=\"/projects/1/edit?return=%2Fprojects\">Edit</a>"));
        assert!(markup.contains("class=\"btn btn-primary\" href=\"/projects/create\""));
    }
}
