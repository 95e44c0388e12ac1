use formloom_application::DetailModel;
use formloom_domain::{Cardinality, ResourceDefinition, scalar_to_string};
use serde_json::Value;

use crate::escape::escape_html;
use crate::table::render_table;

/// Renders a detail page: one labeled row per serialized field, with array
/// values expanded to one row per element, then the relationship tables —
/// single-cardinality ones inline, collections below under their own title.
#[must_use]
pub fn render_detail(definition: &ResourceDefinition, detail: &DetailModel) -> String {
    let mut markup = String::from("<h2>Details</h2>\n<table class=\"table\">\n");

    for (key, value) in detail.item.values() {
        if definition.relationship(key).is_some() {
            continue;
        }

        let label = definition
            .field(key)
            .map(|field| field.label().as_str().to_owned())
            .unwrap_or_else(|| key.clone());

        match value {
            Value::Array(elements) if elements.is_empty() => {
                markup.push_str(&format!(
                    "<tr>\n<th>{}</th>\n<td></td>\n</tr>\n",
                    escape_html(&label)
                ));
            }
            Value::Array(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    markup.push_str("<tr>\n");
                    if index == 0 {
                        markup.push_str(&format!(
                            "<th rowspan=\"{}\">{}</th>\n",
                            elements.len(),
                            escape_html(&label)
                        ));
                    }
                    markup.push_str(&format!("<td>{}</td>\n</tr>\n", render_value(element)));
                }
            }
            other => {
                markup.push_str(&format!(
                    "<tr>\n<th>{}</th>\n<td>{}</td>\n</tr>\n",
                    escape_html(&label),
                    render_value(other)
                ));
            }
        }
    }

    for relationship in &detail.relationships {
        if relationship.cardinality == Cardinality::One {
            markup.push_str(&format!(
                "<tr>\n<th>{}</th>\n<td>{}</td>\n</tr>\n",
                escape_html(&relationship.title),
                render_table(&relationship.table)
            ));
        }
    }

    markup.push_str("</table>\n");

    for relationship in &detail.relationships {
        if relationship.cardinality == Cardinality::Many {
            markup.push_str(&format!(
                "<h2>{}</h2>\n{}",
                escape_html(&relationship.title),
                render_table(&relationship.table)
            ));
        }
    }

    markup
}

fn render_value(value: &Value) -> String {
    match scalar_to_string(value) {
        Some(text) => escape_html(&text),
        None => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_default();
            format!("<pre>{}</pre>", escape_html(&pretty))
        }
    }
}

#[cfg(test)]
mod tests {
    use formloom_application::{DetailModel, RelationshipTable, TableModel};
    use formloom_domain::{
        Cardinality, CrudAction, FieldDescriptor, FieldType, RelationshipDescriptor,
        ResourceDefinition, ResourceItem,
    };
    use serde_json::json;

    use super::render_detail;

    fn definition() -> ResourceDefinition {
        let id = FieldDescriptor::new(
            "id",
            "id",
            "Id",
            None,
            FieldType::Text,
            false,
            Vec::new(),
            true,
            vec![CrudAction::Index, CrudAction::View],
        )
        .unwrap_or_else(|_| unreachable!());
        let tags = FieldDescriptor::new(
            "tags",
            "tags",
            "Tags",
            None,
            FieldType::Text,
            true,
            Vec::new(),
            false,
            vec![CrudAction::Create, CrudAction::Edit],
        )
        .unwrap_or_else(|_| unreachable!());
        let members = RelationshipDescriptor::new(
            "members",
            "members",
            "Members",
            Cardinality::Many,
            "people",
            true,
            vec![CrudAction::Create],
        )
        .unwrap_or_else(|_| unreachable!());
        ResourceDefinition::new("projects", "Project", "id", vec![id, tags], vec![members])
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn array_values_expand_with_a_rowspan_label() {
        let detail = DetailModel {
            item: ResourceItem::from_value(json!({ "id": "1", "tags": ["a", "b"] }))
                .unwrap_or_else(|_| unreachable!()),
            relationships: Vec::new(),
        };
        let markup = render_detail(&definition(), &detail);
        assert!(markup.contains("<th rowspan=\"2\">Tags</th>"));
        assert!(markup.contains("<td>a</td>"));
        assert!(markup.contains("<td>b</td>"));
    }

    #[test]
    fn relationship_values_are_skipped_in_the_field_table() {
        let detail = DetailModel {
            item: ResourceItem::from_value(
                json!({ "id": "1", "tags": [], "members": { "items": ["2"] } }),
            )
            .unwrap_or_else(|_| unreachable!()),
            relationships: vec![RelationshipTable {
                title: "Members".to_owned(),
                cardinality: Cardinality::Many,
                table: TableModel {
                    columns: Vec::new(),
                    rows: Vec::new(),
                    collection_actions: Vec::new(),
                },
            }],
        };
        let markup = render_detail(&definition(), &detail);
        assert!(!markup.contains("items"));
        assert!(markup.contains("<h2>Members</h2>"));
        assert!(markup.contains("<p>No content.</p>"));
    }
}
