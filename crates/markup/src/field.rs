use formloom_application::{FormFieldEntry, is_truthy_value, split_date_time};
use formloom_domain::{FieldType, scalar_to_string};

use crate::escape::escape_html;

/// Renders one form field entry: the hidden `type`/`multiple` companions plus
/// the widget matching the field type.
#[must_use]
pub fn render_field(entry: &FormFieldEntry) -> String {
    let field = &entry.field;
    let name = field.display_name().as_str();
    let index = entry.index;

    let mut markup = String::new();
    markup.push_str(&format!(
        "<input type=\"hidden\" name=\"fields[{name}][type]\" value=\"{}\">\n",
        field.field_type().as_str()
    ));
    markup.push_str(&format!(
        "<input type=\"hidden\" name=\"fields[{name}][multiple]\" value=\"{}\">\n",
        u8::from(field.is_array())
    ));

    let old_text = entry
        .old_value
        .as_ref()
        .and_then(scalar_to_string)
        .unwrap_or_default();
    let label = if entry.show_label {
        format!(
            "<label for=\"{}\">{}</label>\n",
            escape_html(name),
            escape_html(field.label().as_str())
        )
    } else {
        String::new()
    };

    match field.field_type() {
        FieldType::DateTime => {
            // An absent or unparseable stored value renders both inputs empty.
            let (date, time) = entry
                .old_value
                .as_ref()
                .and_then(scalar_to_string)
                .and_then(|value| split_date_time(&value))
                .unwrap_or_default();

            markup.push_str("<div class=\"form-group row\">\n");
            markup.push_str(&label);
            markup.push_str(&format!(
                "<input type=\"date\" class=\"form-control\" \
                 name=\"fields[{name}][input][{index}][date]\" value=\"{}\">\n",
                escape_html(&date)
            ));
            markup.push_str(&format!(
                "<input type=\"time\" class=\"form-control\" \
                 name=\"fields[{name}][input][{index}][time]\" value=\"{}\">\n",
                escape_html(&time)
            ));
            markup.push_str("</div>\n");
        }
        FieldType::Boolean => {
            let checked = entry
                .old_value
                .as_ref()
                .is_some_and(is_truthy_value);

            markup.push_str("<div class=\"form-check\">\n");
            markup.push_str(&format!(
                "<input type=\"checkbox\" \
                 name=\"fields[{name}][input][{index}][value]\" value=\"1\"{}>\n",
                if checked { " checked" } else { "" }
            ));
            markup.push_str(&label);
            markup.push_str("</div>\n");
        }
        FieldType::Text | FieldType::Html if !field.allowed_values().is_empty() => {
            markup.push_str("<div class=\"form-group row\">\n");
            markup.push_str(&label);
            markup.push_str(&format!(
                "<select class=\"form-control\" name=\"fields[{name}][input][{index}][value]\">\n"
            ));
            for allowed in field.allowed_values() {
                markup.push_str(&format!(
                    "<option value=\"{value}\"{selected}>{value}</option>\n",
                    value = escape_html(allowed),
                    selected = if allowed == &old_text { " selected" } else { "" }
                ));
            }
            markup.push_str("</select>\n</div>\n");
        }
        FieldType::Html => {
            markup.push_str("<div class=\"form-group row\">\n");
            markup.push_str(&label);
            markup.push_str(&format!(
                "<textarea class=\"form-control\" rows=\"5\" \
                 name=\"fields[{name}][input][{index}][value]\">{}</textarea>\n",
                escape_html(&old_text)
            ));
            markup.push_str("</div>\n");
        }
        FieldType::Text => {
            markup.push_str("<div class=\"form-group row\">\n");
            markup.push_str(&label);
            markup.push_str(&format!(
                "<textarea class=\"form-control\" rows=\"1\" \
                 name=\"fields[{name}][input][{index}][value]\">{}</textarea>\n",
                escape_html(&old_text)
            ));
            markup.push_str("</div>\n");
        }
    }

    markup
}

#[cfg(test)]
mod tests {
    use formloom_application::FormFieldEntry;
    use formloom_domain::{CrudAction, FieldDescriptor, FieldType};
    use serde_json::json;

    use super::render_field;

    fn field(field_type: FieldType, allowed: Vec<String>) -> FieldDescriptor {
        FieldDescriptor::new(
            "sample",
            "sample",
            "Sample",
            None,
            field_type,
            false,
            allowed,
            false,
            vec![CrudAction::Create, CrudAction::Edit],
        )
        .unwrap_or_else(|_| unreachable!())
    }

    fn entry(field_type: FieldType, old_value: Option<serde_json::Value>) -> FormFieldEntry {
        FormFieldEntry {
            field: field(field_type, Vec::new()),
            index: 0,
            old_value,
            show_label: true,
        }
    }

    #[test]
    fn every_field_carries_hidden_companions() {
        let markup = render_field(&entry(FieldType::Text, None));
        assert!(markup.contains("name=\"fields[sample][type]\" value=\"text\""));
        assert!(markup.contains("name=\"fields[sample][multiple]\" value=\"0\""));
    }

    #[test]
    fn date_time_splits_stored_value_into_paired_inputs() {
        let markup = render_field(&entry(
            FieldType::DateTime,
            Some(json!("Tue, 02 Jan 24 15:04:00 +0000")),
        ));
        assert!(markup.contains("name=\"fields[sample][input][0][date]\" value=\"2024-01-02\""));
        assert!(markup.contains("name=\"fields[sample][input][0][time]\" value=\"15:04\""));
    }

    #[test]
    fn unparseable_date_time_renders_empty_inputs() {
        let markup = render_field(&entry(FieldType::DateTime, Some(json!("garbage"))));
        assert!(markup.contains("[date]\" value=\"\""));
        assert!(markup.contains("[time]\" value=\"\""));
    }

    #[test]
    fn truthy_old_value_checks_the_checkbox() {
        let checked = render_field(&entry(FieldType::Boolean, Some(json!(true))));
        assert!(checked.contains(" checked"));

        let unchecked = render_field(&entry(FieldType::Boolean, Some(json!(false))));
        assert!(!unchecked.contains(" checked"));
    }

    #[test]
    fn allowed_values_render_as_select_with_preselection() {
        let descriptor = field(
            FieldType::Text,
            vec!["draft".to_owned(), "live".to_owned()],
        );
        let markup = render_field(&FormFieldEntry {
            field: descriptor,
            index: 0,
            old_value: Some(json!("live")),
            show_label: true,
        });
        assert!(markup.contains("<select"));
        assert!(markup.contains("<option value=\"live\" selected>"));
        assert!(markup.contains("<option value=\"draft\">"));
    }

    #[test]
    fn html_fields_render_a_taller_textarea() {
        let markup = render_field(&entry(FieldType::Html, Some(json!("<b>body</b>"))));
        assert!(markup.contains("rows=\"5\""));
        assert!(markup.contains("&lt;b&gt;body&lt;/b&gt;"));
    }

    #[test]
    fn labels_render_only_when_requested() {
        let mut unlabeled = entry(FieldType::Text, None);
        unlabeled.show_label = false;
        unlabeled.index = 1;
        let markup = render_field(&unlabeled);
        assert!(!markup.contains("<label"));
        assert!(markup.contains("[input][1][value]"));
    }
}
