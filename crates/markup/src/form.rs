use formloom_application::{FormView, SelectedLink};
use formloom_domain::Cardinality;

use crate::escape::escape_html;
use crate::field::render_field;

/// Renders a full create/edit form: plain field entries, linkable pickers,
/// the hidden linkable manifest, and the submit button.
#[must_use]
pub fn render_form(view: &FormView) -> String {
    let mut markup = format!(
        "<form method=\"post\" action=\"{}\">\n",
        escape_html(&view.action_url)
    );

    for entry in &view.model.entries {
        markup.push_str(&render_field(entry));
    }

    for linkable in &view.model.linkables {
        let relationship = &linkable.relationship;
        let name = relationship.display_name().as_str();

        markup.push_str("<div class=\"form-group\">\n");
        markup.push_str(&format!(
            "<label for=\"{}\">{}</label>\n",
            escape_html(name),
            escape_html(relationship.label().as_str())
        ));

        match relationship.cardinality() {
            Cardinality::One => {
                markup.push_str(&format!(
                    "<select class=\"form-control\" name=\"linkable[{name}][id]\">\n"
                ));
                // Single pickers lead with an empty option so the selection
                // can be cleared.
                markup.push_str(&format!(
                    "<option value=\"\"{}></option>\n",
                    if matches!(linkable.selected, SelectedLink::None) {
                        " selected"
                    } else {
                        ""
                    }
                ));
            }
            Cardinality::Many => {
                markup.push_str(&format!(
                    "<select class=\"form-control\" multiple \
                     name=\"linkable[{name}][][id]\">\n"
                ));
            }
        }

        for candidate in &linkable.candidates {
            markup.push_str(&format!(
                "<option value=\"{id}\"{selected}>{label}</option>\n",
                id = escape_html(&candidate.id),
                label = escape_html(&candidate.label),
                selected = if linkable.selected.contains(&candidate.id) {
                    " selected"
                } else {
                    ""
                }
            ));
        }

        markup.push_str("</select>\n</div>\n");
    }

    markup.push_str(&format!(
        "<input type=\"hidden\" name=\"linkableFields\" value=\"{}\">\n",
        escape_html(&view.model.linkable_manifest())
    ));

    let submit_label = {
        let verb = view.verb.as_str();
        let mut characters = verb.chars();
        characters
            .next()
            .map(|first| first.to_uppercase().collect::<String>() + characters.as_str())
            .unwrap_or_default()
    };
    markup.push_str(&format!(
        "<div class=\"form-group\">\n\
         <input type=\"submit\" class=\"btn btn-primary\" value=\"{submit_label}\">\n\
         </div>\n</form>\n"
    ));

    markup
}

#[cfg(test)]
mod tests {
    use formloom_application::{
        FormFieldEntry, FormModel, FormVerb, FormView, LinkCandidate, LinkableEntry, SelectedLink,
    };
    use formloom_domain::{
        Cardinality, CrudAction, FieldDescriptor, FieldType, RelationshipDescriptor,
    };

    use super::render_form;

    fn title_entry() -> FormFieldEntry {
        FormFieldEntry {
            field: FieldDescriptor::new(
                "title",
                "title",
                "Title",
                None,
                FieldType::Text,
                false,
                Vec::new(),
                false,
                vec![CrudAction::Create],
            )
            .unwrap_or_else(|_| unreachable!()),
            index: 0,
            old_value: None,
            show_label: true,
        }
    }

    fn linkable(cardinality: Cardinality, selected: SelectedLink) -> LinkableEntry {
        LinkableEntry {
            relationship: RelationshipDescriptor::new(
                "members",
                "members",
                "Members",
                cardinality,
                "people",
                true,
                vec![CrudAction::Create],
            )
            .unwrap_or_else(|_| unreachable!()),
            candidates: vec![
                LinkCandidate {
                    id: "1".to_owned(),
                    label: "Ada".to_owned(),
                },
                LinkCandidate {
                    id: "2".to_owned(),
                    label: "Grace".to_owned(),
                },
            ],
            selected,
        }
    }

    fn view(linkables: Vec<LinkableEntry>) -> FormView {
        FormView {
            model: FormModel {
                action: CrudAction::Create,
                entries: vec![title_entry()],
                linkables,
            },
            action_url: "/projects".to_owned(),
            verb: FormVerb::Post,
        }
    }

    #[test]
    fn multi_select_uses_push_naming_and_multiple() {
        let markup = render_form(&view(vec![linkable(
            Cardinality::Many,
            SelectedLink::Many(vec!["2".to_owned()]),
        )]));
        assert!(markup.contains("name=\"linkable[members][][id]\""));
        assert!(markup.contains("multiple"));
        assert!(markup.contains("<option value=\"2\" selected>Grace</option>"));
        assert!(markup.contains("name=\"linkableFields\" value=\"members\""));
    }

    #[test]
    fn single_select_leads_with_empty_option() {
        let markup = render_form(&view(vec![linkable(Cardinality::One, SelectedLink::None)]));
        assert!(markup.contains("name=\"linkable[members][id]\""));
        assert!(markup.contains("<option value=\"\" selected></option>"));
    }

    #[test]
    fn submit_label_matches_the_verb() {
        let markup = render_form(&view(Vec::new()));
        assert!(markup.contains("value=\"Post\""));
        assert!(markup.contains("action=\"/projects\""));
    }
}
