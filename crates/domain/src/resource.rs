use std::collections::HashSet;
use std::str::FromStr;

use formloom_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// CRUD actions a resource frontend can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudAction {
    /// List the resource collection.
    Index,
    /// Create a new item.
    Create,
    /// Show a single item.
    View,
    /// Edit an existing item.
    Edit,
    /// Remove an item.
    Destroy,
}

impl CrudAction {
    /// Returns a stable storage value for the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Create => "create",
            Self::View => "view",
            Self::Edit => "edit",
            Self::Destroy => "destroy",
        }
    }
}

impl FromStr for CrudAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "index" => Ok(Self::Index),
            "create" => Ok(Self::Create),
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            "destroy" => Ok(Self::Destroy),
            _ => Err(AppError::Validation(format!("unknown action '{value}'"))),
        }
    }
}

/// Supported form field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// Free text field.
    Text,
    /// Boolean checkbox field.
    Boolean,
    /// Combined date and time field.
    DateTime,
    /// Rich text field edited in a larger text area.
    Html,
}

impl FieldType {
    /// Returns the type tag round-tripped through hidden form inputs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::DateTime => "dateTime",
            Self::Html => "html",
        }
    }

    /// Parses a submitted type tag, falling back to free text.
    ///
    /// The tag travels through a hidden input, so a tampered or unknown value
    /// must degrade instead of failing the whole submission.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        Self::from_str(value).unwrap_or(Self::Text)
    }
}

impl FromStr for FieldType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "boolean" => Ok(Self::Boolean),
            "dateTime" => Ok(Self::DateTime),
            "html" => Ok(Self::Html),
            _ => Err(AppError::Validation(format!(
                "unknown field type '{value}'"
            ))),
        }
    }
}

/// Whether a relationship holds one related item or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// A single related item.
    One,
    /// A collection of related items.
    Many,
}

/// Metadata for a single plain (non-relationship) field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: NonEmptyString,
    display_name: NonEmptyString,
    label: NonEmptyString,
    description: Option<String>,
    field_type: FieldType,
    is_array: bool,
    allowed_values: Vec<String>,
    is_identifier: bool,
    actions: Vec<CrudAction>,
}

impl FieldDescriptor {
    /// Creates a validated field descriptor.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        label: impl Into<String>,
        description: Option<String>,
        field_type: FieldType,
        is_array: bool,
        allowed_values: Vec<String>,
        is_identifier: bool,
        actions: Vec<CrudAction>,
    ) -> AppResult<Self> {
        if !allowed_values.is_empty()
            && matches!(field_type, FieldType::Boolean | FieldType::DateTime)
        {
            return Err(AppError::Validation(format!(
                "field type '{}' cannot enumerate allowed values",
                field_type.as_str()
            )));
        }

        if is_identifier && is_array {
            return Err(AppError::Validation(
                "identifier fields cannot be multi-valued".to_owned(),
            ));
        }

        Ok(Self {
            name: NonEmptyString::new(name)?,
            display_name: NonEmptyString::new(display_name)?,
            label: NonEmptyString::new(label)?,
            description: description.and_then(|value| {
                let trimmed = value.trim().to_owned();
                (!trimmed.is_empty()).then_some(trimmed)
            }),
            field_type,
            is_array,
            allowed_values,
            is_identifier,
            actions,
        })
    }

    /// Returns the machine name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the display name used as the submission key.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the human label.
    #[must_use]
    pub fn label(&self) -> &NonEmptyString {
        &self.label
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns whether the field holds an ordered sequence of values.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Returns the enumerated allowed values, empty for free input.
    #[must_use]
    pub fn allowed_values(&self) -> &[String] {
        &self.allowed_values
    }

    /// Returns whether the field identifies the item.
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.is_identifier
    }

    /// Returns whether the field participates in the given action.
    #[must_use]
    pub fn applies_to(&self, action: CrudAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Metadata for a relationship field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDescriptor {
    name: NonEmptyString,
    display_name: NonEmptyString,
    label: NonEmptyString,
    cardinality: Cardinality,
    related_resource: NonEmptyString,
    linkable: bool,
    actions: Vec<CrudAction>,
}

impl RelationshipDescriptor {
    /// Creates a validated relationship descriptor.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        label: impl Into<String>,
        cardinality: Cardinality,
        related_resource: impl Into<String>,
        linkable: bool,
        actions: Vec<CrudAction>,
    ) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            display_name: NonEmptyString::new(display_name)?,
            label: NonEmptyString::new(label)?,
            cardinality,
            related_resource: NonEmptyString::new(related_resource)?,
            linkable,
            actions,
        })
    }

    /// Returns the machine name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the display name used as the submission key.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the human label.
    #[must_use]
    pub fn label(&self) -> &NonEmptyString {
        &self.label
    }

    /// Returns the relationship cardinality.
    #[must_use]
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Returns the related resource name.
    #[must_use]
    pub fn related_resource(&self) -> &NonEmptyString {
        &self.related_resource
    }

    /// Returns whether existing related items can be linked from a form.
    #[must_use]
    pub fn is_linkable(&self) -> bool {
        self.linkable
    }

    /// Returns whether the relationship participates in the given action.
    #[must_use]
    pub fn applies_to(&self, action: CrudAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Metadata describing one exposed resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    name: NonEmptyString,
    entity_name: NonEmptyString,
    label_field: NonEmptyString,
    fields: Vec<FieldDescriptor>,
    relationships: Vec<RelationshipDescriptor>,
}

impl ResourceDefinition {
    /// Creates a validated resource definition.
    ///
    /// At least one identifier field is required, display names must be unique
    /// across fields and relationships, and `label_field` must name the field
    /// supplying display labels when the resource is offered as a link target.
    pub fn new(
        name: impl Into<String>,
        entity_name: impl Into<String>,
        label_field: impl Into<String>,
        fields: Vec<FieldDescriptor>,
        relationships: Vec<RelationshipDescriptor>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        let entity_name = NonEmptyString::new(entity_name)?;
        let label_field = NonEmptyString::new(label_field)?;

        if !fields.iter().any(FieldDescriptor::is_identifier) {
            return Err(AppError::Validation(format!(
                "resource '{}' declares no identifier field",
                name.as_str()
            )));
        }

        let mut seen = HashSet::new();
        for display_name in fields
            .iter()
            .map(|field| field.display_name().as_str())
            .chain(
                relationships
                    .iter()
                    .map(|relationship| relationship.display_name().as_str()),
            )
        {
            if !seen.insert(display_name.to_owned()) {
                return Err(AppError::Validation(format!(
                    "duplicate field display name '{display_name}' in resource '{}'",
                    name.as_str()
                )));
            }
        }

        if !fields
            .iter()
            .any(|field| field.display_name().as_str() == label_field.as_str())
        {
            return Err(AppError::Validation(format!(
                "label field '{}' does not exist on resource '{}'",
                label_field.as_str(),
                name.as_str()
            )));
        }

        Ok(Self {
            name,
            entity_name,
            label_field,
            fields,
            relationships,
        })
    }

    /// Returns the resource (route) name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the human entity name used in messages.
    #[must_use]
    pub fn entity_name(&self) -> &NonEmptyString {
        &self.entity_name
    }

    /// Returns the display name of the field supplying link labels.
    #[must_use]
    pub fn label_field(&self) -> &NonEmptyString {
        &self.label_field
    }

    /// Returns all plain fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns all relationship fields in declaration order.
    #[must_use]
    pub fn relationships(&self) -> &[RelationshipDescriptor] {
        &self.relationships
    }

    /// Returns the first declared identifier field.
    #[must_use]
    pub fn primary_identifier(&self) -> &FieldDescriptor {
        // Constructor guarantees at least one identifier.
        self.fields
            .iter()
            .find(|field| field.is_identifier())
            .unwrap_or(&self.fields[0])
    }

    /// Returns all identifier fields in declaration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| field.is_identifier())
    }

    /// Returns a plain field by display name.
    #[must_use]
    pub fn field(&self, display_name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.display_name().as_str() == display_name)
    }

    /// Returns a relationship by display name.
    #[must_use]
    pub fn relationship(&self, display_name: &str) -> Option<&RelationshipDescriptor> {
        self.relationships
            .iter()
            .find(|relationship| relationship.display_name().as_str() == display_name)
    }

    /// Returns the non-identifier fields that participate in a form action.
    pub fn form_fields(&self, action: CrudAction) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(move |field| !field.is_identifier() && field.applies_to(action))
    }

    /// Returns relationships editable as existing-item pickers for an action.
    pub fn linkable_relationships(
        &self,
        action: CrudAction,
    ) -> impl Iterator<Item = &RelationshipDescriptor> {
        self.relationships
            .iter()
            .filter(move |relationship| relationship.is_linkable() && relationship.applies_to(action))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Cardinality, CrudAction, FieldDescriptor, FieldType, RelationshipDescriptor,
        ResourceDefinition,
    };

    fn id_field() -> FieldDescriptor {
        FieldDescriptor::new(
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
        .unwrap_or_else(|_| unreachable!())
    }

    fn title_field() -> FieldDescriptor {
        FieldDescriptor::new(
            "title",
            "title",
            "Title",
            None,
            FieldType::Text,
            false,
            Vec::new(),
            false,
            vec![CrudAction::Create, CrudAction::Edit],
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn boolean_fields_reject_allowed_values() {
        let result = FieldDescriptor::new(
            "done",
            "done",
            "Done",
            None,
            FieldType::Boolean,
            false,
            vec!["yes".to_owned()],
            false,
            vec![CrudAction::Create],
        );
        assert!(result.is_err());
    }

    #[test]
    fn definition_requires_an_identifier() {
        let result =
            ResourceDefinition::new("projects", "Project", "title", vec![title_field()], Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn definition_rejects_duplicate_display_names() {
        let result = ResourceDefinition::new(
            "projects",
            "Project",
            "title",
            vec![id_field(), title_field(), title_field()],
            Vec::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn definition_requires_existing_label_field() {
        let result = ResourceDefinition::new(
            "projects",
            "Project",
            "name",
            vec![id_field(), title_field()],
            Vec::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn form_fields_exclude_identifiers_and_respect_actions() {
        let definition = ResourceDefinition::new(
            "projects",
            "Project",
            "title",
            vec![id_field(), title_field()],
            Vec::new(),
        )
        .unwrap_or_else(|_| unreachable!());

        let create_fields: Vec<&str> = definition
            .form_fields(CrudAction::Create)
            .map(|field| field.display_name().as_str())
            .collect();
        assert_eq!(create_fields, vec!["title"]);
        assert_eq!(definition.form_fields(CrudAction::Index).count(), 0);
    }

    #[test]
    fn linkable_relationships_filter_by_action() {
        let relationship = RelationshipDescriptor::new(
            "owner",
            "owner",
            "Owner",
            Cardinality::One,
            "people",
            true,
            vec![CrudAction::Create],
        )
        .unwrap_or_else(|_| unreachable!());
        let definition = ResourceDefinition::new(
            "projects",
            "Project",
            "title",
            vec![id_field(), title_field()],
            vec![relationship],
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(definition.linkable_relationships(CrudAction::Create).count(), 1);
        assert_eq!(definition.linkable_relationships(CrudAction::Edit).count(), 0);
    }
}
