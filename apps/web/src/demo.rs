//! Demo resource definitions and seed data for the example wiring.

use std::sync::Arc;

use formloom_application::ResourceGateway;
use formloom_core::{AppResult, Subject};
use formloom_domain::{
    Cardinality, CrudAction, FieldDescriptor, FieldType, RelationshipDescriptor,
    ResourceDefinition, SubmissionPayload,
};
use formloom_infrastructure::InMemoryResourceGateway;
use serde_json::json;

fn form_actions() -> Vec<CrudAction> {
    vec![CrudAction::Create, CrudAction::Edit]
}

pub fn people_definition() -> AppResult<ResourceDefinition> {
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
    )?;
    let name = FieldDescriptor::new(
        "name",
        "name",
        "Name",
        None,
        FieldType::Text,
        false,
        Vec::new(),
        false,
        form_actions(),
    )?;
    let bio = FieldDescriptor::new(
        "bio",
        "bio",
        "Bio",
        Some("Short public biography".to_owned()),
        FieldType::Html,
        false,
        Vec::new(),
        false,
        form_actions(),
    )?;
    let subscribed = FieldDescriptor::new(
        "subscribed",
        "subscribed",
        "Subscribed",
        None,
        FieldType::Boolean,
        false,
        Vec::new(),
        false,
        form_actions(),
    )?;
    let joined_at = FieldDescriptor::new(
        "joined_at",
        "joined_at",
        "Joined at",
        None,
        FieldType::DateTime,
        false,
        Vec::new(),
        false,
        form_actions(),
    )?;

    ResourceDefinition::new(
        "people",
        "Person",
        "name",
        vec![id, name, bio, subscribed, joined_at],
        Vec::new(),
    )
}

pub fn projects_definition() -> AppResult<ResourceDefinition> {
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
    )?;
    let title = FieldDescriptor::new(
        "title",
        "title",
        "Title",
        None,
        FieldType::Text,
        false,
        Vec::new(),
        false,
        form_actions(),
    )?;
    let status = FieldDescriptor::new(
        "status",
        "status",
        "Status",
        None,
        FieldType::Text,
        false,
        vec!["draft".to_owned(), "live".to_owned(), "archived".to_owned()],
        false,
        form_actions(),
    )?;
    let starts_at = FieldDescriptor::new(
        "starts_at",
        "starts_at",
        "Starts at",
        None,
        FieldType::DateTime,
        false,
        Vec::new(),
        false,
        form_actions(),
    )?;
    let tags = FieldDescriptor::new(
        "tags",
        "tags",
        "Tags",
        None,
        FieldType::Text,
        true,
        Vec::new(),
        false,
        form_actions(),
    )?;
    let owner = RelationshipDescriptor::new(
        "owner",
        "owner",
        "Owner",
        Cardinality::One,
        "people",
        true,
        form_actions(),
    )?;
    let members = RelationshipDescriptor::new(
        "members",
        "members",
        "Members",
        Cardinality::Many,
        "people",
        true,
        form_actions(),
    )?;

    ResourceDefinition::new(
        "projects",
        "Project",
        "title",
        vec![id, title, status, starts_at, tags],
        vec![owner, members],
    )
}

/// Seeds a couple of records so the demo starts with content.
pub async fn seed(
    people: &Arc<InMemoryResourceGateway>,
    projects: &Arc<InMemoryResourceGateway>,
) -> AppResult<()> {
    let subject = Subject::new("seed", "Seeder");

    let mut ada = SubmissionPayload::new();
    ada.insert("name", json!("Ada"));
    ada.insert("bio", json!("Wrote the first program."));
    ada.insert("subscribed", json!(true));
    let ada = match people.store(&subject, ada).await {
        Ok(item) => item,
        Err(_) => return Ok(()),
    };

    let mut grace = SubmissionPayload::new();
    grace.insert("name", json!("Grace"));
    grace.insert("subscribed", json!(false));
    let _ = people.store(&subject, grace).await;

    let ada_id = ada.primary_identifier(people.definition())?;
    let mut loom = SubmissionPayload::new();
    loom.insert("title", json!("Loom"));
    loom.insert("status", json!("draft"));
    loom.insert("tags", json!(["metadata", "forms"]));
    loom.insert("owner", json!({ "id": ada_id.clone() }));
    loom.insert("members", json!({ "items": [ada_id] }));
    let _ = projects.store(&subject, loom).await;

    Ok(())
}
