use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use formloom_application::{RoutePlan, SubmitOutcome};
use formloom_domain::FormTree;
use formloom_markup::{
    Page, render_confirm_delete, render_detail, render_form, render_page, render_table,
};
use tower_sessions::Session;

use crate::error::WebResult;
use crate::flash;
use crate::state::AppState;

fn return_parameter(query: &BTreeMap<String, String>) -> Option<String> {
    query.get("return").cloned()
}

/// Rebuilds a form URL after a rejected submission, keeping the stashed
/// return parameter attached the way a browser "back" would.
async fn back_to_form(session: &Session, form_path: String) -> WebResult<String> {
    let stored_return = flash::peek_return_url(session).await?;
    Ok(match stored_return {
        Some(return_url) => RoutePlan::with_query(
            form_path,
            &[("return".to_owned(), return_url)],
        ),
        None => form_path,
    })
}

fn ucfirst(text: &str) -> String {
    let mut characters = text.chars();
    characters
        .next()
        .map(|first| first.to_uppercase().collect::<String>() + characters.as_str())
        .unwrap_or_default()
}

async fn page(
    state: &AppState,
    session: &Session,
    title: String,
    body: String,
) -> WebResult<Html<String>> {
    let flash_lines = flash::take_flash_lines(session).await?;
    Ok(Html(render_page(&Page {
        title: format!("{} - {}", title, state.site_title),
        flash_lines,
        body,
    })))
}

pub async fn index_handler(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    session: Session,
) -> WebResult<Html<String>> {
    let service = state.service(&resource)?;
    let subject = state.subject();

    let table = service
        .index(&subject, &service.routes().index_path())
        .await?;

    let title = ucfirst(service.definition().name().as_str());
    page(&state, &session, title, render_table(&table)).await
}

pub async fn create_handler(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(query): Query<BTreeMap<String, String>>,
    session: Session,
) -> WebResult<Html<String>> {
    let service = state.service(&resource)?;

    flash::stash_return_url(&session, return_parameter(&query)).await?;
    let old_input = flash::take_old_input(&session).await?;

    let form = service.create_form(old_input.as_ref()).await?;
    let title = format!("Create {}", service.definition().entity_name().as_str());
    page(&state, &session, title, render_form(&form)).await
}

pub async fn store_handler(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    session: Session,
    body: String,
) -> WebResult<Response> {
    let service = state.service(&resource)?;
    let subject = state.subject();

    let tree = FormTree::parse(&body);
    match service.store(&subject, &tree).await? {
        SubmitOutcome::Saved { item, message } => {
            flash::flash_lines(&session, vec![message]).await?;
            let stored_return = flash::take_return_url(&session).await?;
            let target = service
                .after_save_redirect(&subject, stored_return.as_deref(), Some(&item))
                .await?;
            Ok(Redirect::to(&target).into_response())
        }
        SubmitOutcome::Rejected {
            message_lines,
            old_input,
        } => {
            flash::flash_lines(&session, message_lines).await?;
            flash::stash_old_input(&session, old_input).await?;
            let target = back_to_form(&session, service.routes().create_path()).await?;
            Ok(Redirect::to(&target).into_response())
        }
    }
}

pub async fn show_handler(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    session: Session,
) -> WebResult<Html<String>> {
    let service = state.service(&resource)?;
    let subject = state.subject();

    let detail = service
        .show(&subject, &id, &service.routes().show_path(&id))
        .await?;

    let title = service.definition().entity_name().as_str().to_owned();
    page(
        &state,
        &session,
        title,
        render_detail(service.definition(), &detail),
    )
    .await
}

pub async fn edit_handler(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    Query(query): Query<BTreeMap<String, String>>,
    session: Session,
) -> WebResult<Html<String>> {
    let service = state.service(&resource)?;
    let subject = state.subject();

    flash::stash_return_url(&session, return_parameter(&query)).await?;
    let old_input = flash::take_old_input(&session).await?;

    let form = service.edit_form(&subject, &id, old_input.as_ref()).await?;
    let title = format!("Edit {}", service.definition().entity_name().as_str());
    page(&state, &session, title, render_form(&form)).await
}

pub async fn update_handler(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    session: Session,
    body: String,
) -> WebResult<Response> {
    let service = state.service(&resource)?;
    let subject = state.subject();

    let tree = FormTree::parse(&body);
    match service.update(&subject, &id, &tree).await? {
        SubmitOutcome::Saved { item, message } => {
            flash::flash_lines(&session, vec![message]).await?;
            let stored_return = flash::take_return_url(&session).await?;
            let target = service
                .after_save_redirect(&subject, stored_return.as_deref(), Some(&item))
                .await?;
            Ok(Redirect::to(&target).into_response())
        }
        SubmitOutcome::Rejected {
            message_lines,
            old_input,
        } => {
            flash::flash_lines(&session, message_lines).await?;
            flash::stash_old_input(&session, old_input).await?;
            let target = back_to_form(&session, service.routes().edit_path(&id)).await?;
            Ok(Redirect::to(&target).into_response())
        }
    }
}

pub async fn confirm_delete_handler(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    Query(query): Query<BTreeMap<String, String>>,
    session: Session,
) -> WebResult<Html<String>> {
    let service = state.service(&resource)?;
    let subject = state.subject();

    flash::stash_return_url(&session, return_parameter(&query)).await?;

    let confirm = service.confirm_delete(&subject, &id).await?;
    let title = format!("Delete {}", service.definition().entity_name().as_str());
    page(&state, &session, title, render_confirm_delete(&confirm)).await
}

pub async fn destroy_handler(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    session: Session,
) -> WebResult<Response> {
    let service = state.service(&resource)?;
    let subject = state.subject();

    let (_item, message) = service.destroy(&subject, &id).await?;
    flash::flash_lines(&session, vec![message]).await?;

    let stored_return = flash::take_return_url(&session).await?;
    let target = service
        .after_save_redirect(&subject, stored_return.as_deref(), None)
        .await?;
    Ok(Redirect::to(&target).into_response())
}
