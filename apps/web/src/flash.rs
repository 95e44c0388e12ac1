use formloom_core::AppError;
use formloom_domain::SubmissionPayload;
use serde_json::Value;
use tower_sessions::Session;

use crate::error::WebResult;

const FLASH_KEY: &str = "formloom.flash";
const RETURN_KEY: &str = "formloom.return";
const OLD_INPUT_KEY: &str = "formloom.old_input";

fn session_error(error: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session store failure: {error}"))
}

/// Queues flash message lines for the next rendered page.
pub async fn flash_lines(session: &Session, lines: Vec<String>) -> WebResult<()> {
    session
        .insert(FLASH_KEY, lines)
        .await
        .map_err(session_error)?;
    Ok(())
}

/// Takes and clears the queued flash message lines.
pub async fn take_flash_lines(session: &Session) -> WebResult<Vec<String>> {
    Ok(session
        .remove::<Vec<String>>(FLASH_KEY)
        .await
        .map_err(session_error)?
        .unwrap_or_default())
}

/// Stashes the `return` query parameter for the redirect after save.
///
/// Mirrors the original behavior: opening a form or confirmation page always
/// overwrites the stash, clearing it when no parameter was supplied.
pub async fn stash_return_url(session: &Session, return_url: Option<String>) -> WebResult<()> {
    match return_url.filter(|value| !value.trim().is_empty()) {
        Some(value) => session
            .insert(RETURN_KEY, value)
            .await
            .map_err(session_error)?,
        None => {
            session
                .remove::<String>(RETURN_KEY)
                .await
                .map_err(session_error)?;
        }
    }
    Ok(())
}

/// Takes and clears the stashed return URL.
pub async fn take_return_url(session: &Session) -> WebResult<Option<String>> {
    Ok(session
        .remove::<String>(RETURN_KEY)
        .await
        .map_err(session_error)?)
}

/// Reads the stashed return URL without clearing it; a redisplayed form must
/// keep carrying it.
pub async fn peek_return_url(session: &Session) -> WebResult<Option<String>> {
    Ok(session
        .get::<String>(RETURN_KEY)
        .await
        .map_err(session_error)?)
}

/// Preserves a rejected submission so the redisplayed form can prefill it.
pub async fn stash_old_input(session: &Session, old_input: SubmissionPayload) -> WebResult<()> {
    session
        .insert(OLD_INPUT_KEY, old_input.into_value())
        .await
        .map_err(session_error)?;
    Ok(())
}

/// Takes and clears the preserved submission values.
pub async fn take_old_input(session: &Session) -> WebResult<Option<SubmissionPayload>> {
    let stored = session
        .remove::<Value>(OLD_INPUT_KEY)
        .await
        .map_err(session_error)?;

    Ok(stored.and_then(|value| match value {
        Value::Object(map) => Some(SubmissionPayload::from(map)),
        _ => None,
    }))
}
