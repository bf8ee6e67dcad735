//! Demo composition served by the binary: a health probe and an in-memory
//! notes collection.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use module_router::{App, AppBuilder, HookFuture, HttpContext, Module, Options};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Note {
    id: u64,
    text: String,
}

#[derive(Debug, Deserialize)]
struct NewNote {
    text: String,
}

#[derive(Debug, Default)]
struct Notes {
    next_id: u64,
    items: BTreeMap<u64, Note>,
}

/// Shared across requests; captured by the module factory.
type NoteStore = Arc<Mutex<Notes>>;

pub fn app() -> AppBuilder {
    let store = NoteStore::default();

    App::builder()
        .module(health_module)
        .module(move || notes_module(store.clone()))
        .on_status(|status| status == StatusCode::NOT_FOUND, not_found_body)
        .options(
            Options::new()
                .before(|ctx: &mut HttpContext| {
                    Box::pin(async move {
                        ctx.insert_header(
                            HeaderName::from_static("x-served-by"),
                            HeaderValue::from_static("module-router"),
                        );
                        Ok(true)
                    })
                })
                .after(|ctx: &mut HttpContext| {
                    Box::pin(async move {
                        tracing::debug!(path = %ctx.path(), status = %ctx.status(), "Request complete");
                        Ok(())
                    })
                }),
        )
}

fn health_module() -> Module {
    Module::new("health").get("/health", |ctx: &mut HttpContext| {
        Box::pin(async move {
            ctx.negotiate(&json!({ "status": "ok" }))?;
            Ok(())
        })
    })
}

fn notes_module(store: NoteStore) -> Module {
    let (list, create, show, remove) = (store.clone(), store.clone(), store.clone(), store);

    Module::new("notes")
        .get("/notes", move |ctx: &mut HttpContext| list_notes(ctx, list.clone()))
        .post("/notes", move |ctx: &mut HttpContext| create_note(ctx, create.clone()))
        .get("/notes/{id}", move |ctx: &mut HttpContext| show_note(ctx, show.clone()))
        .delete("/notes/{id}", move |ctx: &mut HttpContext| delete_note(ctx, remove.clone()))
        .before(require_json_body)
}

/// Writes to the collection must carry a JSON body.
fn require_json_body(ctx: &mut HttpContext) -> HookFuture<'_, bool> {
    Box::pin(async move {
        if ctx.method() != axum::http::Method::POST {
            return Ok(true);
        }
        let is_json = ctx
            .header(header::CONTENT_TYPE.as_str())
            .is_some_and(|value| value.starts_with("application/json"));
        if !is_json {
            ctx.set_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        }
        Ok(is_json)
    })
}

fn list_notes(ctx: &mut HttpContext, store: NoteStore) -> HookFuture<'_, ()> {
    Box::pin(async move {
        let notes: Vec<Note> = store.lock().await.items.values().cloned().collect();
        ctx.negotiate(&notes)?;
        Ok(())
    })
}

fn create_note(ctx: &mut HttpContext, store: NoteStore) -> HookFuture<'_, ()> {
    Box::pin(async move {
        let input: NewNote = match ctx.json().await {
            Ok(input) => input,
            Err(e) => {
                ctx.set_status(StatusCode::BAD_REQUEST);
                ctx.negotiate(&json!({ "error": e.to_string() }))?;
                return Ok(());
            }
        };

        let note = {
            let mut notes = store.lock().await;
            notes.next_id += 1;
            let note = Note {
                id: notes.next_id,
                text: input.text,
            };
            notes.items.insert(note.id, note.clone());
            note
        };

        ctx.set_status(StatusCode::CREATED);
        ctx.negotiate(&note)?;
        Ok(())
    })
}

fn show_note(ctx: &mut HttpContext, store: NoteStore) -> HookFuture<'_, ()> {
    Box::pin(async move {
        let note = match note_id(ctx) {
            Some(id) => store.lock().await.items.get(&id).cloned(),
            None => None,
        };
        match note {
            Some(note) => ctx.negotiate(&note)?,
            None => ctx.set_status(StatusCode::NOT_FOUND),
        }
        Ok(())
    })
}

fn delete_note(ctx: &mut HttpContext, store: NoteStore) -> HookFuture<'_, ()> {
    Box::pin(async move {
        let removed = match note_id(ctx) {
            Some(id) => store.lock().await.items.remove(&id).is_some(),
            None => false,
        };
        ctx.set_status(if removed {
            StatusCode::NO_CONTENT
        } else {
            StatusCode::NOT_FOUND
        });
        Ok(())
    })
}

fn note_id(ctx: &HttpContext) -> Option<u64> {
    ctx.param("id").and_then(|id| id.parse().ok())
}

fn not_found_body(ctx: &mut HttpContext) -> HookFuture<'_, ()> {
    Box::pin(async move {
        if ctx.response().body_len() == 0 {
            ctx.negotiate(&json!({ "error": "not found" }))?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use axum::Router;
    use tower::ServiceExt;

    async fn call(router: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_default())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_notes_lifecycle() {
        let router = app().build().unwrap().into_router();

        let (status, body) = call(&router, Method::POST, "/notes", Some(r#"{"text":"milk"}"#)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, r#"{"id":1,"text":"milk"}"#);

        let (status, body) = call(&router, Method::GET, "/notes/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"id":1,"text":"milk"}"#);

        let (status, _) = call(&router, Method::DELETE, "/notes/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(&router, Method::GET, "/notes/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"error":"not found"}"#);
    }

    #[tokio::test]
    async fn test_post_without_json_is_rejected_before_handler() {
        let router = app().build().unwrap().into_router();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/notes")
            .body(Body::from("text"))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let (_, body) = call(&router, Method::GET, "/notes", None).await;
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let router = app().build().unwrap().into_router();
        let (status, _) = call(&router, Method::POST, "/notes", Some("{")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_and_served_by_header() {
        let router = app().build().unwrap().into_router();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-served-by").unwrap(), "module-router");
    }
}
