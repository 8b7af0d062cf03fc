use crate::di::Container;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode as HttpStatusCode, request::Parts},
};
use std::sync::Arc;

/// Axum extractor that resolves a service from the built application's container.
///
/// The container is attached to every business route by [`App::into_router`]
/// as a request extension, so handlers need no custom router state.
///
/// [`App::into_router`]: crate::bootstrap::App::into_router
///
/// # Example
/// ```rust,ignore
/// async fn list_notes(Inject(notes): Inject<NoteStore>) -> Json<Vec<Note>> {
///     Json(notes.all())
/// }
/// ```
pub struct Inject<T: ?Sized>(pub Arc<T>);

impl<S, T> FromRequestParts<S> for Inject<T>
where
    S: Send + Sync,
    T: ?Sized + 'static + Send + Sync,
{
    type Rejection = (HttpStatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let container = parts.extensions.get::<Arc<Container>>().ok_or_else(|| {
            (
                HttpStatusCode::INTERNAL_SERVER_ERROR,
                "Dependency injection failed: no container attached to request".to_string(),
            )
        })?;

        container.resolve::<T>().map(Inject).map_err(|e| {
            (
                HttpStatusCode::INTERNAL_SERVER_ERROR,
                format!("Dependency injection failed: {}", e),
            )
        })
    }
}

impl<T: ?Sized> std::ops::Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: ?Sized> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Inject(Arc::clone(&self.0))
    }
}
