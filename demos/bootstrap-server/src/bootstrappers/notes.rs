use ignite::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateNote {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Default)]
pub struct NoteStore {
    notes: RwLock<Vec<Note>>,
}

impl NoteStore {
    pub async fn insert(&self, title: String, body: String) -> Note {
        let mut notes = self.notes.write().await;
        let note = Note {
            id: notes.len() as u64 + 1,
            title,
            body,
        };
        notes.push(note.clone());
        note
    }

    pub async fn list(&self) -> Vec<Note> {
        self.notes.read().await.clone()
    }

    pub async fn find(&self, id: u64) -> Option<Note> {
        self.notes.read().await.iter().find(|note| note.id == id).cloned()
    }
}

pub struct NotesRoutes;

#[bootstrapper]
impl NotesRoutes {
    #[hook]
    fn configure_builder(builder: &mut AppBuilder) -> anyhow::Result<()> {
        builder.container_mut().register(NoteStore::default());
        builder.merge(
            Router::new()
                .route("/notes", get(Self::list).post(Self::create))
                .route("/notes/{id}", get(Self::find)),
        );
        Ok(())
    }

    async fn list(Inject(store): Inject<NoteStore>) -> ApiResponse<Vec<Note>> {
        ApiResponse::success(store.list().await)
    }

    async fn create(
        Inject(store): Inject<NoteStore>,
        Json(request): Json<CreateNote>,
    ) -> ApiResponse<Note> {
        ApiResponse::success(store.insert(request.title, request.body).await)
    }

    async fn find(Inject(store): Inject<NoteStore>, Path(id): Path<u64>) -> ApiResponse<Note> {
        match store.find(id).await {
            Some(note) => ApiResponse::success(note),
            None => ApiResponse::error(StatusCode::NOT_FOUND, format!("note {id} not found")),
        }
    }
}
