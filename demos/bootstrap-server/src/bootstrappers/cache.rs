use super::NoteStore;
use ignite::prelude::*;
use std::time::Duration;

pub struct CacheWarmup;

#[bootstrapper(priority = 500)]
impl CacheWarmup {
    /// Seeds the note store in the background; `/ready` stays 503 until done.
    #[hook]
    fn decorate_app_async(
        _app: &mut App,
        store: Arc<NoteStore>,
        config: Arc<ConfigService>,
    ) -> BoxFuture<'static, anyhow::Result<()>> {
        async move {
            let delay = config.get_parsed::<u64>("Cache:WarmupMillis")?.unwrap_or(1000);
            tracing::info!(delay_ms = delay, "🔥 Warming note cache");
            tokio::time::sleep(Duration::from_millis(delay)).await;
            store
                .insert("Welcome".to_string(), "Seeded during bootstrap".to_string())
                .await;
            Ok(())
        }
        .boxed()
    }
}
