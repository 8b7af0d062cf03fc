use ignite::prelude::*;

/// Identifies the key tokens are signed with.
#[derive(Debug, Clone)]
pub struct KeyRing {
    pub key_id: String,
}

pub struct SigningKeys;

#[bootstrapper(priority = 10)]
impl SigningKeys {
    #[hook]
    fn configure_builder(builder: &mut AppBuilder, config: Arc<ConfigService>) -> anyhow::Result<()> {
        let key_id = config
            .get("Auth:KeyId")
            .ok_or_else(|| anyhow::anyhow!("Auth:KeyId is not configured"))?;

        tracing::info!(%key_id, "🔑 Signing key loaded");
        builder.container_mut().register(KeyRing { key_id });
        Ok(())
    }
}
