use std::sync::Arc;

use pastey_auth::{
    AccessGate, IdentityStore, InMemoryIdentityStore, InMemoryPasteStore, PasteStore,
    TokenService,
};
use pastey_storage::{BlobStorage, InMemoryStorage, LocalFileStorage};

use crate::config::Config;
use crate::password::Passwords;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gate: AccessGate,
    pub tokens: Arc<TokenService>,
    pub identities: Arc<dyn IdentityStore>,
    pub pastes: Arc<dyn PasteStore>,
    pub blobs: Arc<dyn BlobStorage>,
    pub passwords: Passwords,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Build blob storage backend
        let blobs: Arc<dyn BlobStorage> = match config.storage.backend.as_str() {
            "local" => {
                let path = config
                    .storage
                    .local_path
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("local storage requires local_path"))?;
                Arc::new(LocalFileStorage::new(path).await?)
            }
            "memory" => Arc::new(InMemoryStorage::new()),
            #[cfg(feature = "s3")]
            "s3" => {
                let bucket = config
                    .storage
                    .s3_bucket
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("s3 storage requires s3_bucket"))?;
                let storage = pastey_storage::S3Storage::connect(
                    bucket.as_str(),
                    config.storage.s3_endpoint.as_deref(),
                )
                .await;
                storage.ensure_bucket().await?;
                Arc::new(storage)
            }
            #[cfg(not(feature = "s3"))]
            "s3" => {
                anyhow::bail!("s3 storage requested but built without the `s3` feature")
            }
            other => {
                anyhow::bail!(
                    "Unknown storage backend '{}'. Valid options: 'memory', 'local', 's3'",
                    other
                );
            }
        };

        let (identities, pastes) = open_database(config)?;

        // A bad secret or inconsistent lifetimes must stop startup
        let tokens = Arc::new(TokenService::new(
            config.auth.secret.expose().as_bytes(),
            config.auth.token_config(),
        )?);
        tracing::info!(
            issuer = tokens.issuer(),
            access_ttl_secs = tokens.access_ttl_secs(),
            refresh_ttl_secs = tokens.refresh_ttl_secs(),
            "token service ready"
        );

        let passwords = Passwords::new(&config.auth.argon2)?;
        let gate = AccessGate::new(tokens.clone(), identities.clone(), pastes.clone());

        Ok(Self {
            gate,
            tokens,
            identities,
            pastes,
            blobs,
            passwords,
            config: Arc::new(config.clone()),
        })
    }
}

type Stores = (Arc<dyn IdentityStore>, Arc<dyn PasteStore>);

fn open_database(config: &Config) -> anyhow::Result<Stores> {
    match config.database.backend.as_str() {
        "memory" => {
            tracing::warn!("Using in-memory database - data is lost on restart");
            Ok((
                Arc::new(InMemoryIdentityStore::new()),
                Arc::new(InMemoryPasteStore::new()),
            ))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = config
                .database
                .path
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("sqlite database requires path"))?;
            let store = Arc::new(pastey_auth::SqliteStore::open(path)?);
            Ok((store.clone(), store))
        }
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => {
            anyhow::bail!("sqlite database requested but built without the `sqlite` feature")
        }
        other => {
            anyhow::bail!(
                "Unknown database backend '{}'. Valid options: 'memory', 'sqlite'",
                other
            );
        }
    }
}
