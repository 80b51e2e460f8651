use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::Config;

use advisor_client::HttpPhrasingClient;
use difficulty_service::{DifficultyAdvisor, PhrasingClient};
use level_graph::{LevelGraph, CATALOG};
use progress_storage::{FileStorage, ProgressStorage};
use progress_store::ProgressStore;
use session_service::PlaySession;

pub mod advisor_client;
pub mod difficulty_service;
pub mod encouragement;
pub mod level_graph;
pub mod problem_generator;
pub mod progress_storage;
pub mod progress_store;
pub mod session_service;

pub type SessionRegistry = RwLock<HashMap<String, Arc<tokio::sync::Mutex<PlaySession>>>>;

pub struct AppState {
    pub config: Config,
    pub catalog: Arc<LevelGraph>,
    pub progress: ProgressStore,
    pub advisor: DifficultyAdvisor,
    pub sessions: SessionRegistry,
    /// Root generator; sessions and stateless calls derive their own from it.
    rng: Mutex<StdRng>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let storage = FileStorage::new(&config.data_dir)?;
        tracing::info!("Progress stored under {}", storage.root().display());

        let client: Option<Arc<dyn PhrasingClient>> = match &config.advisor_url {
            Some(url) => {
                let client = HttpPhrasingClient::new(url, advisor_timeout(&config))?;
                tracing::info!("Difficulty collaborator enabled at {}", url);
                Some(Arc::new(client))
            }
            None => None,
        };

        Ok(Self::with_storage(config, Arc::new(storage), client))
    }

    pub fn with_storage(
        config: Config,
        storage: Arc<dyn ProgressStorage>,
        client: Option<Arc<dyn PhrasingClient>>,
    ) -> Self {
        let catalog = CATALOG.clone();
        let rng = match config.rng_seed {
            Some(seed) => {
                tracing::info!("Using fixed RNG seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_os_rng(),
        };

        Self {
            advisor: DifficultyAdvisor::new(client, advisor_timeout(&config)),
            progress: ProgressStore::new(storage, catalog.clone()),
            catalog,
            sessions: RwLock::new(HashMap::new()),
            rng: Mutex::new(rng),
            config,
        }
    }

    /// Independent generator seeded from the root one.
    pub fn fork_rng(&self) -> StdRng {
        let mut root = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        StdRng::from_rng(&mut *root)
    }
}

fn advisor_timeout(config: &Config) -> Duration {
    Duration::from_millis(config.advisor_timeout_ms)
}
