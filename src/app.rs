use crate::{
    config::AppConfig,
    game::{Game, GameCollection, GameHandle, GameTitleOutcome},
    store::Store,
};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

pub struct App {
    pub config: AppConfig,
    pub store: Store,
    pub games: GameCollection,
}

impl App {
    pub fn initialize(database_override: Option<PathBuf>) -> Result<Self> {
        let config = AppConfig::load_or_create()?;
        Self::with_config(config, database_override)
    }

    pub fn with_config(config: AppConfig, database_override: Option<PathBuf>) -> Result<Self> {
        let database_path = database_override.unwrap_or_else(|| config.database_path.clone());
        let store = Store::open(&database_path)
            .with_context(|| format!("open catalogue {}", database_path.display()))?;
        let games = GameCollection::load(&store).context("load games")?;
        tracing::debug!(
            database = %database_path.display(),
            games = games.len(),
            "catalogue loaded"
        );
        Ok(Self {
            config,
            store,
            games,
        })
    }

    pub fn game_handle(&self, title: &str) -> Result<GameHandle> {
        self.games
            .by_title(title)
            .map(Game::handle)
            .ok_or_else(|| anyhow!("Unknown game: {title}"))
    }

    pub fn game_mut(&mut self, title: &str) -> Result<&mut Game> {
        let handle = self.game_handle(title)?;
        self.games
            .by_handle_mut(handle)
            .ok_or_else(|| anyhow!("Unknown game: {title}"))
    }

    pub fn create_game(&mut self, title: &str) -> Result<GameTitleOutcome> {
        let handle = self
            .games
            .create_placeholder()
            .ok_or_else(|| anyhow!("another game is still waiting for a title"))?;
        let outcome = match self.games.commit_title(handle, title, &self.store) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.games.discard_placeholder();
                return Err(err).context("add game");
            }
        };
        if outcome != GameTitleOutcome::Accepted {
            self.games.discard_placeholder();
        }
        Ok(outcome)
    }
}
