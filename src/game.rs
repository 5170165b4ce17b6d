use crate::{
    library::Mod,
    reconcile::{self, ReconcileError, ReconcileResult},
    store::{Store, StoreResult},
};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameHandle(u32);

#[derive(Debug, Clone)]
pub struct Game {
    handle: GameHandle,
    pub id: Option<i64>,
    pub title: String,
    pub mods: Vec<Mod>,
}

impl Game {
    fn new(handle: GameHandle) -> Self {
        Self {
            handle,
            id: None,
            title: String::new(),
            mods: Vec::new(),
        }
    }

    pub fn handle(&self) -> GameHandle {
        self.handle
    }

    pub fn is_titled(&self) -> bool {
        self.id.is_some()
    }

    pub fn mod_count(&self) -> usize {
        self.mods.len()
    }

    pub fn saved_mod_count(&self) -> usize {
        self.mods.iter().filter(|entry| entry.saved).count()
    }

    // Sorting and highlight filters only make sense with something to compare.
    pub fn filters_enabled(&self) -> bool {
        self.mods.len() > 1
    }

    // Without a folder the first mod with the title wins.
    pub fn mod_index(&self, title: &str, filepath: Option<&Path>) -> Option<usize> {
        self.mods.iter().position(|entry| {
            entry.title == title && filepath.map_or(true, |path| entry.filepath == path)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameTitleOutcome {
    Accepted,
    Empty,
    Duplicate(String),
    NotPending,
    UnknownGame,
}

#[derive(Debug, Default)]
pub struct GameCollection {
    games: Vec<Game>,
    next_handle: u32,
    pending: Option<GameHandle>,
}

impl GameCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(store: &Store) -> StoreResult<Self> {
        let mut collection = Self::new();
        for row in store.select_games()? {
            let handle = collection.allocate_handle();
            let mut game = Game::new(handle);
            game.id = Some(row.id);
            game.title = row.title;
            game.mods = store.select_mods(row.id)?;
            tracing::debug!(game = %game.title, mods = game.mods.len(), "loaded game");
            collection.games.push(game);
        }
        Ok(collection)
    }

    fn allocate_handle(&mut self) -> GameHandle {
        let handle = GameHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.games
            .iter()
            .filter(|game| game.is_titled())
            .map(|game| game.title.as_str())
            .collect()
    }

    pub fn by_title(&self, title: &str) -> Option<&Game> {
        self.games
            .iter()
            .find(|game| game.is_titled() && game.title == title)
    }

    pub fn by_handle(&self, handle: GameHandle) -> Option<&Game> {
        self.games.iter().find(|game| game.handle == handle)
    }

    pub fn by_handle_mut(&mut self, handle: GameHandle) -> Option<&mut Game> {
        self.games.iter_mut().find(|game| game.handle == handle)
    }

    pub fn is_name_set(&self) -> bool {
        self.pending.is_none()
    }

    pub fn create_placeholder(&mut self) -> Option<GameHandle> {
        if self.pending.is_some() {
            return None;
        }
        let handle = self.allocate_handle();
        self.games.push(Game::new(handle));
        self.pending = Some(handle);
        Some(handle)
    }

    pub fn discard_placeholder(&mut self) -> bool {
        let Some(handle) = self.pending.take() else {
            return false;
        };
        self.games.retain(|game| game.handle != handle);
        true
    }

    pub fn commit_title(
        &mut self,
        handle: GameHandle,
        title: &str,
        store: &Store,
    ) -> StoreResult<GameTitleOutcome> {
        if self.pending != Some(handle) {
            return Ok(GameTitleOutcome::NotPending);
        }
        if let Some(outcome) = self.reject_title(title) {
            return Ok(outcome);
        }
        let id = store.insert_game(title)?;
        let Some(game) = self.by_handle_mut(handle) else {
            return Ok(GameTitleOutcome::UnknownGame);
        };
        game.id = Some(id);
        game.title = title.to_string();
        self.pending = None;
        tracing::info!(game = title, id, "game added");
        Ok(GameTitleOutcome::Accepted)
    }

    pub fn rename(
        &mut self,
        handle: GameHandle,
        new_title: &str,
        store: &Store,
    ) -> StoreResult<GameTitleOutcome> {
        let Some(game) = self.by_handle(handle) else {
            return Ok(GameTitleOutcome::UnknownGame);
        };
        if !game.is_titled() {
            return Ok(GameTitleOutcome::NotPending);
        }
        if let Some(outcome) = self.reject_title(new_title) {
            return Ok(outcome);
        }
        let old_title = game.title.clone();
        store.update_game_title(&old_title, new_title)?;
        if let Some(game) = self.by_handle_mut(handle) {
            game.title = new_title.to_string();
        }
        tracing::info!(from = %old_title, to = new_title, "game renamed");
        Ok(GameTitleOutcome::Accepted)
    }

    fn reject_title(&self, title: &str) -> Option<GameTitleOutcome> {
        if title.trim().is_empty() {
            return Some(GameTitleOutcome::Empty);
        }
        if self.by_title(title).is_some() {
            return Some(GameTitleOutcome::Duplicate(title.to_string()));
        }
        None
    }

    // Mods go first, one delete per mod, then the game row itself.
    pub fn delete(&mut self, handle: GameHandle, store: &Store) -> ReconcileResult<Option<Game>> {
        if self.pending.is_some() {
            return Err(ReconcileError::GameNotReady);
        }
        let Some(game) = self.by_handle_mut(handle) else {
            return Ok(None);
        };
        while !game.mods.is_empty() {
            reconcile::delete_mod(game, 0, store)?;
        }
        store.delete_game(&game.title)?;
        tracing::info!(game = %game.title, "game deleted");
        Ok(self.remove(handle))
    }

    fn remove(&mut self, handle: GameHandle) -> Option<Game> {
        let index = self.games.iter().position(|game| game.handle == handle)?;
        Some(self.games.remove(index))
    }
}
