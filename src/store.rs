use crate::library::{join_list, split_list, Mod};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use thiserror::Error;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS Games (
    Game_ID INTEGER PRIMARY KEY AUTOINCREMENT,
    Game_title TEXT
);
CREATE TABLE IF NOT EXISTS Mods (
    Mod_ID INTEGER PRIMARY KEY AUTOINCREMENT,
    Game_ID INTEGER REFERENCES Games (Game_ID),
    Title TEXT,
    Tags TEXT,
    Mversion TEXT,
    Gversion TEXT,
    Requirements TEXT,
    Filepath TEXT,
    Incompatible TEXT,
    Commentary TEXT,
    IMG_Path TEXT
);
";

const MOD_COLUMNS: &str =
    "Game_ID, Title, Tags, Mversion, Gversion, Requirements, Filepath, Incompatible, Commentary, IMG_Path";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("database query failed: {0}")]
    Sql(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRow {
    pub id: i64,
    pub title: String,
}

// Every call opens its own connection and drops it before returning, so no
// transaction ever spans more than one operation.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self { path: path.into() };
        store.bootstrap()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> StoreResult<T> {
        let conn = Connection::open(&self.path).map_err(|source| StoreError::Unavailable {
            path: self.path.clone(),
            source,
        })?;
        conn.pragma_query_value(None, "schema_version", |row| row.get::<_, i64>(0))
            .map_err(|source| StoreError::Unavailable {
                path: self.path.clone(),
                source,
            })?;
        Ok(op(&conn)?)
    }

    pub fn bootstrap(&self) -> StoreResult<()> {
        tracing::debug!(path = %self.path.display(), "bootstrapping catalogue schema");
        self.with_connection(|conn| conn.execute_batch(SCHEMA))
    }

    pub fn insert_game(&self, title: &str) -> StoreResult<i64> {
        self.with_connection(|conn| {
            conn.execute("INSERT INTO Games (Game_title) VALUES (?1)", params![title])?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn select_games(&self) -> StoreResult<Vec<GameRow>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT Game_ID, Game_title FROM Games ORDER BY Game_ID")?;
            let rows = stmt.query_map([], |row| {
                Ok(GameRow {
                    id: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })?;
            rows.collect()
        })
    }

    pub fn update_game_title(&self, old_title: &str, new_title: &str) -> StoreResult<usize> {
        self.with_connection(|conn| {
            conn.execute(
                "UPDATE Games SET Game_title = ?1 WHERE Game_title = ?2",
                params![new_title, old_title],
            )
        })
    }

    pub fn delete_game(&self, title: &str) -> StoreResult<usize> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM Games WHERE Game_title = ?1", params![title])
        })
    }

    pub fn select_mods(&self, game_id: i64) -> StoreResult<Vec<Mod>> {
        self.with_connection(|conn| {
            let sql = format!("SELECT {MOD_COLUMNS} FROM Mods WHERE Game_ID = ?1 ORDER BY Mod_ID");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![game_id], mod_from_row)?;
            rows.collect()
        })
    }

    // Title alone is not a key: two saved mods may share a title in
    // different folders.
    pub fn find_mod_id(
        &self,
        game_id: i64,
        title: &str,
        filepath: &Path,
    ) -> StoreResult<Option<i64>> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT Mod_ID FROM Mods
                 WHERE Title = ?1 AND Filepath = ?2 AND Game_ID = ?3
                 ORDER BY Mod_ID LIMIT 1",
                params![title, path_text(filepath), game_id],
                |row| row.get(0),
            )
            .optional()
        })
    }

    pub fn insert_mod(&self, entry: &Mod) -> StoreResult<i64> {
        self.with_connection(|conn| {
            let sql = format!(
                "INSERT INTO Mods ({MOD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            );
            conn.execute(
                &sql,
                params![
                    entry.game_id,
                    entry.title,
                    join_list(&entry.tags),
                    entry.mod_version,
                    entry.supported_game_version,
                    join_list(&entry.required_mods),
                    path_text(&entry.filepath),
                    join_list(&entry.incompatible_mods),
                    entry.commentary,
                    image_text(entry.image_path.as_deref()),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn update_mod(&self, mod_id: i64, entry: &Mod) -> StoreResult<usize> {
        self.with_connection(|conn| {
            conn.execute(
                "UPDATE Mods
                 SET Title = ?1,
                     Tags = ?2,
                     Mversion = ?3,
                     Gversion = ?4,
                     Requirements = ?5,
                     Filepath = ?6,
                     Incompatible = ?7,
                     Commentary = ?8,
                     IMG_Path = ?9
                 WHERE Mod_ID = ?10",
                params![
                    entry.title,
                    join_list(&entry.tags),
                    entry.mod_version,
                    entry.supported_game_version,
                    join_list(&entry.required_mods),
                    path_text(&entry.filepath),
                    join_list(&entry.incompatible_mods),
                    entry.commentary,
                    image_text(entry.image_path.as_deref()),
                    mod_id,
                ],
            )
        })
    }

    pub fn delete_mod(&self, mod_id: i64, game_id: i64) -> StoreResult<usize> {
        self.with_connection(|conn| {
            conn.execute(
                "DELETE FROM Mods WHERE Mod_ID = ?1 AND Game_ID = ?2",
                params![mod_id, game_id],
            )
        })
    }

    pub fn count_mods(&self, game_id: i64) -> StoreResult<usize> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM Mods WHERE Game_ID = ?1",
                params![game_id],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count.max(0) as usize)
        })
    }
}

fn mod_from_row(row: &Row<'_>) -> rusqlite::Result<Mod> {
    let text = |index: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(index)?.unwrap_or_default())
    };
    let image = text(9)?;
    Ok(Mod {
        game_id: row.get(0)?,
        title: text(1)?,
        tags: split_list(&text(2)?),
        mod_version: text(3)?,
        supported_game_version: text(4)?,
        required_mods: split_list(&text(5)?),
        filepath: PathBuf::from(text(6)?),
        incompatible_mods: split_list(&text(7)?),
        commentary: text(8)?,
        image_path: if image.is_empty() {
            None
        } else {
            Some(PathBuf::from(image))
        },
        saved: true,
    })
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn image_text(path: Option<&Path>) -> String {
    path.map(path_text).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, Store) {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("catalogue.sqlite")).unwrap();
        (temp, store)
    }

    fn sample_mod(game_id: i64, title: &str) -> Mod {
        Mod {
            game_id,
            title: title.to_string(),
            tags: vec!["Gameplay".to_string(), "Fixes".to_string()],
            mod_version: "1.2".to_string(),
            supported_game_version: "3.10.*".to_string(),
            required_mods: vec!["Core".to_string()],
            incompatible_mods: vec!["Other".to_string()],
            commentary: "load late".to_string(),
            filepath: PathBuf::from("/mods/sample"),
            image_path: Some(PathBuf::from("/mods/sample/thumbnail.png")),
            saved: false,
        }
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let (temp, store) = temp_store();
        store.bootstrap().unwrap();
        let reopened = Store::open(temp.path().join("catalogue.sqlite")).unwrap();
        assert!(reopened.select_games().unwrap().is_empty());
    }

    #[test]
    fn test_games_insert_rename_delete() {
        let (_temp, store) = temp_store();
        let first = store.insert_game("Stellaris").unwrap();
        let second = store.insert_game("Victoria 3").unwrap();
        assert!(second > first);

        assert_eq!(store.update_game_title("Stellaris", "Stellaris 2").unwrap(), 1);
        assert_eq!(
            store.select_games().unwrap(),
            vec![
                GameRow {
                    id: first,
                    title: "Stellaris 2".to_string()
                },
                GameRow {
                    id: second,
                    title: "Victoria 3".to_string()
                },
            ]
        );

        assert_eq!(store.delete_game("Victoria 3").unwrap(), 1);
        assert_eq!(store.select_games().unwrap().len(), 1);
    }

    #[test]
    fn test_mod_fields_survive_storage() {
        let (_temp, store) = temp_store();
        let game_id = store.insert_game("Stellaris").unwrap();
        let entry = sample_mod(game_id, "Better UI");
        store.insert_mod(&entry).unwrap();

        let loaded = store.select_mods(game_id).unwrap();
        assert_eq!(loaded.len(), 1);
        let expected = Mod {
            saved: true,
            ..entry
        };
        assert_eq!(loaded[0], expected);
    }

    #[test]
    fn test_missing_image_loads_as_none() {
        let (_temp, store) = temp_store();
        let game_id = store.insert_game("Stellaris").unwrap();
        let mut entry = sample_mod(game_id, "Plain");
        entry.image_path = None;
        store.insert_mod(&entry).unwrap();
        assert_eq!(store.select_mods(game_id).unwrap()[0].image_path, None);
    }

    #[test]
    fn test_find_update_delete_mod() {
        let (_temp, store) = temp_store();
        let game_id = store.insert_game("Stellaris").unwrap();
        let other_game = store.insert_game("Hearts of Iron IV").unwrap();
        let row = store.insert_mod(&sample_mod(game_id, "Better UI")).unwrap();
        store.insert_mod(&sample_mod(other_game, "Better UI")).unwrap();

        let path = Path::new("/mods/sample");
        assert_eq!(store.find_mod_id(game_id, "Better UI", path).unwrap(), Some(row));
        assert_eq!(store.find_mod_id(game_id, "Missing", path).unwrap(), None);
        assert_eq!(
            store
                .find_mod_id(game_id, "Better UI", Path::new("/mods/other"))
                .unwrap(),
            None
        );

        let mut renamed = sample_mod(game_id, "Best UI");
        renamed.commentary = String::new();
        assert_eq!(store.update_mod(row, &renamed).unwrap(), 1);
        assert_eq!(store.find_mod_id(game_id, "Better UI", path).unwrap(), None);
        assert_eq!(store.find_mod_id(game_id, "Best UI", path).unwrap(), Some(row));
        assert_eq!(store.count_mods(game_id).unwrap(), 1);

        assert_eq!(store.delete_mod(row, other_game).unwrap(), 0);
        assert_eq!(store.delete_mod(row, game_id).unwrap(), 1);
        assert_eq!(store.count_mods(game_id).unwrap(), 0);
        assert_eq!(store.count_mods(other_game).unwrap(), 1);
    }

    #[test]
    fn test_unreachable_database_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let result = Store::open(temp.path().join("missing").join("catalogue.sqlite"));
        assert!(matches!(result, Err(StoreError::Unavailable { .. })));
    }
}
