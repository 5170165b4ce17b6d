use crate::{
    descriptor::{self, ResolvedDescriptor},
    game::Game,
    library::{Mod, ModDraft},
    scan,
    store::{Store, StoreError},
};
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("game has no committed title yet")]
    GameNotReady,
    #[error("no mod at position {0}")]
    NoSuchMod(usize),
    #[error("failed to read descriptor {path}: {source}")]
    Descriptor {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read mod folder {path}: {source}")]
    Folder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added { index: usize, title: String },
    AlreadyAdded { title: String },
    NoTitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRejection {
    EmptyTitle,
    Duplicate { title: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Updated,
    Rejected(SaveRejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Unreadable,
    NoDescriptor,
    Saved {
        save: SaveOutcome,
        renamed_from: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: Vec<String>,
    pub already_added: Vec<String>,
    pub untitled: Vec<PathBuf>,
    pub failures: Vec<ImportFailure>,
}

fn ready_id(game: &Game) -> ReconcileResult<i64> {
    game.id.ok_or(ReconcileError::GameNotReady)
}

pub fn add_from_descriptor(game: &mut Game, descriptor_path: &Path) -> ReconcileResult<AddOutcome> {
    let game_id = ready_id(game)?;
    let parsed =
        descriptor::read_descriptor(descriptor_path).map_err(|source| ReconcileError::Descriptor {
            path: descriptor_path.to_path_buf(),
            source,
        })?;
    let Some(title) = parsed.usable_title().map(str::to_string) else {
        tracing::debug!(path = %descriptor_path.display(), "descriptor has no title, skipped");
        return Ok(AddOutcome::NoTitle);
    };
    let resolved = parsed.resolve(descriptor_path);

    let exists = game
        .mods
        .iter()
        .any(|entry| !entry.is_deleted() && entry.same_key(&title, &resolved.filepath));
    if exists {
        return Ok(AddOutcome::AlreadyAdded { title });
    }

    let entry = mod_from_descriptor(game_id, title.clone(), resolved);
    game.mods.push(entry);
    tracing::info!(game = %game.title, title = %title, "mod added from descriptor");
    Ok(AddOutcome::Added {
        index: game.mods.len() - 1,
        title,
    })
}

fn mod_from_descriptor(game_id: i64, title: String, resolved: ResolvedDescriptor) -> Mod {
    let ResolvedDescriptor {
        descriptor,
        filepath,
        image_path,
    } = resolved;
    Mod {
        game_id,
        title,
        tags: descriptor.tags,
        mod_version: descriptor.version.unwrap_or_default(),
        supported_game_version: descriptor.supported_version.unwrap_or_default(),
        required_mods: descriptor.dependencies,
        filepath,
        image_path,
        ..Mod::default()
    }
}

pub fn add_blank(game: &mut Game) -> ReconcileResult<usize> {
    let game_id = ready_id(game)?;
    game.mods.push(Mod::blank(game_id));
    Ok(game.mods.len() - 1)
}

pub fn save_mod(
    game: &mut Game,
    index: usize,
    draft: ModDraft,
    renamed_from: Option<&str>,
    store: &Store,
) -> ReconcileResult<SaveOutcome> {
    let game_id = ready_id(game)?;
    let current = game
        .mods
        .get(index)
        .ok_or(ReconcileError::NoSuchMod(index))?;

    if draft.title.trim().is_empty() {
        return Ok(SaveOutcome::Rejected(SaveRejection::EmptyTitle));
    }
    let duplicate = game.mods.iter().enumerate().any(|(other, entry)| {
        other != index && entry.saved && entry.same_key(&draft.title, &draft.filepath)
    });
    if duplicate {
        tracing::warn!(game = %game.title, title = %draft.title, "duplicate mod not saved");
        return Ok(SaveOutcome::Rejected(SaveRejection::Duplicate {
            title: draft.title,
        }));
    }

    let lookup = renamed_from.unwrap_or(&current.title);
    let row = store.find_mod_id(game_id, lookup, &current.filepath)?;
    let mut updated = current.clone();
    updated.game_id = game_id;
    updated.apply(draft);

    let outcome = match row {
        Some(mod_id) if current.saved => {
            store.update_mod(mod_id, &updated)?;
            tracing::info!(game = %game.title, title = %updated.title, mod_id, "mod updated");
            SaveOutcome::Updated
        }
        _ => {
            let mod_id = store.insert_mod(&updated)?;
            tracing::info!(game = %game.title, title = %updated.title, mod_id, "mod saved");
            SaveOutcome::Inserted
        }
    };
    updated.saved = true;
    game.mods[index] = updated;
    Ok(outcome)
}

pub fn refresh_from_descriptor(
    game: &mut Game,
    index: usize,
    store: &Store,
) -> ReconcileResult<RefreshOutcome> {
    ready_id(game)?;
    let current = game
        .mods
        .get(index)
        .ok_or(ReconcileError::NoSuchMod(index))?;
    if current.filepath.as_os_str().is_empty() {
        return Ok(RefreshOutcome::NoDescriptor);
    }
    let descriptor_path = match scan::find_mod_descriptor(&current.filepath) {
        Ok(Some(path)) => path,
        Ok(None) => return Ok(RefreshOutcome::NoDescriptor),
        Err(err) => {
            tracing::warn!(
                title = %current.title,
                folder = %current.filepath.display(),
                error = %err,
                "mod folder unreadable"
            );
            return Ok(RefreshOutcome::Unreadable);
        }
    };
    let parsed =
        descriptor::read_descriptor(&descriptor_path).map_err(|source| ReconcileError::Descriptor {
            path: descriptor_path.clone(),
            source,
        })?;

    let mut draft = current.draft();
    let mut renamed_from = None;
    if let Some(title) = parsed.title.as_deref() {
        if title != current.title {
            renamed_from = Some(current.title.clone());
        }
        draft.title = title.to_string();
    }
    if let Some(version) = parsed.version.as_deref() {
        draft.mod_version = version.to_string();
    }
    if let Some(supported) = parsed.supported_version.as_deref() {
        draft.supported_game_version = supported.to_string();
    }
    draft.tags = parsed.tags;
    draft.required_mods = parsed.dependencies;

    let descriptor_dir = descriptor::containing_dir(&descriptor_path);
    if parsed.path.is_some() {
        draft.filepath = descriptor::resolve_filepath(parsed.path.as_deref(), &descriptor_dir);
    }
    if let Some(image) = descriptor::resolve_image(&draft.filepath, parsed.picture.as_deref()) {
        draft.image_path = Some(image);
    }

    let save = save_mod(game, index, draft, renamed_from.as_deref(), store)?;
    Ok(RefreshOutcome::Saved { save, renamed_from })
}

pub fn delete_mod(game: &mut Game, index: usize, store: &Store) -> ReconcileResult<Mod> {
    let game_id = ready_id(game)?;
    let current = game
        .mods
        .get(index)
        .ok_or(ReconcileError::NoSuchMod(index))?;
    if current.saved {
        if let Some(mod_id) = store.find_mod_id(game_id, &current.title, &current.filepath)? {
            store.delete_mod(mod_id, game_id)?;
        }
    }
    let mut removed = game.mods.remove(index);
    removed.mark_deleted();
    tracing::info!(game = %game.title, title = %removed.title, "mod deleted");
    Ok(removed)
}

pub fn save_all(game: &mut Game, store: &Store) -> ReconcileResult<Vec<String>> {
    let mut not_saved = Vec::new();
    for index in 0..game.mods.len() {
        if game.mods[index].is_deleted() {
            continue;
        }
        let draft = game.mods[index].draft();
        if let SaveOutcome::Rejected(rejection) = save_mod(game, index, draft, None, store)? {
            not_saved.push(match rejection {
                SaveRejection::EmptyTitle => untitled_label(&game.mods[index]),
                SaveRejection::Duplicate { title } => title,
            });
        }
    }
    Ok(not_saved)
}

fn untitled_label(entry: &Mod) -> String {
    if entry.filepath.as_os_str().is_empty() {
        "(untitled)".to_string()
    } else {
        format!("(untitled) {}", entry.filepath.display())
    }
}

pub fn refresh_all(game: &mut Game, store: &Store) -> ReconcileResult<Vec<String>> {
    let mut not_updated = Vec::new();
    for index in 0..game.mods.len() {
        let title = game.mods[index].title.clone();
        match refresh_from_descriptor(game, index, store) {
            Ok(RefreshOutcome::Unreadable) => not_updated.push(title),
            Ok(RefreshOutcome::Saved {
                save: SaveOutcome::Rejected(_),
                ..
            }) => not_updated.push(title),
            Ok(_) => {}
            Err(ReconcileError::Descriptor { path, source }) => {
                tracing::warn!(path = %path.display(), error = %source, "descriptor unreadable");
                not_updated.push(title);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(not_updated)
}

pub fn import_folder(game: &mut Game, folder: &Path) -> ReconcileResult<ImportReport> {
    ready_id(game)?;
    let candidates = scan::descriptor_candidates(folder).map_err(|source| ReconcileError::Folder {
        path: folder.to_path_buf(),
        source,
    })?;

    let mut report = ImportReport::default();
    for path in candidates {
        match add_from_descriptor(game, &path) {
            Ok(AddOutcome::Added { title, .. }) => report.added.push(title),
            Ok(AddOutcome::AlreadyAdded { title }) => report.already_added.push(title),
            Ok(AddOutcome::NoTitle) => report.untitled.push(path),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping descriptor");
                report.failures.push(ImportFailure {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }
    tracing::info!(
        game = %game.title,
        added = report.added.len(),
        skipped = report.already_added.len() + report.untitled.len() + report.failures.len(),
        "folder import finished"
    );
    Ok(report)
}
