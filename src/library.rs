use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DELETED_GAME_ID: i64 = -1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mod {
    pub game_id: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub mod_version: String,
    pub supported_game_version: String,
    pub required_mods: Vec<String>,
    pub incompatible_mods: Vec<String>,
    pub commentary: String,
    pub filepath: PathBuf,
    #[serde(default)]
    pub image_path: Option<PathBuf>,
    #[serde(default)]
    pub saved: bool,
}

impl Mod {
    pub fn blank(game_id: i64) -> Self {
        Self {
            game_id,
            ..Self::default()
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.game_id == DELETED_GAME_ID
    }

    pub fn mark_deleted(&mut self) {
        self.game_id = DELETED_GAME_ID;
        self.saved = false;
    }

    pub fn same_key(&self, title: &str, filepath: &Path) -> bool {
        self.title == title && self.filepath == filepath
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|entry| entry == tag)
    }

    pub fn requires(&self, title: &str) -> bool {
        contains_entry(&self.required_mods, title)
    }

    pub fn incompatible_with(&self, title: &str) -> bool {
        contains_entry(&self.incompatible_mods, title)
    }

    pub fn draft(&self) -> ModDraft {
        ModDraft {
            title: self.title.clone(),
            tags: self.tags.clone(),
            mod_version: self.mod_version.clone(),
            supported_game_version: self.supported_game_version.clone(),
            required_mods: self.required_mods.clone(),
            incompatible_mods: self.incompatible_mods.clone(),
            commentary: self.commentary.clone(),
            filepath: self.filepath.clone(),
            image_path: self.image_path.clone(),
        }
    }

    pub fn apply(&mut self, draft: ModDraft) {
        self.title = draft.title;
        self.tags = draft.tags;
        self.mod_version = draft.mod_version;
        self.supported_game_version = draft.supported_game_version;
        self.required_mods = draft.required_mods;
        self.incompatible_mods = draft.incompatible_mods;
        self.commentary = draft.commentary;
        self.filepath = draft.filepath;
        self.image_path = draft.image_path;
    }
}

// Editable values of a mod as the user (or a fresh descriptor) left them,
// not yet written back into the entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModDraft {
    pub title: String,
    pub tags: Vec<String>,
    pub mod_version: String,
    pub supported_game_version: String,
    pub required_mods: Vec<String>,
    pub incompatible_mods: Vec<String>,
    pub commentary: String,
    pub filepath: PathBuf,
    pub image_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModOrder {
    #[default]
    Insertion,
    Alphabetical,
    SupportedVersion,
}

impl ModOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "insertion" | "order" => Some(ModOrder::Insertion),
            "name" | "alphabetical" => Some(ModOrder::Alphabetical),
            "version" | "supported_version" => Some(ModOrder::SupportedVersion),
            _ => None,
        }
    }

    pub fn sort<'a>(self, mods: &'a [Mod]) -> Vec<&'a Mod> {
        let mut sorted: Vec<&Mod> = mods.iter().collect();
        match self {
            ModOrder::Insertion => {}
            ModOrder::Alphabetical => sorted.sort_by(|a, b| a.title.cmp(&b.title)),
            ModOrder::SupportedVersion => {
                sorted.sort_by(|a, b| b.supported_game_version.cmp(&a.supported_game_version))
            }
        }
        sorted
    }
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|item| !item.trim().is_empty())
        .map(|item| item.to_string())
        .collect()
}

pub fn join_list(items: &[String]) -> String {
    items.join(",")
}

fn contains_entry(list: &[String], title: &str) -> bool {
    let title = title.trim();
    list.iter().any(|entry| entry.trim() == title)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str, version: &str) -> Mod {
        Mod {
            title: title.to_string(),
            supported_game_version: version.to_string(),
            ..Mod::blank(1)
        }
    }

    #[test]
    fn split_list_keeps_items_verbatim() {
        assert_eq!(split_list("a, b,c"), vec!["a", " b", "c"]);
    }

    #[test]
    fn split_list_drops_blank_items() {
        assert!(split_list("").is_empty());
        assert_eq!(split_list("a,, ,b"), vec!["a", "b"]);
    }

    #[test]
    fn join_list_uses_plain_commas() {
        let items = vec!["Gameplay".to_string(), "Fixes".to_string()];
        assert_eq!(join_list(&items), "Gameplay,Fixes");
        assert_eq!(split_list(&join_list(&items)), items);
    }

    #[test]
    fn relation_membership_is_exact_on_trimmed_entries() {
        let mut entry = Mod::blank(1);
        entry.required_mods = split_list("Core, Extended UI");
        assert!(entry.requires("Extended UI"));
        assert!(entry.requires("Core"));
        assert!(!entry.requires("extended ui"));
        assert!(!entry.requires("Extended"));
    }

    #[test]
    fn mark_deleted_sets_sentinel() {
        let mut entry = titled("A", "1.0");
        entry.saved = true;
        entry.mark_deleted();
        assert!(entry.is_deleted());
        assert!(!entry.saved);
        assert_eq!(entry.game_id, DELETED_GAME_ID);
    }

    #[test]
    fn draft_round_trips_editable_fields() {
        let mut entry = titled("A", "1.9");
        entry.saved = true;
        let mut draft = entry.draft();
        draft.title = "B".to_string();
        entry.apply(draft);
        assert_eq!(entry.title, "B");
        assert_eq!(entry.supported_game_version, "1.9");
        assert!(entry.saved);
        assert_eq!(entry.game_id, 1);
    }

    #[test]
    fn orders_by_title_and_by_version_descending() {
        let mods = vec![titled("b", "1.2"), titled("a", "1.10"), titled("c", "1.3")];
        let names: Vec<&str> = ModOrder::Alphabetical
            .sort(&mods)
            .iter()
            .map(|m| m.title.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let names: Vec<&str> = ModOrder::SupportedVersion
            .sort(&mods)
            .iter()
            .map(|m| m.title.as_str())
            .collect();
        assert_eq!(names, vec!["c", "b", "a"]);

        let names: Vec<&str> = ModOrder::Insertion
            .sort(&mods)
            .iter()
            .map(|m| m.title.as_str())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
