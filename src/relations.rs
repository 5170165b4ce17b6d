use crate::library::Mod;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Related,
    Incompatible,
    Neutral,
}

impl Highlight {
    pub fn label(self) -> &'static str {
        match self {
            Highlight::Related => "related",
            Highlight::Incompatible => "incompatible",
            Highlight::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no mod titled '{0}'")]
pub struct NoSuchMod(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightMode {
    Tags,
    Version,
    Relations,
}

impl HighlightMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tags" | "tag" => Some(HighlightMode::Tags),
            "version" => Some(HighlightMode::Version),
            "relations" | "requirements" => Some(HighlightMode::Relations),
            _ => None,
        }
    }
}

pub fn highlight(
    mode: HighlightMode,
    mods: &[Mod],
    query: &str,
) -> Result<Vec<Highlight>, NoSuchMod> {
    match mode {
        HighlightMode::Tags => Ok(highlight_tags(mods, query)),
        HighlightMode::Version => Ok(highlight_version(mods, query)),
        HighlightMode::Relations => highlight_relations(mods, query),
    }
}

fn related_if(matched: bool) -> Highlight {
    if matched {
        Highlight::Related
    } else {
        Highlight::Neutral
    }
}

pub fn highlight_tags(mods: &[Mod], query: &str) -> Vec<Highlight> {
    let tokens: Vec<&str> = query
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();
    mods.iter()
        .map(|entry| related_if(tokens.iter().any(|token| entry.has_tag(token))))
        .collect()
}

pub fn highlight_version(mods: &[Mod], query: &str) -> Vec<Highlight> {
    mods.iter()
        .map(|entry| related_if(entry.supported_game_version == query))
        .collect()
}

// Both directions count: a mod is flagged when it names the queried mod or is
// named by it. Incompatibility wins over a requirement.
pub fn highlight_relations(mods: &[Mod], title: &str) -> Result<Vec<Highlight>, NoSuchMod> {
    let title = title.trim();
    let queried = mods
        .iter()
        .find(|entry| entry.title == title)
        .ok_or_else(|| NoSuchMod(title.to_string()))?;

    Ok(mods
        .iter()
        .map(|entry| {
            if entry.incompatible_with(title) || queried.incompatible_with(&entry.title) {
                Highlight::Incompatible
            } else if entry.requires(title) || queried.requires(&entry.title) {
                Highlight::Related
            } else {
                Highlight::Neutral
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::split_list;

    fn entry(title: &str) -> Mod {
        Mod {
            title: title.to_string(),
            ..Mod::blank(1)
        }
    }

    #[test]
    fn incompatibility_is_symmetric() {
        let mut a = entry("A");
        a.incompatible_mods = split_list("B");
        let mods = vec![a, entry("B"), entry("C")];

        let from_a = highlight_relations(&mods, "A").unwrap();
        assert_eq!(from_a[1], Highlight::Incompatible);
        assert_eq!(from_a[2], Highlight::Neutral);

        let from_b = highlight_relations(&mods, "B").unwrap();
        assert_eq!(from_b[0], Highlight::Incompatible);
        assert_eq!(from_b[2], Highlight::Neutral);
    }

    #[test]
    fn requirements_mark_related_both_ways() {
        let mut a = entry("A");
        a.required_mods = split_list("Core");
        let mods = vec![a, entry("Core"), entry("Other")];

        assert_eq!(
            highlight_relations(&mods, "Core").unwrap(),
            vec![Highlight::Related, Highlight::Neutral, Highlight::Neutral]
        );
        assert_eq!(
            highlight_relations(&mods, " A ").unwrap(),
            vec![Highlight::Neutral, Highlight::Related, Highlight::Neutral]
        );
    }

    #[test]
    fn incompatibility_takes_precedence() {
        let mut a = entry("A");
        a.required_mods = split_list("B");
        let mut b = entry("B");
        b.incompatible_mods = split_list("A");
        let mods = vec![a, b];
        assert_eq!(
            highlight_relations(&mods, "A").unwrap()[1],
            Highlight::Incompatible
        );
    }

    #[test]
    fn unknown_title_is_an_error() {
        let mods = vec![entry("A")];
        assert_eq!(
            highlight_relations(&mods, "Missing"),
            Err(NoSuchMod("Missing".to_string()))
        );
    }

    #[test]
    fn tags_match_any_trimmed_token() {
        let mut a = entry("A");
        a.tags = split_list("Gameplay,Fixes");
        let mut b = entry("B");
        b.tags = split_list("Graphics");
        let mods = vec![a, b, entry("C")];
        assert_eq!(
            highlight_tags(&mods, "Fixes , Graphics,"),
            vec![Highlight::Related, Highlight::Related, Highlight::Neutral]
        );
        assert_eq!(
            highlight_tags(&mods, "fixes"),
            vec![Highlight::Neutral, Highlight::Neutral, Highlight::Neutral]
        );
    }

    #[test]
    fn version_match_is_exact() {
        let mut a = entry("A");
        a.supported_game_version = "3.10.*".to_string();
        let mut b = entry("B");
        b.supported_game_version = "3.9".to_string();
        let mods = vec![a, b];
        assert_eq!(
            highlight(HighlightMode::Version, &mods, "3.10.*").unwrap(),
            vec![Highlight::Related, Highlight::Neutral]
        );
    }
}
