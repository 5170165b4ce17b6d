use crate::scan;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub title: Option<String>,
    pub version: Option<String>,
    pub supported_version: Option<String>,
    pub path: Option<String>,
    pub picture: Option<String>,
    pub tags: Vec<String>,
    pub dependencies: Vec<String>,
}

impl Descriptor {
    pub fn usable_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }

    pub fn resolve(self, descriptor_path: &Path) -> ResolvedDescriptor {
        let descriptor_dir = containing_dir(descriptor_path);
        let filepath = resolve_filepath(self.path.as_deref(), &descriptor_dir);
        let image_path = resolve_image(&filepath, self.picture.as_deref());
        ResolvedDescriptor {
            descriptor: self,
            filepath,
            image_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDescriptor {
    pub descriptor: Descriptor,
    pub filepath: PathBuf,
    pub image_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKey {
    Tags,
    Dependencies,
}

pub fn read_descriptor(path: &Path) -> io::Result<Descriptor> {
    let raw = fs::read_to_string(path)?;
    let descriptor = parse_descriptor(&raw);
    tracing::debug!(
        path = %path.display(),
        title = descriptor.title.as_deref().unwrap_or(""),
        tags = descriptor.tags.len(),
        dependencies = descriptor.dependencies.len(),
        "parsed descriptor"
    );
    Ok(descriptor)
}

pub fn parse_descriptor(text: &str) -> Descriptor {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut descriptor = Descriptor::default();
    let mut open_list: Option<ListKey> = None;

    for line in text.lines() {
        if !(line.contains('=') || line.contains('\t') || line.contains('}')) {
            continue;
        }

        if let Some(list) = open_list {
            if line.contains('}') {
                open_list = None;
                continue;
            }
            let item = clean_value(line);
            if !item.is_empty() && item != "{" {
                list_for(&mut descriptor, list).push(item.to_string());
            }
            continue;
        }

        let Some((raw_key, rest)) = line.split_once('=') else {
            continue;
        };
        let rest = match rest.find('#') {
            Some(index) => &rest[..index],
            None => rest,
        };
        let value = clean_value(rest);

        match raw_key.trim() {
            "name" | "title" => descriptor.title = Some(value.to_string()),
            "version" => descriptor.version = Some(value.to_string()),
            "supported_version" => descriptor.supported_version = Some(value.to_string()),
            "path" | "archive" => descriptor.path = Some(value.to_string()),
            "picture" | "poster" => descriptor.picture = Some(value.to_string()),
            "tags" => open_list = open_block(&mut descriptor, ListKey::Tags, rest),
            "dependencies" => {
                open_list = open_block(&mut descriptor, ListKey::Dependencies, rest)
            }
            _ => {}
        }
    }

    descriptor
}

// Items written on the opening line itself (`tags = { "a" "b" }`) are taken
// from that line; the block only stays open when no `}` follows them.
fn open_block(descriptor: &mut Descriptor, list: ListKey, rest: &str) -> Option<ListKey> {
    let Some(start) = rest.find('{') else {
        return Some(list);
    };
    let inline = &rest[start + 1..];
    let (items, closed) = match inline.find('}') {
        Some(end) => (&inline[..end], true),
        None => (inline, false),
    };
    list_for(descriptor, list).extend(inline_items(items));
    if closed {
        None
    } else {
        Some(list)
    }
}

fn inline_items(segment: &str) -> Vec<String> {
    if segment.contains('"') {
        segment
            .split('"')
            .skip(1)
            .step_by(2)
            .filter(|item| !item.is_empty())
            .map(|item| item.to_string())
            .collect()
    } else {
        segment
            .split_whitespace()
            .map(|item| item.to_string())
            .collect()
    }
}

fn list_for(descriptor: &mut Descriptor, list: ListKey) -> &mut Vec<String> {
    match list {
        ListKey::Tags => &mut descriptor.tags,
        ListKey::Dependencies => &mut descriptor.dependencies,
    }
}

fn clean_value(raw: &str) -> &str {
    raw.trim_matches(|c: char| c == '"' || c.is_whitespace())
}

pub fn containing_dir(descriptor_path: &Path) -> PathBuf {
    descriptor_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

pub fn resolve_filepath(path_value: Option<&str>, descriptor_dir: &Path) -> PathBuf {
    match path_value {
        Some(value) if !value.is_empty() && Path::new(value).exists() => PathBuf::from(value),
        _ => descriptor_dir.to_path_buf(),
    }
}

pub fn resolve_image(filepath: &Path, picture: Option<&str>) -> Option<PathBuf> {
    if let Some(picture) = picture.filter(|value| !value.is_empty()) {
        let candidate = filepath.join(picture);
        if candidate.is_file() {
            return Some(candidate);
        }
        tracing::debug!(
            picture = %candidate.display(),
            "descriptor picture not found, scanning mod folder"
        );
    }
    scan::first_image(filepath)
}
