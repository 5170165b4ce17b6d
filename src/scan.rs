use std::{
    io,
    path::{Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

const DESCRIPTOR_EXTENSIONS: [&str; 2] = ["mod", "txt"];
const IMAGE_EXTENSIONS: [&str; 2] = ["png", "jpg"];

fn folder_entries(folder: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        entries.push(entry.map_err(io::Error::from)?);
    }
    Ok(entries)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

pub fn is_descriptor_file(path: &Path) -> bool {
    has_extension(path, &DESCRIPTOR_EXTENSIONS)
}

pub fn find_mod_descriptor(folder: &Path) -> io::Result<Option<PathBuf>> {
    Ok(folder_entries(folder)?
        .into_iter()
        .find(|entry| entry.file_type().is_file() && has_extension(entry.path(), &["mod"]))
        .map(DirEntry::into_path))
}

pub fn first_image(folder: &Path) -> Option<PathBuf> {
    let entries = folder_entries(folder).ok()?;
    entries
        .into_iter()
        .find(|entry| entry.file_type().is_file() && has_extension(entry.path(), &IMAGE_EXTENSIONS))
        .map(DirEntry::into_path)
}

// A collection folder holds either descriptor files directly or one folder per
// mod. Inside a mod folder a `.mod` file is authoritative, so scanning that
// folder stops at the first one.
pub fn descriptor_candidates(folder: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in folder_entries(folder)? {
        if entry.file_type().is_dir() {
            let nested = match folder_entries(entry.path()) {
                Ok(nested) => nested,
                Err(err) => {
                    tracing::warn!(
                        folder = %entry.path().display(),
                        error = %err,
                        "skipping unreadable mod folder"
                    );
                    continue;
                }
            };
            for file in nested {
                if !file.file_type().is_file() || !is_descriptor_file(file.path()) {
                    continue;
                }
                let is_mod = has_extension(file.path(), &["mod"]);
                out.push(file.into_path());
                if is_mod {
                    break;
                }
            }
        } else if entry.file_type().is_file() && is_descriptor_file(entry.path()) {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"name=\"x\"\n").unwrap();
    }

    #[test]
    fn test_candidates_from_flat_and_nested_layouts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("loose.mod"));
        touch(&root.join("readme.md"));
        touch(&root.join("alpha/a_notes.txt"));
        touch(&root.join("alpha/descriptor.mod"));
        touch(&root.join("alpha/z_later.txt"));
        touch(&root.join("beta/descriptor.mod"));

        let found = descriptor_candidates(root).unwrap();
        assert_eq!(
            found,
            vec![
                root.join("alpha/a_notes.txt"),
                root.join("alpha/descriptor.mod"),
                root.join("beta/descriptor.mod"),
                root.join("loose.mod"),
            ]
        );
    }

    #[test]
    fn test_candidates_fail_for_missing_folder() {
        let temp = TempDir::new().unwrap();
        assert!(descriptor_candidates(&temp.path().join("absent")).is_err());
    }

    #[test]
    fn test_find_mod_descriptor_ignores_txt() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("a.txt"));
        assert_eq!(find_mod_descriptor(temp.path()).unwrap(), None);
        touch(&temp.path().join("b.MOD"));
        assert_eq!(
            find_mod_descriptor(temp.path()).unwrap(),
            Some(temp.path().join("b.MOD"))
        );
    }

    #[test]
    fn test_first_image_skips_other_files() {
        let temp = TempDir::new().unwrap();
        assert_eq!(first_image(temp.path()), None);
        touch(&temp.path().join("a.txt"));
        touch(&temp.path().join("cover.png"));
        assert_eq!(first_image(temp.path()), Some(temp.path().join("cover.png")));
        assert_eq!(first_image(&temp.path().join("absent")), None);
    }
}
