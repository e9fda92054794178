//! A module which contains some utility functions
use serde::{de::DeserializeOwned, Serialize};
use std::{
    env,
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use super::PriceResult;

/// Write something which can be serialized to a json file at the specified path.
/// Returns an Error if the file can't be written or the directory can't be created.
pub fn write_serializable_to_json<P: AsRef<Path>>(
    output: &impl Serialize,
    path: P,
) -> PriceResult<()> {
    let json_string = serde_json::to_string_pretty(output)?;

    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file_handle = File::create(path)?;
    file_handle.write_all(json_string.as_bytes())?;

    Ok(())
}

/// Read a json file at the specified path into something deserializable.
/// Returns an Error if the file can't be opened or does not contain a valid `T`.
pub fn read_deserializable_from_json<T, P>(path: P) -> PriceResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file_handle = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file_handle))?)
}

/// Finds the project root, that is the root of the git repo.
/// In particular, this will return the path to the closest ancestor to the current working directory,
/// which contains a `.git` folder.
/// If no such ancestor is found, the current working directory is retuned.
pub fn find_project_root() -> PriceResult<PathBuf> {
    let cwd = env::current_dir()?;

    #[allow(clippy::redundant_closure)]
    Ok(cwd
        .ancestors()
        .find(|ancestor| has_git_directory(ancestor))
        .map(PathBuf::from)
        .unwrap_or_else(|| cwd))
}

fn has_git_directory<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    let mut path_buf = path.as_ref().to_path_buf();
    path_buf.push(".git");
    // This also checks if the path exists.
    path_buf.is_dir()
}

/// Gives you either the given path or your specified relative path on the project root.
/// If `path = Some(path_buf)` returns cloned `path_buf`, else `project_root/{relative_path}`
pub fn path_or_relative_to_project_root(
    path: Option<&PathBuf>,
    relative_path: &str,
) -> PriceResult<PathBuf> {
    match path {
        Some(path) => Ok(path.clone()),
        None => {
            let mut result = find_project_root()?;
            result.push(relative_path);
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn json_written_can_be_read_back() {
        let mut path = env::temp_dir();
        path.push(format!("immo_price_util_{}", std::process::id()));
        path.push("nested/values.json");

        let mut values = BTreeMap::new();
        values.insert("living_area (m²)".to_string(), 180.0);
        values.insert("terrace_area (m²)".to_string(), 20.0);

        write_serializable_to_json(&values, &path).unwrap();
        let read: BTreeMap<String, f64> = read_deserializable_from_json(&path).unwrap();

        assert_eq!(read, values);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn explicit_path_wins_over_project_root() {
        let explicit = PathBuf::from("/tmp/model.json");
        let result = path_or_relative_to_project_root(Some(&explicit), "models/model.json");
        assert_eq!(result.unwrap(), explicit);
    }
}
