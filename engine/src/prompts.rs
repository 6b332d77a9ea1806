use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use log::warn;
use serde::Deserialize;

use crate::error::LoadError;

/// One image to generate. `name` becomes the file stem of the output, it is
/// used verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PromptItem {
    pub name: String,
    pub prompt: String,
}

impl PromptItem {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
        }
    }

    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.png", self.name))
    }
}

/// Reads a JSON array of `{"name": .., "prompt": ..}` objects, keeping their order.
pub fn load_prompts(path: &Path) -> Result<Vec<PromptItem>, LoadError> {
    let src = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::PromptsFileNotFound(path.to_owned()),
        _ => LoadError::Read {
            path: path.to_owned(),
            source,
        },
    })?;

    let items: Vec<PromptItem> = serde_json::from_str(&src).map_err(|source| LoadError::Parse {
        path: path.to_owned(),
        source,
    })?;

    let mut seen = HashSet::new();
    for item in &items {
        if !seen.insert(item.name.as_str()) {
            warn!(
                "Duplicate prompt name '{}', later items overwrite {}.png",
                item.name, item.name
            );
        }
    }

    Ok(items)
}
