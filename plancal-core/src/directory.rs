//! Group / sub-group directory.
//!
//! The directory is produced by a separate collection step and stored as JSON:
//! `{ "<group name>": [["<sub-group name>", <id>], ...], ... }`. Key order in the
//! file is the order groups are processed in.

use std::path::Path;

use serde::Deserialize;

use crate::error::{PlancalError, PlancalResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubGroup {
    pub name: String,
    /// Opaque timetable id; fetch key and output filename stem.
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub sub_groups: Vec<SubGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    pub groups: Vec<Group>,
}

/// Ids show up both as JSON strings and numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for SubGroup {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (name, id): (String, RawId) = Deserialize::deserialize(deserializer)?;
        Ok(SubGroup {
            name,
            id: id.into(),
        })
    }
}

impl Directory {
    pub fn load(path: &Path) -> PlancalResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlancalError::Directory(format!("Could not read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> PlancalResult<Self> {
        // serde_json's Map keeps insertion order with `preserve_order`
        let map: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(content).map_err(|e| PlancalError::Directory(e.to_string()))?;

        let groups = map
            .into_iter()
            .map(|(name, value)| {
                let sub_groups: Vec<SubGroup> = serde_json::from_value(value).map_err(|e| {
                    PlancalError::Directory(format!("Group '{name}': {e}"))
                })?;
                if let Some(bad) = sub_groups.iter().find(|s| !is_safe_id(&s.id)) {
                    return Err(PlancalError::Directory(format!(
                        "Group '{name}': sub-group '{}' has unusable id '{}'",
                        bad.name, bad.id
                    )));
                }
                Ok(Group { name, sub_groups })
            })
            .collect::<PlancalResult<Vec<_>>>()?;

        Ok(Directory { groups })
    }

    pub fn sub_group_count(&self) -> usize {
        self.groups.iter().map(|g| g.sub_groups.len()).sum()
    }
}

/// Ids become file names under the schedules directory.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}
