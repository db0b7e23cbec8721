/// Asset-type catalog
///
/// Asset types are plain strings on the asset rows. Built-in types are a
/// fixed list; every other type in use is "custom". The distinction is
/// derived from the live usage counts, never stored.
use std::collections::BTreeMap;
use std::fmt;

use super::error::{LedgerError, LedgerResult};

/// Types that are always offered, whether or not anything uses them
pub const BUILTIN_ASSET_TYPES: [&str; 6] = [
    "Image / Sprite / Tileset",
    "Music",
    "SFX",
    "Font",
    "Code",
    "3D model",
];

/// Selector entry that switches the form to free-text type entry
pub const CUSTOM_TYPE_CHOICE: &str = "Other… (custom)";

pub type TypeUsage = BTreeMap<String, usize>;

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_ASSET_TYPES.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOrigin {
    BuiltIn,
    Custom,
}

impl fmt::Display for TypeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeOrigin::BuiltIn => f.write_str("Built-in"),
            TypeOrigin::Custom => f.write_str("Custom"),
        }
    }
}

/// One row of the "Manage asset types" table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub name: String,
    pub origin: TypeOrigin,
    /// Number of assets (all projects) using this type
    pub usage: usize,
}

fn sorted_case_insensitive(mut names: Vec<String>) -> Vec<String> {
    names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    names
}

fn builtins_sorted() -> Vec<String> {
    sorted_case_insensitive(BUILTIN_ASSET_TYPES.iter().map(|s| s.to_string()).collect())
}

/// Custom types currently in use, sorted case-insensitively
pub fn custom_types(usage: &TypeUsage) -> Vec<String> {
    sorted_case_insensitive(
        usage
            .keys()
            .filter(|name| !name.is_empty() && !is_builtin(name))
            .cloned()
            .collect(),
    )
}

/// Built-in types first (count 0 when unused), then custom types
pub fn catalog_entries(usage: &TypeUsage) -> Vec<TypeEntry> {
    let builtins = builtins_sorted().into_iter().map(|name| TypeEntry {
        usage: usage.get(&name).copied().unwrap_or(0),
        name,
        origin: TypeOrigin::BuiltIn,
    });
    let customs = custom_types(usage).into_iter().map(|name| TypeEntry {
        usage: usage.get(&name).copied().unwrap_or(0),
        name,
        origin: TypeOrigin::Custom,
    });
    builtins.chain(customs).collect()
}

/// Options for the per-asset type selector: empty, built-ins, customs, custom entry
pub fn selector_options(usage: &TypeUsage) -> Vec<String> {
    let mut options = vec![String::new()];
    options.extend(builtins_sorted());
    options.extend(custom_types(usage));
    options.push(CUSTOM_TYPE_CHOICE.to_string());
    options
}

/// Check a rename of custom type `old` to `new` before touching storage.
/// Returns the trimmed new name.
pub fn validate_rename(usage: &TypeUsage, old: &str, new: &str) -> LedgerResult<String> {
    if is_builtin(old) {
        return Err(LedgerError::validation("Built-in asset types cannot be renamed."));
    }
    let new = new.trim();
    if new.is_empty() {
        return Err(LedgerError::validation("The new type name cannot be empty."));
    }
    if new == old {
        return Err(LedgerError::validation("The new name is the same as the current one."));
    }
    if is_builtin(new) {
        return Err(LedgerError::validation(
            "You cannot rename a custom type to match a built-in type.",
        ));
    }
    if usage.contains_key(new) {
        return Err(LedgerError::validation(
            "There is already an asset type with that name.",
        ));
    }
    Ok(new.to_string())
}

/// What deleting a custom type involves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePlan {
    /// Nothing references the type; confirming is enough.
    Unused,
    /// `usage` assets must be moved to one of `candidates` first.
    Reassign { usage: usize, candidates: Vec<String> },
}

pub fn plan_delete(usage: &TypeUsage, name: &str) -> LedgerResult<DeletePlan> {
    if is_builtin(name) {
        return Err(LedgerError::validation("Built-in asset types cannot be deleted."));
    }

    let used = usage.get(name).copied().unwrap_or(0);
    if used == 0 {
        return Ok(DeletePlan::Unused);
    }

    let mut candidates: Vec<String> = BUILTIN_ASSET_TYPES
        .iter()
        .map(|s| s.to_string())
        .chain(usage.keys().cloned())
        .filter(|candidate| !candidate.is_empty() && candidate != name)
        .collect();
    candidates.sort();
    candidates.dedup();

    if candidates.is_empty() {
        return Err(LedgerError::validation(
            "There is no other asset type to reassign these assets to.",
        ));
    }

    Ok(DeletePlan::Reassign {
        usage: used,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(pairs: &[(&str, usize)]) -> TypeUsage {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn entries_list_builtins_then_customs() {
        let entries = catalog_entries(&usage(&[("Music", 2), ("shader", 1), ("Pixel-font", 3)]));

        assert_eq!(entries.len(), 8);
        assert!(entries[..6].iter().all(|e| e.origin == TypeOrigin::BuiltIn));
        assert_eq!(entries[0].name, "3D model");
        let music = entries.iter().find(|e| e.name == "Music").unwrap();
        assert_eq!(music.usage, 2);
        let code = entries.iter().find(|e| e.name == "Code").unwrap();
        assert_eq!(code.usage, 0);

        let customs: Vec<_> = entries[6..].iter().map(|e| e.name.as_str()).collect();
        assert_eq!(customs, ["Pixel-font", "shader"]);
    }

    #[test]
    fn selector_wraps_known_types() {
        let options = selector_options(&usage(&[("Voice lines", 1), ("SFX", 4)]));
        assert_eq!(options.first().map(String::as_str), Some(""));
        assert_eq!(options.last().map(String::as_str), Some(CUSTOM_TYPE_CHOICE));
        assert!(options.contains(&"Voice lines".to_string()));
        assert_eq!(options.iter().filter(|o| o.as_str() == "SFX").count(), 1);
    }

    #[test]
    fn rename_rejects_collisions() {
        let current = usage(&[("Pixel-font", 3), ("Shader", 1)]);

        assert!(validate_rename(&current, "Music", "Tunes").is_err());
        assert!(validate_rename(&current, "Pixel-font", "Font").is_err());
        assert!(validate_rename(&current, "Pixel-font", "Shader").is_err());
        assert!(validate_rename(&current, "Pixel-font", "  ").is_err());
        assert!(validate_rename(&current, "Pixel-font", "Pixel-font").is_err());
        assert_eq!(
            validate_rename(&current, "Pixel-font", " Bitmap font ").unwrap(),
            "Bitmap font"
        );
        // Exact match only: a different case is a different type.
        assert!(validate_rename(&current, "Pixel-font", "shader").is_ok());
    }

    #[test]
    fn unused_custom_type_needs_only_confirmation() {
        let plan = plan_delete(&usage(&[("Music", 1)]), "Old label").unwrap();
        assert_eq!(plan, DeletePlan::Unused);
    }

    #[test]
    fn used_custom_type_needs_reassignment() {
        let plan = plan_delete(&usage(&[("Pixel-font", 3), ("Shader", 1)]), "Pixel-font").unwrap();
        match plan {
            DeletePlan::Reassign { usage, candidates } => {
                assert_eq!(usage, 3);
                assert!(candidates.contains(&"Font".to_string()));
                assert!(candidates.contains(&"Shader".to_string()));
                assert!(!candidates.contains(&"Pixel-font".to_string()));
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn builtins_cannot_be_deleted() {
        assert!(plan_delete(&usage(&[("Font", 2)]), "Font").is_err());
    }
}
