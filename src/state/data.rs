/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the database layer and the UI layer. Optional text fields use the empty
/// string for "not set"; the library stores those as NULL.
use std::fmt;
use std::str::FromStr;

/// Choices for the project "Type" selector. The empty entry means unset.
pub const PROJECT_TYPES: [&str; 5] = ["", "Game", "Application", "Tool", "Other"];

/// Choices for the project "Intended use" selector.
pub const PROJECT_USAGES: [&str; 4] = ["", "Personal", "Commercial", "Mixed / Undecided"];

/// Choices for the project "Status" selector.
pub const PROJECT_STATUSES: [&str; 4] = ["", "In development", "Released", "Archived"];

/// License value that requires a free-text custom license.
pub const OTHER_LICENSE: &str = "Other...";

/// Default license for a fresh asset form.
pub const UNKNOWN_LICENSE: &str = "Unknown";

/// Every license offered by the license selector, in display order.
pub const LICENSE_OPTIONS: [&str; 12] = [
    UNKNOWN_LICENSE,
    "CC0",
    "CC BY",
    "CC BY-SA",
    "CC BY-NC",
    "CC BY-NC-SA",
    "MIT",
    "GPL",
    "LGPL",
    "Proprietary",
    "Public domain (as stated)",
    OTHER_LICENSE,
];

/// Mutable fields of a project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFields {
    pub name: String,
    /// Game / Application / Tool / Other, or empty
    pub project_type: String,
    /// Personal / Commercial / Mixed / Undecided, or empty
    pub usage: String,
    /// In development / Released / Archived, or empty
    pub status: String,
    pub notes: String,
    /// Show the "Legal details" group for this project's assets
    pub use_legal_details: bool,
    /// Show the "Usage" group for this project's assets
    pub use_project_usage: bool,
    /// Reserved column, always stored as false
    pub use_tags: bool,
    /// Show the "Notes" group for this project's assets
    pub use_asset_notes: bool,
}

/// Represents a single project in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Unique database ID
    pub id: i64,
    pub fields: ProjectFields,
}

impl Project {
    /// Secondary line for the project list, e.g. "Game · Released"
    pub fn meta_line(&self) -> String {
        [&self.fields.project_type, &self.fields.status]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

/// Answer for the three legal permission fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Permission {
    #[default]
    Unset,
    Yes,
    No,
    NotClear,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::Unset,
        Permission::Yes,
        Permission::No,
        Permission::NotClear,
    ];

    /// Stored/reported form; empty for `Unset`
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Unset => "",
            Permission::Yes => "Yes",
            Permission::No => "No",
            Permission::NotClear => "Not clear",
        }
    }

    pub fn is_set(&self) -> bool {
        *self != Permission::Unset
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Unset => f.write_str("(not set)"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(Permission::Unset),
            "Yes" => Ok(Permission::Yes),
            "No" => Ok(Permission::No),
            "Not clear" => Ok(Permission::NotClear),
            other => Err(format!("unknown permission value '{other}'")),
        }
    }
}

/// Mutable fields of an asset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFields {
    /// Name / description (required)
    pub name: String,
    /// Built-in or custom type label
    pub asset_type: String,
    /// Source / author
    pub author: String,
    pub source_url: String,
    /// ISO `YYYY-MM-DD`, stored verbatim
    pub download_date: String,
    pub license_type: String,
    /// Required when `license_type` is "Other..."
    pub custom_license: String,
    pub allow_commercial: Permission,
    pub allow_modifications: Permission,
    pub require_attribution: Permission,
    pub attribution_text: String,
    /// "Where used" in the project
    pub project_usage: String,
    pub internal_notes: String,
    /// Reserved column, unused
    pub tags: String,
    /// File or folder holding the license evidence
    pub proof_path: String,
}

/// Represents a single asset owned by a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Unique database ID
    pub id: i64,
    /// Owning project
    pub project_id: i64,
    pub fields: AssetFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_parses_stored_values() {
        for permission in Permission::ALL {
            assert_eq!(permission.as_str().parse::<Permission>(), Ok(permission));
        }
        assert!("Maybe".parse::<Permission>().is_err());
    }

    #[test]
    fn meta_line_skips_empty_parts() {
        let mut project = Project {
            id: 1,
            fields: ProjectFields {
                name: "Platformer Demo".into(),
                project_type: "Game".into(),
                ..Default::default()
            },
        };
        assert_eq!(project.meta_line(), "Game");

        project.fields.status = "Released".into();
        assert_eq!(project.meta_line(), "Game · Released");

        project.fields.project_type.clear();
        project.fields.status.clear();
        assert_eq!(project.meta_line(), "");
    }
}
