/// Project report export
///
/// `build_report` turns a project snapshot into text and has no side effects.
/// `write_report` is the fallible part: it writes a temporary file next to
/// the target and renames it into place, so a failed export never leaves a
/// half-written file behind.
use std::fmt;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::state::data::{Asset, Project};
use crate::state::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    PlainText,
    Markdown,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::PlainText => "txt",
            ReportFormat::Markdown => "md",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::PlainText => f.write_str("Plain text"),
            ReportFormat::Markdown => f.write_str("Markdown"),
        }
    }
}

/// Line prefixes for one output format
struct Layout {
    field: &'static str,
    block: &'static str,
    nested: &'static str,
    continuation: &'static str,
}

const PLAIN: Layout = Layout {
    field: "   ",
    block: "   ",
    nested: "      ",
    continuation: "         ",
};

const MARKDOWN: Layout = Layout {
    field: "- ",
    block: "- ",
    nested: "  - ",
    continuation: "    ",
};

/// Build the report for `project` and its `assets` (already in list order)
pub fn build_report(project: &Project, assets: &[Asset], format: ReportFormat) -> String {
    let markdown = format == ReportFormat::Markdown;
    let layout = if markdown { &MARKDOWN } else { &PLAIN };
    let p = &project.fields;
    let mut lines: Vec<String> = Vec::new();

    // Header
    if markdown {
        lines.push(format!("# Project: {}", p.name));
    } else {
        lines.push(format!("Project: {}", p.name));
    }
    let header_prefix = if markdown { "- " } else { "" };
    for (label, value) in [
        ("Type", &p.project_type),
        ("Intended use", &p.usage),
        ("Status", &p.status),
    ] {
        if !value.is_empty() {
            lines.push(format!("{header_prefix}{label}: {value}"));
        }
    }
    if !p.notes.is_empty() {
        lines.push(String::new());
        lines.push(if markdown { "## Project notes" } else { "Project notes:" }.to_string());
        lines.push(p.notes.clone());
    }

    lines.push(String::new());
    lines.push(if markdown { "## Assets" } else { "=== Assets ===" }.to_string());

    for (idx, asset) in assets.iter().enumerate() {
        let a = &asset.fields;
        lines.push(String::new());
        if markdown {
            lines.push(format!("### {}) {}", idx + 1, a.name));
        } else {
            lines.push(format!("{}) {}", idx + 1, a.name));
        }

        for (label, value) in [
            ("Type", &a.asset_type),
            ("Source/Author", &a.author),
            ("URL", &a.source_url),
            ("License", &a.license_type),
            ("Custom license", &a.custom_license),
            ("Download date", &a.download_date),
            ("Proof file/folder", &a.proof_path),
        ] {
            if !value.is_empty() {
                lines.push(format!("{}{label}: {value}", layout.field));
            }
        }

        if p.use_legal_details {
            if markdown {
                lines.push(format!("{}Legal details:", layout.block));
            } else {
                lines.push(format!("{}[Legal details]", layout.block));
            }
            for (label, value) in [
                ("Allows commercial use", a.allow_commercial),
                ("Allows modifications", a.allow_modifications),
                ("Requires attribution", a.require_attribution),
            ] {
                if value.is_set() {
                    lines.push(format!("{}{label}: {}", layout.nested, value.as_str()));
                }
            }
            if !a.attribution_text.is_empty() {
                lines.push(format!("{}Attribution text:", layout.nested));
                for line in a.attribution_text.lines() {
                    lines.push(format!("{}{line}", layout.continuation));
                }
            }
        }

        if p.use_project_usage && !a.project_usage.is_empty() {
            if markdown {
                lines.push(format!("{}Usage in project: {}", layout.block, a.project_usage));
            } else {
                lines.push(format!("{}[Usage in project]", layout.block));
                lines.push(format!("{}Where used: {}", layout.nested, a.project_usage));
            }
        }

        if p.use_asset_notes && !a.internal_notes.is_empty() {
            if markdown {
                lines.push(format!("{}Notes:", layout.block));
            } else {
                lines.push(format!("{}[Notes]", layout.block));
            }
            let indent = if markdown { "  " } else { layout.nested };
            for line in a.internal_notes.lines() {
                lines.push(format!("{indent}{line}"));
            }
        }
    }

    lines.join("\n")
}

/// Write `content` to `path` as UTF-8, replacing any previous file atomically
pub fn write_report(path: &Path, content: &str) -> LedgerResult<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| LedgerError::io(format!("Could not write to {}", dir.display()), e))?;
    tmp.write_all(content.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| LedgerError::io(format!("Could not save {}", path.display()), e))?;
    tmp.persist(path)
        .map_err(|e| LedgerError::io(format!("Could not save {}", path.display()), e.error))?;

    info!(path = %path.display(), bytes = content.len(), "report exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{AssetFields, Permission, ProjectFields};

    fn project(legal: bool, usage: bool, notes: bool) -> Project {
        Project {
            id: 1,
            fields: ProjectFields {
                name: "Platformer Demo".into(),
                project_type: "Game".into(),
                status: "In development".into(),
                use_legal_details: legal,
                use_project_usage: usage,
                use_asset_notes: notes,
                ..Default::default()
            },
        }
    }

    fn hero() -> Asset {
        Asset {
            id: 10,
            project_id: 1,
            fields: AssetFields {
                name: "Hero sprite sheet".into(),
                asset_type: "Image / Sprite / Tileset".into(),
                license_type: "CC BY".into(),
                download_date: "2024-03-05".into(),
                allow_commercial: Permission::Yes,
                allow_modifications: Permission::Yes,
                require_attribution: Permission::Yes,
                attribution_text: "Art by Someone".into(),
                project_usage: "Player".into(),
                internal_notes: "Recolor pending\nCheck license page".into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn markdown_report_matches_layout() {
        let report = build_report(&project(true, false, false), &[hero()], ReportFormat::Markdown);
        let expected = "\
# Project: Platformer Demo
- Type: Game
- Status: In development

## Assets

### 1) Hero sprite sheet
- Type: Image / Sprite / Tileset
- License: CC BY
- Download date: 2024-03-05
- Legal details:
  - Allows commercial use: Yes
  - Allows modifications: Yes
  - Requires attribution: Yes
  - Attribution text:
    Art by Someone";
        assert_eq!(report, expected);
    }

    #[test]
    fn plain_report_uses_bracketed_sections() {
        let report = build_report(&project(true, true, true), &[hero()], ReportFormat::PlainText);
        let expected = "\
Project: Platformer Demo
Type: Game
Status: In development

=== Assets ===

1) Hero sprite sheet
   Type: Image / Sprite / Tileset
   License: CC BY
   Download date: 2024-03-05
   [Legal details]
      Allows commercial use: Yes
      Allows modifications: Yes
      Requires attribution: Yes
      Attribution text:
         Art by Someone
   [Usage in project]
      Where used: Player
   [Notes]
      Recolor pending
      Check license page";
        assert_eq!(report, expected);
    }

    #[test]
    fn report_is_deterministic() {
        let assets = [hero()];
        let first = build_report(&project(true, true, true), &assets, ReportFormat::Markdown);
        let second = build_report(&project(true, true, true), &assets, ReportFormat::Markdown);
        assert_eq!(first, second);
    }

    #[test]
    fn notes_flag_gates_notes_blocks() {
        let assets = [hero()];
        let with_notes = build_report(&project(false, false, true), &assets, ReportFormat::Markdown);
        let without = build_report(&project(false, false, false), &assets, ReportFormat::Markdown);
        assert!(with_notes.contains("- Notes:"));
        assert!(!without.contains("Notes"));
        assert!(!without.contains("Recolor pending"));
        assert_eq!(assets[0].fields.internal_notes, "Recolor pending\nCheck license page");
    }

    #[test]
    fn entries_are_numbered_from_one() {
        let mut second = hero();
        second.fields.name = "Jump sound".into();
        let report = build_report(&project(false, false, false), &[hero(), second], ReportFormat::PlainText);
        assert!(report.contains("\n1) Hero sprite sheet"));
        assert!(report.contains("\n2) Jump sound"));
    }

    #[test]
    fn project_notes_get_their_own_block() {
        let mut p = project(false, false, false);
        p.fields.notes = "Ship by spring".into();
        let report = build_report(&p, &[], ReportFormat::Markdown);
        assert!(report.contains("\n\n## Project notes\nShip by spring\n\n## Assets"));
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        std::fs::write(&path, "old").unwrap();

        write_report(&path, "new report").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new report");
    }

    #[test]
    fn failed_write_leaves_target_and_directory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go makes the final rename fail
        let target = dir.path().join("report.txt");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), "previous").unwrap();

        let err = write_report(&target, "content").unwrap_err();
        assert!(matches!(err, LedgerError::Io { .. }));
        assert_eq!(std::fs::read_to_string(target.join("keep.txt")).unwrap(), "previous");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.md");
        assert!(write_report(&path, "x").is_err());
        assert!(!path.exists());
    }
}
