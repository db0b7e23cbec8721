/// Selection state for the main window
///
/// The session owns the library connection plus everything the window shows:
/// the project list, the selected project's assets, the type filter and the
/// asset form. The UI calls one method per user action and re-renders from
/// the accessors afterwards.
use std::fmt;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use super::catalog::{self, DeletePlan, TypeEntry, TypeUsage};
use super::data::{Asset, Project};
use super::error::{LedgerError, LedgerResult};
use super::form::{AssetForm, ProjectForm};
use super::library::Library;
use crate::report::{self, ReportFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    NoProjectSelected,
    NoAssetSelected,
    AssetSelected(i64),
    /// The form holds a new asset that has not been saved yet
    NewUnsavedAsset,
}

/// Client-side filter over the loaded asset list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFilter {
    All,
    Only(String),
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => f.write_str("All types"),
            TypeFilter::Only(name) => f.write_str(name),
        }
    }
}

impl TypeFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(name) => asset.fields.asset_type == *name,
        }
    }
}

/// Which optional form groups the selected project uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupVisibility {
    pub legal_details: bool,
    pub project_usage: bool,
    pub notes: bool,
}

pub struct Session {
    library: Library,
    projects: Vec<Project>,
    current_project: Option<Project>,
    assets: Vec<Asset>,
    selection: SelectionState,
    filter: TypeFilter,
    filter_options: Vec<TypeFilter>,
    type_usage: TypeUsage,
    type_options: Vec<String>,
    form: AssetForm,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl Session {
    /// Load projects and select the first one, if any
    pub fn new(library: Library) -> LedgerResult<Self> {
        let mut session = Session {
            library,
            projects: Vec::new(),
            current_project: None,
            assets: Vec::new(),
            selection: SelectionState::NoProjectSelected,
            filter: TypeFilter::All,
            filter_options: vec![TypeFilter::All],
            type_usage: TypeUsage::new(),
            type_options: Vec::new(),
            form: AssetForm::blank(today()),
        };
        session.refresh_types()?;
        session.reload_projects(None)?;
        Ok(session)
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.current_project.as_ref()
    }

    /// Every loaded asset of the selected project, unfiltered
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Assets that pass the type filter, in list order
    pub fn visible_assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(move |asset| self.filter.matches(asset))
    }

    pub fn state(&self) -> SelectionState {
        self.selection
    }

    pub fn filter(&self) -> &TypeFilter {
        &self.filter
    }

    pub fn filter_options(&self) -> &[TypeFilter] {
        &self.filter_options
    }

    pub fn type_usage(&self) -> &TypeUsage {
        &self.type_usage
    }

    /// Options for the per-asset type selector
    pub fn type_options(&self) -> &[String] {
        &self.type_options
    }

    pub fn type_catalog(&self) -> Vec<TypeEntry> {
        catalog::catalog_entries(&self.type_usage)
    }

    pub fn form(&self) -> &AssetForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AssetForm {
        &mut self.form
    }

    pub fn groups(&self) -> GroupVisibility {
        self.current_project
            .as_ref()
            .map(|project| GroupVisibility {
                legal_details: project.fields.use_legal_details,
                project_usage: project.fields.use_project_usage,
                notes: project.fields.use_asset_notes,
            })
            .unwrap_or_default()
    }

    // ---- Projects ----

    /// Reload the project list and select `prefer` (or the first project)
    pub fn reload_projects(&mut self, prefer: Option<i64>) -> LedgerResult<()> {
        self.projects = self.library.list_projects()?;

        let target = prefer
            .filter(|id| self.projects.iter().any(|p| p.id == *id))
            .or_else(|| self.projects.first().map(|p| p.id));

        match target {
            Some(id) => self.select_project(id),
            None => {
                self.current_project = None;
                self.assets.clear();
                self.rebuild_filter();
                self.form = AssetForm::blank(today());
                self.selection = SelectionState::NoProjectSelected;
                Ok(())
            }
        }
    }

    /// Select a project, load its assets and select the first one
    pub fn select_project(&mut self, id: i64) -> LedgerResult<()> {
        let project = self
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(LedgerError::NotFound { entity: "Project", id })?;

        debug!(id, name = %project.fields.name, "project selected");
        self.current_project = Some(project);
        self.load_assets(None)
    }

    /// Create (`editing == None`) or update a project from the editor form
    pub fn save_project(&mut self, editing: Option<i64>, form: &ProjectForm) -> LedgerResult<i64> {
        let fields = form.validate()?;
        let id = match editing {
            Some(id) => {
                self.library.update_project(id, &fields)?;
                id
            }
            None => self.library.create_project(&fields)?,
        };
        self.reload_projects(Some(id))?;
        Ok(id)
    }

    /// Delete the selected project and its assets. The caller confirms first.
    pub fn delete_selected_project(&mut self) -> LedgerResult<()> {
        let project = self
            .current_project
            .as_ref()
            .ok_or_else(|| LedgerError::validation("No project selected."))?;

        self.library.delete_project(project.id)?;
        self.refresh_types()?;
        self.reload_projects(None)
    }

    // ---- Assets ----

    fn load_assets(&mut self, prefer: Option<i64>) -> LedgerResult<()> {
        let Some(project) = self.current_project.as_ref() else {
            return Ok(());
        };

        self.assets = self.library.list_assets_by_project(project.id)?;
        self.rebuild_filter();
        self.refresh_types()?;

        let target = prefer
            .filter(|id| self.assets.iter().any(|a| a.id == *id))
            .or_else(|| self.assets.first().map(|a| a.id));

        match target {
            Some(id) => self.select_asset(id),
            None => {
                self.form = AssetForm::blank(today());
                self.selection = SelectionState::NoAssetSelected;
                Ok(())
            }
        }
    }

    /// Show a stored asset in the form. Unsaved edits are discarded.
    pub fn select_asset(&mut self, id: i64) -> LedgerResult<()> {
        let project_id = self.current_project.as_ref().map(|p| p.id);
        let asset = self
            .library
            .get_asset(id)?
            .filter(|a| Some(a.project_id) == project_id)
            .ok_or(LedgerError::NotFound { entity: "Asset", id })?;

        self.form = AssetForm::from_asset(&asset, &self.type_options, today());
        self.selection = SelectionState::AssetSelected(id);
        Ok(())
    }

    /// Reset the form for a new asset of the selected project
    pub fn new_asset(&mut self) -> LedgerResult<()> {
        if self.current_project.is_none() {
            return Err(LedgerError::validation("Create or select a project first."));
        }
        self.form = AssetForm::blank(today());
        self.selection = SelectionState::NewUnsavedAsset;
        Ok(())
    }

    /// Validate the form, then create or update. Returns the asset id.
    pub fn save_asset(&mut self) -> LedgerResult<i64> {
        let project_id = self
            .current_project
            .as_ref()
            .map(|p| p.id)
            .ok_or_else(|| LedgerError::validation("No project selected for this asset."))?;

        let fields = self.form.validate()?;
        let id = match self.selection {
            SelectionState::AssetSelected(id) => {
                self.library.update_asset(id, &fields)?;
                id
            }
            _ => self.library.create_asset(project_id, &fields)?,
        };

        self.load_assets(Some(id))?;
        Ok(id)
    }

    /// Delete the selected asset. The caller confirms first.
    pub fn delete_selected_asset(&mut self) -> LedgerResult<()> {
        let SelectionState::AssetSelected(id) = self.selection else {
            return Err(LedgerError::validation("No asset selected."));
        };
        self.library.delete_asset(id)?;
        self.load_assets(None)
    }

    pub fn selected_asset(&self) -> Option<&Asset> {
        match self.selection {
            SelectionState::AssetSelected(id) => self.assets.iter().find(|a| a.id == id),
            _ => None,
        }
    }

    pub fn set_filter(&mut self, filter: TypeFilter) {
        if self.filter_options.contains(&filter) {
            self.filter = filter;
        }
    }

    fn rebuild_filter(&mut self) {
        let mut types: Vec<String> = self
            .assets
            .iter()
            .map(|a| a.fields.asset_type.as_str())
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .collect();
        types.sort();
        types.dedup();

        self.filter_options = std::iter::once(TypeFilter::All)
            .chain(types.into_iter().map(TypeFilter::Only))
            .collect();

        // Keep the previous choice while it still exists
        if !self.filter_options.contains(&self.filter) {
            self.filter = TypeFilter::All;
        }
    }

    // ---- Asset types ----

    fn refresh_types(&mut self) -> LedgerResult<()> {
        self.type_usage = self.library.asset_type_usage()?;
        self.type_options = catalog::selector_options(&self.type_usage);
        Ok(())
    }

    /// Rename a custom type everywhere. Returns the number of assets changed.
    pub fn rename_asset_type(&mut self, old: &str, new: &str) -> LedgerResult<usize> {
        let new = catalog::validate_rename(&self.type_usage, old, new)?;
        let changed = self.library.rename_asset_type(old, &new)?;
        self.after_type_change(old, &new)?;
        Ok(changed)
    }

    pub fn plan_type_delete(&self, name: &str) -> LedgerResult<DeletePlan> {
        catalog::plan_delete(&self.type_usage, name)
    }

    /// Delete a custom type. A used type needs a `replacement` taken from
    /// the plan's candidates; its assets are moved there.
    pub fn delete_asset_type(&mut self, name: &str, replacement: Option<&str>) -> LedgerResult<usize> {
        match self.plan_type_delete(name)? {
            DeletePlan::Unused => {
                info!(name, "unused custom asset type dropped");
                self.refresh_types()?;
                Ok(0)
            }
            DeletePlan::Reassign { usage, candidates } => {
                let replacement = replacement
                    .filter(|r| candidates.iter().any(|c| c.as_str() == *r))
                    .ok_or_else(|| {
                        LedgerError::validation(format!(
                            "Type '{name}' is used by {usage} assets. Choose a type to reassign them to."
                        ))
                    })?;
                let changed = self.library.rename_asset_type(name, replacement)?;
                self.after_type_change(name, replacement)?;
                Ok(changed)
            }
        }
    }

    /// Make a rename or reassignment visible in the list, filter, selector and form
    fn after_type_change(&mut self, old: &str, new: &str) -> LedgerResult<()> {
        self.refresh_types()?;

        if let Some(project) = self.current_project.as_ref() {
            self.assets = self.library.list_assets_by_project(project.id)?;
        }
        if self.filter == TypeFilter::Only(old.to_string()) {
            self.filter = TypeFilter::Only(new.to_string());
        }
        self.rebuild_filter();

        if self.form.effective_type() == old {
            self.form.set_type_value(new, &self.type_options);
        }
        Ok(())
    }

    // ---- Report ----

    /// Build the report for the selected project from freshly read rows
    pub fn report(&self, format: ReportFormat) -> LedgerResult<String> {
        let project = self
            .current_project
            .as_ref()
            .ok_or_else(|| LedgerError::validation("Select a project first."))?;
        let project = self
            .library
            .get_project(project.id)?
            .ok_or(LedgerError::NotFound { entity: "Project", id: project.id })?;
        let assets = self.library.list_assets_by_project(project.id)?;
        Ok(report::build_report(&project, &assets, format))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("library", &self.library)
            .field("selection", &self.selection)
            .field("projects", &self.projects.len())
            .field("assets", &self.assets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::catalog::CUSTOM_TYPE_CHOICE;
    use crate::state::data::AssetFields;

    fn session() -> Session {
        Session::new(Library::open_in_memory().unwrap()).unwrap()
    }

    fn project_form(name: &str) -> ProjectForm {
        ProjectForm {
            name: name.into(),
            ..Default::default()
        }
    }

    fn add_asset(session: &mut Session, name: &str, asset_type: &str) -> i64 {
        session.new_asset().unwrap();
        let options = session.type_options().to_vec();
        let form = session.form_mut();
        form.name = name.into();
        form.set_type_value(asset_type, &options);
        session.save_asset().unwrap()
    }

    #[test]
    fn empty_store_starts_without_project() {
        let mut session = session();
        assert_eq!(session.state(), SelectionState::NoProjectSelected);
        assert!(session.new_asset().is_err());
        assert!(session.save_asset().is_err());
    }

    #[test]
    fn selecting_project_auto_selects_first_asset() {
        let mut session = session();
        let id = session.save_project(None, &project_form("Game")).unwrap();
        assert_eq!(session.state(), SelectionState::NoAssetSelected);

        add_asset(&mut session, "zeta", "");
        let alpha = add_asset(&mut session, "Alpha", "");

        session.select_project(id).unwrap();
        assert_eq!(session.state(), SelectionState::AssetSelected(alpha));
        assert_eq!(session.form().name, "Alpha");
    }

    #[test]
    fn first_save_creates_then_updates_in_place() {
        let mut session = session();
        session.save_project(None, &project_form("Game")).unwrap();

        session.new_asset().unwrap();
        assert_eq!(session.state(), SelectionState::NewUnsavedAsset);
        session.form_mut().name = "Theme song".into();
        let id = session.save_asset().unwrap();
        assert_eq!(session.state(), SelectionState::AssetSelected(id));

        session.form_mut().author = "Composer".into();
        assert_eq!(session.save_asset().unwrap(), id);
        assert_eq!(session.assets().len(), 1);
        assert_eq!(session.assets()[0].fields.author, "Composer");
    }

    #[test]
    fn invalid_form_makes_no_storage_call() {
        let mut session = session();
        session.save_project(None, &project_form("Game")).unwrap();
        session.new_asset().unwrap();
        session.form_mut().name = "Mystery".into();
        session.form_mut().choose_license("Other...".into());

        assert!(matches!(session.save_asset(), Err(LedgerError::Validation(_))));
        assert_eq!(session.library().asset_count().unwrap(), 0);
        assert_eq!(session.state(), SelectionState::NewUnsavedAsset);
    }

    #[test]
    fn selecting_another_asset_discards_edits() {
        let mut session = session();
        session.save_project(None, &project_form("Game")).unwrap();
        let a = add_asset(&mut session, "A", "");
        let b = add_asset(&mut session, "B", "");

        session.select_asset(a).unwrap();
        session.form_mut().name = "A edited".into();
        session.select_asset(b).unwrap();
        session.select_asset(a).unwrap();

        assert_eq!(session.form().name, "A");
    }

    #[test]
    fn deleting_selected_asset_and_project() {
        let mut session = session();
        let keep = session.save_project(None, &project_form("Keep")).unwrap();
        let drop = session.save_project(None, &project_form("Drop")).unwrap();
        add_asset(&mut session, "one", "Music");
        add_asset(&mut session, "two", "Music");

        session.delete_selected_asset().unwrap();
        assert_eq!(session.assets().len(), 1);

        session.delete_selected_project().unwrap();
        assert!(session.library().list_assets_by_project(drop).unwrap().is_empty());
        assert_eq!(session.current_project().map(|p| p.id), Some(keep));
        assert!(session.type_usage().is_empty());
    }

    #[test]
    fn filter_only_hides_rows() {
        let mut session = session();
        session.save_project(None, &project_form("Game")).unwrap();
        add_asset(&mut session, "Jump", "SFX");
        add_asset(&mut session, "Theme", "Music");
        add_asset(&mut session, "Loop", "Music");

        assert_eq!(session.filter_options().len(), 3);
        let selected = session.state();

        session.set_filter(TypeFilter::Only("Music".into()));
        let visible: Vec<_> = session.visible_assets().map(|a| a.fields.name.as_str()).collect();
        assert_eq!(visible, ["Loop", "Theme"]);
        assert_eq!(session.state(), selected);
        assert_eq!(session.assets().len(), 3);

        // Unknown filters are ignored
        session.set_filter(TypeFilter::Only("Font".into()));
        assert_eq!(session.filter(), &TypeFilter::Only("Music".into()));
    }

    #[test]
    fn group_visibility_follows_project_flags() {
        let mut session = session();
        let form = ProjectForm {
            name: "Flags".into(),
            use_project_usage: true,
            ..Default::default()
        };
        session.save_project(None, &form).unwrap();
        assert_eq!(
            session.groups(),
            GroupVisibility {
                legal_details: false,
                project_usage: true,
                notes: false
            }
        );
    }

    #[test]
    fn custom_type_reassignment_scenario() {
        let mut session = session();
        session.save_project(None, &project_form("Fonts")).unwrap();
        for name in ["a", "b", "c"] {
            session.new_asset().unwrap();
            session.form_mut().name = name.into();
            session.form_mut().choose_type(CUSTOM_TYPE_CHOICE.into());
            session.form_mut().custom_asset_type = "Pixel-font".into();
            session.save_asset().unwrap();
        }
        assert_eq!(session.type_usage().get("Pixel-font"), Some(&3));
        session.set_filter(TypeFilter::Only("Pixel-font".into()));

        match session.plan_type_delete("Pixel-font").unwrap() {
            DeletePlan::Reassign { usage, candidates } => {
                assert_eq!(usage, 3);
                assert!(candidates.contains(&"Font".to_string()));
            }
            other => panic!("unexpected plan {other:?}"),
        }
        assert!(session.delete_asset_type("Pixel-font", None).is_err());

        let changed = session.delete_asset_type("Pixel-font", Some("Font")).unwrap();
        assert_eq!(changed, 3);
        assert_eq!(session.type_usage().get("Pixel-font"), None);
        assert_eq!(session.type_usage().get("Font"), Some(&3));
        assert!(!session.type_options().contains(&"Pixel-font".to_string()));
        assert_eq!(session.filter(), &TypeFilter::Only("Font".into()));
        assert_eq!(session.form().asset_type_choice, "Font");
        assert!(session.assets().iter().all(|a| a.fields.asset_type == "Font"));
    }

    #[test]
    fn rename_updates_form_and_rejects_builtin_collision() {
        let mut session = session();
        session.save_project(None, &project_form("Shaders")).unwrap();
        session.new_asset().unwrap();
        session.form_mut().name = "Water".into();
        session.form_mut().choose_type(CUSTOM_TYPE_CHOICE.into());
        session.form_mut().custom_asset_type = "shader".into();
        session.save_asset().unwrap();

        assert!(session.rename_asset_type("shader", "Code").is_err());
        assert_eq!(session.type_usage().get("shader"), Some(&1));

        assert_eq!(session.rename_asset_type("shader", "Shader").unwrap(), 1);
        assert_eq!(session.form().effective_type(), "Shader");
        assert_eq!(session.type_usage().get("Shader"), Some(&1));
    }

    #[test]
    fn unused_custom_type_delete_is_a_no_op() {
        let mut session = session();
        assert_eq!(session.delete_asset_type("Ghost type", None).unwrap(), 0);
        assert!(session.delete_asset_type("Music", None).is_err());
    }

    #[test]
    fn platformer_demo_report_from_form() {
        let mut session = session();
        assert!(session.report(ReportFormat::Markdown).is_err());

        let form = ProjectForm {
            name: "Platformer Demo".into(),
            use_legal_details: true,
            ..Default::default()
        };
        session.save_project(None, &form).unwrap();
        session.new_asset().unwrap();
        session.form_mut().name = "Hero sprite sheet".into();
        session.form_mut().choose_license("CC BY".into());
        session.save_asset().unwrap();

        let report = session.report(ReportFormat::Markdown).unwrap();
        assert!(report.contains("### 1) Hero sprite sheet"));
        assert!(report.contains("\n- License: CC BY\n"));
        assert!(report.contains("  - Allows commercial use: Yes"));
        assert!(report.contains("  - Allows modifications: Yes"));
        assert!(report.contains("  - Requires attribution: Yes"));
    }

    #[test]
    fn empty_download_date_survives_unrelated_edit() {
        let mut session = session();
        session.save_project(None, &project_form("Game")).unwrap();
        session.new_asset().unwrap();
        session.form_mut().name = "Click sound".into();
        session.form_mut().download_date.clear();
        let id = session.save_asset().unwrap();
        assert_eq!(session.form().download_date, "");

        session.form_mut().author = "Foley pack".into();
        session.save_asset().unwrap();
        let stored = session.library().get_asset(id).unwrap().unwrap();
        assert_eq!(stored.fields.download_date, "");
        assert_eq!(stored.fields.author, "Foley pack");
    }

    #[test]
    fn filter_matches_types_with_surrounding_spaces() {
        let mut session = session();
        let id = session.save_project(None, &project_form("Game")).unwrap();
        let fields = AssetFields {
            name: "Theme".into(),
            asset_type: "Music ".into(),
            ..Default::default()
        };
        session.library().create_asset(id, &fields).unwrap();
        session.reload_projects(Some(id)).unwrap();

        let only = TypeFilter::Only("Music ".into());
        assert!(session.filter_options().contains(&only));
        session.set_filter(only);
        assert_eq!(session.visible_assets().count(), 1);
    }
}
