/// Editable form models for projects and assets
///
/// The forms hold exactly what the widgets show. `validate` turns a form into
/// the fields the library stores, or a `Validation` error that blocks the save.
/// Which dependent inputs are enabled is decided by the `ASSET_RULES` table,
/// evaluated after every change and after loading a stored asset.
use chrono::NaiveDate;

use super::catalog::CUSTOM_TYPE_CHOICE;
use super::data::{
    Asset, AssetFields, Permission, Project, ProjectFields, OTHER_LICENSE, UNKNOWN_LICENSE,
};
use super::error::{LedgerError, LedgerResult};
use super::license::legal_defaults;

/// ISO format used for `download_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ========== Projects ==========

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectForm {
    pub name: String,
    pub project_type: String,
    pub usage: String,
    pub status: String,
    pub notes: String,
    pub use_legal_details: bool,
    pub use_project_usage: bool,
    pub use_asset_notes: bool,
}

impl ProjectForm {
    pub fn from_project(project: &Project) -> Self {
        let fields = &project.fields;
        Self {
            name: fields.name.clone(),
            project_type: fields.project_type.clone(),
            usage: fields.usage.clone(),
            status: fields.status.clone(),
            notes: fields.notes.clone(),
            use_legal_details: fields.use_legal_details,
            use_project_usage: fields.use_project_usage,
            use_asset_notes: fields.use_asset_notes,
        }
    }

    pub fn validate(&self) -> LedgerResult<ProjectFields> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("Project name is required."));
        }

        Ok(ProjectFields {
            name: name.to_string(),
            project_type: self.project_type.clone(),
            usage: self.usage.clone(),
            status: self.status.clone(),
            notes: self.notes.trim().to_string(),
            use_legal_details: self.use_legal_details,
            use_project_usage: self.use_project_usage,
            use_tags: false,
            use_asset_notes: self.use_asset_notes,
        })
    }
}

// ========== Assets ==========

/// Inputs whose enabled state depends on other inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentField {
    CustomLicense,
    CustomAssetType,
}

/// One declarative dependency: `field` is enabled while `enabled_when` holds.
pub struct FieldRule {
    pub field: DependentField,
    pub enabled_when: fn(&AssetForm) -> bool,
    /// Empty the field when the rule disables it
    pub clear_when_disabled: bool,
}

pub const ASSET_RULES: [FieldRule; 2] = [
    FieldRule {
        field: DependentField::CustomLicense,
        enabled_when: license_is_other,
        clear_when_disabled: false,
    },
    FieldRule {
        field: DependentField::CustomAssetType,
        enabled_when: type_is_custom,
        clear_when_disabled: true,
    },
];

fn license_is_other(form: &AssetForm) -> bool {
    form.license_type == OTHER_LICENSE
}

fn type_is_custom(form: &AssetForm) -> bool {
    form.asset_type_choice == CUSTOM_TYPE_CHOICE
}

/// Result of evaluating `ASSET_RULES`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldStates {
    pub custom_license: bool,
    pub custom_asset_type: bool,
}

impl FieldStates {
    pub fn is_enabled(&self, field: DependentField) -> bool {
        match field {
            DependentField::CustomLicense => self.custom_license,
            DependentField::CustomAssetType => self.custom_asset_type,
        }
    }

    fn set(&mut self, field: DependentField, enabled: bool) {
        match field {
            DependentField::CustomLicense => self.custom_license = enabled,
            DependentField::CustomAssetType => self.custom_asset_type = enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetForm {
    pub name: String,
    /// Selected entry of the type selector (may be `CUSTOM_TYPE_CHOICE`)
    pub asset_type_choice: String,
    /// Free text used when the custom entry is selected
    pub custom_asset_type: String,
    pub author: String,
    pub source_url: String,
    /// Date as typed; validated on save
    pub download_date: String,
    pub license_type: String,
    pub custom_license: String,
    pub allow_commercial: Permission,
    pub allow_modifications: Permission,
    pub require_attribution: Permission,
    pub attribution_text: String,
    pub project_usage: String,
    pub internal_notes: String,
    pub proof_path: String,
    states: FieldStates,
}

impl AssetForm {
    /// Defaults for a new asset: today's date, "Unknown" license, everything else empty
    pub fn blank(today: NaiveDate) -> Self {
        let mut form = Self {
            name: String::new(),
            asset_type_choice: String::new(),
            custom_asset_type: String::new(),
            author: String::new(),
            source_url: String::new(),
            download_date: today.format(DATE_FORMAT).to_string(),
            license_type: UNKNOWN_LICENSE.to_string(),
            custom_license: String::new(),
            allow_commercial: Permission::Unset,
            allow_modifications: Permission::Unset,
            require_attribution: Permission::Unset,
            attribution_text: String::new(),
            project_usage: String::new(),
            internal_notes: String::new(),
            proof_path: String::new(),
            states: FieldStates::default(),
        };
        form.apply_rules();
        form
    }

    /// Fill the form from a stored asset. `type_options` is the current
    /// selector list; a stored type missing from it is shown as custom text.
    /// Stored legal fields are kept as-is (no license auto-fill on load).
    pub fn from_asset(asset: &Asset, type_options: &[String], today: NaiveDate) -> Self {
        let fields = &asset.fields;
        let mut form = Self::blank(today);

        form.name = fields.name.clone();
        form.set_type_value(&fields.asset_type, type_options);
        form.author = fields.author.clone();
        form.source_url = fields.source_url.clone();
        // An empty stored date stays empty; only unparsable text falls back to today
        if fields.download_date.is_empty()
            || NaiveDate::parse_from_str(&fields.download_date, DATE_FORMAT).is_ok()
        {
            form.download_date = fields.download_date.clone();
        }
        form.license_type = if fields.license_type.is_empty() {
            UNKNOWN_LICENSE.to_string()
        } else {
            fields.license_type.clone()
        };
        form.custom_license = fields.custom_license.clone();
        form.allow_commercial = fields.allow_commercial;
        form.allow_modifications = fields.allow_modifications;
        form.require_attribution = fields.require_attribution;
        form.attribution_text = fields.attribution_text.clone();
        form.project_usage = fields.project_usage.clone();
        form.internal_notes = fields.internal_notes.clone();
        form.proof_path = fields.proof_path.clone();

        form.apply_rules();
        form
    }

    /// Select the entry matching `value`, or the custom entry holding it
    pub fn set_type_value(&mut self, value: &str, type_options: &[String]) {
        let value = value.trim();
        if value.is_empty() {
            self.asset_type_choice.clear();
            self.custom_asset_type.clear();
        } else if value != CUSTOM_TYPE_CHOICE && type_options.iter().any(|o| o == value) {
            self.asset_type_choice = value.to_string();
            self.custom_asset_type.clear();
        } else {
            self.asset_type_choice = CUSTOM_TYPE_CHOICE.to_string();
            self.custom_asset_type = value.to_string();
        }
        self.apply_rules();
    }

    /// The type that would be stored, if any (custom entry resolves to its text)
    pub fn effective_type(&self) -> &str {
        if self.asset_type_choice == CUSTOM_TYPE_CHOICE {
            self.custom_asset_type.trim()
        } else {
            self.asset_type_choice.trim()
        }
    }

    pub fn choose_type(&mut self, choice: String) {
        self.asset_type_choice = choice;
        self.apply_rules();
    }

    /// Change the license and pre-fill the legal fields for known licenses
    pub fn choose_license(&mut self, license: String) {
        if let Some((commercial, modifications, attribution)) = legal_defaults(&license) {
            self.allow_commercial = commercial;
            self.allow_modifications = modifications;
            self.require_attribution = attribution;
        }
        self.license_type = license;
        self.apply_rules();
    }

    /// Evaluate `ASSET_RULES` against the current values
    pub fn apply_rules(&mut self) -> FieldStates {
        let mut states = FieldStates::default();
        for rule in &ASSET_RULES {
            let enabled = (rule.enabled_when)(self);
            states.set(rule.field, enabled);
            if !enabled && rule.clear_when_disabled {
                match rule.field {
                    DependentField::CustomLicense => self.custom_license.clear(),
                    DependentField::CustomAssetType => self.custom_asset_type.clear(),
                }
            }
        }
        self.states = states;
        states
    }

    pub fn field_states(&self) -> FieldStates {
        self.states
    }

    /// Inline warning for a URL that does not look like one
    pub fn url_warning(&self) -> Option<&'static str> {
        let url = self.source_url.trim();
        if url.is_empty() || looks_like_url(url) {
            None
        } else {
            Some("URL does not look valid (missing http:// or https://).")
        }
    }

    /// Validate and collect the fields to store
    pub fn validate(&self) -> LedgerResult<AssetFields> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("Asset name/description is required."));
        }

        let custom_license = self.custom_license.trim();
        check_license(&self.license_type, custom_license)?;

        if self.asset_type_choice == CUSTOM_TYPE_CHOICE && self.effective_type().is_empty() {
            return Err(LedgerError::validation(
                "Please enter a custom asset type or choose one from the list.",
            ));
        }

        let download_date = self.download_date.trim();
        let download_date = if download_date.is_empty() {
            String::new()
        } else {
            NaiveDate::parse_from_str(download_date, DATE_FORMAT)
                .map_err(|_| {
                    LedgerError::validation("Download date must be a valid date (YYYY-MM-DD).")
                })?
                .format(DATE_FORMAT)
                .to_string()
        };

        Ok(AssetFields {
            name: name.to_string(),
            asset_type: self.effective_type().to_string(),
            author: self.author.trim().to_string(),
            source_url: self.source_url.trim().to_string(),
            download_date,
            license_type: self.license_type.clone(),
            custom_license: custom_license.to_string(),
            allow_commercial: self.allow_commercial,
            allow_modifications: self.allow_modifications,
            require_attribution: self.require_attribution,
            attribution_text: self.attribution_text.trim().to_string(),
            project_usage: self.project_usage.trim().to_string(),
            internal_notes: self.internal_notes.trim().to_string(),
            tags: String::new(),
            proof_path: self.proof_path.trim().to_string(),
        })
    }
}

/// "Other..." needs a custom license text; every other combination is accepted.
pub fn check_license(license_type: &str, custom_license: &str) -> LedgerResult<()> {
    if license_type == OTHER_LICENSE && custom_license.trim().is_empty() {
        return Err(LedgerError::validation(
            "You selected 'Other...' but did not fill in the custom license.",
        ));
    }
    Ok(())
}

pub fn looks_like_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
