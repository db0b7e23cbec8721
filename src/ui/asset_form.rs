/// Asset form panel (right side of the main window)
///
/// Field edits are applied to the session's `AssetForm` through `apply`.
/// Actions with side effects (save, open, browse) are top-level messages.
use iced::widget::{button, column, pick_list, row, scrollable, text, text_editor, text_input, Column};
use iced::{Element, Length};

use super::{labeled, warning, MUTED_COLOR};
use crate::state::data::{Permission, LICENSE_OPTIONS};
use crate::state::form::{AssetForm, DependentField};
use crate::state::session::{SelectionState, Session};
use crate::Message;

#[derive(Debug, Clone)]
pub enum FormMessage {
    Name(String),
    TypeChosen(String),
    CustomType(String),
    Author(String),
    SourceUrl(String),
    DownloadDate(String),
    LicenseChosen(String),
    CustomLicense(String),
    Commercial(Permission),
    Modifications(Permission),
    Attribution(Permission),
    AttributionText(text_editor::Action),
    ProjectUsage(String),
    Notes(text_editor::Action),
    ProofPath(String),
}

/// Whether the proof browser picks a file or a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofTarget {
    File,
    Folder,
}

/// Multi-line editor buffers mirroring the form's text fields
pub struct FormEditors {
    attribution: text_editor::Content,
    notes: text_editor::Content,
}

impl Default for FormEditors {
    fn default() -> Self {
        FormEditors {
            attribution: text_editor::Content::new(),
            notes: text_editor::Content::new(),
        }
    }
}

impl FormEditors {
    /// Reload both buffers after the session replaced the form
    pub fn sync(&mut self, form: &AssetForm) {
        self.attribution = text_editor::Content::with_text(&form.attribution_text);
        self.notes = text_editor::Content::with_text(&form.internal_notes);
    }
}

/// Apply one field edit; dependent fields are re-evaluated by the form
pub fn apply(form: &mut AssetForm, editors: &mut FormEditors, message: FormMessage) {
    match message {
        FormMessage::Name(value) => form.name = value,
        FormMessage::TypeChosen(choice) => form.choose_type(choice),
        FormMessage::CustomType(value) => form.custom_asset_type = value,
        FormMessage::Author(value) => form.author = value,
        FormMessage::SourceUrl(value) => form.source_url = value,
        FormMessage::DownloadDate(value) => form.download_date = value,
        FormMessage::LicenseChosen(license) => form.choose_license(license),
        FormMessage::CustomLicense(value) => form.custom_license = value,
        FormMessage::Commercial(value) => form.allow_commercial = value,
        FormMessage::Modifications(value) => form.allow_modifications = value,
        FormMessage::Attribution(value) => form.require_attribution = value,
        FormMessage::AttributionText(action) => {
            let is_edit = action.is_edit();
            editors.attribution.perform(action);
            if is_edit {
                form.attribution_text = editors.attribution.text();
            }
        }
        FormMessage::ProjectUsage(value) => form.project_usage = value,
        FormMessage::Notes(action) => {
            let is_edit = action.is_edit();
            editors.notes.perform(action);
            if is_edit {
                form.internal_notes = editors.notes.text();
            }
        }
        FormMessage::ProofPath(value) => form.proof_path = value,
    }
    form.apply_rules();
}

fn edit(message: fn(String) -> FormMessage) -> impl Fn(String) -> Message {
    move |value| Message::Form(message(value))
}

fn permission_field<'a>(
    label: &'a str,
    value: Permission,
    message: fn(Permission) -> FormMessage,
) -> Element<'a, Message> {
    labeled(
        label,
        pick_list(Permission::ALL, Some(value), move |p| Message::Form(message(p)))
            .width(Length::Fixed(160.0)),
    )
    .into()
}

fn section(title: &str) -> Element<'_, Message> {
    text(title).size(16).into()
}

pub fn form_panel<'a>(session: &'a Session, editors: &'a FormEditors) -> Element<'a, Message> {
    let heading = match session.state() {
        SelectionState::NoProjectSelected => {
            return placeholder("No project selected.");
        }
        SelectionState::NoAssetSelected => {
            return placeholder("Select an asset or create a new one.");
        }
        SelectionState::AssetSelected(_) => "Edit asset",
        SelectionState::NewUnsavedAsset => "New asset",
    };

    let form = session.form();
    let states = form.field_states();
    let groups = session.groups();

    let mut custom_type = text_input("Custom type", &form.custom_asset_type);
    if states.is_enabled(DependentField::CustomAssetType) {
        custom_type = custom_type.on_input(edit(FormMessage::CustomType));
    }
    let mut custom_license = text_input("Custom license", &form.custom_license);
    if states.is_enabled(DependentField::CustomLicense) {
        custom_license = custom_license.on_input(edit(FormMessage::CustomLicense));
    }

    let has_url = !form.source_url.trim().is_empty();
    let has_proof = !form.proof_path.trim().is_empty();
    let license_options: Vec<String> = LICENSE_OPTIONS.iter().map(|s| s.to_string()).collect();

    let mut fields = Column::new()
        .spacing(8)
        .push(labeled(
            "Name / description",
            text_input("What is this asset?", &form.name).on_input(edit(FormMessage::Name)),
        ))
        .push(labeled(
            "Type",
            row![
                pick_list(
                    session.type_options(),
                    Some(&form.asset_type_choice),
                    edit(FormMessage::TypeChosen),
                )
                .width(Length::Fill),
                custom_type,
            ]
            .spacing(6),
        ))
        .push(labeled(
            "Source / author",
            text_input("Author, store or website", &form.author).on_input(edit(FormMessage::Author)),
        ))
        .push(labeled(
            "URL",
            row![
                text_input("https://", &form.source_url).on_input(edit(FormMessage::SourceUrl)),
                button("Open").on_press_maybe(has_url.then_some(Message::OpenUrl)),
                button("Copy").on_press_maybe(has_url.then_some(Message::CopyUrl)),
            ]
            .spacing(6),
        ))
        .push_maybe(form.url_warning().map(warning))
        .push(labeled(
            "Download date",
            text_input("YYYY-MM-DD", &form.download_date).on_input(edit(FormMessage::DownloadDate)),
        ))
        .push(labeled(
            "License",
            row![
                pick_list(
                    license_options,
                    Some(form.license_type.clone()),
                    edit(FormMessage::LicenseChosen),
                )
                .width(Length::Fill),
                custom_license,
            ]
            .spacing(6),
        ));

    if groups.legal_details {
        fields = fields
            .push(section("Legal details"))
            .push(permission_field(
                "Commercial use",
                form.allow_commercial,
                FormMessage::Commercial,
            ))
            .push(permission_field(
                "Modifications",
                form.allow_modifications,
                FormMessage::Modifications,
            ))
            .push(permission_field(
                "Attribution required",
                form.require_attribution,
                FormMessage::Attribution,
            ))
            .push(text("Attribution text"))
            .push(
                text_editor(&editors.attribution)
                    .on_action(|a| Message::Form(FormMessage::AttributionText(a)))
                    .height(Length::Fixed(80.0)),
            );
    }

    if groups.project_usage {
        fields = fields.push(section("Usage in project")).push(labeled(
            "Where used",
            text_input("Level 2, main menu, ...", &form.project_usage)
                .on_input(edit(FormMessage::ProjectUsage)),
        ));
    }

    if groups.notes {
        fields = fields.push(section("Notes")).push(
            text_editor(&editors.notes)
                .on_action(|a| Message::Form(FormMessage::Notes(a)))
                .height(Length::Fixed(100.0)),
        );
    }

    fields = fields.push(section("Proof of license")).push(labeled(
        "File or folder",
        row![
            text_input("Screenshot, receipt or license file", &form.proof_path)
                .on_input(edit(FormMessage::ProofPath)),
            button("File…").on_press(Message::BrowseProof(ProofTarget::File)),
            button("Folder…").on_press(Message::BrowseProof(ProofTarget::Folder)),
            button("Open").on_press_maybe(has_proof.then_some(Message::OpenProof)),
        ]
        .spacing(6),
    ));

    let actions = row![
        button("Save asset").on_press(Message::SaveAsset),
        button("Manage types…")
            .style(button::secondary)
            .on_press(Message::ManageTypes),
    ]
    .spacing(8);

    column![
        text(heading).size(22),
        scrollable(fields.padding([0, 12])).height(Length::Fill),
        actions,
    ]
    .spacing(10)
    .width(Length::FillPortion(4))
    .height(Length::Fill)
    .into()
}

fn placeholder(message: &str) -> Element<'_, Message> {
    column![text("Asset").size(22), text(message).color(MUTED_COLOR)]
        .spacing(10)
        .width(Length::FillPortion(4))
        .into()
}
