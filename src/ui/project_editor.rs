/// Project editor dialog (create and edit)
use iced::widget::{button, checkbox, column, container, pick_list, row, text, text_editor, text_input};
use iced::{Element, Length};

use super::labeled;
use crate::state::data::{Project, PROJECT_STATUSES, PROJECT_TYPES, PROJECT_USAGES};
use crate::state::form::ProjectForm;
use crate::Message;

#[derive(Debug, Clone)]
pub enum EditorMessage {
    Name(String),
    ProjectType(String),
    Usage(String),
    Status(String),
    Notes(text_editor::Action),
    LegalDetails(bool),
    ProjectUsage(bool),
    AssetNotes(bool),
    Save,
    Cancel,
}

pub struct ProjectEditor {
    /// `None` while creating a new project
    pub editing: Option<i64>,
    pub form: ProjectForm,
    notes: text_editor::Content,
}

fn options(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl ProjectEditor {
    pub fn create() -> Self {
        ProjectEditor {
            editing: None,
            form: ProjectForm::default(),
            notes: text_editor::Content::new(),
        }
    }

    pub fn edit(project: &Project) -> Self {
        ProjectEditor {
            editing: Some(project.id),
            form: ProjectForm::from_project(project),
            notes: text_editor::Content::with_text(&project.fields.notes),
        }
    }

    /// Apply a field change. Save and Cancel are handled by the caller.
    pub fn update(&mut self, message: EditorMessage) {
        match message {
            EditorMessage::Name(name) => self.form.name = name,
            EditorMessage::ProjectType(value) => self.form.project_type = value,
            EditorMessage::Usage(value) => self.form.usage = value,
            EditorMessage::Status(value) => self.form.status = value,
            EditorMessage::Notes(action) => {
                let is_edit = action.is_edit();
                self.notes.perform(action);
                if is_edit {
                    self.form.notes = self.notes.text();
                }
            }
            EditorMessage::LegalDetails(on) => self.form.use_legal_details = on,
            EditorMessage::ProjectUsage(on) => self.form.use_project_usage = on,
            EditorMessage::AssetNotes(on) => self.form.use_asset_notes = on,
            EditorMessage::Save | EditorMessage::Cancel => {}
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let title = if self.editing.is_some() {
            "Edit project"
        } else {
            "New project"
        };
        let msg = Message::ProjectEditor;

        let fields = column![
            labeled(
                "Project name",
                text_input("Project name", &self.form.name)
                    .on_input(move |s| msg(EditorMessage::Name(s)))
                    .on_submit(msg(EditorMessage::Save)),
            ),
            labeled(
                "Type",
                pick_list(options(&PROJECT_TYPES), Some(self.form.project_type.clone()), move |v| {
                    msg(EditorMessage::ProjectType(v))
                })
                .width(Length::Fill),
            ),
            labeled(
                "Intended use",
                pick_list(options(&PROJECT_USAGES), Some(self.form.usage.clone()), move |v| {
                    msg(EditorMessage::Usage(v))
                })
                .width(Length::Fill),
            ),
            labeled(
                "Status",
                pick_list(options(&PROJECT_STATUSES), Some(self.form.status.clone()), move |v| {
                    msg(EditorMessage::Status(v))
                })
                .width(Length::Fill),
            ),
            text("Notes"),
            text_editor(&self.notes)
                .on_action(move |a| msg(EditorMessage::Notes(a)))
                .height(Length::Fixed(120.0)),
            text("Optional asset fields").size(16),
            checkbox("Legal details", self.form.use_legal_details)
                .on_toggle(move |on| msg(EditorMessage::LegalDetails(on))),
            checkbox("Usage in project", self.form.use_project_usage)
                .on_toggle(move |on| msg(EditorMessage::ProjectUsage(on))),
            checkbox("Asset notes", self.form.use_asset_notes)
                .on_toggle(move |on| msg(EditorMessage::AssetNotes(on))),
        ]
        .spacing(10);

        let actions = row![
            button("Save").on_press(msg(EditorMessage::Save)),
            button("Cancel")
                .style(button::secondary)
                .on_press(msg(EditorMessage::Cancel)),
        ]
        .spacing(8);

        container(
            column![text(title).size(24), fields, actions]
                .spacing(16)
                .max_width(560),
        )
        .padding(30)
        .center_x(Length::Fill)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::ProjectFields;

    #[test]
    fn edit_prefills_form() {
        let project = Project {
            id: 4,
            fields: ProjectFields {
                name: "Jam entry".into(),
                notes: "48h".into(),
                use_asset_notes: true,
                ..Default::default()
            },
        };
        let editor = ProjectEditor::edit(&project);
        assert_eq!(editor.editing, Some(4));
        assert_eq!(editor.form.name, "Jam entry");
        assert!(editor.form.use_asset_notes);
    }

    #[test]
    fn field_messages_update_form() {
        let mut editor = ProjectEditor::create();
        editor.update(EditorMessage::Name("Tool".into()));
        editor.update(EditorMessage::ProjectType("Tool".into()));
        editor.update(EditorMessage::LegalDetails(true));
        assert_eq!(editor.form.name, "Tool");
        assert_eq!(editor.form.project_type, "Tool");
        assert!(editor.form.use_legal_details);
        assert_eq!(editor.editing, None);
    }
}
