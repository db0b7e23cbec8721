/// Asset type manager dialog: list, rename and delete custom types
use iced::widget::{button, column, container, pick_list, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length, Theme};

use super::{confirm, MUTED_COLOR};
use crate::state::catalog::{self, DeletePlan};
use crate::state::error::LedgerResult;
use crate::state::session::Session;
use crate::Message;

type ButtonStyle = fn(&Theme, button::Status) -> button::Style;

#[derive(Debug, Clone)]
pub enum TypesMessage {
    Select(String),
    RenameInput(String),
    Rename,
    Delete,
    ReplacementChosen(String),
    ConfirmReassign,
    CancelReassign,
    Close,
}

/// A delete that first needs the type's assets moved elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reassign {
    name: String,
    usage: usize,
    candidates: Vec<String>,
    replacement: Option<String>,
}

#[derive(Debug, Default)]
pub struct TypeManager {
    selected: Option<String>,
    rename_to: String,
    reassign: Option<Reassign>,
}

impl TypeManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn selected_custom(&self) -> Option<&str> {
        self.selected
            .as_deref()
            .filter(|name| !catalog::is_builtin(name))
    }

    /// Handle a dialog message. Returns a status line for successful changes.
    /// `Close` is handled by the caller.
    pub fn update(&mut self, session: &mut Session, message: TypesMessage) -> LedgerResult<Option<String>> {
        match message {
            TypesMessage::Select(name) => {
                self.rename_to = name.clone();
                self.selected = Some(name);
                self.reassign = None;
                Ok(None)
            }
            TypesMessage::RenameInput(value) => {
                self.rename_to = value;
                Ok(None)
            }
            TypesMessage::Rename => {
                let Some(old) = self.selected_custom().map(str::to_string) else {
                    return Ok(None);
                };
                let changed = session.rename_asset_type(&old, &self.rename_to)?;
                let new = self.rename_to.trim().to_string();
                self.selected = Some(new.clone());
                self.rename_to = new.clone();
                Ok(Some(format!("Renamed '{old}' to '{new}' on {changed} assets.")))
            }
            TypesMessage::Delete => {
                let Some(name) = self.selected_custom().map(str::to_string) else {
                    return Ok(None);
                };
                match session.plan_type_delete(&name)? {
                    DeletePlan::Unused => {
                        if !confirm("Delete type", &format!("Delete the custom type '{name}'?")) {
                            return Ok(None);
                        }
                        session.delete_asset_type(&name, None)?;
                        self.selected = None;
                        self.rename_to.clear();
                        Ok(Some(format!("Deleted type '{name}'.")))
                    }
                    DeletePlan::Reassign { usage, candidates } => {
                        self.reassign = Some(Reassign {
                            name,
                            usage,
                            candidates,
                            replacement: None,
                        });
                        Ok(None)
                    }
                }
            }
            TypesMessage::ReplacementChosen(value) => {
                if let Some(reassign) = self.reassign.as_mut() {
                    reassign.replacement = Some(value);
                }
                Ok(None)
            }
            TypesMessage::ConfirmReassign => {
                let Some(reassign) = self.reassign.clone() else {
                    return Ok(None);
                };
                let Some(target) = reassign.replacement.as_deref() else {
                    return Ok(None);
                };
                let question = format!(
                    "Move {} assets from '{}' to '{}' and delete '{}'?",
                    reassign.usage, reassign.name, target, reassign.name
                );
                if !confirm("Reassign and delete", &question) {
                    return Ok(None);
                }
                let changed = session.delete_asset_type(&reassign.name, Some(target))?;
                self.reassign = None;
                self.selected = Some(target.to_string());
                self.rename_to = target.to_string();
                Ok(Some(format!(
                    "Moved {changed} assets to '{target}' and deleted '{}'.",
                    reassign.name
                )))
            }
            TypesMessage::CancelReassign => {
                self.reassign = None;
                Ok(None)
            }
            TypesMessage::Close => Ok(None),
        }
    }

    pub fn view<'a>(&'a self, session: &'a Session) -> Element<'a, Message> {
        let msg = Message::Types;

        let header = row![
            text("Type").width(Length::FillPortion(3)),
            text("Origin").width(Length::FillPortion(2)),
            text("Used by").width(Length::FillPortion(1)),
        ]
        .spacing(8);

        let rows: Vec<Element<Message>> = session
            .type_catalog()
            .into_iter()
            .map(|entry| {
                let style: ButtonStyle = if self.selected.as_deref() == Some(entry.name.as_str()) {
                    button::primary
                } else {
                    button::text
                };
                let line = row![
                    text(entry.name.clone()).width(Length::FillPortion(3)),
                    text(entry.origin.to_string()).width(Length::FillPortion(2)),
                    text(entry.usage.to_string()).width(Length::FillPortion(1)),
                ]
                .spacing(8);
                button(line)
                    .width(Length::Fill)
                    .style(style)
                    .on_press(msg(TypesMessage::Select(entry.name)))
                    .into()
            })
            .collect();

        let custom = self.selected_custom().is_some();
        let rename = row![
            text_input("New name", &self.rename_to)
                .on_input(move |s| msg(TypesMessage::RenameInput(s)))
                .on_submit(msg(TypesMessage::Rename)),
            button("Rename").on_press_maybe(custom.then_some(msg(TypesMessage::Rename))),
            button("Delete")
                .style(button::danger)
                .on_press_maybe(custom.then_some(msg(TypesMessage::Delete))),
        ]
        .spacing(6)
        .align_y(Alignment::Center);

        let hint = text("Built-in types cannot be renamed or deleted.")
            .size(13)
            .color(MUTED_COLOR);

        let mut content = column![
            text("Asset types").size(24),
            text(format!("{} types in use", session.type_usage().len()))
                .size(13)
                .color(MUTED_COLOR),
            header,
            scrollable(Column::with_children(rows).spacing(2)).height(Length::Fixed(260.0)),
            rename,
            hint,
        ]
        .spacing(12)
        .max_width(620);

        if let Some(reassign) = &self.reassign {
            content = content.push(
                column![
                    text(format!(
                        "'{}' is used by {} assets. Choose the type they should get:",
                        reassign.name, reassign.usage
                    )),
                    row![
                        pick_list(
                            reassign.candidates.as_slice(),
                            reassign.replacement.as_ref(),
                            move |s| msg(TypesMessage::ReplacementChosen(s)),
                        )
                        .width(Length::Fill),
                        button("Reassign and delete").style(button::danger).on_press_maybe(
                            reassign
                                .replacement
                                .is_some()
                                .then_some(msg(TypesMessage::ConfirmReassign)),
                        ),
                        button("Cancel")
                            .style(button::secondary)
                            .on_press(msg(TypesMessage::CancelReassign)),
                    ]
                    .spacing(6),
                ]
                .spacing(8),
            );
        }

        content = content.push(button("Close").on_press(msg(TypesMessage::Close)));

        container(content).padding(30).center_x(Length::Fill).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::catalog::CUSTOM_TYPE_CHOICE;
    use crate::state::form::ProjectForm;
    use crate::state::library::Library;

    fn session_with_custom_type(name: &str, count: usize) -> Session {
        let mut session = Session::new(Library::open_in_memory().unwrap()).unwrap();
        let project = ProjectForm {
            name: "Types".into(),
            ..Default::default()
        };
        session.save_project(None, &project).unwrap();
        for i in 0..count {
            session.new_asset().unwrap();
            let form = session.form_mut();
            form.name = format!("asset {i}");
            form.choose_type(CUSTOM_TYPE_CHOICE.into());
            form.custom_asset_type = name.into();
            session.save_asset().unwrap();
        }
        session
    }

    #[test]
    fn rename_follows_selection() {
        let mut session = session_with_custom_type("shader", 2);
        let mut manager = TypeManager::new();
        manager.update(&mut session, TypesMessage::Select("shader".into())).unwrap();
        manager.update(&mut session, TypesMessage::RenameInput(" Shader ".into())).unwrap();

        let status = manager.update(&mut session, TypesMessage::Rename).unwrap();
        assert_eq!(status.as_deref(), Some("Renamed 'shader' to 'Shader' on 2 assets."));
        assert_eq!(manager.selected.as_deref(), Some("Shader"));
        assert_eq!(session.type_usage().get("Shader"), Some(&2));
    }

    #[test]
    fn builtin_selection_does_nothing() {
        let mut session = session_with_custom_type("shader", 1);
        let mut manager = TypeManager::new();
        manager.update(&mut session, TypesMessage::Select("Music".into())).unwrap();
        manager.update(&mut session, TypesMessage::RenameInput("Tunes".into())).unwrap();

        assert_eq!(manager.update(&mut session, TypesMessage::Rename).unwrap(), None);
        assert_eq!(manager.update(&mut session, TypesMessage::Delete).unwrap(), None);
        assert!(manager.reassign.is_none());
    }

    #[test]
    fn used_type_delete_asks_for_replacement() {
        let mut session = session_with_custom_type("Pixel-font", 3);
        let mut manager = TypeManager::new();
        manager.update(&mut session, TypesMessage::Select("Pixel-font".into())).unwrap();
        manager.update(&mut session, TypesMessage::Delete).unwrap();

        let reassign = manager.reassign.as_ref().unwrap();
        assert_eq!(reassign.usage, 3);
        assert!(reassign.candidates.contains(&"Font".to_string()));

        // Confirming without a replacement is ignored
        assert_eq!(manager.update(&mut session, TypesMessage::ConfirmReassign).unwrap(), None);
        manager.update(&mut session, TypesMessage::CancelReassign).unwrap();
        assert!(manager.reassign.is_none());
        assert_eq!(session.type_usage().get("Pixel-font"), Some(&3));
    }
}
