/// User interface module
///
/// View functions for each panel of the main window plus the two dialogs
/// (project editor, asset type manager). Views borrow the session and emit
/// `crate::Message`.
pub mod asset_form;
pub mod assets;
pub mod project_editor;
pub mod projects;
pub mod type_manager;

use std::path::Path;

use iced::widget::{button, container, row, text, Row};
use iced::{Alignment, Color, Element, Length};
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::state::error::LedgerError;
use crate::Message;

const ERROR_COLOR: Color = Color::from_rgb(0.95, 0.45, 0.45);
const WARNING_COLOR: Color = Color::from_rgb(0.95, 0.75, 0.3);
pub const MUTED_COLOR: Color = Color::from_rgb(0.6, 0.6, 0.65);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Dismissible banner shown above the panels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Info,
            title: title.into(),
            body: body.into(),
        }
    }
}

impl From<&LedgerError> for Notice {
    fn from(err: &LedgerError) -> Self {
        Notice {
            kind: NoticeKind::Error,
            title: err.title().to_string(),
            body: err.to_string(),
        }
    }
}

pub fn notice_banner(notice: &Notice) -> Element<'_, Message> {
    let title = text(notice.title.as_str()).size(16);
    let title = match notice.kind {
        NoticeKind::Info => title,
        NoticeKind::Error => title.color(ERROR_COLOR),
    };

    container(
        row![
            title,
            text(notice.body.as_str()).width(Length::Fill),
            button("Dismiss").on_press(Message::DismissNotice),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    )
    .padding(10)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}

/// Inline warning line under a field
pub fn warning(message: &str) -> Element<'_, Message> {
    text(message).size(13).color(WARNING_COLOR).into()
}

/// A label column followed by the field widget
pub fn labeled<'a>(label: &'a str, field: impl Into<Element<'a, Message>>) -> Row<'a, Message> {
    row![text(label).width(Length::Fixed(150.0)), field.into()]
        .spacing(8)
        .align_y(Alignment::Center)
}

/// Blocking Yes/No question. Returns true when the user answers Yes.
pub fn confirm(title: &str, description: &str) -> bool {
    let answer = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::YesNo)
        .show();
    matches!(answer, MessageDialogResult::Yes)
}

pub fn show_about(catalog: Option<&Path>) {
    let location = catalog
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "in memory".to_string());
    MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title("About License Keeper")
        .set_description(format!(
            "License Keeper {}\n\nKeeps track of where your project's assets come from, \
             under which license, and where the proof is stored.\n\n\
             Released under the {} license.\n\nCatalog: {location}",
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_LICENSE")
        ))
        .set_buttons(MessageButtons::Ok)
        .show();
}
