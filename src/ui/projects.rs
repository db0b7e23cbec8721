/// Project list panel (left side of the main window)
use iced::widget::{button, column, row, scrollable, text, Column};
use iced::{Element, Length, Theme};

use super::MUTED_COLOR;
use crate::state::session::Session;
use crate::Message;

type ButtonStyle = fn(&Theme, button::Status) -> button::Style;

pub fn project_panel(session: &Session) -> Element<'_, Message> {
    let selected = session.current_project().map(|p| p.id);

    let entries: Vec<Element<Message>> = session
        .projects()
        .iter()
        .map(|project| {
            let meta = project.meta_line();
            let mut label = column![text(project.fields.name.as_str()).size(16)];
            if !meta.is_empty() {
                label = label.push(text(meta).size(12).color(MUTED_COLOR));
            }

            let style: ButtonStyle = if selected == Some(project.id) {
                button::primary
            } else {
                button::text
            };
            button(label)
                .width(Length::Fill)
                .style(style)
                .on_press(Message::SelectProject(project.id))
                .into()
        })
        .collect();

    let list: Element<Message> = if session.projects().is_empty() {
        text("No projects yet.").color(MUTED_COLOR).into()
    } else {
        scrollable(Column::with_children(entries).spacing(2))
            .height(Length::Fill)
            .into()
    };

    let has_project = selected.is_some();
    let actions = row![
        button("New").on_press(Message::NewProject),
        button("Edit").on_press_maybe(has_project.then_some(Message::EditProject)),
        button("Delete")
            .style(button::danger)
            .on_press_maybe(has_project.then_some(Message::DeleteProject)),
    ]
    .spacing(6);

    column![
        text("Projects").size(22),
        list,
        actions,
        button("About").style(button::text).on_press(Message::ShowAbout),
    ]
    .spacing(10)
    .width(Length::Fixed(240.0))
    .height(Length::Fill)
    .into()
}
