/// Asset list panel: type filter, table and list actions
use iced::widget::{button, column, pick_list, row, scrollable, text, Column};
use iced::{Alignment, Element, Length, Theme};

use super::MUTED_COLOR;
use crate::report::ReportFormat;
use crate::state::data::{Asset, OTHER_LICENSE};
use crate::state::session::{SelectionState, Session};
use crate::Message;

type ButtonStyle = fn(&Theme, button::Status) -> button::Style;

/// Name, Type, Author, License
const COLUMNS: [(&str, u16); 4] = [("Name", 3), ("Type", 2), ("Author", 2), ("License", 2)];

/// License column text; "Other..." shows the custom license instead
fn license_label(asset: &Asset) -> &str {
    let fields = &asset.fields;
    if fields.license_type == OTHER_LICENSE && !fields.custom_license.is_empty() {
        &fields.custom_license
    } else {
        &fields.license_type
    }
}

fn table_row<'a>(cells: [&'a str; 4]) -> Element<'a, Message> {
    let mut line = row![].spacing(8);
    for (cell, (_, portion)) in cells.into_iter().zip(COLUMNS) {
        line = line.push(text(cell).width(Length::FillPortion(portion)));
    }
    line.into()
}

pub fn asset_panel(session: &Session) -> Element<'_, Message> {
    let Some(project) = session.current_project() else {
        return column![
            text("Assets").size(22),
            text("Create or select a project to record its assets.").color(MUTED_COLOR),
        ]
        .spacing(10)
        .width(Length::FillPortion(3))
        .into();
    };

    let selected = match session.state() {
        SelectionState::AssetSelected(id) => Some(id),
        _ => None,
    };

    let filter = row![
        text("Type filter"),
        pick_list(
            session.filter_options(),
            Some(session.filter()),
            Message::FilterSelected,
        )
        .width(Length::Fixed(220.0)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let header = table_row(COLUMNS.map(|(title, _)| title));

    let rows: Vec<Element<Message>> = session
        .visible_assets()
        .map(|asset| {
            let fields = &asset.fields;
            let style: ButtonStyle = if selected == Some(asset.id) {
                button::primary
            } else {
                button::text
            };
            button(table_row([
                fields.name.as_str(),
                fields.asset_type.as_str(),
                fields.author.as_str(),
                license_label(asset),
            ]))
            .width(Length::Fill)
            .style(style)
            .on_press(Message::SelectAsset(asset.id))
            .into()
        })
        .collect();

    let shown = format!("{} of {} assets shown", rows.len(), session.assets().len());
    let table: Element<Message> = if rows.is_empty() {
        text("No assets to show.").color(MUTED_COLOR).into()
    } else {
        scrollable(Column::with_children(rows).spacing(2))
            .height(Length::Fill)
            .into()
    };

    let actions = row![
        button("New asset").on_press(Message::NewAsset),
        button("Delete asset")
            .style(button::danger)
            .on_press_maybe(selected.map(|_| Message::DeleteAsset)),
        button("Export Markdown").on_press(Message::Export(ReportFormat::Markdown)),
        button("Export text").on_press(Message::Export(ReportFormat::PlainText)),
    ]
    .spacing(6);

    column![
        text(format!("Assets of {}", project.fields.name)).size(22),
        filter,
        header,
        table,
        text(shown).size(13).color(MUTED_COLOR),
        actions,
    ]
    .spacing(10)
    .width(Length::FillPortion(3))
    .height(Length::Fill)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::AssetFields;

    #[test]
    fn other_license_shows_custom_text() {
        let mut asset = Asset {
            id: 1,
            project_id: 1,
            fields: AssetFields {
                license_type: OTHER_LICENSE.into(),
                custom_license: "Studio EULA".into(),
                ..Default::default()
            },
        };
        assert_eq!(license_label(&asset), "Studio EULA");

        asset.fields.license_type = "MIT".into();
        assert_eq!(license_label(&asset), "MIT");
    }
}
