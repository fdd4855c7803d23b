//! Thumbnail gallery strip
//!
//! A fixed-width left panel of letterboxed thumbnails; clicking one
//! selects its entry. Uses iced_aw's Wrap so thumbnails reflow with the
//! panel height.

use iced::widget::{button, column, scrollable, text, Image};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use crate::state::collection::Collection;
use crate::thumbnail::{THUMB_HEIGHT, THUMB_WIDTH};
use crate::Message;

/// Width of the gallery panel.
pub const GALLERY_WIDTH: f32 = 300.0;

/// Build the gallery element for the current collection.
pub fn gallery(collection: &Collection) -> Element<'_, Message> {
    let mut cards: Vec<Element<'_, Message>> = Vec::with_capacity(collection.len());

    for (i, entry) in collection.entries.iter().enumerate() {
        let selected = i == collection.selected;
        let card = column![
            Image::new(entry.thumb_texture.clone())
                .width(Length::Fixed(THUMB_WIDTH as f32))
                .height(Length::Fixed(THUMB_HEIGHT as f32)),
            text(&entry.filename).size(12),
        ]
        .spacing(2)
        .align_x(Alignment::Center);

        let style: fn(&iced::Theme, button::Status) -> button::Style = if selected {
            button::primary
        } else {
            button::secondary
        };
        cards.push(
            button(card)
                .on_press(Message::Select(i))
                .style(style)
                .padding(4)
                .into(),
        );
    }

    let wrap = Wrap::with_elements(cards).spacing(6.0).line_spacing(6.0);

    scrollable(wrap)
        .width(Length::Fixed(GALLERY_WIDTH))
        .height(Length::Fill)
        .into()
}
