//! Viewer canvas
//!
//! Draws the selected image with nearest-neighbor filtering plus the
//! pixel grid and hover crosshair, and forwards wheel/drag/hover events
//! into the update loop. All placement math is shared with the viewport
//! transform so drawing and interaction never disagree.

use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Program, Stroke};
use iced::widget::image::FilterMethod;
use iced::{Color, Point, Rectangle, Renderer, Size, Theme, Vector};

use crate::state::entry::ImageEntry;
use crate::viewport::inspector;
use crate::Message;

/// Approximate scroll pixels per wheel notch for touchpads that report
/// pixel deltas.
const PIXELS_PER_NOTCH: f32 = 40.0;

const GRID_COLOR: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 0.25,
};
const CROSSHAIR_COLOR: Color = Color {
    r: 1.0,
    g: 0.3,
    b: 0.3,
    a: 0.9,
};

/// Pointer interaction forwarded from the canvas into `update`.
///
/// Cursor points and deltas are in viewport-local coordinates; `viewport`
/// is the canvas size the event was observed against, so the update loop
/// can redo the placement math against the same geometry.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub viewport: Size,
    pub kind: InteractionKind,
}

#[derive(Debug, Clone)]
pub enum InteractionKind {
    Wheel { cursor: Point, notches: f32 },
    Drag { delta: Vector },
    Hover { cursor: Point },
}

/// Canvas program for the currently selected entry.
pub struct ViewerCanvas<'a> {
    pub entry: &'a ImageEntry,
    /// Hovered source pixel, highlighted with a crosshair.
    pub hovered: Option<(u32, u32)>,
}

/// State for drag interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub is_dragging: bool,
    pub last_position: Option<Point>,
}

impl Program<Message> for ViewerCanvas<'_> {
    type State = DragState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let placement = self
            .entry
            .viewport
            .placement(bounds.size(), self.entry.image_size());

        match event {
            // Mouse wheel: cursor-anchored zoom, only while hovering the
            // drawn image
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if let Some(pos) = cursor.position_in(bounds) {
                    if placement.contains(pos) {
                        let notches = match delta {
                            mouse::ScrollDelta::Lines { y, .. } => y,
                            mouse::ScrollDelta::Pixels { y, .. } => y / PIXELS_PER_NOTCH,
                        };
                        if notches != 0.0 {
                            let message = Message::Canvas(Interaction {
                                viewport: bounds.size(),
                                kind: InteractionKind::Wheel {
                                    cursor: pos,
                                    notches,
                                },
                            });
                            return (canvas::event::Status::Captured, Some(message));
                        }
                    }
                }
            }

            // Primary or middle button starts a drag over the image
            canvas::Event::Mouse(mouse::Event::ButtonPressed(
                mouse::Button::Left | mouse::Button::Middle,
            )) => {
                if let Some(pos) = cursor.position_in(bounds) {
                    if placement.contains(pos) {
                        state.is_dragging = true;
                        state.last_position = Some(pos);
                        return (canvas::event::Status::Captured, None);
                    }
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(
                mouse::Button::Left | mouse::Button::Middle,
            )) => {
                if state.is_dragging {
                    state.is_dragging = false;
                    state.last_position = None;
                    return (canvas::event::Status::Captured, None);
                }
            }

            // Cursor movement: pan while dragging, otherwise report hover
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if let Some(pos) = cursor.position_in(bounds) {
                    if state.is_dragging {
                        if let Some(last) = state.last_position {
                            let delta = pos - last;
                            state.last_position = Some(pos);
                            let message = Message::Canvas(Interaction {
                                viewport: bounds.size(),
                                kind: InteractionKind::Drag { delta },
                            });
                            return (canvas::event::Status::Captured, Some(message));
                        }
                    }
                    let message = Message::Canvas(Interaction {
                        viewport: bounds.size(),
                        kind: InteractionKind::Hover { cursor: pos },
                    });
                    return (canvas::event::Status::Ignored, Some(message));
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let placement = self
            .entry
            .viewport
            .placement(bounds.size(), self.entry.image_size());
        let rect = Rectangle::new(placement.top_left, placement.size);

        frame.draw_image(
            rect,
            canvas::Image::new(self.entry.texture.clone()).filter_method(FilterMethod::Nearest),
        );

        let grid_w = self.entry.source.width;
        let grid_h = self.entry.source.height;
        if grid_w == 0 || grid_h == 0 {
            return vec![frame.into_geometry()];
        }
        let pixel_w = placement.size.width / grid_w as f32;
        let pixel_h = placement.size.height / grid_h as f32;

        if inspector::grid_visible(pixel_w, pixel_h) {
            // Only build lines for the visible slice of the grid; at high
            // zoom the image rectangle far exceeds the canvas.
            let first = |offset: f32, step: f32| ((-offset / step).floor().max(0.0)) as u32;
            let last = |offset: f32, step: f32, extent: f32, count: u32| {
                (((extent - offset) / step).ceil().max(0.0) as u32).min(count)
            };
            let y0 = placement.top_left.y.max(0.0);
            let y1 = (placement.top_left.y + placement.size.height).min(bounds.height);
            let x0 = placement.top_left.x.max(0.0);
            let x1 = (placement.top_left.x + placement.size.width).min(bounds.width);

            let mut builder = canvas::path::Builder::new();
            for i in first(placement.top_left.x, pixel_w)
                ..=last(placement.top_left.x, pixel_w, bounds.width, grid_w)
            {
                let x = placement.top_left.x + i as f32 * pixel_w;
                builder.move_to(Point::new(x, y0));
                builder.line_to(Point::new(x, y1));
            }
            for j in first(placement.top_left.y, pixel_h)
                ..=last(placement.top_left.y, pixel_h, bounds.height, grid_h)
            {
                let y = placement.top_left.y + j as f32 * pixel_h;
                builder.move_to(Point::new(x0, y));
                builder.line_to(Point::new(x1, y));
            }
            frame.stroke(
                &builder.build(),
                Stroke::default().with_color(GRID_COLOR).with_width(1.0),
            );

            // Crosshair around the hovered device pixel
            if let Some((hx, hy)) = self.hovered {
                let origin = Point::new(
                    placement.top_left.x + hx as f32 * pixel_w,
                    placement.top_left.y + hy as f32 * pixel_h,
                );
                let outline = canvas::Path::rectangle(origin, Size::new(pixel_w, pixel_h));
                frame.stroke(
                    &outline,
                    Stroke::default().with_color(CROSSHAIR_COLOR).with_width(2.0),
                );
            }
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.is_dragging {
            return mouse::Interaction::Grabbing;
        }
        let over_image = cursor
            .position_in(bounds)
            .map(|pos| {
                self.entry
                    .viewport
                    .placement(bounds.size(), self.entry.image_size())
                    .contains(pos)
            })
            .unwrap_or(false);
        if over_image {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}
