use iced::keyboard::{self, key};
use iced::widget::{button, checkbox, column, container, horizontal_space, row, text, Canvas};
use iced::{event, window, Alignment, Element, Length, Size, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

mod codec;
mod colormap;
mod error;
mod preview;
mod state;
mod thumbnail;
mod ui;
mod viewport;

use state::collection::Collection;
use state::entry::ImageEntry;
use ui::canvas::{Interaction, InteractionKind, ViewerCanvas};

/// Poll cadence for the file change watcher and the stale-preview sweep.
const WATCH_INTERVAL: Duration = Duration::from_millis(250);

/// Main application state
struct PixelWatch {
    /// All loaded images, selection and the shared display config
    collection: Collection,
    /// Last observed viewer canvas size, for placement math between
    /// canvas events
    viewer_size: Option<Size>,
    /// Hovered source pixel of the selected entry
    hovered: Option<(u32, u32)>,
    /// Formatted raw value readout for the hovered pixel
    hover_info: String,
    /// General status message
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked the "Open" button
    OpenFiles,
    /// A file or directory was dropped onto the window
    FileDropped(PathBuf),
    /// A gallery thumbnail was clicked
    Select(usize),
    /// Delete button or Delete key
    DeleteSelected,
    /// Back to fit-to-window for the selected entry
    ResetView,
    SetGrayscale(bool),
    SetAutoContrast(bool),
    SetPseudoColor(bool),
    SetIgnoreAlpha(bool),
    SetLinkView(bool),
    /// Pointer interaction forwarded by the viewer canvas
    Canvas(Interaction),
    /// Watcher/rebuild poll
    Tick,
}

impl PixelWatch {
    fn new() -> (Self, Task<Message>) {
        (
            PixelWatch {
                collection: Collection::new(),
                viewer_size: None,
                hovered: None,
                hover_info: String::new(),
                status: String::from("Drop images onto the window to inspect them."),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFiles => {
                let picked = FileDialog::new()
                    .set_title("Open Images")
                    .add_filter("Images", codec::SUPPORTED_EXTENSIONS)
                    .pick_files();
                if let Some(paths) = picked {
                    for path in paths {
                        self.ingest_path(&path);
                    }
                }
            }
            Message::FileDropped(path) => self.ingest_path(&path),
            Message::Select(index) => {
                self.collection.select(index);
                self.clear_hover();
            }
            Message::DeleteSelected => {
                if let Some(removed) = self.collection.remove_selected() {
                    // Dropping the entry releases its texture handles.
                    self.status = format!("Removed {}", removed.filename);
                }
                self.clear_hover();
            }
            Message::ResetView => {
                if let Some(entry) = self.collection.selected_entry_mut() {
                    entry.viewport.reset();
                }
                self.propagate_link();
            }
            Message::SetGrayscale(value) => {
                self.collection.config.grayscale = value;
                self.collection.rebuild_stale();
            }
            Message::SetAutoContrast(value) => {
                self.collection.config.auto_contrast = value;
                self.collection.rebuild_stale();
            }
            Message::SetPseudoColor(value) => {
                self.collection.config.pseudo_color = value;
                self.collection.rebuild_stale();
            }
            Message::SetIgnoreAlpha(value) => {
                self.collection.config.ignore_alpha = value;
                self.collection.rebuild_stale();
            }
            Message::SetLinkView(value) => {
                self.collection.link_view = value;
                self.propagate_link();
            }
            Message::Canvas(interaction) => self.apply_interaction(interaction),
            Message::Tick => self.tick(),
        }
        Task::none()
    }

    /// Route a dropped or picked path: directories are walked for
    /// allow-listed images, files go through the extension filter.
    fn ingest_path(&mut self, path: &Path) {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && codec::is_supported_extension(p) {
                    self.load_one(p);
                }
            }
            return;
        }

        if !codec::is_supported_extension(path) {
            show_error(&format!("Not a valid image file: {}", path.display()));
            return;
        }
        self.load_one(path);
    }

    /// Load a single image, skipping duplicates silently and surfacing
    /// load failures as a modal. No partial entry is created on failure.
    fn load_one(&mut self, path: &Path) {
        if self.collection.contains_path(path) {
            log::debug!("Skipping already loaded file: {}", path.display());
            return;
        }
        match ImageEntry::load(path, self.collection.config) {
            Ok(entry) => {
                log::info!("Loaded {} ({})", path.display(), entry.stats.source);
                self.status = format!("Loaded {} ({})", entry.filename, entry.stats.source);
                self.collection.push(entry);
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                show_error(&e.to_string());
            }
        }
    }

    /// Apply one canvas interaction to the selected entry, then refresh
    /// the hover readout and link state.
    fn apply_interaction(&mut self, interaction: Interaction) {
        let avail = interaction.viewport;
        self.viewer_size = Some(avail);

        let mut hover = None;
        if let Some(entry) = self.collection.selected_entry_mut() {
            let image = entry.image_size();
            match interaction.kind {
                InteractionKind::Wheel { cursor, notches } => {
                    entry.viewport.wheel_zoom(avail, image, cursor, notches);
                }
                InteractionKind::Drag { delta } => {
                    entry.viewport.drag_pan(avail, image, delta);
                }
                InteractionKind::Hover { cursor } => {
                    let placement = entry.viewport.observe_placement(avail, image);
                    let hit = viewport::inspector::hit_test(
                        cursor,
                        &placement,
                        entry.source.width,
                        entry.source.height,
                    );
                    let info = hit
                        .map(|(x, y)| {
                            let mut info =
                                viewport::inspector::format_pixel(&entry.source, x, y);
                            // Raw values first; append the post-transform
                            // values when the preview is not a plain cast.
                            if entry.applied_config != preview::PreviewConfig::default() {
                                if let Some(px) = entry.preview.flat_pixel(x, y) {
                                    info.push_str(&format!(" -> {:?}", px));
                                }
                            }
                            info
                        })
                        .unwrap_or_default();
                    hover = Some((hit, info));
                }
            }
        }
        if let Some((hit, info)) = hover {
            self.hovered = hit;
            self.hover_info = info;
        }
        self.propagate_link();
    }

    /// Watcher poll. Fixed order: change detection for every entry, then
    /// link propagation, then the config-staleness rebuild sweep, so a
    /// rebuild never races a reload of the same entry.
    fn tick(&mut self) {
        for entry in &mut self.collection.entries {
            match state::watcher::check_and_reload(entry) {
                Ok(true) => entry.status_line = None,
                Ok(false) => {}
                Err(e) => {
                    let message = e.to_string();
                    if entry.status_line.as_deref() != Some(&message) {
                        log::warn!("Reload failed for {}: {}", entry.filename, message);
                        entry.status_line = Some(message);
                    }
                }
            }
        }

        // Keep the fit bound seeded even before the first pointer event.
        if let Some(avail) = self.viewer_size {
            if let Some(entry) = self.collection.selected_entry_mut() {
                let image = entry.image_size();
                entry.viewport.observe_placement(avail, image);
            }
        }

        self.propagate_link();
        self.collection.rebuild_stale();
    }

    fn propagate_link(&mut self) {
        if self.collection.link_view {
            viewport::link::propagate(self.collection.selected, &mut self.collection.entries);
        }
    }

    fn clear_hover(&mut self) {
        self.hovered = None;
        self.hover_info.clear();
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let config = self.collection.config;

        let toolbar = row![
            button("Open…").on_press(Message::OpenFiles).padding(6),
            checkbox("Grayscale", config.grayscale).on_toggle(Message::SetGrayscale),
            checkbox("Auto contrast", config.auto_contrast).on_toggle(Message::SetAutoContrast),
            checkbox("Pseudo color", config.pseudo_color).on_toggle(Message::SetPseudoColor),
            checkbox("Ignore alpha", config.ignore_alpha).on_toggle(Message::SetIgnoreAlpha),
            checkbox("Link view", self.collection.link_view).on_toggle(Message::SetLinkView),
            horizontal_space(),
            button("Reset view").on_press_maybe(
                (!self.collection.is_empty()).then_some(Message::ResetView)
            ),
            button("Delete").on_press_maybe(
                (!self.collection.is_empty()).then_some(Message::DeleteSelected)
            ),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let viewer: Element<'_, Message> = match self.collection.selected_entry() {
            Some(entry) => Canvas::new(ViewerCanvas {
                entry,
                hovered: self.hovered,
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
            None => container(text("Drop images here").size(24))
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        let body = row![ui::gallery::gallery(&self.collection), viewer].spacing(8);

        column![toolbar, body, text(self.status_line()).size(14)]
            .spacing(8)
            .padding(8)
            .into()
    }

    /// Compose the status bar: shapes, observed range, per-entry errors
    /// and the hovered pixel readout.
    fn status_line(&self) -> String {
        let Some(entry) = self.collection.selected_entry() else {
            return self.status.clone();
        };

        let mut line = format!(
            "{} | original {}, preview {}",
            entry.path.display(),
            entry.stats.source,
            entry.stats.preview
        );
        if let Some(range) = &entry.preview.contrast {
            line.push_str(&format!(" | range [{}, {}]", range.min_val, range.max_val));
        }
        if let Some(error) = &entry.status_line {
            line.push_str(&format!(" | {}", error));
        }
        if !self.hover_info.is_empty() {
            line.push_str(&format!(" | {}", self.hover_info));
        }
        line
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            event::listen_with(handle_event),
            iced::time::every(WATCH_INTERVAL).map(|_| Message::Tick),
        ])
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Translate runtime events into messages: drag-and-drop intake and the
/// Delete key (only when no widget captured it).
fn handle_event(
    event: iced::Event,
    status: event::Status,
    _window: window::Id,
) -> Option<Message> {
    match event {
        iced::Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        iced::Event::Keyboard(keyboard::Event::KeyPressed {
            key: keyboard::Key::Named(key::Named::Delete),
            ..
        }) if status == event::Status::Ignored => Some(Message::DeleteSelected),
        _ => None,
    }
}

/// Modal error dialog for load-path failures.
fn show_error(message: &str) {
    log::error!("{message}");
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("Pixel Watch")
        .set_description(message)
        .show();
}

fn main() -> iced::Result {
    env_logger::init();
    iced::application("Pixel Watch", PixelWatch::update, PixelWatch::view)
        .subscription(PixelWatch::subscription)
        .theme(PixelWatch::theme)
        .window_size(Size::new(900.0, 500.0))
        .centered()
        .run_with(PixelWatch::new)
}
