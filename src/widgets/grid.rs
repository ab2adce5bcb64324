//! The grid surface: draws the layout draft as framed panel cards and turns
//! pointer interaction back into layout mutations.

use eframe::egui::{
    self, pos2, vec2, Align2, CursorIcon, Rect, Response, Sense, StrokeKind, Ui, UiBuilder,
};

use crate::document::PanelSpec;
use crate::layout::LayoutEntry;

const HEADER_HEIGHT: f32 = 24.0;
const RESIZE_HANDLE: f32 = 14.0;

/// What happened to the layout this frame.
pub struct GridBoardResponse {
    /// At least one entry moved or resized; the caller should feed the
    /// mutated layout back into its controller.
    pub changed: bool,
    pub response: Response,
}

/// Builder for the dashboard grid.
///
/// The board mutates the passed layout in place; drags and resizes snap to
/// whole cells as the pointer crosses them. Panel bodies are drawn by the
/// renderer callback, or as labeled placeholders without one.
#[must_use = "You should call `show` on this board"]
pub struct GridBoard<'a> {
    layout: &'a mut Vec<LayoutEntry>,
    panels: &'a [PanelSpec],
    columns: u32,
    row_height: f32,
    gutter: f32,
    editable: bool,
    renderer: Option<&'a mut dyn FnMut(&mut Ui, &PanelSpec)>,
}

impl<'a> GridBoard<'a> {
    pub fn new(layout: &'a mut Vec<LayoutEntry>, panels: &'a [PanelSpec]) -> Self {
        Self {
            layout,
            panels,
            columns: 12,
            row_height: 100.0,
            gutter: 8.0,
            editable: false,
            renderer: None,
        }
    }

    /// Number of grid columns (default: 12).
    #[inline]
    pub fn columns(mut self, columns: u32) -> Self {
        self.columns = columns.max(1);
        self
    }

    /// Height of one grid row in points (default: 100).
    #[inline]
    pub fn row_height(mut self, row_height: f32) -> Self {
        self.row_height = row_height.max(1.0);
        self
    }

    #[inline]
    pub fn gutter(mut self, gutter: f32) -> Self {
        self.gutter = gutter.max(0.0);
        self
    }

    /// Whether panels react to drag and resize at all.
    #[inline]
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Draw panel bodies through this callback instead of the built-in
    /// placeholder labels.
    #[inline]
    pub fn renderer(mut self, renderer: &'a mut dyn FnMut(&mut Ui, &PanelSpec)) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn show(self, ui: &mut Ui) -> GridBoardResponse {
        let Self {
            layout,
            panels,
            columns,
            row_height,
            gutter,
            editable,
            mut renderer,
        } = self;

        let available = ui.available_width();
        let pitch_x = (available + gutter) / columns as f32;
        let pitch_y = row_height + gutter;

        let rows = layout
            .iter()
            .map(|entry| entry.y + entry.h)
            .max()
            .unwrap_or(0)
            .max(2);
        let (grid_rect, response) =
            ui.allocate_exact_size(vec2(available, rows as f32 * pitch_y), Sense::hover());
        let origin = grid_rect.min;

        if layout.is_empty() {
            ui.painter().text(
                grid_rect.center(),
                Align2::CENTER_CENTER,
                "This dashboard has no panels yet.",
                egui::TextStyle::Body.resolve(ui.style()),
                ui.visuals().weak_text_color(),
            );
            return GridBoardResponse {
                changed: false,
                response,
            };
        }

        let mut changed = false;
        for entry in layout.iter_mut() {
            let rect = Rect::from_min_size(
                origin + vec2(entry.x as f32 * pitch_x, entry.y as f32 * pitch_y),
                vec2(
                    (entry.w as f32 * pitch_x - gutter).max(1.0),
                    (entry.h as f32 * pitch_y - gutter).max(1.0),
                ),
            );
            let header_rect = Rect::from_min_size(rect.min, vec2(rect.width(), HEADER_HEIGHT));
            let body_rect =
                Rect::from_min_max(pos2(rect.left(), rect.top() + HEADER_HEIGHT), rect.max);

            let panel = panels.iter().find(|panel| panel.id == entry.id);
            let title = match (entry.is_placeholder(), panel) {
                (true, _) => "empty panel".to_owned(),
                (false, Some(panel)) => panel.id.clone(),
                (false, None) => format!("{} (no panel configured)", entry.id),
            };
            {
                let visuals = ui.visuals();
                let painter = ui.painter();
                painter.rect_filled(rect, 2.0, visuals.panel_fill);
                painter.rect_filled(header_rect, 2.0, visuals.faint_bg_color);
                painter.rect_stroke(
                    rect,
                    2.0,
                    visuals.widgets.noninteractive.bg_stroke,
                    StrokeKind::Inside,
                );
                painter.text(
                    pos2(header_rect.left() + 8.0, header_rect.center().y),
                    Align2::LEFT_CENTER,
                    title,
                    egui::TextStyle::Small.resolve(ui.style()),
                    visuals.text_color(),
                );
            }

            match (panel, renderer.as_mut()) {
                (Some(panel), Some(renderer)) => {
                    ui.scope_builder(UiBuilder::new().max_rect(body_rect.shrink(4.0)), |ui| {
                        renderer(ui, panel);
                    });
                }
                (Some(panel), None) => {
                    ui.painter().text(
                        body_rect.center(),
                        Align2::CENTER_CENTER,
                        format!("{:?}", panel.panel_type),
                        egui::TextStyle::Monospace.resolve(ui.style()),
                        ui.visuals().weak_text_color(),
                    );
                }
                (None, _) => {
                    // Dangling layout entries are tolerated and shown empty.
                    ui.painter().text(
                        body_rect.center(),
                        Align2::CENTER_CENTER,
                        "∅",
                        egui::TextStyle::Heading.resolve(ui.style()),
                        ui.visuals().weak_text_color(),
                    );
                }
            }

            if !editable {
                continue;
            }

            // Drag on the header, committing whole cells as the pointer
            // crosses them.
            let drag_id = ui.id().with("board_drag").with(&entry.id);
            let drag = ui.interact(header_rect, drag_id, Sense::drag());
            if drag.hovered() || drag.dragged() {
                ui.ctx().set_cursor_icon(CursorIcon::Grab);
            }
            if drag.dragged() {
                ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
                let mut acc: egui::Vec2 =
                    ui.data_mut(|d| d.get_temp(drag_id)).unwrap_or(egui::Vec2::ZERO);
                acc += drag.drag_delta();
                while acc.x >= pitch_x && entry.x + entry.w < columns {
                    entry.x += 1;
                    acc.x -= pitch_x;
                    entry.moved = Some(true);
                    changed = true;
                }
                while acc.x <= -pitch_x && entry.x > 0 {
                    entry.x -= 1;
                    acc.x += pitch_x;
                    entry.moved = Some(true);
                    changed = true;
                }
                while acc.y >= pitch_y {
                    entry.y += 1;
                    acc.y -= pitch_y;
                    entry.moved = Some(true);
                    changed = true;
                }
                while acc.y <= -pitch_y && entry.y > 0 {
                    entry.y -= 1;
                    acc.y += pitch_y;
                    entry.moved = Some(true);
                    changed = true;
                }
                ui.data_mut(|d| d.insert_temp(drag_id, acc));
            } else if drag.drag_stopped() {
                ui.data_mut(|d| d.remove_temp::<egui::Vec2>(drag_id));
            }

            // Resize from the bottom-right corner.
            let corner = Rect::from_min_size(
                rect.max - vec2(RESIZE_HANDLE, RESIZE_HANDLE),
                vec2(RESIZE_HANDLE, RESIZE_HANDLE),
            );
            let resize_id = ui.id().with("board_resize").with(&entry.id);
            let resize = ui.interact(corner, resize_id, Sense::drag());
            if resize.hovered() || resize.dragged() {
                ui.ctx().set_cursor_icon(CursorIcon::ResizeNwSe);
            }
            if resize.dragged() {
                let min_w = entry.min_w.unwrap_or(1).max(1);
                let min_h = entry.min_h.unwrap_or(1).max(1);
                let mut acc: egui::Vec2 =
                    ui.data_mut(|d| d.get_temp(resize_id)).unwrap_or(egui::Vec2::ZERO);
                acc += resize.drag_delta();
                while acc.x >= pitch_x && entry.x + entry.w < columns {
                    entry.w += 1;
                    acc.x -= pitch_x;
                    changed = true;
                }
                while acc.x <= -pitch_x && entry.w > min_w {
                    entry.w -= 1;
                    acc.x += pitch_x;
                    changed = true;
                }
                while acc.y >= pitch_y {
                    entry.h += 1;
                    acc.y -= pitch_y;
                    changed = true;
                }
                while acc.y <= -pitch_y && entry.h > min_h {
                    entry.h -= 1;
                    acc.y += pitch_y;
                    changed = true;
                }
                ui.data_mut(|d| d.insert_temp(resize_id, acc));
            } else if resize.drag_stopped() {
                ui.data_mut(|d| d.remove_temp::<egui::Vec2>(resize_id));
            }
        }

        GridBoardResponse { changed, response }
    }
}
