use egui::{Color32, Id, Order, Sense};
use strum::IntoEnumIterator;

use super::state::Page;
use super::View;

const SIDEBAR_WIDTH: f32 = 220.0;

/// Navigation panel plus the overlay that dims the page behind it. Both are
/// shown or hidden together.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sidebar {
    open: bool,
}

impl Sidebar {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// What the burger button does.
    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }
}

impl View {
    pub(crate) fn ui_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("☰").clicked() {
                    self.sidebar.toggle();
                }
                ui.heading(self.page.to_string());
            });
        });
    }

    /// Draws the overlay and the panel on top of everything else. Does nothing
    /// while the sidebar is closed.
    pub(crate) fn ui_sidebar(&mut self, ctx: &egui::Context) {
        if !self.sidebar.is_open() {
            return;
        }

        let screen = ctx.screen_rect();
        egui::Area::new(Id::new("sidebar overlay"))
            .order(Order::Middle)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                let response = ui.allocate_rect(screen, Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, Color32::from_black_alpha(128));
                if response.clicked() {
                    self.sidebar.close();
                }
            });

        let mut picked = None;
        egui::Area::new(Id::new("sidebar"))
            .order(Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                egui::Frame::side_top_panel(ui.style()).show(ui, |ui| {
                    ui.set_width(SIDEBAR_WIDTH);
                    ui.set_min_height(screen.height());
                    ui.vertical(|ui| {
                        ui.heading("Ridepool");
                        ui.separator();
                        for page in Page::iter() {
                            if ui.selectable_label(self.page == page, page.to_string()).clicked() {
                                picked = Some(page);
                            }
                        }
                    });
                });
            });

        if let Some(page) = picked {
            self.switch_page(page);
            self.sidebar.close();
        }
    }
}
