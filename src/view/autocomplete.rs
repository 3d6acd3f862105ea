use egui::{Id, Order, Response, Ui, Widget};

use crate::cities::CityDirectory;

/// Suggestion state of one city input.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Autocomplete {
    suggestions: Vec<String>,
    visible: bool,
}

impl Autocomplete {
    /// Refilter after every keystroke.
    pub fn on_input(&mut self, value: &str, cities: &CityDirectory) {
        self.suggestions = cities
            .suggestions(value)
            .into_iter()
            .map(str::to_owned)
            .collect();
        self.visible = !self.suggestions.is_empty();
    }

    /// Copy the clicked suggestion into the input and close the list.
    pub fn select(&mut self, index: usize, value: &mut String) -> bool {
        let Some(city) = self.suggestions.get(index) else {
            return false;
        };
        value.clone_from(city);
        self.hide();
        true
    }

    /// A click anywhere on the page. Only clicks on the input or inside
    /// the list keep it open.
    pub fn on_click(&mut self, on_input: bool, in_results: bool) {
        if !on_input && !in_results {
            self.hide();
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }
}

/// A single line text input with a city suggestion list below it.
pub struct CityInput<'a> {
    state: &'a mut Autocomplete,
    buf: &'a mut String,
    cities: &'a CityDirectory,
    popup_id: Id,
    hint: &'a str,
}

impl<'a> CityInput<'a> {
    pub fn new(
        state: &'a mut Autocomplete,
        buf: &'a mut String,
        cities: &'a CityDirectory,
        id_source: &str,
    ) -> Self {
        Self {
            state,
            buf,
            cities,
            popup_id: Id::new(id_source),
            hint: "",
        }
    }

    pub fn hint_text(mut self, hint: &'a str) -> Self {
        self.hint = hint;
        self
    }
}

impl Widget for CityInput<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let Self {
            state,
            buf,
            cities,
            popup_id,
            hint,
        } = self;

        let mut r = ui.add(egui::TextEdit::singleline(buf).hint_text(hint));
        if r.changed() {
            state.on_input(buf, cities);
        }

        let mut results_rect = None;
        if state.is_visible() {
            let input_rect = r.rect;
            let area = egui::Area::new(popup_id)
                .order(Order::Foreground)
                .fixed_pos(input_rect.left_bottom())
                .show(ui.ctx(), |ui| {
                    egui::Frame::popup(ui.style())
                        .show(ui, |ui| {
                            ui.set_min_width(input_rect.width());
                            let mut picked = None;
                            for (index, city) in state.suggestions().iter().enumerate() {
                                if ui.selectable_label(false, city.as_str()).clicked() {
                                    picked = Some(index);
                                }
                            }
                            picked
                        })
                        .inner
                });
            results_rect = Some(area.response.rect);
            if let Some(index) = area.inner {
                if state.select(index, buf) {
                    r.mark_changed();
                }
            }
        }

        let click = ui.input(|i| {
            if i.pointer.any_click() {
                i.pointer.interact_pos()
            } else {
                None
            }
        });
        if let Some(pos) = click {
            state.on_click(
                r.rect.contains(pos),
                results_rect.is_some_and(|rect| rect.contains(pos)),
            );
        }

        r
    }
}
