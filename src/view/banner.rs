use egui::{Color32, Response, RichText, Ui};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

impl Tone {
    fn colors(self) -> (Color32, Color32) {
        match self {
            // green-500 background, white text
            Tone::Success => (Color32::from_rgb(34, 197, 94), Color32::WHITE),
            // red-500 background, red-100 text
            Tone::Error => (
                Color32::from_rgb(239, 68, 68),
                Color32::from_rgb(254, 226, 226),
            ),
        }
    }
}

/// A colored message box telling the user how their last action went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub tone: Tone,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Error,
        }
    }

    pub fn show(&self, ui: &mut Ui) -> Response {
        let (fill, text) = self.tone.colors();
        egui::Frame::none()
            .fill(fill)
            .rounding(4.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(&self.text).color(text));
            })
            .response
    }
}
