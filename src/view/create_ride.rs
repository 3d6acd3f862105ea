use std::time::Duration;

use time::{PrimitiveDateTime, UtcOffset};

use super::autocomplete::{Autocomplete, CityInput};
use super::banner::Notice;
use crate::backend::Backend;
use crate::cities::CityDirectory;
use crate::message::SubmitOutcome;
use crate::ride::RideDraft;

/// The "offer a ride" form.
#[derive(Debug, Default)]
pub struct CreateRidePage {
    pub draft: RideDraft,
    from: Autocomplete,
    to: Autocomplete,
    notice: Option<Notice>,
    scroll_to_notice: bool,
    /// `ui.input().time` at which to leave for the ride listing.
    redirect_at: Option<f64>,
}

impl CreateRidePage {
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Validate and send the form. Nothing is sent if the draft is invalid.
    pub fn submit(
        &mut self,
        backend: &dyn Backend,
        offset_at: &dyn Fn(PrimitiveDateTime) -> UtcOffset,
    ) {
        match self.draft.validate(offset_at) {
            Ok(ride) => {
                log::info!(
                    "Creating ride {} -> {} at {}",
                    ride.source,
                    ride.destination,
                    ride.departure_date
                );
                backend.create_ride(&ride);
            }
            Err(err) => self.set_notice(Notice::error(err.to_string())),
        }
    }

    /// Apply the backend's answer. `now` and `delay` schedule the redirect
    /// after a successful creation.
    pub fn finish(&mut self, outcome: SubmitOutcome, now: f64, delay: Duration) {
        match outcome {
            SubmitOutcome::Created { message } => {
                self.set_notice(Notice::success(message));
                self.draft.reset();
                self.from.hide();
                self.to.hide();
                self.redirect_at = Some(now + delay.as_secs_f64());
            }
            SubmitOutcome::Rejected { message } => self.set_notice(Notice::error(message)),
            SubmitOutcome::Transport(err) => {
                log::warn!("Ride creation failed: {err}");
                self.set_notice(Notice::error(format!("Error: {err}")));
            }
        }
    }

    /// True exactly once, when the scheduled redirect is due.
    pub fn take_due_redirect(&mut self, now: f64) -> bool {
        match self.redirect_at {
            Some(at) if now >= at => {
                self.redirect_at = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the redirect, if one is scheduled.
    pub fn redirect_in(&self, now: f64) -> Option<Duration> {
        self.redirect_at
            .map(|at| Duration::from_secs_f64((at - now).max(0.0)))
    }

    fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.scroll_to_notice = true;
    }

    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        cities: &CityDirectory,
        backend: &dyn Backend,
        offset_at: &dyn Fn(PrimitiveDateTime) -> UtcOffset,
    ) {
        egui::Grid::new("create ride form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("From");
                ui.add(
                    CityInput::new(&mut self.from, &mut self.draft.source, cities, "from city")
                        .hint_text("Departure city"),
                );
                ui.end_row();

                ui.label("To");
                ui.add(
                    CityInput::new(&mut self.to, &mut self.draft.destination, cities, "to city")
                        .hint_text("Arrival city"),
                );
                ui.end_row();

                ui.label("Date");
                ui.add(egui::TextEdit::singleline(&mut self.draft.date).hint_text("YYYY-MM-DD"));
                ui.end_row();

                ui.label("Time");
                ui.add(egui::TextEdit::singleline(&mut self.draft.time).hint_text("HH:MM"));
                ui.end_row();

                ui.label("Seats");
                ui.text_edit_singleline(&mut self.draft.available_seats);
                ui.end_row();

                ui.label("Price");
                ui.text_edit_singleline(&mut self.draft.price);
                ui.end_row();
            });

        if cities.is_empty() {
            ui.weak("No city suggestions available");
        }

        ui.add_space(8.0);
        if ui.button("Create ride").clicked() {
            self.submit(backend, offset_at);
        }

        if let Some(notice) = &self.notice {
            ui.add_space(8.0);
            let r = notice.show(ui);
            if self.scroll_to_notice {
                r.scroll_to_me(Some(egui::Align::Center));
                self.scroll_to_notice = false;
            }
        }
    }
}
