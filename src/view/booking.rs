use egui_extras::{Column, TableBuilder};
use time::UtcOffset;

use super::banner::Notice;
use crate::backend::Backend;
use crate::message::BookingOutcome;
use crate::ride::{format_departure, RideSummary};

pub const BOOK_LABEL: &str = "Book";
pub const SENDING_LABEL: &str = "Sending...";
pub const CANCELLED_LABEL: &str = "Cancelled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    Ready,
    Sending,
    /// Terminal, the button never becomes clickable again.
    Booked,
    /// The driver cancelled the ride, terminal as well.
    Cancelled,
}

/// One booking button. It disables itself while its request is in flight
/// so a second click can't send a duplicate.
#[derive(Debug, Clone)]
pub struct BookingButton {
    ride_id: u64,
    state: BookingState,
    booked_label: &'static str,
    notice: Option<Notice>,
}

impl BookingButton {
    pub fn new(ride_id: u64, booked_label: &'static str) -> Self {
        Self {
            ride_id,
            state: BookingState::Ready,
            booked_label,
            notice: None,
        }
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    pub fn label(&self) -> &str {
        match self.state {
            BookingState::Ready => BOOK_LABEL,
            BookingState::Sending => SENDING_LABEL,
            BookingState::Booked => self.booked_label,
            BookingState::Cancelled => CANCELLED_LABEL,
        }
    }

    pub fn enabled(&self) -> bool {
        self.state == BookingState::Ready
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Returns false if the click was ignored because the button is disabled.
    pub fn click(&mut self, backend: &dyn Backend) -> bool {
        if !self.enabled() {
            return false;
        }
        self.state = BookingState::Sending;
        backend.request_booking(self.ride_id);
        true
    }

    /// Make the button permanently unusable, unless the ride is already booked.
    pub fn cancel(&mut self) {
        if self.state != BookingState::Booked {
            self.state = BookingState::Cancelled;
        }
    }

    pub fn finish(&mut self, outcome: BookingOutcome) {
        if matches!(self.state, BookingState::Booked | BookingState::Cancelled) {
            log::debug!("Ride {} is {:?}, ignoring {outcome:?}", self.ride_id, self.state);
            return;
        }
        match outcome {
            BookingOutcome::Booked { message } => {
                log::info!("Booked ride {}", self.ride_id);
                self.state = BookingState::Booked;
                self.notice = Some(Notice::success(message));
            }
            BookingOutcome::Failed { message } => {
                self.state = BookingState::Ready;
                self.notice = Some(Notice::error(message));
            }
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, backend: &dyn Backend) {
        let button = match self.state() {
            BookingState::Booked | BookingState::Cancelled => {
                egui::Button::new(self.label()).fill(ui.visuals().faint_bg_color)
            }
            _ => egui::Button::new(self.label()),
        };
        if ui.add_enabled(self.enabled(), button).clicked() {
            self.click(backend);
        }
    }
}

/// A ride on the results page, its details arrive after the page is shown.
#[derive(Debug)]
struct RideRow {
    ride_id: u64,
    details: Option<Result<RideSummary, String>>,
    button: BookingButton,
}

/// The search results: a table of rides, each with its own booking button.
#[derive(Debug, Default)]
pub struct ResultsPage {
    rows: Vec<RideRow>,
}

impl ResultsPage {
    pub fn new(ride_ids: &[u64], booked_label: &'static str) -> Self {
        Self {
            rows: ride_ids
                .iter()
                .map(|&ride_id| RideRow {
                    ride_id,
                    details: None,
                    button: BookingButton::new(ride_id, booked_label),
                })
                .collect(),
        }
    }

    pub fn load(&self, backend: &dyn Backend) {
        for row in &self.rows {
            backend.fetch_ride(row.ride_id);
        }
    }

    pub fn finish_details(&mut self, ride_id: u64, result: anyhow::Result<RideSummary>) {
        if let Some(row) = self.row_mut(ride_id) {
            if matches!(&result, Ok(ride) if !ride.active) {
                log::info!("Ride {ride_id} was cancelled");
                row.button.cancel();
            }
            row.details = Some(result.map_err(|err| {
                log::warn!("Could not load ride {ride_id}: {err:#}");
                format!("{err:#}")
            }));
        }
    }

    pub fn finish_booking(&mut self, ride_id: u64, outcome: BookingOutcome) {
        match self.row_mut(ride_id) {
            Some(row) => row.button.finish(outcome),
            None => log::warn!("Booking answer for unknown ride {ride_id}"),
        }
    }

    pub fn button(&self, ride_id: u64) -> Option<&BookingButton> {
        self.rows
            .iter()
            .find(|row| row.ride_id == ride_id)
            .map(|row| &row.button)
    }

    fn row_mut(&mut self, ride_id: u64) -> Option<&mut RideRow> {
        self.rows.iter_mut().find(|row| row.ride_id == ride_id)
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, backend: &dyn Backend, offset: UtcOffset) {
        if self.rows.is_empty() {
            ui.label("No rides found.");
            return;
        }

        let row_height = egui::TextStyle::Body.resolve(ui.style()).size * 2.5;
        TableBuilder::new(ui)
            .striped(true)
            .resizable(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(120.0))
            .column(Column::auto().at_least(120.0))
            .column(Column::auto().at_least(130.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                for title in ["From", "To", "Departure", ""] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for row in &mut self.rows {
                    body.row(row_height, |mut table_row| {
                        match &row.details {
                            Some(Ok(ride)) => {
                                table_row.col(|ui| {
                                    ui.label(ride.source.as_str());
                                });
                                table_row.col(|ui| {
                                    ui.label(ride.destination.as_str());
                                });
                                table_row.col(|ui| {
                                    ui.label(format_departure(ride.departure_date, offset));
                                });
                            }
                            Some(Err(err)) => {
                                table_row.col(|ui| {
                                    ui.label(format!("Ride {}", row.ride_id));
                                });
                                table_row.col(|ui| {
                                    ui.colored_label(ui.visuals().error_fg_color, err.as_str());
                                });
                                table_row.col(|_ui| {});
                            }
                            None => {
                                table_row.col(|ui| {
                                    ui.spinner();
                                });
                                table_row.col(|_ui| {});
                                table_row.col(|_ui| {});
                            }
                        }
                        table_row.col(|ui| {
                            ui.horizontal(|ui| {
                                row.button.ui(ui, backend);
                                if let Some(notice) = row.button.notice() {
                                    notice.show(ui);
                                }
                            });
                        });
                    });
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Call, RecordingBackend};
    use crate::backend::NETWORK_ERROR;
    use crate::view::banner::Tone;

    #[test]
    fn click_disables_and_sends() {
        let backend = RecordingBackend::default();
        let mut button = BookingButton::new(4, "Requested");
        assert!(button.click(&backend));
        assert_eq!(button.label(), SENDING_LABEL);
        assert!(!button.enabled());
        assert_eq!(backend.calls(), vec![Call::RequestBooking(4)]);
    }

    #[test]
    fn second_click_while_sending_is_ignored() {
        let backend = RecordingBackend::default();
        let mut button = BookingButton::new(4, "Requested");
        button.click(&backend);
        assert!(!button.click(&backend));
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn success_is_permanent() {
        let backend = RecordingBackend::default();
        let mut button = BookingButton::new(4, "Requested");
        button.click(&backend);
        button.finish(BookingOutcome::Booked {
            message: "Booking request sent".to_owned(),
        });
        assert_eq!(button.state(), BookingState::Booked);
        assert_eq!(button.label(), "Requested");
        assert!(!button.enabled());
        assert_eq!(button.notice(), Some(&Notice::success("Booking request sent")));

        assert!(!button.click(&backend));
        button.finish(BookingOutcome::Failed {
            message: "late".to_owned(),
        });
        assert_eq!(button.state(), BookingState::Booked);
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn failure_allows_retry() {
        let backend = RecordingBackend::default();
        let mut button = BookingButton::new(4, "Already booked");
        button.click(&backend);
        button.finish(BookingOutcome::Failed {
            message: "Already booked".to_owned(),
        });
        assert!(button.enabled());
        assert_eq!(button.label(), BOOK_LABEL);
        assert_eq!(button.notice(), Some(&Notice::error("Already booked")));

        assert!(button.click(&backend));
        button.finish(BookingOutcome::Failed {
            message: NETWORK_ERROR.to_owned(),
        });
        assert_eq!(button.notice().map(|n| n.tone), Some(Tone::Error));
        assert_eq!(backend.calls(), vec![Call::RequestBooking(4), Call::RequestBooking(4)]);
    }

    #[test]
    fn results_page_fetches_every_ride() {
        let backend = RecordingBackend::default();
        let page = ResultsPage::new(&[1, 2], "Requested");
        page.load(&backend);
        assert_eq!(backend.calls(), vec![Call::FetchRide(1), Call::FetchRide(2)]);
    }

    #[test]
    fn buttons_are_independent() {
        let backend = RecordingBackend::default();
        let mut page = ResultsPage::new(&[1, 2], "Requested");
        page.row_mut(1).unwrap().button.click(&backend);
        page.row_mut(2).unwrap().button.click(&backend);
        page.finish_booking(
            2,
            BookingOutcome::Booked {
                message: "ok".to_owned(),
            },
        );
        assert_eq!(page.button(1).unwrap().state(), BookingState::Sending);
        assert_eq!(page.button(2).unwrap().state(), BookingState::Booked);
        page.finish_booking(99, BookingOutcome::Failed { message: String::new() });
    }

    fn summary(active: bool) -> RideSummary {
        RideSummary {
            source: "Arad".to_owned(),
            destination: "Iasi".to_owned(),
            departure_date: 1_714_557_600,
            active,
        }
    }

    #[test]
    fn cancelled_ride_cannot_be_booked() {
        let backend = RecordingBackend::default();
        let mut page = ResultsPage::new(&[1, 2], "Requested");
        page.finish_details(1, Ok(summary(false)));
        page.finish_details(2, Ok(summary(true)));

        let cancelled = &mut page.row_mut(1).unwrap().button;
        assert_eq!(cancelled.state(), BookingState::Cancelled);
        assert_eq!(cancelled.label(), CANCELLED_LABEL);
        assert!(!cancelled.enabled());
        assert!(!cancelled.click(&backend));
        cancelled.finish(BookingOutcome::Booked {
            message: "ok".to_owned(),
        });
        assert_eq!(cancelled.state(), BookingState::Cancelled);

        assert!(page.button(2).unwrap().enabled());
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn booked_ride_stays_booked_when_cancelled_later() {
        let backend = RecordingBackend::default();
        let mut button = BookingButton::new(4, "Requested");
        button.click(&backend);
        button.finish(BookingOutcome::Booked {
            message: "ok".to_owned(),
        });
        button.cancel();
        assert_eq!(button.state(), BookingState::Booked);
    }
}
