mod autocomplete;
mod banner;
mod booking;
mod create_ride;
mod sidebar;
pub(crate) mod state;

use std::sync::mpsc;
use std::time::Duration;

use time::{PrimitiveDateTime, UtcOffset};

use crate::backend::{Backend, HttpBackend};
use crate::cities::CityDirectory;
use crate::config::Config;
use crate::message::MessageToView;
use crate::ride::local_offset_at;

use self::booking::ResultsPage;
use self::create_ride::CreateRidePage;
use self::sidebar::Sidebar;
use self::state::Page;

pub struct View {
    page: Page,
    sidebar: Sidebar,
    cities: CityDirectory,
    create_ride: CreateRidePage,
    results: ResultsPage,
    config: Config,
    /// Offset captured at start-up, used when the platform can't tell the
    /// offset for a particular moment.
    local_offset: UtcOffset,
    backend: Box<dyn Backend>,
    channel_backend_rx: mpsc::Receiver<MessageToView>,
}

impl View {
    pub fn new(
        ctx: &egui::Context,
        config: Config,
        local_offset: UtcOffset,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<MessageToView>();
        let backend = HttpBackend::new(config.clone(), tx, ctx.clone());
        Self::with_backend(config, local_offset, Box::new(backend), rx)
    }

    fn with_backend(
        config: Config,
        local_offset: UtcOffset,
        backend: Box<dyn Backend>,
        rx: mpsc::Receiver<MessageToView>,
    ) -> Self {
        let mut view = Self {
            page: config.start_page,
            sidebar: Sidebar::default(),
            cities: CityDirectory::new(),
            create_ride: CreateRidePage::default(),
            results: ResultsPage::new(&config.ride_ids, config.booking.booked_label()),
            config,
            local_offset,
            backend,
            channel_backend_rx: rx,
        };
        view.cities.load(view.backend.as_ref(), &view.config.country);
        view.results.load(view.backend.as_ref());
        view
    }

    /// Start the native window. Blocks until it is closed.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new_and_start(config: Config, local_offset: UtcOffset) -> Result<(), eframe::Error> {
        let native_options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([960.0, 640.0])
                .with_title("Ridepool"),
            ..Default::default()
        };
        eframe::run_native(
            "Ridepool",
            native_options,
            Box::new(move |cc| Box::new(View::new(&cc.egui_ctx, config, local_offset))),
        )
    }

    /// Start on the canvas of the page that loaded the wasm module.
    #[cfg(target_arch = "wasm32")]
    pub fn new_and_start(config: Config, local_offset: UtcOffset) {
        let web_options = eframe::WebOptions::default();
        wasm_bindgen_futures::spawn_local(async move {
            let result = eframe::WebRunner::new()
                .start(
                    "the_canvas_id",
                    web_options,
                    Box::new(move |cc| Box::new(View::new(&cc.egui_ctx, config, local_offset))),
                )
                .await;
            if let Err(err) = result {
                log::error!("Failed to start eframe: {err:?}");
            }
        });
    }

    pub(crate) fn switch_page(&mut self, page: Page) {
        log::debug!("Switching to page {page:?}");
        self.page = page;
    }

    fn handle_message(&mut self, message: MessageToView, now: f64) {
        log::debug!("{message}");
        match message {
            MessageToView::Cities { country, result } => {
                self.cities.finish_load(&country, result);
            }
            MessageToView::RideCreated(outcome) => {
                let delay = Duration::from_millis(self.config.redirect_delay_ms);
                self.create_ride.finish(outcome, now, delay);
            }
            MessageToView::Booking { ride_id, outcome } => {
                self.results.finish_booking(ride_id, outcome);
            }
            MessageToView::RideDetails { ride_id, result } => {
                self.results.finish_details(ride_id, result);
            }
        }
    }

    fn process_messages(&mut self, now: f64) {
        while let Ok(message) = self.channel_backend_rx.try_recv() {
            self.handle_message(message, now);
        }
    }

    fn ui_page(&mut self, ctx: &egui::Context) {
        let fallback = self.local_offset;
        let offset_at = move |moment: PrimitiveDateTime| local_offset_at(moment, fallback);
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.page {
                Page::CreateRide => {
                    self.create_ride
                        .ui(ui, &self.cities, self.backend.as_ref(), &offset_at);
                }
                Page::Results => {
                    self.results.ui(ui, self.backend.as_ref(), self.local_offset);
                }
            });
        });
    }
}

impl eframe::App for View {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        self.process_messages(now);

        if self.create_ride.take_due_redirect(now) {
            let url = self.config.url(&self.config.listing_path);
            log::info!("Ride created, leaving for {url}");
            ctx.open_url(egui::OpenUrl::same_tab(url));
        } else if let Some(remaining) = self.create_ride.redirect_in(now) {
            ctx.request_repaint_after(remaining);
        }

        self.ui_top_bar(ctx);
        self.ui_page(ctx);
        self.ui_sidebar(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Call, RecordingBackend};
    use crate::message::{BookingOutcome, SubmitOutcome};
    use std::rc::Rc;

    /// Lets a test keep looking at the calls after the view took the backend.
    struct Shared(Rc<RecordingBackend>);

    impl Backend for Shared {
        fn fetch_cities(&self, country: &str) {
            self.0.fetch_cities(country);
        }
        fn create_ride(&self, ride: &crate::ride::NewRide) {
            self.0.create_ride(ride);
        }
        fn request_booking(&self, ride_id: u64) {
            self.0.request_booking(ride_id);
        }
        fn fetch_ride(&self, ride_id: u64) {
            self.0.fetch_ride(ride_id);
        }
    }

    fn view(config: Config) -> (View, Rc<RecordingBackend>, mpsc::Sender<MessageToView>) {
        let recorder = Rc::new(RecordingBackend::default());
        let (tx, rx) = mpsc::channel();
        let view = View::with_backend(
            config,
            UtcOffset::UTC,
            Box::new(Shared(Rc::clone(&recorder))),
            rx,
        );
        (view, recorder, tx)
    }

    #[test]
    fn start_up_loads_cities_and_rides() {
        let config = Config {
            country: "moldova".to_owned(),
            ride_ids: vec![8],
            ..Config::default()
        };
        let (view, recorder, _tx) = view(config);
        assert_eq!(view.page, Page::CreateRide);
        assert_eq!(
            recorder.calls(),
            vec![Call::FetchCities("moldova".to_owned()), Call::FetchRide(8)]
        );
    }

    #[test]
    fn messages_reach_their_component() {
        let config = Config {
            ride_ids: vec![8],
            ..Config::default()
        };
        let (mut view, _recorder, tx) = view(config);
        tx.send(MessageToView::Cities {
            country: "romania".to_owned(),
            result: Ok(vec!["Arad".to_owned()]),
        })
        .unwrap();
        tx.send(MessageToView::Booking {
            ride_id: 8,
            outcome: BookingOutcome::Booked {
                message: "Booking request sent".to_owned(),
            },
        })
        .unwrap();
        tx.send(MessageToView::RideCreated(SubmitOutcome::Created {
            message: "Ride created".to_owned(),
        }))
        .unwrap();
        view.process_messages(1.0);

        assert_eq!(view.cities.suggestions("ar"), vec!["Arad"]);
        assert_eq!(view.results.button(8).unwrap().label(), "Requested");
        assert!(view.create_ride.notice().is_some());
        assert!(!view.create_ride.take_due_redirect(1.2));
        assert!(view.create_ride.take_due_redirect(1.5));
    }

    #[test]
    fn switching_pages() {
        let (mut view, _recorder, _tx) = view(Config::default());
        view.sidebar.open();
        view.switch_page(Page::Results);
        assert_eq!(view.page, Page::Results);
    }
}
