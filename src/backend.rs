/// this takes care of talking to the ride sharing backend
use std::sync::mpsc;

use anyhow::{bail, Context};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::config::Config;
use crate::message::{BookingOutcome, MessageToView, SubmitOutcome};
use crate::ride::{NewRide, RideSummary};

/// Shown when a booking fails without the server saying why.
pub const NETWORK_ERROR: &str = "Network error, please try again.";
const BOOKING_SENT: &str = "Booking request sent";
const RIDE_NOT_CREATED: &str = "The ride could not be created";

/// Every request the client makes. The answers are not returned, they come
/// back later as [`MessageToView`]s.
pub trait Backend {
    fn fetch_cities(&self, country: &str);
    fn create_ride(&self, ride: &NewRide);
    fn request_booking(&self, ride_id: u64);
    fn fetch_ride(&self, ride_id: u64);
}

/// The parts of an HTTP response the client looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<ehttp::Response> for Reply {
    fn from(response: ehttp::Response) -> Self {
        Self {
            status: response.status,
            body: response.bytes,
        }
    }
}

pub struct HttpBackend {
    config: Config,
    channel_tx: mpsc::Sender<MessageToView>,
    ctx: egui::Context,
}

impl HttpBackend {
    pub fn new(config: Config, tx: mpsc::Sender<MessageToView>, ctx: egui::Context) -> Self {
        Self {
            config,
            channel_tx: tx,
            ctx,
        }
    }

    fn headers(&self, json: bool) -> ehttp::Headers {
        let mut pairs = vec![("Accept", "application/json")];
        if json {
            pairs.push(("Content-Type", "application/json"));
        }
        if let Some(cookie) = &self.config.session_cookie {
            pairs.push(("Cookie", cookie.as_str()));
        }
        ehttp::Headers::new(&pairs)
    }

    /// Send `request` and turn whatever comes back into a message for the view.
    fn send<F>(&self, mut request: ehttp::Request, json: bool, to_message: F)
    where
        F: 'static + Send + FnOnce(Result<Reply, String>) -> MessageToView,
    {
        request.headers = self.headers(json);
        log::debug!("{} {}", request.method, request.url);
        let tx = self.channel_tx.clone();
        let ctx = self.ctx.clone();
        ehttp::fetch(request, move |result| {
            deliver(&tx, &ctx, to_message(result.map(Reply::from)));
        });
    }
}

/// Hand `message` to the view and wake it up, it only drains the channel
/// while painting.
fn deliver(tx: &mpsc::Sender<MessageToView>, ctx: &egui::Context, message: MessageToView) {
    if tx.send(message).is_err() {
        log::debug!("View is gone, dropping response");
    }
    ctx.request_repaint();
}

impl Backend for HttpBackend {
    fn fetch_cities(&self, country: &str) {
        let path = format!("/cities/{}", utf8_percent_encode(country, NON_ALPHANUMERIC));
        let country = country.to_owned();
        self.send(ehttp::Request::get(self.config.url(&path)), false, move |reply| {
            MessageToView::Cities {
                country,
                result: city_list(reply),
            }
        });
    }

    fn create_ride(&self, ride: &NewRide) {
        let body = match serde_json::to_vec(ride) {
            Ok(body) => body,
            Err(err) => {
                let message = MessageToView::RideCreated(SubmitOutcome::Transport(err.to_string()));
                deliver(&self.channel_tx, &self.ctx, message);
                return;
            }
        };
        let request = ehttp::Request::post(self.config.url("/rides/create"), body);
        self.send(request, true, |reply| {
            MessageToView::RideCreated(ride_created(reply))
        });
    }

    fn request_booking(&self, ride_id: u64) {
        let url = self.config.url(&self.config.booking.path(ride_id));
        self.send(ehttp::Request::post(url, Vec::new()), false, move |reply| {
            MessageToView::Booking {
                ride_id,
                outcome: booking_outcome(reply),
            }
        });
    }

    fn fetch_ride(&self, ride_id: u64) {
        let url = self.config.url(&format!("/rides/{ride_id}"));
        self.send(ehttp::Request::get(url), false, move |reply| {
            MessageToView::RideDetails {
                ride_id,
                result: ride_details(reply),
            }
        });
    }
}

#[derive(Deserialize)]
struct CityListBody {
    content: Vec<String>,
}

#[derive(Deserialize)]
struct StatusBody {
    status: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct RideBody {
    content: RideSummary,
}

/// `GET /cities/{country}` answers `{"content": [...]}`.
pub fn city_list(reply: Result<Reply, String>) -> anyhow::Result<Vec<String>> {
    let reply = reply.map_err(|err| anyhow::anyhow!(err)).context("City request failed")?;
    if !reply.ok() {
        bail!("City request answered with status {}", reply.status);
    }
    let body: CityListBody =
        serde_json::from_slice(&reply.body).context("City list is not valid json")?;
    Ok(body.content)
}

/// Ride creation only counts as done if the body says so, the status code
/// is not looked at.
pub fn ride_created(reply: Result<Reply, String>) -> SubmitOutcome {
    let reply = match reply {
        Ok(reply) => reply,
        Err(err) => return SubmitOutcome::Transport(err),
    };
    let body: StatusBody = match serde_json::from_slice(&reply.body) {
        Ok(body) => body,
        Err(err) => return SubmitOutcome::Transport(err.to_string()),
    };
    if body.status.as_deref() == Some("success") {
        SubmitOutcome::Created {
            message: body.message.unwrap_or_default(),
        }
    } else {
        SubmitOutcome::Rejected {
            message: body
                .message
                .unwrap_or_else(|| RIDE_NOT_CREATED.to_owned()),
        }
    }
}

/// Bookings are decided by the status code. The body may explain.
pub fn booking_outcome(reply: Result<Reply, String>) -> BookingOutcome {
    let reply = match reply {
        Ok(reply) => reply,
        Err(err) => {
            log::warn!("Booking request failed: {err}");
            return BookingOutcome::Failed {
                message: NETWORK_ERROR.to_owned(),
            };
        }
    };
    let message = serde_json::from_slice::<MessageBody>(&reply.body)
        .ok()
        .and_then(|body| body.message);
    if reply.ok() {
        BookingOutcome::Booked {
            message: message.unwrap_or_else(|| BOOKING_SENT.to_owned()),
        }
    } else {
        BookingOutcome::Failed {
            message: message.unwrap_or_else(|| NETWORK_ERROR.to_owned()),
        }
    }
}

pub fn ride_details(reply: Result<Reply, String>) -> anyhow::Result<RideSummary> {
    let reply = reply.map_err(|err| anyhow::anyhow!(err)).context("Ride request failed")?;
    let body = serde_json::from_slice::<StatusBody>(&reply.body).ok();
    if !reply.ok() {
        let reason = body.and_then(|b| b.message).unwrap_or_default();
        bail!("Ride request answered with status {} {reason}", reply.status);
    }
    let ride: RideBody = serde_json::from_slice(&reply.body).context("Ride is not valid json")?;
    Ok(ride.content)
}
