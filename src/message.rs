use core::fmt;

use crate::ride::RideSummary;

/// Messages from the network callbacks to the view. The callbacks may run on
/// another thread (natively) or in a later turn of the event loop (wasm), so
/// everything they learn is passed over a channel and applied by the view at
/// the start of the next frame.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub enum MessageToView {
    Cities {
        country: String,
        result: anyhow::Result<Vec<String>>,
    },
    RideCreated(SubmitOutcome),
    Booking {
        ride_id: u64,
        outcome: BookingOutcome,
    },
    RideDetails {
        ride_id: u64,
        result: anyhow::Result<RideSummary>,
    },
}

impl fmt::Display for MessageToView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageToView::Cities {
                country,
                result: Ok(cities),
            } => write!(f, "MessageToView::Cities({country}, {} cities)", cities.len()),
            MessageToView::Cities {
                country,
                result: Err(err),
            } => write!(f, "MessageToView::Cities({country}, {err})"),
            MessageToView::RideCreated(outcome) => {
                write!(f, "MessageToView::RideCreated({outcome:?})")
            }
            MessageToView::Booking { ride_id, outcome } => {
                write!(f, "MessageToView::Booking({ride_id}, {outcome:?})")
            }
            MessageToView::RideDetails {
                ride_id,
                result: Ok(_),
            } => write!(f, "MessageToView::RideDetails({ride_id})"),
            MessageToView::RideDetails {
                ride_id,
                result: Err(err),
            } => write!(f, "MessageToView::RideDetails({ride_id}, {err})"),
        }
    }
}

/// What became of a ride creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The body said `"status": "success"`.
    Created { message: String },
    /// Any other status, carrying the server's text.
    Rejected { message: String },
    /// No usable response at all.
    Transport(String),
}

/// What became of a booking request. Only the status code decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked { message: String },
    Failed { message: String },
}
