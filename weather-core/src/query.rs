//! Request/response state machine for weather lookups.
//!
//! [`QueryMachine`] performs no I/O. It hands out a [`Ticket`] per submission and
//! turns provider outcomes into state transitions plus follow-up [`Command`]s for
//! the caller to execute. Outcomes for any ticket other than the most recently
//! issued one are discarded.

use crate::{
    error::ProviderError,
    model::{UnitSystem, WeatherPayload, WeatherRequest, WeatherSnapshot},
};

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Loading { request_id: RequestId },
    Success { snapshot: WeatherSnapshot },
    Error { message: String },
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading { .. })
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            QueryState::Success { snapshot } => Some(snapshot),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryState::Error { message } => Some(message.as_str()),
            _ => None,
        }
    }

    /// What the presentation layer draws.
    pub fn view(&self) -> QueryView {
        QueryView {
            loading: self.is_loading(),
            snapshot: self.snapshot().cloned(),
            error: self.error().map(str::to_string),
        }
    }
}

/// Rendering-boundary value: at most one of `snapshot` / `error` is set, and
/// neither is set while `loading`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryView {
    pub loading: bool,
    pub snapshot: Option<WeatherSnapshot>,
    pub error: Option<String>,
}

/// Proof of one submission. Carries the request exactly as issued, including the
/// unit system in effect at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub request_id: RequestId,
    pub request: WeatherRequest,
}

/// Side effects a transition asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RecordRecent(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// State moved to `Success`; commands still need executing.
    Success(Vec<Command>),
    /// State moved to `Error`.
    Failed,
    /// A newer ticket exists; state untouched.
    Stale,
}

#[derive(Debug, Default)]
pub struct QueryMachine {
    state: QueryState,
    latest: RequestId,
}

impl QueryMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn latest_request_id(&self) -> RequestId {
        self.latest
    }

    /// Issues the next request id and moves to `Loading` right away.
    pub fn begin(&mut self, city: &str, units: UnitSystem) -> Ticket {
        self.latest += 1;
        self.state = QueryState::Loading { request_id: self.latest };

        Ticket {
            request_id: self.latest,
            request: WeatherRequest { city: city.to_string(), units },
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.request_id == self.latest
    }

    pub fn resolve(
        &mut self,
        ticket: &Ticket,
        outcome: Result<WeatherPayload, ProviderError>,
    ) -> Resolution {
        if !self.is_current(ticket) {
            tracing::debug!(
                request_id = ticket.request_id,
                latest = self.latest,
                "discarding stale response"
            );
            return Resolution::Stale;
        }

        let snapshot = outcome
            .and_then(|payload| WeatherSnapshot::from_payload(payload, ticket.request.units));

        match snapshot {
            Ok(snapshot) => {
                self.state = QueryState::Success { snapshot };
                Resolution::Success(vec![Command::RecordRecent(ticket.request.city.clone())])
            }
            Err(e) => {
                tracing::info!(
                    request_id = ticket.request_id,
                    city = %ticket.request.city,
                    error = %e,
                    "weather lookup failed"
                );
                self.state = QueryState::Error { message: e.user_message().to_string() };
                Resolution::Failed
            }
        }
    }
}
