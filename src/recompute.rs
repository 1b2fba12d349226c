//! Ordered recomputation of the displayed quote.
//!
//! Every change to the quote form advances a sequence number and issues a
//! calculation tagged with it. Calculations may finish in any order; a
//! result is applied only if its tag is still the latest, otherwise it is
//! dropped without a trace beyond a debug log and a counter.

use crate::error::PricingError;
use crate::metrics;
use crate::pricing::{PriceBreakdown, PriceCalculator, PriceRequest, NO_SERVICE};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Asynchronous calculation capability (a network round trip in production)
#[async_trait]
pub trait PriceChannel: Send + Sync {
    async fn calculate(&self, request: PriceRequest) -> Result<PriceBreakdown, PricingError>;
}

/// In-process channel backed by the live pricing store
pub struct LocalChannel {
    calculator: PriceCalculator,
}

impl LocalChannel {
    pub fn new(calculator: PriceCalculator) -> Self {
        Self { calculator }
    }
}

#[async_trait]
impl PriceChannel for LocalChannel {
    async fn calculate(&self, request: PriceRequest) -> Result<PriceBreakdown, PricingError> {
        self.calculator.calculate(&request)
    }
}

#[async_trait]
impl<T: PriceChannel + ?Sized> PriceChannel for Arc<T> {
    async fn calculate(&self, request: PriceRequest) -> Result<PriceBreakdown, PricingError> {
        (**self).calculate(request).await
    }
}

/// Current contents of the quote form; any field may still be blank
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct QuoteInput {
    pub color_class: Option<String>,
    pub print_type: Option<String>,
    pub pages: Option<u32>,
    pub copies: Option<u32>,
    pub service: Option<String>,
}

impl QuoteInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_class(mut self, value: impl Into<String>) -> Self {
        self.color_class = Some(value.into());
        self
    }

    pub fn print_type(mut self, value: impl Into<String>) -> Self {
        self.print_type = Some(value.into());
        self
    }

    pub fn pages(mut self, value: u32) -> Self {
        self.pages = Some(value);
        self
    }

    pub fn copies(mut self, value: u32) -> Self {
        self.copies = Some(value);
        self
    }

    pub fn service(mut self, value: impl Into<String>) -> Self {
        self.service = Some(value.into());
        self
    }

    /// Request for a complete form, `None` while anything required is blank
    pub fn to_request(&self) -> Option<PriceRequest> {
        let color_class = self.color_class.as_deref().filter(|s| !s.is_empty())?;
        let print_type = self.print_type.as_deref().filter(|s| !s.is_empty())?;
        let pages = self.pages.filter(|&p| p >= 1)?;
        let copies = self.copies.filter(|&c| c >= 1)?;

        Some(
            PriceRequest::new(color_class, print_type, pages, copies)
                .with_service(self.service.as_deref().unwrap_or(NO_SERVICE)),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum QuoteOutcome {
    /// Nothing to show: form incomplete or nothing calculated yet
    #[default]
    Empty,
    Priced(PriceBreakdown),
    Unavailable(PricingError),
}

/// What the quote display shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuoteState {
    /// Sequence number of the latest issued input
    pub seq: u64,
    pub input: QuoteInput,
    /// A calculation for `seq` is in flight
    pub calculating: bool,
    pub outcome: QuoteOutcome,
}

impl QuoteState {
    pub fn breakdown(&self) -> Option<&PriceBreakdown> {
        match &self.outcome {
            QuoteOutcome::Priced(breakdown) => Some(breakdown),
            _ => None,
        }
    }
}

/// An issued calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    request: PriceRequest,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &PriceRequest {
        &self.request
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// Same input as last time; nothing issued
    Unchanged,
    /// Form incomplete; display cleared and in-flight results invalidated
    Cleared,
    Issued(Ticket),
}

/// Sole owner of the displayed quote
pub struct RecomputeController<C> {
    channel: C,
    state: watch::Sender<QuoteState>,
}

impl<C: PriceChannel> RecomputeController<C> {
    pub fn new(channel: C) -> Self {
        let (state, _) = watch::channel(QuoteState::default());
        Self { channel, state }
    }

    /// Observe the displayed quote
    pub fn subscribe(&self) -> watch::Receiver<QuoteState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> QuoteState {
        self.state.borrow().clone()
    }

    pub fn latest_seq(&self) -> u64 {
        self.state.borrow().seq
    }

    /// Record new form input and issue a calculation for it.
    ///
    /// Runs synchronously, so sequence numbers follow call order.
    pub fn issue(&self, input: QuoteInput) -> Issue {
        let mut issue = Issue::Unchanged;

        self.state.send_if_modified(|state| {
            if state.input == input {
                return false;
            }

            state.seq += 1;
            match input.to_request() {
                Some(request) => {
                    state.calculating = true;
                    issue = Issue::Issued(Ticket {
                        seq: state.seq,
                        request,
                    });
                }
                None => {
                    state.calculating = false;
                    state.outcome = QuoteOutcome::Empty;
                    issue = Issue::Cleared;
                }
            }
            state.input = input;
            true
        });

        issue
    }

    /// Run an issued calculation and apply its result if still current.
    ///
    /// Returns whether the result was applied.
    pub async fn complete(&self, ticket: Ticket) -> bool {
        let result = self.channel.calculate(ticket.request).await;
        self.apply(ticket.seq, result)
    }

    /// Apply a finished calculation; results for superseded input are dropped
    pub fn apply(&self, seq: u64, result: Result<PriceBreakdown, PricingError>) -> bool {
        let mut latest = 0;
        let applied = self.state.send_if_modified(|state| {
            latest = state.seq;
            if state.seq != seq {
                return false;
            }
            state.calculating = false;
            state.outcome = match result {
                Ok(breakdown) => QuoteOutcome::Priced(breakdown),
                Err(e) => QuoteOutcome::Unavailable(e),
            };
            true
        });

        if !applied {
            debug!(seq, latest, "Discarding stale price result");
            metrics::record_stale_result();
        }
        applied
    }
}

impl<C: PriceChannel + 'static> RecomputeController<C> {
    /// Issue for new input and run the calculation in the background
    pub fn on_input(self: &Arc<Self>, input: QuoteInput) -> Option<JoinHandle<bool>> {
        match self.issue(input) {
            Issue::Issued(ticket) => {
                let controller = Arc::clone(self);
                Some(tokio::spawn(async move { controller.complete(ticket).await }))
            }
            Issue::Unchanged | Issue::Cleared => None,
        }
    }

    /// Change one or more fields of the current input
    pub fn edit(self: &Arc<Self>, change: impl FnOnce(&mut QuoteInput)) -> Option<JoinHandle<bool>> {
        let mut input = self.state.borrow().input.clone();
        change(&mut input);
        self.on_input(input)
    }
}
