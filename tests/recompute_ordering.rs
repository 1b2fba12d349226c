/// Integration tests for ordered quote recomputation with out-of-order completion
use async_trait::async_trait;
use print_pricing::{
    error::PricingError,
    pricing::{
        calculate_price, PriceBreakdown, PriceCalculator, PriceRequest, PricingCatalog,
        PricingStore, TierDraft,
    },
    recompute::{Issue, LocalChannel, PriceChannel, QuoteInput, QuoteOutcome, RecomputeController},
};
use tokio_test::{assert_pending, assert_ready_eq};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

type Pending = (PriceRequest, oneshot::Sender<Result<PriceBreakdown, PricingError>>);

/// Channel whose calculations finish only when the test releases them
struct ManualChannel {
    catalog: PricingCatalog,
    pending: Mutex<Vec<Pending>>,
}

impl ManualChannel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            catalog: PricingCatalog::builtin().unwrap(),
            pending: Mutex::new(Vec::new()),
        })
    }

    fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    async fn wait_for_pending(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.pending_count() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("calculations were not issued");
    }

    /// Finish the in-flight calculation for `copies`
    fn release(&self, copies: u32) {
        let (request, reply) = {
            let mut pending = self.pending.lock().unwrap();
            let index = pending
                .iter()
                .position(|(request, _)| request.copies == copies)
                .expect("no pending calculation");
            pending.remove(index)
        };
        let _ = reply.send(calculate_price(&self.catalog, &request));
    }
}

#[async_trait]
impl PriceChannel for ManualChannel {
    async fn calculate(&self, request: PriceRequest) -> Result<PriceBreakdown, PricingError> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push((request, tx));
        rx.await.expect("calculation dropped")
    }
}

fn input(color_class: &str, copies: u32) -> QuoteInput {
    QuoteInput::new()
        .color_class(color_class)
        .print_type("single")
        .pages(1)
        .copies(copies)
}

fn expected(color_class: &str, copies: u32) -> PriceBreakdown {
    calculate_price(
        &PricingCatalog::builtin().unwrap(),
        &PriceRequest::new(color_class, "single", 1, copies),
    )
    .unwrap()
}

#[tokio::test]
async fn test_only_latest_result_is_displayed() {
    let channel = ManualChannel::new();
    let controller = Arc::new(RecomputeController::new(channel.clone()));

    let first = controller.on_input(input("a4_bw_simple", 10)).unwrap();
    let second = controller.on_input(input("a4_bw_simple", 600)).unwrap();
    let third = controller.on_input(input("a4_bw_simple", 1200)).unwrap();
    assert_eq!(controller.latest_seq(), 3);

    channel.wait_for_pending(3).await;

    // Resolve in the order 3, 1, 2
    channel.release(1200);
    assert!(third.await.unwrap());
    channel.release(10);
    assert!(!first.await.unwrap());
    channel.release(600);
    assert!(!second.await.unwrap());

    let state = controller.current();
    assert!(!state.calculating);
    assert_eq!(state.breakdown(), Some(&expected("a4_bw_simple", 1200)));
}

#[tokio::test]
async fn test_subscribers_never_see_superseded_results() {
    let channel = ManualChannel::new();
    let controller = Arc::new(RecomputeController::new(channel.clone()));
    let mut display = controller.subscribe();

    let stale = controller.on_input(input("a4_bw_simple", 10)).unwrap();
    let latest = controller.on_input(input("a4_bw_simple", 20)).unwrap();
    channel.wait_for_pending(2).await;

    channel.release(20);
    assert!(latest.await.unwrap());
    channel.release(10);
    assert!(!stale.await.unwrap());

    assert!(display.has_changed().unwrap());
    let shown = display.borrow_and_update().clone();
    assert_eq!(shown.seq, 2);
    assert_eq!(shown.breakdown(), Some(&expected("a4_bw_simple", 20)));
}

#[tokio::test]
async fn test_incomplete_input_clears_immediately() {
    let channel = ManualChannel::new();
    let controller = Arc::new(RecomputeController::new(channel.clone()));

    let in_flight = controller.on_input(input("a4_bw_simple", 10)).unwrap();
    channel.wait_for_pending(1).await;

    // Pages cleared while the calculation is still running
    assert!(controller.edit(|form| form.pages = None).is_none());
    let cleared = controller.current();
    assert_eq!(cleared.outcome, QuoteOutcome::Empty);
    assert!(!cleared.calculating);

    channel.release(10);
    assert!(!in_flight.await.unwrap());
    assert_eq!(controller.current().outcome, QuoteOutcome::Empty);
}

#[tokio::test]
async fn test_errors_follow_the_same_discard_rule() {
    let channel = ManualChannel::new();
    let controller = Arc::new(RecomputeController::new(channel.clone()));

    let failing = controller.on_input(input("a9_unknown", 5)).unwrap();
    let priced = controller.on_input(input("a4_bw_simple", 7)).unwrap();
    channel.wait_for_pending(2).await;

    channel.release(7);
    assert!(priced.await.unwrap());
    channel.release(5);
    assert!(!failing.await.unwrap());
    assert_eq!(controller.current().breakdown(), Some(&expected("a4_bw_simple", 7)));

    // An error for the latest input is displayed
    let latest_failing = controller.on_input(input("a9_unknown", 9)).unwrap();
    channel.wait_for_pending(1).await;
    channel.release(9);
    assert!(latest_failing.await.unwrap());
    assert!(matches!(
        controller.current().outcome,
        QuoteOutcome::Unavailable(PricingError::NoPricingTier { .. })
    ));
}

#[tokio::test]
async fn test_repeated_input_issues_nothing() {
    let channel = ManualChannel::new();
    let controller = Arc::new(RecomputeController::new(channel.clone()));

    let handle = controller.on_input(input("a4_bw_simple", 10)).unwrap();
    assert!(controller.on_input(input("a4_bw_simple", 10)).is_none());
    assert_eq!(controller.latest_seq(), 1);

    channel.wait_for_pending(1).await;
    channel.release(10);
    assert!(handle.await.unwrap());
}

#[tokio::test]
async fn test_local_channel_reads_latest_catalog() {
    let store = Arc::new(PricingStore::builtin().unwrap());
    let channel = LocalChannel::new(PriceCalculator::new(store.clone()));
    let controller = Arc::new(RecomputeController::new(channel));

    controller.on_input(input("a4_bw_simple", 10)).unwrap().await.unwrap();
    assert_eq!(controller.current().breakdown().unwrap().unit_price, 1190);

    store
        .update_tiers(
            "a4_bw_simple",
            &[TierDraft { min: 1, max: None, single: 1000, double: 1300 }],
            "admin",
        )
        .unwrap();

    controller.edit(|form| form.copies = Some(11)).unwrap().await.unwrap();
    let breakdown = *controller.current().breakdown().unwrap();
    assert_eq!(breakdown.unit_price, 1000);
    assert_eq!(breakdown.total_price, 11_000);
}

#[test]
fn test_completion_waits_for_the_channel() {
    let channel = ManualChannel::new();
    let controller = RecomputeController::new(channel.clone());

    let Issue::Issued(ticket) = controller.issue(input("a4_bw_simple", 10)) else {
        panic!("expected a ticket");
    };
    let mut completion = tokio_test::task::spawn(controller.complete(ticket));

    assert_pending!(completion.poll());
    assert!(controller.current().calculating);
    assert_eq!(channel.pending_count(), 1);

    channel.release(10);
    assert!(completion.is_woken());
    assert_ready_eq!(completion.poll(), true);
    assert_eq!(controller.current().breakdown(), Some(&expected("a4_bw_simple", 10)));
}
