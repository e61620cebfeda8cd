//! Order flow state machine
//!
//! Drives one wizard session from generated artwork to a confirmed order:
//!
//! ```text
//! IDLE -> PREPARING -> READY -> DRAFT_CREATED -> CONFIRMED
//! ```
//!
//! Entering PREPARING probes connectivity and hosts the artwork; both are
//! fatal to the connected path and any failure switches the whole session to
//! the simulated (offline) track instead of blocking the user. Mockup
//! generation and the two estimates run as background tasks and never block
//! the READY transition. Draft creation and confirmation are user-triggered,
//! surfaced on failure, and retryable; the system itself never retries them.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::domain::{
    ImageAsset, MockupStatus, Order, OrderCosts, ProductKind, Recipient, RecipientError,
    ShippingRate,
};
use crate::fulfillment::{FulfillmentApi, FulfillmentError};
use crate::hosting::ImageHost;

/// Fixed cadence between mockup poll attempts
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Upper bound on mockup poll attempts (~60 seconds wall-clock)
pub const MAX_POLL_ATTEMPTS: u32 = 30;

/// Stand-in delay for manufacturing hand-off on the simulated track
const SIMULATED_DELAY: Duration = Duration::from_millis(1500);

/// Errors from the mockup generation pipeline. All of them are best-effort:
/// the caller falls back to the locally rendered preview.
#[derive(Debug, Error)]
pub enum MockupError {
    #[error("mockup task creation failed: {0}")]
    Create(#[from] FulfillmentError),

    #[error("mockup generation failed upstream: {0}")]
    Failed(String),

    #[error("mockup polling timed out after {attempts} attempts")]
    TimedOut { attempts: u32 },
}

/// Errors surfaced to the user by the order flow
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("cannot {action} while the flow is {state}")]
    InvalidState {
        action: &'static str,
        state: FlowState,
    },

    #[error("invalid recipient: {0}")]
    Recipient(#[from] RecipientError),

    #[error("order error: {0}")]
    Order(#[from] FulfillmentError),
}

/// Wizard session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Preparing,
    Ready,
    DraftCreated,
    Confirmed,
}

impl std::fmt::Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowState::Idle => write!(f, "idle"),
            FlowState::Preparing => write!(f, "preparing"),
            FlowState::Ready => write!(f, "ready"),
            FlowState::DraftCreated => write!(f, "draft_created"),
            FlowState::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// Which track the session runs on after the connectivity probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    Online,
    /// Fulfillment unreachable or hosting failed: every subsequent step is
    /// simulated locally and no remote call is made.
    Offline,
}

/// Current product preview available to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockupPreview {
    /// Remote mockup still in flight; render the local preview meanwhile
    Pending,
    /// Photorealistic mockups from the fulfillment service
    Remote(Vec<String>),
    /// Remote generation failed or timed out; the local preview stands
    LocalFallback,
}

/// Run a mockup task to completion
///
/// Waits the fixed cadence before each attempt and gives up after
/// [`MAX_POLL_ATTEMPTS`]. Transport-level poll failures are tolerated
/// silently and consume an attempt; only a `completed` or `failed` status
/// ends the loop early.
pub async fn poll_mockup_to_completion(
    client: &dyn FulfillmentApi,
    task_key: &str,
) -> Result<Vec<String>, MockupError> {
    for attempt in 1..=MAX_POLL_ATTEMPTS {
        tokio::time::sleep(POLL_INTERVAL).await;

        match client.poll_mockup_task(task_key).await {
            Ok(task) => match task.status {
                MockupStatus::Completed => {
                    debug!(task_key, attempt, "Mockup task completed");
                    return Ok(task.result_urls);
                }
                MockupStatus::Failed => {
                    return Err(MockupError::Failed(
                        task.error.unwrap_or_else(|| "no reason given".to_string()),
                    ));
                }
                MockupStatus::Pending => {}
            },
            Err(e) => {
                debug!(task_key, attempt, error = %e, "Mockup poll attempt failed");
            }
        }
    }

    Err(MockupError::TimedOut {
        attempts: MAX_POLL_ATTEMPTS,
    })
}

async fn generate_mockup(
    client: &dyn FulfillmentApi,
    image_url: &Url,
    product: ProductKind,
) -> Result<Vec<String>, MockupError> {
    let task_key = client.create_mockup_task(image_url, product).await?;
    poll_mockup_to_completion(client, &task_key).await
}

/// One wizard session's order flow
///
/// Single-owner and client-local: all mutation goes through `&mut self`, so
/// no locking is needed. Background work is delivered through watch channels
/// and aborted when the flow is dropped, so a session the user navigated
/// away from never reports a stale mockup.
pub struct OrderFlow {
    fulfillment: Arc<dyn FulfillmentApi>,
    host: Arc<dyn ImageHost>,
    product: ProductKind,
    artwork: ImageAsset,
    /// Recipient used for pre-checkout estimates only
    estimate_recipient: Recipient,

    state: FlowState,
    mode: ConnectionMode,
    hosted_url: Option<Url>,
    order: Option<Order>,

    mockup_tx: Option<watch::Sender<MockupPreview>>,
    mockup_rx: watch::Receiver<MockupPreview>,
    rates_tx: Option<watch::Sender<Vec<ShippingRate>>>,
    rates_rx: watch::Receiver<Vec<ShippingRate>>,
    costs_tx: Option<watch::Sender<OrderCosts>>,
    costs_rx: watch::Receiver<OrderCosts>,

    jobs: Vec<JoinHandle<()>>,
}

impl OrderFlow {
    pub fn new(
        fulfillment: Arc<dyn FulfillmentApi>,
        host: Arc<dyn ImageHost>,
        artwork: ImageAsset,
        product: ProductKind,
    ) -> Self {
        let (mockup_tx, mockup_rx) = watch::channel(MockupPreview::Pending);
        let (rates_tx, rates_rx) = watch::channel(Vec::new());
        let (costs_tx, costs_rx) = watch::channel(OrderCosts::placeholder());

        OrderFlow {
            fulfillment,
            host,
            product,
            artwork,
            estimate_recipient: Recipient::default(),
            state: FlowState::Idle,
            mode: ConnectionMode::Online,
            hosted_url: None,
            order: None,
            mockup_tx: Some(mockup_tx),
            mockup_rx,
            rates_tx: Some(rates_tx),
            rates_rx,
            costs_tx: Some(costs_tx),
            costs_rx,
            jobs: Vec::new(),
        }
    }

    /// Override the recipient used for pre-checkout estimates
    pub fn with_estimate_recipient(mut self, recipient: Recipient) -> Self {
        self.estimate_recipient = recipient;
        self
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Meaningful once `prepare` has run
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Latest cost estimate; the placeholder until a real one resolves
    pub fn costs(&self) -> OrderCosts {
        self.costs_rx.borrow().clone()
    }

    /// Latest shipping-rate estimate; empty until one resolves
    pub fn shipping_rates(&self) -> Vec<ShippingRate> {
        self.rates_rx.borrow().clone()
    }

    /// Mockup preview as of now, without waiting
    pub fn current_mockup(&self) -> MockupPreview {
        self.mockup_rx.borrow().clone()
    }

    /// Wait until the mockup pipeline settles on a preview
    pub async fn mockup_preview(&mut self) -> MockupPreview {
        loop {
            let current = self.mockup_rx.borrow().clone();
            if current != MockupPreview::Pending {
                return current;
            }
            if self.mockup_rx.changed().await.is_err() {
                return self.mockup_rx.borrow().clone();
            }
        }
    }

    /// Run the preparation sequence (IDLE -> PREPARING -> READY)
    ///
    /// Connectivity probe and artwork hosting are the fatal steps; failure
    /// of either switches the session to the simulated track. Mockup
    /// generation and estimates are spawned in the background and do not
    /// block the READY transition.
    pub async fn prepare(&mut self) -> FlowState {
        if self.state != FlowState::Idle {
            return self.state;
        }
        self.state = FlowState::Preparing;

        if !self.fulfillment.check_connection().await {
            warn!("Fulfillment service unreachable, continuing in simulated mode");
            self.enter_offline();
            return self.state;
        }

        let hosted = match self.artwork.ensure_hosted(self.host.as_ref()).await {
            Ok(url) => url.clone(),
            Err(e) => {
                warn!(error = %e, "Artwork hosting failed, continuing in simulated mode");
                self.enter_offline();
                return self.state;
            }
        };
        self.hosted_url = Some(hosted.clone());

        self.spawn_mockup_job(hosted.clone());
        self.spawn_estimate_jobs(hosted);

        self.state = FlowState::Ready;
        info!(product = %self.product, "Order flow ready (online)");
        self.state
    }

    /// Submit shipping details (READY -> DRAFT_CREATED)
    ///
    /// On failure the flow stays READY and the same submission can be
    /// retried.
    pub async fn submit_shipping(&mut self, recipient: Recipient) -> Result<&Order, FlowError> {
        if self.state != FlowState::Ready {
            return Err(FlowError::InvalidState {
                action: "place an order",
                state: self.state,
            });
        }
        recipient.validate()?;

        let order = match (self.mode, self.hosted_url.clone()) {
            (ConnectionMode::Online, Some(image_url)) => {
                match self
                    .fulfillment
                    .create_draft_order(&recipient, &image_url, self.product)
                    .await
                {
                    Ok(order) => order,
                    Err(e) => {
                        error!(error = %e, "Draft order creation failed");
                        return Err(FlowError::Order(e));
                    }
                }
            }
            // Offline track: no remote order is allocated
            _ => {
                tokio::time::sleep(SIMULATED_DELAY).await;
                Order::simulated(recipient)
            }
        };

        self.state = FlowState::DraftCreated;
        info!(order_id = ?order.id, total = %order.costs.total, "Draft order in place");
        Ok(self.order.insert(order))
    }

    /// Confirm the draft (DRAFT_CREATED -> CONFIRMED)
    ///
    /// Guarded so the upstream confirm endpoint is never called without a
    /// draft or after local state already shows CONFIRMED. On failure the
    /// flow stays DRAFT_CREATED and confirmation can be retried.
    pub async fn confirm(&mut self) -> Result<&Order, FlowError> {
        if self.state != FlowState::DraftCreated {
            return Err(FlowError::InvalidState {
                action: "confirm the order",
                state: self.state,
            });
        }
        let Some(draft) = self.order.clone() else {
            return Err(FlowError::InvalidState {
                action: "confirm the order",
                state: self.state,
            });
        };

        let confirmed = match (self.mode, draft.id) {
            (ConnectionMode::Online, Some(id)) => {
                match self.fulfillment.confirm_order(id).await {
                    Ok(order) => Order {
                        recipient: draft.recipient,
                        ..order
                    },
                    Err(e) => {
                        error!(order_id = id, error = %e, "Order confirmation failed");
                        return Err(FlowError::Order(e));
                    }
                }
            }
            (ConnectionMode::Online, None) => {
                return Err(FlowError::InvalidState {
                    action: "confirm an order that has no id",
                    state: self.state,
                });
            }
            (ConnectionMode::Offline, _) => {
                tokio::time::sleep(SIMULATED_DELAY).await;
                draft
            }
        };

        self.state = FlowState::Confirmed;
        info!(order_id = ?confirmed.id, "Order confirmed");
        Ok(self.order.insert(confirmed))
    }

    /// Await all in-flight background work. For orderly teardown; dropping
    /// the flow aborts the work instead.
    pub async fn settle(&mut self) {
        for job in self.jobs.drain(..) {
            let _ = job.await;
        }
    }

    fn enter_offline(&mut self) {
        self.mode = ConnectionMode::Offline;
        // No remote mockup is coming; the costs channel already holds the
        // placeholder.
        if let Some(tx) = self.mockup_tx.take() {
            let _ = tx.send(MockupPreview::LocalFallback);
        }
        self.rates_tx.take();
        self.costs_tx.take();
        self.state = FlowState::Ready;
    }

    fn spawn_mockup_job(&mut self, image_url: Url) {
        let Some(tx) = self.mockup_tx.take() else {
            return;
        };
        let client = Arc::clone(&self.fulfillment);
        let product = self.product;

        self.jobs.push(tokio::spawn(async move {
            match generate_mockup(client.as_ref(), &image_url, product).await {
                Ok(urls) => {
                    let _ = tx.send(MockupPreview::Remote(urls));
                }
                Err(e) => {
                    warn!(error = %e, "Falling back to locally rendered preview");
                    let _ = tx.send(MockupPreview::LocalFallback);
                }
            }
        }));
    }

    fn spawn_estimate_jobs(&mut self, image_url: Url) {
        if let Some(tx) = self.rates_tx.take() {
            let client = Arc::clone(&self.fulfillment);
            let product = self.product;
            let recipient = self.estimate_recipient.clone();

            self.jobs.push(tokio::spawn(async move {
                match client.estimate_shipping_rates(&recipient, product).await {
                    Ok(rates) => {
                        let _ = tx.send(rates);
                    }
                    Err(e) => debug!(error = %e, "Shipping rate estimate failed, keeping fallback"),
                }
            }));
        }

        if let Some(tx) = self.costs_tx.take() {
            let client = Arc::clone(&self.fulfillment);
            let product = self.product;
            let recipient = self.estimate_recipient.clone();

            self.jobs.push(tokio::spawn(async move {
                match client
                    .estimate_order_costs(&recipient, &image_url, product)
                    .await
                {
                    Ok(costs) => {
                        let _ = tx.send(costs);
                    }
                    Err(e) => debug!(error = %e, "Cost estimate failed, keeping placeholder"),
                }
            }));
        }
    }
}

impl Drop for OrderFlow {
    fn drop(&mut self) {
        for job in &self.jobs {
            job.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use crate::domain::{ImageData, MockupTask};
    use crate::fulfillment::FulfillmentResult;
    use crate::hosting::HostingError;

    /// Scripted fulfillment backend recording every call it receives
    #[derive(Default)]
    struct ScriptedFulfillment {
        connected: bool,
        /// Attempt number on which the mockup task completes; 0 = never
        complete_on_attempt: u32,
        /// Report the task as failed upstream
        mockup_fails: bool,
        /// Number of leading poll attempts that error at transport level
        flaky_polls: u32,
        /// Number of draft creations to reject before succeeding
        reject_drafts: u32,

        calls: Mutex<Vec<String>>,
        polls: AtomicU32,
        draft_attempts: AtomicU32,
        confirms: AtomicU32,
    }

    impl ScriptedFulfillment {
        fn online() -> Self {
            ScriptedFulfillment {
                connected: true,
                complete_on_attempt: 1,
                ..Default::default()
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn order(id: Option<i64>, recipient: &Recipient) -> Order {
            Order {
                id,
                costs: OrderCosts {
                    subtotal: "29.99".to_string(),
                    shipping: "4.99".to_string(),
                    total: "34.98".to_string(),
                    currency: "USD".to_string(),
                },
                recipient: recipient.clone(),
                dashboard_url: Some("https://pod.example/dashboard/13".to_string()),
                created_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl FulfillmentApi for ScriptedFulfillment {
        async fn check_connection(&self) -> bool {
            self.record("check_connection");
            self.connected
        }

        async fn create_mockup_task(
            &self,
            image_url: &Url,
            _product: ProductKind,
        ) -> FulfillmentResult<String> {
            self.record(format!("create_mockup_task:{image_url}"));
            Ok("tk1".to_string())
        }

        async fn poll_mockup_task(&self, task_key: &str) -> FulfillmentResult<MockupTask> {
            let attempt = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            self.record(format!("poll:{attempt}"));

            if attempt <= self.flaky_polls {
                return Err(FulfillmentError::Parse("connection reset".to_string()));
            }
            if self.mockup_fails {
                return Ok(MockupTask {
                    task_key: task_key.to_string(),
                    status: MockupStatus::Failed,
                    result_urls: Vec::new(),
                    error: Some("printfile rejected".to_string()),
                });
            }
            let done = self.complete_on_attempt != 0 && attempt >= self.complete_on_attempt;
            Ok(MockupTask {
                task_key: task_key.to_string(),
                status: if done {
                    MockupStatus::Completed
                } else {
                    MockupStatus::Pending
                },
                result_urls: if done {
                    vec!["https://h/mock.png".to_string()]
                } else {
                    Vec::new()
                },
                error: None,
            })
        }

        async fn estimate_shipping_rates(
            &self,
            _recipient: &Recipient,
            _product: ProductKind,
        ) -> FulfillmentResult<Vec<ShippingRate>> {
            self.record("estimate_shipping_rates");
            Ok(vec![ShippingRate {
                id: "1".to_string(),
                name: "Standard".to_string(),
                rate: "4.99".to_string(),
                currency: "USD".to_string(),
                min_days: Some(3),
                max_days: Some(5),
            }])
        }

        async fn estimate_order_costs(
            &self,
            _recipient: &Recipient,
            _image_url: &Url,
            _product: ProductKind,
        ) -> FulfillmentResult<OrderCosts> {
            self.record("estimate_order_costs");
            Ok(OrderCosts {
                subtotal: "29.99".to_string(),
                shipping: "4.99".to_string(),
                total: "34.98".to_string(),
                currency: "USD".to_string(),
            })
        }

        async fn create_draft_order(
            &self,
            recipient: &Recipient,
            image_url: &Url,
            _product: ProductKind,
        ) -> FulfillmentResult<Order> {
            let attempt = self.draft_attempts.fetch_add(1, Ordering::SeqCst) + 1;
            self.record(format!("create_draft_order:{image_url}"));

            if attempt <= self.reject_drafts {
                return Err(FulfillmentError::Api {
                    status: 400,
                    message: "Invalid recipient".to_string(),
                });
            }
            Ok(Self::order(Some(13), recipient))
        }

        async fn confirm_order(&self, order_id: i64) -> FulfillmentResult<Order> {
            self.confirms.fetch_add(1, Ordering::SeqCst);
            self.record(format!("confirm_order:{order_id}"));
            Ok(Self::order(Some(order_id), &Recipient::default()))
        }
    }

    struct ScriptedHost {
        fail: bool,
        uploads: AtomicU32,
    }

    impl ScriptedHost {
        fn ok() -> Self {
            ScriptedHost {
                fail: false,
                uploads: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ImageHost for ScriptedHost {
        async fn host_image(&self, _image: &ImageData) -> Result<Url, HostingError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(HostingError::UploadFailed {
                    status: 503,
                    message: "over capacity".to_string(),
                });
            }
            Ok(Url::parse("https://h/x.png").unwrap())
        }
    }

    fn recipient() -> Recipient {
        Recipient {
            name: "Jane Doe".to_string(),
            address1: "19749 Dearborn St".to_string(),
            city: "Chatsworth".to_string(),
            state_code: Some("CA".to_string()),
            country_code: "US".to_string(),
            zip: "91311".to_string(),
        }
    }

    fn flow(
        fulfillment: Arc<ScriptedFulfillment>,
        host: Arc<ScriptedHost>,
    ) -> OrderFlow {
        OrderFlow::new(
            fulfillment,
            host,
            ImageAsset::new(ImageData::Bytes(vec![1, 2, 3])),
            ProductKind::Tshirt,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_loop_returns_on_completion_attempt() {
        let api = ScriptedFulfillment {
            connected: true,
            complete_on_attempt: 5,
            ..Default::default()
        };

        let started = tokio::time::Instant::now();
        let urls = poll_mockup_to_completion(&api, "tk1").await.unwrap();

        assert_eq!(urls, vec!["https://h/mock.png"]);
        assert_eq!(api.polls.load(Ordering::SeqCst), 5);
        // 2 seconds before every attempt, including the first
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_loop_times_out_after_cap() {
        let api = ScriptedFulfillment {
            connected: true,
            complete_on_attempt: 0,
            ..Default::default()
        };

        let result = poll_mockup_to_completion(&api, "tk1").await;

        assert!(matches!(result, Err(MockupError::TimedOut { attempts: 30 })));
        // Never a 31st attempt
        assert_eq!(api.polls.load(Ordering::SeqCst), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_loop_tolerates_transport_failures() {
        let api = ScriptedFulfillment {
            connected: true,
            complete_on_attempt: 3,
            flaky_polls: 2,
            ..Default::default()
        };

        let urls = poll_mockup_to_completion(&api, "tk1").await.unwrap();

        assert_eq!(urls, vec!["https://h/mock.png"]);
        assert_eq!(api.polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_loop_surfaces_upstream_failure() {
        let api = ScriptedFulfillment {
            connected: true,
            mockup_fails: true,
            ..Default::default()
        };

        let result = poll_mockup_to_completion(&api, "tk1").await;
        assert!(matches!(result, Err(MockupError::Failed(_))));
        assert_eq!(api.polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_probe_switches_to_simulated_track() {
        let api = Arc::new(ScriptedFulfillment {
            connected: false,
            ..Default::default()
        });
        let host = Arc::new(ScriptedHost::ok());
        let mut flow = flow(Arc::clone(&api), Arc::clone(&host));

        assert_eq!(flow.prepare().await, FlowState::Ready);
        assert_eq!(flow.mode(), ConnectionMode::Offline);
        assert_eq!(flow.costs(), OrderCosts::placeholder());
        assert_eq!(flow.mockup_preview().await, MockupPreview::LocalFallback);

        // Nothing beyond the probe was attempted, locally or remotely
        assert_eq!(api.calls(), vec!["check_connection"]);
        assert_eq!(host.uploads.load(Ordering::SeqCst), 0);

        // The simulated track still walks the whole order lifecycle
        let order = flow.submit_shipping(recipient()).await.unwrap();
        assert!(order.is_simulated());
        assert_eq!(flow.state(), FlowState::DraftCreated);

        flow.confirm().await.unwrap();
        assert_eq!(flow.state(), FlowState::Confirmed);
        assert_eq!(api.calls(), vec!["check_connection"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hosting_failure_falls_back_to_simulated_track() {
        let api = Arc::new(ScriptedFulfillment::online());
        let host = Arc::new(ScriptedHost {
            fail: true,
            uploads: AtomicU32::new(0),
        });
        let mut flow = flow(Arc::clone(&api), host);

        assert_eq!(flow.prepare().await, FlowState::Ready);
        assert_eq!(flow.mode(), ConnectionMode::Offline);

        // No fulfillment call besides the probe
        assert_eq!(api.calls(), vec!["check_connection"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_online_order() {
        let api = Arc::new(ScriptedFulfillment::online());
        let host = Arc::new(ScriptedHost::ok());
        let mut flow = flow(Arc::clone(&api), Arc::clone(&host));

        assert_eq!(flow.prepare().await, FlowState::Ready);
        assert_eq!(flow.mode(), ConnectionMode::Online);
        flow.settle().await;

        assert_eq!(
            flow.mockup_preview().await,
            MockupPreview::Remote(vec!["https://h/mock.png".to_string()])
        );
        let rates = flow.shipping_rates();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].name, "Standard");
        assert_eq!(flow.costs().total, "34.98");

        let order = flow.submit_shipping(recipient()).await.unwrap();
        assert_eq!(order.id, Some(13));
        assert_eq!(order.costs.total, "34.98");
        assert!(api
            .calls()
            .contains(&"create_draft_order:https://h/x.png".to_string()));

        flow.confirm().await.unwrap();
        assert_eq!(flow.state(), FlowState::Confirmed);
        assert_eq!(api.confirms.load(Ordering::SeqCst), 1);

        // A second confirm is rejected locally, without an upstream call
        let second = flow.confirm().await;
        assert!(matches!(second, Err(FlowError::InvalidState { .. })));
        assert_eq!(api.confirms.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_without_draft_is_rejected() {
        let api = Arc::new(ScriptedFulfillment::online());
        let mut flow = flow(Arc::clone(&api), Arc::new(ScriptedHost::ok()));

        let result = flow.confirm().await;
        assert!(matches!(result, Err(FlowError::InvalidState { .. })));
        assert_eq!(api.confirms.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_draft_failure_stays_ready_and_is_retryable() {
        let api = Arc::new(ScriptedFulfillment {
            reject_drafts: 1,
            ..ScriptedFulfillment::online()
        });
        let mut flow = flow(Arc::clone(&api), Arc::new(ScriptedHost::ok()));
        flow.prepare().await;

        let first = flow.submit_shipping(recipient()).await;
        assert!(matches!(
            first,
            Err(FlowError::Order(FulfillmentError::Api { status: 400, .. }))
        ));
        assert_eq!(flow.state(), FlowState::Ready);

        let second = flow.submit_shipping(recipient()).await;
        assert!(second.is_ok());
        assert_eq!(flow.state(), FlowState::DraftCreated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_recipient_blocks_submission() {
        let api = Arc::new(ScriptedFulfillment::online());
        let mut flow = flow(Arc::clone(&api), Arc::new(ScriptedHost::ok()));
        flow.prepare().await;

        let mut bad = recipient();
        bad.state_code = None;

        let result = flow.submit_shipping(bad).await;
        assert!(matches!(result, Err(FlowError::Recipient(_))));
        assert_eq!(flow.state(), FlowState::Ready);
        assert_eq!(api.draft_attempts.load(Ordering::SeqCst), 0);
    }
}
