use chrono::{Local, NaiveDate};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::rates::RawRatesByDate;
use crate::models::series::HistoricalSeries;
use crate::models::window::{DateRange, TimeWindow, DEFAULT_WINDOW_DAYS};
use crate::providers::traits::RateProvider;
use crate::services::series_builder::SeriesBuilder;

/// Source of "today" for date-range computation.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// One issued history selection, tagged with the epoch it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRequest {
    pub epoch: u64,
    /// `None` for the default opening range, which has no selector token.
    pub window: Option<TimeWindow>,
    pub from: String,
    pub to: String,
    pub range: DateRange,
}

/// What subscribers observe. Only the newest selection ever reaches
/// `Ready` or `Failed`; older completions are dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WindowState {
    #[default]
    Idle,
    Fetching(WindowRequest),
    Ready {
        request: WindowRequest,
        series: Arc<HistoricalSeries>,
    },
    Failed {
        request: WindowRequest,
        error: CoreError,
    },
}

impl WindowState {
    pub fn is_fetching(&self) -> bool {
        matches!(self, WindowState::Fetching(_))
    }

    /// The request this state belongs to, if any.
    pub fn request(&self) -> Option<&WindowRequest> {
        match self {
            WindowState::Idle => None,
            WindowState::Fetching(request)
            | WindowState::Ready { request, .. }
            | WindowState::Failed { request, .. } => Some(request),
        }
    }

    pub fn series(&self) -> Option<&Arc<HistoricalSeries>> {
        match self {
            WindowState::Ready { series, .. } => Some(series),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CoreError> {
        match self {
            WindowState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Handle to a spawned history fetch.
///
/// Dropping the ticket does not cancel anything; the fetch runs to completion
/// and its result is published or discarded by the epoch rule.
#[must_use = "dropping the ticket detaches the fetch; await `finished` to observe completion"]
pub struct FetchTicket {
    epoch: u64,
    handle: JoinHandle<bool>,
}

impl FetchTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Wait for the fetch to complete.
    /// Returns `true` if its result was published, `false` if it was superseded.
    pub async fn finished(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}

/// State shared between the controller and its in-flight fetches.
///
/// The epoch lock is held across "check epoch, publish state" so a stale
/// completion can never overwrite a newer selection.
struct Shared {
    epoch: Mutex<u64>,
    state: watch::Sender<WindowState>,
    builder: SeriesBuilder,
}

impl Shared {
    fn lock_epoch(&self) -> MutexGuard<'_, u64> {
        self.epoch.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn complete(&self, request: WindowRequest, result: Result<RawRatesByDate, CoreError>) -> bool {
        let current = self.lock_epoch();
        if *current != request.epoch {
            debug!(
                epoch = request.epoch,
                current = *current,
                "discarding stale history result"
            );
            return false;
        }

        let next = match result {
            Ok(raw) => {
                let series = self.builder.build(&raw, &request.from, &request.to);
                debug!(epoch = request.epoch, points = series.len(), "history ready");
                WindowState::Ready {
                    request,
                    series: Arc::new(series),
                }
            }
            Err(e) => {
                let error = e.into_history_error();
                debug!(epoch = request.epoch, error = %error, "history failed");
                WindowState::Failed { request, error }
            }
        };
        self.state.send_replace(next);
        true
    }
}

/// Turns window selections into history fetches and publishes the newest result.
///
/// State machine: `Idle → Fetching → {Ready, Failed}`; every new selection
/// goes back through `Fetching`. Each selection bumps a monotonically
/// increasing epoch, and a completion is published only if its epoch is still
/// current. Nothing is cancelled; stale completions are ignored.
///
/// Cloning yields another handle to the same controller.
/// Selections spawn onto the current tokio runtime.
#[derive(Clone)]
pub struct WindowController {
    provider: Arc<dyn RateProvider>,
    shared: Arc<Shared>,
    clock: Clock,
}

impl std::fmt::Debug for WindowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowController")
            .field("provider", &self.provider.name())
            .field("epoch", &self.current_epoch())
            .field("state", &*self.shared.state.borrow())
            .finish()
    }
}

impl WindowController {
    /// Controller computing ranges from the local wall-clock date.
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self::with_clock(provider, Arc::new(|| Local::now().date_naive()))
    }

    /// Controller with an explicit source of "today".
    pub fn with_clock(provider: Arc<dyn RateProvider>, clock: Clock) -> Self {
        let (state, _) = watch::channel(WindowState::Idle);
        Self {
            provider,
            shared: Arc::new(Shared {
                epoch: Mutex::new(0),
                state,
                builder: SeriesBuilder::new(),
            }),
            clock,
        }
    }

    /// Fetch the history for a window token, ending today.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn select_window(&self, window: TimeWindow, from: &str, to: &str) -> FetchTicket {
        let range = DateRange::for_window(window, (self.clock)());
        self.issue(Some(window), range, from, to)
    }

    /// Fetch the range shown when the trend view first opens.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn select_default(&self, from: &str, to: &str) -> FetchTicket {
        let range = DateRange::ending_on((self.clock)(), DEFAULT_WINDOW_DAYS);
        self.issue(None, range, from, to)
    }

    /// Fetch an explicit date range.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn select_range(&self, range: DateRange, from: &str, to: &str) -> FetchTicket {
        self.issue(None, range, from, to)
    }

    /// Subscribe to state changes. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<WindowState> {
        self.shared.state.subscribe()
    }

    /// A copy of the current state.
    pub fn state(&self) -> WindowState {
        self.shared.state.borrow().clone()
    }

    /// The series of the latest successful selection, if the latest selection succeeded.
    pub fn current_series(&self) -> Option<Arc<HistoricalSeries>> {
        self.shared.state.borrow().series().cloned()
    }

    pub fn current_epoch(&self) -> u64 {
        *self.shared.lock_epoch()
    }

    fn issue(
        &self,
        window: Option<TimeWindow>,
        range: DateRange,
        from: &str,
        to: &str,
    ) -> FetchTicket {
        let request = {
            let mut epoch = self.shared.lock_epoch();
            *epoch += 1;
            let request = WindowRequest {
                epoch: *epoch,
                window,
                from: from.to_uppercase(),
                to: to.to_uppercase(),
                range,
            };
            self.shared
                .state
                .send_replace(WindowState::Fetching(request.clone()));
            request
        };

        debug!(
            epoch = request.epoch,
            from = %request.from,
            to = %request.to,
            %range,
            "history fetch issued"
        );

        let epoch = request.epoch;
        let provider = Arc::clone(&self.provider);
        let shared = Arc::clone(&self.shared);
        let (from, to, range) = (request.from.clone(), request.to.clone(), request.range);
        let handle = tokio::spawn(async move {
            let fetch =
                tokio::spawn(async move { provider.fetch_history(&from, &to, range).await });
            let result = match fetch.await {
                Ok(result) => result,
                Err(e) if e.is_panic() => Err(CoreError::HistoryFetchFailed(
                    "history fetch panicked".to_string(),
                )),
                Err(e) => Err(CoreError::HistoryFetchFailed(e.to_string())),
            };
            shared.complete(request, result)
        });

        FetchTicket { epoch, handle }
    }
}
