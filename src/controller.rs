//! Dashboard controller.
//!
//! The [`Dashboard`] owns the current filter set and the seven chart
//! datasets. Every filter change triggers a refresh batch:
//!
//! 1. bump the generation counter and mark the dashboard loading;
//! 2. fetch all seven aggregates concurrently;
//! 3. map each failed fetch to an empty dataset, a logged warning and an
//!    error notification;
//! 4. commit the batch only if no newer batch has started since.
//!
//! Step 4 guarantees a slow, earlier request can never overwrite the
//! results of a later one. A superseded batch is dropped whole and
//! reports [`RefreshOutcome::Superseded`].

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use pulseboard_core::chart::{encoding_for, render, Scene, Viewport};
use pulseboard_core::filter::{FilterField, FilterSet};
use pulseboard_core::models::{AggregateEntry, AggregateKind};
use pulseboard_core::source::AggregateSource;

// ═══════════════════════════════════════════════════════════════════════
// Notifications
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A transient, user-facing message (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Delivery channel for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            NotificationLevel::Error => tracing::error!(title = %n.title, "{}", n.message),
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!(title = %n.title, "{}", n.message)
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Dashboard state
// ═══════════════════════════════════════════════════════════════════════

/// A consistent view of the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub filters: FilterSet,
    /// True from the start of a refresh until its batch commits.
    pub loading: bool,
    /// Latest committed dataset per kind. Failed kinds hold an empty list.
    pub results: BTreeMap<AggregateKind, Vec<AggregateEntry>>,
    /// Kinds whose fetch failed in the committed batch.
    pub failed: Vec<AggregateKind>,
    /// Generation of the committed batch (0 before the first refresh).
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The batch was committed; `failed` kinds were replaced by empty data.
    Applied { failed: Vec<AggregateKind> },
    /// A newer batch started first; nothing was committed.
    Superseded,
}

pub struct Dashboard {
    source: Arc<dyn AggregateSource>,
    notifier: Arc<dyn Notifier>,
    generation: AtomicU64,
    state: Mutex<DashboardState>,
}

impl Dashboard {
    pub fn new(source: Arc<dyn AggregateSource>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            notifier,
            generation: AtomicU64::new(0),
            state: Mutex::new(DashboardState::default()),
        }
    }

    /// Start from `filters` instead of the empty set. Nothing is fetched
    /// until the first refresh.
    pub fn with_filters(self, filters: FilterSet) -> Self {
        self.lock().filters = filters;
        self
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn source_name(&self) -> String {
        self.source.name().to_string()
    }

    pub fn snapshot(&self) -> DashboardState {
        self.lock().clone()
    }

    pub fn filters(&self) -> FilterSet {
        self.lock().filters.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Committed dataset for `kind` (empty before the first commit).
    pub fn results(&self, kind: AggregateKind) -> Vec<AggregateEntry> {
        self.lock().results.get(&kind).cloned().unwrap_or_default()
    }

    /// Scene for `kind`: the loading placeholder until data for it has
    /// been committed, the rendered chart afterwards.
    pub fn scene(&self, kind: AggregateKind, viewport: Viewport, legend_top_n: usize) -> Scene {
        let state = self.lock();
        let encoding = encoding_for(kind).with_legend_top_n(legend_top_n);
        match state.results.get(&kind) {
            Some(entries) => render(entries, &encoding, viewport),
            None => Scene::loading(encoding.title, viewport),
        }
    }

    /// Refresh all seven charts for the current filters.
    pub async fn refresh(&self) -> RefreshOutcome {
        let filters = self.filters();
        self.apply_filters(filters).await
    }

    /// Replace the filter set and refresh.
    pub async fn apply_filters(&self, filters: FilterSet) -> RefreshOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.lock();
            state.filters = filters.clone();
            state.loading = true;
        }
        tracing::debug!(generation, filters = ?filters.to_query_pairs(), "refresh started");

        let fetches = AggregateKind::ALL.into_iter().map(|kind| {
            let filters = &filters;
            async move { (kind, self.source.fetch(kind, filters).await) }
        });
        let fetched = join_all(fetches).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding stale refresh batch");
            return RefreshOutcome::Superseded;
        }

        let mut results = BTreeMap::new();
        let mut failed = Vec::new();
        let mut errors = Vec::new();
        for (kind, outcome) in fetched {
            match outcome {
                Ok(entries) => {
                    results.insert(kind, entries);
                }
                Err(e) => {
                    tracing::warn!(
                        endpoint = kind.endpoint(),
                        source = self.source.name(),
                        error = %format!("{:#}", e),
                        "aggregate fetch failed"
                    );
                    results.insert(kind, Vec::new());
                    failed.push(kind);
                    errors.push(Notification::error(
                        "Error",
                        format!("Failed to load {} data", kind.endpoint()),
                    ));
                }
            }
        }

        {
            let mut state = self.lock();
            // Re-check under the lock: a newer batch may have started meanwhile.
            if self.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "discarding stale refresh batch");
                return RefreshOutcome::Superseded;
            }
            state.results = results;
            state.failed = failed.clone();
            state.loading = false;
            state.generation = generation;
        }

        for n in errors {
            self.notifier.notify(n);
        }
        if !filters.is_empty() {
            self.notifier.notify(Notification::success(
                "Filters Applied",
                format!("Active: {}", filters.active_labels().join(", ")),
            ));
        }
        RefreshOutcome::Applied { failed }
    }

    /// Set one constraint (`""` removes it) and refresh.
    pub async fn set_filter(&self, field: FilterField, value: &str) -> RefreshOutcome {
        let mut filters = self.filters();
        filters.set(field, value);
        self.apply_filters(filters).await
    }

    /// Remove every constraint and refresh.
    pub async fn clear_filters(&self) -> RefreshOutcome {
        let mut filters = self.filters();
        filters.clear();
        let outcome = self.apply_filters(filters).await;
        if outcome != RefreshOutcome::Superseded {
            self.notifier.notify(Notification::info(
                "Filters Cleared",
                "All filters have been reset",
            ));
        }
        outcome
    }
}
