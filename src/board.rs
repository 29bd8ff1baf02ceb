//! The task board engine.
//!
//! Composes the collection, the filter/sort pipeline, pagination, the
//! optimistic mutator, and the notification bus behind one surface the UI
//! shell drives. Rendering is always `collection → pipeline → page slice`;
//! no other path produces visible items.

use crate::backend::{TaskBackend, TaskQuery};
use crate::collection::TaskCollection;
use crate::config::EngineConfig;
use crate::dragdrop::DragDropCoordinator;
use crate::error::{EngineError, EngineResult};
use crate::mutator::OptimisticMutator;
use crate::notify::NotificationBus;
use crate::paginator::PageState;
use crate::pipeline::{self, FilterState, MonthBucket, SearchScope, SortMode};
use crate::status::TaskStatus;
use crate::types::{Actor, Criticality, EntityFilter, EntityRef, Task, TaskStats};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};

/// Collapses bursts of search keystrokes into one remote fetch.
///
/// Each keystroke registers through [`TaskBoard::begin_search`], which bumps
/// the generation and hands back a [`SearchTicket`]. Bumping immediately
/// supersedes every earlier ticket still waiting out its delay, so awaiting
/// [`SearchTicket::wait`] happens outside any board borrow and later
/// keystrokes are never blocked behind it. Only the ticket that is still
/// current when passed to [`TaskBoard::remote_search`] reaches the backend.
/// Local (already-fetched) filtering never goes through this; it runs
/// synchronously on every keystroke.
pub struct SearchDebouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    /// Register a keystroke: supersede all outstanding tickets and return a
    /// fresh one.
    pub fn begin(self: &Arc<Self>) -> SearchTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        SearchTicket {
            debouncer: Arc::clone(self),
            generation,
        }
    }
}

/// One keystroke's claim on the debounce window.
pub struct SearchTicket {
    debouncer: Arc<SearchDebouncer>,
    generation: u64,
}

impl SearchTicket {
    /// Wait out the debounce delay. Returns `true` if no newer keystroke
    /// arrived in the meantime.
    pub async fn wait(&self) -> bool {
        tokio::time::sleep(self.debouncer.delay).await;
        self.is_current()
    }

    /// Whether this ticket still represents the latest keystroke.
    pub fn is_current(&self) -> bool {
        self.debouncer.generation.load(Ordering::SeqCst) == self.generation
    }
}

/// Client-side task board: one instance per signed-in session.
pub struct TaskBoard {
    config: EngineConfig,
    backend: Arc<dyn TaskBackend>,
    collection: Arc<Mutex<TaskCollection>>,
    notifier: Arc<NotificationBus>,
    mutator: Arc<OptimisticMutator>,
    dragdrop: DragDropCoordinator,
    debouncer: Arc<SearchDebouncer>,
    actor: Actor,
    entity: EntityFilter,
    filter: FilterState,
    pages: PageState,
    /// Set when the last fetch failed; the UI offers a retry affordance.
    load_failed: bool,
}

impl TaskBoard {
    pub fn new(config: EngineConfig, backend: Arc<dyn TaskBackend>, actor: Actor) -> Self {
        let collection = Arc::new(Mutex::new(TaskCollection::new()));
        let notifier = Arc::new(NotificationBus::new(config.notify_dismiss_ms));
        let mutator = Arc::new(OptimisticMutator::new(
            backend.clone(),
            collection.clone(),
            notifier.clone(),
        ));
        let dragdrop = DragDropCoordinator::new(mutator.clone());
        let debouncer = Arc::new(SearchDebouncer::new(Duration::from_millis(
            config.search_debounce_ms,
        )));
        let pages = PageState::new(config.page_size);

        Self {
            config,
            backend,
            collection,
            notifier,
            mutator,
            dragdrop,
            debouncer,
            actor,
            entity: EntityFilter::All,
            filter: FilterState::default(),
            pages,
            load_failed: false,
        }
    }

    // Collaborator accessors for the UI shell

    pub fn mutator(&self) -> &Arc<OptimisticMutator> {
        &self.mutator
    }

    pub fn dragdrop(&self) -> &DragDropCoordinator {
        &self.dragdrop
    }

    pub fn notifier(&self) -> &Arc<NotificationBus> {
        &self.notifier
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn query(&self, search: Option<String>) -> TaskQuery {
        // The wire field name only accompanies an actual search term
        let search_field = search
            .as_ref()
            .and_then(|_| self.filter.scope.wire_field())
            .map(str::to_string);
        TaskQuery {
            user_id: self.actor.id.clone(),
            role: self.actor.role,
            entity: self.entity.clone(),
            search,
            search_field,
        }
    }

    /// Fetch the task list from the backend and replace the collection.
    ///
    /// A fetch failure degrades to an empty list plus a retry affordance;
    /// the board never crashes on a failed load.
    pub async fn refresh(&mut self) -> EngineResult<()> {
        self.fetch(None).await
    }

    async fn fetch(&mut self, search: Option<String>) -> EngineResult<()> {
        let query = self.query(search);
        match self.backend.list_tasks(&query).await {
            Ok(records) => {
                let tasks: Vec<Task> = records.into_iter().map(|r| r.into_task()).collect();
                info!(count = tasks.len(), "task list refreshed");
                self.collection.lock().unwrap().replace_all(tasks);
                self.pages.reset();
                self.load_failed = false;
                Ok(())
            }
            Err(transport) => {
                error!(error = %transport, "task list fetch failed");
                self.collection.lock().unwrap().replace_all(Vec::new());
                self.pages.reset();
                self.load_failed = true;
                self.notifier
                    .error("Failed to load tasks. Please try again later.");
                Err(EngineError::network(transport))
            }
        }
    }

    /// Whether the last fetch failed and a retry should be offered.
    pub fn can_retry(&self) -> bool {
        self.load_failed
    }

    /// Register a remote-search keystroke. The returned ticket supersedes
    /// every outstanding one immediately; await [`SearchTicket::wait`] on it
    /// before calling [`remote_search`](Self::remote_search), and do the
    /// waiting outside any board borrow so later keystrokes can register.
    pub fn begin_search(&self) -> SearchTicket {
        self.debouncer.begin()
    }

    /// Re-fetch server-side with a search term, scoped by the current
    /// search field. Does nothing and returns `false` if the ticket was
    /// superseded, so a burst of rapid keystrokes reaches the backend once.
    pub async fn remote_search(
        &mut self,
        ticket: &SearchTicket,
        term: String,
    ) -> EngineResult<bool> {
        // Re-check after reacquiring the board: a newer keystroke may have
        // registered while the caller waited for exclusive access
        if !ticket.is_current() {
            return Ok(false);
        }
        let term = (!term.trim().is_empty()).then_some(term);
        self.fetch(term).await?;
        Ok(true)
    }

    /// Load the subtask chain for one task (when its panel is opened).
    pub async fn load_subtasks(&self, task_id: &str) -> EngineResult<()> {
        let records = self
            .backend
            .list_subtasks(task_id)
            .await
            .map_err(EngineError::network)?;
        let subtasks = records.into_iter().map(|r| r.into_subtask()).collect();
        let mut collection = self.collection.lock().unwrap();
        if !collection.set_subtasks(task_id, subtasks) {
            return Err(EngineError::task_not_found(task_id));
        }
        Ok(())
    }

    /// Auditor and client lists for the entity-filter dropdowns.
    pub async fn load_filter_entities(&self) -> EngineResult<(Vec<EntityRef>, Vec<EntityRef>)> {
        let auditors = self
            .backend
            .list_auditors()
            .await
            .map_err(EngineError::network)?;
        let clients = self
            .backend
            .list_clients()
            .await
            .map_err(EngineError::network)?;
        Ok((auditors, clients))
    }

    // Filter state. Every change resets to page 1 so a stale page number
    // can never outlive the list it referred to. All of these are local
    // and synchronous, with no debounce and no remote call.

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
        self.pages.reset();
    }

    pub fn set_search_scope(&mut self, scope: SearchScope) {
        self.filter.scope = scope;
        self.pages.reset();
    }

    pub fn set_month(&mut self, month: MonthBucket) {
        self.filter.month = month;
        self.pages.reset();
    }

    pub fn set_status_filter(&mut self, status: Option<TaskStatus>) {
        self.filter.status = status;
        self.pages.reset();
    }

    pub fn set_criticality_filter(&mut self, criticality: Option<Criticality>) {
        self.filter.criticality = criticality;
        self.pages.reset();
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.filter.sort = sort;
        self.pages.reset();
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Switch the viewed entity (auditor/client/all). Filter state is
    /// transient and entity-scoped, so it resets wholesale; the caller
    /// refreshes afterwards.
    pub fn set_entity(&mut self, entity: EntityFilter) {
        self.entity = entity;
        self.filter.reset();
        self.pages.reset();
    }

    pub fn entity(&self) -> &EntityFilter {
        &self.entity
    }

    // Pagination over the filtered list

    pub fn page(&self) -> usize {
        self.pages.page()
    }

    pub fn total_pages(&self) -> usize {
        self.pages.total_pages(self.filtered_count())
    }

    pub fn goto_page(&mut self, page: usize) {
        let count = self.filtered_count();
        self.pages.goto(page, count);
    }

    pub fn next_page(&mut self) {
        let count = self.filtered_count();
        self.pages.next(count);
    }

    pub fn prev_page(&mut self) {
        let count = self.filtered_count();
        self.pages.prev(count);
    }

    fn filtered_count(&self) -> usize {
        let collection = self.collection.lock().unwrap();
        pipeline::apply(collection.tasks(), &self.filter, chrono::Utc::now().date_naive()).len()
    }

    /// The current rendered page: pipeline then slice, nothing else.
    pub fn visible_page(&mut self) -> Vec<Task> {
        self.visible_page_at(chrono::Utc::now().date_naive())
    }

    /// As [`visible_page`](Self::visible_page), with an explicit "today"
    /// for month bucketing.
    pub fn visible_page_at(&mut self, today: chrono::NaiveDate) -> Vec<Task> {
        let collection = self.collection.lock().unwrap();
        let filtered = pipeline::apply(collection.tasks(), &self.filter, today);
        self.pages.slice(&filtered).iter().map(|t| (*t).clone()).collect()
    }

    /// Lane counts for the board header, derived from the member set.
    pub fn stats(&self) -> TaskStats {
        self.collection.lock().unwrap().stats()
    }

    /// Look up one task by id (e.g. for the subtask panel).
    pub fn task(&self, id: &str) -> Option<Task> {
        self.collection.lock().unwrap().get(id).cloned()
    }
}
