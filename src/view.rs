//! View orchestration: validate input, show a loading placeholder, call the
//! backend, and replace the target container with cards or a notice.
//!
//! Every request is split into [`ViewController::begin_search`] (and friends),
//! which validates and hands back a [`Job`], and [`ViewController::complete`],
//! which applies the result. Callers that do not care about interleaving use
//! the `async` shorthands. Each container keeps the id of its latest request;
//! a completion carrying an older id is dropped, so a slow response can never
//! overwrite a newer one.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::card::render_cards;
use crate::client::BackendClient;
use crate::config::{DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE};
use crate::error::{AppError, Result};
use crate::filter;
use crate::panel::{
    listing_count_label, money, BudgetSummary, Container, Notice, NoticeKind, Panel, SlotSection,
    ViewMode, NO_SKINS_FOUND,
};
use crate::types::{BudgetReport, FilterState, Loadout, LoadoutRequest, LoadoutSlot, Side, SkinListing};

pub const LOADING_SEARCH: &str = "Fetching market data…";
pub const LOADING_BUDGET: &str = "Running knapsack optimization…";
pub const LOADING_LOADOUT: &str = "Building your loadout…";

pub const MSG_NO_WEAPON: &str = "Please select a weapon first.";
pub const MSG_NO_BUDGET: &str = "Please enter a budget and select a weapon.";
pub const MSG_NO_WEAPONS_BUDGET: &str = "Please enter a weapons budget.";

pub const MSG_EMPTY_SEARCH: &str = "No skins found in that price range.";
pub const MSG_EMPTY_FILTERED: &str = NO_SKINS_FOUND;
pub const MSG_EMPTY_BUDGET: &str = "No skins found within budget.";
pub const MSG_EMPTY_LOADOUT: &str = "No loadout options found.";

pub const MSG_CONNECT_FAILED: &str = "Cannot connect — is the server running?";

static IDLE: Panel = Panel::Idle;

// ---------------------------------------------------------------------------
// Requests and completions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Search {
        query: String,
        min_price: f64,
        max_price: f64,
    },
    Optimize {
        budget: f64,
        query: String,
    },
    Loadout(LoadoutRequest),
}

impl Request {
    pub fn container(&self) -> Container {
        match self {
            Request::Search { .. } => Container::Search,
            Request::Optimize { .. } => Container::Budget,
            Request::Loadout(_) => Container::Loadout,
        }
    }

    fn loading_text(&self) -> &'static str {
        match self {
            Request::Search { .. } => LOADING_SEARCH,
            Request::Optimize { .. } => LOADING_BUDGET,
            Request::Loadout(_) => LOADING_LOADOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub container: Container,
    pub id: u64,
}

/// A validated request waiting to be sent.
#[derive(Debug, Clone)]
pub struct Job {
    pub ticket: Ticket,
    pub request: Request,
}

impl Job {
    pub async fn run(self, client: &BackendClient) -> Completion {
        let outcome = match &self.request {
            Request::Search {
                query,
                min_price,
                max_price,
            } => Outcome::Search(client.search(query, *min_price, *max_price).await),
            Request::Optimize { budget, query } => {
                Outcome::Budget(client.optimize_budget(*budget, query).await)
            }
            Request::Loadout(req) => Outcome::Loadout(*req, client.build_loadout(req).await),
        };
        Completion {
            ticket: self.ticket,
            request: self.request,
            outcome,
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Search(Result<Vec<SkinListing>>),
    Budget(Result<BudgetReport>),
    /// Carries the request so slot titles and budgets can be rendered.
    Loadout(LoadoutRequest, Result<Loadout>),
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub request: Request,
    pub outcome: Outcome,
}

// ---------------------------------------------------------------------------
// ViewController
// ---------------------------------------------------------------------------

pub struct ViewController {
    client: BackendClient,
    panels: HashMap<Container, Panel>,
    latest: HashMap<Container, u64>,
    last_request: HashMap<Container, Request>,
    next_id: u64,
    /// Last successful search, in server order. `None` until the first one lands.
    cached: Option<Vec<SkinListing>>,
    filters: FilterState,
    side: Side,
    view_mode: ViewMode,
}

impl ViewController {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            panels: HashMap::new(),
            latest: HashMap::new(),
            last_request: HashMap::new(),
            next_id: 0,
            cached: None,
            filters: FilterState::default(),
            side: Side::default(),
            view_mode: ViewMode::default(),
        }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub fn panel(&self, container: Container) -> &Panel {
        self.panels.get(&container).unwrap_or(&IDLE)
    }

    pub fn cached_results(&self) -> &[SkinListing] {
        self.cached.as_deref().unwrap_or(&[])
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Replaces the filter state. Call [`apply_filters`](Self::apply_filters) to re-render.
    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn to_html(&self, container: Container) -> String {
        self.panel(container).to_html(self.view_mode)
    }

    // -----------------------------------------------------------------------
    // Begin
    // -----------------------------------------------------------------------

    /// Blank price bounds default to 0 and 999999.
    pub fn begin_search(
        &mut self,
        query: &str,
        min_price: Option<f64>,
        max_price: Option<f64>,
    ) -> Option<Job> {
        let query = query.trim();
        if query.is_empty() {
            self.reject(Container::Search, MSG_NO_WEAPON);
            return None;
        }
        Some(self.issue(Request::Search {
            query: query.to_string(),
            min_price: min_price.unwrap_or(DEFAULT_MIN_PRICE),
            max_price: max_price.unwrap_or(DEFAULT_MAX_PRICE),
        }))
    }

    pub fn begin_optimize(&mut self, budget: Option<f64>, query: &str) -> Option<Job> {
        let query = query.trim();
        let budget = budget.filter(|b| b.is_finite() && *b > 0.0);
        match budget {
            Some(budget) if !query.is_empty() => Some(self.issue(Request::Optimize {
                budget,
                query: query.to_string(),
            })),
            _ => {
                self.reject(Container::Budget, MSG_NO_BUDGET);
                None
            }
        }
    }

    /// Also remembers `side` as the selected side.
    pub fn begin_loadout(
        &mut self,
        side: Side,
        weapons_budget: f64,
        knife_budget: f64,
        gloves_budget: f64,
    ) -> Option<Job> {
        self.side = side;
        if !(weapons_budget.is_finite() && weapons_budget > 0.0) {
            self.reject(Container::Loadout, MSG_NO_WEAPONS_BUDGET);
            return None;
        }
        Some(self.issue(Request::Loadout(LoadoutRequest {
            side,
            weapons_budget,
            knife_budget: non_negative(knife_budget),
            gloves_budget: non_negative(gloves_budget),
        })))
    }

    /// Re-send the last request issued for `container`, if any.
    pub fn rerun(&mut self, container: Container) -> Option<Job> {
        let request = self.last_request.get(&container)?.clone();
        Some(self.issue(request))
    }

    fn issue(&mut self, request: Request) -> Job {
        let container = request.container();
        self.next_id += 1;
        let ticket = Ticket {
            container,
            id: self.next_id,
        };
        self.latest.insert(container, ticket.id);
        self.last_request.insert(container, request.clone());
        self.panels
            .insert(container, Panel::Loading(request.loading_text().to_string()));
        debug!(container = %container, id = ticket.id, "request issued");
        Job { ticket, request }
    }

    fn reject(&mut self, container: Container, msg: &str) {
        // a pending response for this container must not replace the message
        self.next_id += 1;
        self.latest.insert(container, self.next_id);
        debug!(container = %container, reason = msg, "request rejected");
        self.panels
            .insert(container, Panel::notice(NoticeKind::Validation, msg));
    }

    // -----------------------------------------------------------------------
    // Complete
    // -----------------------------------------------------------------------

    /// Applies a finished request. Returns `false` when it was superseded and dropped.
    pub fn complete(&mut self, done: Completion) -> bool {
        let Completion { ticket, outcome, .. } = done;

        if self.latest.get(&ticket.container) != Some(&ticket.id) {
            debug!(container = %ticket.container, id = ticket.id, "stale response dropped");
            return false;
        }

        match outcome {
            Outcome::Search(Ok(results)) => {
                self.cached = Some(results);
                self.render_search();
            }
            Outcome::Budget(Ok(report)) => {
                let panel = budget_panel(&report);
                self.panels.insert(Container::Budget, panel);
            }
            Outcome::Loadout(req, Ok(loadout)) => {
                let panel = loadout_panel(&req, &loadout);
                self.panels.insert(Container::Loadout, panel);
            }
            Outcome::Search(Err(e)) | Outcome::Budget(Err(e)) | Outcome::Loadout(_, Err(e)) => {
                self.panels.insert(ticket.container, error_panel(ticket.container, &e));
            }
        }
        true
    }

    /// Re-render the cached search results through the current filters. No request is sent.
    ///
    /// Only acts while the search container shows a result set (cards or an
    /// empty-result notice). Before the first search, while a search is in
    /// flight, and while a validation or failure message is up, it does nothing.
    pub fn apply_filters(&mut self) {
        if self.cached.is_none() || !self.showing_results() {
            return;
        }
        self.render_search();
    }

    fn showing_results(&self) -> bool {
        matches!(
            self.panel(Container::Search),
            Panel::Cards { .. }
                | Panel::Notice(Notice {
                    kind: NoticeKind::Empty,
                    ..
                })
        )
    }

    fn render_search(&mut self) {
        let cached = self.cached_results();
        let panel = if cached.is_empty() {
            Panel::notice(NoticeKind::Empty, MSG_EMPTY_SEARCH)
        } else {
            let filtered = filter::apply(cached, &self.filters);
            debug!(cached = cached.len(), shown = filtered.len(), "search results filtered");
            // an empty filtered set still shows "0 listings" above the message
            Panel::Cards {
                count_label: Some(listing_count_label(filtered.len())),
                cards: render_cards(&filtered),
            }
        };
        self.panels.insert(Container::Search, panel);
    }

    // -----------------------------------------------------------------------
    // One-shot shorthands
    // -----------------------------------------------------------------------

    pub async fn search(&mut self, query: &str, min_price: Option<f64>, max_price: Option<f64>) {
        if let Some(job) = self.begin_search(query, min_price, max_price) {
            self.run(job).await;
        }
    }

    pub async fn optimize_budget(&mut self, budget: Option<f64>, query: &str) {
        if let Some(job) = self.begin_optimize(budget, query) {
            self.run(job).await;
        }
    }

    pub async fn build_loadout(
        &mut self,
        side: Side,
        weapons_budget: f64,
        knife_budget: f64,
        gloves_budget: f64,
    ) {
        if let Some(job) = self.begin_loadout(side, weapons_budget, knife_budget, gloves_budget) {
            self.run(job).await;
        }
    }

    async fn run(&mut self, job: Job) {
        let done = job.run(&self.client).await;
        self.complete(done);
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

fn error_panel(container: Container, e: &AppError) -> Panel {
    match e {
        AppError::Server(msg) => {
            warn!(container = %container, "backend reported error: {msg}");
            Panel::notice(NoticeKind::Server, msg.clone())
        }
        _ => {
            warn!(container = %container, transport = e.is_transport(), "request failed: {e}");
            Panel::notice(NoticeKind::Transport, MSG_CONNECT_FAILED)
        }
    }
}

fn budget_panel(report: &BudgetReport) -> Panel {
    if report.skins.is_empty() {
        return Panel::notice(NoticeKind::Empty, MSG_EMPTY_BUDGET);
    }
    Panel::Budget {
        summary: BudgetSummary::from_report(report),
        cards: render_cards(&report.skins),
    }
}

fn loadout_panel(req: &LoadoutRequest, loadout: &Loadout) -> Panel {
    let sections: Vec<SlotSection> = LoadoutSlot::ALL
        .into_iter()
        .filter_map(|slot| {
            let skins = loadout.slot(slot)?;
            Some(SlotSection {
                slot,
                title: slot.title(req.side).to_string(),
                budget_label: money(req.slot_budget(slot)),
                cards: render_cards(skins),
            })
        })
        .collect();

    if sections.is_empty() {
        Panel::notice(NoticeKind::Empty, MSG_EMPTY_LOADOUT)
    } else {
        Panel::Loadout(sections)
    }
}
