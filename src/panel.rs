//! Container contents and their HTML / terminal renderings.

use std::fmt::Write;

use crate::card::{escape_html, SkinCard};
use crate::types::{BudgetReport, LoadoutSlot};

/// Named output regions. Each is replaced wholesale on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Search,
    Budget,
    Loadout,
}

impl Container {
    pub const ALL: [Container; 3] = [Container::Search, Container::Budget, Container::Loadout];

    pub fn name(self) -> &'static str {
        match self {
            Container::Search => "search",
            Container::Budget => "budget",
            Container::Loadout => "loadout",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Container::Search => Container::Budget,
            Container::Budget => Container::Loadout,
            Container::Loadout => Container::Search,
        }
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Bad input; no request was sent.
    Validation,
    /// Request succeeded with nothing to show.
    Empty,
    /// Backend reported an `error` field.
    Server,
    /// Backend unreachable or unreadable.
    Transport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSummary {
    pub budget: f64,
    pub count: usize,
    pub total_spent: f64,
    pub remaining: f64,
    pub cheapest: Option<f64>,
    pub most_expensive: Option<f64>,
}

impl BudgetSummary {
    /// Server figures are used when present; otherwise derived from the listed prices.
    pub fn from_report(report: &BudgetReport) -> Self {
        let prices: Vec<f64> = report.skins.iter().filter_map(|s| s.price).collect();
        let total_spent = report.total_spent.unwrap_or_else(|| prices.iter().sum());
        let remaining = report.remaining.unwrap_or(report.budget - total_spent);
        Self {
            budget: report.budget,
            count: report.skins.len(),
            total_spent,
            remaining,
            cheapest: prices.iter().copied().reduce(f64::min),
            most_expensive: prices.iter().copied().reduce(f64::max),
        }
    }

    fn entries(&self) -> Vec<(&'static str, String, bool)> {
        let mut entries = vec![
            ("Budget", money(self.budget), false),
            ("Total Spent", money(self.total_spent), false),
            ("Remaining", money(self.remaining), true),
            ("Skins Found", self.count.to_string(), false),
        ];
        if let Some(v) = self.cheapest {
            entries.push(("Cheapest", money(v), false));
        }
        if let Some(v) = self.most_expensive {
            entries.push(("Most Expensive", money(v), true));
        }
        entries
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotSection {
    pub slot: LoadoutSlot,
    pub title: String,
    pub budget_label: String,
    pub cards: Vec<SkinCard>,
}

pub const NO_SLOT_OPTIONS: &str = "No options found in this range.";
/// Shown under the count label when a result set has no cards.
pub const NO_SKINS_FOUND: &str = "No skins found.";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Panel {
    #[default]
    Idle,
    Loading(String),
    Notice(Notice),
    Cards {
        count_label: Option<String>,
        cards: Vec<SkinCard>,
    },
    Budget {
        summary: BudgetSummary,
        cards: Vec<SkinCard>,
    },
    Loadout(Vec<SlotSection>),
}

impl Panel {
    pub fn notice(kind: NoticeKind, text: impl Into<String>) -> Self {
        Panel::Notice(Notice::new(kind, text))
    }

    pub fn to_html(&self, mode: ViewMode) -> String {
        let mut out = String::new();
        match self {
            Panel::Idle => {}
            Panel::Loading(text) => {
                let _ = write!(out, "<div class=\"msg-loading\">{}</div>", escape_html(text));
            }
            Panel::Notice(n) => {
                let _ = write!(out, "<div class=\"msg-error\">{}</div>", escape_html(&n.text));
            }
            Panel::Cards { count_label, cards } => {
                if let Some(label) = count_label {
                    let _ = write!(out, "<div class=\"results-count\">{}</div>", escape_html(label));
                }
                if cards.is_empty() {
                    let _ = write!(out, "<div class=\"msg-error\">{NO_SKINS_FOUND}</div>");
                } else {
                    push_grid(&mut out, cards, mode);
                }
            }
            Panel::Budget { summary, cards } => {
                out.push_str("<div class=\"budget-summary\">");
                for (label, value, positive) in summary.entries() {
                    let class = if positive { "summary-value positive" } else { "summary-value" };
                    let _ = write!(
                        out,
                        "<div class=\"summary-card\"><div class=\"summary-label\">{label}</div>\
                         <div class=\"{class}\">{value}</div></div>"
                    );
                }
                out.push_str("</div>");
                push_grid(&mut out, cards, mode);
            }
            Panel::Loadout(sections) => {
                out.push_str("<div class=\"loadout-slots\">");
                for s in sections {
                    let _ = write!(
                        out,
                        "<div class=\"slot-section\"><div class=\"slot-header\">\
                         <div class=\"slot-icon {key}\">{icon}</div>\
                         <div class=\"slot-title\">{title}</div>\
                         <div class=\"slot-budget-tag\">Budget: {budget}</div></div>\
                         <div class=\"slot-options skin-grid\">",
                        key = s.slot.key(),
                        icon = s.slot.icon(),
                        title = escape_html(&s.title),
                        budget = escape_html(&s.budget_label),
                    );
                    if s.cards.is_empty() {
                        let _ = write!(out, "<div class=\"msg-error\">{NO_SLOT_OPTIONS}</div>");
                    }
                    for card in &s.cards {
                        out.push_str(&card.to_html());
                    }
                    out.push_str("</div></div>");
                }
                out.push_str("</div>");
            }
        }
        out
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match self {
            Panel::Idle => {}
            Panel::Loading(text) | Panel::Notice(Notice { text, .. }) => lines.push(text.clone()),
            Panel::Cards { count_label, cards } => {
                if let Some(label) = count_label {
                    lines.push(label.clone());
                }
                if cards.is_empty() {
                    lines.push(NO_SKINS_FOUND.to_string());
                }
                push_card_lines(&mut lines, cards);
            }
            Panel::Budget { summary, cards } => {
                let parts: Vec<String> = summary
                    .entries()
                    .into_iter()
                    .map(|(label, value, _)| format!("{label}: {value}"))
                    .collect();
                lines.push(parts.join(" | "));
                push_card_lines(&mut lines, cards);
            }
            Panel::Loadout(sections) => {
                for s in sections {
                    lines.push(format!("{} {}  (Budget: {})", s.slot.icon(), s.title, s.budget_label));
                    if s.cards.is_empty() {
                        lines.push(format!("  {NO_SLOT_OPTIONS}"));
                    }
                    for card in &s.cards {
                        lines.extend(card.to_lines().into_iter().map(|l| format!("  {l}")));
                    }
                }
            }
        }
        lines
    }
}

fn push_grid(out: &mut String, cards: &[SkinCard], mode: ViewMode) {
    match mode {
        ViewMode::Grid => out.push_str("<div class=\"skin-grid\">"),
        ViewMode::List => out.push_str("<div class=\"skin-grid list-mode\">"),
    }
    for card in cards {
        out.push_str(&card.to_html());
    }
    out.push_str("</div>");
}

fn push_card_lines(lines: &mut Vec<String>, cards: &[SkinCard]) {
    for card in cards {
        lines.extend(card.to_lines());
    }
}

pub fn money(v: f64) -> String {
    format!("${v:.2}")
}

/// `"1 listing"`, `"3 listings"`.
pub fn listing_count_label(n: usize) -> String {
    if n == 1 {
        "1 listing".to_string()
    } else {
        format!("{n} listings")
    }
}
