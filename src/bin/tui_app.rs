use crossterm::event::KeyCode;

use skin_market::panel::{Container, ViewMode};
use skin_market::types::{LoadoutRequest, WearTier};
use skin_market::view::Job;
use skin_market::ViewController;

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

/// An editable text input. Each one is bound to the key that starts editing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Query,
    MinPrice,
    MaxPrice,
    Budget,
    Weapons,
    Knife,
    Gloves,
}

impl Field {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '/' => Some(Field::Query),
            '[' => Some(Field::MinPrice),
            ']' => Some(Field::MaxPrice),
            'b' => Some(Field::Budget),
            'w' => Some(Field::Weapons),
            'k' => Some(Field::Knife),
            'g' => Some(Field::Gloves),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Query => "weapon",
            Field::MinPrice => "min $",
            Field::MaxPrice => "max $",
            Field::Budget => "budget $",
            Field::Weapons => "weapons $",
            Field::Knife => "knife $",
            Field::Gloves => "gloves $",
        }
    }

    /// The container a field feeds. The weapon query feeds both search and budget.
    fn container(self) -> Option<Container> {
        match self {
            Field::Query => None,
            Field::MinPrice | Field::MaxPrice => Some(Container::Search),
            Field::Budget => Some(Container::Budget),
            Field::Weapons | Field::Knife | Field::Gloves => Some(Container::Loadout),
        }
    }

    fn accepts(self, c: char) -> bool {
        match self {
            Field::Query => !c.is_control(),
            _ => c.is_ascii_digit() || c == '.',
        }
    }
}

/// Raw text of every input, parsed only when a request is issued.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    pub query: String,
    pub min_price: String,
    pub max_price: String,
    pub budget: String,
    pub weapons: String,
    pub knife: String,
    pub gloves: String,
}

impl Inputs {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Query => &self.query,
            Field::MinPrice => &self.min_price,
            Field::MaxPrice => &self.max_price,
            Field::Budget => &self.budget,
            Field::Weapons => &self.weapons,
            Field::Knife => &self.knife,
            Field::Gloves => &self.gloves,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Query => &mut self.query,
            Field::MinPrice => &mut self.min_price,
            Field::MaxPrice => &mut self.max_price,
            Field::Budget => &mut self.budget,
            Field::Weapons => &mut self.weapons,
            Field::Knife => &mut self.knife,
            Field::Gloves => &mut self.gloves,
        }
    }

    pub fn amount(&self, field: Field) -> Option<f64> {
        parse_amount(self.get(field))
    }
}

/// Blank or unparsable text reads as "not entered".
pub fn parse_amount(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Prefill text for an amount passed on the command line.
pub fn amount_text(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

pub enum Action {
    None,
    Quit,
    Send(Job),
}

pub struct AppState {
    pub view: ViewController,
    pub active: Container,
    pub inputs: Inputs,
    pub editing: Option<Field>,
    pub in_flight: usize,
}

impl AppState {
    pub fn new(view: ViewController, inputs: Inputs) -> Self {
        Self {
            view,
            active: Container::Search,
            inputs,
            editing: None,
            in_flight: 0,
        }
    }

    /// Issue the request belonging to the active container.
    pub fn submit(&mut self) -> Option<Job> {
        let inputs = &self.inputs;
        match self.active {
            Container::Search => self.view.begin_search(
                &inputs.query,
                inputs.amount(Field::MinPrice),
                inputs.amount(Field::MaxPrice),
            ),
            Container::Budget => self
                .view
                .begin_optimize(inputs.amount(Field::Budget), &inputs.query),
            Container::Loadout => {
                let side = self.view.side();
                self.view.begin_loadout(
                    side,
                    inputs.amount(Field::Weapons).unwrap_or(0.0),
                    inputs.amount(Field::Knife).unwrap_or(0.0),
                    inputs.amount(Field::Gloves).unwrap_or(0.0),
                )
            }
        }
    }

    /// Live sum of the three loadout budgets; blanks count as zero.
    pub fn loadout_total(&self) -> f64 {
        LoadoutRequest {
            side: self.view.side(),
            weapons_budget: self.inputs.amount(Field::Weapons).unwrap_or(0.0),
            knife_budget: self.inputs.amount(Field::Knife).unwrap_or(0.0),
            gloves_budget: self.inputs.amount(Field::Gloves).unwrap_or(0.0),
        }
        .total()
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        if let Some(field) = self.editing {
            return self.handle_edit_key(field, code);
        }

        if let Some(field) = key_char(code).and_then(Field::from_key) {
            if let Some(container) = field.container() {
                self.active = container;
            }
            self.editing = Some(field);
            return Action::None;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return Action::Quit,
            KeyCode::Enter => {
                let job = self.submit();
                return self.send(job);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let job = self.view.rerun(self.active).or_else(|| self.submit());
                return self.send(job);
            }
            KeyCode::Tab => self.active = self.active.next(),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.view.filters_mut().toggle_tier(WearTier::ALL[idx]);
                self.view.apply_filters();
            }
            KeyCode::Char('s') => {
                let on = !self.view.filters().stattrak_only;
                self.view.filters_mut().set_stattrak_only(on);
                self.view.apply_filters();
            }
            KeyCode::Char('c') => {
                self.inputs.min_price.clear();
                self.inputs.max_price.clear();
                self.view.filters_mut().clear();
                self.view.apply_filters();
            }
            KeyCode::Char('v') => {
                let mode = self.view.view_mode().toggled();
                self.view.set_view_mode(mode);
            }
            KeyCode::Char('t') => {
                let side = self.view.side().toggled();
                self.view.set_side(side);
            }
            _ => {}
        }
        Action::None
    }

    fn handle_edit_key(&mut self, field: Field, code: KeyCode) -> Action {
        match code {
            KeyCode::Char(c) if field.accepts(c) => self.inputs.get_mut(field).push(c),
            KeyCode::Backspace => {
                self.inputs.get_mut(field).pop();
            }
            KeyCode::Esc => self.editing = None,
            KeyCode::Enter => {
                self.editing = None;
                let job = self.submit();
                return self.send(job);
            }
            _ => {}
        }
        Action::None
    }

    fn send(&mut self, job: Option<Job>) -> Action {
        match job {
            Some(job) => {
                self.in_flight += 1;
                Action::Send(job)
            }
            None => Action::None,
        }
    }

    pub fn view_mode_label(&self) -> &'static str {
        match self.view.view_mode() {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

fn key_char(code: KeyCode) -> Option<char> {
    match code {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Checked tiers as `FN MW`, or `all` when none are checked.
pub fn format_tiers(view: &ViewController) -> String {
    let tiers = &view.filters().tiers;
    if tiers.is_empty() {
        return "all".to_string();
    }
    tiers.iter().map(|t| t.label()).collect::<Vec<_>>().join(" ")
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skin_market::config::Config;
    use skin_market::panel::{NoticeKind, Panel};
    use skin_market::view::{Request, MSG_NO_WEAPONS_BUDGET};
    use skin_market::{BackendClient, Side};

    fn app() -> AppState {
        let client = BackendClient::new(&Config::with_api_url("http://127.0.0.1:9")).unwrap();
        AppState::new(
            ViewController::new(client),
            Inputs {
                budget: "20".to_string(),
                weapons: "30".to_string(),
                ..Inputs::default()
            },
        )
    }

    fn type_into(app: &mut AppState, key: char, text: &str) {
        app.handle_key(KeyCode::Char(key));
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Esc);
    }

    #[test]
    fn number_keys_toggle_wear_filters() {
        let mut app = app();
        app.handle_key(KeyCode::Char('3'));
        assert!(app.view.filters().tiers.contains(&WearTier::FieldTested));
        assert_eq!(format_tiers(&app.view), "FT");
        app.handle_key(KeyCode::Char('c'));
        assert_eq!(format_tiers(&app.view), "all");
    }

    #[test]
    fn enter_with_blank_query_sends_nothing() {
        let mut app = app();
        assert!(matches!(app.handle_key(KeyCode::Enter), Action::None));
        assert_eq!(app.in_flight, 0);
        assert!(matches!(app.view.panel(Container::Search), Panel::Notice(_)));
    }

    #[test]
    fn typed_query_is_submitted() {
        let mut app = app();
        app.handle_key(KeyCode::Char('/'));
        for c in "AK-47".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        assert_eq!(app.inputs.query, "AK-47");
        assert!(matches!(app.handle_key(KeyCode::Enter), Action::Send(_)));
        assert!(app.editing.is_none());
        assert_eq!(app.in_flight, 1);
    }

    #[test]
    fn price_bounds_are_sent_with_the_search() {
        let mut app = app();
        type_into(&mut app, '/', "AWP");
        type_into(&mut app, '[', "2.5");
        type_into(&mut app, ']', "4x0");
        assert_eq!(app.inputs.max_price, "40");
        assert_eq!(app.active, Container::Search);

        match app.handle_key(KeyCode::Enter) {
            Action::Send(job) => assert_eq!(
                job.request,
                Request::Search {
                    query: "AWP".to_string(),
                    min_price: 2.5,
                    max_price: 40.0,
                }
            ),
            _ => panic!("expected a search to be sent"),
        }
    }

    #[test]
    fn clear_resets_price_bounds_and_filters() {
        let mut app = app();
        type_into(&mut app, '[', "5");
        type_into(&mut app, ']', "50");
        app.handle_key(KeyCode::Char('2'));
        app.handle_key(KeyCode::Char('s'));

        app.handle_key(KeyCode::Char('c'));
        assert!(app.inputs.min_price.is_empty());
        assert!(app.inputs.max_price.is_empty());
        assert!(app.view.filters().is_empty());

        type_into(&mut app, '/', "AK-47");
        match app.handle_key(KeyCode::Enter) {
            Action::Send(job) => assert_eq!(
                job.request,
                Request::Search {
                    query: "AK-47".to_string(),
                    min_price: 0.0,
                    max_price: 999_999.0,
                }
            ),
            _ => panic!("expected a search to be sent"),
        }
    }

    #[test]
    fn edited_budget_is_sent_to_the_optimizer() {
        let mut app = app();
        type_into(&mut app, '/', "AWP");
        app.handle_key(KeyCode::Char('b'));
        assert_eq!(app.active, Container::Budget);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Backspace);
        for c in "75.5".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        match app.handle_key(KeyCode::Enter) {
            Action::Send(job) => assert_eq!(
                job.request,
                Request::Optimize {
                    budget: 75.5,
                    query: "AWP".to_string(),
                }
            ),
            _ => panic!("expected an optimize request to be sent"),
        }
    }

    #[test]
    fn loadout_budgets_are_editable_with_a_live_total() {
        let mut app = app();
        assert_eq!(app.loadout_total(), 30.0);
        type_into(&mut app, 'k', "150");
        type_into(&mut app, 'g', "70.25");
        assert_eq!(app.active, Container::Loadout);
        assert_eq!(app.loadout_total(), 250.25);

        app.handle_key(KeyCode::Char('t'));
        match app.handle_key(KeyCode::Enter) {
            Action::Send(job) => match job.request {
                Request::Loadout(req) => {
                    assert_eq!(req.side, Side::CT);
                    assert_eq!(req.weapons_budget, 30.0);
                    assert_eq!(req.knife_budget, 150.0);
                    assert_eq!(req.gloves_budget, 70.25);
                }
                other => panic!("unexpected request {other:?}"),
            },
            _ => panic!("expected a loadout request to be sent"),
        }
    }

    #[test]
    fn blank_weapons_budget_is_rejected() {
        let mut app = app();
        app.handle_key(KeyCode::Char('w'));
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Backspace);
        assert!(matches!(app.handle_key(KeyCode::Enter), Action::None));
        assert_eq!(
            app.view.panel(Container::Loadout),
            &Panel::notice(NoticeKind::Validation, MSG_NO_WEAPONS_BUDGET)
        );
    }

    #[test]
    fn amount_parsing() {
        assert_eq!(parse_amount(" 12.5 "), Some(12.5));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(amount_text(Some(40.0)), "40");
        assert_eq!(amount_text(None), "");
    }

    #[test]
    fn tab_cycles_containers() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.active, Container::Budget);
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.active, Container::Search);
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("StatTrak™ M4A4", 20), "StatTrak™ M4A4");
        assert_eq!(truncate("StatTrak™ M4A4", 5), "Stat…");
    }
}
