mod tui_app;

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use skin_market::card::SkinCard;
use skin_market::config::{Config, CHANNEL_CAPACITY};
use skin_market::panel::{money, Container, NoticeKind, Panel, ViewMode};
use skin_market::types::WearTier;
use skin_market::view::{Completion, Job};
use skin_market::{BackendClient, ViewController};
use tui_app::{amount_text, format_tiers, truncate, Action, AppState, Field, Inputs};

/// Interactive skin-market browser
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Weapon to search for on start, e.g. "AK-47"
    query: Option<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    /// Budget for the optimizer view
    #[arg(long)]
    budget: Option<f64>,
    /// Weapons budget for the loadout view
    #[arg(long)]
    weapons: Option<f64>,
    #[arg(long)]
    knife: Option<f64>,
    #[arg(long)]
    gloves: Option<f64>,
    /// Where log lines go when LOG_LEVEL is set
    #[arg(long, default_value = "skin-market-tui.log")]
    log_file: PathBuf,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    // the UI owns the terminal, so logs go to a file and only when asked for
    if std::env::var("LOG_LEVEL").is_ok() {
        let writer = match log_writer(&args.log_file) {
            Ok(w) => w,
            Err(e) => {
                eprintln!("Cannot open log file {}: {e}", args.log_file.display());
                std::process::exit(1);
            }
        };
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(&cfg.log_level))
            .with_writer(writer)
            .with_ansi(false)
            .init();
    }

    let client = match BackendClient::new(&cfg) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("HTTP client error: {e}");
            std::process::exit(1);
        }
    };

    let inputs = Inputs {
        query: args.query.unwrap_or_default(),
        min_price: amount_text(args.min_price),
        max_price: amount_text(args.max_price),
        budget: amount_text(args.budget),
        weapons: amount_text(args.weapons),
        knife: amount_text(args.knife),
        gloves: amount_text(args.gloves),
    };
    let mut app = AppState::new(ViewController::new(client), inputs);
    let (tx, mut rx) = mpsc::channel::<Completion>(CHANNEL_CAPACITY);

    if !app.inputs.query.trim().is_empty() {
        if let Some(job) = app.submit() {
            app.in_flight += 1;
            spawn_job(job, app.view.client().clone(), tx.clone());
        }
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &tx, &mut rx).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Appending file writer for the log subscriber.
fn log_writer(path: &Path) -> io::Result<Mutex<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Mutex::new(file))
}

fn spawn_job(job: Job, client: BackendClient, tx: mpsc::Sender<Completion>) {
    tokio::spawn(async move {
        let done = job.run(&client).await;
        let _ = tx.send(done).await;
    });
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    tx: &mpsc::Sender<Completion>,
    rx: &mut mpsc::Receiver<Completion>,
) -> io::Result<()> {
    let poll_interval = Duration::from_millis(100);

    loop {
        while let Ok(done) = rx.try_recv() {
            app.in_flight = app.in_flight.saturating_sub(1);
            app.view.complete(done);
        }

        terminal.draw(|f| render(f, app))?;

        if !event::poll(poll_interval)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.handle_key(key.code) {
                Action::Quit => return Ok(()),
                Action::Send(job) => spawn_job(job, app.view.client().clone(), tx.clone()),
                Action::None => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // query / filters
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_controls(f, app, chunks[1]);
    render_body(f, app, chunks[2]);
    render_footer(f, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![Span::styled(
        " CS Skin Market  ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    for c in Container::ALL {
        let style = if c == app.active {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", c.name()), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(" │  "));
    let side_color = match app.view.side() {
        skin_market::Side::T => Color::Yellow,
        skin_market::Side::CT => Color::LightBlue,
    };
    spans.push(Span::styled(
        format!("side {}", app.view.side()),
        Style::default().fg(side_color),
    ));
    if app.in_flight > 0 {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(
            format!("◌ {} pending", app.in_flight),
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_controls(f: &mut Frame, app: &AppState, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let sep = || Span::raw("  │  ");

    let mut spans = Vec::new();
    let fields: &[Field] = match app.active {
        Container::Search => &[Field::Query, Field::MinPrice, Field::MaxPrice],
        Container::Budget => &[Field::Query, Field::Budget],
        Container::Loadout => &[Field::Weapons, Field::Knife, Field::Gloves],
    };
    for (i, &field) in fields.iter().enumerate() {
        if i > 0 {
            spans.push(sep());
        }
        let editing = app.editing == Some(field);
        let style = if editing {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let cursor = if editing { "▏" } else { "" };
        spans.push(Span::styled(format!(" {}: ", field.label()), label));
        spans.push(Span::styled(format!("{}{cursor}", app.inputs.get(field)), style));
    }

    match app.active {
        Container::Search => {
            let stattrak = if app.view.filters().stattrak_only { "on" } else { "off" };
            spans.extend([
                sep(),
                Span::styled("wear: ", label),
                Span::raw(format_tiers(&app.view)),
                sep(),
                Span::styled("StatTrak only: ", label),
                Span::raw(stattrak),
            ]);
        }
        Container::Loadout => {
            spans.extend([
                sep(),
                Span::styled("Total: ", label),
                Span::raw(money(app.loadout_total())),
            ]);
        }
        Container::Budget => {}
    }
    spans.extend([
        sep(),
        Span::styled("view: ", label),
        Span::raw(app.view_mode_label()),
    ]);

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", app.active.name().to_uppercase()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let panel = app.view.panel(app.active);
    match panel {
        Panel::Idle => {
            let hint = Paragraph::new("Press / to type a weapon, Enter to send.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(hint, area);
        }
        Panel::Loading(text) => {
            let p = Paragraph::new(text.as_str())
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            f.render_widget(p, area);
        }
        Panel::Notice(n) => {
            let color = match n.kind {
                NoticeKind::Empty => Color::DarkGray,
                _ => Color::Red,
            };
            let p = Paragraph::new(n.text.as_str())
                .style(Style::default().fg(color))
                .wrap(Wrap { trim: true })
                .block(block);
            f.render_widget(p, area);
        }
        Panel::Cards { count_label, cards }
            if app.view.view_mode() == ViewMode::Grid && !cards.is_empty() =>
        {
            let title = count_label.clone().unwrap_or_default();
            render_card_table(f, cards, &title, block, area);
        }
        Panel::Budget { cards, .. } if app.view.view_mode() == ViewMode::Grid => {
            let title = panel.to_lines().into_iter().next().unwrap_or_default();
            render_card_table(f, cards, &title, block, area);
        }
        _ => {
            let lines: Vec<Line> = panel.to_lines().into_iter().map(Line::from).collect();
            let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
            f.render_widget(p, area);
        }
    }
}

fn render_card_table(f: &mut Frame, cards: &[SkinCard], title: &str, block: Block, area: Rect) {
    let header_cells = ["Wear", "Skin", "Price", "Listings", "ST"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = cards
        .iter()
        .map(|c| {
            let (wear, wear_color) = match c.wear {
                Some(t) => (t.label(), wear_color(t)),
                None => ("—", Color::DarkGray),
            };
            let listings = c.listings.map_or("—".to_string(), |n| n.to_string());
            let st = if c.stattrak { "★" } else { "" };
            Row::new(vec![
                Cell::from(wear).style(Style::default().fg(wear_color)),
                Cell::from(truncate(&c.base_name, 40)),
                Cell::from(c.price_text.clone()).style(Style::default().fg(Color::Green)),
                Cell::from(listings).style(Style::default().fg(Color::Cyan)),
                Cell::from(st).style(Style::default().fg(Color::LightRed)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(2),
        ],
    )
    .header(header)
    .block(block.title_bottom(Span::styled(
        format!(" {title} "),
        Style::default().fg(Color::White),
    )));

    f.render_widget(table, area);
}

fn wear_color(t: WearTier) -> Color {
    match t {
        WearTier::FactoryNew => Color::Green,
        WearTier::MinimalWear => Color::LightGreen,
        WearTier::FieldTested => Color::Yellow,
        WearTier::WellWorn => Color::LightRed,
        WearTier::BattleScarred => Color::Red,
    }
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[/] ", Style::default().fg(Color::Yellow)),
        Span::raw("weapon  "),
        Span::styled("[[ ]] ", Style::default().fg(Color::Yellow)),
        Span::raw("min/max  "),
        Span::styled("[b w k g] ", Style::default().fg(Color::Yellow)),
        Span::raw("budgets  "),
        Span::styled("[enter/r] ", Style::default().fg(Color::Yellow)),
        Span::raw("send  "),
        Span::styled("[tab] ", Style::default().fg(Color::Yellow)),
        Span::raw("view  "),
        Span::styled("[1-5] ", Style::default().fg(Color::Yellow)),
        Span::raw("wear  "),
        Span::styled("[s] ", Style::default().fg(Color::Yellow)),
        Span::raw("StatTrak  "),
        Span::styled("[c] ", Style::default().fg(Color::Yellow)),
        Span::raw("clear  "),
        Span::styled("[v] ", Style::default().fg(Color::Yellow)),
        Span::raw("grid/list  "),
        Span::styled("[t] ", Style::default().fg(Color::Yellow)),
        Span::raw("side"),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
