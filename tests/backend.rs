//! End-to-end runs of the view controller against a stand-in backend.

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use skin_market::config::Config;
use skin_market::panel::{Container, NoticeKind, Panel};
use skin_market::types::{FilterState, Side, WearTier};
use skin_market::view::{MSG_CONNECT_FAILED, MSG_EMPTY_BUDGET, MSG_EMPTY_SEARCH};
use skin_market::{BackendClient, ViewController};

// ---------------------------------------------------------------------------
// Stand-in backend
// ---------------------------------------------------------------------------

async fn search(Query(q): Query<HashMap<String, String>>) -> Response {
    match q.get("q").map(String::as_str) {
        Some("AK-47") => Json(json!({
            "results": [
                {
                    "name": "AK-47 | Redline (Field-Tested)",
                    "sell_price_text": "$12.34",
                    "price": "$15.00",
                    "sell_listings": 120,
                    "icon_url": "https://cdn.example/redline.png",
                    "market_url": "https://market.example/redline"
                },
                {
                    "name": "StatTrak™ AK-47 | Vulcan (Factory New)",
                    "sell_price_text": "$410.00",
                    "sell_listings": 4
                },
                {
                    "name": "AK-47 | Slate (Minimal Wear)",
                    "sell_price_text": "$3.10",
                    "sell_listings": 900
                }
            ]
        }))
        .into_response(),
        Some("Echo") => {
            let name = format!(
                "min={} max={}",
                q.get("min").cloned().unwrap_or_default(),
                q.get("max").cloned().unwrap_or_default()
            );
            Json(json!({ "results": [{ "name": name }] })).into_response()
        }
        Some("Broken") => (StatusCode::BAD_GATEWAY, "<html>upstream down</html>").into_response(),
        _ => Json(json!({ "results": [] })).into_response(),
    }
}

async fn optimize(Json(body): Json<Value>) -> Json<Value> {
    let budget = body["budget"].as_f64().unwrap_or(0.0);
    if budget < 1.0 {
        return Json(json!({ "error": "Budget must be at least $1" }));
    }
    if body["query"] == "Nothing" {
        return Json(json!({ "skins": [], "budget": budget }));
    }
    Json(json!({
        "budget": budget,
        "skins": [
            { "name": "AWP | Atheris (Field-Tested)", "price": "$4.00", "listings": 50 },
            { "name": "AWP | Capillary (Minimal Wear)", "price": 1.5, "listings": 12 }
        ]
    }))
}

async fn loadout(Json(body): Json<Value>) -> Json<Value> {
    let primary = if body["side"] == "CT" {
        "M4A1-S | Printstream (Minimal Wear)"
    } else {
        "AK-47 | Neon Rider (Field-Tested)"
    };
    Json(json!({
        "slots": {
            "primary": [{ "name": primary, "price": "$40.00", "listings": 30 }],
            "secondary": [],
            "gloves": [{ "name": "★ Driver Gloves | Lunar Weave (Well-Worn)", "price": "$95.00" }]
        }
    }))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/search", get(search))
        .route("/budget/optimize", post(optimize))
        .route("/loadout/build", post(loadout))
        .route(
            "/health",
            get(|| async { Json(json!({ "status": "ok", "message": "CS Skin API is alive" })) }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn controller(base_url: &str) -> ViewController {
    ViewController::new(BackendClient::new(&Config::with_api_url(base_url)).unwrap())
}

async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_renders_cards_in_server_order() {
    let url = spawn_backend().await;
    let mut vc = controller(&url);

    vc.search("AK-47", None, None).await;

    let names: Vec<&str> = vc.cached_results().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "AK-47 | Redline (Field-Tested)",
            "StatTrak™ AK-47 | Vulcan (Factory New)",
            "AK-47 | Slate (Minimal Wear)",
        ]
    );
    match vc.panel(Container::Search) {
        Panel::Cards { count_label, cards } => {
            assert_eq!(count_label.as_deref(), Some("3 listings"));
            assert_eq!(cards[0].price_text, "$12.34");
            assert_eq!(cards[0].listings, Some(120));
            assert_eq!(cards[1].base_name, "AK-47 | Vulcan");
            assert!(cards[1].stattrak);
        }
        other => panic!("unexpected panel {other:?}"),
    }

    let html = vc.to_html(Container::Search);
    assert!(html.contains("<span class=\"skin-price\">$12.34</span>"));
    assert!(html.contains("skin-img-placeholder"));
}

#[tokio::test]
async fn filters_reapply_without_refetch() {
    let url = spawn_backend().await;
    let mut vc = controller(&url);
    vc.search("AK-47", None, None).await;

    vc.set_filters(FilterState::new([WearTier::MinimalWear, WearTier::FieldTested], false));
    vc.apply_filters();
    match vc.panel(Container::Search) {
        Panel::Cards { cards, .. } => {
            let names: Vec<&str> = cards.iter().map(|c| c.base_name.as_str()).collect();
            assert_eq!(names, ["AK-47 | Redline", "AK-47 | Slate"]);
        }
        other => panic!("unexpected panel {other:?}"),
    }
    assert_eq!(vc.cached_results().len(), 3);
}

#[tokio::test]
async fn search_sends_default_price_bounds() {
    let url = spawn_backend().await;
    let mut vc = controller(&url);
    vc.search("Echo", None, None).await;
    assert_eq!(vc.cached_results()[0].name, "min=0 max=999999");

    vc.search("Echo", Some(2.5), Some(40.0)).await;
    assert_eq!(vc.cached_results()[0].name, "min=2.5 max=40");
}

#[tokio::test]
async fn empty_search_shows_price_range_message() {
    let url = spawn_backend().await;
    let mut vc = controller(&url);
    vc.search("Zeus x27", None, None).await;
    assert_eq!(
        vc.panel(Container::Search),
        &Panel::notice(NoticeKind::Empty, MSG_EMPTY_SEARCH)
    );
}

#[tokio::test]
async fn non_json_body_is_a_transport_failure() {
    let url = spawn_backend().await;
    let mut vc = controller(&url);
    vc.search("Broken", None, None).await;
    assert_eq!(
        vc.panel(Container::Search),
        &Panel::notice(NoticeKind::Transport, MSG_CONNECT_FAILED)
    );
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    let url = closed_port_url().await;
    let mut vc = controller(&url);
    vc.optimize_budget(Some(10.0), "AWP").await;
    assert_eq!(
        vc.panel(Container::Budget),
        &Panel::notice(NoticeKind::Transport, MSG_CONNECT_FAILED)
    );
}

#[tokio::test]
async fn budget_summary_and_cards() {
    let url = spawn_backend().await;
    let mut vc = controller(&url);
    vc.search("AK-47", None, None).await;
    vc.optimize_budget(Some(10.0), "AWP").await;

    match vc.panel(Container::Budget) {
        Panel::Budget { summary, cards } => {
            assert_eq!(summary.count, 2);
            assert_eq!(summary.budget, 10.0);
            assert!((summary.total_spent - 5.5).abs() < 1e-9);
            assert!((summary.remaining - 4.5).abs() < 1e-9);
            assert_eq!(summary.cheapest, Some(1.5));
            assert_eq!(summary.most_expensive, Some(4.0));
            assert_eq!(cards[1].price_text, "$1.50");
        }
        other => panic!("unexpected panel {other:?}"),
    }
    // the optimizer never touches the search cache
    assert_eq!(vc.cached_results().len(), 3);
}

#[tokio::test]
async fn budget_server_error_and_empty_result() {
    let url = spawn_backend().await;
    let mut vc = controller(&url);

    vc.optimize_budget(Some(0.5), "AWP").await;
    assert_eq!(
        vc.panel(Container::Budget),
        &Panel::notice(NoticeKind::Server, "Budget must be at least $1")
    );

    vc.optimize_budget(Some(5.0), "Nothing").await;
    assert_eq!(
        vc.panel(Container::Budget),
        &Panel::notice(NoticeKind::Empty, MSG_EMPTY_BUDGET)
    );
}

#[tokio::test]
async fn loadout_sections_for_ct() {
    let url = spawn_backend().await;
    let mut vc = controller(&url);
    vc.build_loadout(Side::CT, 80.0, 0.0, 100.0).await;

    match vc.panel(Container::Loadout) {
        Panel::Loadout(sections) => {
            let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
            assert_eq!(
                titles,
                [
                    "Primary — M4A4 / M4A1-S / AUG",
                    "Secondary — USP-S / P2000 / Five-SeveN",
                    "Gloves",
                ]
            );
            assert_eq!(sections[0].budget_label, "$40.00");
            assert_eq!(sections[0].cards[0].base_name, "M4A1-S | Printstream");
            assert!(sections[1].cards.is_empty());
            assert_eq!(sections[2].budget_label, "$100.00");
        }
        other => panic!("unexpected panel {other:?}"),
    }
    assert!(vc.to_html(Container::Loadout).contains("No options found in this range."));
}

#[tokio::test]
async fn health_check() {
    let url = spawn_backend().await;
    let vc = controller(&url);
    let health = vc.client().health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.message, "CS Skin API is alive");
}
