pub mod card;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod panel;
pub mod parser;
pub mod types;
pub mod view;

pub use client::BackendClient;
pub use error::{AppError, Result};
pub use panel::{Container, Panel, ViewMode};
pub use types::{FilterState, Side, SkinListing, WearTier};
pub use view::ViewController;
