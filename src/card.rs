use std::fmt::Write;

use crate::parser::{self, STATTRAK_PREFIX};
use crate::types::{SkinListing, WearTier};

/// Shown in place of the image when a listing has no icon.
pub const PLACEHOLDER_GLYPH: &str = "◈";

/// `href` used when a listing has no marketplace URL.
pub const NO_LINK: &str = "#";

/// Display fragment for one listing. Everything except the name degrades to
/// omitted or placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinCard {
    pub base_name: String,
    pub stattrak: bool,
    pub wear: Option<WearTier>,
    pub listings: Option<u64>,
    pub price_text: String,
    pub icon_url: Option<String>,
    pub market_url: Option<String>,
}

impl SkinCard {
    pub fn from_listing(listing: &SkinListing) -> Self {
        let parsed = parser::parse(&listing.name);
        Self {
            base_name: parsed.base_name,
            stattrak: parsed.stattrak,
            wear: parsed.tier,
            listings: listing.listings,
            price_text: listing.price_text.clone(),
            icon_url: non_empty(listing.icon_url.as_deref()),
            market_url: non_empty(listing.market_url.as_deref()),
        }
    }

    pub fn listings_text(&self) -> String {
        match self.listings {
            Some(n) => format!("{n} listings"),
            None => "? listings".to_string(),
        }
    }

    pub fn href(&self) -> &str {
        self.market_url.as_deref().unwrap_or(NO_LINK)
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let name = escape_html(&self.base_name);

        out.push_str("<div class=\"skin-card\">");
        match &self.market_url {
            Some(url) => {
                let _ = write!(
                    out,
                    "<a href=\"{}\" target=\"_blank\" class=\"skin-link\">",
                    escape_html(url)
                );
            }
            None => {
                let _ = write!(out, "<a href=\"{NO_LINK}\" class=\"skin-link\">");
            }
        }

        out.push_str("<div class=\"skin-img-wrap\">");
        if self.stattrak {
            let _ = write!(out, "<div class=\"st-badge\">{STATTRAK_PREFIX}</div>");
        }
        match &self.icon_url {
            Some(icon) => {
                let _ = write!(
                    out,
                    "<img src=\"{}\" alt=\"{name}\" loading=\"lazy\" />",
                    escape_html(icon)
                );
            }
            None => {
                let _ = write!(out, "<div class=\"skin-img-placeholder\">{PLACEHOLDER_GLYPH}</div>");
            }
        }
        out.push_str("</div>");

        out.push_str("<div class=\"skin-body\"><div class=\"skin-wear-row\">");
        if let Some(tier) = self.wear {
            let _ = write!(
                out,
                "<span class=\"skin-wear-badge wear-{}\">{}</span>",
                tier.code(),
                tier.label()
            );
        }
        let _ = write!(
            out,
            "<span class=\"skin-listings-badge\">{}</span></div>",
            escape_html(&self.listings_text())
        );
        let _ = write!(out, "<div class=\"skin-name\">{name}</div>");
        let _ = write!(
            out,
            "<div class=\"skin-price-row\"><span class=\"skin-price\">{}</span>\
             <span class=\"btn-buy\">View →</span></div>",
            escape_html(&self.price_text)
        );
        out.push_str("</div></a></div>");
        out
    }

    /// Terminal rendering: a title line, a price line, and the link when there is one.
    pub fn to_lines(&self) -> Vec<String> {
        let mut title = String::new();
        if self.icon_url.is_none() {
            title.push_str(PLACEHOLDER_GLYPH);
            title.push(' ');
        }
        if self.stattrak {
            title.push_str(STATTRAK_PREFIX);
            title.push(' ');
        }
        if let Some(tier) = self.wear {
            let _ = write!(title, "[{}] ", tier.label());
        }
        title.push_str(&self.base_name);

        let mut lines = vec![title, format!("    {} · {}", self.price_text, self.listings_text())];
        if let Some(url) = &self.market_url {
            lines.push(format!("    {url}"));
        }
        lines
    }
}

pub fn render_cards(listings: &[SkinListing]) -> Vec<SkinCard> {
    listings.iter().map(SkinCard::from_listing).collect()
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn howl() -> SkinListing {
        SkinListing {
            name: "StatTrak™ M4A4 | Howl (Factory New)".to_string(),
            price_text: "$4,210.00".to_string(),
            price: Some(4210.0),
            listings: Some(3),
            icon_url: Some("https://cdn.example/howl.png".to_string()),
            market_url: Some("https://market.example/howl".to_string()),
        }
    }

    #[test]
    fn full_listing_renders_every_part() {
        let card = SkinCard::from_listing(&howl());
        assert_eq!(card.base_name, "M4A4 | Howl");
        assert!(card.stattrak);
        assert_eq!(card.wear, Some(WearTier::FactoryNew));

        let html = card.to_html();
        assert!(html.contains("<div class=\"st-badge\">StatTrak™</div>"));
        assert!(html.contains("<img src=\"https://cdn.example/howl.png\" alt=\"M4A4 | Howl\""));
        assert!(html.contains("<span class=\"skin-wear-badge wear-fn\">FN</span>"));
        assert!(html.contains("3 listings"));
        assert!(html.contains("<div class=\"skin-name\">M4A4 | Howl</div>"));
        assert!(html.contains("<span class=\"skin-price\">$4,210.00</span>"));
        assert!(html.contains("href=\"https://market.example/howl\" target=\"_blank\""));
    }

    #[test]
    fn missing_icon_gets_placeholder_not_broken_image() {
        let listing = SkinListing {
            icon_url: None,
            ..howl()
        };
        let html = SkinCard::from_listing(&listing).to_html();
        assert!(html.contains("<div class=\"skin-img-placeholder\">◈</div>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn blank_icon_counts_as_missing() {
        let listing = SkinListing {
            icon_url: Some("  ".to_string()),
            ..howl()
        };
        assert!(SkinCard::from_listing(&listing).icon_url.is_none());
    }

    #[test]
    fn bare_name_degrades_gracefully() {
        let card = SkinCard::from_listing(&SkinListing::new("★ Sport Gloves | Vice"));
        let html = card.to_html();
        assert!(!html.contains("skin-wear-badge"));
        assert!(!html.contains("st-badge"));
        assert!(html.contains("<a href=\"#\" class=\"skin-link\">"));
        assert!(!html.contains("target=\"_blank\""));
        assert!(html.contains("? listings"));
        assert_eq!(card.href(), "#");
    }

    #[test]
    fn names_are_escaped() {
        let card = SkinCard::from_listing(&SkinListing::new("<b>Tag</b> & \"Co\""));
        let html = card.to_html();
        assert!(html.contains("&lt;b&gt;Tag&lt;/b&gt; &amp; &quot;Co&quot;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn terminal_lines() {
        let lines = SkinCard::from_listing(&howl()).to_lines();
        assert_eq!(lines[0], "StatTrak™ [FN] M4A4 | Howl");
        assert_eq!(lines[1], "    $4,210.00 · 3 listings");
        assert_eq!(lines[2], "    https://market.example/howl");

        let bare = SkinCard::from_listing(&SkinListing::new("AWP | Asiimov (Battle-Scarred)")).to_lines();
        assert_eq!(bare[0], "◈ [BS] AWP | Asiimov");
        assert_eq!(bare.len(), 2);
    }
}
