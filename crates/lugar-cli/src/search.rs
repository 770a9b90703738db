//! `search` command: one fetch cycle against the configured backend, then the
//! client-side filters, printed as a table or JSON.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use lugar_core::{AppConfig, Coordinates, DisplayBusinessEntity, DistanceBand};
use lugar_discovery::{
    apply_filters, format_distance, resolve_origin, BusinessSource, FetchController,
    FilterState, FixedLocation, HttpBusinessSource,
};

use crate::categories::load_styles;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text search over name, category and address
    #[arg(long, short)]
    pub query: Option<String>,
    /// Category label (repeatable; a business matches any of them)
    #[arg(long = "category", short)]
    pub categories: Vec<String>,
    /// Minimum rating, 0 to 5
    #[arg(long, default_value_t = 0.0)]
    pub min_rating: f64,
    /// Maximum distance in km, or "all"
    #[arg(long)]
    pub max_distance: Option<DistanceBand>,
    /// Price level as symbols, e.g. "$$" (repeatable)
    #[arg(long = "price")]
    pub prices: Vec<String>,
    /// Only businesses open right now
    #[arg(long)]
    pub open_now: bool,
    /// Required feature (repeatable; a business must have all of them)
    #[arg(long = "feature")]
    pub features: Vec<String>,
    /// Latitude to measure distances from (defaults to the configured city center)
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Longitude to measure distances from
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    /// The filter state described by the command-line flags.
    pub(crate) fn filter_state(&self) -> FilterState {
        let mut filters = FilterState::default();
        if let Some(query) = &self.query {
            filters.set_query(query.as_str());
        }
        filters.set_categories(self.categories.iter().map(String::as_str));
        filters.set_min_rating(self.min_rating);
        if let Some(band) = &self.max_distance {
            filters.set_max_distance(band.clone());
        }
        for price in &self.prices {
            filters.toggle_price_level(price);
        }
        filters.set_open_now(self.open_now);
        for feature in &self.features {
            filters.toggle_feature(feature);
        }
        filters
    }

    fn requested_origin(&self) -> Option<Coordinates> {
        self.lat.zip(self.lng).map(|(lat, lng)| Coordinates::new(lat, lng))
    }
}

/// Run one search and print the result.
///
/// # Errors
///
/// Returns an error if the category file or the HTTP client cannot be set
/// up, or if the backend request fails.
pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    let styles = Arc::new(load_styles(config.categories_path.as_deref())?);
    let filters = args.filter_state();

    let city_center = Coordinates::new(config.default_lat, config.default_lng);
    let provider = FixedLocation(args.requested_origin().unwrap_or(city_center));
    let origin = resolve_origin(&provider, city_center).await;

    let source: Arc<dyn BusinessSource> = Arc::new(
        HttpBusinessSource::new(
            &config.api_base_url,
            config.api_token.clone(),
            config.request_timeout_secs,
            &config.user_agent,
        )
        .context("failed to build business API client")?,
    );

    let controller = FetchController::new(source, Arc::clone(&styles), Duration::ZERO);
    controller.set_origin(Some(origin));
    let query = filters.server_query(&styles);
    tracing::info!(?query, "searching businesses");
    controller.trigger_now(query);

    let state = controller.settled().await;
    if let Some(message) = state.error {
        anyhow::bail!("search failed: {message}");
    }

    let visible = apply_filters(&state.data, &filters.criteria());
    tracing::info!(
        fetched = state.data.len(),
        visible = visible.len(),
        "search complete"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
    } else if visible.is_empty() {
        println!("no businesses match; try relaxing the filters");
    } else {
        print!("{}", render_table(&visible));
    }
    Ok(())
}

pub(crate) fn render_table(entities: &[DisplayBusinessEntity]) -> String {
    let mut out = format!(
        "{:<32}{:<16}{:<8}{:<10}{:<7}{:<6}\n",
        "NAME", "CATEGORY", "RATING", "DISTANCE", "PRICE", "OPEN"
    );
    for entity in entities {
        let name = if entity.is_verified {
            format!("{} \u{2713}", entity.name)
        } else {
            entity.name.clone()
        };
        let _ = writeln!(
            out,
            "{:<32}{:<16}{:<8.1}{:<10}{:<7}{:<6}",
            truncate(&name, 30),
            truncate(&entity.category, 14),
            entity.rating,
            format_distance(entity.distance_km),
            "\u{20ac}".repeat(usize::from(entity.price_tier)),
            if entity.is_open { "yes" } else { "no" },
        );
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars - 3).collect::<String>())
    } else {
        text.to_owned()
    }
}
