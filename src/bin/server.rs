use std::{fs::OpenOptions, net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use tillbook::{
    AppState, BusinessTimezone, build_router, graceful_shutdown,
    report::{Locale, ReportConfig, SeriesRevenue},
};

/// The web server for the tillbook sales and finance reports.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone the business operates in, e.g. "America/Sao_Paulo".
    #[arg(long, default_value = "America/Sao_Paulo")]
    timezone: String,

    /// The language of month labels: "en" or "pt-BR".
    #[arg(long, default_value = "en")]
    locale: Locale,

    /// How many products to list in the top products ranking.
    #[arg(long, default_value_t = 5)]
    top_products: usize,

    /// The amount charts accumulate per sale: "record-total" or "payment-breakdown".
    #[arg(long, default_value = "record-total")]
    series_revenue: SeriesRevenue,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let timezone =
        BusinessTimezone::from_name(&args.timezone).expect("Could not find the timezone");
    let report_config = ReportConfig {
        timezone,
        locale: args.locale,
        top_products: args.top_products,
        series_revenue: args.series_revenue,
    };
    tracing::info!(
        "Reporting in {} with locale {} and the {} series rule",
        timezone.name(),
        report_config.locale.tag(),
        report_config.series_revenue.as_str()
    );

    let conn = Connection::open(&args.db_path).expect("Could not open the database");
    let app_state = AppState::new(conn, report_config).expect("Could not initialize the database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    // RUST_LOG overrides the file log level, e.g. RUST_LOG=tillbook=trace.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(env_filter),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Handlers log their own errors.
        .on_failure(());

    router.layer(tracing_layer)
}
