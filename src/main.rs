use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use waste_report::{
    config::AppConfig,
    models::report::{Coordinates, ReportType},
    screen::ReportScreen,
    services::{
        api::{ReportApi, ReportApiClient},
        gate::{assess, prompt_for, GateState},
        jwt::is_jwt_expired,
        location::{FixedPosition, NominatimGeocoder},
        photo::{normalize_photo, FilePhotoSource, PhotoSource},
        submission::SubmissionOutcome,
    },
    ui::{terminal::TerminalUi, ScreenUi},
};

#[derive(Parser, Debug)]
#[command(name = "waste-report")]
#[command(about = "Report a waste issue with an AI-verified photo")]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill in a report and submit it
    Submit {
        /// Evidence photo
        #[arg(long)]
        photo: PathBuf,
        /// Complaint title (max 100 characters)
        #[arg(long)]
        title: String,
        /// Issue details (max 500 characters)
        #[arg(long)]
        details: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,
        /// standard, hazardous or large
        #[arg(long, default_value = "standard")]
        report_type: ReportType,
    },
    /// Run the waste classifier on a photo without submitting
    Classify {
        #[arg(long)]
        photo: PathBuf,
    },
    /// Check whether the configured auth token has expired
    TokenStatus,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so prompts on stdout stay readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");

    metrics::describe_counter!(
        "report_submissions_total",
        "Total report submissions sent to the API"
    );
    metrics::describe_counter!(
        "report_submissions_failed",
        "Total report submissions that failed"
    );
    metrics::describe_counter!(
        "classification_requests_total",
        "Total waste classification requests"
    );
    metrics::describe_histogram!(
        "report_submission_seconds",
        "Time to send a report and interpret the response"
    );

    let code = match args.cmd {
        Command::TokenStatus => token_status(&config),
        Command::Classify { photo } => classify(&config, photo).await,
        Command::Submit {
            photo,
            title,
            details,
            lat,
            lon,
            report_type,
        } => {
            let position = match (lat, lon) {
                (Some(latitude), Some(longitude)) => Some(Coordinates {
                    latitude,
                    longitude,
                }),
                _ => None,
            };
            submit(&config, photo, &title, &details, position, report_type).await
        }
    };

    // One run per process, so the snapshot is logged instead of scraped
    tracing::debug!(metrics = %prometheus_handle.render(), "Session metrics");

    code
}

fn token_status(config: &AppConfig) -> ExitCode {
    if is_jwt_expired(&config.auth_token) {
        println!("Auth token is expired or invalid.");
        ExitCode::FAILURE
    } else {
        println!("Auth token is valid.");
        ExitCode::SUCCESS
    }
}

async fn classify(config: &AppConfig, photo: PathBuf) -> ExitCode {
    let api = ReportApiClient::new(&config.api_url, &config.auth_token, config.http_timeout())
        .expect("Failed to initialize report API client");

    let captured = match FilePhotoSource::new(photo).capture().await {
        Ok(Some(captured)) => captured,
        Ok(None) => return ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let encoded = match normalize_photo(&captured) {
        Ok(encoded) => encoded,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = api.classify(&encoded.base64).await;
    let state = assess(&outcome);
    match &outcome {
        Ok(result) => println!(
            "{} ({}) waste={} verified={}",
            result.label,
            result.confidence_percent(),
            result.is_waste,
            result.is_verified_waste
        ),
        Err(e) => println!("{}", e),
    }
    match prompt_for(state, outcome.as_ref().ok()) {
        Some(prompt) => println!("Gate: {} - {}", prompt.title, prompt.message),
        None => println!("Gate: {}", state),
    }

    if state == GateState::VerifiedHigh {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn submit(
    config: &AppConfig,
    photo: PathBuf,
    title: &str,
    details: &str,
    position: Option<Coordinates>,
    report_type: ReportType,
) -> ExitCode {
    let ui = TerminalUi;

    if is_jwt_expired(&config.auth_token) {
        tracing::warn!("Auth token expired, refusing to submit");
        ui.alert("Session Expired", "Please sign in again before reporting.")
            .await;
        return ExitCode::FAILURE;
    }

    let api = ReportApiClient::new(&config.api_url, &config.auth_token, config.http_timeout())
        .expect("Failed to initialize report API client");
    let geocoder = NominatimGeocoder::new(&config.geocoder_url, config.http_timeout())
        .expect("Failed to initialize geocoder");
    let geolocator = FixedPosition(position);
    let camera = FilePhotoSource::new(photo);

    let mut screen = ReportScreen::new(api, ui, config.ack_delay(), config.location_timeout());
    screen.initialize(&geolocator, &camera).await;

    screen.set_title(title);
    screen.set_details(details);
    screen.set_report_type(report_type);

    // Failures are alerted by the screen; validation lists whatever is missing
    let _ = screen.capture_location(&geolocator, &geocoder).await;
    let _ = screen.take_photo(&camera).await;

    match screen.submit().await {
        Ok(SubmissionOutcome::Submitted { .. }) => ExitCode::SUCCESS,
        Ok(SubmissionOutcome::Declined) => ExitCode::from(2),
        Err(_) => ExitCode::FAILURE,
    }
}
