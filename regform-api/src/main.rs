use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use shared_types::FormField;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

use regform_api::config::{AppConfig, ExportTarget};
use regform_api::export::{photo, select_writer, DownloadStore, PdfExporter};
use regform_api::form::SubmitOutcome;
use regform_api::handlers;
use regform_api::integrations::ViaCepClient;
use regform_api::jobs::ConnectivityMonitor;
use regform_api::FormController;

#[get("/health")]
async fn health(monitor: web::Data<Arc<ConnectivityMonitor>>) -> impl Responder {
    let network = monitor.status();
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "network": if network.is_online { "online" } else { "offline" }
    }))
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, global = true)]
    log_file_path: Option<String>,

    /// Config file to use instead of the per-user default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Fill in one form from the command line and export it
    Fill(FillArgs),
}

#[derive(ClapArgs, Debug)]
struct FillArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    postal_code: Option<String>,
    #[arg(long)]
    address: Option<String>,
    /// JPEG or PNG image to embed as the profile photo
    #[arg(long)]
    photo: Option<PathBuf>,
    /// Fill the address from the postal code before exporting
    #[arg(long)]
    lookup: bool,
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn init_tracing(log_file_path: Option<&str>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = log_file_path {
        let log_path = std::path::Path::new(log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("regform-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

fn build_controller(
    config: &AppConfig,
) -> anyhow::Result<(Arc<FormController>, Option<Arc<DownloadStore>>)> {
    let selected = select_writer(&config.export).context("Failed to prepare export target")?;
    let exporter = Arc::new(PdfExporter::new(
        selected.writer,
        &config.export.timestamp_format,
    ));
    let directory = Arc::new(ViaCepClient::new(&config.lookup.base_url));

    Ok((
        Arc::new(FormController::new(directory, exporter)),
        selected.downloads,
    ))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.log_file_path.as_deref());

    let (config, config_path) = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("Failed to load config")?;
    tracing::info!("Using config at {}", config_path.display());

    match args.command {
        Some(Command::Fill(fill_args)) => fill(config, fill_args).await,
        Some(Command::Serve) | None => serve(config).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let (controller, downloads) = build_controller(&config)?;

    let monitor = Arc::new(
        ConnectivityMonitor::new(&config.connectivity)
            .context("Failed to build connectivity probe client")?,
    );
    let _probe_task = monitor.clone().spawn();

    let host = config.server.host.clone();
    let port = config.server.port;
    tracing::info!("Server will listen on {}:{}", host, port);
    println!("Starting server on {}:{}", host, port);

    let monitor_for_server = monitor.clone();
    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if let Some(cors_config) = &config.cors {
            let mut cors_builder = Cors::default();
            for origin in &cors_config.allowed_origins {
                cors_builder = cors_builder.allowed_origin(origin);
            }
            cors_builder
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec!["Accept", "Content-Type"])
                .max_age(3600)
        } else {
            Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec!["Accept", "Content-Type"])
                .max_age(3600)
        };

        let mut app = App::new()
            .wrap(cors)
            .app_data(web::Data::new(controller.clone()))
            .app_data(web::Data::new(monitor_for_server.clone()));
        if let Some(store) = &downloads {
            app = app.app_data(web::Data::new(store.clone()));
        }

        app.service(health)
            .route("/api/form", web::get().to(handlers::form::get_form))
            .route("/api/form/fields/{field}", web::put().to(handlers::form::update_field))
            .route("/api/form/photo", web::put().to(handlers::form::set_photo))
            .route("/api/form/photo", web::delete().to(handlers::form::remove_photo))
            .route("/api/form/lookup", web::post().to(handlers::form::lookup_postal_code))
            .route("/api/form/submit", web::post().to(handlers::form::submit_form))
            .route("/api/exports/{file_name}", web::get().to(handlers::exports::download_export))
            .route("/api/network", web::get().to(handlers::network::get_network_status))
            .route("/api/network/feature", web::get().to(handlers::network::get_feature_availability))
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("Failed to bind {}:{}", host, port))?
    .run();

    let handle = server.handle();
    let shutdown_monitor = monitor.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        tracing::info!("Ctrl+C received, shutting down...");
        shutdown_monitor.shutdown();

        handle.stop(true).await;
    });

    server.await.context("Server terminated with an error")
}

fn photo_mime_type(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        _ => "image/jpeg",
    }
}

async fn fill(mut config: AppConfig, args: FillArgs) -> anyhow::Result<()> {
    if config.export.target == ExportTarget::Browser {
        tracing::warn!("Browser export target has no client in fill mode, writing to downloads");
        config.export.target = ExportTarget::Downloads;
    }
    if let Some(output_dir) = args.output_dir {
        config.export.output_dir = Some(output_dir);
    }

    let (controller, _) = build_controller(&config)?;

    controller.apply_edit(FormField::Name, &args.name);
    controller.apply_edit(FormField::Email, &args.email);
    controller.apply_edit(FormField::Phone, &args.phone);
    if let Some(postal_code) = &args.postal_code {
        controller.apply_edit(FormField::PostalCode, postal_code);
    }
    if let Some(address) = &args.address {
        controller.apply_edit(FormField::Address, address);
    }

    if let Some(photo_path) = &args.photo {
        let bytes = tokio::fs::read(photo_path)
            .await
            .with_context(|| format!("Failed to read photo {}", photo_path.display()))?;
        let data_uri = photo::encode_data_uri(photo_mime_type(photo_path), &bytes);
        println!("{}", controller.set_photo(&data_uri).message);
    }

    if args.lookup {
        let outcome = controller.lookup_postal_code().await;
        println!("{}", outcome.notice().message);
    }

    let outcome = controller.submit().await;
    let notice = outcome.notice();
    match outcome {
        SubmitOutcome::Exported(receipt) => {
            println!("{}", notice.message);
            if let Some(path) = receipt.path {
                println!("{}", path);
            }
            Ok(())
        }
        _ => anyhow::bail!(notice.message),
    }
}
