use std::{process, sync::Arc};

use folio::{
    application::{
        blog::BlogLoader,
        catalog::ContentCatalog,
        contact::{ContactService, EmailSender},
        error::AppError,
        session::SessionStore,
    },
    config::{self, CheckArgs, ContactTransport, ContentSettings},
    infra::{
        assets::FsAssetStore,
        content_files::{DirectoryBlogSource, TomlTableFile},
        error::InfraError,
        http::{self, HttpState},
        mail::{LogEmailSender, OutboxEmailSender},
        telemetry,
    },
    presentation::pages::PageRenderer,
};
use time::OffsetDateTime;
use tokio::sync::Notify;
use tracing::{Dispatch, Level, debug, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

const ASSET_ROUTE: &str = "/assets";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Check(args) => run_check(&settings, &args),
    }
}

fn load_catalog(content: &ContentSettings, strict: bool) -> Result<ContentCatalog, AppError> {
    let tables = TomlTableFile::new(&content.tables);
    let blog = DirectoryBlogSource::new(&content.blog_dir);
    let loader = BlogLoader::new(content.blog_asset_prefix.clone());

    let catalog = if strict {
        ContentCatalog::load(&tables, &blog, &loader)?
    } else {
        ContentCatalog::load_degraded(&tables, &blog, &loader)
    };

    debug!(
        target: "folio::content",
        load_date = %loader.load_date(),
        "undated posts use the load date"
    );
    for notice in catalog.notices() {
        warn!(target: "folio::content", notice = %notice, "content source unavailable");
    }

    Ok(catalog)
}

fn run_check(settings: &config::Settings, args: &CheckArgs) -> Result<(), AppError> {
    let catalog = load_catalog(&settings.content, true)?;

    for warning in catalog.warnings() {
        println!("warning: {}: {}", warning.origin, warning.message);
    }
    println!(
        "{} items loaded from {} and {}, {} warning(s)",
        catalog.len(),
        settings.content.tables.display(),
        settings.content.blog_dir.display(),
        catalog.warnings().len()
    );

    if args.deny_warnings && !catalog.warnings().is_empty() {
        return Err(AppError::DeniedWarnings(catalog.warnings().len()));
    }
    Ok(())
}

fn build_sender(settings: &config::ContactSettings) -> Arc<dyn EmailSender> {
    match settings.transport {
        ContactTransport::Log => Arc::new(LogEmailSender),
        ContactTransport::Outbox => {
            info!(
                target: "folio::contact",
                outbox = %settings.outbox_dir.display(),
                "contact messages will be written to the outbox"
            );
            Arc::new(OutboxEmailSender::new(&settings.outbox_dir))
        }
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let catalog = Arc::new(load_catalog(&settings.content, settings.content.strict)?);

    let footer_copy = format!(
        "© {} {}",
        OffsetDateTime::now_utc().year(),
        catalog.profile().name
    );
    let state = HttpState {
        catalog,
        sessions: Arc::new(SessionStore::new(settings.sessions.capacity.get())),
        contact: Arc::new(ContactService::new(
            build_sender(&settings.contact),
            settings.contact.timeout,
        )),
        pages: Arc::new(PageRenderer::new(ASSET_ROUTE, footer_copy)),
        assets: Arc::new(FsAssetStore::new(&settings.content.assets_dir)),
    };

    serve_http(&settings, state).await
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| InfraError::bind(settings.server.addr, err))?;
    info!(target: "folio::http", addr = %settings.server.addr, "listening");

    let shutdown = Arc::new(Notify::new());
    let trigger = Arc::clone(&shutdown);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move { trigger.notified().await })
            .await
    });

    tokio::select! {
        joined = &mut server => return flatten_server_result(joined),
        () = shutdown_signal() => {}
    }

    info!(target: "folio::http", "shutdown requested, draining connections");
    shutdown.notify_one();

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(joined) => flatten_server_result(joined),
        Err(_) => {
            warn!(
                target: "folio::http",
                timeout = ?settings.server.graceful_shutdown,
                "graceful shutdown timed out; aborting open connections"
            );
            server.abort();
            Ok(())
        }
    }
}

fn flatten_server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(InfraError::Serve(err).into()),
        Err(err) => Err(AppError::server(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target: "folio::http", error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
