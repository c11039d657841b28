use std::{process, sync::Arc};

use quire::{
    application::{
        error::{AppError, ErrorReport},
        page::ArticlePageService,
        render::{
            RenderPipelineConfig, RenderRequest, RenderService, configure_render_service,
            render_service,
        },
    },
    config::{self, ArticleArgs, Command, OutputFormat, RenderFileArgs, Settings, TocArgs},
    domain::categories::CategoryMap,
    infra::{
        error::InfraError,
        store::{self, FsContentStore},
        telemetry,
    },
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

const SOURCE: &str = "quire::cli";

fn report_application_error(error: &AppError) {
    let report = ErrorReport::from_error(SOURCE, error);
    let log = || {
        error!(
            target = report.source,
            error = %error,
            chain = ?report.messages,
            "application error"
        );
    };

    if dispatcher::has_been_set() {
        log();
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, log);
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(|err| {
        InfraError::configuration(format!("failed to load configuration: {err}"))
    })?;

    telemetry::init(&settings.logging)?;
    configure_render_service(RenderPipelineConfig::from(&settings.render))?;

    match cli_args.command {
        Command::Render(args) => run_render(&settings, args).await,
        Command::Toc(args) => run_toc(&settings, args).await,
        Command::RenderFile(args) => run_render_file(args).await,
    }
}

fn page_service(settings: &Settings) -> ArticlePageService {
    let store = FsContentStore::new(settings.store.root.clone());
    info!(
        target = SOURCE,
        root = %store.root().display(),
        "using filesystem content store"
    );
    ArticlePageService::new(Arc::new(store), render_service())
}

async fn run_render(settings: &Settings, args: ArticleArgs) -> Result<(), AppError> {
    let page = page_service(settings)
        .article_page(&args.category, &args.article)
        .await?;
    emit(args.format, &page, || page.html())
}

async fn run_toc(settings: &Settings, args: TocArgs) -> Result<(), AppError> {
    let toc = page_service(settings)
        .table_of_contents(&args.category, &args.article)
        .await?;
    emit(OutputFormat::Json, &toc.nested(), String::new)
}

async fn run_render_file(args: RenderFileArgs) -> Result<(), AppError> {
    let document = store::load_document(&args.file).await?;
    let categories = match args.categories.as_deref() {
        Some(path) => store::load_categories(path).await?,
        None => CategoryMap::new(),
    };

    let output = render_service().render(&RenderRequest::new(&document, &categories));
    emit(args.format, &output, || output.html())
}

fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    html: impl FnOnce() -> String,
) -> Result<(), AppError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|err| AppError::unexpected(format!("failed to serialise output: {err}")))?,
        OutputFormat::Html => html(),
    };
    println!("{rendered}");
    Ok(())
}
