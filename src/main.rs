use std::process;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;
use vetrina::{
    application::{
        error::AppError,
        session::{ListCommand, ListSession, ListView},
    },
    cache::{CacheConfig, QueryCache},
    config,
    domain::records::{BlogRecord, CategoryRecord, DonorRecord, ListRecord, SponsorRecord},
    domain::types::Resource,
    infra::{api::ApiClient, telemetry},
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
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
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        Some(config::Command::List(args)) => run_list(settings, *args).await,
        None => Err(AppError::validation(
            "no command given; try `vetrina list <resource>`",
        )),
    }
}

async fn run_list(settings: config::Settings, args: config::ListArgs) -> Result<(), AppError> {
    let resource: Resource = args.resource.parse()?;

    match resource {
        Resource::Category => list_resource::<CategoryRecord>(&settings, &args, resource).await,
        Resource::Sponsor => list_resource::<SponsorRecord>(&settings, &args, resource).await,
        Resource::Blog => list_resource::<BlogRecord>(&settings, &args, resource).await,
        Resource::Donor => list_resource::<DonorRecord>(&settings, &args, resource).await,
    }
}

async fn list_resource<T>(
    settings: &config::Settings,
    args: &config::ListArgs,
    resource: Resource,
) -> Result<(), AppError>
where
    T: ListRecord + DeserializeOwned + Serialize,
{
    let client = Arc::new(ApiClient::new(&settings.api)?);
    let cache: QueryCache<T> = QueryCache::new(CacheConfig::from(&settings.list), client);
    let mut session = ListSession::new(
        resource,
        cache,
        settings.list.page_size.get(),
        settings.list.debounce,
    );

    info!(%resource, page = args.page, "Listing resource");

    session
        .submit_search(args.search.clone().unwrap_or_default())
        .await;
    if args.page > 1 {
        session.apply(ListCommand::GoToPage(args.page - 1)).await;
    }

    let view = session.view();
    if let Some(error) = &view.error {
        return Err(AppError::Fetch(error.clone()));
    }

    if args.json {
        print_json(&view.rows)?;
    } else {
        print_table(&session, &view);
    }
    Ok(())
}

fn print_json<T: Serialize>(rows: &[T]) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(rows)
        .map_err(|err| AppError::unexpected(format!("failed to render output: {err}")))?;
    println!("{out}");
    Ok(())
}

fn print_table<T: ListRecord>(session: &ListSession<T>, view: &ListView<T>) {
    if view.rows.is_empty() {
        println!("No {} found.", view.resource);
        return;
    }

    for (index, row) in view.rows.iter().enumerate() {
        println!("{:>5}  {:>6}  {}", session.row_number(index), row.id(), row.label());
    }

    println!(
        "Showing {} to {} of {} {} (page {} of {})",
        view.showing_from,
        view.showing_to,
        view.total,
        view.resource,
        view.current_page,
        view.total_pages
    );
}
