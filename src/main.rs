use actix_cors::Cors;
use actix_web::{
    middleware::{self, Condition},
    web::Data,
    App, HttpServer,
};
use clap::Parser;
use database::{
    database::{database::Database, options::DatabaseOptions},
    persistence::transaction::{TransactionFileWriteMode, TransactionWriteMode},
};
use peopledb::{
    config::FileConfigProvider,
    notifier::{file::FileQueueTransport, Notifier},
    routes::{configure, AppState},
    service::{NotificationOrder, ValidationPolicy, WritePolicy},
};
use std::{io, sync::Arc};

/// 👥 PeopleDB, a CRUD HTTP API for person records with optional queue notification of every write
#[derive(Parser, Debug)]
struct Cli {
    /// Location of the database. Reads / writes to this directory. Note: Does not support shell paths, e.g. ~
    #[clap(short, long, default_value = "data")]
    data: std::path::PathBuf,

    /// Port the http server will run on
    #[clap(short, long, default_value = "5000")]
    port: u16,

    /// Address the http server will run on
    #[clap(short, long, default_value = "0.0.0.0")]
    address: String,

    /// Logs every http request
    #[clap(long)]
    log_http: bool,

    #[clap(long, default_value_t = 2)]
    http_workers: usize,

    /// Settings file, re-read on every write
    #[clap(short, long, default_value = "appsettings.json")]
    settings: std::path::PathBuf,

    /// Directory the message queues live in
    #[clap(long, default_value = "queues")]
    queue_directory: std::path::PathBuf,

    /// Also check email and phone formats on create / update
    #[clap(long)]
    validate_contact_fields: bool,

    /// Persist first and treat the notification as best effort
    #[clap(long)]
    notify_after_persist: bool,

    /// Let the OS decide when the transaction log reaches the disk
    #[clap(long)]
    no_sync: bool,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let write_mode = if args.no_sync {
        TransactionFileWriteMode::OSBuffered
    } else {
        TransactionFileWriteMode::Sync
    };

    let database_options = DatabaseOptions::default()
        .set_data_directory(args.data)
        .set_sync_file_write(TransactionWriteMode::File(write_mode));

    let request_manager = Database::new(database_options)
        .and_then(Database::run)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let policy = WritePolicy {
        validation: if args.validate_contact_fields {
            ValidationPolicy::Strict
        } else {
            ValidationPolicy::RequiredFieldsOnly
        },
        notification: if args.notify_after_persist {
            NotificationOrder::PersistThenNotify
        } else {
            NotificationOrder::NotifyThenPersist
        },
    };

    log::info!("Write policy: {:?}", policy);

    let state = Data::new(AppState {
        request_manager: request_manager.clone(),
        notifier: Arc::new(Notifier::new(Arc::new(FileQueueTransport::new(
            args.queue_directory,
        )))),
        config: Arc::new(FileConfigProvider::new(args.settings)),
        policy,
    });

    log::info!("starting HTTP server on {}:{}", args.address, args.port);

    let log_http = args.log_http;

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(configure)
            .wrap(Cors::permissive())
            .wrap(Condition::new(log_http, middleware::Logger::default()))
    })
    .workers(args.http_workers)
    .bind((args.address, args.port))?
    .run()
    .await?;

    // Server has stopped taking requests, flush the transaction log before exiting
    match request_manager.send_shutdown_request() {
        Ok(response) => log::info!("Shutting down server: {}", response),
        Err(e) => log::error!("Database did not shut down cleanly: {}", e),
    }

    Ok(())
}
