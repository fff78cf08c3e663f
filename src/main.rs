use std::{process, sync::Arc};

use mortar::{
    application::{
        admin::{
            accounts::AdminAccountService, audit::AdminAuditService, bulk::BulkDeleteService,
            gallery::AdminGalleryService, realty::AdminRealtyService,
        },
        auth::{self, AuthService},
        error::AppError,
        repos::{
            AccountsRepo, AuditRepo, ContactRepo, CreateAccountParams, GalleryRepo,
            GalleryWriteRepo, MediaStore, RealtyRepo, RealtyWriteRepo, RepoError, SessionsRepo,
        },
    },
    config,
    domain::types::Role,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState, RuntimeOptions},
        media::MediaStorage,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

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

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::CreateAdmin(args) => run_create_admin(settings, args).await,
    }
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<AppState, AppError> {
    let gallery_reader: Arc<dyn GalleryRepo> = repositories.clone();
    let gallery_writer: Arc<dyn GalleryWriteRepo> = repositories.clone();
    let realty_reader: Arc<dyn RealtyRepo> = repositories.clone();
    let realty_writer: Arc<dyn RealtyWriteRepo> = repositories.clone();
    let accounts_repo: Arc<dyn AccountsRepo> = repositories.clone();
    let sessions_repo: Arc<dyn SessionsRepo> = repositories.clone();
    let contact_repo: Arc<dyn ContactRepo> = repositories.clone();
    let audit_repo: Arc<dyn AuditRepo> = repositories.clone();

    let media = Arc::new(
        MediaStorage::new(settings.media.directory.clone())
            .map_err(|err| AppError::from(InfraError::Io(err)))?,
    );
    let media_store: Arc<dyn MediaStore> = media.clone();

    let audit = AdminAuditService::new(audit_repo.clone());
    let auth = Arc::new(AuthService::new(
        accounts_repo.clone(),
        sessions_repo,
        audit_repo,
        time_duration(settings.session.ttl),
    ));

    let gallery = AdminGalleryService::new(
        gallery_reader.clone(),
        gallery_writer,
        media_store.clone(),
        audit.clone(),
    );
    let realty = AdminRealtyService::new(
        realty_reader.clone(),
        realty_writer,
        media_store,
        audit.clone(),
    );
    let accounts = AdminAccountService::new(accounts_repo, audit.clone());
    let bulk = BulkDeleteService::new(gallery.clone(), realty.clone());

    let options = Arc::new(RuntimeOptions {
        media_public_base: settings.media.public_base.clone(),
        public_page_size: settings.pages.public_page_size.get() as usize,
        admin_page_size: settings.pages.admin_page_size.get() as usize,
        session_ttl: settings.session.ttl,
        session_resolve_timeout: settings.session.resolve_timeout,
        cookie_secure: settings.session.cookie_secure,
        upload_body_limit: settings.media.max_request_bytes.get() as usize,
    });

    Ok(AppState {
        auth,
        gallery,
        realty,
        accounts,
        bulk,
        audit,
        gallery_reader,
        realty_reader,
        contact: contact_repo,
        media,
        options,
    })
}

fn time_duration(duration: std::time::Duration) -> time::Duration {
    time::Duration::seconds(duration.as_secs() as i64)
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_state(repositories, &settings)?;
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "mortar::server",
        addr = %settings.server.addr,
        "serving"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}

async fn run_create_admin(
    settings: config::Settings,
    args: config::CreateAdminArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let accounts: Arc<dyn AccountsRepo> = repositories;

    let email = args.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("a valid --email is required"));
    }
    if args.password.len() < 6 {
        return Err(AppError::validation(
            "--password must be at least 6 characters",
        ));
    }

    let password_hash =
        auth::hash_password(&args.password).map_err(|err| AppError::unexpected(err.to_string()))?;

    match accounts
        .create_account(CreateAccountParams {
            email: email.clone(),
            name: args.name,
            password_hash,
            role: Role::Admin,
        })
        .await
    {
        Ok(account) => {
            info!(
                target = "mortar::create_admin",
                email = %account.email,
                id = %account.id,
                "administrator account created"
            );
            Ok(())
        }
        Err(RepoError::Duplicate { .. }) => Err(AppError::conflict(format!(
            "an account for {email} already exists"
        ))),
        Err(err) => Err(AppError::from(err)),
    }
}
