mod cli;

use crate::cli::app::App;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use communityhub_portal::connection::{CollectionBackend, PortalConfig, Role, Session};
use communityhub_portal::controller::CrudListController;
use communityhub_portal::resources::{self, Screen};
use communityhub_portal::signup::{SignUpFlow, SignUpForm, SignUpOutcome};
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "communityhub", version, about = "CommunityHub resident and admin portal")]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    /// Use an in-process collection instead of the REST services
    #[arg(long, global = true)]
    offline: bool,

    #[command(flatten)]
    services: ServiceArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for values read from the environment.
#[derive(Debug, Args)]
struct ServiceArgs {
    #[arg(long, global = true)]
    user_service_url: Option<String>,

    #[arg(long, global = true)]
    maintenance_service_url: Option<String>,

    #[arg(long, global = true)]
    visitor_service_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

impl ServiceArgs {
    fn apply(&self, mut config: PortalConfig) -> PortalConfig {
        if let Some(url) = &self.user_service_url {
            config = config.user_service_url(url);
        }
        if let Some(url) = &self.maintenance_service_url {
            config = config.maintenance_service_url(url);
        }
        if let Some(url) = &self.visitor_service_url {
            config = config.visitor_service_url(url);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.request_timeout(Duration::from_secs(secs));
        }
        config
    }
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// Cookie header carrying `userId` and `userType`
    #[arg(long, global = true, env = "PORTAL_SESSION_COOKIE")]
    cookie: Option<String>,

    #[arg(long, global = true)]
    user_id: Option<String>,

    /// RESIDENT or ADMIN
    #[arg(long, global = true)]
    user_type: Option<String>,
}

impl SessionArgs {
    /// An explicit id/type pair wins over the cookie.
    fn resolve(&self) -> anyhow::Result<Option<Session>> {
        if let (Some(user_id), Some(user_type)) = (&self.user_id, &self.user_type) {
            let role: Role = user_type.parse()?;
            return Ok(Session::new(user_id.clone(), role));
        }
        Ok(self.cookie.as_deref().and_then(Session::from_cookie_header))
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Raise and withdraw your maintenance requests
    Maintenance,
    /// Review every maintenance request and update its status
    AdminMaintenance,
    /// Register and remove your visitors
    Visitors,
    /// Create an account
    SignUp(SignUpArgs),
}

#[derive(Debug, Args)]
struct SignUpArgs {
    #[arg(long)]
    new_user_id: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    mobile_number: String,
    #[arg(long)]
    present_address: String,
    /// RESIDENT or ADMIN
    #[arg(long = "role", default_value = "RESIDENT")]
    role: String,
    #[arg(long, default_value = "")]
    admin_code: String,
}

impl SignUpArgs {
    fn into_form(self) -> anyhow::Result<SignUpForm> {
        let mut form = SignUpForm::new(self.role.parse()?);
        form.user_id = self.new_user_id;
        form.first_name = self.first_name;
        form.last_name = self.last_name;
        form.username = self.username;
        form.password = self.password;
        form.mobile_number = self.mobile_number;
        form.present_address = self.present_address;
        form.admin_code = self.admin_code;
        Ok(form)
    }
}

/// Logs go to a file so they do not tear the terminal UI.
fn init_tracing() -> anyhow::Result<()> {
    let path = std::env::var("PORTAL_LOG_FILE").unwrap_or_else(|_| "communityhub.log".to_string());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("communityhub_portal=info,communityhub=info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = PortalConfig::from_env().context("invalid portal configuration")?;
    let config = cli.services.apply(config);
    config.validate().context("invalid portal configuration")?;
    init_tracing()?;

    let screen = match cli.command {
        Command::Maintenance => Screen::ResidentMaintenance,
        Command::AdminMaintenance => Screen::AdminMaintenance,
        Command::Visitors => Screen::Visitors,
        Command::SignUp(args) => return sign_up(&config, args).await,
    };

    let session = cli.session.resolve()?;
    let session = match resources::admit(screen, session.as_ref()) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{}", err);
            return Ok(ExitCode::FAILURE);
        }
    };
    info!(screen = %screen, offline = cli.offline, "opening screen");

    if cli.offline {
        let backend = cli::offline_backend(screen, &session).await;
        let controller = resources::mount(screen, backend, Some(&session))?;
        run_screen(screen, controller).await?;
    } else {
        let controller = resources::open_screen(&config, screen, Some(&session))
            .with_context(|| format!("failed to open {}", screen))?;
        run_screen(screen, controller).await?;
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_screen<B: CollectionBackend>(
    screen: Screen,
    controller: CrudListController<B>,
) -> anyhow::Result<()> {
    let mut app = App::new(screen, controller);
    app.run().await.context("terminal UI failed")
}

async fn sign_up(config: &PortalConfig, args: SignUpArgs) -> anyhow::Result<ExitCode> {
    let form = args.into_form()?;
    let flow = SignUpFlow::from_config(config)?;
    let outcome = flow.submit(&form).await;
    let notification = outcome.notification();

    match outcome {
        SignUpOutcome::Registered { session, redirect } => {
            println!("{}", notification.message);
            println!("Set-Cookie: {}", session.to_cookie_header());
            println!("Continue at {}", redirect);
            Ok(ExitCode::SUCCESS)
        }
        SignUpOutcome::Rejected(_) | SignUpOutcome::Failed(_) => {
            eprintln!("{}", notification.message);
            Ok(ExitCode::FAILURE)
        }
    }
}
