use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use institute_client::api::{
    AttendanceApi, BatchApi, CourseApi, EnrollmentApi, PaymentApi, ScheduleApi, WaitlistApi,
};
use institute_client::config::{ClientConfig, normalize_base_url};
use institute_client::policy::{EnrollmentPolicy, prerequisite_lines};
use institute_client::reconcile::CourseView;
use institute_client::services::{CatalogService, EnrollOutcome};
use institute_client::{AppError, ErrorKind, HttpApiClient, Session};

#[derive(Parser)]
#[command(name = "institute")]
#[command(about = "Command line client for the institute management API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base url (overrides INSTITUTE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log in before running the command
    #[arg(short, long, global = true, env = "INSTITUTE_USERNAME")]
    username: Option<String>,

    #[arg(short, long, global = true, env = "INSTITUTE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a prerequisite / schedule-conflict policy document
    Gate { file: PathBuf },

    #[command(flatten)]
    Remote(RemoteCommand),
}

/// Commands that talk to the backend.
#[derive(Subcommand)]
enum RemoteCommand {
    /// List the catalog with your enrollment state per course
    Courses {
        /// Filter by name or code
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one course and its batches
    Course { id: i64 },

    /// Enroll in the first batch of a course that has a free seat
    Enroll {
        course_id: i64,

        /// Join the waitlist when every batch is full
        #[arg(long)]
        waitlist: bool,
    },

    /// Mark one of your enrollments as completed
    Complete { enrollment_id: i64 },

    Enrollments,

    Waitlists,

    CancelWaitlist { id: i64 },

    /// Your waitlist position for a batch
    Position { batch_id: i64 },

    Payments,

    Schedules,

    Attendance,

    Dashboard,

    Whoami,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "institute_client=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let command = match &cli.command {
        Commands::Gate { file } => return run_gate(file),
        Commands::Remote(command) => command,
    };

    let mut config = ClientConfig::new_from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_url = normalize_base_url(url)?;
    }
    let config = config.with_timeout(cli.timeout.map(Duration::from_secs));

    let client = Arc::new(HttpApiClient::new(config)?);
    let session = open_session(&client, cli.username.as_deref(), cli.password.as_deref()).await?;
    let catalog = CatalogService::new(client.clone(), session);

    if let Err(e) = run(command, &client, &catalog).await {
        report(&e);
        std::process::exit(1);
    }

    Ok(())
}

async fn open_session(
    client: &HttpApiClient,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<Session, AppError> {
    let mut session = Session::new();

    match (username, password) {
        (Some(username), Some(password)) => {
            session.login(client, username, password).await?;
        }
        (Some(_), None) => {
            return Err(AppError::Config("--password is required with --username".to_string()));
        }
        _ if client.is_authenticated().await => {
            if let Err(e) = session.restore(client).await {
                warn!("stored token rejected: {}", e);
            }
        }
        _ => info!("running without a session"),
    }

    Ok(session)
}

async fn run(
    command: &RemoteCommand,
    client: &HttpApiClient,
    catalog: &CatalogService<HttpApiClient>,
) -> Result<(), AppError> {
    match command {
        RemoteCommand::Courses { search } => {
            let views = catalog.load().await?;
            let shown = CatalogService::<HttpApiClient>::search(&views, search.as_deref().unwrap_or(""));
            if shown.is_empty() {
                println!("No courses found");
            }
            for view in shown {
                print_view(view);
            }
        }
        RemoteCommand::Course { id } => {
            let course = client.get_course(*id).await?;
            println!("{} - {}", course.code, course.name);
            if let Some(description) = &course.description {
                println!("{description}");
            }
            if let (Some(weeks), Some(credits)) = (course.duration_weeks, course.credits) {
                println!("{weeks} weeks, {credits} credits");
            }
            for batch in client.get_batches(*id).await? {
                println!(
                    "  batch {} ({}): {} seats available",
                    batch.id,
                    batch.batch_number.as_deref().unwrap_or("-"),
                    batch.available_seats
                );
            }
        }
        RemoteCommand::Enroll { course_id, waitlist } => {
            let (outcome, views) = catalog.enroll(*course_id, *waitlist).await?;
            match outcome {
                EnrollOutcome::Enrolled(e) => {
                    println!("Successfully enrolled (enrollment {}, batch {})", e.id, e.batch)
                }
                EnrollOutcome::Waitlisted(w) => println!(
                    "No seats left; joined waitlist {} at position {}",
                    w.id,
                    w.position.map_or("?".to_string(), |p| p.to_string())
                ),
            }
            if let Some(view) = views.iter().find(|v| v.course.id == *course_id) {
                print_view(view);
            }
        }
        RemoteCommand::Complete { enrollment_id } => {
            catalog.complete(*enrollment_id).await?;
            println!("Enrollment {enrollment_id} marked completed");
        }
        RemoteCommand::Enrollments => {
            for e in client.get_enrollments().await? {
                println!(
                    "{:>6}  {:<10} {} {}",
                    e.id,
                    e.status,
                    e.course_code.as_deref().unwrap_or("-"),
                    e.course_name.as_deref().unwrap_or("")
                );
            }
        }
        RemoteCommand::Waitlists => {
            for w in client.get_waitlists().await? {
                println!(
                    "{:>6}  {:?}  {} - Batch {}  position {}",
                    w.id,
                    w.status,
                    w.course_code.as_deref().unwrap_or("-"),
                    w.batch_number.as_deref().unwrap_or("-"),
                    w.position.map_or("-".to_string(), |p| p.to_string())
                );
            }
        }
        RemoteCommand::CancelWaitlist { id } => {
            catalog.cancel_waitlist(*id).await?;
            println!("Waitlist entry cancelled successfully!");
        }
        RemoteCommand::Position { batch_id } => {
            let position = client.get_waitlist_position(*batch_id).await?;
            match position.position {
                Some(p) => println!(
                    "Position {} of {}",
                    p,
                    position.total_waiting.map_or("?".to_string(), |t| t.to_string())
                ),
                None => println!("Not on the waitlist for batch {batch_id}"),
            }
        }
        RemoteCommand::Payments => {
            for p in client.get_payments().await? {
                println!(
                    "{:>6}  {:?}  {}  {}",
                    p.id,
                    p.status,
                    p.amount.as_deref().unwrap_or("-"),
                    p.course_name.as_deref().unwrap_or("")
                );
            }
        }
        RemoteCommand::Schedules => {
            for s in client.get_schedules().await? {
                println!(
                    "{:<10} {}-{}  {}  {}",
                    s.day_display.or(s.day_of_week).unwrap_or_default(),
                    s.start_time.unwrap_or_default(),
                    s.end_time.unwrap_or_default(),
                    s.course_name.unwrap_or_default(),
                    s.room_number.unwrap_or_default()
                );
            }
        }
        RemoteCommand::Attendance => {
            for a in client.get_attendance().await? {
                println!(
                    "{}  {:?}  {}",
                    a.marked_date.unwrap_or_default(),
                    a.status,
                    a.course_name.unwrap_or_default()
                );
            }
        }
        RemoteCommand::Dashboard => {
            let summary = catalog.dashboard().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        RemoteCommand::Whoami => match catalog.session().user() {
            Some(user) => println!("{} ({:?})", user.display_name(), user.role),
            None => println!("Not logged in"),
        },
    }

    Ok(())
}

fn run_gate(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(file)?;
    let policy: EnrollmentPolicy = serde_json::from_str(&raw)?;

    for line in prerequisite_lines(&policy.prerequisites) {
        println!("{line}");
    }

    let gate = policy.gate();
    for banner in &gate.banners {
        println!("\n{banner}");
    }
    println!("Enroll: {}", if gate.allowed { "allowed" } else { "blocked" });
    Ok(())
}

fn print_view(view: &CourseView) {
    println!(
        "{:>5}  {:<10} {:<40} {:?}",
        view.course.id, view.course.code, view.course.name, view.state
    );
}

fn report(err: &AppError) {
    eprintln!("{}", err.message());
    match err.kind() {
        ErrorKind::NoAvailableBatch => {
            eprintln!("Every batch is full. Re-run with --waitlist to join the waitlist.")
        }
        ErrorKind::AlreadyEnrolled => eprintln!("Nothing to do: you are already enrolled."),
        ErrorKind::Unauthorized => {
            eprintln!("Log in with --username/--password or set INSTITUTE_ACCESS_TOKEN.")
        }
        _ => {}
    }
}
