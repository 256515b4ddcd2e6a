//! `oooflow` command line: connect a Google account, provision the intake
//! form and tracking columns, and run the create/notify batch.

use clap::{Parser, Subcommand};

use oooflow::config;
use oooflow::error::WorkflowError;
use oooflow::google_api::{auth, token_store};
use oooflow::host::google::{GoogleCalendar, GoogleMailer, GoogleSheet};
use oooflow::process::ProcessContext;
use oooflow::setup;
use oooflow::workflow;

#[derive(Parser, Debug)]
#[command(
    name = "oooflow",
    version,
    about = "Out-of-office request automation for Google Workspace"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect a Google account (opens the browser consent flow)
    Auth,
    /// Show the configured sheet and connection state
    Status,
    /// Remove the stored Google credentials
    Disconnect,
    /// Create the intake form and save its id to the config
    SetupForm,
    /// Append the HR approval and event status columns to the sheet
    SetupColumns,
    /// Process pending rows: create events, send rejections, mark status
    Create,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli.command).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), WorkflowError> {
    match command {
        Commands::Auth => cmd_auth().await,
        Commands::Status => cmd_status(),
        Commands::Disconnect => cmd_disconnect(),
        Commands::SetupForm => cmd_setup_form().await,
        Commands::SetupColumns => cmd_setup_columns().await,
        Commands::Create => cmd_create().await,
    }
}

async fn cmd_auth() -> Result<(), WorkflowError> {
    let email = auth::run_consent_flow().await?;
    println!("Connected as {email}.");
    Ok(())
}

fn cmd_status() -> Result<(), WorkflowError> {
    match config::load_config() {
        Ok(config) => {
            println!("Spreadsheet:    {}", config.spreadsheet_id);
            println!("Sheet tab:      {}", config.sheet_name);
            println!("OOO calendar:   {}", config.ooo_calendar);
            match &config.form_id {
                Some(id) => println!("Intake form:    {id}"),
                None => println!("Intake form:    not created (run `oooflow setup-form`)"),
            }
        }
        Err(err) => println!("Config:         {err}"),
    }

    match token_store::peek_account_email() {
        Some(email) => println!("Google account: {email}"),
        None => println!("Google account: not connected (run `oooflow auth`)"),
    }
    Ok(())
}

fn cmd_disconnect() -> Result<(), WorkflowError> {
    token_store::delete_token()?;
    println!("Disconnected. Stored credentials removed.");
    Ok(())
}

async fn cmd_setup_form() -> Result<(), WorkflowError> {
    let mut config = config::load_config()?;
    let created = setup::setup_form(&mut config).await?;

    println!("Created intake form {}.", created.form_id);
    if !created.responder_uri.is_empty() {
        println!("Share link: {}", created.responder_uri);
    }
    println!();
    println!("Finish in the form editor (no API surface for these):");
    for (i, step) in setup::MANUAL_FORM_STEPS.iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }
    Ok(())
}

async fn cmd_setup_columns() -> Result<(), WorkflowError> {
    let config = config::load_config()?;
    let placements = setup::setup_columns(&config).await?;

    for placement in placements {
        println!(
            "Appended {:?} as column {}.",
            placement.header, placement.letter
        );
    }
    Ok(())
}

async fn cmd_create() -> Result<(), WorkflowError> {
    let config = config::load_config()?;
    let ctx = ProcessContext {
        ooo_calendar_id: config.ooo_calendar.clone(),
        rejection_contact: config.rejection_contact.clone(),
        today: chrono::Local::now().date_naive(),
    };

    let sheet = GoogleSheet::new(&config);
    let mailer = GoogleMailer;
    let calendar = GoogleCalendar;

    let summary = workflow::run_batch(&sheet, &mailer, &calendar, &ctx).await?;
    println!(
        "{} rows checked: {} processed, {} events created, {} rejection emails sent.",
        summary.rows_seen, summary.rows_processed, summary.events_created, summary.emails_sent
    );
    Ok(())
}
