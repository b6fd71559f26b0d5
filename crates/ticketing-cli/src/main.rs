//! Event ticketing command line client
//!
//! Walks a participant through registration against the ticketing backend
//! and gives organisers access to the admin API.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;
use ticketing_client::{ApiClient, ClientError, ClientResult, HttpSubmitter, PaymentQr, Session, Wizard};
use ticketing_core::context_error::{ContextError, Result, ResultExt};
use ticketing_core::models::{
    AdminRole, AdminUpdate, AuditLogQuery, NewAdmin, SettingsUpdate, StatusFilter,
};
use ticketing_core::policy::format_size;
use ticketing_core::validation::Field;
use ticketing_core::{Config, PaymentScreenshot, RegistrationDraft, RegistrationType, init_logging};
use tracing::{debug, info, warn};

/// Command line interface for the event ticketing platform
#[derive(Parser)]
#[command(
    name = "ticketing",
    version = env!("CARGO_PKG_VERSION"),
    about = "Register for events and manage registrations",
    long_about = "Command line client for the event ticketing platform. Registers participants through the same three steps as the web form and exposes the organiser dashboard API."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides configuration)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Log format: json or pretty (overrides configuration)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Register for the event
    Register(RegisterArgs),

    /// Check the review status of a registration
    Status {
        /// Email used to register
        #[arg(value_name = "EMAIL")]
        email: String,
    },

    /// Show payment details and the QR code source
    PaymentQr {
        /// Registration type (individual or bulk)
        #[arg(long = "type", default_value = "individual")]
        registration_type: RegistrationType,
    },

    /// Inspect configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Validate configuration
        #[arg(short, long)]
        validate: bool,
    },

    /// Log in as an organiser and print a bearer token
    Login {
        /// Admin email
        #[arg(long)]
        email: String,

        /// Admin password
        #[arg(long, env = "TICKETING_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Organiser dashboard commands
    Admin {
        /// Admin bearer token from `ticketing login`
        #[arg(long, env = "TICKETING_ADMIN_TOKEN", hide_env_values = true, global = true)]
        token: Option<String>,

        /// Admin subcommand
        #[command(subcommand)]
        action: AdminCommands,
    },
}

/// Registration details
#[derive(Args)]
struct RegisterArgs {
    /// Registration type (individual or bulk)
    #[arg(long = "type", default_value = "individual")]
    registration_type: RegistrationType,

    /// Full name (team leader for bulk registrations)
    #[arg(long)]
    name: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Phone number
    #[arg(long)]
    phone: String,

    /// Team name (bulk only)
    #[arg(long)]
    team_name: Option<String>,

    /// Comma-separated names of the four team members (bulk only)
    #[arg(long)]
    members: Option<String>,

    /// Payment screenshot (JPG, PNG or WebP)
    #[arg(long, value_name = "FILE")]
    screenshot: PathBuf,

    /// Validate and review without submitting
    #[arg(long)]
    dry_run: bool,
}

/// Admin dashboard commands
#[derive(Subcommand)]
enum AdminCommands {
    /// List registrations
    Registrations {
        /// Only show registrations with this status (pending, approved, rejected)
        #[arg(long)]
        status: Option<StatusFilter>,
    },

    /// Show one registration
    Registration {
        /// Registration id
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Show dashboard counters
    Stats,

    /// Page through the audit log
    AuditLogs {
        /// Maximum number of entries (1-500)
        #[arg(long, default_value = "100")]
        limit: u32,

        /// Entries to skip
        #[arg(long, default_value = "0")]
        offset: u32,

        /// Only entries with this action
        #[arg(long)]
        action: Option<String>,

        /// Only entries by this admin
        #[arg(long)]
        admin_id: Option<i64>,
    },

    /// Show audit log counters
    AuditStats,

    /// Check a ticket serial code
    VerifyTicket {
        /// Ticket serial code
        #[arg(value_name = "SERIAL")]
        serial: String,
    },

    /// Mark a ticket as used for entry
    MarkUsed {
        /// Ticket serial code
        #[arg(value_name = "SERIAL")]
        serial: String,
    },

    /// Show event settings, or change them when any option is given
    Settings(SettingsArgs),

    /// List admin accounts
    Admins,

    /// Create an admin account
    CreateAdmin {
        /// Login name
        #[arg(long)]
        username: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Initial password
        #[arg(long, env = "TICKETING_NEW_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Role (superadmin, staff, reviewer)
        #[arg(long, default_value = "reviewer")]
        role: AdminRole,
    },

    /// Show one admin account
    #[command(visible_alias = "show")]
    ShowAdmin {
        /// Admin account id
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Change an admin account
    UpdateAdmin(UpdateAdminArgs),

    /// Delete an admin account
    DeleteAdmin {
        /// Admin account id
        #[arg(value_name = "ID")]
        id: i64,
    },
}

/// Event settings to change
#[derive(Args, Default)]
struct SettingsArgs {
    /// Event name
    #[arg(long)]
    event_name: Option<String>,

    /// Event type
    #[arg(long)]
    event_type: Option<String>,

    /// Event date
    #[arg(long)]
    event_date: Option<String>,

    /// Event start time
    #[arg(long)]
    event_time: Option<String>,

    /// Venue label
    #[arg(long)]
    event_venue: Option<String>,

    /// Venue address
    #[arg(long)]
    event_location: Option<String>,

    /// Price of an individual registration
    #[arg(long)]
    individual_price: Option<f64>,

    /// Price of a bulk registration
    #[arg(long)]
    bulk_price: Option<f64>,

    /// Team size for bulk registrations
    #[arg(long)]
    bulk_team_size: Option<u32>,

    /// ISO currency code
    #[arg(long)]
    currency: Option<String>,

    /// UPI id receiving payments
    #[arg(long)]
    upi_id: Option<String>,

    /// Payment instructions shown to participants
    #[arg(long)]
    payment_instructions: Option<String>,

    /// Organizer name
    #[arg(long)]
    organization_name: Option<String>,

    /// Support contact
    #[arg(long)]
    support_email: Option<String>,

    /// Subject of approval emails
    #[arg(long)]
    approval_email_subject: Option<String>,

    /// Subject of rejection emails
    #[arg(long)]
    rejection_email_subject: Option<String>,
}

impl From<SettingsArgs> for SettingsUpdate {
    fn from(args: SettingsArgs) -> Self {
        Self {
            event_name: args.event_name,
            event_type: args.event_type,
            event_date: args.event_date,
            event_time: args.event_time,
            event_venue: args.event_venue,
            event_location: args.event_location,
            individual_price: args.individual_price,
            bulk_price: args.bulk_price,
            bulk_team_size: args.bulk_team_size,
            currency: args.currency,
            upi_id: args.upi_id,
            payment_instructions: args.payment_instructions,
            organization_name: args.organization_name,
            support_email: args.support_email,
            approval_email_subject: args.approval_email_subject,
            rejection_email_subject: args.rejection_email_subject,
        }
    }
}

/// Admin account changes
#[derive(Args)]
struct UpdateAdminArgs {
    /// Admin account id
    #[arg(value_name = "ID")]
    id: i64,

    /// New login name
    #[arg(long)]
    username: Option<String>,

    /// New email address
    #[arg(long)]
    email: Option<String>,

    /// New password
    #[arg(long)]
    password: Option<String>,

    /// New display name
    #[arg(long)]
    name: Option<String>,

    /// New role (superadmin, staff, reviewer)
    #[arg(long)]
    role: Option<AdminRole>,

    /// Allow the account to log in
    #[arg(long, conflicts_with = "deactivate")]
    activate: bool,

    /// Block the account from logging in
    #[arg(long)]
    deactivate: bool,
}

impl From<UpdateAdminArgs> for AdminUpdate {
    fn from(args: UpdateAdminArgs) -> Self {
        let is_active = match (args.activate, args.deactivate) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Self {
            username: args.username,
            email: args.email,
            password: args.password,
            name: args.name,
            role: args.role,
            is_active,
        }
    }
}

/// Main entry point
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Parse arguments, load configuration and run the selected command
///
/// # Errors
///
/// Returns error if configuration, logging or the selected command fails
async fn run() -> Result<()> {
    let env_file = dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load_from(cli.config.as_deref())?;
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    init_logging(level, format)?;

    if let Some(path) = env_file {
        debug!(path = %path.display(), "Loaded environment file");
    }
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "Ticketing client starting"
    );

    match cli.command {
        Commands::Register(args) => register(&config, args).await,
        Commands::Status { email } => show_registration_status(&config, &email).await,
        Commands::PaymentQr { registration_type } => {
            show_payment_details(&config, registration_type).await
        }
        Commands::Config { show, validate } => handle_config_command(&config, show, validate),
        Commands::Login { email, password } => login(&config, &email, &password).await,
        Commands::Admin { token, action } => {
            let client = api_client(&config)?;
            handle_admin_command(&client, token.as_deref(), action)
                .await
                .map_err(user_error)
        }
    }
}

/// Turn an error into the message shown to the user
fn user_error(err: impl Display) -> ContextError {
    ContextError::new(err.to_string())
}

fn api_client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(config.api.clone()).with_context(|| "Failed to create API client")
}

/// Run the three wizard steps and submit
///
/// # Errors
///
/// Returns the first validation failure, or the submission error
async fn register(config: &Config, args: RegisterArgs) -> Result<()> {
    let client = api_client(config)?;
    let wizard = Wizard::new(HttpSubmitter::new(client.clone()), config.upload.clone());
    let registration_type = args.registration_type;

    // Step 1: details
    wizard.select_type(registration_type).map_err(user_error)?;
    wizard.set_field(Field::Name, args.name).map_err(user_error)?;
    wizard.set_field(Field::Email, args.email).map_err(user_error)?;
    wizard.set_field(Field::Phone, args.phone).map_err(user_error)?;
    match registration_type {
        RegistrationType::Bulk => {
            wizard
                .set_field(Field::TeamName, args.team_name.unwrap_or_default())
                .map_err(user_error)?;
            wizard
                .set_field(Field::TeamMembers, args.members.unwrap_or_default())
                .map_err(user_error)?;
        }
        RegistrationType::Individual => {
            if args.team_name.is_some() || args.members.is_some() {
                warn!("Team details are ignored for individual registrations");
            }
        }
    }
    wizard.advance().map_err(user_error)?;

    // Step 2: payment
    print_payment_details(&client, config, registration_type).await;
    let screenshot = PaymentScreenshot::from_path(&args.screenshot)
        .with_context(|| format!("Failed to read {}", args.screenshot.display()))?;
    wizard.attach_screenshot(screenshot).map_err(user_error)?;
    wizard.advance().map_err(user_error)?;

    // Step 3: review
    print_review(&wizard.draft(), config);
    if args.dry_run {
        println!("\nDry run: registration not submitted");
        return Ok(());
    }

    let ack = wizard.submit().await.map_err(user_error)?;
    if let Some(notice) = wizard.notice() {
        println!("\n{}", notice.text);
    }
    if let Some(id) = ack.id {
        println!("Registration id: {id}");
    }
    info!(id = ?ack.id, "Registration complete");
    Ok(())
}

async fn print_payment_details(
    client: &ApiClient,
    config: &Config,
    registration_type: RegistrationType,
) {
    let amount = config.payment.amount_for(registration_type);
    println!("Payment ({registration_type} registration)");
    println!("  Amount:  {amount:.2} {}", config.payment.currency);
    println!("  UPI id:  {}", config.payment.upi_id);

    match client
        .resolve_payment_qr(registration_type, &config.payment)
        .await
    {
        PaymentQr::Asset(url) => println!("  QR code: {url}"),
        PaymentQr::Generated(uri) => println!("  UPI link: {uri}"),
    }
}

fn print_review(draft: &RegistrationDraft, config: &Config) {
    println!("\nReview");
    println!("  Name:   {}", draft.contact.name.trim());
    println!("  Email:  {}", draft.contact.email.trim());
    println!("  Phone:  {}", draft.contact.phone.trim());
    if let Some(registration_type) = draft.registration_type() {
        println!("  Type:   {registration_type}");
        println!(
            "  Amount: {:.2} {}",
            config.payment.amount_for(registration_type),
            config.payment.currency
        );
    }
    if let Some(team) = draft.team() {
        println!("  Team:   {}", team.team_name.trim());
        println!("  Members: {}", team.members_input.trim());
    }
    if let Some(screenshot) = &draft.payment_screenshot {
        println!(
            "  Screenshot: {} ({})",
            screenshot.file_name,
            format_size(screenshot.size())
        );
    }
}

async fn show_registration_status(config: &Config, email: &str) -> Result<()> {
    let status = api_client(config)?
        .registration_status(email)
        .await
        .map_err(user_error)?;

    println!("Registration #{}", status.id);
    println!("  Name:    {}", status.name);
    println!("  Email:   {}", status.email);
    println!("  Status:  {}", status.status);
    println!("  Created: {}", status.created_at);
    Ok(())
}

async fn show_payment_details(config: &Config, registration_type: RegistrationType) -> Result<()> {
    let client = api_client(config)?;
    print_payment_details(&client, config, registration_type).await;
    Ok(())
}

/// Handle configuration commands
///
/// # Errors
///
/// Returns error if configuration is invalid or cannot be serialized
fn handle_config_command(config: &Config, show: bool, validate: bool) -> Result<()> {
    if validate {
        config.validate()?;
        println!("Configuration is valid");
    }

    if show {
        let config_toml =
            toml::to_string_pretty(config).with_context(|| "Failed to serialize configuration")?;
        println!("{config_toml}");
    }

    Ok(())
}

/// Log in and print the token for `TICKETING_ADMIN_TOKEN`
///
/// # Errors
///
/// Returns the login failure shown to the admin
async fn login(config: &Config, email: &str, password: &str) -> Result<()> {
    let session = api_client(config)?
        .login(email, password)
        .await
        .map_err(user_error)?;

    if let Some(name) = &session.user().name {
        eprintln!("Logged in as {name}");
    }
    println!("{}", session.token());
    Ok(())
}

fn require_session(token: Option<&str>) -> ClientResult<Session> {
    token
        .filter(|token| !token.trim().is_empty())
        .map(|token| Session::from_token(token.trim()))
        .ok_or_else(|| {
            ClientError::validation(
                "No admin token. Run `ticketing login` and set TICKETING_ADMIN_TOKEN",
            )
        })
}

fn print_json<T: Serialize>(value: &T) -> ClientResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Handle admin commands
///
/// # Errors
///
/// Returns error if there is no session or the backend call fails
async fn handle_admin_command(
    client: &ApiClient,
    token: Option<&str>,
    action: AdminCommands,
) -> ClientResult<()> {
    let session = require_session(token)?;
    match action {
        AdminCommands::Registrations { status } => {
            let list = client.registrations(&session, status).await?;
            println!(
                "Total {} | pending {} | approved {} | rejected {}",
                list.total, list.pending, list.approved, list.rejected
            );
            for registration in &list.registrations {
                println!(
                    "{:>5}  {:<9} {:<24} {:<32} {}",
                    registration.id,
                    registration.status,
                    registration.name,
                    registration.email,
                    registration.team_name.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        AdminCommands::Registration { id } => print_json(&client.registration(&session, id).await?),
        AdminCommands::Stats => print_json(&client.stats(&session).await?),
        AdminCommands::AuditLogs {
            limit,
            offset,
            action,
            admin_id,
        } => {
            let query = AuditLogQuery {
                limit,
                offset,
                action,
                admin_id,
            };
            for entry in client.audit_logs(&session, &query).await? {
                println!(
                    "{}  {:<24} {:<20} {}",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.admin_name,
                    entry.action,
                    entry.details.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        AdminCommands::AuditStats => print_json(&client.audit_stats(&session).await?),
        AdminCommands::VerifyTicket { serial } => {
            let verification = client.verify_ticket(&session, &serial).await?;
            println!(
                "{}: {}",
                if verification.valid { "VALID" } else { "INVALID" },
                verification.message
            );
            if let Some(details) = &verification.details {
                print_json(details)?;
            }
            Ok(())
        }
        AdminCommands::MarkUsed { serial } => {
            let response = client.mark_ticket_used(&session, &serial).await?;
            println!("{}", response.message);
            Ok(())
        }
        AdminCommands::Settings(args) => {
            let update = SettingsUpdate::from(args);
            let settings = if update.is_empty() {
                client.settings(&session).await?
            } else {
                client.update_settings(&session, &update).await?
            };
            print_json(&settings)
        }
        AdminCommands::Admins => {
            for admin in client.admins(&session).await? {
                println!(
                    "{:>4}  {:<12} {:<16} {:<32} {}",
                    admin.id,
                    admin.role,
                    admin.username,
                    admin.email,
                    if admin.is_active { "active" } else { "inactive" }
                );
            }
            Ok(())
        }
        AdminCommands::CreateAdmin {
            username,
            email,
            password,
            name,
            role,
        } => {
            let admin = NewAdmin {
                username,
                email,
                password,
                name,
                role,
            };
            let created = client.create_admin(&session, &admin).await?;
            println!("Created admin #{} ({})", created.id, created.role);
            Ok(())
        }
        AdminCommands::ShowAdmin { id } => print_json(&client.admin(&session, id).await?),
        AdminCommands::UpdateAdmin(args) => {
            let id = args.id;
            let updated = client.update_admin(&session, id, &AdminUpdate::from(args)).await?;
            println!(
                "Updated admin #{} ({}, {})",
                updated.id,
                updated.role,
                if updated.is_active { "active" } else { "inactive" }
            );
            Ok(())
        }
        AdminCommands::DeleteAdmin { id } => {
            client.delete_admin(&session, id).await?;
            println!("Deleted admin #{id}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_register_arguments() {
        let cli = Cli::try_parse_from([
            "ticketing",
            "register",
            "--type",
            "bulk",
            "--name",
            "Jo",
            "--email",
            "jo@x.com",
            "--phone",
            "9876543210",
            "--team-name",
            "Tech Wizards",
            "--members",
            "Ann,Ben,Cat,Dan",
            "--screenshot",
            "pay.png",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Register(args) = cli.command else {
            panic!("expected register command");
        };
        assert_eq!(args.registration_type, RegistrationType::Bulk);
        assert_eq!(args.members.as_deref(), Some("Ann,Ben,Cat,Dan"));
        assert!(args.dry_run);
    }

    #[test]
    fn test_unknown_registration_type_is_rejected() {
        let result = Cli::try_parse_from(["ticketing", "payment-qr", "--type", "family"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_admin_status_filter_parses() {
        let cli = Cli::try_parse_from([
            "ticketing",
            "admin",
            "--token",
            "tok",
            "registrations",
            "--status",
            "pending",
        ])
        .unwrap();

        let Commands::Admin { token, action } = cli.command else {
            panic!("expected admin command");
        };
        assert_eq!(token.as_deref(), Some("tok"));
        assert!(matches!(
            action,
            AdminCommands::Registrations {
                status: Some(StatusFilter::Pending)
            }
        ));
    }

    #[test]
    fn test_settings_args_convert_to_update() {
        assert!(SettingsUpdate::from(SettingsArgs::default()).is_empty());

        let update = SettingsUpdate::from(SettingsArgs {
            upi_id: Some("events@upi".to_string()),
            ..SettingsArgs::default()
        });
        assert_eq!(update.upi_id.as_deref(), Some("events@upi"));
        assert!(!update.is_empty());
    }

    #[test]
    fn test_settings_args_cover_email_subjects() {
        let cli = Cli::try_parse_from([
            "ticketing",
            "admin",
            "settings",
            "--approval-email-subject",
            "You're in!",
            "--bulk-team-size",
            "5",
        ])
        .unwrap();

        let Commands::Admin {
            action: AdminCommands::Settings(args),
            ..
        } = cli.command
        else {
            panic!("expected admin settings command");
        };
        let update = SettingsUpdate::from(args);
        assert_eq!(update.approval_email_subject.as_deref(), Some("You're in!"));
        assert_eq!(update.bulk_team_size, Some(5));
        assert!(update.rejection_email_subject.is_none());
    }

    #[test]
    fn test_create_admin_defaults_to_reviewer() {
        let cli = Cli::try_parse_from([
            "ticketing",
            "admin",
            "create-admin",
            "--username",
            "gate1",
            "--email",
            "gate1@x.com",
            "--password",
            "secret123",
            "--name",
            "Gate One",
        ])
        .unwrap();

        let Commands::Admin {
            action: AdminCommands::CreateAdmin { role, .. },
            ..
        } = cli.command
        else {
            panic!("expected create-admin command");
        };
        assert_eq!(role, AdminRole::Reviewer);
    }

    #[test]
    fn test_update_admin_arguments() {
        let cli = Cli::try_parse_from([
            "ticketing",
            "admin",
            "update-admin",
            "5",
            "--role",
            "staff",
            "--deactivate",
        ])
        .unwrap();

        let Commands::Admin {
            action: AdminCommands::UpdateAdmin(args),
            ..
        } = cli.command
        else {
            panic!("expected update-admin command");
        };
        assert_eq!(args.id, 5);
        let update = AdminUpdate::from(args);
        assert_eq!(update.role, Some(AdminRole::Staff));
        assert_eq!(update.is_active, Some(false));
        assert!(update.password.is_none());

        let both = Cli::try_parse_from([
            "ticketing", "admin", "update-admin", "5", "--activate", "--deactivate",
        ]);
        assert!(both.is_err());

        let show = Cli::try_parse_from(["ticketing", "admin", "show", "5"]).unwrap();
        assert!(matches!(
            show.command,
            Commands::Admin {
                action: AdminCommands::ShowAdmin { id: 5 },
                ..
            }
        ));
    }

    #[test]
    fn test_missing_token_is_reported() {
        let err = require_session(None).unwrap_err();
        assert!(err.to_string().contains("ticketing login"));
        assert!(require_session(Some("  ")).is_err());
        assert_eq!(require_session(Some(" tok ")).unwrap().token(), "tok");
    }
}
