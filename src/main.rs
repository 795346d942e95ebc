//! Client Projet CLI - runs one API call against the project server.
//!
//! This is the main binary entry point. See the `clientprojet` library
//! for the communication layer itself.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use clientprojet::communication::{SlotOwner, Temporal};
use clientprojet::model::{MessageResource, ProjectStatus};
use clientprojet::{ApiClient, CommunicationBuilder, CommunicationResult, Config, ResponseData};
use mimalloc::MiMalloc;

/// Global allocator configured per M-MIMALLOC-APPS guideline.
/// mimalloc provides better multi-threaded performance than the system allocator.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "clientprojet")]
#[command(version)]
#[command(about = "Command-line access to the project-management API")]
struct Cli {
    /// Account name used to log in
    #[arg(long, env = "CLIENTPROJET_USERNAME")]
    username: String,
    /// Account password
    #[arg(long, env = "CLIENTPROJET_PASSWORD", hide_env_values = true)]
    password: String,
    /// Override the configured server URL
    #[arg(long)]
    server: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List your projects
    Projects,
    /// List the tasks of a project
    Tasks {
        #[arg(long)]
        project: i64,
    },
    /// Create a project
    CreateProject {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// YYYY-MM-DD or YYYY-MM-DD HH:MM[:SS]
        #[arg(long)]
        deadline: String,
        #[arg(long, default_value = "ON_GOING")]
        status: ProjectStatus,
    },
    /// List time slots between two dates (yours unless --resource is given)
    TimeSlots {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Non-human resource (room, equipment) to list instead
        #[arg(long)]
        resource: Option<i64>,
    },
    /// Book a time slot on a task
    AddTimeSlot {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        task: i64,
        #[arg(long, default_value_t = 0)]
        room: i64,
    },
    /// Read one page of messages
    Messages {
        /// project or user
        #[arg(long)]
        origin: MessageResource,
        #[arg(long)]
        id: i64,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Send a message to a project board or a user
    SendMessage {
        /// project or user
        #[arg(long)]
        destination: MessageResource,
        #[arg(long)]
        id: i64,
        content: String,
    },
    /// Show the logged-in user
    User,
    /// Show a human resource
    Resource {
        #[arg(long)]
        id: i64,
    },
    /// Check that the session token is accepted
    Check,
    /// Renew the session tokens
    Renew,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    let client = ApiClient::new(&config)?;
    log::debug!("Using server {}", client.server_url());

    let login = run(client.builder().connect(&cli.username, &cli.password));
    if !login.is_ok() {
        bail!("Login failed with status {}", login.status);
    }

    let result = match cli.command {
        Commands::Projects => run(client.builder().get_project_list()),
        Commands::Tasks { project } => run(client.builder().get_task_list(project)),
        Commands::CreateProject {
            name,
            description,
            deadline,
            status,
        } => run(client.builder().create_project(
            &name,
            &description,
            Temporal::parse(&deadline),
            status,
        )),
        Commands::TimeSlots { from, to, resource } => {
            let owner = match resource {
                Some(id) => SlotOwner::Other(id),
                None => SlotOwner::Human(current_user_id(&client)?),
            };
            run(client.builder().get_user_time_slot_list(
                Temporal::parse(&from),
                Temporal::parse(&to),
                owner,
            ))
        }
        Commands::AddTimeSlot {
            start,
            end,
            task,
            room,
        } => run(client.builder().add_time_slot(
            Temporal::parse(&start),
            Temporal::parse(&end),
            task,
            room,
        )),
        Commands::Messages { origin, id, page } => {
            run(client.builder().get_message_list(origin, id, page))
        }
        Commands::SendMessage {
            destination,
            id,
            content,
        } => run(client.builder().send_message(&content, destination, id)),
        Commands::User => run(client.builder().get_user_infos()),
        Commands::Resource { id } => run(client.builder().get_human_resource(id)),
        Commands::Check => run(client.builder().check_connection()),
        Commands::Renew => run(client.builder().update_connection()),
    };

    if !result.is_ok() {
        bail!("Request failed with status {}", result.status);
    }
    print_data(&result.data)
}

/// Builds and runs a communication on this thread.
fn run(builder: &mut CommunicationBuilder) -> CommunicationResult {
    builder.start_now().sleep_until_finished().build().result()
}

fn current_user_id(client: &ApiClient) -> Result<i64> {
    let result = run(client.builder().get_user_infos());
    result
        .user()
        .map(|user| user.id)
        .with_context(|| format!("Could not fetch the current user (status {})", result.status))
}

fn print_data(data: &ResponseData) -> Result<()> {
    let json = match data {
        ResponseData::None => return Ok(()),
        ResponseData::Tokens(tokens) => match tokens.expires_at {
            Some(expires_at) => serde_json::json!({ "renewed": true, "expiresAt": expires_at }),
            None => serde_json::json!({ "renewed": true }),
        },
        ResponseData::User(user) => serde_json::to_value(user)?,
        ResponseData::HumanResource(resource) => serde_json::to_value(resource)?,
        ResponseData::Projects(projects) => serde_json::to_value(projects)?,
        ResponseData::Tasks(tasks) => serde_json::to_value(tasks)?,
        ResponseData::TimeSlots(slots) => serde_json::to_value(slots)?,
        ResponseData::Messages(messages) => serde_json::to_value(messages)?,
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
