use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskboard::config::{ClientConfig, ConfigOverrides};
use taskboard::logging::{self, LogFormat};
use taskboard_common::{LogType, NotificationType, Priority, TaskStatus};

mod cmd;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Command-line client for the taskboard API")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to taskboard.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, e.g. https://tasks.example.com/api. Overrides config and env.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Where the session tokens are stored. Overrides config and env.
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            session_file: self.session_file.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Password; prompted for when omitted
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage projects
    Projects {
        #[command(subcommand)]
        command: ProjectsCommands,
    },
    /// Manage tasks and task followers
    Tasks {
        #[command(subcommand)]
        command: TasksCommands,
    },
    /// Manage task comments
    Comments {
        #[command(subcommand)]
        command: CommentsCommands,
    },
    /// Read notifications and task history
    Notifications {
        #[command(subcommand)]
        command: NotificationsCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ProjectsCommands {
    /// List projects visible to you
    List {
        #[arg(short, long)]
        search: Option<String>,
        /// Only active (true) or archived (false) projects
        #[arg(long)]
        active: Option<bool>,
        /// Filter by manager user id
        #[arg(long)]
        manager: Option<i64>,
        /// Sort field, e.g. `-created_at`
        #[arg(long)]
        ordering: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one project
    Show { id: i64 },
    /// Create a project you manage
    Create {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Member user id (repeatable)
        #[arg(short, long = "member")]
        members: Vec<i64>,
    },
    /// Change a project
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        /// Replace the member list (repeatable)
        #[arg(long = "member")]
        members: Vec<i64>,
    },
    /// Delete a project
    Delete {
        id: i64,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Add a member to a project
    AddMember { project_id: i64, user_id: i64 },
    /// Remove a member from a project
    RemoveMember { project_id: i64, user_id: i64 },
    /// Projects you manage
    Mine,
    /// Projects you are a member of
    Member,
}

#[derive(Subcommand, Clone)]
pub enum TasksCommands {
    /// List tasks visible to you
    List {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        project: Option<i64>,
        #[arg(long)]
        assignee: Option<i64>,
        /// Only pinned tasks
        #[arg(long)]
        pinned: bool,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        ordering: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one task
    Show { id: i64 },
    /// Create a task
    Create {
        title: String,
        #[arg(short, long)]
        project: i64,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long)]
        assignee: Option<i64>,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Due date (RFC 3339), e.g. 2026-03-01T17:00:00Z
        #[arg(long)]
        due: Option<DateTime<Utc>>,
    },
    /// Change a task
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        assignee: Option<i64>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<DateTime<Utc>>,
    },
    /// Delete a task
    Delete {
        id: i64,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Tasks assigned to you
    Mine,
    /// Tasks you created
    Created,
    /// Open tasks past their due date
    Overdue,
    /// Pinned tasks
    Pinned,
    Pin { id: i64 },
    Unpin { id: i64 },
    /// Follow a task to be notified of its changes
    Follow { id: i64 },
    /// Stop following (takes the follower id shown by `followed`)
    Unfollow { follower_id: i64 },
    /// List follower records
    Followers {
        #[arg(long)]
        task: Option<i64>,
        #[arg(long)]
        user: Option<i64>,
    },
    /// Tasks you follow
    Followed,
}

#[derive(Subcommand, Clone)]
pub enum CommentsCommands {
    /// List comments
    List {
        #[arg(short, long)]
        task: Option<i64>,
        #[arg(long)]
        author: Option<i64>,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Comment on a task
    Add { task: i64, content: String },
    /// Replace a comment's text
    Edit { id: i64, content: String },
    /// Delete a comment
    Delete {
        id: i64,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum NotificationsCommands {
    /// List notifications
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
        #[arg(long = "type")]
        notification_type: Option<NotificationType>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Mark a notification read
    Read { id: i64 },
    /// Mark a notification unread
    Unread { id: i64 },
    /// Mark every notification read
    ReadAll,
    /// Number of unread notifications
    Count,
    /// Task change history
    Logs {
        #[arg(short, long)]
        task: Option<i64>,
        #[arg(long)]
        user: Option<i64>,
        #[arg(long = "type")]
        log_type: Option<LogType>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Poll for new notifications until interrupted
    Watch {
        /// Seconds between polls
        #[arg(short, long, default_value = "30")]
        interval: u64,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default taskboard.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; it only supplies environment defaults.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let overrides = cli.overrides();

    if let Commands::Config { command } = &cli.command {
        let _guard = logging::init(cli.verbose, LogFormat::Text, None)?;
        return cmd::cmd_config(cli.config.as_deref(), &overrides, command.clone());
    }

    let config = ClientConfig::load(cli.config.as_deref(), &overrides)?;
    let _guard = logging::init(cli.verbose, config.log_format, config.log_dir.as_deref())?;
    let client = cmd::build_client(&config)?;

    match &cli.command {
        Commands::Login { username, password } => {
            cmd::cmd_login(&client, username.clone(), password.clone()).await?
        }
        Commands::Register {
            username,
            email,
            first_name,
            last_name,
            password,
        } => {
            let data = cmd::prompt_registration(
                username.clone(),
                email.clone(),
                first_name.clone(),
                last_name.clone(),
                password.clone(),
            )?;
            cmd::cmd_register(&client, &data, cli.json).await?
        }
        Commands::Logout => cmd::cmd_logout(&client)?,
        Commands::Whoami => cmd::cmd_whoami(&client, cli.json).await?,
        Commands::Projects { command } => {
            cmd::cmd_projects(&client, command.clone(), cli.json).await?
        }
        Commands::Tasks { command } => cmd::cmd_tasks(&client, command.clone(), cli.json).await?,
        Commands::Comments { command } => {
            cmd::cmd_comments(&client, command.clone(), cli.json).await?
        }
        Commands::Notifications { command } => {
            cmd::cmd_notifications(&client, command.clone(), cli.json).await?
        }
        // Handled before the client is built.
        Commands::Config { .. } => {}
    }

    Ok(())
}
