use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use super::logging::LogDestination;

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(author, version, about = "Portfolio content browser and admin tools")]
pub struct Cli {
    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::File, global = true)]
    pub log: LogTarget,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a content collection
    Browse(BrowseArgs),
    /// Download the most recent CV
    Cv {
        /// Directory the file is saved into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Check a contact message before sending it
    Contact(ContactArgs),
    /// Show backend configuration
    EnvCheck,
    /// Content management (requires an account)
    Admin(AdminArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CollectionArg {
    Projects,
    Experience,
}

#[derive(Args)]
pub struct BrowseArgs {
    #[arg(value_enum)]
    pub collection: CollectionArg,

    /// Only show one category ("all" shows everything)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Case-insensitive search over title, description and tags
    #[arg(short, long)]
    pub query: Option<String>,

    /// Directory holding collection snapshots
    #[arg(long, default_value = ".portfolio_cache")]
    pub cache_dir: PathBuf,

    /// Keep snapshots in memory only, for this run
    #[arg(long, conflicts_with = "cache_dir")]
    pub session_cache: bool,

    /// Read filter changes from stdin until `:q`
    #[arg(short, long)]
    pub interactive: bool,
}

#[derive(Args)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub subject: String,
    #[arg(long)]
    pub message: String,
}

#[derive(Args)]
pub struct AdminArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    /// Account password; read from PORTFOLIO_ADMIN_PASSWORD when omitted
    #[arg(short, long)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub action: AdminAction,
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// Create the account instead of signing in
    SignUp,
    /// Show the signed-in user
    Whoami,
    /// Add a project
    AddProject {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        category: String,
        /// Comma-separated technologies
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        demo_url: Option<String>,
        #[arg(long)]
        repo_url: Option<String>,
    },
    /// Remove a project by id
    DeleteProject { id: String },
    /// Add an experience entry
    AddExperience {
        #[arg(long)]
        company: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        duration: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Comma-separated skills
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
    },
    /// Remove an experience entry by id
    DeleteExperience { id: String },
    /// List uploaded CVs and certificates
    Documents,
    /// Upload a CV or certificate and record it
    Upload {
        #[arg(value_enum)]
        kind: KindArg,
        file: PathBuf,
        /// Display title; defaults to the file name
        #[arg(long)]
        title: Option<String>,
    },
    /// Remove a document row by id
    DeleteDocument { id: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Cv,
    Certificate,
}

impl From<KindArg> for portfolio_core::DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Cv => portfolio_core::DocumentKind::Cv,
            KindArg::Certificate => portfolio_core::DocumentKind::Certificate,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn browse_parses_filters() {
        let cli = Cli::try_parse_from([
            "portfolio", "browse", "projects", "--category", "ai", "--query", "python",
        ])
        .unwrap();
        match cli.command {
            Commands::Browse(args) => {
                assert_eq!(args.collection, CollectionArg::Projects);
                assert_eq!(args.category.as_deref(), Some("ai"));
                assert_eq!(args.query.as_deref(), Some("python"));
                assert!(!args.session_cache);
            }
            _ => panic!("expected browse"),
        }
    }

    #[test]
    fn tags_split_on_commas() {
        let cli = Cli::try_parse_from([
            "portfolio", "admin", "-e", "me@example.com", "add-project", "--title", "Router",
            "--category", "network", "--tags", "Rust,Tokio",
        ])
        .unwrap();
        match cli.command {
            Commands::Admin(AdminArgs {
                action: AdminAction::AddProject { tags, .. },
                ..
            }) => assert_eq!(tags, vec!["Rust".to_string(), "Tokio".to_string()]),
            _ => panic!("expected add-project"),
        }
    }

    #[test]
    fn add_experience_takes_skills_and_no_category() {
        let cli = Cli::try_parse_from([
            "portfolio", "admin", "-e", "me@example.com", "add-experience", "--company", "Acme",
            "--position", "Engineer", "--duration", "2020 - 2021", "--skills", "BGP,OSPF",
        ])
        .unwrap();
        match cli.command {
            Commands::Admin(AdminArgs {
                action: AdminAction::AddExperience { skills, .. },
                ..
            }) => assert_eq!(skills, vec!["BGP".to_string(), "OSPF".to_string()]),
            _ => panic!("expected add-experience"),
        }

        assert!(Cli::try_parse_from([
            "portfolio", "admin", "-e", "me@example.com", "add-experience", "--company", "Acme",
            "--position", "Engineer", "--duration", "2020", "--category", "network",
        ])
        .is_err());
    }
}
