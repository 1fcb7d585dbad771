//! CLI command definitions and dispatch.

pub mod context;
pub mod dockerfile;
pub mod package;
pub mod plan;
pub mod workspace;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use dockpack_common::config::DockpackConfig;
use dockpack_common::constants::BUILD_FILE_NAME;

/// dockpack: Package build targets as Docker images.
#[derive(Parser, Debug)]
#[command(name = "dockpack", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Workspace root; source paths are relative to it.
    #[arg(long, global = true, env = "DOCKPACK_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    /// Build file, relative to the workspace root.
    #[arg(long, global = true, env = "DOCKPACK_BUILD_FILE", default_value = BUILD_FILE_NAME)]
    pub build_file: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, global = true, value_enum, env = "DOCKPACK_LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Settings overriding the build file.
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Command-line overrides of the build file's settings sections.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Source root to strip; repeat for several. Replaces the configured list.
    #[arg(long = "source-root", global = true, env = "DOCKPACK_SOURCE_ROOTS", value_delimiter = ',')]
    pub source_roots: Vec<String>,

    /// Pip constraints file, relative to the workspace.
    #[arg(long, global = true, env = "DOCKPACK_REQUIREMENT_CONSTRAINTS")]
    pub requirement_constraints: Option<String>,

    /// Package index; the first is primary. Replaces the configured list.
    #[arg(long = "index", global = true, env = "DOCKPACK_INDEXES", value_delimiter = ',')]
    pub indexes: Vec<String>,

    /// Install without any package index.
    #[arg(long, global = true, conflicts_with = "indexes")]
    pub no_index: bool,

    /// Extra `--find-links` location; repeat for several.
    #[arg(long = "find-links", global = true, env = "DOCKPACK_FIND_LINKS", value_delimiter = ',')]
    pub find_links: Vec<String>,

    /// Directory searched for docker; repeat for several, in order.
    #[arg(long = "docker-search-path", global = true, env = "DOCKPACK_DOCKER_SEARCH_PATHS", value_delimiter = ',')]
    pub docker_search_paths: Vec<PathBuf>,

    /// Output directory for contexts and archives.
    #[arg(long, global = true, env = "DOCKPACK_DIST_DIR")]
    pub dist_dir: Option<PathBuf>,

    /// Log docker's build output at info level.
    #[arg(long, global = true, env = "DOCKPACK_REPORT_PROGRESS")]
    pub report_progress: bool,
}

impl ConfigOverrides {
    /// Applies every override that was given.
    pub fn apply(&self, config: &mut DockpackConfig) {
        if !self.source_roots.is_empty() {
            config.source_roots.clone_from(&self.source_roots);
        }
        if let Some(constraints) = &self.requirement_constraints {
            config.python.requirement_constraints = Some(constraints.clone());
        }
        if self.no_index {
            config.python.indexes.clear();
        } else if !self.indexes.is_empty() {
            config.python.indexes.clone_from(&self.indexes);
        }
        if !self.find_links.is_empty() {
            config.python.find_links.clone_from(&self.find_links);
        }
        if !self.docker_search_paths.is_empty() {
            config.docker.search_paths.clone_from(&self.docker_search_paths);
        }
        if let Some(dist_dir) = &self.dist_dir {
            config.docker.dist_dir.clone_from(dist_dir);
        }
        if self.report_progress {
            config.docker.report_progress = true;
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the Docker image of a target.
    Package(package::PackageArgs),
    /// Print the Dockerfile of a target.
    Dockerfile(dockerfile::DockerfileArgs),
    /// Write the build context of a target as a .tar.gz archive.
    Context(context::ContextArgs),
    /// Show the dependency closure and what each node contributes.
    Plan(plan::PlanArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let workspace = workspace::Workspace::load(&cli.workspace, &cli.build_file, &cli.overrides)?;
    match cli.command {
        Command::Package(args) => package::execute(&workspace, args).await,
        Command::Dockerfile(args) => dockerfile::execute(&workspace, args).await,
        Command::Context(args) => context::execute(&workspace, args).await,
        Command::Plan(args) => plan::execute(&workspace, args).await,
    }
}
