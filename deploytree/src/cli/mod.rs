//! The `kubectl-deploytree` command line.
//!
//! Installed on the `PATH`, the binary also works as a kubectl plugin.
//!
//! # Examples
//!
//! ```bash
//! # Show what the `web` deployment in the `default` namespace uses
//! kubectl deploytree -d web
//!
//! # Same, for a deployment in another namespace, as JSON
//! kubectl deploytree -d api -n backend -o json
//!
//! # Use a specific kubeconfig and context
//! kubectl deploytree -d web --kubeconfig ~/.kube/staging --context staging
//! ```

pub mod error;
mod tree;

use std::{io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use deploytree_base::CLI_PROGRAM_NAME;
use snafu::ResultExt;
use tokio::runtime::Runtime;

pub use self::error::Error;
use self::tree::TreeCommand;
use crate::{
    config::Config,
    provider::{self, KubeProvider},
    shadow,
};

/// Exit code for invalid invocations, e.g. a missing `--deployment`.
const EXIT_CODE_USAGE: i32 = 2;

#[derive(Parser)]
#[command(
    name = CLI_PROGRAM_NAME,
    author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about = "Show the resources a Kubernetes Deployment is associated with as a tree.",
    long_about = "Resolves the Service, the ReplicaSet and the ConfigMaps, Secrets and \
                  Volumes referenced by the pod template of a Kubernetes Deployment, and \
                  prints them as a tree rooted at the Deployment name.",
)]
pub struct Cli {
    /// The subcommand to execute. Without one, the deployment is resolved.
    #[clap(subcommand)]
    commands: Option<Commands>,

    #[command(flatten)]
    tree: TreeCommand,

    /// Path to the configuration file.
    ///
    /// Defaults to `~/.config/deploytree/config.yaml` or the path specified by
    /// the `DEPLOYTREE_CONFIG_FILE_PATH` environment variable.
    #[clap(
        long = "config",
        short = 'c',
        env = "DEPLOYTREE_CONFIG_FILE_PATH",
        help = "Specify a configuration file. Defaults to ~/.config/deploytree/config.yaml or \
                DEPLOYTREE_CONFIG_FILE_PATH env var."
    )]
    config_file: Option<PathBuf>,

    /// Sets the logging level, overriding the configuration file.
    #[clap(
        long = "log-level",
        env = "DEPLOYTREE_LOG_LEVEL",
        help = "Set the logging level (e.g., warn, info, debug, trace)."
    )]
    log_level: Option<tracing::Level>,

    /// Kubeconfig file to read instead of the inferred one.
    #[clap(
        long = "kubeconfig",
        global = true,
        help = "Path to the kubeconfig file. Defaults to $KUBECONFIG or ~/.kube/config."
    )]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one.
    #[clap(
        long = "context",
        global = true,
        help = "The kubeconfig context to use. Defaults to the current context."
    )]
    context: Option<String>,
}

/// Subcommands besides resolving a deployment.
#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Displays client and server version information.
    #[command(about = "Display client and server version information")]
    Version {
        /// If true, shows only the client version and does not require a server
        /// connection.
        #[clap(long = "client", help = "If true, shows client version only (no server required).")]
        client: bool,
    },

    /// Generates a shell completion script for the specified shell.
    #[command(about = "Generate shell completion script for the specified shell (bash, zsh, fish)")]
    Completions { shell: clap_complete::Shell },

    /// Outputs the default configuration in YAML format to standard output.
    #[command(about = "Output the default configuration in YAML format")]
    DefaultConfig,
}

impl Default for Cli {
    fn default() -> Self { Self::parse() }
}

impl Cli {
    /// Loads the configuration file, letting `--log-level` override the
    /// configured level.
    fn load_config(&self) -> Result<Config, Error> {
        let mut config = Config::load_or_default(self.config_file.clone())?;

        if let Some(log_level) = self.log_level {
            config.log.level = log_level;
        }

        Ok(config)
    }

    /// Runs the parsed command and returns the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an `Error` if the configuration cannot be loaded, the
    /// Kubernetes client cannot be created, the Deployment cannot be resolved
    /// or the output cannot be written.
    pub fn run(self) -> Result<i32, Error> {
        let client_version = Self::command().get_version().unwrap_or_default().to_string();
        let action = match self.commands {
            Some(Commands::Version { client: true }) => {
                let mut stdout = std::io::stdout();
                stdout
                    .write_all(Self::command().render_long_version().as_bytes())
                    .context(error::WriteStdoutSnafu)?;
                stdout
                    .write_all(format!("Client Version: {client_version}\n").as_bytes())
                    .context(error::WriteStdoutSnafu)?;
                return Ok(0);
            }
            Some(Commands::Completions { shell }) => {
                let mut app = Self::command();
                let bin_name = app.get_name().to_string();
                clap_complete::generate(shell, &mut app, bin_name, &mut std::io::stdout());
                return Ok(0);
            }
            Some(Commands::DefaultConfig) => {
                std::io::stdout()
                    .write_all(Config::default().to_yaml()?.as_bytes())
                    .context(error::WriteStdoutSnafu)?;
                return Ok(0);
            }
            Some(Commands::Version { client: false }) => Action::ServerVersion,
            None => {
                let Some(deployment) = self.tree.deployment() else {
                    let help = Self::command().render_long_help().ansi().to_string();
                    std::io::stderr().write_all(help.as_bytes()).context(error::WriteStderrSnafu)?;
                    return Ok(EXIT_CODE_USAGE);
                };
                Action::Resolve { deployment: deployment.to_string() }
            }
        };

        let config = self.load_config()?;
        config.log.registry();

        let Self { tree, kubeconfig, context, .. } = self;
        let fut = async move {
            let kube_client = provider::connect(kubeconfig.as_deref(), context).await?;
            match action {
                Action::ServerVersion => {
                    let server_version = kube_client.apiserver_version().await.map_or_else(
                        |_| "unknown".to_string(),
                        |info| format!("{}.{}", info.major, info.minor),
                    );
                    let info = format!(
                        "Client Version: {client_version}\nServer Version: {server_version}\n"
                    );
                    let mut stdout = std::io::stdout();
                    stdout
                        .write_all(Self::command().render_long_version().as_bytes())
                        .context(error::WriteStdoutSnafu)?;
                    stdout.write_all(info.as_bytes()).context(error::WriteStdoutSnafu)?;
                }
                Action::Resolve { deployment } => {
                    tree.run(deployment, KubeProvider::from(kube_client), config).await?;
                }
            }

            Ok::<_, Error>(0)
        };

        Runtime::new().context(error::InitializeTokioRuntimeSnafu)?.block_on(fut)
    }
}

/// What to do once the Kubernetes client is available.
enum Action {
    ServerVersion,
    Resolve { deployment: String },
}
