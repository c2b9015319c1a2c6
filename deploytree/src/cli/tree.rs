//! Resolves a Deployment and prints what it is associated with.

use std::time::Duration;

use clap::Args;
use snafu::ResultExt;
use tokio::io::AsyncWriteExt;

use crate::{
    cli::error::{self, Error},
    config::{Config, OutputFormat},
    provider::ResourceProvider,
    resolver::{DeploymentRef, Resolution, ResolveOptions, Resolver},
    ui::ResolutionExt,
};

#[derive(Args, Clone)]
pub struct TreeCommand {
    #[arg(short = 'd', long = "deployment", help = "Name of the deployment to inspect.")]
    pub deployment: Option<String>,

    #[arg(
        short = 'n',
        long = "namespace",
        help = "Kubernetes namespace of the deployment. Defaults to the configured default \
                namespace, \"default\" unless configured otherwise."
    )]
    pub namespace: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        help = "Output format: tree, json or yaml. Defaults to tree."
    )]
    pub output: Option<OutputFormat>,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help = "Give up on cluster lookups after this many seconds. Defaults to 30."
    )]
    pub timeout: Option<u64>,
}

impl TreeCommand {
    /// The deployment to inspect, if one was named.
    pub fn deployment(&self) -> Option<&str> {
        self.deployment.as_deref().filter(|name| !name.is_empty())
    }

    /// Resolves `deployment` through `provider` and writes the result to
    /// standard output.
    ///
    /// With tree output, warnings about incomplete categories follow on
    /// standard error. JSON and YAML output carry them in the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolution fails or the output cannot be
    /// serialized or written.
    pub async fn run<P>(self, deployment: String, provider: P, config: Config) -> Result<(), Error>
    where
        P: ResourceProvider,
    {
        let Rendered { stdout, stderr } = self.resolve(deployment, provider, config).await?;

        let mut out = tokio::io::stdout();
        out.write_all(stdout.as_bytes()).await.context(error::WriteStdoutSnafu)?;
        out.flush().await.context(error::WriteStdoutSnafu)?;

        if !stderr.is_empty() {
            let mut err = tokio::io::stderr();
            err.write_all(stderr.as_bytes()).await.context(error::WriteStderrSnafu)?;
            err.flush().await.context(error::WriteStderrSnafu)?;
        }

        Ok(())
    }

    /// Resolves `deployment` and renders it without writing anything.
    ///
    /// Flags win over `config`; an empty `--namespace` counts as unset.
    async fn resolve<P>(
        self,
        deployment: String,
        provider: P,
        config: Config,
    ) -> Result<Rendered, Error>
    where
        P: ResourceProvider,
    {
        let Self { namespace, output, timeout, .. } = self;
        let namespace =
            namespace.filter(|ns| !ns.is_empty()).unwrap_or(config.default_namespace);
        let options = ResolveOptions {
            timeout: timeout.map_or(config.resolve_timeout, Duration::from_secs),
        };

        let target = DeploymentRef { name: deployment, namespace };
        let resolution = Resolver::new(provider, options).resolve(&target).await?;

        render(&resolution, output.unwrap_or(config.output))
    }
}

/// The text a resolution prints, split by stream.
#[derive(Debug)]
struct Rendered {
    stdout: String,
    stderr: String,
}

fn render(resolution: &Resolution, output: OutputFormat) -> Result<Rendered, Error> {
    let stdout = match output {
        OutputFormat::Tree => resolution.render_tree(),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(resolution).context(error::SerializeJsonSnafu)?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(resolution).context(error::SerializeYamlSnafu)?
        }
    };
    let mut stderr = String::new();
    if output == OutputFormat::Tree {
        for warning in &resolution.warnings {
            stderr.push_str(&format!("warning: {warning}\n"));
        }
    }

    Ok(Rendered { stdout, stderr })
}
