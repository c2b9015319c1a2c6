use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Configuration { source: crate::config::Error },

    #[snafu(display("{source}"))]
    Provider { source: crate::provider::Error },

    #[snafu(display("{source}"))]
    Resolve { source: crate::resolver::Error },

    #[snafu(display("Failed to write to stdout, error: {source}"))]
    WriteStdout { source: std::io::Error },

    #[snafu(display("Failed to write to stderr, error: {source}"))]
    WriteStderr { source: std::io::Error },

    #[snafu(display("Failed to serialize resolution as JSON, error: {source}"))]
    SerializeJson { source: serde_json::Error },

    #[snafu(display("Failed to serialize resolution as YAML, error: {source}"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("Failed to create tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: std::io::Error },
}

impl From<crate::config::Error> for Error {
    fn from(source: crate::config::Error) -> Self { Self::Configuration { source } }
}

impl From<crate::provider::Error> for Error {
    fn from(source: crate::provider::Error) -> Self { Self::Provider { source } }
}

impl From<crate::resolver::Error> for Error {
    fn from(source: crate::resolver::Error) -> Self { Self::Resolve { source } }
}
