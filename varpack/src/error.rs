use std::path::PathBuf;

use miette::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("Cannot read configuration `{}`", .path.display())]
    LoadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse configuration `{}`", .path.display())]
    #[diagnostic(help("The configuration file must be valid TOML"))]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Cannot read scene `{}`", .path.display())]
    LoadScene {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse scene `{}`", .path.display())]
    #[diagnostic(help("Is this a scene exported as JSON?"))]
    ParseScene {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid scene: {reason}")]
    InvalidScene { reason: String },

    #[error("Cannot create output directory `{}`", .path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export failed: {message}")]
    #[diagnostic(help("Check that every selected node has a rendering in the renders directory"))]
    ExportFailed { message: String },

    #[error("Nothing to export")]
    #[diagnostic(help("Select a component or component set with variants"))]
    NothingSelected,

    #[error("Export was cancelled")]
    Cancelled,

    #[error("The other side of the session channel has gone away")]
    Disconnected,
}
