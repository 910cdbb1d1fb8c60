//! Export every variant of selected components into one zip archive.
//!
//! An export runs as two cooperating halves joined by a [`channel`]: the
//! [`controller::Controller`] resolves the selection and renders files
//! through a [`host::Host`], and the [`presenter::Presenter`] displays the
//! result, forwards preference changes and saves the archive.

pub mod cache;
pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod names;
pub mod pass;
pub mod presenter;
pub mod protocol;
pub mod save;
pub mod scene;
pub mod scheduler;
pub mod selector;
pub mod target;

pub use config::ExportConfig;
pub use controller::{Controller, Outcome};
pub use error::{Error, Result};
pub use host::{Host, NodeKind, RenderError, RenderRequest, SceneNode};
pub use presenter::{Presenter, PresenterReport, PresenterState, UserAction};
pub use save::{DirectorySaver, SaveTarget};
pub use target::{OutputFormat, Preferences};
