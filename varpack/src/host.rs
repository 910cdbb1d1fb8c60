//! Read-only view of the design tool the export runs inside.
//!
//! The controller never owns or mutates nodes. It walks them through
//! [`SceneNode`] and asks the [`Host`] to render them.

use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::target::OutputFormat;

/// Structural role of a node in the host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Top of a document page. Ancestor walks stop here.
    Page,
    /// A named container used to group exports into folders.
    Grouping,
    /// A container whose direct children are the variants of one component.
    VariantGroup,
    /// A single component variant.
    Variant,
    /// A placed copy of a variant; resolves to its origin.
    Instance,
    Other,
}

/// One `name=value` variant property, in declaration order.
pub type VariantProperty = (String, String);

pub trait SceneNode: Clone {
    type Id: Clone + Eq + Hash + Debug;

    fn id(&self) -> Self::Id;

    fn kind(&self) -> NodeKind;

    /// Display name. Empty when the host has none.
    fn name(&self) -> String;

    fn parent(&self) -> Option<Self>;

    fn children(&self) -> Vec<Self>;

    /// Declared variant properties, or `None` for nodes that are not variants.
    fn variant_properties(&self) -> Option<Vec<VariantProperty>>;

    /// Pixel width, if the node has a size.
    fn width(&self) -> Option<f64>;

    /// The variant an instance was created from.
    fn origin(&self) -> Option<Self>;
}

/// Parameters for one render call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub format: OutputFormat,
    /// Uniform scale factor; `None` renders at 1×.
    pub scale: Option<f32>,
}

impl RenderRequest {
    pub fn new(format: OutputFormat) -> Self {
        RenderRequest {
            format,
            scale: None,
        }
    }

    pub fn scaled(format: OutputFormat, scale: f32) -> Self {
        RenderRequest {
            format,
            scale: Some(scale),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("host refused to render `{node}`: {reason}")]
    Rejected { node: String, reason: String },

    #[error("cannot read rendering `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Capabilities the controller consumes from the host environment.
pub trait Host {
    type Node: SceneNode;

    /// Current selection, in selection order.
    fn selection(&self) -> Vec<Self::Node>;

    /// Render a node to encoded bytes. May be slow and may fail.
    fn render(
        &self,
        node: &Self::Node,
        request: RenderRequest,
    ) -> impl Future<Output = Result<Vec<u8>, RenderError>>;

    /// Show a short, non-blocking notice to the user.
    fn notify(&self, message: &str);

    /// End the invocation.
    fn close(&self, message: Option<&str>);
}

impl<H: Host> Host for &H {
    type Node = H::Node;

    fn selection(&self) -> Vec<Self::Node> {
        (**self).selection()
    }

    fn render(
        &self,
        node: &Self::Node,
        request: RenderRequest,
    ) -> impl Future<Output = Result<Vec<u8>, RenderError>> {
        (**self).render(node, request)
    }

    fn notify(&self, message: &str) {
        (**self).notify(message)
    }

    fn close(&self, message: Option<&str>) {
        (**self).close(message)
    }
}
