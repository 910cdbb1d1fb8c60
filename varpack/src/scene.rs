//! A host backed by a JSON scene description and pre-rendered files.
//!
//! The scene lists every node with its structural links; renderings are read
//! from a directory as `<id>.png`, `<id>.svg` and `<id>@4x.png`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::host::{Host, NodeKind, RenderError, RenderRequest, SceneNode, VariantProperty};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord {
    id: String,
    kind: NodeKind,
    #[serde(default)]
    name: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    children: Vec<String>,
    #[serde(default)]
    variant_properties: Option<Vec<VariantProperty>>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    origin: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SceneFile {
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    selection: Vec<String>,
}

#[derive(Debug)]
struct SceneData {
    nodes: Vec<NodeRecord>,
    index: HashMap<String, usize>,
    selection: Vec<usize>,
}

/// An immutable node tree loaded from JSON.
#[derive(Debug, Clone)]
pub struct Scene {
    data: Rc<SceneData>,
}

impl Scene {
    pub fn load(path: impl AsRef<Path>) -> Result<Scene> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::LoadScene {
            path: path.to_path_buf(),
            source,
        })?;
        let file: SceneFile =
            serde_json::from_str(&contents).map_err(|source| Error::ParseScene {
                path: path.to_path_buf(),
                source,
            })?;
        Scene::from_file(file)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Scene> {
        let file: SceneFile = serde_json::from_value(value).map_err(|source| Error::ParseScene {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Scene::from_file(file)
    }

    fn from_file(file: SceneFile) -> Result<Scene> {
        let mut index = HashMap::with_capacity(file.nodes.len());
        for (i, node) in file.nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(Error::InvalidScene {
                    reason: format!("duplicate node id `{}`", node.id),
                });
            }
        }

        let resolve = |id: &str, field: &str, owner: &str| {
            index.get(id).copied().ok_or_else(|| Error::InvalidScene {
                reason: format!("node `{}` has unknown {} `{}`", owner, field, id),
            })
        };

        for node in file.nodes.iter() {
            if let Some(parent) = &node.parent {
                resolve(parent, "parent", &node.id)?;
            }
            if let Some(origin) = &node.origin {
                resolve(origin, "origin", &node.id)?;
            }
            for child in node.children.iter() {
                resolve(child, "child", &node.id)?;
            }
        }

        let selection = file
            .selection
            .iter()
            .map(|id| resolve(id, "selection entry", "<selection>"))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            nodes = file.nodes.len(),
            selected = selection.len(),
            "Loaded scene"
        );

        Ok(Scene {
            data: Rc::new(SceneData {
                nodes: file.nodes,
                index,
                selection,
            }),
        })
    }

    pub fn node(&self, id: &str) -> Option<SceneNodeRef> {
        self.data.index.get(id).map(|&index| self.at(index))
    }

    pub fn selection(&self) -> Vec<SceneNodeRef> {
        self.data.selection.iter().map(|&i| self.at(i)).collect()
    }

    fn at(&self, index: usize) -> SceneNodeRef {
        SceneNodeRef {
            scene: self.clone(),
            index,
        }
    }
}

/// Handle to one node of a [`Scene`].
#[derive(Debug, Clone)]
pub struct SceneNodeRef {
    scene: Scene,
    index: usize,
}

impl SceneNodeRef {
    fn record(&self) -> &NodeRecord {
        &self.scene.data.nodes[self.index]
    }

    fn link(&self, id: Option<&String>) -> Option<SceneNodeRef> {
        id.and_then(|id| self.scene.node(id))
    }
}

impl SceneNode for SceneNodeRef {
    type Id = String;

    fn id(&self) -> String {
        self.record().id.clone()
    }

    fn kind(&self) -> NodeKind {
        self.record().kind
    }

    fn name(&self) -> String {
        self.record().name.clone()
    }

    fn parent(&self) -> Option<Self> {
        self.link(self.record().parent.as_ref())
    }

    fn children(&self) -> Vec<Self> {
        self.record()
            .children
            .iter()
            .filter_map(|id| self.scene.node(id))
            .collect()
    }

    fn variant_properties(&self) -> Option<Vec<VariantProperty>> {
        self.record().variant_properties.clone()
    }

    fn width(&self) -> Option<f64> {
        self.record().width
    }

    fn origin(&self) -> Option<Self> {
        self.link(self.record().origin.as_ref())
    }
}

/// Host that serves a [`Scene`] and reads renderings from disk.
#[derive(Debug)]
pub struct SceneHost {
    scene: Scene,
    renders: PathBuf,
    closed: RefCell<Option<Option<String>>>,
}

impl SceneHost {
    pub fn new(scene: Scene, renders: impl Into<PathBuf>) -> Self {
        SceneHost {
            scene,
            renders: renders.into(),
            closed: RefCell::new(None),
        }
    }

    /// Where the rendering for `node` is expected on disk.
    pub fn render_path(&self, node: &SceneNodeRef, request: RenderRequest) -> PathBuf {
        let stem: String = node
            .record()
            .id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let scale = match request.scale {
            Some(scale) if scale != 1.0 => format!("@{}x", scale),
            _ => String::new(),
        };
        self.renders
            .join(format!("{}{}.{}", stem, scale, request.format.extension()))
    }

    /// The close message, if the invocation has been closed.
    pub fn closed(&self) -> Option<Option<String>> {
        self.closed.borrow().clone()
    }
}

impl Host for SceneHost {
    type Node = SceneNodeRef;

    fn selection(&self) -> Vec<SceneNodeRef> {
        self.scene.selection()
    }

    async fn render(
        &self,
        node: &SceneNodeRef,
        request: RenderRequest,
    ) -> std::result::Result<Vec<u8>, RenderError> {
        let path = self.render_path(node, request);
        tracing::debug!(node = %node.record().id, path = %path.display(), "Reading rendering");
        tokio::fs::read(&path)
            .await
            .map_err(|source| RenderError::Read { path, source })
    }

    fn notify(&self, message: &str) {
        tracing::info!(notice = message, "Host notice");
        eprintln!("{}", message);
    }

    fn close(&self, message: Option<&str>) {
        tracing::info!(message, "Invocation closed");
        if let Some(message) = message {
            eprintln!("{}", message);
        }
        *self.closed.borrow_mut() = Some(message.map(str::to_string));
    }
}
