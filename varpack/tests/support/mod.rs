//! Scripted in-memory host for controller tests.
//!
//! Renders can be held behind a gate so tests decide exactly when a pass
//! makes progress. Every render, notice and close is recorded.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;

use serde_json::json;
use tokio::sync::{watch, Semaphore};

use varpack::scene::{Scene, SceneNodeRef};
use varpack::{Host, OutputFormat, RenderError, RenderRequest, SceneNode};

pub struct TestHost {
    scene: Scene,
    gate: Option<Semaphore>,
    failing: RefCell<HashSet<String>>,
    started: watch::Sender<usize>,
    pub renders: RefCell<Vec<(String, RenderRequest)>>,
    pub notices: RefCell<Vec<String>>,
    pub closed: RefCell<Option<Option<String>>>,
}

impl TestHost {
    pub fn new(scene: Scene) -> Self {
        TestHost {
            scene,
            gate: None,
            failing: RefCell::new(HashSet::new()),
            started: watch::channel(0).0,
            renders: RefCell::new(Vec::new()),
            notices: RefCell::new(Vec::new()),
            closed: RefCell::new(None),
        }
    }

    /// Renders block until [`TestHost::release`] lets them through.
    pub fn gated(scene: Scene) -> Self {
        TestHost {
            gate: Some(Semaphore::new(0)),
            ..TestHost::new(scene)
        }
    }

    pub fn fail_on(&self, id: &str) {
        self.failing.borrow_mut().insert(id.to_string());
    }

    /// Let `count` more renders complete.
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// Wait until at least `count` renders have started.
    pub async fn wait_started(&self, count: usize) {
        let mut started = self.started.subscribe();
        started
            .wait_for(|n| *n >= count)
            .await
            .expect("host dropped");
    }

    pub fn render_count(&self) -> usize {
        self.renders.borrow().len()
    }

    pub fn rendered_formats(&self) -> Vec<OutputFormat> {
        self.renders.borrow().iter().map(|(_, r)| r.format).collect()
    }
}

/// Rendered bytes encode what was asked for, so tests can tell them apart.
pub fn fake_bytes(id: &str, request: RenderRequest) -> Vec<u8> {
    format!("{}|{}|{:?}", id, request.format, request.scale).into_bytes()
}

impl Host for TestHost {
    type Node = SceneNodeRef;

    fn selection(&self) -> Vec<SceneNodeRef> {
        self.scene.selection()
    }

    async fn render(
        &self,
        node: &SceneNodeRef,
        request: RenderRequest,
    ) -> Result<Vec<u8>, RenderError> {
        let id = node.id();
        self.renders.borrow_mut().push((id.clone(), request));
        self.started.send_modify(|n| *n += 1);

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        if self.failing.borrow().contains(&id) {
            return Err(RenderError::Rejected {
                node: id,
                reason: "scripted failure".into(),
            });
        }
        Ok(fake_bytes(&id, request))
    }

    fn notify(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }

    fn close(&self, message: Option<&str>) {
        *self.closed.borrow_mut() = Some(message.map(str::to_string));
    }
}

/// A component set `ICON` with a 24 px and a 32 px variant, plus a loose
/// `CLOSE` variant inside an `Actions` section.
pub fn icon_scene(selection: &[&str]) -> Scene {
    Scene::from_value(json!({
        "nodes": [
            { "id": "page", "kind": "page", "name": "Icons" },
            { "id": "set", "kind": "variant-group", "name": "Icon", "parent": "page",
              "children": ["v24", "v32"] },
            { "id": "v24", "kind": "variant", "name": "Size=24", "parent": "set",
              "variantProperties": [["Size", "24"]], "width": 24.0 },
            { "id": "v32", "kind": "variant", "name": "Size=32", "parent": "set",
              "variantProperties": [["Size", "32"]], "width": 32.0 },
            { "id": "section", "kind": "grouping", "name": "Actions", "parent": "page",
              "children": ["close"] },
            { "id": "close", "kind": "variant", "name": "Close", "parent": "section",
              "width": 16.0 },
            { "id": "inst", "kind": "instance", "name": "Icon", "parent": "page",
              "origin": "v32", "width": 32.0 }
        ],
        "selection": selection
    }))
    .expect("valid scene")
}
