//! One render pass: targets in, named files out.

use std::cell::Cell;
use std::time::Instant;

use crate::cache::RenderCache;
use crate::controller::notice;
use crate::host::{Host, RenderError, RenderRequest, SceneNode};
use crate::names::{archive_name, file_path};
use crate::protocol::PreparedFile;
use crate::target::{OutputFormat, Preferences, Slot, Target, UPSCALED_SIZE, UPSCALE_FACTOR};

/// How archives produced by a pass are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveNaming {
    pub product_tag: String,
    /// Used when there is nothing to export.
    pub default_name: String,
}

/// Result of a successful pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBatch {
    pub files: Vec<PreparedFile>,
    pub archive_name: String,
    pub preferences: Preferences,
}

pub type NodeId<H> = <<H as Host>::Node as SceneNode>::Id;

#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("pass stopped before all files were rendered")]
    Stopped,
}

/// Render (or reuse) every target's files for `prefs`.
///
/// Renders run one at a time in target order: a target's primary rendering,
/// then its upscaled rendering when one applies. The first render failure
/// aborts the pass. Once `stop` is set no further render is started; a
/// render already in flight completes and the pass returns
/// [`PassError::Stopped`].
pub async fn prepare_pass<H: Host>(
    host: &H,
    targets: &[Target<H::Node>],
    cache: &mut RenderCache<NodeId<H>>,
    prefs: Preferences,
    naming: &ArchiveNaming,
    notify_user: bool,
    stop: &Cell<bool>,
) -> Result<PreparedBatch, PassError> {
    if targets.is_empty() {
        return Ok(PreparedBatch {
            files: Vec::new(),
            archive_name: naming.default_name.clone(),
            preferences: prefs,
        });
    }

    if notify_user {
        host.notify(&notice::preparing(targets.len()));
    }

    let started = Instant::now();
    let format = prefs.output_format;
    let mut files = Vec::with_capacity(targets.len());

    for target in targets {
        if stop.get() {
            return Err(PassError::Stopped);
        }
        let bytes = cache
            .get_or_render(&target.key, Slot::Primary, || {
                host.render(&target.node, RenderRequest::new(format))
            })
            .await?;
        files.push(PreparedFile {
            file_name: file_path(
                &target.base_name,
                &target.size,
                &target.path_segments,
                prefs.include_size_24,
                format,
            ),
            bytes,
        });

        if target.wants_upscale(&prefs) {
            if stop.get() {
                return Err(PassError::Stopped);
            }
            let bytes = cache
                .get_or_render(&target.key, Slot::Upscaled128, || {
                    host.render(
                        &target.node,
                        RenderRequest::scaled(OutputFormat::Raster, UPSCALE_FACTOR),
                    )
                })
                .await?;
            files.push(PreparedFile {
                file_name: file_path(
                    &target.base_name,
                    UPSCALED_SIZE,
                    &target.path_segments,
                    prefs.include_size_24,
                    OutputFormat::Raster,
                ),
                bytes,
            });
        }
    }

    let today = chrono::Local::now().date_naive();
    let archive_name = archive_name(today, &naming.product_tag, format);

    tracing::info!(
        targets = targets.len(),
        files = files.len(),
        cached = cache.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        %archive_name,
        "Prepared export files"
    );

    if notify_user {
        host.notify(notice::FILES_READY);
    }

    Ok(PreparedBatch {
        files,
        archive_name,
        preferences: prefs,
    })
}
