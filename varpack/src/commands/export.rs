use std::path::Path;

use tokio::sync::mpsc;

use varpack::channel;
use varpack::presenter::{autosave, status};
use varpack::scene::{Scene, SceneHost};
use varpack::{Controller, DirectorySaver, Error, ExportConfig, Outcome, Presenter, Result};

use crate::cli::ExportArgs;

pub async fn run(args: ExportArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };

    let mut desired = config.preferences();
    if let Some(format) = args.format {
        desired.output_format = format.into();
    }
    if args.include_24 {
        desired.include_size_24 = true;
    }
    if args.no_upscale {
        desired.upscale_128 = false;
    }

    let scene = Scene::load(&args.scene)?;

    tokio::fs::create_dir_all(&args.out)
        .await
        .map_err(|source| Error::CreateOutputDir {
            path: args.out.clone(),
            source,
        })?;

    let host = SceneHost::new(scene, &args.renders);
    let (controller_end, presenter_end) = channel::pair();

    let controller = Controller::new(&host, &config, controller_end);
    let presenter = Presenter::new(presenter_end, DirectorySaver::new(&args.out));
    let updates = presenter.subscribe();
    let (actions, action_rx) = mpsc::unbounded_channel();

    tracing::debug!(?desired, scene = %args.scene.display(), "Starting export");

    let (outcome, report, ()) = tokio::join!(
        controller.run(),
        presenter.run(action_rx),
        autosave(updates, actions, desired),
    );

    match outcome {
        Outcome::Saved => {
            if let (Some(path), Some(len)) = (&report.saved, report.archive_len) {
                println!("{}", saved_line(path, len));
            }
            Ok(())
        }
        Outcome::Cancelled if report.status == status::CREATE_FAILED => Err(Error::ExportFailed {
            message: report.status,
        }),
        Outcome::Cancelled => Err(Error::Cancelled),
        Outcome::NothingSelected => Err(Error::NothingSelected),
        Outcome::ExportFailed { message } => Err(Error::ExportFailed { message }),
        Outcome::Disconnected => Err(match report.failure {
            Some(message) => Error::ExportFailed { message },
            None => Error::Disconnected,
        }),
    }
}

fn saved_line(path: &Path, len: u64) -> String {
    format!(
        "{} ({})",
        path.display(),
        humansize::format_size(len, humansize::BINARY)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_line_reports_size() {
        assert_eq!(
            saved_line(Path::new("dist/icons.zip"), 2048),
            "dist/icons.zip (2 KiB)"
        );
        assert_eq!(saved_line(Path::new("a.zip"), 22), "a.zip (22 B)");
    }
}
