//! Where finished archives go.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

/// A save action offered to the presenter. Receives the finished archive
/// and reports where it ended up.
pub trait SaveTarget {
    fn save(
        &mut self,
        name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> impl Future<Output = io::Result<PathBuf>>;
}

/// Writes archives into a directory, replacing any file of the same name.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySaver { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveTarget for DirectorySaver {
    async fn save(&mut self, name: &str, mime: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        // Archive names come from the controller; never let one escape the directory.
        let file_name = Path::new(name)
            .file_name()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("`{}` is not a file name", name),
                )
            })?
            .to_owned();

        let path = self.dir.join(file_name);
        tracing::debug!(path = %path.display(), mime, len = bytes.len(), "Saving archive");
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}
