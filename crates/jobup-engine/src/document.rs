use std::io;
use std::path::{Path, PathBuf};

/// Produces an upload-ready document from the source résumé.
///
/// The orchestrator treats the returned path as opaque and uploads whatever
/// comes back; if the collaborator fails, it falls back to uploading the
/// source as-is.
pub trait DocumentProducer: Send + Sync {
    fn produce(&self, source: &Path) -> io::Result<PathBuf>;
}

/// No mutation; the source file is uploaded unchanged.
pub struct PassthroughProducer;

impl DocumentProducer for PassthroughProducer {
    fn produce(&self, source: &Path) -> io::Result<PathBuf> {
        Ok(source.to_path_buf())
    }
}
