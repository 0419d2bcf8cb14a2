//! Snapshot persistence for services that cache remote data.
//!
//! Services opt in by returning bytes from [`Service::dump`]; the
//! snapshotter writes each service's bytes to its configured file on
//! shutdown (and on SIGHUP) so a restart does not start cold.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Error;
use crate::metrics;
use crate::service::Service;

/// A set of services with snapshot files attached.
#[derive(Default)]
pub struct Snapshotter {
    targets: Vec<(String, PathBuf, Arc<dyn Service>)>,
}

impl Snapshotter {
    /// Create an empty snapshotter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a snapshot file to a service.
    pub fn add(&mut self, name: impl Into<String>, path: PathBuf, service: Arc<dyn Service>) {
        self.targets.push((name.into(), path, service));
    }

    /// True if no service has a snapshot file configured.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Dump every attached service to its file. Failures are logged
    /// and counted but do not abort the remaining dumps.
    pub fn save_all(&self) {
        for (name, path, service) in &self.targets {
            match self.save_one(path, service.as_ref()) {
                Ok(true) => {
                    info!(service = %name, path = %path.display(), "saved snapshot");
                    metrics::record_snapshot(name, true);
                }
                Ok(false) => {
                    // Nothing to persist yet.
                }
                Err(e) => {
                    warn!(service = %name, path = %path.display(), error = %e, "snapshot failed");
                    metrics::record_snapshot(name, false);
                }
            }
        }
    }

    fn save_one(&self, path: &Path, service: &dyn Service) -> Result<bool, Error> {
        let Some(bytes) = service.dump().map_err(|e| Error::Config(e.0))? else {
            return Ok(false);
        };
        fs::write(path, bytes)?;
        Ok(true)
    }
}

/// Read a snapshot file, returning `None` if it does not exist.
pub fn load_file(path: &Path) -> Result<Option<Vec<u8>>, Error> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;

    struct FixedDump(Option<Vec<u8>>);

    impl Service for FixedDump {
        fn query(&self, _q: &str) -> Result<Vec<String>, ServiceError> {
            Ok(vec![])
        }

        fn dump(&self) -> Result<Option<Vec<u8>>, ServiceError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn saves_and_reloads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fx.json");

        let mut snap = Snapshotter::new();
        snap.add("fx", path.clone(), Arc::new(FixedDump(Some(b"{}".to_vec()))));
        snap.save_all();

        assert_eq!(load_file(&path).unwrap(), Some(b"{}".to_vec()));
    }

    #[test]
    fn empty_dump_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fx.json");

        let mut snap = Snapshotter::new();
        snap.add("fx", path.clone(), Arc::new(FixedDump(None)));
        snap.save_all();

        assert_eq!(load_file(&path).unwrap(), None);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_file(&dir.path().join("absent")).unwrap(), None);
    }
}
