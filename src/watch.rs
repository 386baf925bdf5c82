use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, unbounded};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches one config file and reports modifications. The watch stops
/// when this value is dropped.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    changes: Receiver<()>,
    path: PathBuf,
}

impl ConfigWatcher {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, notify::Error> {
        let path = path.as_ref().to_path_buf();
        let (tx, rx) = unbounded();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => match event.kind {
                    EventKind::Modify(_)
                    | EventKind::Create(_)
                    | EventKind::Remove(_)
                    | EventKind::Any => {
                        let _ = tx.send(());
                    }
                    _ => {}
                },
                Err(e) => log::warn!("config watch error: {e}"),
            })?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        log::info!("watching {} for changes", path.display());
        Ok(Self {
            _watcher: watcher,
            changes: rx,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when at least one change arrived since the last call. Editors
    /// often emit several events per save; they collapse into one.
    pub fn changed(&self) -> bool {
        self.changes.try_iter().count() > 0
    }
}
