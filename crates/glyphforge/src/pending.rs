//! One-shot background font loading
//!
//! Loading runs on its own thread. The only way to get the `FontData` out
//! is [`PendingFont::join`], so no thread can see a half-built face.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use glyphforge_core::{AtlasConfig, FontConfig, FontLoadError};
use glyphforge_fontdb::FontProvider;
use parking_lot::Mutex;

use crate::font_data::{FontData, FontState};

enum Job {
    Running {
        handle: JoinHandle<FontData>,
        /// Written by the worker just before it returns
        status: Arc<Mutex<FontState>>,
    },
    /// The loader thread could not be started; the load ran inline
    Done(FontData),
}

/// A font being loaded on a worker thread
pub struct PendingFont {
    job: Job,
}

impl FontData {
    /// Start loading `path` on a background thread
    pub fn spawn_load(
        provider: Arc<dyn FontProvider>,
        path: impl Into<String>,
        config: FontConfig,
        atlas: AtlasConfig,
    ) -> PendingFont {
        let path = path.into();
        let worker_path = path.clone();
        let worker_provider = Arc::clone(&provider);
        let status = Arc::new(Mutex::new(FontState::Loading));
        let worker_status = Arc::clone(&status);
        let spawned = thread::Builder::new()
            .name("glyphforge-load".into())
            .spawn(move || {
                let font = FontData::load(worker_provider.as_ref(), &worker_path, config, atlas);
                *worker_status.lock() = font.state();
                font
            });

        let job = match spawned {
            Ok(handle) => Job::Running { handle, status },
            Err(err) => {
                log::warn!("Could not start loader thread ({}); loading {} inline", err, path);
                Job::Done(FontData::load(provider.as_ref(), &path, config, atlas))
            },
        };
        PendingFont { job }
    }
}

impl PendingFont {
    /// `Loading` until the worker is done, then the state of the font
    /// [`join`](Self::join) will return. A worker that panicked reports
    /// `Failed`.
    pub fn state(&self) -> FontState {
        match &self.job {
            Job::Running { handle, status } => match *status.lock() {
                FontState::Loading if handle.is_finished() => FontState::Failed,
                state => state,
            },
            Job::Done(font) => font.state(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state() != FontState::Loading
    }

    /// Wait for the load to finish and hand over the font.
    ///
    /// A loader that panicked yields a `Failed` font with
    /// [`FontLoadError::LoaderPanicked`].
    pub fn join(self) -> FontData {
        match self.job {
            Job::Running { handle, .. } => handle.join().unwrap_or_else(|_| {
                log::warn!("Font loader thread panicked");
                FontData::failed(FontLoadError::LoaderPanicked)
            }),
            Job::Done(font) => font,
        }
    }
}

impl std::fmt::Debug for PendingFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFont")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphforge_fontdb::EmbeddedProvider;

    struct PanickingProvider;

    impl FontProvider for PanickingProvider {
        fn load(&self, _path: &str) -> Result<Arc<[u8]>, FontLoadError> {
            panic!("provider blew up");
        }
    }

    #[test]
    fn join_is_the_barrier() {
        let provider: Arc<dyn FontProvider> = Arc::new(EmbeddedProvider::new());
        let pending = FontData::spawn_load(
            provider,
            "absent.ttf",
            FontConfig::default(),
            AtlasConfig::default(),
        );
        let font = pending.join();
        assert_eq!(font.state(), FontState::Failed);
        assert!(matches!(
            font.load_error(),
            Some(glyphforge_core::GlyphError::FontLoad(
                FontLoadError::ResourceNotFound(_)
            ))
        ));
    }

    #[test]
    fn panicking_loader_becomes_failed() {
        let provider: Arc<dyn FontProvider> = Arc::new(PanickingProvider);
        let font = FontData::spawn_load(
            provider,
            "boom.ttf",
            FontConfig::default(),
            AtlasConfig::default(),
        )
        .join();

        assert_eq!(font.state(), FontState::Failed);
        assert!(matches!(
            font.load_error(),
            Some(glyphforge_core::GlyphError::FontLoad(
                FontLoadError::LoaderPanicked
            ))
        ));
    }
}
