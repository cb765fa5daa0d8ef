use std::sync::Arc;

use crate::{
    assets::decode::{AudioDecoder, AutoAudioDecoder, ImageDecoder, RasterImageDecoder},
    assets::media::{DecodedAudio, MediaAsset},
    assets::source::MediaSource,
    foundation::error::{ReelError, ReelResult},
};

/// Everything a render session needs, decoded and immutable.
#[derive(Clone, Debug)]
pub struct LoadedAssets {
    /// Source still image.
    pub image: MediaAsset,
    /// Narration track, when one was configured and non-empty.
    pub narration: Option<DecodedAudio>,
    /// Background music track, when one was configured and non-empty.
    pub music: Option<DecodedAudio>,
}

/// Loads the still image and the optional audio sources in parallel.
///
/// All load tasks are joined before `load` returns, so callers observe a single barrier.
#[derive(Clone)]
pub struct AssetLoader {
    image_decoder: Arc<dyn ImageDecoder>,
    audio_decoder: Arc<dyn AudioDecoder>,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new(Arc::new(RasterImageDecoder), Arc::new(AutoAudioDecoder::default()))
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader").finish_non_exhaustive()
    }
}

impl AssetLoader {
    /// Build a loader from injected decoders.
    pub fn new(image_decoder: Arc<dyn ImageDecoder>, audio_decoder: Arc<dyn AudioDecoder>) -> Self {
        Self {
            image_decoder,
            audio_decoder,
        }
    }

    /// Load and decode all sources.
    ///
    /// The image is mandatory; any image failure is reported ahead of audio failures. Audio
    /// sources that are absent or hold zero bytes become "no track".
    #[tracing::instrument(skip_all, fields(image = %image.describe()))]
    pub fn load(
        &self,
        image: &MediaSource,
        narration: Option<&MediaSource>,
        music: Option<&MediaSource>,
    ) -> ReelResult<LoadedAssets> {
        let (image_res, narration_res, music_res) = std::thread::scope(|scope| {
            let image_task = scope.spawn(move || self.load_image(image));
            let narration_task = narration.map(|src| scope.spawn(move || self.load_audio(src)));
            let music_task = music.map(|src| scope.spawn(move || self.load_audio(src)));

            let image_res = join_task(image_task);
            let narration_res = narration_task.map(join_task).unwrap_or(Ok(None));
            let music_res = music_task.map(join_task).unwrap_or(Ok(None));
            (image_res, narration_res, music_res)
        });

        let image = image_res?;
        let narration = narration_res?;
        let music = music_res?;

        tracing::debug!(
            width = image.width,
            height = image.height,
            narration_secs = narration.as_ref().map(DecodedAudio::duration_secs),
            music_secs = music.as_ref().map(DecodedAudio::duration_secs),
            "assets loaded"
        );

        Ok(LoadedAssets {
            image,
            narration,
            music,
        })
    }

    fn load_image(&self, src: &MediaSource) -> ReelResult<MediaAsset> {
        let bytes = src.read_bytes()?;
        if bytes.is_empty() {
            return Err(ReelError::asset_load(format!(
                "image source '{}' is empty",
                src.describe()
            )));
        }
        self.image_decoder.decode_image(&bytes).map_err(|e| match e {
            ReelError::AssetLoad(msg) => {
                ReelError::asset_load(format!("image '{}': {msg}", src.describe()))
            }
            other => other,
        })
    }

    fn load_audio(&self, src: &MediaSource) -> ReelResult<Option<DecodedAudio>> {
        let bytes = src.read_bytes()?;
        if bytes.is_empty() {
            tracing::debug!(source = %src.describe(), "empty audio source, treating as no track");
            return Ok(None);
        }
        let audio = self.audio_decoder.decode_audio(&bytes).map_err(|e| match e {
            ReelError::AssetLoad(msg) => {
                ReelError::asset_load(format!("audio '{}': {msg}", src.describe()))
            }
            other => other,
        })?;
        if audio.is_empty() {
            tracing::debug!(source = %src.describe(), "audio source decoded to zero frames");
            return Ok(None);
        }
        Ok(Some(audio))
    }
}

fn join_task<T>(handle: std::thread::ScopedJoinHandle<'_, ReelResult<T>>) -> ReelResult<T> {
    handle
        .join()
        .map_err(|_| ReelError::asset_load("asset load task panicked"))?
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
