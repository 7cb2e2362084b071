//! # Sprite Directory Decoder
//!
//! Serves thumbnails from a directory tree laid out as
//! `<root>/<variant>/<species>.png`, e.g. `sprites/shiny/133.png`.
//!
//! No pixel decoding happens here. Only the PNG header is read, for the
//! dimensions; the file bytes are passed through to the renderer as-is.

use evodex_core::config::ImageConfig;
use evodex_core::{DecodeError, ImageDecoder, ImageHandle, ImageKey, ImageVariant, SpeciesId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The eight signature bytes every PNG file starts with.
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Maximum sprite file size (4 MB).
const MAX_SPRITE_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// Signature, IHDR length and tag, width, height.
const PNG_HEADER_LEN: usize = 24;

/// Reads sprites from disk. With no root every lookup is `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct SpriteDirDecoder {
    root: Option<PathBuf>,
}

impl SpriteDirDecoder {
    #[must_use]
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(config.sprite_dir.clone())
    }

    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Where the sprite for this species and variant would live.
    #[must_use]
    pub fn sprite_path(&self, species: SpeciesId, variant: ImageVariant) -> Option<PathBuf> {
        self.root.as_ref().map(|root| {
            root.join(variant.as_str())
                .join(format!("{}.png", species.value()))
        })
    }
}

impl ImageDecoder for SpriteDirDecoder {
    fn decode(&self, species: SpeciesId, variant: ImageVariant) -> Result<ImageHandle, DecodeError> {
        let not_found = DecodeError::NotFound { species, variant };
        let Some(path) = self.sprite_path(species, variant) else {
            return Err(not_found);
        };

        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found),
            Err(e) => return Err(DecodeError::Failed(format!("{}: {}", path.display(), e))),
        };
        if !metadata.is_file() {
            return Err(not_found);
        }
        if metadata.len() > MAX_SPRITE_FILE_SIZE {
            return Err(DecodeError::Failed(format!(
                "{}: {} bytes exceeds maximum {}",
                path.display(),
                metadata.len(),
                MAX_SPRITE_FILE_SIZE
            )));
        }

        let bytes = std::fs::read(&path)
            .map_err(|e| DecodeError::Failed(format!("{}: {}", path.display(), e)))?;
        let (width, height) = png_dimensions(&bytes)
            .ok_or_else(|| DecodeError::Failed(format!("{}: not a PNG image", path.display())))?;

        Ok(ImageHandle::new(
            ImageKey::new(species, variant),
            width,
            height,
            bytes,
        ))
    }
}

/// Width and height from the IHDR chunk, or `None` if this is not a PNG.
pub fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < PNG_HEADER_LEN || bytes.get(..8)? != PNG_SIGNATURE.as_slice() {
        return None;
    }
    if bytes.get(12..16)? != b"IHDR".as_slice() {
        return None;
    }
    let width = read_u32(bytes, 16)?;
    let height = read_u32(bytes, 20)?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let chunk: [u8; 4] = bytes.get(at..at + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(chunk))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        bytes
    }

    #[test]
    fn reads_dimensions() {
        assert_eq!(png_dimensions(&png_header(96, 64)), Some((96, 64)));
    }

    #[test]
    fn rejects_non_png() {
        assert_eq!(png_dimensions(b"GIF89a not a png at all"), None);
        assert_eq!(png_dimensions(&PNG_SIGNATURE), None);
        assert_eq!(png_dimensions(&png_header(0, 10)), None);
    }

    #[test]
    fn no_root_is_not_found() {
        let decoder = SpriteDirDecoder::default();
        let result = decoder.decode(SpeciesId(25), ImageVariant::Normal);
        assert!(matches!(result, Err(DecodeError::NotFound { .. })));
    }

    #[test]
    fn decodes_from_variant_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("shiny")).expect("mkdir");
        std::fs::write(dir.path().join("shiny/25.png"), png_header(40, 30)).expect("write");

        let decoder = SpriteDirDecoder::new(Some(dir.path().to_path_buf()));
        let handle = decoder.decode(SpeciesId(25), ImageVariant::Shiny).expect("decode");
        assert_eq!((handle.width(), handle.height()), (40, 30));
        assert_eq!(handle.key(), ImageKey::new(SpeciesId(25), ImageVariant::Shiny));

        let normal = decoder.decode(SpeciesId(25), ImageVariant::Normal);
        assert!(matches!(normal, Err(DecodeError::NotFound { .. })));
    }

    #[test]
    fn file_bytes_pass_through_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("normal")).expect("mkdir");
        let mut file = png_header(16, 16);
        file.extend_from_slice(&[0xAB; 64]);
        std::fs::write(dir.path().join("normal/7.png"), &file).expect("write");

        let decoder = SpriteDirDecoder::new(Some(dir.path().to_path_buf()));
        let handle = decoder.decode(SpeciesId(7), ImageVariant::Normal).expect("decode");
        assert_eq!(handle.data(), file.as_slice());
    }

    #[test]
    fn corrupt_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("normal")).expect("mkdir");
        std::fs::write(dir.path().join("normal/1.png"), b"garbage").expect("write");

        let decoder = SpriteDirDecoder::new(Some(dir.path().to_path_buf()));
        let result = decoder.decode(SpeciesId(1), ImageVariant::Normal);
        assert!(matches!(result, Err(DecodeError::Failed(_))));
    }
}
