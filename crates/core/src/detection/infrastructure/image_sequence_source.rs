use std::fs;
use std::path::{Path, PathBuf};

use crate::detection::domain::frame_source::{FrameFormat, FrameSource, FrameSourceError};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// Adapts a directory of still images to the [`FrameSource`] interface.
///
/// Files are served in lexicographic order, one per capture. When the
/// directory is exhausted the source reports [`FrameSourceError::Exhausted`],
/// which the detection loop treats as end of input.
pub struct ImageSequenceSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    next: usize,
    format: Option<FrameFormat>,
}

impl ImageSequenceSource {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            files: Vec::new(),
            next: 0,
            format: None,
        }
    }

    fn list_images(dir: &Path) -> Result<Vec<PathBuf>, FrameSourceError> {
        let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                FrameSourceError::PermissionDenied(dir.display().to_string())
            }
            _ => FrameSourceError::Open(format!("{}: {e}", dir.display())),
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        Ok(files)
    }

    fn decode(path: &Path, index: usize) -> Result<Frame, FrameSourceError> {
        let img = image::open(path)
            .map_err(|e| FrameSourceError::Capture(format!("{}: {e}", path.display())))?
            .to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Frame::new(img.into_raw(), width, height, index))
    }
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<FrameFormat, FrameSourceError> {
        let files = Self::list_images(&self.dir)?;
        if files.is_empty() {
            return Err(FrameSourceError::Open(format!(
                "no image files in {}",
                self.dir.display()
            )));
        }

        // Decode the first image eagerly to report the source dimensions
        let first = Self::decode(&files[0], 0)?;
        let format = FrameFormat {
            width: first.width(),
            height: first.height(),
        };

        self.files = files;
        self.next = 0;
        self.format = Some(format);
        Ok(format)
    }

    fn capture(&mut self) -> Result<Frame, FrameSourceError> {
        if self.format.is_none() {
            return Err(FrameSourceError::Capture("source not opened".into()));
        }
        let Some(path) = self.files.get(self.next) else {
            return Err(FrameSourceError::Exhausted);
        };
        let frame = Self::decode(path, self.next)?;
        self.next += 1;
        Ok(frame)
    }

    fn close(&mut self) {
        self.files.clear();
        self.next = 0;
        self.format = None;
    }
}
