//! Image availability lookup.
//!
//! The model builder only asks whether an illustration exists; it never
//! opens or decodes it. A missing image becomes a note in the report.

use std::path::Path;

/// Answers whether an image file is available.
pub trait ImageLookup {
    fn exists(&self, path: &Path) -> bool;
}

/// Looks the image up on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageLookup;

impl ImageLookup for FsImageLookup {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

impl<F> ImageLookup for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_lookup() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(FsImageLookup.exists(file.path()));
        assert!(!FsImageLookup.exists(Path::new("/no/such/beam.png")));
        // directories are not images
        assert!(!FsImageLookup.exists(file.path().parent().unwrap()));
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |path: &Path| path.ends_with("ssbeam.png");
        assert!(lookup.exists(Path::new("img/ssbeam.png")));
        assert!(!lookup.exists(Path::new("img/other.png")));
    }
}
