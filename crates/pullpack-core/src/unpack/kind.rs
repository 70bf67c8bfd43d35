//! Archive kind detection and output name derivation by file suffix.

pub const TAR_GZ_SUFFIX: &str = ".tar.gz";
pub const GZ_SUFFIX: &str = ".gz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Tar archive compressed with gzip; extracts to a directory tree.
    TarGz,
    /// Single gzip-compressed file; decompresses to one file.
    Gzip,
}

impl ArchiveKind {
    /// Classifies `file_name` by suffix (case-sensitive). `.tar.gz` wins over `.gz`.
    pub fn detect(file_name: &str) -> Option<Self> {
        if file_name.ends_with(TAR_GZ_SUFFIX) {
            Some(ArchiveKind::TarGz)
        } else if file_name.ends_with(GZ_SUFFIX) {
            Some(ArchiveKind::Gzip)
        } else {
            None
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            ArchiveKind::TarGz => TAR_GZ_SUFFIX,
            ArchiveKind::Gzip => GZ_SUFFIX,
        }
    }

    /// `file_name` without this kind's suffix, or `None` if nothing is left.
    pub fn output_name(self, file_name: &str) -> Option<&str> {
        file_name
            .strip_suffix(self.suffix())
            .filter(|stem| !stem.is_empty())
    }
}

/// Detects the kind of `file_name` and its output name in one step.
pub fn classify(file_name: &str) -> Option<(ArchiveKind, &str)> {
    let kind = ArchiveKind::detect(file_name)?;
    Some((kind, kind.output_name(file_name)?))
}
