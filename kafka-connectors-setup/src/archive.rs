use std::fs::File;
use std::io::Read;
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use xz2::read::XzDecoder;

use crate::error::ConnectorsSetupError;

/// Archive formats understood by [`extract_archive`], detected from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
    TarZst,
}

impl ArchiveFormat {
    const EXTENSIONS: [(&'static str, ArchiveFormat); 10] = [
        (".zip", ArchiveFormat::Zip),
        (".tar", ArchiveFormat::Tar),
        (".tar.gz", ArchiveFormat::TarGz),
        (".tgz", ArchiveFormat::TarGz),
        (".tar.bz2", ArchiveFormat::TarBz2),
        (".tbz2", ArchiveFormat::TarBz2),
        (".tar.xz", ArchiveFormat::TarXz),
        (".txz", ArchiveFormat::TarXz),
        (".tar.zst", ArchiveFormat::TarZst),
        (".tzst", ArchiveFormat::TarZst),
    ];

    /// Detects the format from the extension of `path`, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_lowercase();

        Self::EXTENSIONS
            .into_iter()
            .find(|(extension, _)| name.ends_with(extension))
            .map(|(_, format)| format)
    }
}

/// Extracts `archive` into `destination`, creating missing directories.
///
/// Entries whose path would land outside of `destination` are never written.
/// For zip archives such an entry fails the whole extraction; tar based
/// archives skip the entry and extract the rest.
pub fn extract_archive(archive: &Path, destination: &Path) -> Result<(), ConnectorsSetupError> {
    let format = ArchiveFormat::from_path(archive)
        .ok_or_else(|| ConnectorsSetupError::UnsupportedArchive(archive.display().to_string()))?;

    std::fs::create_dir_all(destination).map_err(ConnectorsSetupError::io(destination))?;
    let file = File::open(archive).map_err(ConnectorsSetupError::io(archive))?;

    match format {
        ArchiveFormat::Zip => {
            let zip_error = |source| ConnectorsSetupError::Zip {
                path: archive.display().to_string(),
                source,
            };
            let mut zip = zip::ZipArchive::new(file).map_err(zip_error)?;
            zip.extract(destination).map_err(zip_error)
        }
        ArchiveFormat::Tar => unpack_tar(file, archive, destination),
        ArchiveFormat::TarGz => unpack_tar(GzDecoder::new(file), archive, destination),
        ArchiveFormat::TarBz2 => unpack_tar(BzDecoder::new(file), archive, destination),
        ArchiveFormat::TarXz => unpack_tar(XzDecoder::new(file), archive, destination),
        ArchiveFormat::TarZst => {
            let decoder = zstd::Decoder::new(file).map_err(ConnectorsSetupError::io(archive))?;
            unpack_tar(decoder, archive, destination)
        }
    }
}

fn unpack_tar<R: Read>(
    reader: R,
    archive: &Path,
    destination: &Path,
) -> Result<(), ConnectorsSetupError> {
    tar::Archive::new(reader)
        .unpack(destination)
        .map_err(ConnectorsSetupError::io(archive))
}
