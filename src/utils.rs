use crate::error::PipelineError;
use crate::export::error::ExportError;
use crate::forecast::classifier::ForecastFile;
use log::{debug, info};
use std::fs;
use std::io;
use std::path::Path;

/// Lists the regular files of a forecast directory as [`ForecastFile`]s.
///
/// The file name is the identifier and the file length is the size used by
/// the corruption heuristic. Sub-directories and names that are not valid
/// UTF-8 are ignored. The result is in directory order.
pub fn scan_forecast_directory(dir: &Path) -> Result<Vec<ForecastFile>, PipelineError> {
    let scan_error = |e| PipelineError::DirectoryScan(dir.to_path_buf(), e);
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(scan_error)? {
        let entry = entry.map_err(scan_error)?;
        let metadata = entry.metadata().map_err(scan_error)?;
        if !metadata.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => files.push(ForecastFile::new(name, metadata.len()).with_path(entry.path())),
            Err(name) => debug!("Ignoring non UTF-8 file name {:?}", name),
        }
    }
    info!("Found {} files in {}", files.len(), dir.display());
    Ok(files)
}

pub fn ensure_dir_exists(path: &Path) -> Result<(), ExportError> {
    match fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(ExportError::NotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating output directory: {}", path.display());
            fs::create_dir_all(path).map_err(|e| ExportError::OutputDir(path.to_path_buf(), e))
        }
        Err(e) => Err(ExportError::OutputDir(path.to_path_buf(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scan_lists_files_with_sizes() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("gep.t00z.pgrb2a_000_01"), vec![0u8; 128])?;
        fs::write(dir.path().join("gep.t00z.pgrb2a_006_01"), vec![0u8; 64])?;
        fs::create_dir(dir.path().join("nested"))?;

        let mut files = scan_forecast_directory(dir.path())?;
        files.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].identifier, "gep.t00z.pgrb2a_000_01");
        assert_eq!(files[0].size_bytes, 128);
        assert_eq!(files[1].size_bytes, 64);
        assert!(files[1].path.as_ref().is_some_and(|p| p.is_file()));
        Ok(())
    }

    #[test]
    fn test_scan_of_missing_directory_fails() {
        let result = scan_forecast_directory(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(PipelineError::DirectoryScan(..))));
    }

    #[test]
    fn test_ensure_dir_exists() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let out = dir.path().join("a").join("b");
        ensure_dir_exists(&out)?;
        assert!(out.is_dir());
        ensure_dir_exists(&out)?;

        let file = dir.path().join("file");
        fs::write(&file, "x")?;
        assert!(matches!(
            ensure_dir_exists(&file),
            Err(ExportError::NotADirectory(_))
        ));
        Ok(())
    }
}
