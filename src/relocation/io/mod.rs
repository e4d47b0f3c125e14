use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::relocation::error::LoadError;

pub mod xml;
pub mod zones;

/// Resolves `file` relative to the directory of the config file, unless it is absolute,
/// explicitly relative to the working directory (`./`) or a URL.
pub fn resolve_path(config: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() || file.starts_with("./") || is_url(&file.to_string_lossy()) {
        return file.to_path_buf();
    }

    if let Some(parent) = config.parent() {
        parent.join(file)
    } else {
        file.to_path_buf()
    }
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Opens a local file or (with the `http` feature) a URL as one buffered reader. Sources ending
/// with `.gz` are decompressed on the fly.
pub fn open_source(source: &str) -> Result<Box<dyn BufRead>, LoadError> {
    let is_gz = source.ends_with(".gz");

    if is_url(source) {
        return open_url(source, is_gz);
    }

    let file = File::open(source).map_err(|e| LoadError::Open {
        path: source.to_string(),
        source: e,
    })?;

    if is_gz {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(feature = "http")]
fn open_url(url: &str, is_gz: bool) -> Result<Box<dyn BufRead>, LoadError> {
    use std::io::Cursor;

    let to_err = |e| LoadError::Http {
        url: url.to_string(),
        source: e,
    };
    let bytes = reqwest::blocking::get(url)
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .map_err(to_err)?;

    if is_gz {
        Ok(Box::new(BufReader::new(GzDecoder::new(Cursor::new(bytes)))))
    } else {
        Ok(Box::new(BufReader::new(Cursor::new(bytes))))
    }
}

#[cfg(not(feature = "http"))]
fn open_url(url: &str, _is_gz: bool) -> Result<Box<dyn BufRead>, LoadError> {
    Err(LoadError::RemoteSourceUnsupported(url.to_string()))
}
