use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::relocation::error::{LoadError, WriteError};
use crate::relocation::io::open_source;

pub mod attributes;
pub mod facilities;
pub mod population;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

pub fn read_from_file<T>(file_path: &str) -> Result<T, LoadError>
where
    T: DeserializeOwned,
{
    use quick_xml::de::Deserializer;

    if !(file_path.ends_with(".xml") || file_path.ends_with(".xml.gz")) {
        return Err(LoadError::UnsupportedFormat(file_path.to_string()));
    }

    let reader = open_source(file_path)?;
    let mut de = Deserializer::from_reader(reader);
    serde_path_to_error::deserialize(&mut de).map_err(|err| LoadError::Xml {
        path: file_path.to_string(),
        at: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

// Adapter from std::fmt::Write to std::io::Write. Needed because of an odd API of quick-xml.
// See https://github.com/tafia/quick-xml/issues/499 for more details.
struct ToFmtWrite<T>(pub T);

impl<T> std::fmt::Write for ToFmtWrite<T>
where
    T: Write,
{
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.0.write_all(s.as_bytes()).map_err(|_| std::fmt::Error)
    }
}

pub fn write_to_file<T: Serialize>(
    serde_message: &T,
    path: &Path,
    dtd_spec: &str,
) -> Result<(), WriteError> {
    let is_gz = path.extension().is_some_and(|e| e.eq("gz"));
    let is_xml = path.extension().is_some_and(|e| e.eq("xml"));
    if !is_gz && !is_xml {
        return Err(WriteError::UnsupportedFormat(path.to_path_buf()));
    }

    if let Some(prefix) = path.parent() {
        fs::create_dir_all(prefix).map_err(|e| WriteError::Create {
            path: prefix.to_path_buf(),
            source: e,
        })?;
    }
    let file = File::create(path).map_err(|e| WriteError::Create {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file_writer = BufWriter::new(file);

    info!("Starting to write file to: {path:?}");
    if is_gz {
        let mut compressor = flate2::write::GzEncoder::new(file_writer, Compression::fast());
        write_document(serde_message, &mut compressor, path, dtd_spec)?;
        compressor
            .finish()
            .and_then(|mut inner| inner.flush())
            .map_err(|e| io_error(path, e))?;
    } else {
        let mut file_writer = file_writer;
        write_document(serde_message, &mut file_writer, path, dtd_spec)?;
        file_writer.flush().map_err(|e| io_error(path, e))?;
    }
    info!("Finished writing file to: {path:?}");
    Ok(())
}

fn write_document<T: Serialize, W: Write>(
    serde_message: &T,
    writer: &mut W,
    path: &Path,
    dtd_spec: &str,
) -> Result<(), WriteError> {
    writer
        .write_all(XML_DECLARATION.as_bytes())
        .and_then(|_| writer.write_all(dtd_spec.as_bytes()))
        .and_then(|_| writer.write_all(b"\n"))
        .map_err(|e| io_error(path, e))?;

    let mut fmt_writer = ToFmtWrite(&mut *writer);
    let mut serializer = quick_xml::se::Serializer::new(&mut fmt_writer);
    serializer.indent(' ', 4);
    serde_message
        .serialize(serializer)
        .map_err(|e| WriteError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
    writer.write_all(b"\n").map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> WriteError {
    WriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::relocation::error::{LoadError, WriteError};
    use crate::relocation::io::xml::attributes::IOAttributes;
    use crate::relocation::io::xml::{read_from_file, write_to_file};

    // only testing the invalid cases here, since the other cases
    // are implicitly tested when data containers are loaded e.g. in
    // facilities and population
    #[test]
    fn unsupported_ending() {
        let result: Result<IOAttributes, LoadError> =
            read_from_file("file-path-with-unsupported.ending");
        assert!(matches!(result, Err(LoadError::UnsupportedFormat(_))));
    }

    #[test]
    fn unsupported_ending_on_write() {
        let result = write_to_file(
            &IOAttributes::default(),
            &PathBuf::from("file-path-with-unsupported.ending"),
            "",
        );
        assert!(matches!(result, Err(WriteError::UnsupportedFormat(_))));
    }
}
