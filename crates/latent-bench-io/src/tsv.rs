use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{IoError, IoResult};

/// Tab-separated writer for serde records, header taken from the first record.
pub struct TsvWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl TsvWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> IoResult<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| IoError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> TsvWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        TsvWriter {
            inner: csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer),
        }
    }

    pub fn serialize<T: Serialize>(&mut self, record: &T) -> IoResult<()> {
        self.inner.serialize(record)?;
        Ok(())
    }

    /// Raw row, for tables whose columns are only known at run time.
    pub fn write_row<I, S>(&mut self, fields: I) -> IoResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.inner.write_record(fields)?;
        Ok(())
    }

    pub fn finish(mut self) -> IoResult<W> {
        self.inner.flush()?;
        self.inner
            .into_inner()
            .map_err(|e| IoError::Io(e.into_error()))
    }
}

/// Write all `records` to `path`.
pub fn write_tsv<T: Serialize>(path: impl AsRef<Path>, records: &[T]) -> IoResult<()> {
    let mut writer = TsvWriter::create(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        pair: String,
        tval: f64,
        pval: f64,
    }

    #[test]
    fn test_serialize_with_header() {
        let mut writer = TsvWriter::from_writer(Vec::new());
        writer
            .serialize(&Row {
                pair: "qname-age_src-a_dest-b".into(),
                tval: 1.5,
                pval: 0.25,
            })
            .unwrap();
        let bytes = writer.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "pair\ttval\tpval\nqname-age_src-a_dest-b\t1.5\t0.25\n");
    }

    #[test]
    fn test_write_rows() {
        let mut writer = TsvWriter::from_writer(Vec::new());
        writer.write_row(["qname", "vae"]).unwrap();
        writer.write_row(["age", "0.5"]).unwrap();
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(text, "qname\tvae\nage\t0.5\n");
    }

    #[test]
    fn test_write_tsv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let rows = vec![Row {
            pair: "p".into(),
            tval: 0.0,
            pval: 1.0,
        }];
        write_tsv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "pair\ttval\tpval\np\t0.0\t1.0\n");
    }
}
