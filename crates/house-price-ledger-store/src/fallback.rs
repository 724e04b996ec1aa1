use std::fs::{File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use house_price_ledger_core::Record;

use crate::StoreFailure;

pub const DEFAULT_FALLBACK_FILE: &str = "prediksi_fallback.csv";

pub const FALLBACK_HEADER: [&str; 6] = [
    "timestamp",
    "bedroom",
    "bathroom",
    "land_clean",
    "building_clean",
    "price_pred",
];

/// Append-only CSV log of records written while the primary store is
/// unavailable. A missing file means no history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackStore {
    path: PathBuf,
}

impl FallbackStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row, writing the header first when the file is empty.
    ///
    /// The file is held under an exclusive lock for the whole write so
    /// concurrent writers never interleave rows or duplicate the header.
    ///
    /// # Errors
    /// Returns [`StoreFailure::Io`] when the file cannot be opened, locked,
    /// written or synced.
    pub fn append(&self, record: &Record) -> Result<(), StoreFailure> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|err| StoreFailure::io(&self.path, err))?;

        file.lock()
            .map_err(|err| StoreFailure::io(&self.path, err))?;

        let written = self.append_locked(&mut file, record);

        if let Err(err) = file.unlock() {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to release fallback file lock");
        }

        written
    }

    fn append_locked(&self, file: &mut File, record: &Record) -> Result<(), StoreFailure> {
        let len = file
            .metadata()
            .map_err(|err| StoreFailure::io(&self.path, err))?
            .len();

        let mut payload = Vec::new();
        if len > 0 && !self.ends_with_newline(file)? {
            payload.push(b'\n');
        }
        payload.extend(self.encode(record, len == 0)?);

        file.write_all(&payload)
            .and_then(|()| file.flush())
            .and_then(|()| file.sync_data())
            .map_err(|err| StoreFailure::io(&self.path, err))
    }

    fn ends_with_newline(&self, file: &mut File) -> Result<bool, StoreFailure> {
        let mut last = [0_u8; 1];
        file.seek(SeekFrom::End(-1))
            .and_then(|_| file.read_exact(&mut last))
            .map_err(|err| StoreFailure::io(&self.path, err))?;
        Ok(last[0] == b'\n')
    }

    fn encode(&self, record: &Record, with_header: bool) -> Result<Vec<u8>, StoreFailure> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        if with_header {
            writer
                .write_record(FALLBACK_HEADER)
                .map_err(|err| StoreFailure::from_csv(&self.path, err))?;
        }
        writer
            .serialize(record)
            .map_err(|err| StoreFailure::from_csv(&self.path, err))?;

        writer
            .into_inner()
            .map_err(|err| StoreFailure::io(&self.path, err.into_error()))
    }

    /// Reads every row, most recent first. Rows sharing a timestamp keep the
    /// most recently appended one first.
    ///
    /// # Errors
    /// Returns [`StoreFailure::Malformed`] on a header mismatch, a row with
    /// the wrong column count or an unparsable field, and
    /// [`StoreFailure::Io`] when the file exists but cannot be read.
    pub fn read_all(&self) -> Result<Vec<Record>, StoreFailure> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreFailure::io(&self.path, err)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));

        let headers = reader
            .headers()
            .map_err(|err| StoreFailure::from_csv(&self.path, err))?
            .clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        if !headers.iter().eq(FALLBACK_HEADER) {
            return Err(StoreFailure::Malformed {
                path: self.path.clone(),
                line: 1,
                detail: format!(
                    "expected header {:?}, found {:?}",
                    FALLBACK_HEADER.join(","),
                    headers.iter().collect::<Vec<_>>().join(",")
                ),
            });
        }

        let mut records = Vec::new();
        for row in reader.deserialize::<Record>() {
            records.push(row.map_err(|err| StoreFailure::from_csv(&self.path, err))?);
        }

        records.reverse();
        records.sort_by(|lhs, rhs| rhs.created_at().cmp(&lhs.created_at()));
        Ok(records)
    }
}
