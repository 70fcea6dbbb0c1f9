use super::domain::ApplicationRecord;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use tracing::info;

/// Column names of the ledger file, in write order.
pub const LEDGER_HEADER: [&str; 3] = ["Konu", "Soru", "Cevap"];

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to access application ledger: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid application ledger CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Append-only record of every applicant answer. The file behind it is
/// rewritten in full on every save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: Vec<ApplicationRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the ledger, treating a missing file as an empty ledger.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no ledger on disk, starting empty");
                return Ok(Self::new());
            }
            Err(err) => return Err(err.into()),
        };

        let ledger = Self::from_reader(file)?;
        info!(path = %path.display(), records = ledger.len(), "ledger loaded");
        Ok(ledger)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LedgerError> {
        let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
        let records = csv_reader
            .deserialize::<ApplicationRecord>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), LedgerError> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        self.write_to(file)?;
        info!(path = %path.display(), records = self.len(), "ledger saved");
        Ok(())
    }

    /// Writes the header followed by one row per record.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), LedgerError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(LEDGER_HEADER)?;
        for record in &self.records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn append(&mut self, record: ApplicationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ApplicationRecord> for Ledger {
    fn from_iter<I: IntoIterator<Item = ApplicationRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
