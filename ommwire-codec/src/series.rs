//! Series: uniform rows with no key, index or action.
//!
//! Wire layout: flags byte (bit 0 summary), container type tag, the
//! optional u16ob-framed summary, a u16 row count, then u16ob-framed rows
//! back to back.

use bytes::Bytes;

use ommwire_core::{encode_with_growth, DataType, OmmError, Result, WireCursor, WireWriter};

use crate::payload::{EntryData, Payload};

const HAS_SUMMARY: u8 = 0x01;

/// Encode-side series builder.
#[derive(Debug, Clone)]
pub struct Series {
    container_type: DataType,
    summary: Option<Payload>,
    rows: Vec<Payload>,
}

impl Series {
    /// Creates a series of `container_type` rows.
    #[must_use]
    pub fn new(container_type: DataType) -> Self {
        Self {
            container_type,
            summary: None,
            rows: Vec::new(),
        }
    }

    /// Attaches summary data. Its container type must match the row
    /// container type.
    pub fn with_summary(mut self, summary: Payload) -> Result<Self> {
        if summary.container_type != self.container_type {
            return Err(OmmError::TypeMismatch {
                expected: self.container_type,
                actual: summary.container_type,
            });
        }
        self.summary = Some(summary);
        Ok(self)
    }

    /// Appends a row.
    pub fn push(&mut self, row: Payload) -> Result<&mut Self> {
        if row.container_type != self.container_type {
            return Err(OmmError::TypeMismatch {
                expected: self.container_type,
                actual: row.container_type,
            });
        }
        self.rows.push(row);
        Ok(self)
    }

    /// Number of rows added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when no rows have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the complete series.
    pub fn encode_into(&self, w: &mut WireWriter) -> Result<()> {
        if self.rows.len() > u16::MAX as usize {
            return Err(OmmError::InvalidData(format!(
                "series of {} rows exceeds u16 count",
                self.rows.len()
            )));
        }
        let flags = if self.summary.is_some() { HAS_SUMMARY } else { 0 };
        w.put_u8(flags)?;
        w.put_u8(self.container_type.as_u8())?;
        if let Some(summary) = &self.summary {
            w.put_buf16ob(&summary.data)?;
        }
        w.put_u16(self.rows.len() as u16)?;
        for row in &self.rows {
            w.put_buf16ob(&row.data)?;
        }
        Ok(())
    }

    /// Encodes into an owned buffer, growing as needed.
    pub fn encode(&self) -> Result<Bytes> {
        encode_with_growth(256, |w| self.encode_into(w))
    }
}

/// Decoded series header over an undecoded row region.
#[derive(Debug, Clone)]
pub struct SeriesView {
    container_type: DataType,
    summary: Option<Bytes>,
    count: u16,
    body: Bytes,
}

impl SeriesView {
    /// Parses the header; rows stay encoded until iterated.
    pub fn decode(raw: Bytes) -> Result<Self> {
        let mut cur = WireCursor::new(raw);
        let flags = cur.u8()?;
        let container_type = DataType::from_u8(cur.u8()?)?;
        let summary = if flags & HAS_SUMMARY != 0 {
            Some(cur.buf16ob()?)
        } else {
            None
        };
        let count = cur.u16()?;
        Ok(Self {
            container_type,
            summary,
            count,
            body: cur.take_rest(),
        })
    }

    /// Container type of the rows.
    #[must_use]
    pub fn container_type(&self) -> DataType {
        self.container_type
    }

    /// Summary data, when present.
    #[must_use]
    pub fn summary(&self) -> Option<Payload> {
        self.summary
            .as_ref()
            .map(|data| Payload::new(self.container_type, data.clone()))
    }

    /// Declared row count.
    #[must_use]
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Iterates the rows from the start; restartable.
    #[must_use]
    pub fn iter(&self) -> SeriesIter {
        SeriesIter {
            container_type: self.container_type,
            remaining: self.count,
            cursor: WireCursor::new(self.body.clone()),
            failed: false,
        }
    }

    /// Materializes an owned builder with deep copies of every row.
    pub fn to_owned_series(&self) -> Result<Series> {
        let mut series = Series::new(self.container_type);
        if let Some(summary) = self.summary() {
            series = series.with_summary(summary.to_owned_copy())?;
        }
        for row in self.iter() {
            series.push(row?.payload().to_owned_copy())?;
        }
        Ok(series)
    }
}

/// One decoded series row.
#[derive(Debug, Clone)]
pub struct SeriesRow {
    container_type: DataType,
    data: EntryData,
}

impl SeriesRow {
    /// The row's undecoded data.
    #[must_use]
    pub fn data(&self) -> &EntryData {
        &self.data
    }

    /// The row payload wrapped with the series container type.
    #[must_use]
    pub fn payload(&self) -> Payload {
        Payload::new(self.container_type, self.data.raw().clone())
    }
}

/// Iterator over series rows.
#[derive(Debug)]
pub struct SeriesIter {
    container_type: DataType,
    remaining: u16,
    cursor: WireCursor,
    failed: bool,
}

impl Iterator for SeriesIter {
    type Item = Result<SeriesRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        match self.cursor.buf16ob() {
            Ok(raw) => {
                self.remaining -= 1;
                Some(Ok(SeriesRow {
                    container_type: self.container_type,
                    data: EntryData::new(self.container_type.as_u8(), raw),
                }))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
