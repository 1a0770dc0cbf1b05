use noodles::sam;

use crate::consts::UNALIGNED_REFERENCE;
use crate::errors::CountingError;
use crate::models::Strand;

///
/// Alignment flag of a read, restricted to the codes a single-end small RNA
/// alignment produces.
///
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ReadFlag {
    Aligned(Strand),
    Unaligned,
    Unknown(u16),
}

impl From<u16> for ReadFlag {
    fn from(flag: u16) -> Self {
        match flag {
            0 => ReadFlag::Aligned(Strand::Forward),
            16 => ReadFlag::Aligned(Strand::Reverse),
            4 => ReadFlag::Unaligned,
            other => ReadFlag::Unknown(other),
        }
    }
}

///
/// The parts of a SAM record needed for counting, borrowed from the record.
///
/// Coordinates are 1-based and the end is inclusive: `end = start + len - 1`.
/// A record whose end does not fit in an `i64` is rejected when it is read, so
/// [`AlignedRead::end`] never overflows.
///
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AlignedRead<'r> {
    pub name: Option<&'r str>,
    pub flags: u16,
    pub chr: &'r str,
    pub start: i64,
    pub len: i64,
    end: i64,
}

impl AlignedRead<'_> {
    pub fn flag(&self) -> ReadFlag {
        ReadFlag::from(self.flags)
    }

    ///
    /// Last aligned base of the read.
    ///
    pub fn end(&self) -> i64 {
        self.end
    }
}

fn field_as_str<'r>(field: &'r [u8], what: &str) -> Result<&'r str, CountingError> {
    std::str::from_utf8(field)
        .map_err(|_| CountingError::MalformedRecord(format!("{what} is not valid UTF-8")))
}

impl<'r> TryFrom<&'r sam::Record> for AlignedRead<'r> {
    type Error = CountingError;

    fn try_from(record: &'r sam::Record) -> Result<Self, Self::Error> {
        let name = match record.name() {
            Some(name) => Some(field_as_str(name, "read name")?),
            None => None,
        };

        let flags = record
            .flags()
            .map_err(|e| CountingError::MalformedRecord(format!("invalid flag: {e}")))?;

        let chr = match record.reference_sequence_name() {
            Some(chr) => field_as_str(chr, "reference name")?,
            None => UNALIGNED_REFERENCE,
        };

        let start = match record.alignment_start() {
            Some(Ok(pos)) => i64::try_from(pos.get()).map_err(|_| {
                CountingError::MalformedRecord(format!("start position {} out of range", pos))
            })?,
            Some(Err(e)) => {
                return Err(CountingError::MalformedRecord(format!(
                    "invalid start position: {e}"
                )));
            }
            None => 0,
        };

        let len = i64::try_from(record.sequence().len())
            .map_err(|_| CountingError::MalformedRecord("sequence too long".to_string()))?;

        let end = start
            .checked_add(len)
            .and_then(|end| end.checked_sub(1))
            .ok_or_else(|| {
                CountingError::MalformedRecord(format!(
                    "alignment end overflows: start {start}, length {len}"
                ))
            })?;

        Ok(AlignedRead {
            name,
            flags: u16::from(flags),
            chr,
            start,
            len,
            end,
        })
    }
}

///
/// Parse one SAM data line (without its line terminator) into a lazy record.
///
pub fn parse_record(line: &[u8]) -> Result<sam::Record, CountingError> {
    sam::Record::try_from(line).map_err(|e| CountingError::MalformedRecord(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn forward_line() -> &'static [u8] {
        b"read_1\t0\tchr1\t100\t255\t20M\t*\t0\t0\tTGAGGTAGTAGGTTGTATAG\tIIIIIIIIIIIIIIIIIIII\tNM:i:0"
    }

    #[rstest]
    fn test_parse_forward_read(forward_line: &[u8]) {
        let record = parse_record(forward_line).unwrap();
        let read = AlignedRead::try_from(&record).unwrap();

        assert_eq!(read.name, Some("read_1"));
        assert_eq!(read.flag(), ReadFlag::Aligned(Strand::Forward));
        assert_eq!(read.chr, "chr1");
        assert_eq!(read.start, 100);
        assert_eq!(read.len, 20);
        assert_eq!(read.end(), 119);
    }

    #[rstest]
    fn test_unaligned_read_has_no_reference() {
        let record = parse_record(b"read_2\t4\t*\t0\t0\t*\t*\t0\t0\tACGTACGT\t*").unwrap();
        let read = AlignedRead::try_from(&record).unwrap();

        assert_eq!(read.flag(), ReadFlag::Unaligned);
        assert_eq!(read.chr, UNALIGNED_REFERENCE);
        assert_eq!(read.start, 0);
    }

    #[rstest]
    #[case(0, ReadFlag::Aligned(Strand::Forward))]
    #[case(16, ReadFlag::Aligned(Strand::Reverse))]
    #[case(4, ReadFlag::Unaligned)]
    #[case(272, ReadFlag::Unknown(272))]
    #[case(256, ReadFlag::Unknown(256))]
    fn test_read_flags(#[case] flag: u16, #[case] expected: ReadFlag) {
        assert_eq!(ReadFlag::from(flag), expected);
    }

    #[rstest]
    fn test_bad_start_is_malformed() {
        let record =
            parse_record(b"read_1\t0\tchr1\tabc\t255\t5M\t*\t0\t0\tTGAGG\t*").unwrap();
        let res = AlignedRead::try_from(&record);
        assert!(matches!(res, Err(CountingError::MalformedRecord(_))));
    }

    #[rstest]
    fn test_end_overflow_is_malformed() {
        let record = parse_record(
            b"read_1\t0\tchr1\t9223372036854775800\t255\t20M\t*\t0\t0\tTGAGGTAGTAGGTTGTATAG\t*",
        )
        .unwrap();
        let res = AlignedRead::try_from(&record);
        assert!(matches!(res, Err(CountingError::MalformedRecord(_))));
    }

    #[rstest]
    fn test_invalid_utf8_name_is_malformed() {
        let record =
            parse_record(b"r\xff1\t0\tchr1\t100\t255\t5M\t*\t0\t0\tTGAGG\t*").unwrap();
        let res = AlignedRead::try_from(&record);
        assert!(matches!(res, Err(CountingError::MalformedRecord(_))));
    }
}
