//! Minimal ZIP writer.
//!
//! Entries are STORED (no compression). Output is deterministic: every
//! entry carries the DOS timestamp 1980-01-01 00:00.

use thiserror::Error;

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIGNATURE: u32 = 0x0605_4b50;

pub const LOCAL_HEADER_LEN: usize = 30;
pub const CENTRAL_HEADER_LEN: usize = 46;
pub const END_OF_CENTRAL_DIR_LEN: usize = 22;

const VERSION: u16 = 20;
const METHOD_STORED: u16 = 0;
const FLAG_UTF8_NAME: u16 = 0x0800;
const DOS_TIME: u16 = 0;
const DOS_DATE: u16 = (1 << 5) | 1;

const CRC32_TABLE: [u32; 256] = build_crc32_table();

const fn build_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 {
                0xEDB8_8320 ^ (c >> 1)
            } else {
                c >> 1
            };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// IEEE 802.3 CRC-32.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc = CRC32_TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc ^ 0xFFFF_FFFF
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip entry '{0}' is larger than 4 GiB")]
    EntryTooLarge(String),
    #[error("zip entry name '{0}' is longer than 65535 bytes")]
    NameTooLong(String),
    #[error("zip archive exceeds 65535 entries or 4 GiB")]
    ArchiveTooLarge,
}

/// A named buffer to pack.
#[derive(Debug, Clone)]
pub struct ZipEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl ZipEntry {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

struct CentralRecord<'a> {
    name: &'a [u8],
    flags: u16,
    crc: u32,
    size: u32,
    offset: u32,
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn checked_u32(value: usize) -> Result<u32, ArchiveError> {
    u32::try_from(value).map_err(|_| ArchiveError::ArchiveTooLarge)
}

/// Pack `entries` into a ZIP archive, in order.
pub fn create_zip_buffer(entries: &[ZipEntry]) -> Result<Vec<u8>, ArchiveError> {
    let entry_count = u16::try_from(entries.len()).map_err(|_| ArchiveError::ArchiveTooLarge)?;

    let mut out = Vec::new();
    let mut records = Vec::with_capacity(entries.len());

    for entry in entries {
        let name = entry.name.as_bytes();
        let name_len =
            u16::try_from(name.len()).map_err(|_| ArchiveError::NameTooLong(entry.name.clone()))?;
        let size = u32::try_from(entry.data.len())
            .map_err(|_| ArchiveError::EntryTooLarge(entry.name.clone()))?;
        let flags = if entry.name.is_ascii() { 0 } else { FLAG_UTF8_NAME };
        let crc = crc32(&entry.data);
        let offset = checked_u32(out.len())?;

        put_u32(&mut out, LOCAL_HEADER_SIGNATURE);
        put_u16(&mut out, VERSION);
        put_u16(&mut out, flags);
        put_u16(&mut out, METHOD_STORED);
        put_u16(&mut out, DOS_TIME);
        put_u16(&mut out, DOS_DATE);
        put_u32(&mut out, crc);
        put_u32(&mut out, size); // compressed
        put_u32(&mut out, size); // uncompressed
        put_u16(&mut out, name_len);
        put_u16(&mut out, 0); // extra field
        out.extend_from_slice(name);
        out.extend_from_slice(&entry.data);

        records.push(CentralRecord {
            name,
            flags,
            crc,
            size,
            offset,
        });
    }

    let central_offset = checked_u32(out.len())?;

    for record in &records {
        put_u32(&mut out, CENTRAL_HEADER_SIGNATURE);
        put_u16(&mut out, VERSION); // made by
        put_u16(&mut out, VERSION); // needed
        put_u16(&mut out, record.flags);
        put_u16(&mut out, METHOD_STORED);
        put_u16(&mut out, DOS_TIME);
        put_u16(&mut out, DOS_DATE);
        put_u32(&mut out, record.crc);
        put_u32(&mut out, record.size);
        put_u32(&mut out, record.size);
        put_u16(&mut out, record.name.len() as u16);
        put_u16(&mut out, 0); // extra field
        put_u16(&mut out, 0); // comment
        put_u16(&mut out, 0); // disk number
        put_u16(&mut out, 0); // internal attributes
        put_u32(&mut out, 0); // external attributes
        put_u32(&mut out, record.offset);
        out.extend_from_slice(record.name);
    }

    let central_size = checked_u32(out.len())? - central_offset;

    put_u32(&mut out, END_OF_CENTRAL_DIR_SIGNATURE);
    put_u16(&mut out, 0); // this disk
    put_u16(&mut out, 0); // central directory disk
    put_u16(&mut out, entry_count);
    put_u16(&mut out, entry_count);
    put_u32(&mut out, central_size);
    put_u32(&mut out, central_offset);
    put_u16(&mut out, 0); // comment length

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([buf[at], buf[at + 1]])
    }

    fn u32_at(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
    }

    #[test]
    fn test_crc32_known_vectors() {
        assert_eq!(crc32(b""), 0);
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(
            crc32(b"The quick brown fox jumps over the lazy dog"),
            0x414F_A339
        );
    }

    #[test]
    fn test_empty_archive_is_bare_end_record() {
        let zip = create_zip_buffer(&[]).unwrap();
        assert_eq!(zip.len(), END_OF_CENTRAL_DIR_LEN);
        assert_eq!(u32_at(&zip, 0), END_OF_CENTRAL_DIR_SIGNATURE);
        assert_eq!(u16_at(&zip, 10), 0);
    }

    #[test]
    fn test_single_entry_layout() {
        let zip = create_zip_buffer(&[ZipEntry::new("a.txt", b"hello".to_vec())]).unwrap();

        // local header
        assert_eq!(u32_at(&zip, 0), LOCAL_HEADER_SIGNATURE);
        assert_eq!(u16_at(&zip, 4), 20);
        assert_eq!(u16_at(&zip, 8), 0, "stored");
        assert_eq!(u16_at(&zip, 12), 0x21, "1980-01-01");
        assert_eq!(u32_at(&zip, 14), crc32(b"hello"));
        assert_eq!(u32_at(&zip, 18), 5);
        assert_eq!(u32_at(&zip, 22), 5);
        assert_eq!(u16_at(&zip, 26), 5);
        assert_eq!(&zip[30..35], b"a.txt");
        assert_eq!(&zip[35..40], b"hello");

        // central directory
        let central = LOCAL_HEADER_LEN + 5 + 5;
        assert_eq!(u32_at(&zip, central), CENTRAL_HEADER_SIGNATURE);
        assert_eq!(u32_at(&zip, central + 42), 0, "local header offset");
        assert_eq!(&zip[central + 46..central + 51], b"a.txt");

        // end of central directory
        let end = central + CENTRAL_HEADER_LEN + 5;
        assert_eq!(u32_at(&zip, end), END_OF_CENTRAL_DIR_SIGNATURE);
        assert_eq!(u16_at(&zip, end + 8), 1);
        assert_eq!(u16_at(&zip, end + 10), 1);
        assert_eq!(u32_at(&zip, end + 12), (CENTRAL_HEADER_LEN + 5) as u32);
        assert_eq!(u32_at(&zip, end + 16), central as u32);
        assert_eq!(zip.len(), end + END_OF_CENTRAL_DIR_LEN);
    }

    #[test]
    fn test_offsets_accumulate() {
        let zip = create_zip_buffer(&[
            ZipEntry::new("one", vec![1u8; 10]),
            ZipEntry::new("two", vec![2u8; 3]),
        ])
        .unwrap();

        let second_local = LOCAL_HEADER_LEN + 3 + 10;
        assert_eq!(u32_at(&zip, second_local), LOCAL_HEADER_SIGNATURE);

        let central = second_local + LOCAL_HEADER_LEN + 3 + 3;
        let second_central = central + CENTRAL_HEADER_LEN + 3;
        assert_eq!(u32_at(&zip, second_central + 42), second_local as u32);
    }

    #[test]
    fn test_output_is_deterministic() {
        let entries = [ZipEntry::new("report.csv", b"a,b\n1,2\n".to_vec())];
        assert_eq!(
            create_zip_buffer(&entries).unwrap(),
            create_zip_buffer(&entries).unwrap()
        );
    }

    #[test]
    fn test_non_ascii_names_set_utf8_flag() {
        let zip = create_zip_buffer(&[ZipEntry::new("résumé.txt", b"x".to_vec())]).unwrap();
        assert_eq!(u16_at(&zip, 6), FLAG_UTF8_NAME);
    }
}
