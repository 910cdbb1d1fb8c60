//! Re-parses built archives to check the section layout end to end.

use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::NaiveDate;
use varpack_format::{
    crc32, DosDateTime, ZipBuilder, CENTRAL_HEADER_SIZE, END_OF_CENTRAL_DIRECTORY_SIZE,
    LOCAL_HEADER_SIZE,
};

#[derive(Debug, PartialEq)]
struct CentralEntry {
    crc: u32,
    size: u32,
    name: String,
    offset: u32,
}

fn frozen() -> ZipBuilder {
    let at = NaiveDate::from_ymd_opt(2025, 11, 2)
        .unwrap()
        .and_hms_opt(9, 30, 12)
        .unwrap();
    ZipBuilder::with_timestamp(DosDateTime::from(at))
}

fn sample() -> Vec<(String, Vec<u8>)> {
    vec![
        ("ICON_PNG.png".to_string(), b"\x89PNG\r\n\x1a\nfake".to_vec()),
        ("Icons/Arrows/ARROW32_PNG.png".to_string(), vec![7u8; 300]),
        ("EMPTY_SVG.svg".to_string(), vec![]),
        ("ARROW128_PNG.png".to_string(), (0..=255u8).collect()),
    ]
}

fn read_end(archive: &[u8]) -> (u16, u16, u32, u32) {
    let mut cursor = Cursor::new(archive);
    cursor
        .seek(SeekFrom::End(-(END_OF_CENTRAL_DIRECTORY_SIZE as i64)))
        .unwrap();
    assert_eq!(cursor.read_u32::<LittleEndian>().unwrap(), 0x0605_4b50);
    assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 0);
    assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 0);
    let on_disk = cursor.read_u16::<LittleEndian>().unwrap();
    let total = cursor.read_u16::<LittleEndian>().unwrap();
    let size = cursor.read_u32::<LittleEndian>().unwrap();
    let offset = cursor.read_u32::<LittleEndian>().unwrap();
    assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 0);
    (on_disk, total, size, offset)
}

fn read_central(archive: &[u8], offset: u32, count: u16) -> Vec<CentralEntry> {
    let mut cursor = Cursor::new(archive);
    cursor.seek(SeekFrom::Start(offset as u64)).unwrap();
    let mut entries = vec![];
    for _ in 0..count {
        assert_eq!(cursor.read_u32::<LittleEndian>().unwrap(), 0x0201_4b50);
        assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 20);
        assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 20);
        assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 0);
        assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 0);
        let _time = cursor.read_u16::<LittleEndian>().unwrap();
        let _date = cursor.read_u16::<LittleEndian>().unwrap();
        let crc = cursor.read_u32::<LittleEndian>().unwrap();
        let compressed = cursor.read_u32::<LittleEndian>().unwrap();
        let size = cursor.read_u32::<LittleEndian>().unwrap();
        assert_eq!(compressed, size);
        let name_len = cursor.read_u16::<LittleEndian>().unwrap();
        for _ in 0..4 {
            assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 0);
        }
        assert_eq!(cursor.read_u32::<LittleEndian>().unwrap(), 0);
        let local_offset = cursor.read_u32::<LittleEndian>().unwrap();
        let mut name = vec![0u8; name_len as usize];
        cursor.read_exact(&mut name).unwrap();
        entries.push(CentralEntry {
            crc,
            size,
            name: String::from_utf8(name).unwrap(),
            offset: local_offset,
        });
    }
    entries
}

#[test]
fn test_total_length_matches_sections() {
    let entries = sample();
    let archive = frozen().build(entries.iter().map(|(n, d)| (n, d))).unwrap();

    let local: usize = entries
        .iter()
        .map(|(n, d)| LOCAL_HEADER_SIZE + n.len() + d.len())
        .sum();
    let central: usize = entries
        .iter()
        .map(|(n, _)| CENTRAL_HEADER_SIZE + n.len())
        .sum();
    assert_eq!(archive.len(), local + central + END_OF_CENTRAL_DIRECTORY_SIZE);

    let (on_disk, total, size, offset) = read_end(&archive);
    assert_eq!(on_disk as usize, entries.len());
    assert_eq!(total as usize, entries.len());
    assert_eq!(offset as usize, local);
    assert_eq!(size as usize, central);
    assert_eq!(
        offset as usize + size as usize,
        archive.len() - END_OF_CENTRAL_DIRECTORY_SIZE
    );
}

#[test]
fn test_central_directory_points_at_local_records() {
    let entries = sample();
    let archive = frozen().build(entries.iter().map(|(n, d)| (n, d))).unwrap();
    let (_, count, _, offset) = read_end(&archive);
    let central = read_central(&archive, offset, count);

    assert_eq!(central.len(), entries.len());
    for (entry, (name, data)) in central.iter().zip(entries.iter()) {
        assert_eq!(&entry.name, name);
        assert_eq!(entry.size as usize, data.len());
        assert_eq!(entry.crc, crc32(data));

        let mut cursor = Cursor::new(&archive[..]);
        cursor.seek(SeekFrom::Start(entry.offset as u64)).unwrap();
        assert_eq!(cursor.read_u32::<LittleEndian>().unwrap(), 0x0403_4b50);
        cursor.seek(SeekFrom::Current(10)).unwrap();
        assert_eq!(cursor.read_u32::<LittleEndian>().unwrap(), entry.crc);
        cursor.seek(SeekFrom::Current(8)).unwrap();
        let name_len = cursor.read_u16::<LittleEndian>().unwrap();
        assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 0);

        let start = entry.offset as usize + LOCAL_HEADER_SIZE + name_len as usize;
        assert_eq!(&archive[start..start + data.len()], &data[..]);
    }
}

#[test]
fn test_shared_timestamp() {
    let builder = frozen();
    let stamp = builder.modified();
    let archive = builder.build(sample()).unwrap();
    let (_, count, _, offset) = read_end(&archive);

    let mut cursor = Cursor::new(&archive[..]);
    cursor.seek(SeekFrom::Start(offset as u64)).unwrap();
    for _ in 0..count {
        cursor.seek(SeekFrom::Current(12)).unwrap();
        assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), stamp.time);
        assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), stamp.date);
        cursor.seek(SeekFrom::Current(12)).unwrap();
        let name_len = cursor.read_u16::<LittleEndian>().unwrap();
        cursor
            .seek(SeekFrom::Current(16 + name_len as i64))
            .unwrap();
    }
}

#[test]
fn test_frozen_clock_is_byte_identical() {
    let builder = frozen();
    assert_eq!(builder.build(sample()).unwrap(), builder.build(sample()).unwrap());
}
