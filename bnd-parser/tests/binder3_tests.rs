//! BND3 parse tests over in-memory fixtures, in both byte orders.

use bnd_parser::{Binder3File, ByteOrder, Error, read_entry_data};
use pretty_assertions::assert_eq;
use std::io::Cursor;

const HEADER_SIZE: usize = 32;
const ENTRY_HEADER_SIZE: usize = 20;

fn put_u32(out: &mut Vec<u8>, value: u32, order: ByteOrder) {
    match order {
        ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
        ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
    }
}

/// Build a BND3 container holding `entries` as (id, name, payload).
fn build_bnd3(entries: &[(u32, &str, &[u8])], order: ByteOrder) -> Vec<u8> {
    let headers_end = HEADER_SIZE + entries.len() * ENTRY_HEADER_SIZE;

    let mut name_offsets = Vec::new();
    let mut names = Vec::new();
    for (_, name, _) in entries {
        name_offsets.push(headers_end + names.len());
        names.extend_from_slice(name.as_bytes());
        names.push(0);
    }

    let data_offset = headers_end + names.len();
    let mut data_offsets = Vec::new();
    let mut payloads = Vec::new();
    for (_, _, payload) in entries {
        data_offsets.push(data_offset + payloads.len());
        payloads.extend_from_slice(payload);
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"BND307D7R6\0\0");
    put_u32(&mut out, 0x74, order); // version marker, doubles as probe
    put_u32(&mut out, entries.len() as u32, order);
    put_u32(&mut out, data_offset as u32, order);
    put_u32(&mut out, 0, order);
    put_u32(&mut out, 0, order);

    for (i, (id, _, payload)) in entries.iter().enumerate() {
        put_u32(&mut out, *id, order);
        put_u32(&mut out, name_offsets[i] as u32, order);
        put_u32(&mut out, data_offsets[i] as u32, order);
        put_u32(&mut out, payload.len() as u32, order);
        put_u32(&mut out, payload.len() as u32, order);
    }
    out.extend_from_slice(&names);
    out.extend_from_slice(&payloads);
    out
}

#[test]
fn empty_container_parses_to_empty_list() {
    let data = build_bnd3(&[], ByteOrder::Little);
    let bnd = Binder3File::parse(&mut Cursor::new(&data)).unwrap();
    assert_eq!(bnd.byte_order, ByteOrder::Little);
    assert!(bnd.entries.is_empty());
}

#[test]
fn two_entries_decode_identically_in_either_byte_order() {
    let entries: &[(u32, &str, &[u8])] =
        &[(10, "a.txt", b"alpha"), (11, "sub/b.dat", b"bravo-data")];

    let native = build_bnd3(entries, ByteOrder::Little);
    let swapped = build_bnd3(entries, ByteOrder::Big);

    let bnd_native = Binder3File::parse(&mut Cursor::new(&native)).unwrap();
    let bnd_swapped = Binder3File::parse(&mut Cursor::new(&swapped)).unwrap();

    assert_eq!(bnd_native.byte_order, ByteOrder::Little);
    assert_eq!(bnd_swapped.byte_order, ByteOrder::Big);
    assert_eq!(bnd_native.entries, bnd_swapped.entries);

    assert_eq!(bnd_native.entries.len(), 2);
    assert_eq!(bnd_native.entries[0].id, 10);
    assert_eq!(bnd_native.entries[0].name, "a.txt");
    assert_eq!(bnd_native.entries[1].name, "sub/b.dat");

    // Offsets are absolute: reading them back yields the payloads
    let mut f = Cursor::new(&native);
    for (entry, (_, _, payload)) in bnd_native.entries.iter().zip(entries) {
        let data = read_entry_data(&mut f, u64::from(entry.offset), entry.size).unwrap();
        assert_eq!(&data, payload);
    }
}

#[test]
fn entries_preserve_header_table_order() {
    // Ids deliberately unsorted
    let entries: &[(u32, &str, &[u8])] = &[
        (30, "c.bin", b"c"),
        (10, "a.bin", b"a"),
        (20, "b.bin", b"b"),
    ];
    let data = build_bnd3(entries, ByteOrder::Little);
    let bnd = Binder3File::parse(&mut Cursor::new(&data)).unwrap();

    let ids: Vec<u32> = bnd.entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![30, 10, 20]);
}

#[test]
fn signature_prefix_is_required() {
    let mut data = build_bnd3(&[], ByteOrder::Little);
    data[0] = b'X';
    let err = Binder3File::parse(&mut Cursor::new(&data)).unwrap_err();
    assert!(matches!(err, Error::InvalidSignature(_)), "actual error: {err:?}");
}

#[test]
fn trailing_signature_characters_are_ignored() {
    let mut data = build_bnd3(&[], ByteOrder::Little);
    data[4..12].copy_from_slice(b"08X14Y4\0");
    assert!(Binder3File::parse(&mut Cursor::new(&data)).is_ok());
}

#[test]
fn unknown_version_marker_is_fatal() {
    let mut data = build_bnd3(&[], ByteOrder::Little);
    data[12..16].copy_from_slice(&0x55u32.to_le_bytes());
    let err = Binder3File::parse(&mut Cursor::new(&data)).unwrap_err();
    assert!(
        matches!(err, Error::UnknownFormatMarker(0x55)),
        "actual error: {err:?}",
    );
}

#[test]
fn nonzero_reserved_field_is_fatal() {
    let mut data = build_bnd3(&[], ByteOrder::Little);
    data[24..28].copy_from_slice(&1u32.to_le_bytes());
    let err = Binder3File::parse(&mut Cursor::new(&data)).unwrap_err();
    assert!(
        matches!(
            err,
            Error::UnexpectedFieldValue {
                field: "reserved0",
                value: 1,
            }
        ),
        "actual error: {err:?}",
    );
}

#[test]
fn name_offset_beyond_stream_is_fatal() {
    let entries: &[(u32, &str, &[u8])] = &[(1, "a.txt", b"a")];
    let mut data = build_bnd3(entries, ByteOrder::Little);
    // Entry header name-offset field
    data[36..40].copy_from_slice(&0xFFFF_0000u32.to_le_bytes());
    let err = Binder3File::parse(&mut Cursor::new(&data)).unwrap_err();
    assert!(matches!(err, Error::OutOfBounds { .. }), "actual error: {err:?}");
}

#[test]
fn zero_name_offset_is_honored_literally() {
    let entries: &[(u32, &str, &[u8])] = &[(1, "a.txt", b"a")];
    let mut data = build_bnd3(entries, ByteOrder::Little);
    data[36..40].copy_from_slice(&0u32.to_le_bytes());

    // Offset 0 points at the signature, which reads as a NUL-terminated
    // ASCII string
    let bnd = Binder3File::parse(&mut Cursor::new(&data)).unwrap();
    assert_eq!(bnd.entries[0].name, "BND307D7R6");
}

#[test]
fn shift_jis_names_decode() {
    // "テスト.txt" in Shift-JIS
    let mut data = build_bnd3(&[(1, "placeholder", b"x")], ByteOrder::Little);
    let name_offset = HEADER_SIZE + ENTRY_HEADER_SIZE;
    let sjis = [
        0x83, 0x65, 0x83, 0x58, 0x83, 0x67, b'.', b't', b'x', b't', 0,
    ];
    data[name_offset..name_offset + sjis.len()].copy_from_slice(&sjis);

    let bnd = Binder3File::parse(&mut Cursor::new(&data)).unwrap();
    assert_eq!(bnd.entries[0].name, "テスト.txt");
}
