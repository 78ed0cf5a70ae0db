//! Entry resolution tests, including per-entry DCX decoding.

use bnd_parser::{Error, read_entry, read_entry_data};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use pretty_assertions::assert_eq;
use std::io::{Cursor, Write};

/// Minimal zlib-scheme DCX envelope around `plaintext`.
fn dcx_envelope(plaintext: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(plaintext).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut out = Vec::new();
    out.extend_from_slice(b"BDF307D7R6\0\0\0\0\0\0");
    out.extend_from_slice(&0x44435800u32.to_be_bytes()); // 'DCX\0'
    out.extend_from_slice(&0x00010000u32.to_be_bytes());
    out.extend_from_slice(&24u32.to_be_bytes());
    out.extend_from_slice(&[0; 12]);
    out.extend_from_slice(&0x44435300u32.to_be_bytes()); // 'DCS\0'
    out.extend_from_slice(&(plaintext.len() as u32).to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&0x44435000u32.to_be_bytes()); // 'DCP\0'
    out.extend_from_slice(&0x44464C54u32.to_be_bytes()); // 'DFLT'
    out.extend_from_slice(&32u32.to_be_bytes());
    out.push(9);
    out.extend_from_slice(&[0; 3]);
    out.extend_from_slice(&[0; 12]);
    out.extend_from_slice(&0x00010100u32.to_be_bytes());
    out.extend_from_slice(&0x44434100u32.to_be_bytes()); // 'DCA\0'
    out.extend_from_slice(&8u32.to_be_bytes());
    out.extend_from_slice(&compressed);
    out
}

#[test]
fn plain_entries_pass_through() {
    let mut f = Cursor::new(b"xxheaderxx_payload_trailer".to_vec());
    assert_eq!(read_entry(&mut f, 10, 9).unwrap(), b"_payload_");
}

#[test]
fn dcx_wrapped_entries_are_decoded() {
    let plaintext: Vec<u8> = (0u8..200).map(|i| i.wrapping_mul(3)).collect();
    let envelope = dcx_envelope(&plaintext);

    // Data file: padding, then the wrapped entry, then trailing bytes
    let mut blob = vec![0xAB; 100];
    blob.extend_from_slice(&envelope);
    blob.extend_from_slice(&[0xCD; 40]);

    let mut f = Cursor::new(&blob);
    let decoded = read_entry(&mut f, 100, envelope.len() as u32).unwrap();
    assert_eq!(decoded, plaintext);

    // The raw range read must leave the envelope untouched
    let raw = read_entry_data(&mut f, 100, envelope.len() as u32).unwrap();
    assert_eq!(raw, envelope);
}

#[test]
fn corrupt_dcx_entry_propagates_the_codec_error() {
    let envelope = dcx_envelope(b"payload bytes");
    let mut blob = envelope.clone();
    // Break the scheme fourcc while keeping the outer tag intact
    blob[56..60].copy_from_slice(&0xDEADBEEFu32.to_be_bytes());

    let mut f = Cursor::new(&blob);
    let err = read_entry(&mut f, 0, blob.len() as u32).unwrap_err();
    assert!(matches!(err, Error::Dcx(_)), "actual error: {err:?}");
}

#[test]
fn range_overrunning_the_data_file_is_fatal() {
    let mut f = Cursor::new(vec![0u8; 64]);
    let err = read_entry(&mut f, 60, 8).unwrap_err();
    assert!(
        matches!(
            err,
            Error::OutOfBounds {
                offset: 60,
                size: 8,
                length: 64,
            }
        ),
        "actual error: {err:?}",
    );
}
