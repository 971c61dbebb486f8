use crate::assert_err;
use crate::data::DataError;
use crate::data::download::{compute_md5, copy_hashed, verify_md5};

#[test]
fn test_compute_md5() {
    assert_eq!(compute_md5(b""), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(compute_md5(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
}

#[test]
fn test_verify_md5() {
    assert!(verify_md5(b"abc", "900150983cd24fb0d6963f7d28e17f72").is_ok());
    assert!(verify_md5(b"abc", "900150983CD24FB0D6963F7D28E17F72").is_ok());
    assert_err!(
        verify_md5(b"abd", "900150983cd24fb0d6963f7d28e17f72"),
        DataError::ChecksumMismatch { expected, .. } if expected == "900150983cd24fb0d6963f7d28e17f72"
    );
}

#[test]
fn test_copy_hashed_streams_and_hashes() {
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let mut copied = Vec::new();
    let digest = copy_hashed(&data[..], &mut copied).unwrap();
    assert_eq!(copied, data);
    assert_eq!(digest, compute_md5(&data));
}
