use crate::assert_err;
use crate::data::DataError;
use crate::data::datasets::{parse_idx_images, parse_idx_labels, write_idx};

#[test]
fn test_gray_images_gain_channel_dim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("images-idx3-ubyte.gz");
    let pixels: Vec<u8> = (0..2 * 3 * 4).map(|x| x as u8).collect();
    write_idx(&path, &[2, 3, 4], &pixels).unwrap();

    let images = parse_idx_images(&path).unwrap();
    assert_eq!(images.shape(), &[2, 3, 4, 1]);
    assert_eq!(images[[1, 2, 3, 0]], 23.0);
}

#[test]
fn test_color_images() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("images-idx4-ubyte");
    let pixels: Vec<u8> = (0..2 * 2 * 2 * 3).map(|x| (x * 10) as u8).collect();
    write_idx(&path, &[2, 2, 2, 3], &pixels).unwrap();

    let images = parse_idx_images(&path).unwrap();
    assert_eq!(images.shape(), &[2, 2, 2, 3]);
    assert_eq!(images[[0, 0, 1, 2]], 50.0);
}

#[test]
fn test_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labels-idx1-ubyte.gz");
    write_idx(&path, &[4], &[3, 1, 4, 1]).unwrap();

    assert_eq!(parse_idx_labels(&path).unwrap(), vec![3, 1, 4, 1]);
    // 标签文件不能当作图像读取
    assert_err!(parse_idx_images(&path), DataError::FormatError(_));
}

#[test]
fn test_invalid_idx_files() {
    let dir = tempfile::tempdir().unwrap();

    let bad_magic = dir.path().join("bad-magic");
    std::fs::write(&bad_magic, [0u8, 0, 0x0D, 1, 0, 0, 0, 1, 0, 0, 0, 0]).unwrap();
    assert_err!(parse_idx_labels(&bad_magic), DataError::FormatError(_));

    let truncated = dir.path().join("truncated");
    std::fs::write(&truncated, [0u8, 0, 0x08, 1, 0, 0, 0, 5, 1, 2]).unwrap();
    assert_err!(parse_idx_labels(&truncated), DataError::FormatError(_));

    let two_channels = dir.path().join("two-channels");
    write_idx(&two_channels, &[1, 2, 2, 2], &[0; 8]).unwrap();
    assert_err!(parse_idx_images(&two_channels), DataError::FormatError(_));

    let matrix = dir.path().join("matrix");
    write_idx(&matrix, &[2, 2], &[0; 4]).unwrap();
    assert_err!(parse_idx_labels(&matrix), DataError::FormatError(_));

    assert_err!(
        parse_idx_labels(&dir.path().join("missing")),
        DataError::FileNotFound(_)
    );
    assert_err!(
        write_idx(&dir.path().join("short"), &[3], &[1, 2]),
        DataError::ShapeMismatch { .. }
    );
}
