use std::io::Cursor;

use assert_approx_eq::assert_approx_eq;
use rand::{
    SeedableRng,
    rngs::StdRng,
};

use splat_indirect::{
    FileSource,
    ProceduralVolume,
    SplatDecoder,
    SplatError,
    SplatRecord,
    decode_binary_ply,
    decode_ply,
    decode_text_ply,
    io::{
        ply::RECORD_BYTES,
        writer::{
            write_binary_ply,
            write_ply_to_file,
            write_text_ply,
        },
    },
    random_splats,
};

use _harness::{
    RawSplat,
    TempPath,
    binary_ply,
    header,
    text_ply,
};


fn assert_record_eq(actual: &SplatRecord, expected: &SplatRecord) {
    for axis in 0..3 {
        assert_approx_eq!(actual.position[axis], expected.position[axis], 1e-6);
    }
    assert_approx_eq!(actual.size, expected.size, 1e-6);
    for channel in 0..4 {
        assert_approx_eq!(actual.color[channel], expected.color[channel], 1e-6);
    }
}


#[test]
fn test_binary_two_records() {
    let first = RawSplat {
        position: [1.0, 2.0, 3.0],
        color: [0.1, 0.2, 0.3],
        opacity: 0.9,
        scale: [0.3, 0.6, 0.9],
        ..RawSplat::at([0.0; 3])
    };
    let second = RawSplat {
        position: [-4.0, 5.5, 0.0],
        color: [1.0, 0.0, 0.5],
        opacity: 0.25,
        scale: [1.0, 1.0, 1.0],
        ..RawSplat::at([0.0; 3])
    };

    let bytes = binary_ply(&[first, second]);
    let cloud = decode_binary_ply(bytes.as_slice()).unwrap();

    assert_eq!(cloud.len(), 2);
    assert_eq!(cloud[0].position, [1.0, 2.0, 3.0]);
    assert_eq!(cloud[0].color, [0.1, 0.2, 0.3, 0.9]);
    assert_approx_eq!(cloud[0].size, 0.6, 1e-6);
    assert_eq!(cloud[1].position, [-4.0, 5.5, 0.0]);
    assert_eq!(cloud[1].color, [1.0, 0.0, 0.5, 0.25]);
    assert_eq!(cloud[1].size, 1.0);
}

#[test]
fn test_binary_positions_and_alphas() {
    let first = RawSplat {
        opacity: 0.5,
        ..RawSplat::at([0.0, 0.0, 0.0])
    };
    let second = RawSplat {
        opacity: 1.0,
        ..RawSplat::at([1.0, 1.0, 1.0])
    };

    let cloud = decode_binary_ply(binary_ply(&[first, second]).as_slice()).unwrap();

    assert_eq!(cloud.len(), 2);
    assert_eq!(cloud[0].position, [0.0, 0.0, 0.0]);
    assert_eq!(cloud[0].opacity(), 0.5);
    assert_eq!(cloud[1].position, [1.0, 1.0, 1.0]);
    assert_eq!(cloud[1].opacity(), 1.0);
}

#[test]
fn test_binary_count_matches_header() {
    let splats = (0..17)
        .map(|i| RawSplat::at([i as f32, 0.0, -(i as f32)]))
        .collect::<Vec<_>>();

    let cloud = decode_binary_ply(binary_ply(&splats).as_slice()).unwrap();

    assert_eq!(cloud.count(), 17);
    for (decoded, raw) in cloud.iter().zip(&splats) {
        assert_eq!(*decoded, raw.expected());
    }
}

#[test]
fn test_binary_size_is_scale_mean() {
    let scales = [
        [0.0, 0.0, 0.0],
        [-1.0, 2.0, 5.0],
        [-3.0, -3.0, -3.0],
        [1e-3, 2e-3, 3e-3],
    ];
    let splats = scales
        .iter()
        .map(|&scale| RawSplat {
            scale,
            ..RawSplat::at([0.0; 3])
        })
        .collect::<Vec<_>>();

    let cloud = decode_binary_ply(binary_ply(&splats).as_slice()).unwrap();

    assert_eq!(cloud[0].size, 0.0);
    assert_eq!(cloud[1].size, 2.0);
    assert_eq!(cloud[2].size, -3.0);
    assert_approx_eq!(cloud[3].size, 2e-3, 1e-8);
}

#[test]
fn test_binary_ignores_skipped_fields() {
    let mut splat = RawSplat::at([1.0, 1.0, 1.0]);
    splat.normal = [f32::NAN, 7.0, -7.0];
    splat.rotation = [f32::INFINITY, 1.0, 2.0, 3.0];

    let cloud = decode_binary_ply(binary_ply(&[splat]).as_slice()).unwrap();

    assert_eq!(cloud[0], splat.expected());
}

#[test]
fn test_binary_empty_body() {
    let cloud = decode_binary_ply(binary_ply(&[]).as_slice()).unwrap();
    assert!(cloud.is_empty());
}

#[test]
fn test_binary_truncated_at_every_offset() {
    let splats = [RawSplat::at([1.0, 2.0, 3.0]), RawSplat::at([4.0, 5.0, 6.0])];
    let bytes = binary_ply(&splats);
    let header_len = header("binary_little_endian", "2").len();

    for cut in 0..bytes.len() {
        let result = decode_binary_ply(&bytes[..cut]);

        if cut < header_len {
            assert!(
                matches!(
                    result,
                    Err(SplatError::MalformedHeader { .. } | SplatError::HeaderFieldMissing(_)),
                ),
                "cut {cut}: {result:?}",
            );
        } else {
            let record = ((cut - header_len) as u64 / RECORD_BYTES) as u32;
            assert!(
                matches!(
                    result,
                    Err(SplatError::TruncatedBody { record: r, expected: 2 }) if r == record,
                ),
                "cut {cut}: {result:?}",
            );
        }
    }
}

#[test]
fn test_stream_len_checked_before_reading() {
    let splats = [RawSplat::at([1.0, 2.0, 3.0]), RawSplat::at([4.0, 5.0, 6.0])];
    let bytes = binary_ply(&splats);
    let cut = bytes.len() - 1;

    let result = SplatDecoder::new()
        .with_stream_len(cut as u64)
        .decode_binary(&bytes[..cut]);

    assert!(matches!(
        result,
        Err(SplatError::TruncatedBody { record: 1, expected: 2 }),
    ));
}

#[test]
fn test_trailing_bytes_ignored() {
    let mut bytes = binary_ply(&[RawSplat::at([1.0, 2.0, 3.0])]);
    bytes.extend_from_slice(&[0xAB; 40]);

    let cloud = SplatDecoder::new()
        .with_stream_len(bytes.len() as u64)
        .decode_binary(bytes.as_slice())
        .unwrap();

    assert_eq!(cloud.len(), 1);
}

#[test]
fn test_missing_end_header() {
    let bytes = b"ply\nformat binary_little_endian 1.0\nelement vertex 3\n";
    let result = decode_binary_ply(&bytes[..]);

    assert!(matches!(result, Err(SplatError::HeaderFieldMissing("end_header"))));
}

#[test]
fn test_binary_blob_without_newlines() {
    let bytes = vec![0x7Fu8; 1 << 20];
    let result = decode_ply(bytes.as_slice());

    assert!(matches!(result, Err(SplatError::MalformedHeader { offset: 0 })));
}

#[test]
fn test_invalid_vertex_count() {
    let bytes = header("binary_little_endian", "many").into_bytes();
    assert!(matches!(
        decode_binary_ply(bytes.as_slice()),
        Err(SplatError::InvalidVertexCount(_)),
    ));

    let bytes = b"ply\nformat binary_little_endian 1.0\nend_header\n";
    assert!(matches!(
        decode_binary_ply(&bytes[..]),
        Err(SplatError::InvalidVertexCount(_)),
    ));
}

#[test]
fn test_crlf_header() {
    let mut bytes = header("binary_little_endian", "1").replace('\n', "\r\n").into_bytes();
    let mut body = binary_ply(&[RawSplat::at([9.0, 8.0, 7.0])]);
    let body_start = body.len() - RECORD_BYTES as usize;
    bytes.extend(body.drain(body_start..));

    let cloud = decode_binary_ply(bytes.as_slice()).unwrap();

    assert_eq!(cloud[0].position, [9.0, 8.0, 7.0]);
}


#[test]
fn test_text_records() {
    let bytes = text_ply(2, &[
        "1 2 3 0 0 0 0.5 0.25 0.125 0.3 0.6 0.9 0.4 1 0",
        "-1 -2 -3 0 0 0 1 1 1 2 2 2 0.4 1 0 extra tokens",
    ]);

    let cloud = decode_text_ply(bytes.as_slice()).unwrap();

    assert_eq!(cloud.len(), 2);
    assert_eq!(cloud[0].position, [1.0, 2.0, 3.0]);
    assert_eq!(cloud[0].color, [0.5, 0.25, 0.125, 1.0]);
    assert_approx_eq!(cloud[0].size, 0.6, 1e-6);
    assert_eq!(cloud[1].position, [-1.0, -2.0, -3.0]);
    assert_eq!(cloud[1].size, 2.0);
}

#[test]
fn test_text_short_line_skipped() {
    let bytes = text_ply(1, &[
        "1 2 3 0 0 0 1 1 1 1 1 1 1 1",
        "",
        "4 5 6 0 0 0 1 1 1 1 1 1 1 1 0",
    ]);

    let cloud = decode_text_ply(bytes.as_slice()).unwrap();

    assert_eq!(cloud.len(), 1);
    assert_eq!(cloud[0].position, [4.0, 5.0, 6.0]);
}

#[test]
fn test_text_invalid_field_reports_line() {
    let bytes = text_ply(3, &[
        "1 2 3 0 0 0 1 1 1 1 1 1 1 1 0",
        "short line",
        "x 2 3 0 0 0 1 1 1 1 1 1 1 1 0",
    ]);

    let result = decode_text_ply(bytes.as_slice());

    assert!(matches!(result, Err(SplatError::InvalidRecordField { line: 2 })));
}

#[test]
fn test_text_unparsed_fields_are_free() {
    let bytes = text_ply(1, &["1 2 3 a b c 1 1 1 1 1 1 d e f"]);

    let cloud = decode_text_ply(bytes.as_slice()).unwrap();

    assert_eq!(cloud[0].position, [1.0, 2.0, 3.0]);
}

#[test]
fn test_text_stops_at_vertex_count() {
    let bytes = text_ply(1, &[
        "1 2 3 0 0 0 1 1 1 1 1 1 1 1 0",
        "not a number at all but long enough to have fifteen tokens in it ok",
    ]);

    let cloud = decode_text_ply(bytes.as_slice()).unwrap();

    assert_eq!(cloud.len(), 1);
}

#[test]
fn test_text_short_body_returns_what_was_read() {
    let bytes = text_ply(5, &["1 2 3 0 0 0 1 1 1 1 1 1 1 1 0"]);

    let cloud = decode_text_ply(bytes.as_slice()).unwrap();

    assert_eq!(cloud.len(), 1);
}

#[test]
fn test_format_dispatch() {
    let text = text_ply(1, &["1 2 3 0 0 0 1 1 1 1 1 1 1 1 0"]);
    let binary = binary_ply(&[RawSplat::at([1.0, 2.0, 3.0])]);

    assert_eq!(decode_ply(text.as_slice()).unwrap()[0].position, [1.0, 2.0, 3.0]);
    assert_eq!(decode_ply(binary.as_slice()).unwrap()[0].position, [1.0, 2.0, 3.0]);
}


#[test]
fn test_writer_binary_roundtrip() {
    let mut rng = StdRng::seed_from_u64(7);
    let cloud = random_splats(&mut rng, 256, 4.0, ProceduralVolume::Sphere);

    let mut bytes = Vec::new();
    write_binary_ply(&mut bytes, &cloud).unwrap();
    let decoded = decode_ply(Cursor::new(bytes)).unwrap();

    assert_eq!(decoded.len(), cloud.len());
    for (decoded, original) in decoded.iter().zip(&cloud) {
        assert_record_eq(decoded, original);
    }
}

#[test]
fn test_writer_text_roundtrip() {
    let mut rng = StdRng::seed_from_u64(11);
    let cloud = random_splats(&mut rng, 64, 2.0, ProceduralVolume::Cube);

    let mut bytes = Vec::new();
    write_text_ply(&mut bytes, &cloud).unwrap();
    let decoded = decode_ply(bytes.as_slice()).unwrap();

    assert_eq!(decoded.len(), cloud.len());
    for (decoded, original) in decoded.iter().zip(&cloud) {
        let mut expected = *original;
        expected.color[3] = 1.0;
        assert_record_eq(decoded, &expected);
    }
}


#[test]
fn test_file_source_load() {
    let path = TempPath::new("file_source.ply");
    let splats = [RawSplat::at([0.5, 0.5, 0.5]), RawSplat::at([-1.0, 0.0, 1.0])];
    std::fs::write(&path.0, binary_ply(&splats)).unwrap();

    let cloud = FileSource::new(&path.0).load().unwrap();

    assert_eq!(cloud.len(), 2);
    assert_eq!(cloud[1], splats[1].expected());
}

#[test]
fn test_file_source_truncated() {
    let path = TempPath::new("file_source_truncated.ply");
    let bytes = binary_ply(&[RawSplat::at([0.0; 3]); 3]);
    std::fs::write(&path.0, &bytes[..bytes.len() - RECORD_BYTES as usize - 4]).unwrap();

    let result = FileSource::new(&path.0).load();

    assert!(matches!(result, Err(SplatError::TruncatedBody { record: 1, expected: 3 })));
}

#[test]
fn test_file_source_missing() {
    let path = TempPath::new("does_not_exist.ply");

    let result = FileSource::new(&path.0).load();

    assert!(matches!(result, Err(SplatError::SourceUnavailable { .. })));
}

#[test]
fn test_write_ply_to_file() {
    let path = TempPath::new("written.ply");
    let mut rng = StdRng::seed_from_u64(3);
    let cloud = random_splats(&mut rng, 10, 1.0, ProceduralVolume::Sphere);

    write_ply_to_file(&cloud, &path.0, false).unwrap();
    let loaded = FileSource::new(&path.0).load().unwrap();

    assert_eq!(loaded.len(), 10);
    assert_record_eq(&loaded[9], &cloud[9]);
}
