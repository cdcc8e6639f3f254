use pageturner::Error;
use pageturner::score::{ReferenceProfile, parse_header, read_header, write_header};

const HEADER: &str = r#"// Auto-generated from reference.wav
#ifndef SCORE_DATA_H
#define SCORE_DATA_H

const int num_pages = 2;
const int page_end_indices[] = { 2, 4 };

const int score_len = 6;
const float score_chroma[][12] = {
  {1.0000f, 0.1000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f},
  {0.0000f, 1.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f},
  {0.0000f, 0.0000f, 1.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f},
  {0.0000f, 0.0000f, 0.0000f, 1.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f},
  {0.0000f, 0.0000f, 0.0000f, 0.0000f, 1.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.5000f},
  {0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 1.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f, 0.0000f}
};

#endif
"#;

#[test]
fn parses_generated_header() {
    let profile = parse_header(HEADER).unwrap();
    assert_eq!(profile.len(), 6);
    assert_eq!(profile.page_boundaries(), &[2, 4]);
    assert_eq!(profile.num_pages(), 3);
    assert_eq!(profile.frames().shape(), &[12, 6]);
    assert_eq!(profile.frame(0)[1], 0.1);
    assert_eq!(profile.frame(4)[11], 0.5);
    assert!((profile.magnitude(4) - 1.25f32.sqrt()).abs() < 1e-6);
}

#[test]
fn header_file_round_trip() {
    let profile = parse_header(HEADER).unwrap();
    let path = std::env::temp_dir().join(format!("pageturner-score-{}.h", std::process::id()));
    std::fs::write(&path, write_header(&profile, Some("copy"))).unwrap();
    let reread = read_header(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(reread, profile);
}

#[test]
fn missing_file_is_io_error() {
    let err = read_header("/nonexistent/ScoreData.h").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn non_increasing_boundaries_are_rejected() {
    let text = HEADER.replace("{ 2, 4 }", "{ 4, 2 }");
    assert!(matches!(
        parse_header(&text),
        Err(Error::BoundaryNotIncreasing { index: 1, previous: 4, boundary: 2 })
    ));
}

#[test]
fn zero_boundary_is_rejected() {
    let text = HEADER.replace("{ 2, 4 }", "{ 0, 4 }");
    assert!(matches!(
        parse_header(&text),
        Err(Error::BoundaryOutOfRange { index: 0, .. })
    ));
}

#[test]
fn negative_values_are_rejected() {
    let text = HEADER.replace("{1.0000f, 0.1000f", "{1.0000f, -0.1000f");
    assert!(parse_header(&text).is_err());
}

#[test]
fn empty_reference_is_rejected() {
    assert!(matches!(
        ReferenceProfile::from_vectors(&[], vec![]),
        Err(Error::EmptyReference)
    ));
}

#[test]
fn pages_of_positions() {
    let profile = parse_header(HEADER).unwrap();
    let pages: Vec<usize> = (0..6).map(|p| profile.page_of(p)).collect();
    assert_eq!(pages, vec![1, 1, 1, 2, 2, 3]);
}

#[test]
fn profile_rebuilds_from_its_frames() {
    let profile = parse_header(HEADER).unwrap();
    let vectors: Vec<[f32; 12]> = (0..profile.len()).map(|j| profile.frame_vector(j)).collect();
    assert_eq!(vectors[4][11], 0.5);
    let rebuilt = ReferenceProfile::from_vectors(&vectors, profile.page_boundaries().to_vec()).unwrap();
    assert_eq!(rebuilt, profile);
}
