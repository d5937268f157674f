use pagescope::domain::{DecodeError, ExtractError, TraceSlot};
use pagescope::extract::extract_file;
use pagescope::trace::{TraceDecoder, TraceEvent};
use pagescope::tracker::TrackerConfig;

#[test]
fn test_parse_simple_fixture() {
    let bytes = std::fs::read("tests/fixtures/simple.trace").unwrap();
    let events: Vec<_> = TraceDecoder::new(&bytes).collect::<Result<_, _>>().unwrap();

    assert_eq!(
        events,
        vec![
            TraceEvent::Allocate { address: 0x1000, size: 0x10000 },
            TraceEvent::Reference { address: 0x1050, size: 4 },
            TraceEvent::Reference { address: 0x1050, size: 4 },
            TraceEvent::Free { address: 0x1000 },
        ]
    );
}

#[test]
fn test_extract_simple_fixture() {
    let extraction =
        extract_file("tests/fixtures/simple.trace", &TrackerConfig::default()).unwrap();

    assert_eq!(extraction.region_count(), 1);
    assert_eq!(extraction.sequence(TraceSlot(1)), Some(&[1u64][..]));
    assert_eq!(extraction.global, vec![1]);
    assert!(extraction.untracked().is_empty());
    assert!(extraction.region(TraceSlot(1)).unwrap().is_obsolete());
}

#[test]
fn test_extract_mixed_fixture_sequences() {
    let extraction = extract_file("tests/fixtures/mixed.trace", &TrackerConfig::default()).unwrap();

    assert_eq!(extraction.global, vec![0x100, 0x101, 0x200, 0x300, 0x7fff0, 0x100, 0x43f]);
    assert_eq!(
        extraction.regions,
        vec![vec![0x300, 0x7fff0, 0x100], vec![0x100, 0x101], vec![0x200], vec![0x43f]]
    );
}

#[test]
fn test_extract_mixed_fixture_regions() {
    let extraction = extract_file("tests/fixtures/mixed.trace", &TrackerConfig::default()).unwrap();

    let calloc_region = extraction.region(TraceSlot(2)).unwrap();
    assert_eq!(calloc_region.requested().start, 0x200010);
    assert_eq!(calloc_region.requested().end, 0x210010);
    assert_eq!(calloc_region.pages().start, 0x200000);
    assert_eq!(calloc_region.pages().end, 0x211000);

    let live: Vec<_> = extraction
        .region_table
        .iter()
        .filter(|r| r.is_live())
        .map(|r| r.slot())
        .collect();
    assert_eq!(live, vec![TraceSlot(3)]);
}

#[test]
fn test_extract_mixed_fixture_stats() {
    let extraction = extract_file("tests/fixtures/mixed.trace", &TrackerConfig::default()).unwrap();
    let stats = &extraction.stats;

    assert_eq!(stats.references, 9);
    assert_eq!(stats.allocations, 3);
    assert_eq!(stats.reallocations, 1);
    assert_eq!(stats.frees, 2);
    assert_eq!(stats.instruction_markers, 2);
    assert_eq!(stats.regions_created, 3);
    assert_eq!(stats.allocations_ignored, 1);
    assert_eq!(stats.regions_freed, 2);
    assert_eq!(stats.unmatched_releases, 1);
    assert_eq!(stats.last_instruction_count, Some(123_456));
}

#[test]
fn test_bad_tag_fixture_fails() {
    let err = extract_file("tests/fixtures/bad_tag.trace", &TrackerConfig::default()).unwrap_err();
    match err {
        ExtractError::MalformedTrace(DecodeError::UnknownEntryType { offset, tag }) => {
            assert_eq!(offset, 28);
            assert_eq!(tag, 0x3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let err = extract_file("nonexistent.trace", &TrackerConfig::default()).unwrap_err();
    assert!(matches!(err, ExtractError::Io(_)));
}

#[test]
fn test_truncated_file_fails() {
    use std::io::Write;
    use tempfile::NamedTempFile;

    let bytes = std::fs::read("tests/fixtures/simple.trace").unwrap();
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(&bytes[..bytes.len() - 3]).unwrap();

    let err = extract_file(temp_file.path(), &TrackerConfig::default()).unwrap_err();
    assert!(matches!(err, ExtractError::MalformedTrace(DecodeError::Truncated { .. })));
}

#[test]
fn test_empty_file_extracts_nothing() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    let extraction = extract_file(temp_file.path(), &TrackerConfig::default()).unwrap();

    assert!(extraction.global.is_empty());
    assert_eq!(extraction.regions.len(), 1);
}
