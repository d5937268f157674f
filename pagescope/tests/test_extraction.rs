use pagescope::domain::{ExtractError, TraceSlot, Vpn};
use pagescope::extract::{extract, extract_events, Extraction};
use pagescope::trace::{encode_trace, TraceEvent};
use pagescope::tracker::{ObjectTracker, TrackerConfig};

const BIG: u64 = 0x10000;

fn run(events: &[TraceEvent]) -> Result<Extraction, ExtractError> {
    extract(&encode_trace(events), &TrackerConfig::default())
}

fn assert_no_adjacent_repeats(pages: &[Vpn]) {
    for pair in pages.windows(2) {
        assert_ne!(pair[0], pair[1], "consecutive duplicate in {pages:?}");
    }
}

#[test]
fn test_end_to_end_example() {
    let extraction = run(&[
        TraceEvent::Allocate { address: 0x1000, size: 0x10000 },
        TraceEvent::Reference { address: 0x1050, size: 4 },
        TraceEvent::Reference { address: 0x1050, size: 4 },
        TraceEvent::Free { address: 0x1000 },
    ])
    .unwrap();

    assert_eq!(extraction.regions, vec![vec![], vec![1]]);
    assert_eq!(extraction.global, vec![1]);
}

#[test]
fn test_untracked_reference_example() {
    let extraction = run(&[TraceEvent::Reference { address: 0x5000, size: 8 }]).unwrap();

    assert_eq!(extraction.regions, vec![vec![5]]);
    assert_eq!(extraction.global, vec![5]);
}

#[test]
fn test_dedup_holds_in_every_sequence() {
    let mut events = vec![
        TraceEvent::Allocate { address: 0x10000, size: BIG },
        TraceEvent::Allocate { address: 0x40000, size: BIG },
    ];
    for i in 0..200u64 {
        let base = if i % 3 == 0 { 0x10000 } else { 0x40000 };
        events.push(TraceEvent::Reference { address: base + (i % 7) * 0x800, size: 4 });
    }

    let extraction = run(&events).unwrap();
    assert_no_adjacent_repeats(&extraction.global);
    for pages in &extraction.regions {
        assert_no_adjacent_repeats(pages);
    }
}

#[test]
fn test_overlapping_live_allocations_fail() {
    let err = run(&[
        TraceEvent::Allocate { address: 0x10000, size: BIG },
        TraceEvent::Reference { address: 0x10000, size: 4 },
        TraceEvent::AllocateZeroed { address: 0x18000, count: 1, elem_size: BIG },
    ])
    .unwrap_err();

    assert!(matches!(err, ExtractError::OverlappingRegion { existing_slot: TraceSlot(1), .. }));
}

#[test]
fn test_overlap_with_freed_region_is_allowed() {
    let extraction = run(&[
        TraceEvent::Allocate { address: 0x10000, size: BIG },
        TraceEvent::Free { address: 0x10000 },
        TraceEvent::Allocate { address: 0x18000, size: BIG },
        TraceEvent::Reference { address: 0x18000, size: 4 },
    ])
    .unwrap();

    assert_eq!(extraction.region_count(), 2);
    assert_eq!(extraction.sequence(TraceSlot(2)), Some(&[0x18u64][..]));
    assert_eq!(extraction.sequence(TraceSlot(1)), Some(&[][..]));
}

#[test]
fn test_small_allocation_never_gets_a_slot() {
    let extraction = run(&[
        TraceEvent::Allocate { address: 0x10000, size: 9 * 0x1000 },
        TraceEvent::Reference { address: 0x10100, size: 4 },
        TraceEvent::Free { address: 0x10000 },
    ])
    .unwrap();

    assert_eq!(extraction.regions.len(), 1);
    assert_eq!(extraction.untracked(), &[0x10]);
    assert_eq!(extraction.stats.allocations_ignored, 1);
}

#[test]
fn test_resolution_independent_of_creation_order() {
    let forward = run(&[
        TraceEvent::Allocate { address: 0x10000, size: BIG },
        TraceEvent::Allocate { address: 0x80000, size: BIG },
        TraceEvent::Reference { address: 0x80010, size: 4 },
        TraceEvent::Reference { address: 0x10010, size: 4 },
        TraceEvent::Reference { address: 0x50000, size: 4 },
    ])
    .unwrap();
    let reversed = run(&[
        TraceEvent::Allocate { address: 0x80000, size: BIG },
        TraceEvent::Allocate { address: 0x10000, size: BIG },
        TraceEvent::Reference { address: 0x80010, size: 4 },
        TraceEvent::Reference { address: 0x10010, size: 4 },
        TraceEvent::Reference { address: 0x50000, size: 4 },
    ])
    .unwrap();

    assert_eq!(forward.regions, vec![vec![0x50], vec![0x10], vec![0x80]]);
    assert_eq!(reversed.regions, vec![vec![0x50], vec![0x80], vec![0x10]]);
}

#[test]
fn test_realloc_equals_free_then_allocate() {
    let setup = [
        TraceEvent::Allocate { address: 0x10000, size: BIG },
        TraceEvent::Reference { address: 0x10000, size: 4 },
    ];

    let mut via_realloc = ObjectTracker::new();
    let mut via_free = ObjectTracker::new();
    for event in &setup {
        via_realloc.process(event).unwrap();
        via_free.process(event).unwrap();
    }

    via_realloc.reallocate(0x14000, 0x10000, 2 * BIG).unwrap();
    via_free.free(0x10000);
    via_free.allocate(0x14000, 2 * BIG).unwrap();

    assert_eq!(via_realloc.regions(), via_free.regions());
    assert_eq!(via_realloc.buffers(), via_free.buffers());
    assert_eq!(via_realloc.global(), via_free.global());
    assert_eq!(via_realloc.resolve(0x20000), TraceSlot(2));
}

#[test]
fn test_double_free_leaves_state_unchanged() {
    let mut tracker = ObjectTracker::new();
    tracker.allocate(0x10000, BIG).unwrap();
    tracker.free(0x10000);

    let before = (tracker.regions().to_vec(), tracker.buffers().to_vec());
    assert_eq!(tracker.free(0x10000), None);
    assert_eq!(tracker.free(0x12345), None);
    assert_eq!((tracker.regions().to_vec(), tracker.buffers().to_vec()), before);
}

#[test]
fn test_malformed_final_record_produces_no_output() {
    let mut bytes = encode_trace(&[
        TraceEvent::Allocate { address: 0x10000, size: BIG },
        TraceEvent::Reference { address: 0x10000, size: 4 },
    ]);
    bytes.extend_from_slice(&(0xcu64 << 60).to_le_bytes());

    let result = extract(&bytes, &TrackerConfig::default());
    assert!(matches!(result, Err(ExtractError::MalformedTrace(_))));
}

#[test]
fn test_every_defined_tag_is_accepted() {
    let events = [
        TraceEvent::Reference { address: 0x5000, size: 8 },
        TraceEvent::Allocate { address: 0x10000, size: BIG },
        TraceEvent::AllocateZeroed { address: 0x40000, count: 2, elem_size: BIG },
        TraceEvent::Reallocate { new_address: 0x80000, old_address: 0x40000, size: BIG },
        TraceEvent::Free { address: 0x10000 },
        TraceEvent::InstructionCount { count: 9 },
    ];
    let from_bytes = run(&events).unwrap();
    let from_events = extract_events(&events, &TrackerConfig::default()).unwrap();
    assert_eq!(from_bytes, from_events);
    assert_eq!(from_bytes.region_count(), 3);
}

#[test]
fn test_slots_stay_stable_after_free() {
    let extraction = run(&[
        TraceEvent::Allocate { address: 0x10000, size: BIG },
        TraceEvent::Allocate { address: 0x40000, size: BIG },
        TraceEvent::Reference { address: 0x10000, size: 4 },
        TraceEvent::Free { address: 0x10000 },
        TraceEvent::Allocate { address: 0x10000, size: BIG },
        TraceEvent::Reference { address: 0x10000, size: 4 },
        TraceEvent::Reference { address: 0x40000, size: 4 },
    ])
    .unwrap();

    assert_eq!(extraction.regions, vec![vec![], vec![0x10], vec![0x40], vec![0x10]]);
    assert!(extraction.region(TraceSlot(1)).unwrap().is_obsolete());
    assert!(extraction.region(TraceSlot(3)).unwrap().is_live());
}
