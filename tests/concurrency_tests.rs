//! Concurrency tests for the tag muxer.
//!
//! Auxiliary pads and the primary pads are driven from separate threads,
//! the way a pipeline runtime drives them. These tests verify the barrier,
//! the single flush, and that nothing overtakes the tags event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tagmux::buffer::Buffer;
use tagmux::element::Downstream;
use tagmux::elements::{AddTagMux, AppSink, DataSrc, Mode, TagMuxConfig};
use tagmux::error::FlowResult;
use tagmux::event::{Event, PipelineItem, SegmentEvent};
use tagmux::metadata::Metadata;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
const SETTLE: Duration = Duration::from_millis(50);
const DEADLINE: Duration = Duration::from_secs(5);

fn linked_mux(config: TagMuxConfig) -> (Arc<AddTagMux>, Arc<AppSink>) {
    let mux = Arc::new(AddTagMux::with_config(config));
    let sink = Arc::new(AppSink::new());
    mux.link_downstream(sink.clone());
    (mux, sink)
}

fn tag_event_count(items: &[PipelineItem]) -> usize {
    items
        .iter()
        .filter_map(PipelineItem::as_event)
        .filter(|e| e.as_tags().is_some())
        .count()
}

// ============================================================================
// Barrier
// ============================================================================

/// With N auxiliary pads, the primary push stays blocked until the last one
/// ends; N-1 ends are not enough.
#[test]
fn test_barrier_waits_for_all_aux_pads() {
    let (mux, sink) = linked_mux(TagMuxConfig::default());
    let pads: Vec<_> = (0..4).map(|_| mux.request_aux_pad().unwrap()).collect();

    let done = Arc::new(AtomicBool::new(false));
    let primary = {
        let mux = Arc::clone(&mux);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let result = mux.chain(Buffer::from_static(b"P1"));
            done.store(true, Ordering::SeqCst);
            result
        })
    };

    thread::sleep(SETTLE);
    assert!(!done.load(Ordering::SeqCst));

    for pad in &pads[..3] {
        pad.chain(Buffer::from_static(PNG)).unwrap();
        assert!(pad.end_of_stream());
    }
    thread::sleep(SETTLE);
    assert!(!done.load(Ordering::SeqCst), "released with one pad streaming");
    assert_eq!(mux.pending(), 1);
    assert!(sink.is_empty());

    assert!(pads[3].end_of_stream());
    assert!(sink.wait_for(2, DEADLINE));
    primary.join().unwrap().unwrap();

    assert!(done.load(Ordering::SeqCst));
    let items = sink.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_event().and_then(Event::as_tags).map(|t| t.len()), Some(3));
}

/// Every kind of primary operation waits at the barrier, and all waiters
/// are released together.
#[test]
fn test_all_primary_operations_are_gated() {
    let (mux, sink) = linked_mux(TagMuxConfig::default());
    mux.link_upstream(Arc::new(DataSrc::from_static(b"0123456789")));
    let aux = mux.request_aux_pad().unwrap();
    aux.chain(Buffer::from_static(PNG)).unwrap();

    let chain = {
        let mux = Arc::clone(&mux);
        thread::spawn(move || mux.chain(Buffer::from_static(b"P1")).is_ok())
    };
    let event = {
        let mux = Arc::clone(&mux);
        thread::spawn(move || mux.sink_event(Event::Segment(SegmentEvent::new_bytes(0, None))))
    };
    let pull = {
        let mux = Arc::clone(&mux);
        thread::spawn(move || mux.get_range(0, 4).is_ok())
    };

    thread::sleep(SETTLE);
    assert!(!chain.is_finished());
    assert!(!event.is_finished());
    assert!(!pull.is_finished());
    assert_eq!(mux.mode(), Mode::Gathering);

    aux.end_of_stream();

    assert!(chain.join().unwrap());
    assert!(event.join().unwrap());
    assert!(pull.join().unwrap());

    let items = sink.items();
    assert_eq!(tag_event_count(&items), 1);
    assert!(items[0].as_event().and_then(Event::as_tags).is_some());
}

// ============================================================================
// Single flush
// ============================================================================

/// Many auxiliary threads and many primary threads: one tags event, first
/// in line, holding every collected image.
#[test]
fn test_single_flush_under_contention() {
    const AUX_PADS: usize = 8;
    const IMAGES_PER_PAD: usize = 5;
    const PRIMARY_THREADS: usize = 6;
    const BUFFERS_PER_THREAD: u64 = 20;

    let (mux, sink) = linked_mux(TagMuxConfig::default());
    let start = Arc::new(Barrier::new(AUX_PADS + PRIMARY_THREADS));

    let aux_threads: Vec<_> = (0..AUX_PADS)
        .map(|_| {
            let pad = mux.request_aux_pad().unwrap();
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                for _ in 0..IMAGES_PER_PAD {
                    pad.chain(Buffer::from_static(PNG)).unwrap();
                    thread::yield_now();
                }
                assert!(pad.end_of_stream());
            })
        })
        .collect();

    let primary_threads: Vec<_> = (0..PRIMARY_THREADS as u64)
        .map(|t| {
            let mux = Arc::clone(&mux);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                for i in 0..BUFFERS_PER_THREAD {
                    let seq = t * BUFFERS_PER_THREAD + i;
                    let buf = Buffer::new(seq.to_le_bytes().to_vec(), Metadata::from_sequence(seq));
                    mux.chain(buf).unwrap();
                }
            })
        })
        .collect();

    for handle in aux_threads.into_iter().chain(primary_threads) {
        handle.join().unwrap();
    }

    let items = sink.items();
    assert_eq!(tag_event_count(&items), 1);

    let tags = items[0]
        .as_event()
        .and_then(Event::as_tags)
        .expect("tags event must come first");
    assert_eq!(tags.images().count(), AUX_PADS * IMAGES_PER_PAD);

    let buffers = sink.buffers();
    assert_eq!(buffers.len(), PRIMARY_THREADS * BUFFERS_PER_THREAD as usize);

    let stats = mux.stats();
    assert!(stats.tag_event_sent);
    assert_eq!(stats.mode, Mode::Passthrough);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.tags_queued, 0);
}

/// Each primary thread's own buffers stay in the order it pushed them.
#[test]
fn test_primary_order_per_thread() {
    let (mux, sink) = linked_mux(TagMuxConfig::default());
    let aux = mux.request_aux_pad().unwrap();

    let pushers: Vec<_> = (0..2u64)
        .map(|t| {
            let mux = Arc::clone(&mux);
            thread::spawn(move || {
                for i in 0..50u64 {
                    let meta = Metadata::from_sequence(t * 1000 + i);
                    mux.chain(Buffer::new(vec![t as u8], meta)).unwrap();
                }
            })
        })
        .collect();

    thread::sleep(SETTLE);
    aux.chain(Buffer::from_static(PNG)).unwrap();
    aux.end_of_stream();
    assert!(sink.wait_for(101, DEADLINE));

    for handle in pushers {
        handle.join().unwrap();
    }

    for t in 0..2u64 {
        let seqs: Vec<u64> = sink
            .buffers()
            .iter()
            .map(|b| b.metadata().sequence)
            .filter(|s| s / 1000 == t)
            .collect();
        assert_eq!(seqs, (0..50).map(|i| t * 1000 + i).collect::<Vec<_>>());
    }
}

// ============================================================================
// Release policy
// ============================================================================

/// With the release-ends-stream policy, releasing the last streaming pad
/// opens the gate for a blocked primary thread.
#[test]
fn test_release_ends_stream_unblocks_primary() {
    let (mux, sink) = linked_mux(TagMuxConfig::new().release_ends_stream(true));
    let aux = mux.request_aux_pad().unwrap();
    aux.chain(Buffer::from_static(PNG)).unwrap();

    let primary = {
        let mux = Arc::clone(&mux);
        thread::spawn(move || mux.chain(Buffer::from_static(b"P1")))
    };

    thread::sleep(SETTLE);
    assert!(!primary.is_finished());

    mux.release_pad(aux.name()).unwrap();
    assert!(sink.wait_for(2, DEADLINE));
    primary.join().unwrap().unwrap();

    assert_eq!(tag_event_count(&sink.items()), 1);
    assert_eq!(sink.buffers().len(), 1);
}

/// By default a release before end-of-stream keeps the pad pending.
#[test]
fn test_default_release_keeps_primary_blocked() {
    let (mux, sink) = linked_mux(TagMuxConfig::default());
    let aux = mux.request_aux_pad().unwrap();

    let primary = {
        let mux = Arc::clone(&mux);
        thread::spawn(move || mux.chain(Buffer::from_static(b"P1")))
    };

    mux.release_pad(aux.name()).unwrap();
    thread::sleep(SETTLE);
    assert!(!primary.is_finished());
    assert_eq!(mux.pending(), 1);
    assert!(sink.is_empty());

    // Released handles are inert
    assert!(!aux.end_of_stream());
    assert_eq!(mux.pending(), 1);

    // The primary thread stays parked; detach it
    drop(primary);
}

// ============================================================================
// Failing downstream
// ============================================================================

/// Downstream peer that panics on its first event and records the rest.
struct PanicOnFirstEvent {
    tripped: AtomicBool,
    inner: AppSink,
}

impl Downstream for PanicOnFirstEvent {
    fn push(&self, buffer: Buffer) -> FlowResult {
        self.inner.push(buffer)
    }

    fn push_event(&self, event: Event) -> bool {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            panic!("downstream rejected {}", event.name());
        }
        self.inner.push_event(event)
    }
}

/// A peer that panics while the tags event is pushed must not leave the
/// primary pads blocked.
#[test]
fn test_panic_during_flush_opens_gate() {
    let mux = Arc::new(AddTagMux::new());
    let peer = Arc::new(PanicOnFirstEvent {
        tripped: AtomicBool::new(false),
        inner: AppSink::new(),
    });
    mux.link_downstream(peer.clone());

    let aux = mux.request_aux_pad().unwrap();
    aux.chain(Buffer::from_static(PNG)).unwrap();
    assert!(aux.end_of_stream());

    let first = {
        let mux = Arc::clone(&mux);
        thread::spawn(move || mux.chain(Buffer::from_static(b"P1")))
    };
    assert!(first.join().is_err());

    let second = {
        let mux = Arc::clone(&mux);
        thread::spawn(move || mux.chain(Buffer::from_static(b"P2")))
    };
    assert!(peer.inner.wait_for(1, DEADLINE), "primary pad blocked after flush panic");
    second.join().unwrap().unwrap();

    assert_eq!(mux.mode(), Mode::Passthrough);
    assert!(!mux.stats().tag_event_sent);
    let buffers = peer.inner.buffers();
    assert_eq!(buffers.len(), 1);
    assert_eq!(buffers[0].as_bytes(), b"P2");
}
