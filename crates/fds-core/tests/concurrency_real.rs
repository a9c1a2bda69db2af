#![cfg(feature = "test-utils")]

//! Concurrent open/close traffic from many threads.

use fds_core::test_utils;
use fds_core::{Collector, ResourceKind};
use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const RESOURCES_PER_THREAD: usize = 32;

#[test]
fn concurrent_disjoint_fds_do_not_corrupt_registries() {
    let collector = Arc::new(Collector::with_defaults());
    let mut handles = Vec::new();

    for worker in 0..THREADS {
        let collector = Arc::clone(&collector);
        handles.push(thread::spawn(move || {
            let mut kept = Vec::new();
            for i in 0..RESOURCES_PER_THREAD {
                let pipe = test_utils::open_pipe().expect("pipe");
                let fd = pipe.read.as_raw_fd();
                collector.on_open(fd, &format!("worker-{}-pipe-{}", worker, i));

                if i % 2 == 0 {
                    // Close event delivered while the fd is still open.
                    collector.on_close(fd);
                    drop(pipe);
                } else {
                    kept.push(pipe);
                }
            }
            // Keep the leaked resources alive until the main thread has
            // counted them.
            kept
        }));
    }

    let kept: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect();

    let expected = THREADS * RESOURCES_PER_THREAD / 2;
    assert_eq!(collector.live_count(ResourceKind::NamedPipe), expected);
    assert_eq!(collector.live_total(), expected);

    let snap = collector.snapshot(ResourceKind::NamedPipe);
    assert_eq!(snap.len(), expected);

    drop(kept);
}

#[test]
fn concurrent_mixed_kinds_land_in_their_own_registries() {
    let collector = Arc::new(Collector::with_defaults());
    let mut handles = Vec::new();

    for _ in 0..THREADS {
        let collector = Arc::clone(&collector);
        handles.push(thread::spawn(move || {
            let mut kept_files = Vec::new();
            let mut kept_socks = Vec::new();
            for i in 0..RESOURCES_PER_THREAD {
                if i % 2 == 0 {
                    let file = test_utils::open_temp_file().expect("tempfile");
                    collector.on_open(file.as_file().as_raw_fd(), "file-site");
                    kept_files.push(file);
                } else {
                    let (a, b) = test_utils::open_socket_pair().expect("socketpair");
                    collector.on_open(a.as_raw_fd(), "sock-site");
                    kept_socks.push((a, b));
                }
            }
            (kept_files, kept_socks)
        }));
    }

    let kept: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect();

    let per_kind = THREADS * RESOURCES_PER_THREAD / 2;
    assert_eq!(collector.live_count(ResourceKind::RegularFile), per_kind);
    assert_eq!(collector.live_count(ResourceKind::Socket), per_kind);
    assert_eq!(collector.live_count(ResourceKind::NamedPipe), 0);

    drop(kept);
}

#[test]
fn snapshots_during_traffic_are_well_formed() {
    let collector = Arc::new(Collector::with_defaults());
    let writer = {
        let collector = Arc::clone(&collector);
        thread::spawn(move || {
            for i in 0..RESOURCES_PER_THREAD {
                let pipe = test_utils::open_pipe().expect("pipe");
                let fd = pipe.read.as_raw_fd();
                collector.on_open(fd, &format!("site-{}", i));
                collector.on_close(fd);
            }
        })
    };

    // Reader races the writer; every snapshot must be internally
    // consistent (each record has a stack, fds unique).
    for _ in 0..50 {
        let snap = collector.snapshot(ResourceKind::NamedPipe);
        let mut fds: Vec<_> = snap.iter().map(|r| r.fd).collect();
        fds.dedup();
        assert_eq!(fds.len(), snap.len());
        for record in &snap {
            assert!(record.stack.starts_with("site-"));
        }
    }

    writer.join().expect("writer panicked");
    assert_eq!(collector.live_total(), 0);
}
