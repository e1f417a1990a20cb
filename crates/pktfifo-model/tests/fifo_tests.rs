//! End-to-end FIFO behavior across the two clock domains.
//!
//! Drives the model through its producer/consumer handshakes, either
//! manually (cycle-exact assertions) or through the simulation harness
//! (streaming assertions at various clock ratios).

use dpram_model::DualPortRam;
use pktfifo_model::record::Item;
use pktfifo_model::sim::{SimOptions, Simulation};
use pktfifo_model::{FifoConfig, PacketFifo};

fn build(cfg: FifoConfig, latency: usize) -> PacketFifo<DualPortRam> {
    let _ = env_logger::builder().is_test(true).try_init();
    let ram = DualPortRam::new(cfg.slot_count(), latency);
    PacketFifo::new(cfg, ram).expect("test configuration must be valid")
}

fn frame_cfg(capacity: usize) -> FifoConfig {
    FifoConfig {
        capacity,
        frame_mode: true,
        drop_oversize_frame: true,
        status_bits: 8,
        bad_frame_value: 0xAA,
        bad_frame_mask: 0xFF,
        ..FifoConfig::default()
    }
}

fn payloads(items: &[Item]) -> Vec<u64> {
    items.iter().map(|i| i.payload).collect()
}

mod streaming {
    use super::*;

    #[test]
    fn delivers_in_order_at_equal_rates() {
        let cfg = FifoConfig {
            capacity: 8,
            pipeline_depth: 2,
            ..FifoConfig::default()
        };
        let mut sim = Simulation::new(build(cfg, 1), SimOptions::default());
        for p in 0..20 {
            sim.push_item(Item::data(p));
        }
        assert!(sim.run_until_idle(100, 100_000));
        assert_eq!(payloads(sim.delivered()), (0..20).collect::<Vec<_>>());
        assert_eq!(sim.pending(), 0);
    }

    #[test]
    fn delivers_in_order_with_fast_producer() {
        let cfg = FifoConfig {
            capacity: 8,
            pipeline_depth: 2,
            ..FifoConfig::default()
        };
        let opts = SimOptions {
            write_period: 2,
            read_period: 5,
            consumer_ready_every: 1,
        };
        let mut sim = Simulation::new(build(cfg, 2), opts);
        for p in 0..20 {
            sim.push_item(Item::data(p));
        }
        assert!(sim.run_until_idle(200, 200_000));
        assert_eq!(payloads(sim.delivered()), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn delivers_in_order_with_fast_consumer() {
        let cfg = FifoConfig {
            capacity: 4,
            pipeline_depth: 1,
            ..FifoConfig::default()
        };
        let opts = SimOptions {
            write_period: 7,
            read_period: 2,
            consumer_ready_every: 1,
        };
        let mut sim = Simulation::new(build(cfg, 1), opts);
        for p in 0..20 {
            sim.push_item(Item::data(p));
        }
        assert!(sim.run_until_idle(200, 200_000));
        assert_eq!(payloads(sim.delivered()), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn delivers_under_consumer_backpressure() {
        let cfg = FifoConfig {
            capacity: 4,
            pipeline_depth: 2,
            ..FifoConfig::default()
        };
        let opts = SimOptions {
            write_period: 1,
            read_period: 1,
            consumer_ready_every: 3,
        };
        let mut sim = Simulation::new(build(cfg, 1), opts);
        for p in 0..12 {
            sim.push_item(Item::data(p));
        }
        assert!(sim.run_until_idle(200, 200_000));
        assert_eq!(payloads(sim.delivered()), (0..12).collect::<Vec<_>>());
    }

    /// Concrete scenario: capacity 4, frame mode off, pipeline depth 1.
    /// Five items with the consumer always ready; space-ready deasserts
    /// while four items are in flight.
    #[test]
    fn backpressure_boundary_at_capacity_four() {
        let cfg = FifoConfig {
            capacity: 4,
            pipeline_depth: 1,
            ..FifoConfig::default()
        };
        let mut fifo = build(cfg, 1);

        // Fill to capacity without giving the read domain any cycles.
        for p in [0xA, 0xB, 0xC, 0xD] {
            let out = fifo.step_write(true, Item::data(p), false);
            assert!(out.accepted, "item {p:#X} should be admitted");
        }
        assert!(
            !fifo.producer_ready(),
            "space-ready must deassert with 4 items in flight"
        );
        let out = fifo.step_write(true, Item::data(0xE), false);
        assert!(!out.accepted, "fifth item must stall until a slot frees");

        // Free-run both domains; the fifth item goes through.
        let mut delivered = Vec::new();
        let mut pending = Some(0xE_u64);
        for _ in 0..100 {
            match pending {
                Some(p) => {
                    if fifo.step_write(true, Item::data(p), false).accepted {
                        pending = None;
                    }
                }
                None => {
                    fifo.step_write_idle();
                }
            }
            if let Some(item) = fifo.step_read(true, false).delivered {
                delivered.push(item.payload);
            }
        }
        assert_eq!(delivered, [0xA, 0xB, 0xC, 0xD, 0xE]);
    }

    #[test]
    fn empty_queue_never_asserts_valid() {
        let mut fifo = build(FifoConfig::default(), 1);
        for _ in 0..50 {
            assert!(!fifo.consumer_valid());
            let out = fifo.step_read(true, false);
            assert!(out.delivered.is_none(), "empty queue delivered an item");
        }
    }
}

mod frames {
    use super::*;

    #[test]
    fn complete_frames_deliver_intact_with_one_good_pulse_each() {
        let mut sim = Simulation::new(build(frame_cfg(8), 1), SimOptions::default());
        sim.push_frame(&[1, 2, 3], 0);
        sim.push_frame(&[4], 0);
        sim.push_frame(&[5, 6], 0);
        assert!(sim.run_until_idle(200, 200_000));

        assert_eq!(payloads(sim.delivered()), [1, 2, 3, 4, 5, 6]);
        let eofs: Vec<bool> = sim.delivered().iter().map(|i| i.eof).collect();
        assert_eq!(eofs, [false, false, true, true, false, true]);

        let ev = sim.producer_events();
        assert_eq!(ev.good_frame, 3, "one good-frame pulse per frame");
        assert_eq!(ev.overflow, 0);
        assert_eq!(ev.bad_frame, 0);
        // Mirrored into the consumer domain exactly once each.
        assert_eq!(sim.consumer_events().good_frame, 3);
    }

    #[test]
    fn frame_filling_storage_exactly_still_commits() {
        let mut sim = Simulation::new(build(frame_cfg(4), 1), SimOptions::default());
        sim.push_frame(&[1, 2, 3, 4], 0);
        assert!(sim.run_until_idle(200, 200_000));
        assert_eq!(payloads(sim.delivered()), [1, 2, 3, 4]);
        assert_eq!(sim.producer_events().good_frame, 1);
        assert_eq!(sim.producer_events().overflow, 0);
    }

    /// Concrete scenario: capacity 4, oversize-drop on, bad-frame-drop
    /// off. A 6-item frame is dropped whole with one overflow pulse, and
    /// the producer accepts a fresh frame immediately afterwards.
    #[test]
    fn oversize_frame_dropped_whole() {
        let mut sim = Simulation::new(build(frame_cfg(4), 1), SimOptions::default());
        sim.push_frame(&[1, 2, 3, 4, 5, 6], 0);
        assert!(sim.run_until_idle(200, 200_000));

        assert!(sim.delivered().is_empty(), "no part of the frame may leak");
        assert_eq!(sim.pending(), 0, "the whole frame is consumed and discarded");
        assert_eq!(sim.producer_events().overflow, 1);
        assert_eq!(sim.producer_events().good_frame, 0);
        assert_eq!(sim.consumer_events().overflow, 1);
        assert!(
            sim.fifo().producer_ready(),
            "fresh frames are accepted right after the offending end marker"
        );

        sim.push_frame(&[7, 8], 0);
        assert!(sim.run_until_idle(200, 200_000));
        assert_eq!(payloads(sim.delivered()), [7, 8]);
        assert_eq!(sim.producer_events().good_frame, 1);
    }

    #[test]
    fn bad_status_frame_dropped_with_one_pulse() {
        let cfg = FifoConfig {
            drop_bad_frame: true,
            ..frame_cfg(8)
        };
        let mut sim = Simulation::new(build(cfg, 1), SimOptions::default());
        sim.push_frame(&[1, 2, 3], 0xAA); // trailing status matches the bad pattern
        sim.push_frame(&[4, 5], 0x00);
        assert!(sim.run_until_idle(200, 200_000));

        assert_eq!(payloads(sim.delivered()), [4, 5], "bad frame must not deliver");
        let ev = sim.producer_events();
        assert_eq!(ev.bad_frame, 1);
        assert_eq!(ev.good_frame, 1);
        assert_eq!(ev.overflow, 0);
        assert_eq!(sim.consumer_events().bad_frame, 1);
    }

    #[test]
    fn bad_status_comparison_respects_mask() {
        let cfg = FifoConfig {
            drop_bad_frame: true,
            bad_frame_value: 0x02,
            bad_frame_mask: 0x0F, // upper nibble ignored
            ..frame_cfg(8)
        };
        let mut sim = Simulation::new(build(cfg, 1), SimOptions::default());
        sim.push_frame(&[1, 2], 0xF2); // matches under the mask
        sim.push_frame(&[3, 4], 0xF3); // does not
        assert!(sim.run_until_idle(200, 200_000));

        assert_eq!(payloads(sim.delivered()), [3, 4]);
        assert_eq!(sim.producer_events().bad_frame, 1);
        assert_eq!(sim.producer_events().good_frame, 1);
    }

    #[test]
    fn cut_through_forwards_oversize_frame_without_drop_policy() {
        let cfg = FifoConfig {
            capacity: 4,
            frame_mode: true,
            status_bits: 8,
            ..FifoConfig::default()
        };
        let mut sim = Simulation::new(build(cfg, 1), SimOptions::default());
        sim.push_frame(&[1, 2, 3, 4, 5, 6], 0);
        assert!(sim.run_until_idle(200, 200_000));

        assert_eq!(
            payloads(sim.delivered()),
            [1, 2, 3, 4, 5, 6],
            "cut-through forwards the whole frame in pieces"
        );
        let ev = sim.producer_events();
        assert_eq!(ev.overflow, 0);
        assert_eq!(
            ev.good_frame, 1,
            "good-frame only for the genuine end, not the forced commits"
        );
    }

    #[test]
    fn conflicting_drop_policies_keep_priority_order() {
        let cfg = FifoConfig {
            drop_when_full: true,
            ..frame_cfg(4)
        };
        let mut fifo = build(cfg, 1);

        // An oversize frame into an empty queue: once it reaches capacity
        // both drop policies are eligible at once. The frame is discarded
        // whole with a single overflow pulse at its end marker.
        for p in [1, 2, 3, 4, 5] {
            let out = fifo.step_write(true, Item::data(p), false);
            assert!(out.accepted);
            assert!(!out.pulses.any(), "no pulse before the frame's fate resolves");
        }
        let out = fifo.step_write(true, Item::last(6), false);
        assert!(out.accepted);
        assert!(out.pulses.overflow);
        assert!(!out.pulses.bad_frame && !out.pulses.good_frame);

        // A frame that fills storage commits; a follow-up frame then hits
        // a full queue without ever growing oversize, so only the
        // full-queue policy can be the one discarding it.
        for p in [7, 8, 9] {
            assert!(fifo.step_write(true, Item::data(p), false).accepted);
        }
        let out = fifo.step_write(true, Item::last(10), false);
        assert!(out.accepted && out.pulses.good_frame);

        assert!(fifo.producer_ready(), "full queue must not backpressure");
        assert!(fifo.step_write(true, Item::data(11), false).accepted);
        let out = fifo.step_write(true, Item::last(12), false);
        assert!(out.accepted);
        assert!(out.pulses.overflow, "full-queue discard reports overflow");

        // Only the committed frame comes out.
        let mut delivered = Vec::new();
        for _ in 0..100 {
            fifo.step_write_idle();
            if let Some(item) = fifo.step_read(true, false).delivered {
                delivered.push(item.payload);
            }
        }
        assert_eq!(delivered, [7, 8, 9, 10]);
    }

    #[test]
    fn drop_when_full_discards_whole_frame_without_backpressure() {
        let cfg = FifoConfig {
            drop_when_full: true,
            ..frame_cfg(4)
        };
        let mut fifo = build(cfg, 1);

        // First frame fills storage and commits.
        for p in [1, 2, 3] {
            assert!(fifo.step_write(true, Item::data(p), false).accepted);
        }
        assert!(fifo.step_write(true, Item::last(4), false).accepted);

        // Second frame arrives with the reader stalled; it is consumed
        // and discarded rather than backpressured.
        assert!(fifo.producer_ready(), "drop-when-full never stalls the producer");
        assert!(fifo.step_write(true, Item::data(5), false).accepted);
        let out = fifo.step_write(true, Item::last(6), false);
        assert!(out.accepted);
        assert!(out.pulses.overflow, "dropped frame reports overflow");

        // The reader still gets the first frame intact.
        let mut delivered = Vec::new();
        for _ in 0..100 {
            fifo.step_write_idle();
            if let Some(item) = fifo.step_read(true, false).delivered {
                delivered.push(item.payload);
            }
        }
        assert_eq!(delivered, [1, 2, 3, 4]);
    }
}

mod resets {
    use super::*;

    #[test]
    fn write_reset_discards_partial_frame_tail() {
        let mut fifo = build(frame_cfg(8), 1);

        // Three items of an unterminated frame.
        for p in [1, 2, 3] {
            assert!(fifo.step_write(true, Item::data(p), false).accepted);
        }

        // Reset the write domain; hold long enough for the synchronous
        // re-registration, stepping the read domain alongside.
        for _ in 0..4 {
            fifo.step_write(false, Item::default(), true);
            fifo.step_read(false, false);
        }
        for _ in 0..4 {
            fifo.step_write_idle();
            fifo.step_read(false, false);
        }

        // The frame's remaining items arrive late; they are consumed and
        // discarded, and disposal reports as overflow at the end marker.
        assert!(fifo.step_write(true, Item::data(4), false).accepted);
        let out = fifo.step_write(true, Item::last(5), false);
        assert!(out.accepted);
        assert!(out.pulses.overflow, "reset-latched disposal reports overflow");

        // Nothing from the aborted frame is ever delivered.
        for _ in 0..50 {
            fifo.step_write_idle();
            assert!(fifo.step_read(true, false).delivered.is_none());
        }

        // The queue is fully usable afterwards.
        assert!(fifo.step_write(true, Item::data(9), false).accepted);
        assert!(fifo.step_write(true, Item::last(10), false).accepted);
        let mut delivered = Vec::new();
        for _ in 0..100 {
            fifo.step_write_idle();
            if let Some(item) = fifo.step_read(true, false).delivered {
                delivered.push(item.payload);
            }
        }
        assert_eq!(delivered, [9, 10]);
    }

    #[test]
    fn producer_reset_mid_delivery_injects_terminator() {
        let cfg = FifoConfig {
            bad_frame_value: 0xEE,
            bad_frame_mask: 0xFF,
            ..frame_cfg(8)
        };
        let mut fifo = build(cfg, 1);

        // A committed 6-item frame.
        for p in 1..=5 {
            assert!(fifo.step_write(true, Item::data(p), false).accepted);
        }
        let out = fifo.step_write(true, Item::last(6), false);
        assert!(out.accepted && out.pulses.good_frame);

        // Deliver exactly two items.
        let mut got = Vec::new();
        for _ in 0..100 {
            fifo.step_write_idle();
            if let Some(item) = fifo.step_read(got.len() < 2, false).delivered {
                got.push(item);
            }
            if got.len() == 2 {
                break;
            }
        }
        assert_eq!(payloads(&got), [1, 2]);

        // Producer vanishes while the consumer holds off.
        for _ in 0..6 {
            fifo.step_write(false, Item::default(), true);
            fifo.step_read(false, false);
        }
        for _ in 0..4 {
            fifo.step_write_idle();
            fifo.step_read(false, false);
        }

        // The next thing the consumer sees terminates the frame: end
        // marker set, status carrying the bad-frame pattern.
        let mut terminator = None;
        for _ in 0..20 {
            fifo.step_write_idle();
            if let Some(item) = fifo.step_read(true, false).delivered {
                terminator = Some(item);
                break;
            }
        }
        let terminator = terminator.expect("synthetic terminator must be delivered");
        assert!(terminator.eof, "terminator must carry the end marker");
        assert_eq!(terminator.status, 0xEE);

        // The truncated remainder never shows up.
        for _ in 0..50 {
            fifo.step_write_idle();
            assert!(fifo.step_read(true, false).delivered.is_none());
        }
    }

    #[test]
    fn terminator_survives_a_held_consumer_reset() {
        let mut fifo = build(frame_cfg(8), 1);

        // A committed 4-item frame, two items delivered.
        for p in [1, 2, 3] {
            assert!(fifo.step_write(true, Item::data(p), false).accepted);
        }
        assert!(fifo.step_write(true, Item::last(4), false).accepted);
        let mut got = Vec::new();
        for _ in 0..100 {
            fifo.step_write_idle();
            if let Some(item) = fifo.step_read(got.len() < 2, false).delivered {
                got.push(item);
            }
            if got.len() == 2 {
                break;
            }
        }
        assert_eq!(payloads(&got), [1, 2]);

        // Consumer-side reset held well past the synchronizer stretch.
        // The flush repeats every reset cycle; the terminator must still
        // come out the other side.
        for _ in 0..6 {
            fifo.step_write_idle();
            fifo.step_read(false, true);
        }
        for _ in 0..4 {
            fifo.step_write_idle();
            fifo.step_read(false, false);
        }

        let mut terminator = None;
        for _ in 0..20 {
            fifo.step_write_idle();
            if let Some(item) = fifo.step_read(true, false).delivered {
                terminator = Some(item);
                break;
            }
        }
        let terminator = terminator.expect("held reset must still yield a terminator");
        assert!(terminator.eof);
        assert_eq!(terminator.status, 0xAA);

        for _ in 0..50 {
            fifo.step_write_idle();
            assert!(fifo.step_read(true, false).delivered.is_none());
        }
    }

    #[test]
    fn consumer_reset_without_started_frame_injects_nothing() {
        let mut fifo = build(frame_cfg(8), 1);

        // Commit a frame but never deliver any of it.
        for p in [1, 2] {
            assert!(fifo.step_write(true, Item::data(p), false).accepted);
        }
        assert!(fifo.step_write(true, Item::last(3), false).accepted);

        // Consumer-side reset before the first delivery.
        for _ in 0..6 {
            fifo.step_write_idle();
            fifo.step_read(false, true);
        }
        for _ in 0..4 {
            fifo.step_write_idle();
            fifo.step_read(false, false);
        }

        // No frame was observed as started, so nothing synthetic appears.
        for _ in 0..50 {
            fifo.step_write_idle();
            assert!(fifo.step_read(true, false).delivered.is_none());
        }
    }
}
