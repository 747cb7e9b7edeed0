// crates/mdpad_engine/src/tests.rs
#[cfg(test)]
mod tests {
    use crate::*;
    use mdpad_core::{DelayNs, IrqMasked, PadOutput};
    use mdpad_input::ButtonMask;

    struct LastWrite(Option<u8>);
    impl PadOutput for LastWrite {
        fn write(&mut self, levels: u8) { self.0 = Some(levels); }
    }

    #[derive(Default)]
    struct CountingDelay { ns: u64 }
    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) { self.ns += ns as u64; }
    }

    fn masked<R>(f: impl FnOnce(&IrqMasked<'_>) -> R) -> R {
        // Sin IRQ real en los tests
        let cs = unsafe { IrqMasked::new() };
        f(&cs)
    }

    fn all_masks() -> impl Iterator<Item = ButtonMask> {
        (0u16..=0x7FFF).filter_map(ButtonMask::from_bits)
    }

    // ------------------------------------------------------------------
    //  ButtonMapper
    // ------------------------------------------------------------------

    #[test]
    fn test_fragments_are_or_of_entries_in_any_order() {
        let reversed: &'static [MappingEntry] =
            Box::leak(GENESIS_MAP.iter().rev().copied().collect::<Vec<_>>().into_boxed_slice());
        let mut forward = ButtonMapper::genesis();
        let mut backward = ButtonMapper::new(reversed);

        for mask in all_masks() {
            let mut expected = Fragments::NONE;
            for entry in GENESIS_MAP.iter().filter(|e| mask.contains(e.button)) {
                expected |= entry.fragments;
            }
            assert_eq!(forward.build_fragments(mask, false, false).fragments, expected);
            assert_eq!(backward.build_fragments(mask, false, true).fragments, expected);
        }
    }

    #[test]
    fn test_single_a_scenario() {
        let mut mapper = ButtonMapper::genesis();
        let out = mapper.build_fragments(ButtonMask::A, false, false);
        assert_eq!(out.fragments, Fragments::new(0x02, 0x00, 0x00));
        assert!(!out.speed_edge);

        let table = OutputTable::build(out.fragments, ModeState::ThreeButtonCompat);
        assert_eq!(table.asserted(), [0x00, 0x0e, 0x00, 0x0e, 0x00, 0x0e, 0x00, 0x0e]);
        assert_eq!(table.0, [0xff, 0xf1, 0xff, 0xf1, 0xff, 0xf1, 0xff, 0xf1]);
    }

    #[test]
    fn test_ignore_gate_blocks_fragments() {
        let mut mapper = ButtonMapper::genesis();
        let out = mapper.build_fragments(ButtonMask::all(), true, true);
        assert_eq!(out.fragments, Fragments::NONE);
    }

    static TURBO_MAP: [MappingEntry; 3] = [
        MappingEntry::new(ButtonMask::A, mapper::GEN_BTN_A).with_behavior(Behavior::Turbo),
        MappingEntry::new(ButtonMask::B, mapper::GEN_BTN_B),
        MappingEntry::new(ButtonMask::MODE, mapper::GEN_BTN_MODE)
            .with_behavior(Behavior::TurboSpeedSelect),
    ];

    #[test]
    fn test_turbo_entry_follows_phase() {
        let mut mapper = ButtonMapper::new(&TURBO_MAP);
        let pressed = ButtonMask::A | ButtonMask::B;

        let on = mapper.build_fragments(pressed, false, true);
        assert_eq!(on.fragments, Fragments::new(0x02, 0x02, 0x00));

        let off = mapper.build_fragments(pressed, false, false);
        assert_eq!(off.fragments, Fragments::new(0x00, 0x02, 0x00));
    }

    #[test]
    fn test_speed_select_edge_even_while_ignoring() {
        let mut mapper = ButtonMapper::new(&TURBO_MAP);

        let first = mapper.build_fragments(ButtonMask::MODE, true, false);
        assert!(first.speed_edge);
        assert_eq!(first.fragments, Fragments::NONE);

        // Mantenido: no hay nuevo flanco
        assert!(!mapper.build_fragments(ButtonMask::MODE, true, false).speed_edge);
        assert!(!mapper.build_fragments(ButtonMask::empty(), false, false).speed_edge);

        let again = mapper.build_fragments(ButtonMask::MODE, false, false);
        assert!(again.speed_edge);
        assert_eq!(again.fragments, mapper::GEN_BTN_MODE);
    }

    #[test]
    fn test_ignore_gate_is_monotonic() {
        let mut gate = IgnoreGate::new();
        assert!(gate.update(ButtonMask::A));
        assert!(gate.update(ButtonMask::START));
        assert!(!gate.update(ButtonMask::empty()));
        assert!(!gate.update(ButtonMask::A));
        assert!(!gate.is_ignoring());
    }

    // ------------------------------------------------------------------
    //  TurboEngine
    // ------------------------------------------------------------------

    #[test]
    fn test_turbo_period_is_twice_divisor() {
        for speed in TurboSpeed::ALL {
            let mut turbo = TurboEngine::new(speed);
            let mut flips = Vec::new();
            let mut last = turbo.phase();
            for t in 0..100 {
                turbo.tick();
                if turbo.phase() != last {
                    flips.push(t);
                    last = turbo.phase();
                }
            }
            let d = speed.divisor() as usize;
            for pair in flips.windows(2) {
                assert_eq!(pair[1] - pair[0], d, "{:?}", speed);
            }
            // Un periodo completo (dos cambios) = 2 x divisor
            for w in flips.windows(3) {
                assert_eq!(w[2] - w[0], 2 * d);
            }
        }
    }

    #[test]
    fn test_turbo_divisor_pairs() {
        let divisors: Vec<i8> = TurboSpeed::ALL.iter().map(|s| s.divisor()).collect();
        assert_eq!(divisors, vec![2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn test_turbo_speed_cycles_modulo_six() {
        let mut turbo = TurboEngine::new(TurboSpeed::Hz25);
        turbo.speed_advance(false);
        assert_eq!(turbo.speed(), TurboSpeed::Hz25);
        for _ in 0..4 {
            turbo.speed_advance(true);
        }
        assert_eq!(turbo.speed(), TurboSpeed::Hz12_5);
        turbo.speed_advance(true);
        assert_eq!(turbo.speed(), TurboSpeed::Hz30);
        assert_eq!(TurboSpeed::from_index(6), None);
    }

    // ------------------------------------------------------------------
    //  OutputFrameBuilder
    // ------------------------------------------------------------------

    #[test]
    fn test_three_button_pairs_repeat() {
        let mut mapper = ButtonMapper::genesis();
        for mask in all_masks().step_by(97) {
            let f = mapper.build_fragments(mask, false, false).fragments;
            let t = OutputTable::build(f, ModeState::ThreeButtonCompat).0;
            assert!(t[0] == t[2] && t[2] == t[4] && t[4] == t[6]);
            assert!(t[1] == t[3] && t[3] == t[5] && t[5] == t[7]);
            assert_eq!(t[0], !f.high);
            assert_eq!(t[1], !(f.low | 0x0c));
        }
    }

    #[test]
    fn test_six_button_framing() {
        let f = Fragments::new(0x33, 0x2d, 0x3c);
        let six = OutputTable::build(f, ModeState::SixButtonNative);
        let three = OutputTable::build(f, ModeState::ThreeButtonCompat);

        assert_eq!(six.0[..4], three.0[..4]);
        assert_eq!(six.0[4], three.0[4]);
        assert_eq!(six.0[5], !(0x33 | 0x3c));
        assert_eq!(six.0[6], !0x3c);
        assert_eq!(six.0[7], !(0x2d & 0x03));
    }

    #[test]
    fn test_six_button_slot_dependencies() {
        let base = OutputTable::build(Fragments::new(0x11, 0x22, 0x08), ModeState::SixButtonNative);

        // Slot 6 sólo depende de extra
        let other = OutputTable::build(Fragments::new(0x3f, 0x3c, 0x08), ModeState::SixButtonNative);
        assert_eq!(base.0[6], other.0[6]);

        // Slot 7 sólo depende de los bits 0-1 de high
        let other = OutputTable::build(Fragments::new(0x00, 0x3e, 0x3f), ModeState::SixButtonNative);
        assert_eq!(base.0[7], other.0[7]);
        let other = OutputTable::build(Fragments::new(0x11, 0x21, 0x08), ModeState::SixButtonNative);
        assert_ne!(base.0[7], other.0[7]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let f = Fragments::new(0x21, 0x36, 0x14);
        for mode in [ModeState::ThreeButtonCompat, ModeState::SixButtonNative] {
            assert_eq!(OutputTable::build(f, mode), OutputTable::build(f, mode));
        }
    }

    #[test]
    fn test_idle_table() {
        assert_eq!(OutputTable::IDLE.0, [0xff, 0xf3, 0xff, 0xf3, 0xff, 0xc3, 0xff, 0xff]);
    }

    // ------------------------------------------------------------------
    //  SelectEdgeDispatcher
    // ------------------------------------------------------------------

    #[test]
    fn test_position_after_n_edges() {
        let table = OutputTable([0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17]);
        for n in 0..40u32 {
            let bus = BusState::new();
            masked(|cs| bus.publish(cs, &table));
            let mut out = LastWrite(None);
            for _ in 0..n {
                bus.on_select_edge(&mut out);
            }
            assert_eq!(bus.position() as u32, n % 8);
            if n > 0 {
                assert_eq!(out.0, Some(table.slot((n % 8) as u8)));
            }
        }
    }

    #[test]
    fn test_edge_sets_polled_flag() {
        let bus = BusState::new();
        assert!(!bus.polled());
        bus.on_select_edge(&mut LastWrite(None));
        assert!(bus.polled());
        bus.clear_polled();
        assert!(!bus.polled());
    }

    #[test]
    fn test_publish_replaces_whole_table() {
        let bus = BusState::new();
        assert_eq!(bus.snapshot(), OutputTable::IDLE);
        let table = OutputTable::build(mapper::GEN_BTN_START, ModeState::SixButtonNative);
        masked(|cs| bus.publish(cs, &table));
        assert_eq!(bus.snapshot(), table);
    }

    #[test]
    fn test_realign_follows_select_level() {
        let bus = BusState::new();
        let mut out = LastWrite(None);
        for _ in 0..5 {
            bus.on_select_edge(&mut out);
        }

        masked(|cs| bus.realign(cs, true, &mut out));
        assert_eq!(bus.position(), 0);
        assert_eq!(out.0, Some(OutputTable::IDLE.0[0]));

        masked(|cs| bus.realign(cs, false, &mut out));
        assert_eq!(bus.position(), 7);
        assert_eq!(out.0, Some(OutputTable::IDLE.0[1]));

        // Desde posición 0 el siguiente flanco (bajada) muestra la posición 1
        masked(|cs| bus.realign(cs, true, &mut out));
        bus.on_select_edge(&mut out);
        assert_eq!(out.0, Some(0xf3));
    }

    fn burst_after_realign(select_high: bool, table: &OutputTable) -> [u8; 8] {
        let bus = BusState::new();
        let mut out = LastWrite(None);
        masked(|cs| {
            bus.publish(cs, table);
            bus.realign(cs, select_high, &mut out);
        });
        let mut seen = [0u8; 8];
        for slot in seen.iter_mut() {
            bus.on_select_edge(&mut out);
            *slot = out.0.unwrap();
        }
        seen
    }

    #[test]
    fn test_realign_low_starts_handshake_at_slot_zero() {
        let mut fx = mapper::GEN_BTN_A;
        fx |= mapper::GEN_BTN_X;
        let table = OutputTable::build(fx, ModeState::SixButtonNative);

        // SELECT en reposo bajo: subida -> 0, bajada -> 1, ... bajada -> 7
        let seen = burst_after_realign(false, &table);
        assert_eq!(seen, table.0);
        assert_eq!(seen, [0xff, 0xf1, 0xff, 0xf1, 0xff, 0xc1, 0xf7, 0xff]);

        // SELECT en reposo alto: bajada -> 1, ... subida -> 0
        let seen = burst_after_realign(true, &table);
        let mut rotated = table.0;
        rotated.rotate_left(1);
        assert_eq!(seen, rotated);
    }

    // ------------------------------------------------------------------
    //  PollingModeDetector
    // ------------------------------------------------------------------

    #[test]
    fn test_polling_timeout_reverts_once() {
        let bus = BusState::new();
        let mut delay = CountingDelay::default();
        let mut detector = PollingModeDetector::new(100);

        detector.observe(false);
        assert_eq!(detector.state(), PollingState::SelfTimed);

        bus.on_select_edge(&mut LastWrite(None));
        detector.observe(bus.polled());
        assert_eq!(detector.state(), PollingState::HostPolled);

        assert_eq!(detector.wait_for_poll(&bus, &mut delay), PollOutcome::TimedOut);
        assert_eq!(delay.ns, 100_000_000);
        assert_eq!(detector.state(), PollingState::SelfTimed);
        assert_eq!(detector.fallbacks(), 1);

        // Sin flancos nuevos no hay más transiciones
        for _ in 0..10 {
            detector.observe(bus.polled());
        }
        assert_eq!(detector.state(), PollingState::SelfTimed);
        assert_eq!(detector.fallbacks(), 1);
    }

    #[test]
    fn test_polling_sees_edge_before_timeout() {
        let bus = BusState::new();
        let mut detector = PollingModeDetector::new(100);
        detector.observe(true);

        // Un flanco "llega" durante la espera
        struct EdgeAfter<'b> { bus: &'b BusState, ms: u32 }
        impl DelayNs for EdgeAfter<'_> {
            fn delay_ns(&mut self, ns: u32) {
                self.ms += ns / 1_000_000;
                if self.ms == 7 {
                    self.bus.on_select_edge(&mut LastWrite(None));
                }
            }
        }
        let mut delay = EdgeAfter { bus: &bus, ms: 0 };
        assert_eq!(detector.wait_for_poll(&bus, &mut delay), PollOutcome::Polled);
        assert_eq!(delay.ms, 7);
        assert_eq!(detector.state(), PollingState::HostPolled);
        assert_eq!(detector.fallbacks(), 0);
    }

    // ------------------------------------------------------------------
    //  ModeLatch
    // ------------------------------------------------------------------

    #[test]
    fn test_mode_switch_transitions() {
        let mut latch = ModeLatch::at_power_on(false, false);
        assert_eq!(latch.mode(), ModeState::SixButtonNative);
        assert_eq!(latch.sample(true), ModeState::ThreeButtonCompat);
        assert_eq!(latch.sample(true), ModeState::ThreeButtonCompat);
        assert_eq!(latch.sample(false), ModeState::SixButtonNative);
    }

    #[test]
    fn test_power_on_latch_is_sticky() {
        let mut latch = ModeLatch::at_power_on(true, false);
        assert!(latch.is_latched());
        assert_eq!(latch.mode(), ModeState::ThreeButtonCompat);
        assert_eq!(latch.sample(true), ModeState::ThreeButtonCompat);
        assert_eq!(latch.sample(false), ModeState::ThreeButtonCompat);
    }

    #[test]
    fn test_switch_at_power_on() {
        let mut latch = ModeLatch::at_power_on(false, true);
        assert_eq!(latch.mode(), ModeState::ThreeButtonCompat);
        assert_eq!(latch.sample(false), ModeState::SixButtonNative);
    }
}
