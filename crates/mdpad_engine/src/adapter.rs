// crates/mdpad_engine/src/adapter.rs
// Lazo principal (foreground) del adaptador.

use mdpad_core::{
    AdapterConfig, CompatSwitch, ConfigError, DelayNs, EdgeIrq, PadOutput, SelectLine,
};
use mdpad_input::{ButtonMask, InputSource};

use crate::dispatcher::BusState;
use crate::frame::{ModeState, OutputTable};
use crate::mapper::{ButtonMapper, IgnoreGate};
use crate::mode::ModeLatch;
use crate::polling::{PollingModeDetector, PollingState};
use crate::turbo::{TurboEngine, TurboSpeed};

/// Lo que el lazo principal necesita de la placa además del mando.
pub trait Board: SelectLine + CompatSwitch + EdgeIrq {}
impl<T: SelectLine + CompatSwitch + EdgeIrq> Board for T {}

pub struct Adapter<'a, I, B, O, D> {
    bus: &'a BusState,
    input: I,
    board: B,
    output: O,
    delay: D,
    config: AdapterConfig,

    mapper: ButtonMapper,
    gate: IgnoreGate,
    turbo: TurboEngine,
    polling: PollingModeDetector,
    mode: ModeLatch,

    /// Tabla armada en el tick anterior, se publica en el próximo refresco.
    pending: OutputTable,
}

impl<'a, I, B, O, D> Adapter<'a, I, B, O, D>
where
    I: InputSource,
    B: Board,
    O: PadOutput,
    D: DelayNs,
{
    /// Secuencia de encendido. La IRQ de SELECT puede habilitarse al volver.
    pub fn power_on(
        bus: &'a BusState,
        mut input: I,
        mut board: B,
        output: O,
        mut delay: D,
        config: AdapterConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let speed = TurboSpeed::from_index(config.initial_turbo_speed)
            .ok_or(ConfigError::TurboSpeedOutOfRange(config.initial_turbo_speed))?;

        let switch = board.is_asserted();
        delay.delay_ms(config.power_on_settle_ms);

        input.refresh();
        let first = input.current_mask();
        let mode = ModeLatch::at_power_on(first.contains(ButtonMask::MODE), switch);

        let mut adapter = Self {
            bus,
            input,
            board,
            output,
            delay,
            config,
            mapper: ButtonMapper::genesis(),
            gate: IgnoreGate::new(),
            turbo: TurboEngine::new(speed),
            polling: PollingModeDetector::new(config.poll_timeout_ms),
            pending: OutputTable::build(Default::default(), mode.mode()),
            mode,
        };

        // Posición inicial según el nivel de SELECT, con la tabla de reposo
        let (bus, board, output) = (adapter.bus, &adapter.board, &mut adapter.output);
        board.without_edge_irq(|cs| bus.realign(cs, board.is_high(), output));

        Ok(adapter)
    }

    /// Una iteración del lazo principal.
    pub fn tick(&mut self) {
        let switch = self.board.is_asserted();
        let mode = self.mode.sample(switch);

        match self.polling.state() {
            PollingState::SelfTimed => {
                self.delay.delay_ms(self.config.self_timed_period_ms);
                self.input.refresh();
                self.publish_pending();
                self.polling.observe(self.bus.polled());
            }
            PollingState::HostPolled => {
                // Timeout o no, se refresca igual
                self.polling.wait_for_poll(self.bus, &mut self.delay);
                // Dejar terminar la ráfaga de flancos de la lectura de 6 botones
                self.delay.delay_us(self.config.host_read_settle_us);
                self.publish_pending();
                self.input.refresh();
            }
        }

        self.turbo.tick();

        let mask = self.input.current_mask();
        let ignore = self.gate.update(mask);
        let mapped = self.mapper.build_fragments(mask, ignore, self.turbo.phase());
        self.turbo.speed_advance(mapped.speed_edge);

        self.pending = OutputTable::build(mapped.fragments, mode);
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
        }
    }

    fn publish_pending(&mut self) {
        let (bus, table) = (self.bus, &self.pending);
        let (board, output) = (&self.board, &mut self.output);
        board.without_edge_irq(|cs| {
            bus.publish(cs, table);
            bus.realign(cs, board.is_high(), output);
        });
    }

    // ------------------------------------------------------------------
    //  Diagnóstico
    // ------------------------------------------------------------------

    pub fn mode(&self) -> ModeState {
        self.mode.mode()
    }

    pub fn polling(&self) -> &PollingModeDetector {
        &self.polling
    }

    pub fn turbo(&self) -> &TurboEngine {
        &self.turbo
    }

    pub fn is_ignoring_input(&self) -> bool {
        self.gate.is_ignoring()
    }

    pub fn pending_table(&self) -> &OutputTable {
        &self.pending
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }
}
