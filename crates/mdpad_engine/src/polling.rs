// crates/mdpad_engine/src/polling.rs
// ¿La consola mueve SELECT (Genesis) o nunca lo toca (juegos de Master System)?

use mdpad_core::DelayNs;

use crate::dispatcher::BusState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingState {
    /// Refresco propio a periodo fijo.
    SelfTimed,
    /// La consola lee el puerto; se refresca después de cada lectura.
    HostPolled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Polled,
    TimedOut,
}

pub struct PollingModeDetector {
    state: PollingState,
    timeout_ms: u32,
    fallbacks: u32,
}

impl PollingModeDetector {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            state: PollingState::SelfTimed,
            timeout_ms,
            fallbacks: 0,
        }
    }

    pub fn state(&self) -> PollingState {
        self.state
    }

    /// Veces que se volvió a modo auto-temporizado por silencio de SELECT.
    pub fn fallbacks(&self) -> u32 {
        self.fallbacks
    }

    /// En modo auto-temporizado: cualquier flanco visto activa el modo consola.
    pub fn observe(&mut self, polled: bool) {
        if self.state == PollingState::SelfTimed && polled {
            log::info!("SELECT activity detected: host-polled mode");
            self.state = PollingState::HostPolled;
        }
    }

    /// Espera activa (pasos de 1 ms) hasta el próximo flanco o el timeout.
    pub fn wait_for_poll<D: DelayNs>(&mut self, bus: &BusState, delay: &mut D) -> PollOutcome {
        bus.clear_polled();
        let mut waited_ms = 0;
        loop {
            if bus.polled() {
                return PollOutcome::Polled;
            }
            if waited_ms >= self.timeout_ms {
                log::info!("No SELECT activity for {} ms: self-timed mode", self.timeout_ms);
                self.state = PollingState::SelfTimed;
                self.fallbacks += 1;
                return PollOutcome::TimedOut;
            }
            delay.delay_ms(1);
            waited_ms += 1;
        }
    }
}
