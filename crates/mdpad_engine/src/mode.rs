// crates/mdpad_engine/src/mode.rs

use crate::frame::ModeState;

/// Modo de compatibilidad 3 botones.
///
/// Algunos juegos (Golden Axe II, por ejemplo) se confunden con un mando de 6
/// botones. Se fuerza el modo 3 botones manteniendo MODE al encender (queda
/// fijo hasta apagar) o con el interruptor 3/6, que puede moverse en caliente.
pub struct ModeLatch {
    power_on_latch: bool,
    switch: bool,
}

impl ModeLatch {
    pub fn at_power_on(mode_held: bool, switch: bool) -> Self {
        if mode_held {
            log::info!("MODE held at power-on: 3-button compatibility latched");
        }
        let latch = Self { power_on_latch: mode_held, switch };
        log::info!("Initial mode: {:?}", latch.mode());
        latch
    }

    /// Muestra el interruptor (una vez por tick) y devuelve el modo vigente.
    pub fn sample(&mut self, switch: bool) -> ModeState {
        if switch != self.switch {
            self.switch = switch;
            log::info!(
                "3/6 switch {} -> {:?}",
                if switch { "on" } else { "off" },
                self.mode()
            );
        }
        self.mode()
    }

    pub fn mode(&self) -> ModeState {
        if self.power_on_latch || self.switch {
            ModeState::ThreeButtonCompat
        } else {
            ModeState::SixButtonNative
        }
    }

    pub fn is_latched(&self) -> bool {
        self.power_on_latch
    }
}
