// crates/mdpad_engine/src/frame.rs
// Armado de la tabla de 8 posiciones que recorre la interrupción de SELECT.

use crate::mapper::Fragments;

/// Left/Right forzados a "presionado" con SELECT en bajo: firma de mando Genesis.
pub const DIRECTION_SUPPRESS: u8 = 0x0c;
/// Up/Down/Left/Right en bajo en la 3ra fase baja: firma de mando de 6 botones.
pub const SIX_BUTTON_ID_SUPPRESS: u8 = 0x3c;
/// Última fase baja: sólo pasan los bits 0-1, la cruceta queda suelta.
pub const SLOT7_PASS: u8 = 0x03;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeState {
    ThreeButtonCompat,
    SixButtonNative,
}

/// Niveles de bus (ya invertidos) para cada posición del ciclo de SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputTable(pub [u8; 8]);

impl OutputTable {
    /// Tabla de encendido: nada presionado, protocolo de 6 botones.
    pub const IDLE: OutputTable = OutputTable::build(Fragments::NONE, ModeState::SixButtonNative);

    pub const fn build(f: Fragments, mode: ModeState) -> Self {
        let low = f.low | DIRECTION_SUPPRESS;
        let mut slots = match mode {
            ModeState::ThreeButtonCompat => [f.high, low, f.high, low, f.high, low, f.high, low],
            // Las posiciones 0-3 son idénticas al modo de 3 botones; los juegos
            // viejos sólo miran ese prefijo.
            ModeState::SixButtonNative => [
                f.high,
                low,
                f.high,
                low,
                f.high,
                f.low | SIX_BUTTON_ID_SUPPRESS,
                f.extra,
                f.high & SLOT7_PASS,
            ],
        };

        // Bus activo en bajo
        let mut i = 0;
        while i < slots.len() {
            slots[i] = !slots[i];
            i += 1;
        }
        OutputTable(slots)
    }

    #[inline(always)]
    pub fn slot(&self, position: u8) -> u8 {
        self.0[(position & 7) as usize]
    }

    /// La tabla en lógica positiva (1 = línea tirada a bajo).
    pub fn asserted(&self) -> [u8; 8] {
        self.0.map(|b| !b)
    }
}
