// crates/mdpad_engine/src/mapper.rs
// Botón canónico -> líneas del puerto Genesis en cada fase de SELECT.

use core::ops::BitOrAssign;
use mdpad_input::ButtonMask;

/// Aporte de un botón a cada fase del multiplexado (antes de invertir).
///
/// - `low`:   SELECT en bajo (Up, Down, A, Start)
/// - `high`:  SELECT en alto (Up, Down, Left, Right, B, C)
/// - `extra`: tercer alto del protocolo de 6 botones (X, Y, Z, Mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fragments {
    pub low: u8,
    pub high: u8,
    pub extra: u8,
}

impl Fragments {
    pub const NONE: Fragments = Fragments::new(0, 0, 0);

    pub const fn new(low: u8, high: u8, extra: u8) -> Self {
        Self { low, high, extra }
    }
}

impl BitOrAssign for Fragments {
    fn bitor_assign(&mut self, rhs: Self) {
        self.low |= rhs.low;
        self.high |= rhs.high;
        self.extra |= rhs.extra;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    None,
    /// Sólo se reporta mientras la fase de turbo está activa.
    Turbo,
    /// Cada pulsación avanza la velocidad de turbo.
    TurboSpeedSelect,
}

#[derive(Debug, Clone, Copy)]
pub struct MappingEntry {
    pub button: ButtonMask,
    pub fragments: Fragments,
    pub behavior: Behavior,
}

impl MappingEntry {
    pub const fn new(button: ButtonMask, fragments: Fragments) -> Self {
        Self { button, fragments, behavior: Behavior::None }
    }

    pub const fn with_behavior(self, behavior: Behavior) -> Self {
        Self { behavior, ..self }
    }
}

// ============================================================================
//  MAPA FIJO GENESIS
// ============================================================================

pub const GEN_BTN_A: Fragments = Fragments::new(0x02, 0x00, 0x00);
pub const GEN_BTN_B: Fragments = Fragments::new(0x00, 0x02, 0x00);
pub const GEN_BTN_C: Fragments = Fragments::new(0x00, 0x01, 0x00);
pub const GEN_BTN_X: Fragments = Fragments::new(0x00, 0x00, 0x08);
pub const GEN_BTN_Y: Fragments = Fragments::new(0x00, 0x00, 0x10);
pub const GEN_BTN_Z: Fragments = Fragments::new(0x00, 0x00, 0x20);
pub const GEN_BTN_START: Fragments = Fragments::new(0x01, 0x00, 0x00);
pub const GEN_BTN_MODE: Fragments = Fragments::new(0x00, 0x00, 0x04);
pub const GEN_BTN_DPAD_UP: Fragments = Fragments::new(0x20, 0x20, 0x00);
pub const GEN_BTN_DPAD_DOWN: Fragments = Fragments::new(0x10, 0x10, 0x00);
pub const GEN_BTN_DPAD_LEFT: Fragments = Fragments::new(0x00, 0x08, 0x00);
pub const GEN_BTN_DPAD_RIGHT: Fragments = Fragments::new(0x00, 0x04, 0x00);

pub static GENESIS_MAP: [MappingEntry; 12] = [
    MappingEntry::new(ButtonMask::A, GEN_BTN_A),
    MappingEntry::new(ButtonMask::B, GEN_BTN_B),
    MappingEntry::new(ButtonMask::C, GEN_BTN_C),
    MappingEntry::new(ButtonMask::X, GEN_BTN_X),
    MappingEntry::new(ButtonMask::Y, GEN_BTN_Y),
    MappingEntry::new(ButtonMask::Z, GEN_BTN_Z),
    MappingEntry::new(ButtonMask::START, GEN_BTN_START),
    MappingEntry::new(ButtonMask::MODE, GEN_BTN_MODE),
    MappingEntry::new(ButtonMask::UP, GEN_BTN_DPAD_UP),
    MappingEntry::new(ButtonMask::DOWN, GEN_BTN_DPAD_DOWN),
    MappingEntry::new(ButtonMask::LEFT, GEN_BTN_DPAD_LEFT),
    MappingEntry::new(ButtonMask::RIGHT, GEN_BTN_DPAD_RIGHT),
];

// ============================================================================
//  MAPPER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperOutput {
    pub fragments: Fragments,
    /// El botón de velocidad de turbo pasó de suelto a presionado.
    pub speed_edge: bool,
}

pub struct ButtonMapper {
    map: &'static [MappingEntry],
    speed_button_down: bool,
}

impl ButtonMapper {
    pub const fn new(map: &'static [MappingEntry]) -> Self {
        Self { map, speed_button_down: false }
    }

    pub fn genesis() -> Self {
        Self::new(&GENESIS_MAP)
    }

    pub fn build_fragments(&mut self, mask: ButtonMask, ignore: bool, turbo_phase: bool) -> MapperOutput {
        let mut fragments = Fragments::NONE;
        let mut speed_down = false;

        for entry in self.map {
            let pressed = mask.intersects(entry.button);

            // La velocidad se puede cambiar aunque la compuerta siga cerrada
            if entry.behavior == Behavior::TurboSpeedSelect && pressed {
                speed_down = true;
            }

            if !pressed || ignore {
                continue;
            }
            if entry.behavior != Behavior::Turbo || turbo_phase {
                fragments |= entry.fragments;
            }
        }

        let speed_edge = speed_down && !self.speed_button_down;
        self.speed_button_down = speed_down;

        MapperOutput { fragments, speed_edge }
    }
}

// ============================================================================
//  COMPUERTA DE ENCENDIDO
// ============================================================================

/// Ignora toda entrada hasta ver una muestra sin botones presionados.
///
/// Evita que botones mantenidos al encender (o líneas flotando) confundan la
/// detección de la consola. Una vez abierta no se vuelve a cerrar.
pub struct IgnoreGate {
    armed: bool,
}

impl IgnoreGate {
    pub const fn new() -> Self {
        Self { armed: true }
    }

    /// Actualiza con la muestra actual y devuelve si hay que ignorarla.
    pub fn update(&mut self, mask: ButtonMask) -> bool {
        if self.armed && mask.is_empty() {
            log::debug!("Ignore gate released: first idle sample seen");
            self.armed = false;
        }
        self.armed
    }

    pub fn is_ignoring(&self) -> bool {
        self.armed
    }
}

impl Default for IgnoreGate {
    fn default() -> Self {
        Self::new()
    }
}
