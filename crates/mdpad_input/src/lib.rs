// crates/mdpad_input/src/lib.rs
#![cfg_attr(not(test), no_std)]

use bitflags::bitflags;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use mdpad_core::InputPort;


// ============================================================================
//  ESTADO NORMALIZADO DEL MANDO
// ============================================================================

bitflags! {
    /// Botones canónicos de un mando Genesis de 6 botones.
    ///
    /// El layout coincide con el cableado directo (banco bajo en bits 0-5,
    /// banco alto en bits 8-14), así el modo passthrough no necesita remapeo.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct ButtonMask: u16 {
        const B     = 0x0001;
        const X     = 0x0002;
        const MODE  = 0x0004;
        const START = 0x0008;
        const UP    = 0x0010;
        const DOWN  = 0x0020;
        const LEFT  = 0x0100;
        const RIGHT = 0x0200;
        const A     = 0x0800;
        const C     = 0x1000;
        const Y     = 0x2000;
        const Z     = 0x4000;
    }
}

// ============================================================================
//  TRAIT PARA FUENTES (CONTRACT)
// ============================================================================

/// Cualquier mando físico capaz de producir un [`ButtonMask`].
///
/// `refresh()` muestrea el hardware; `current_mask()` devuelve la última
/// muestra. Sin refresh la muestra anterior se mantiene intacta (vacía al
/// arrancar).
pub trait InputSource {
    fn refresh(&mut self);
    fn current_mask(&self) -> ButtonMask;
}

// ============================================================================
//  PASSTHROUGH (MANDO GENESIS CABLEADO DIRECTO)
// ============================================================================

/// Bits útiles del banco bajo: B, X, Mode, Start, Up, Down.
const LOW_BANK_MASK: u8 = 0x3F;
/// Bits útiles del banco alto: Left, Right, A, C, Y, Z.
/// El bit 2 es SELECT y el bit 7 el interruptor 3/6, quedan fuera.
const HIGH_BANK_MASK: u8 = 0x7B;

/// 12 pulsadores cableados a dos bancos GPIO con pull-up (activo en bajo).
pub struct Passthrough<L, H> {
    low: L,
    high: H,
    snapshot: ButtonMask,
}

impl<L: InputPort, H: InputPort> Passthrough<L, H> {
    pub fn new(low: L, high: H) -> Self {
        Self {
            low,
            high,
            snapshot: ButtonMask::empty(),
        }
    }
}

impl<L: InputPort, H: InputPort> InputSource for Passthrough<L, H> {
    fn refresh(&mut self) {
        let low = !self.low.read() & LOW_BANK_MASK;
        let high = !self.high.read() & HIGH_BANK_MASK;
        self.snapshot = ButtonMask::from_bits_truncate(low as u16 | (high as u16) << 8);
    }

    fn current_mask(&self) -> ButtonMask {
        self.snapshot
    }
}

// ============================================================================
//  SHIFT REGISTER (MANDOS SNES / NES)
// ============================================================================

/// Pulso de latch al inicio de cada lectura.
pub const LATCH_PULSE_US: u32 = 12;
/// Medio periodo de clock. 12 + 16 * 2 * 6 = 204 us por lectura.
pub const CLOCK_HALF_US: u32 = 6;
/// Bits leídos por transacción (12 botones SNES + 4 de identificación).
const WIRE_BITS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKind {
    Snes,
    Nes,
}

// Orden en el cable (primer bit primero) -> botón canónico.
const SNES_WIRE_ORDER: [ButtonMask; 12] = [
    ButtonMask::B,     // B
    ButtonMask::X,     // Y
    ButtonMask::MODE,  // Select
    ButtonMask::START, // Start
    ButtonMask::UP,
    ButtonMask::DOWN,
    ButtonMask::LEFT,
    ButtonMask::RIGHT,
    ButtonMask::A,     // A
    ButtonMask::C,     // X
    ButtonMask::Y,     // L
    ButtonMask::Z,     // R
];

const NES_WIRE_ORDER: [ButtonMask; 8] = [
    ButtonMask::A,
    ButtonMask::B,
    ButtonMask::MODE,  // Select
    ButtonMask::START,
    ButtonMask::UP,
    ButtonMask::DOWN,
    ButtonMask::LEFT,
    ButtonMask::RIGHT,
];

/// Mando serie SNES (12 botones) o NES (8 botones), detectado en cada lectura.
pub struct ShiftRegister<LATCH, CLK, DATA, D> {
    latch: LATCH,
    clock: CLK,
    data: DATA,
    delay: D,
    /// Últimos bytes leídos; 1 = línea en bajo (presionado).
    raw: [u8; 2],
    kind: PadKind,
    snapshot: ButtonMask,
}

impl<LATCH, CLK, DATA, D> ShiftRegister<LATCH, CLK, DATA, D>
where
    LATCH: OutputPin,
    CLK: OutputPin,
    DATA: InputPin,
    D: DelayNs,
{
    pub fn new(latch: LATCH, clock: CLK, data: DATA, delay: D) -> Self {
        Self {
            latch,
            clock,
            data,
            delay,
            raw: [0; 2],
            kind: PadKind::Snes,
            snapshot: ButtonMask::empty(),
        }
    }

    pub fn kind(&self) -> PadKind {
        self.kind
    }

    pub fn raw(&self) -> [u8; 2] {
        self.raw
    }

    /// Una transacción completa: latch y 16 pulsos de clock.
    /// Devuelve los bits con el primero del cable en el bit 15.
    fn clock_in(&mut self) -> Option<u16> {
        self.latch.set_high().ok()?;
        self.delay.delay_us(LATCH_PULSE_US);
        self.latch.set_low().ok()?;

        let mut bits = 0u16;
        for _ in 0..WIRE_BITS {
            bits <<= 1;
            if self.data.is_low().ok()? {
                bits |= 1;
            }
            self.clock.set_low().ok()?;
            self.delay.delay_us(CLOCK_HALF_US);
            self.clock.set_high().ok()?;
            self.delay.delay_us(CLOCK_HALF_US);
        }
        Some(bits)
    }
}

impl<LATCH, CLK, DATA, D> InputSource for ShiftRegister<LATCH, CLK, DATA, D>
where
    LATCH: OutputPin,
    CLK: OutputPin,
    DATA: InputPin,
    D: DelayNs,
{
    fn refresh(&mut self) {
        let Some(bits) = self.clock_in() else {
            log::warn!("Shift register read failed, keeping previous snapshot");
            return;
        };
        self.raw = [(bits >> 8) as u8, bits as u8];

        // Un SNES deja los 4 bits finales en alto (suelto). Un NES ya no
        // tiene nada que desplazar y la línea queda en bajo.
        let kind = if self.raw[1] & 0x0F == 0x0F {
            PadKind::Nes
        } else {
            PadKind::Snes
        };
        if kind != self.kind {
            log::info!("Pad type changed: {:?} -> {:?}", self.kind, kind);
            self.kind = kind;
        }

        let order: &[ButtonMask] = match kind {
            PadKind::Snes => &SNES_WIRE_ORDER,
            PadKind::Nes => &NES_WIRE_ORDER,
        };
        let mut mask = ButtonMask::empty();
        for (i, button) in order.iter().enumerate() {
            if bits & (0x8000 >> i) != 0 {
                mask |= *button;
            }
        }
        self.snapshot = mask;
    }

    fn current_mask(&self) -> ButtonMask {
        self.snapshot
    }
}
