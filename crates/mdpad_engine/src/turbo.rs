// crates/mdpad_engine/src/turbo.rs
// Turbo-fire: fase periódica y selección de velocidad.

use mdpad_core::TURBO_SPEED_COUNT;

/// Velocidades de turbo. Los pares comparten divisor: uno para 60 Hz (NTSC),
/// otro para 50 Hz (PAL).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TurboSpeed {
    Hz30 = 0,   // 60 / 2
    Hz25 = 1,   // 50 / 2
    Hz20 = 2,   // 60 / 3
    Hz16 = 3,   // 50 / 3
    Hz15 = 4,   // 60 / 4
    Hz12_5 = 5, // 50 / 4
}

impl TurboSpeed {
    pub const ALL: [TurboSpeed; TURBO_SPEED_COUNT as usize] = [
        TurboSpeed::Hz30,
        TurboSpeed::Hz25,
        TurboSpeed::Hz20,
        TurboSpeed::Hz16,
        TurboSpeed::Hz15,
        TurboSpeed::Hz12_5,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Ticks entre cambios de fase.
    pub fn divisor(self) -> i8 {
        match self {
            TurboSpeed::Hz30 | TurboSpeed::Hz25 => 2,
            TurboSpeed::Hz20 | TurboSpeed::Hz16 => 3,
            TurboSpeed::Hz15 | TurboSpeed::Hz12_5 => 4,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() as usize + 1) % Self::ALL.len()]
    }
}

pub struct TurboEngine {
    speed: TurboSpeed,
    phase: bool,
    countdown: i8,
}

impl TurboEngine {
    pub fn new(speed: TurboSpeed) -> Self {
        Self {
            speed,
            phase: false,
            countdown: 0,
        }
    }

    pub fn speed_advance(&mut self, edge: bool) {
        if edge {
            self.speed = self.speed.next();
            log::info!("Turbo speed -> {:?}", self.speed);
        }
    }

    /// Un tick por iteración del lazo principal.
    pub fn tick(&mut self) {
        if self.countdown <= 0 {
            self.countdown = self.speed.divisor();
            self.phase = !self.phase;
        }
        self.countdown -= 1;
    }

    pub fn phase(&self) -> bool {
        self.phase
    }

    pub fn speed(&self) -> TurboSpeed {
        self.speed
    }
}
