// crates/systems/mdpad_genesis/src/console.rs
// Consola Genesis virtual: una rutina de lectura del puerto por frame.

use mdpad_input::ButtonMask;

/// Lo que la consola ve del puerto: la línea TH (SELECT) y las 6 líneas de datos.
pub trait ConsoleLines {
    /// Mueve TH. Si el nivel cambia, el mando ve un flanco.
    fn drive_select(&mut self, high: bool);
    fn select_is_high(&self) -> bool;
    /// Niveles crudos de las líneas de datos (activo en bajo).
    fn sample(&self) -> u8;
}

/// Rutina de lectura que corre la consola una vez por frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRoutine {
    /// Handshake completo de 6 botones: 8 flancos.
    Six,
    /// Lectura clásica de 3 botones: 2 flancos.
    Three,
    /// Master System: nunca mueve TH, sólo muestrea.
    Sms,
}

impl HostRoutine {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "six" => Some(HostRoutine::Six),
            "three" => Some(HostRoutine::Three),
            "sms" => Some(HostRoutine::Sms),
            _ => None,
        }
    }
}

/// Tipo de mando que dedujo la rutina de lectura.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedPad {
    /// Sin la firma de Left/Right en bajo: no hay mando Genesis.
    Absent,
    ThreeButton,
    SixButton,
    /// La rutina no puede distinguir (SMS).
    Unidentified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleRead {
    pub buttons: ButtonMask,
    pub pad: DetectedPad,
    /// Muestras en lógica positiva (1 = presionado), en orden de lectura.
    pub lines: [u8; 8],
}

const LINE_MASK: u8 = 0x3f;

pub struct VirtualConsole {
    routine: HostRoutine,
    frames: u64,
    last: Option<ConsoleRead>,
}

impl VirtualConsole {
    pub fn new(routine: HostRoutine) -> Self {
        Self { routine, frames: 0, last: None }
    }

    pub fn routine(&self) -> HostRoutine {
        self.routine
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_read(&self) -> Option<&ConsoleRead> {
        self.last.as_ref()
    }

    /// Lectura de un frame. TH queda en alto al terminar.
    pub fn read_frame<L: ConsoleLines>(&mut self, lines: &mut L) -> ConsoleRead {
        if !lines.select_is_high() {
            lines.drive_select(true);
        }

        let edges = match self.routine {
            HostRoutine::Six => 8,
            HostRoutine::Three => 2,
            HostRoutine::Sms => 0,
        };

        let mut raw = [0u8; 8];
        raw[0] = !lines.sample() & LINE_MASK;
        for edge in 1..=edges {
            lines.drive_select(edge % 2 == 0);
            // La última vuelta a alto no se muestrea
            if edge < 8 {
                raw[edge] = !lines.sample() & LINE_MASK;
            }
        }

        let read = decode(self.routine, raw);
        if self.last.map(|l| l.buttons != read.buttons || l.pad != read.pad).unwrap_or(true) {
            log::debug!("Console read: {:?} ({:?}) lines {:02x?}", read.buttons, read.pad, read.lines);
        }
        self.last = Some(read);
        self.frames += 1;
        read
    }
}

// ============================================================================
//  DECODIFICACIÓN (como lo hace el software de la consola)
// ============================================================================

fn decode_high(high: u8) -> ButtonMask {
    let mut buttons = ButtonMask::empty();
    buttons.set(ButtonMask::UP, high & 0x20 != 0);
    buttons.set(ButtonMask::DOWN, high & 0x10 != 0);
    buttons.set(ButtonMask::LEFT, high & 0x08 != 0);
    buttons.set(ButtonMask::RIGHT, high & 0x04 != 0);
    buttons.set(ButtonMask::B, high & 0x02 != 0);
    buttons.set(ButtonMask::C, high & 0x01 != 0);
    buttons
}

fn decode(routine: HostRoutine, raw: [u8; 8]) -> ConsoleRead {
    let mut buttons = decode_high(raw[0]);

    let pad = match routine {
        HostRoutine::Sms => DetectedPad::Unidentified,
        HostRoutine::Three | HostRoutine::Six => {
            let low = raw[1];
            if low & 0x0c != 0x0c {
                DetectedPad::Absent
            } else {
                buttons.set(ButtonMask::A, low & 0x02 != 0);
                buttons.set(ButtonMask::START, low & 0x01 != 0);

                if routine == HostRoutine::Six && raw[5] & 0x3c == 0x3c {
                    let extra = raw[6];
                    buttons.set(ButtonMask::Z, extra & 0x20 != 0);
                    buttons.set(ButtonMask::Y, extra & 0x10 != 0);
                    buttons.set(ButtonMask::X, extra & 0x08 != 0);
                    buttons.set(ButtonMask::MODE, extra & 0x04 != 0);
                    DetectedPad::SixButton
                } else {
                    DetectedPad::ThreeButton
                }
            }
        }
    };

    if pad == DetectedPad::Absent {
        buttons = ButtonMask::empty();
    }

    ConsoleRead { buttons, pad, lines: raw }
}
