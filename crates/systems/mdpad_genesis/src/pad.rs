// crates/systems/mdpad_genesis/src/pad.rs
// Mandos del banco de pruebas: teclado (ventana minifb) o guion fijo.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use mdpad_input::{ButtonMask, InputSource};
use minifb::Key;

use crate::board::SimWires;

// ============================================================================
//  TECLADO
// ============================================================================

/// Teclas presionadas, compartidas entre la ventana y el mando.
pub type HeldKeys = Rc<RefCell<Vec<Key>>>;

pub struct KeyboardPad {
    held: HeldKeys,
    key_map: HashMap<Key, ButtonMask>,
    snapshot: ButtonMask,
}

impl KeyboardPad {
    /// Mapeo por defecto: flechas + fila A/S/D y Q/W/E, Enter y Shift.
    pub fn new(held: HeldKeys) -> Self {
        let mut pad = Self { held, key_map: HashMap::new(), snapshot: ButtonMask::empty() };
        pad.load_default_mapping();
        pad
    }

    fn load_default_mapping(&mut self) {
        self.map(Key::Up, ButtonMask::UP);
        self.map(Key::Down, ButtonMask::DOWN);
        self.map(Key::Left, ButtonMask::LEFT);
        self.map(Key::Right, ButtonMask::RIGHT);

        self.map(Key::A, ButtonMask::A);
        self.map(Key::S, ButtonMask::B);
        self.map(Key::D, ButtonMask::C);
        self.map(Key::Q, ButtonMask::X);
        self.map(Key::W, ButtonMask::Y);
        self.map(Key::E, ButtonMask::Z);

        self.map(Key::Enter, ButtonMask::START);
        self.map(Key::RightShift, ButtonMask::MODE);
    }

    /// Asocia una tecla física a un botón canónico.
    pub fn map(&mut self, key: Key, button: ButtonMask) {
        self.key_map.insert(key, button);
    }

    pub fn mask_for(&self, keys: &[Key]) -> ButtonMask {
        keys.iter()
            .filter_map(|k| self.key_map.get(k))
            .fold(ButtonMask::empty(), |acc, b| acc | *b)
    }
}

impl InputSource for KeyboardPad {
    fn refresh(&mut self) {
        self.snapshot = self.mask_for(&self.held.borrow());
    }

    fn current_mask(&self) -> ButtonMask {
        self.snapshot
    }
}

// ============================================================================
//  GUION (SIN VENTANA)
// ============================================================================

/// Recorrido fijo de botones, un paso cada `STEP_US` de reloj virtual.
pub static DEMO_SCRIPT: [ButtonMask; 14] = [
    ButtonMask::empty(),
    ButtonMask::A,
    ButtonMask::B,
    ButtonMask::C,
    ButtonMask::START,
    ButtonMask::empty(),
    ButtonMask::X,
    ButtonMask::Y,
    ButtonMask::Z,
    ButtonMask::MODE,
    ButtonMask::empty(),
    ButtonMask::UP.union(ButtonMask::LEFT),
    ButtonMask::DOWN.union(ButtonMask::RIGHT),
    ButtonMask::A.union(ButtonMask::B).union(ButtonMask::C),
];

pub const STEP_US: u64 = 250_000;

pub struct ScriptedPad {
    wires: Rc<SimWires>,
    script: &'static [ButtonMask],
    snapshot: ButtonMask,
}

impl ScriptedPad {
    pub fn new(wires: Rc<SimWires>, script: &'static [ButtonMask]) -> Self {
        Self { wires, script, snapshot: ButtonMask::empty() }
    }

    pub fn demo(wires: Rc<SimWires>) -> Self {
        Self::new(wires, &DEMO_SCRIPT)
    }
}

impl InputSource for ScriptedPad {
    fn refresh(&mut self) {
        if self.script.is_empty() {
            return;
        }
        let step = (self.wires.now_us() / STEP_US) as usize % self.script.len();
        self.snapshot = self.script[step];
    }

    fn current_mask(&self) -> ButtonMask {
        self.snapshot
    }
}

// ============================================================================
//  MODE MANTENIDO AL ENCENDER
// ============================================================================

/// Suma `held` a la primera lectura: simula encender con un botón apretado.
pub struct PowerOnHold<I> {
    inner: I,
    held: ButtonMask,
    first: bool,
    active: bool,
}

impl<I: InputSource> PowerOnHold<I> {
    pub fn new(inner: I, held: ButtonMask) -> Self {
        Self { inner, held, first: true, active: false }
    }
}

impl<I: InputSource> InputSource for PowerOnHold<I> {
    fn refresh(&mut self) {
        self.inner.refresh();
        self.active = self.first;
        self.first = false;
    }

    fn current_mask(&self) -> ButtonMask {
        if self.active {
            self.inner.current_mask() | self.held
        } else {
            self.inner.current_mask()
        }
    }
}
