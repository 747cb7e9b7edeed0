// crates/systems/mdpad_genesis/src/board.rs
// Placa virtual: líneas del puerto DB9, interruptor 3/6 y un reloj en
// microsegundos que hace avanzar a la consola.

use std::cell::Cell;
use std::rc::Rc;

use mdpad_core::{CompatSwitch, DelayNs, EdgeIrq, IrqMasked, PadOutput, SelectLine};
use mdpad_engine::BusState;

use crate::console::{ConsoleLines, VirtualConsole};

/// Un frame NTSC redondeado.
pub const FRAME_US: u64 = 16_667;

/// Cables compartidos entre la placa, el puerto, el reloj y la consola.
#[derive(Debug)]
pub struct SimWires {
    select_high: Cell<bool>,
    port: Cell<u8>,
    switch: Cell<bool>,
    now_us: Cell<u64>,
    masked: Cell<bool>,
}

impl SimWires {
    pub fn new(switch: bool) -> Rc<Self> {
        Rc::new(Self {
            select_high: Cell::new(true),
            port: Cell::new(0xff),
            switch: Cell::new(switch),
            now_us: Cell::new(0),
            masked: Cell::new(false),
        })
    }

    pub fn now_us(&self) -> u64 {
        self.now_us.get()
    }

    pub fn set_switch(&self, on: bool) {
        self.switch.set(on);
    }
}

// ============================================================================
//  PLACA
// ============================================================================

pub struct SimBoard(Rc<SimWires>);

impl SimBoard {
    pub fn new(wires: Rc<SimWires>) -> Self {
        Self(wires)
    }
}

impl SelectLine for SimBoard {
    fn is_high(&self) -> bool {
        self.0.select_high.get()
    }
}

impl CompatSwitch for SimBoard {
    fn is_asserted(&mut self) -> bool {
        self.0.switch.get()
    }
}

impl EdgeIrq for SimBoard {
    fn without_edge_irq<R>(&self, f: impl FnOnce(&IrqMasked<'_>) -> R) -> R {
        self.0.masked.set(true);
        // SAFETY: la consola sólo mueve SELECT desde el reloj, nunca dentro de esta sección
        let cs = unsafe { IrqMasked::new() };
        let r = f(&cs);
        self.0.masked.set(false);
        r
    }
}

#[derive(Clone)]
pub struct SimPort(Rc<SimWires>);

impl SimPort {
    pub fn new(wires: Rc<SimWires>) -> Self {
        Self(wires)
    }
}

impl PadOutput for SimPort {
    fn write(&mut self, levels: u8) {
        self.0.port.set(levels);
    }
}

// ============================================================================
//  RELOJ VIRTUAL
// ============================================================================

/// Lado consola del conector: mover TH dispara el handler de flanco.
struct HostSide<'a> {
    bus: &'a BusState,
    port: SimPort,
}

impl ConsoleLines for HostSide<'_> {
    fn drive_select(&mut self, high: bool) {
        let wires = &self.port.0;
        if wires.select_high.get() == high {
            return;
        }
        wires.select_high.set(high);
        if wires.masked.get() {
            log::warn!("SELECT edge while the edge IRQ is masked");
        }
        self.bus.on_select_edge(&mut self.port);
    }

    fn select_is_high(&self) -> bool {
        self.port.0.select_high.get()
    }

    fn sample(&self) -> u8 {
        self.port.0.port.get()
    }
}

/// `DelayNs` del adaptador: cada espera avanza el reloj y, si cruza el
/// comienzo de un frame, la consola hace su lectura.
pub struct SimDelay {
    bus: &'static BusState,
    wires: Rc<SimWires>,
    console: VirtualConsole,
    next_frame_us: u64,
    host_active: bool,
}

impl SimDelay {
    pub fn new(bus: &'static BusState, wires: Rc<SimWires>, console: VirtualConsole) -> Self {
        Self { bus, wires, console, next_frame_us: FRAME_US, host_active: true }
    }

    pub fn console(&self) -> &VirtualConsole {
        &self.console
    }

    /// Consola "apagada": los frames pasan sin lecturas.
    pub fn set_host_active(&mut self, active: bool) {
        if active != self.host_active {
            log::info!("Virtual console {}", if active { "resumed" } else { "paused" });
        }
        self.host_active = active;
    }

    fn advance_to(&mut self, end_us: u64) {
        while self.next_frame_us <= end_us {
            self.wires.now_us.set(self.next_frame_us);
            if self.host_active {
                let mut host = HostSide { bus: self.bus, port: SimPort(self.wires.clone()) };
                self.console.read_frame(&mut host);
            }
            self.next_frame_us += FRAME_US;
        }
        self.wires.now_us.set(end_us);
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        let end = self.wires.now_us.get() + u64::from(ns).div_ceil(1000);
        self.advance_to(end);
    }
}
