// crates/mdpad_engine/src/dispatcher.rs
// Estado compartido entre el lazo principal y la interrupción de SELECT.
//
// Reglas de acceso:
//   table    -> escribe el lazo principal (con la IRQ suprimida), lee la IRQ
//   position -> escribe la IRQ (y realign, con la IRQ suprimida)
//   polled   -> levanta la IRQ, baja el lazo principal
//
// Un solo núcleo: la IRQ nunca corre en paralelo con una sección suprimida,
// por eso alcanza con Relaxed.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use mdpad_core::{IrqMasked, PadOutput};

use crate::frame::OutputTable;

pub struct BusState {
    table: [AtomicU8; 8],
    position: AtomicU8,
    polled: AtomicBool,
}

impl BusState {
    /// Utilizable como `static`. Arranca con la tabla de reposo.
    pub const fn new() -> Self {
        let t = OutputTable::IDLE.0;
        Self {
            table: [
                AtomicU8::new(t[0]),
                AtomicU8::new(t[1]),
                AtomicU8::new(t[2]),
                AtomicU8::new(t[3]),
                AtomicU8::new(t[4]),
                AtomicU8::new(t[5]),
                AtomicU8::new(t[6]),
                AtomicU8::new(t[7]),
            ],
            position: AtomicU8::new(0),
            polled: AtomicBool::new(false),
        }
    }

    /// Handler del flanco de SELECT (ambos flancos).
    ///
    /// Sólo aritmética, una lectura de tabla y una escritura de puerto: toda
    /// decisión ya está precalculada en la tabla. `& 7` deja el índice dentro
    /// del arreglo, sin chequeo de límites.
    #[inline(always)]
    pub fn on_select_edge<O: PadOutput>(&self, out: &mut O) {
        let pos = self.position.load(Ordering::Relaxed).wrapping_add(1) & 7;
        self.position.store(pos, Ordering::Relaxed);
        out.write(self.table[pos as usize].load(Ordering::Relaxed));
        self.polled.store(true, Ordering::Relaxed);
    }

    /// Copia la tabla completa. El token garantiza que la IRQ no ve una mezcla.
    pub fn publish(&self, _cs: &IrqMasked<'_>, table: &OutputTable) {
        for (slot, &value) in self.table.iter().zip(table.0.iter()) {
            slot.store(value, Ordering::Relaxed);
        }
    }

    /// Alinea el multiplexor con el nivel actual de SELECT y maneja el puerto.
    ///
    /// SELECT alto: el puerto muestra la posición 0 y el próximo flanco la 1.
    /// SELECT bajo: el puerto muestra la posición 1 pero el próximo flanco
    /// (subida) arranca la secuencia en 0, así que la posición queda en 7.
    /// Entre lecturas de la consola esto reinicia la secuencia de 6 botones.
    pub fn realign<O: PadOutput>(&self, _cs: &IrqMasked<'_>, select_high: bool, out: &mut O) {
        let (pos, shown) = if select_high { (0, 0) } else { (7, 1) };
        self.position.store(pos, Ordering::Relaxed);
        out.write(self.table[shown].load(Ordering::Relaxed));
    }

    pub fn position(&self) -> u8 {
        self.position.load(Ordering::Relaxed)
    }

    pub fn polled(&self) -> bool {
        self.polled.load(Ordering::Relaxed)
    }

    pub fn clear_polled(&self) {
        self.polled.store(false, Ordering::Relaxed);
    }

    /// Copia de la tabla publicada (diagnóstico; puede quedar vieja enseguida).
    pub fn snapshot(&self) -> OutputTable {
        let mut out = [0u8; 8];
        for (dst, slot) in out.iter_mut().zip(self.table.iter()) {
            *dst = slot.load(Ordering::Relaxed);
        }
        OutputTable(out)
    }
}

impl Default for BusState {
    fn default() -> Self {
        Self::new()
    }
}
