// crates/mdpad-core/src/lib.rs
#![cfg_attr(not(test), no_std)]

use core::marker::PhantomData;
use thiserror::Error;

pub use embedded_hal::delay::DelayNs;


// ============================================================================
//  CONTRACTS (TRAITS)
// ============================================================================

/// Las 6 líneas de datos del conector DB9 hacia la consola.
///
/// `levels` son niveles de bus (activo en bajo: 0 = botón presionado).
/// La implementación suele ser un handle barato a un registro mapeado en
/// memoria, así que puede existir una copia en la interrupción y otra en el
/// lazo principal.
pub trait PadOutput {
    fn write(&mut self, levels: u8);
}

/// Un banco GPIO de entrada (niveles crudos, con pull-ups).
pub trait InputPort {
    fn read(&mut self) -> u8;
}

/// Línea SELECT (TH) manejada por la consola.
pub trait SelectLine {
    fn is_high(&self) -> bool;
}

/// Interruptor físico de compatibilidad 3/6 botones.
pub trait CompatSwitch {
    fn is_asserted(&mut self) -> bool;
}

/// Prueba de que la interrupción de flanco de SELECT está deshabilitada.
///
/// Sólo se obtiene dentro de [`EdgeIrq::without_edge_irq`]. Las operaciones que
/// tocan el estado compartido con la interrupción lo exigen como argumento.
pub struct IrqMasked<'cs> {
    _scope: PhantomData<&'cs ()>,
}

impl<'cs> IrqMasked<'cs> {
    /// # Safety
    ///
    /// La interrupción de flanco de SELECT debe estar deshabilitada durante
    /// toda la vida del token.
    #[inline(always)]
    pub unsafe fn new() -> Self {
        Self { _scope: PhantomData }
    }
}

/// Control de la interrupción de flanco de SELECT.
pub trait EdgeIrq {
    /// Ejecuta `f` con la interrupción suprimida. Un flanco ocurrido mientras
    /// tanto queda pendiente y se atiende al salir.
    fn without_edge_irq<R>(&self, f: impl FnOnce(&IrqMasked<'_>) -> R) -> R;
}

// ============================================================================
//  CONFIGURACIÓN Y ERRORES
// ============================================================================

/// Cantidad de velocidades de turbo (30, 25, 20, 16.7, 15 y 12.5 Hz).
pub const TURBO_SPEED_COUNT: u8 = 6;

/// Tiempos del lazo principal. Los valores por defecto están medidos contra
/// consolas reales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Espera tras el encendido antes de la primera lectura del mando.
    pub power_on_settle_ms: u32,
    /// Periodo de refresco cuando la consola no mueve SELECT.
    pub self_timed_period_ms: u32,
    /// Silencio de SELECT tras el cual se vuelve a modo auto-temporizado.
    pub poll_timeout_ms: u32,
    /// Espera tras detectar una lectura para que termine la ráfaga de flancos.
    pub host_read_settle_us: u32,
    /// Índice inicial de velocidad de turbo (0..TURBO_SPEED_COUNT).
    pub initial_turbo_speed: u8,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            power_on_settle_ms: 20,
            self_timed_period_ms: 15,
            poll_timeout_ms: 100,
            host_read_settle_us: 1500,
            initial_turbo_speed: 1, // 25 Hz
        }
    }
}

impl AdapterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.self_timed_period_ms == 0 {
            return Err(ConfigError::ZeroTiming("self_timed_period_ms"));
        }
        if self.poll_timeout_ms == 0 {
            return Err(ConfigError::ZeroTiming("poll_timeout_ms"));
        }
        if self.initial_turbo_speed >= TURBO_SPEED_COUNT {
            return Err(ConfigError::TurboSpeedOutOfRange(self.initial_turbo_speed));
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Timing '{0}' must be greater than zero")]
    ZeroTiming(&'static str),
    #[error("Turbo speed {0} out of range (0-5)")]
    TurboSpeedOutOfRange(u8),
}
