// crates/systems/mdpad_genesis/src/view.rs

use minifb::{Key, Scale, ScaleMode, Window, WindowOptions};
use std::thread;
use std::time::{Duration, Instant};

use mdpad_input::ButtonMask;

use crate::console::{ConsoleRead, DetectedPad};
use crate::BenchError;

// ============================================================================
//  CONFIGURACIÓN
// ============================================================================

pub const WIDTH: usize = 160;
pub const HEIGHT: usize = 144;

#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub title: String,
    pub scale: Scale,
    pub target_fps: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: "mdpad bench".to_string(),
            scale: Scale::X4,
            target_fps: 60.0,
        }
    }
}

// ============================================================================
//  VENTANA
// ============================================================================

pub struct BenchView {
    window: Window,

    // Control de Tiempo (Frame Limiter)
    target_micro_seconds: u128,
    last_frame_time: Instant,
}

impl BenchView {
    pub fn new(config: ViewConfig) -> Result<Self, BenchError> {
        let mut opts = WindowOptions::default();
        opts.scale = config.scale;
        opts.scale_mode = ScaleMode::AspectRatioStretch;

        let window = Window::new(&config.title, WIDTH, HEIGHT, opts)?;

        let target_us = if config.target_fps > 0.0 {
            (1_000_000.0 / config.target_fps) as u128
        } else {
            0 // Sin límite
        };

        Ok(Self {
            window,
            target_micro_seconds: target_us,
            last_frame_time: Instant::now(),
        })
    }

    /// Presenta el buffer (0x00RRGGBB) y duerme hasta completar el frame.
    pub fn update(&mut self, buffer: &[u32]) -> Result<(), BenchError> {
        self.window.update_with_buffer(buffer, WIDTH, HEIGHT)?;

        if self.target_micro_seconds > 0 {
            let elapsed = self.last_frame_time.elapsed().as_micros();
            if elapsed < self.target_micro_seconds {
                let sleep_time = self.target_micro_seconds - elapsed;
                if sleep_time > 1000 {
                    thread::sleep(Duration::from_micros((sleep_time - 500) as u64));
                }
                while self.last_frame_time.elapsed().as_micros() < self.target_micro_seconds {
                    std::hint::spin_loop();
                }
            }
        }
        self.last_frame_time = Instant::now();
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    pub fn get_keys(&self) -> Vec<Key> {
        self.window.get_keys()
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, minifb::KeyRepeat::No)
    }
}

// ============================================================================
//  DIBUJO
// ============================================================================

#[inline(always)]
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

pub const BACKGROUND: u32 = 0x101018;
pub const LINE_ASSERTED: u32 = 0xE04030;
pub const LINE_RELEASED: u32 = 0x303848;
pub const CURSOR: u32 = 0xF0F0F0;

const GRID_X: usize = 8;
const GRID_Y: usize = 8;
const CELL: usize = 16;
const PITCH: usize = 18;
const CURSOR_Y: usize = GRID_Y + 6 * PITCH;
const BUTTONS_Y: usize = CURSOR_Y + 8;
const BUTTON_CELL: usize = 10;
const BUTTON_PITCH: usize = 12;

/// Orden de los indicadores de botón decodificados.
pub const BUTTON_ORDER: [ButtonMask; 12] = [
    ButtonMask::UP,
    ButtonMask::DOWN,
    ButtonMask::LEFT,
    ButtonMask::RIGHT,
    ButtonMask::A,
    ButtonMask::B,
    ButtonMask::C,
    ButtonMask::START,
    ButtonMask::X,
    ButtonMask::Y,
    ButtonMask::Z,
    ButtonMask::MODE,
];

fn fill_rect(buffer: &mut [u32], x: usize, y: usize, w: usize, h: usize, color: u32) {
    for row in y..(y + h).min(HEIGHT) {
        let start = row * WIDTH + x.min(WIDTH);
        let end = row * WIDTH + (x + w).min(WIDTH);
        buffer[start..end].fill(color);
    }
}

fn pad_color(pad: DetectedPad) -> u32 {
    match pad {
        DetectedPad::SixButton => rgb(0x40, 0xC0, 0x60),
        DetectedPad::ThreeButton => rgb(0xE0, 0xC0, 0x40),
        DetectedPad::Unidentified => rgb(0x60, 0x80, 0xE0),
        DetectedPad::Absent => rgb(0x60, 0x60, 0x60),
    }
}

/// Origen (x, y) de la celda de la línea `line` (0 = bit 5) en la posición `slot`.
pub fn cell_origin(slot: usize, line: usize) -> (usize, usize) {
    (GRID_X + slot * PITCH, GRID_Y + line * PITCH)
}

pub fn button_origin(index: usize) -> (usize, usize) {
    (GRID_X + index * BUTTON_PITCH, BUTTONS_Y)
}

/// Dibuja las 8 posiciones x 6 líneas de la tabla publicada (lógica positiva),
/// la posición actual del multiplexor y los botones que decodificó la consola.
pub fn render(buffer: &mut [u32], asserted: &[u8; 8], position: u8, read: Option<&ConsoleRead>) {
    buffer.fill(BACKGROUND);

    for (slot, levels) in asserted.iter().enumerate() {
        for line in 0..6 {
            let bit = 0x20 >> line;
            let color = if levels & bit != 0 { LINE_ASSERTED } else { LINE_RELEASED };
            let (x, y) = cell_origin(slot, line);
            fill_rect(buffer, x, y, CELL, CELL, color);
        }
    }

    let (cx, _) = cell_origin((position & 7) as usize, 0);
    fill_rect(buffer, cx, CURSOR_Y, CELL, 2, CURSOR);

    if let Some(read) = read {
        for (i, button) in BUTTON_ORDER.iter().enumerate() {
            let color = if read.buttons.contains(*button) {
                pad_color(read.pad)
            } else {
                LINE_RELEASED
            };
            let (x, y) = button_origin(i);
            fill_rect(buffer, x, y, BUTTON_CELL, BUTTON_CELL, color);
        }
    }
}
