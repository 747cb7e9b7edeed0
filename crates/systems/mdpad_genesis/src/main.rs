// crates/systems/mdpad_genesis/src/main.rs
// Banco de pruebas: el adaptador completo contra una consola Genesis virtual.
mod board;
mod console;
mod logger;
mod pad;
mod view;

use std::cell::RefCell;
use std::env;
use std::rc::Rc;

use mdpad_core::{AdapterConfig, ConfigError};
use mdpad_engine::{Adapter, BusState};
use mdpad_input::{ButtonMask, InputSource};
use minifb::Key;
use thiserror::Error;

use crate::board::{SimBoard, SimDelay, SimPort, SimWires};
use crate::console::{HostRoutine, VirtualConsole};
use crate::pad::{KeyboardPad, PowerOnHold, ScriptedPad};
use crate::view::{BenchView, ViewConfig, HEIGHT, WIDTH};

/// Estado compartido con el "handler" de SELECT, como en la placa real.
static BUS: BusState = BusState::new();

const USAGE: &str = "Usage: mdpad-bench [--host six|three|sms] [--compat] [--hold-mode] [--script] [--frames N] [-v]";

/// Teclas del banco (fuera del mapa del mando).
const SWITCH_KEY: Key = Key::Tab;
const PAUSE_KEY: Key = Key::P;

/// Frames por defecto sin ventana.
const SCRIPT_FRAMES: u64 = 600;

// ============================================================================
//  ERRORES Y OPCIONES
// ============================================================================

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Unknown argument '{0}'")]
    UnknownArgument(String),
    #[error("Missing value for '{0}'")]
    MissingValue(&'static str),
    #[error("Invalid value '{value}' for '{flag}'")]
    InvalidValue { flag: &'static str, value: String },
    #[error("Window error: {0}")]
    Window(#[from] minifb::Error),
    #[error("Invalid adapter config: {0}")]
    Config(#[from] ConfigError),
    #[error("Logger already installed: {0}")]
    Logger(#[from] log::SetLoggerError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimOptions {
    pub host: HostRoutine,
    pub compat: bool,
    pub hold_mode: bool,
    pub script: bool,
    /// `None`: hasta cerrar la ventana.
    pub frames: Option<u64>,
    pub verbose: bool,
    pub help: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            host: HostRoutine::Six,
            compat: false,
            hold_mode: false,
            script: false,
            frames: None,
            verbose: false,
            help: false,
        }
    }
}

impl SimOptions {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, BenchError> {
        let mut opts = SimOptions::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--host" => {
                    let value = args.next().ok_or(BenchError::MissingValue("--host"))?;
                    opts.host = HostRoutine::from_name(&value)
                        .ok_or(BenchError::InvalidValue { flag: "--host", value })?;
                }
                "--frames" => {
                    let value = args.next().ok_or(BenchError::MissingValue("--frames"))?;
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| BenchError::InvalidValue { flag: "--frames", value })?;
                    opts.frames = Some(n);
                }
                "--compat" => opts.compat = true,
                "--hold-mode" => opts.hold_mode = true,
                "--script" => opts.script = true,
                "-v" | "--verbose" => opts.verbose = true,
                "-h" | "--help" => opts.help = true,
                _ => return Err(BenchError::UnknownArgument(arg)),
            }
        }

        if opts.script && opts.frames.is_none() {
            opts.frames = Some(SCRIPT_FRAMES);
        }
        Ok(opts)
    }
}

// ============================================================================
//  ARRANQUE
// ============================================================================

type BenchAdapter<I> = Adapter<'static, PowerOnHold<I>, SimBoard, SimPort, SimDelay>;

fn power_on<I: InputSource>(
    pad: I,
    wires: &Rc<SimWires>,
    opts: &SimOptions,
) -> Result<BenchAdapter<I>, BenchError> {
    let held = if opts.hold_mode { ButtonMask::MODE } else { ButtonMask::empty() };
    let delay = SimDelay::new(&BUS, wires.clone(), VirtualConsole::new(opts.host));

    let adapter = Adapter::power_on(
        &BUS,
        PowerOnHold::new(pad, held),
        SimBoard::new(wires.clone()),
        SimPort::new(wires.clone()),
        delay,
        AdapterConfig::default(),
    )?;
    Ok(adapter)
}

fn status_line<I: InputSource>(adapter: &BenchAdapter<I>) -> String {
    let console = adapter.delay().console();
    let pad = console.last_read().map(|r| format!("{:?}", r.pad)).unwrap_or_else(|| "-".to_string());
    format!(
        "mdpad bench - {:?} host | {:?} | {:?} | turbo {:?} | pad {}",
        console.routine(),
        adapter.mode(),
        adapter.polling().state(),
        adapter.turbo().speed(),
        pad,
    )
}

// ============================================================================
//  LAZOS
// ============================================================================

/// Sin ventana: el guion corre contra la consola hasta `frames` lecturas.
fn run_script(opts: &SimOptions) -> Result<(), BenchError> {
    let wires = SimWires::new(opts.compat);
    let mut adapter = power_on(ScriptedPad::demo(wires.clone()), &wires, opts)?;
    let frames = opts.frames.unwrap_or(SCRIPT_FRAMES);

    let mut last_buttons = None;
    while adapter.delay().console().frames() < frames {
        adapter.tick();

        if let Some(read) = adapter.delay().console().last_read() {
            if last_buttons != Some(read.buttons) {
                log::info!(
                    "t={:>8}us frame {:>4}: {:?} ({:?})",
                    wires.now_us(),
                    adapter.delay().console().frames(),
                    read.buttons,
                    read.pad
                );
                last_buttons = Some(read.buttons);
            }
        }
    }

    println!("{}", status_line(&adapter));
    println!("Host fallbacks: {}", adapter.polling().fallbacks());
    Ok(())
}

/// Con ventana: teclado como mando. Tab mueve el interruptor 3/6, P pausa la consola.
fn run_window(opts: &SimOptions) -> Result<(), BenchError> {
    let wires = SimWires::new(opts.compat);
    let held_keys = Rc::new(RefCell::new(Vec::new()));
    let mut adapter = power_on(KeyboardPad::new(held_keys.clone()), &wires, opts)?;

    let mut view = BenchView::new(ViewConfig::default())?;
    let mut buffer = vec![0u32; WIDTH * HEIGHT];
    let mut switch = opts.compat;
    let mut host_active = true;
    let mut rendered = 0u64;

    log::info!("Keys: arrows, A/S/D = A/B/C, Q/W/E = X/Y/Z, Enter = Start, RShift = Mode");
    log::info!("Tab = 3/6 switch, P = pause console, Esc = quit");

    while view.is_open() {
        if opts.frames.is_some_and(|n| rendered >= n) {
            break;
        }

        // Un frame de video = hasta que la consola termine una lectura (o ~1 frame si está pausada)
        let start_frames = adapter.delay().console().frames();
        let start_us = wires.now_us();
        while adapter.delay().console().frames() == start_frames
            && wires.now_us() < start_us + board::FRAME_US
        {
            adapter.tick();
        }

        *held_keys.borrow_mut() = view.get_keys();
        if view.is_key_pressed(SWITCH_KEY) {
            switch = !switch;
            wires.set_switch(switch);
        }
        if view.is_key_pressed(PAUSE_KEY) {
            host_active = !host_active;
            adapter.delay_mut().set_host_active(host_active);
        }

        view::render(
            &mut buffer,
            &BUS.snapshot().asserted(),
            BUS.position(),
            adapter.delay().console().last_read(),
        );
        view.update(&buffer)?;

        rendered += 1;
        if rendered % 30 == 0 {
            view.set_title(&status_line(&adapter));
        }
    }

    println!("{}", status_line(&adapter));
    Ok(())
}

fn run() -> Result<(), BenchError> {
    let opts = SimOptions::parse(env::args().skip(1))?;
    if opts.help {
        println!("{USAGE}");
        return Ok(());
    }
    logger::init(opts.verbose)?;

    println!("--- mdpad bench (Genesis {:?} host) ---", opts.host);
    if opts.script {
        run_script(&opts)
    } else {
        run_window(&opts)
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("mdpad-bench: {e}");
        eprintln!("{USAGE}");
        std::process::exit(1);
    }
}
