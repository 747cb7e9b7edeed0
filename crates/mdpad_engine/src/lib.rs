// crates/mdpad_engine/src/lib.rs - Genesis/Megadrive controller port protocol
//
// Flujo de datos:
//   InputSource -> ButtonMapper + TurboEngine -> OutputTable (3 o 6 botones)
//   -> BusState (publicación con la IRQ suprimida) -> on_select_edge (IRQ)
#![cfg_attr(not(test), no_std)]

pub mod adapter;
pub mod dispatcher;
pub mod frame;
pub mod mapper;
pub mod mode;
pub mod polling;
pub mod turbo;

mod tests;

pub use adapter::{Adapter, Board};
pub use dispatcher::BusState;
pub use frame::{ModeState, OutputTable};
pub use mapper::{Behavior, ButtonMapper, Fragments, IgnoreGate, MappingEntry, GENESIS_MAP};
pub use mode::ModeLatch;
pub use polling::{PollOutcome, PollingModeDetector, PollingState};
pub use turbo::{TurboEngine, TurboSpeed};
