// Interface adapters: wire protocol, network handling and level loading.

pub mod level;
pub mod net;
pub mod protocol;
pub mod state;
