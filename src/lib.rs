pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod error;
pub mod exec;
pub mod icc;
pub mod memory;
pub mod snapshot;
pub mod trap;
pub mod window;

pub mod isa {
    pub mod sparc_v8; // integer unit opcode map and register names
}

pub use cpu::{Cpu, CpuConfig, Psr, RunExit, TrapMode};
pub use decoder::{decode, Decoded};
pub use error::{ConfigError, SnapshotError};
pub use isa::sparc_v8::Reg;
pub use memory::{Bus, Endian, HarnessMemory, LinearMemory};
pub use trap::{Trap, TrapType};
