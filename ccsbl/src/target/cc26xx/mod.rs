//! CC13x0/CC26x0 boot-ROM bootloader client.

mod flasher;

pub use flasher::Cc26xxFlasher;
