//! Process-level I/O for the host shell.

pub mod signals;
