// Shared constants and path helpers used by the engine and the host shell
pub mod constants;
pub mod paths;
