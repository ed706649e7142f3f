// Platform-specific code module

pub mod privileges;
pub mod sysfs;

pub use privileges::{is_elevated, privilege_hint};
pub use sysfs::SysfsPaths;
