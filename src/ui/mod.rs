// UI and formatting module

pub mod formatters;
pub mod monitor_tui;
pub mod system_formatters;

// Re-export commonly used items for cleaner imports
pub use formatters::{
    format_bytes, format_frequency, format_percentage, format_power, format_temperature,
    format_time, format_voltage,
};
pub use system_formatters::Units;
