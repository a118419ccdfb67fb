pub mod package_commands;
pub mod preset_commands;
pub mod root_commands;

// 重新导出所有命令函数
pub use package_commands::*;
pub use preset_commands::*;
pub use root_commands::*;
