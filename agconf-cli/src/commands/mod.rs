pub mod init;
pub mod list;
pub mod presets;
pub mod save;
