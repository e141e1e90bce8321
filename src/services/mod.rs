pub mod gate;
pub mod key_reload;
