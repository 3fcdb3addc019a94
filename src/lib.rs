pub mod bus;
pub mod channels;
pub mod config;
pub mod dialog;
pub mod runtime;
pub mod shared;
