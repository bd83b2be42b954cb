pub mod cmd;
pub mod logic;
pub mod notify;
