pub mod cd;
pub mod commands;
pub mod gdrom;
