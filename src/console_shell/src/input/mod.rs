pub mod buffer;
pub mod key_reader;
pub mod parser;
pub mod renderer;
