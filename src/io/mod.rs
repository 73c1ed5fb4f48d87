pub mod ply;
pub mod reader;
pub mod writer;
