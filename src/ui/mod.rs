pub mod input;
pub mod prompt;
pub mod renderer;
