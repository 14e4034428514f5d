pub mod bounded;
pub mod diagnostics;
pub mod format;
pub mod keyed_rows;
pub mod renderer;
pub mod views;
