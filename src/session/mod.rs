pub mod redraw;
pub mod state;
pub mod studio;
