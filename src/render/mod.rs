pub mod compositor;
pub mod cover;
pub mod surface;
