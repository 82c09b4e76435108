pub mod canvas;
pub mod geo;
pub mod interaction;
pub mod layout;
pub mod models;
pub mod placement;
pub mod projection;
pub mod registry;
pub mod session;
pub mod viewport;
