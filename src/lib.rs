pub mod api;
pub mod config;
pub mod consts;
pub mod draft;
pub mod events;
pub mod flows;
pub mod logging;
pub mod model;
pub mod render;
pub mod session;
pub mod spinner;
