pub mod actor;
pub mod animation;
pub mod common;
pub mod dispatch;
pub mod gesture;
pub mod model;
pub mod sys;
pub mod volume;
