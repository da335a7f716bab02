pub mod graphemes;
pub mod postprocess;
pub mod selector;
pub mod timing;
pub mod voice_activity;
