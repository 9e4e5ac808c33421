//! Core of the `pride` editor: documents, tabs, the file browser and the
//! shell that ties them together, plus a front-end-neutral screen layout.

pub mod core;
pub mod logging;
pub mod render;
