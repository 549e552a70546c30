//! Entity/account/task/step front end: state, backend operations and views.

pub mod app;
pub mod render;
pub mod state;

pub use app::{LoadReport, Tracker};
pub use state::{AppState, Collection, FormDraft, Modal, ModalKind, Notice, NoticeKind, Tab, NOTICE_TTL};
