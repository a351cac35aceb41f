// src/models/mod.rs

pub mod exam;
pub mod exam_result;
pub mod monitoring;
pub mod page;
pub mod profile;
pub mod question;
pub mod recommendation;
pub mod timing;
