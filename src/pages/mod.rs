// src/pages/mod.rs

pub mod analytics;
pub mod exam_results;
pub mod exams;
pub mod monitoring;
pub mod profile;
pub mod question_bank;
pub mod recommendations;
