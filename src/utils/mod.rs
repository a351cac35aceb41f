// src/utils/mod.rs

pub mod html;
pub mod notify;
pub mod serde_de;
pub mod storage;
