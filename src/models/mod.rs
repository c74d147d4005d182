// src/models/mod.rs

pub mod candidate;
pub mod exam_result;
pub mod question;
