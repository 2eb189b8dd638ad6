#![allow(dead_code)]

pub mod recording_solver;
pub mod scripted_solver;
