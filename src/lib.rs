// lib.rs
pub mod alignment_record;
pub mod alignment_set;
pub mod cigar;
pub mod commands;
pub mod read;
pub mod stitcher;
