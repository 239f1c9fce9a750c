use crate::{fs::FileSystem, image_model::ImageService};

pub mod config;
pub mod error;
pub mod fs;
pub mod gemini;
pub mod image_model;
pub mod orchestrator;

pub type ImgServiceBox = Box<dyn ImageService + Send + Sync>;
pub type FsBox = Box<dyn FileSystem + Send + Sync>;
