pub mod experience;
pub mod job;
pub mod prep;
pub mod resume;
pub mod template;
