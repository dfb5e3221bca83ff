pub mod ask;
pub mod doctor;
pub mod image;
pub mod onboard;
pub mod seed;
