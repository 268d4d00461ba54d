pub mod alert;
pub mod button;
pub mod heading;
