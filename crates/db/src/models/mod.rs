pub mod booking;
pub mod event;
pub mod group;
pub mod order;
pub mod ticket;

pub mod audit;
