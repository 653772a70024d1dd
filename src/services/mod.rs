// Service module exports

pub mod appointment;
pub mod notification;
pub mod schedule;
pub mod settings;
