pub mod reschedule;
pub mod submitter;
pub mod view;

pub use reschedule::RescheduleService;
pub use submitter::BookingSubmitter;
pub use view::BookingView;
