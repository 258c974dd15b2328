pub mod reservation;
pub mod settings;

pub use reservation::{Reservation, ReservationStatus};
pub use settings::{BusinessHours, DayHours, ReservationSettings, SettingsPatch};
