//! Domain definitions.

pub mod reservation;
pub mod review;
pub mod space;
pub mod user;

pub use self::{
    reservation::Reservation, review::Review, space::Space, user::User,
};
