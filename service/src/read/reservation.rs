//! [`Reservation`] read model definition.

#[cfg(doc)]
use crate::domain::Reservation;

pub mod list {
    //! [`Reservation`]s list definitions.

    use crate::domain::{reservation, space, user};
    #[cfg(doc)]
    use crate::domain::Reservation;

    /// Filter of a [`Reservation`]s list.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// ID of the [`Space`] to filter [`Reservation`]s by.
        ///
        /// [`Space`]: crate::domain::Space
        pub space_id: Option<space::Id>,

        /// ID of the [`User`] to filter [`Reservation`]s by.
        ///
        /// [`User`]: crate::domain::User
        pub user_id: Option<user::Id>,

        /// [`reservation::Status`] to filter [`Reservation`]s by.
        pub status: Option<reservation::Status>,
    }

    impl Filter {
        /// Indicates whether the provided [`Reservation`] passes this
        /// [`Filter`].
        #[must_use]
        pub fn matches(&self, reservation: &reservation::Reservation) -> bool {
            !self.space_id.is_some_and(|id| reservation.space_id != id)
                && !self.user_id.is_some_and(|id| reservation.user_id != id)
                && !self.status.is_some_and(|s| reservation.status != s)
        }
    }
}
