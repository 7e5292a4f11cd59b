//! [`Space`] read model definition.

#[cfg(doc)]
use crate::domain::Space;

pub mod list {
    //! [`Space`]s list definitions.

    use crate::domain::space;
    #[cfg(doc)]
    use crate::domain::Space;

    /// Filter of a [`Space`]s list.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`space::Kind`] to filter [`Space`]s by.
        pub kind: Option<space::Kind>,

        /// [`space::Status`] to filter [`Space`]s by.
        pub status: Option<space::Status>,

        /// Text to fuzzy search [`Space`]s by, matched against their
        /// [`space::Name`] and [`space::Location`] case-insensitively.
        pub search: Option<String>,
    }

    impl Filter {
        /// Indicates whether the provided [`Space`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, space: &space::Space) -> bool {
            if self.kind.is_some_and(|kind| space.kind != kind) {
                return false;
            }
            if self.status.is_some_and(|status| space.status != status) {
                return false;
            }
            if let Some(search) = &self.search {
                let needle = search.to_lowercase();
                let name: &str = space.name.as_ref();
                let location: &str = space.location.as_ref();
                return name.to_lowercase().contains(&needle)
                    || location.to_lowercase().contains(&needle);
            }
            true
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::list;
    use crate::domain::{space, Space};

    fn space(name: &str, location: &str, kind: space::Kind) -> Space {
        Space {
            id: 1.into(),
            name: name.parse().unwrap(),
            location: location.parse().unwrap(),
            description: "".parse().unwrap(),
            kind,
            price: "15EUR".parse().unwrap(),
            rating: space::Rating::unrated(),
            features: vec![],
            size: 20,
            status: space::Status::Active,
            owner_id: 1.into(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    #[test]
    fn search_matches_name_and_location_case_insensitively() {
        let garage = space("Garage Centro", "Madrid", space::Kind::Garage);

        let by_name = list::Filter {
            search: Some("centro".into()),
            ..list::Filter::default()
        };
        assert!(by_name.matches(&garage));

        let by_location = list::Filter {
            search: Some("MADRID".into()),
            ..list::Filter::default()
        };
        assert!(by_location.matches(&garage));

        let miss = list::Filter {
            search: Some("warehouse".into()),
            ..list::Filter::default()
        };
        assert!(!miss.matches(&garage));
    }

    #[test]
    fn kind_filter_excludes_other_kinds() {
        let garage = space("Garage Centro", "Madrid", space::Kind::Garage);

        let filter = list::Filter {
            kind: Some(space::Kind::Warehouse),
            ..list::Filter::default()
        };
        assert!(!filter.matches(&garage));
    }
}
