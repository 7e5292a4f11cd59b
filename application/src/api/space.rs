//! [`Space`]-related REST API handlers.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use common::Money;
use serde::Deserialize;
use service::{
    command::{
        self, CreateSpace, DeleteSpace, SubmitReview, UpdateSpace,
    },
    domain::{review, space, user, Review, Space},
    query, read, Command as _,
};

use crate::{define_error, AsError as _, Error, Service};

/// Parameters of the [`list`] handler.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// [`space::Kind`] to filter by.
    pub kind: Option<space::Kind>,

    /// [`space::Status`] to filter by.
    pub status: Option<space::Status>,

    /// Substring to search the name and location by.
    pub search: Option<String>,
}

/// Lists [`Space`]s matching the provided [`ListParams`].
pub async fn list(
    Extension(service): Extension<Service>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Space>>, Error> {
    let ListParams {
        kind,
        status,
        search,
    } = params;

    service
        .execute(query::spaces::List::by(read::space::list::Filter {
            kind,
            status,
            search,
        }))
        .await
        .map(Json)
        .map_err(|e| e.into_error())
}

define_error! {
    enum FindError {
        #[code = "SPACE_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Space` with the provided ID does not exist"]
        NotFound,
    }
}

/// Returns the single [`Space`] with the provided ID.
pub async fn find(
    Extension(service): Extension<Service>,
    Path(id): Path<space::Id>,
) -> Result<Json<Space>, Error> {
    service
        .execute(query::space::ById::by(id))
        .await
        .map_err(|e| e.into_error())?
        .map(Json)
        .ok_or_else(|| FindError::NotFound.into())
}

/// Body of the [`create`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateSpaceRequest {
    /// Name of the new [`Space`].
    pub name: space::Name,

    /// Location of the new [`Space`].
    pub location: space::Location,

    /// Description of the new [`Space`].
    pub description: space::Description,

    /// [`space::Kind`] of the new [`Space`].
    pub kind: space::Kind,

    /// Daily rate of the new [`Space`].
    pub price: Money,

    /// [`space::Feature`]s of the new [`Space`].
    #[serde(default)]
    pub features: Vec<space::Feature>,

    /// Size of the new [`Space`] in square meters.
    pub size: space::SquareMeters,

    /// ID of the [`User`] owning the new [`Space`].
    ///
    /// [`User`]: service::domain::User
    pub owner_id: user::Id,
}

/// Creates a new [`Space`].
pub async fn create(
    Extension(service): Extension<Service>,
    Json(body): Json<CreateSpaceRequest>,
) -> Result<(http::StatusCode, Json<Space>), Error> {
    let CreateSpaceRequest {
        name,
        location,
        description,
        kind,
        price,
        features,
        size,
        owner_id,
    } = body;

    service
        .execute(CreateSpace {
            name,
            location,
            description,
            kind,
            price,
            features,
            size,
            owner_id,
        })
        .await
        .map(|space| (http::StatusCode::CREATED, Json(space)))
        .map_err(|e| e.into_error())
}

/// Body of the [`update`] handler.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSpaceRequest {
    /// New name of the [`Space`].
    pub name: Option<space::Name>,

    /// New location of the [`Space`].
    pub location: Option<space::Location>,

    /// New description of the [`Space`].
    pub description: Option<space::Description>,

    /// New daily rate of the [`Space`].
    pub price: Option<Money>,

    /// New [`space::Feature`]s of the [`Space`].
    pub features: Option<Vec<space::Feature>>,

    /// New size of the [`Space`] in square meters.
    pub size: Option<space::SquareMeters>,

    /// New [`space::Status`] of the [`Space`].
    pub status: Option<space::Status>,
}

/// Updates the provided fields of the [`Space`] with the provided ID.
pub async fn update(
    Extension(service): Extension<Service>,
    Path(id): Path<space::Id>,
    Json(body): Json<UpdateSpaceRequest>,
) -> Result<Json<Space>, Error> {
    let UpdateSpaceRequest {
        name,
        location,
        description,
        price,
        features,
        size,
        status,
    } = body;

    service
        .execute(UpdateSpace {
            id,
            name,
            location,
            description,
            price,
            features,
            size,
            status,
        })
        .await
        .map(Json)
        .map_err(|e| e.into_error())
}

/// Delists the [`Space`] with the provided ID.
pub async fn delete(
    Extension(service): Extension<Service>,
    Path(id): Path<space::Id>,
) -> Result<http::StatusCode, Error> {
    service
        .execute(DeleteSpace { id })
        .await
        .map(|()| http::StatusCode::NO_CONTENT)
        .map_err(|e| e.into_error())
}

/// Lists [`Review`]s of the [`Space`] with the provided ID.
pub async fn reviews(
    Extension(service): Extension<Service>,
    Path(id): Path<space::Id>,
) -> Result<Json<Vec<Review>>, Error> {
    service
        .execute(query::reviews::OfSpace::by(id))
        .await
        .map(Json)
        .map_err(|e| e.into_error())
}

/// Body of the [`submit_review`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct SubmitReviewRequest {
    /// ID of the [`User`] leaving the [`Review`].
    ///
    /// [`User`]: service::domain::User
    pub user_id: user::Id,

    /// [`review::Score`] of the [`Review`].
    pub score: review::Score,

    /// Free-form comment of the [`Review`].
    pub comment: review::Comment,
}

/// Submits a new [`Review`] of the [`Space`] with the provided ID.
pub async fn submit_review(
    Extension(service): Extension<Service>,
    Path(space_id): Path<space::Id>,
    Json(body): Json<SubmitReviewRequest>,
) -> Result<(http::StatusCode, Json<Review>), Error> {
    let SubmitReviewRequest {
        user_id,
        score,
        comment,
    } = body;

    service
        .execute(SubmitReview {
            space_id,
            user_id,
            score,
            comment,
        })
        .await
        .map(|review| (http::StatusCode::CREATED, Json(review)))
        .map_err(|e| e.into_error())
}

impl crate::AsError for command::create_space::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_PRICE"]
                #[status = BAD_REQUEST]
                #[message = "Daily rate must be strictly positive"]
                InvalidPrice,
            }
        }

        match self {
            Self::Store(e) => e.try_as_error(),
            Self::InvalidPrice(_) => Some(Error::InvalidPrice.into()),
        }
    }
}

impl crate::AsError for command::update_space::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SPACE_NOT_FOUND"]
                #[status = NOT_FOUND]
                #[message = "`Space` with the provided ID does not exist"]
                NotFound,

                #[code = "INVALID_PRICE"]
                #[status = BAD_REQUEST]
                #[message = "Daily rate must be strictly positive"]
                InvalidPrice,
            }
        }

        match self {
            Self::Store(e) => e.try_as_error(),
            Self::SpaceNotFound(_) => Some(Error::NotFound.into()),
            Self::InvalidPrice(_) => Some(Error::InvalidPrice.into()),
        }
    }
}

impl crate::AsError for command::delete_space::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SPACE_NOT_FOUND"]
                #[status = NOT_FOUND]
                #[message = "`Space` with the provided ID does not exist"]
                NotFound,
            }
        }

        match self {
            Self::Store(e) => e.try_as_error(),
            Self::SpaceNotFound(_) => Some(Error::NotFound.into()),
        }
    }
}

impl crate::AsError for command::submit_review::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SPACE_NOT_FOUND"]
                #[status = NOT_FOUND]
                #[message = "`Space` with the provided ID does not exist"]
                NotFound,
            }
        }

        match self {
            Self::Store(e) => e.try_as_error(),
            Self::SpaceNotFound(_) => Some(Error::NotFound.into()),
        }
    }
}
