//! OpenAPI documentation, served at /docs.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use giralibros_core::models::{
    AttachedCoverResponse, ExchangeRequestView, ExchangeRequestsResponse, LocationArea,
    OfferedBookResponse, OfferedBookRow, ProfileForm, ProfileResponse, StagedCoverResponse,
    SweepResponse, VisibleBook, WantedBookResponse, WantedBookRow,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::covers::upload_cover,
        handlers::books::list_books,
        handlers::books::my_books,
        handlers::books::save_my_books,
        handlers::books::delete_my_book,
        handlers::wanted::my_wanted,
        handlers::wanted::save_my_wanted,
        handlers::exchanges::request_exchange,
        handlers::exchanges::my_requests,
        handlers::profile::get_profile,
        handlers::profile::update_profile,
        handlers::maintenance::sweep_pending,
        handlers::health::health,
    ),
    components(schemas(
        AttachedCoverResponse,
        StagedCoverResponse,
        SweepResponse,
        VisibleBook,
        OfferedBookResponse,
        OfferedBookRow,
        WantedBookResponse,
        WantedBookRow,
        ExchangeRequestView,
        ExchangeRequestsResponse,
        ProfileForm,
        ProfileResponse,
        LocationArea,
        ErrorResponse,
    )),
    tags(
        (name = "covers", description = "Cover upload and staging"),
        (name = "books", description = "Offered and wanted books"),
        (name = "exchanges", description = "Exchange requests"),
        (name = "profile", description = "Profile and exchange areas"),
        (name = "maintenance", description = "Operator maintenance"),
        (name = "health", description = "Health checks"),
    )
)]
pub struct ApiDoc;
