use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::bookcases::list_bookcases,
        api::bookcases::create_bookcase,
        api::books::list_books,
        api::books::create_book,
        // Add other endpoints here as we document them
    ),
    tags(
        (name = "bookviewer", description = "Book Viewer API")
    )
)]
pub struct ApiDoc;
