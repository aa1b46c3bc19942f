use crate::api;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::login,
        api::guests::list_guests,
        api::guests::find_duplicates,
        api::guests::merge_guests,
        // Add other endpoints here as we document them
    ),
    components(
        schemas(
            api::auth::LoginRequest,
            api::guests::MergeGuestsRequest,
            api::guests::MergedFieldsPayload,
            api::guests::MergedGuestFields,
            api::guests::MergeGuestsResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "frontdesk", description = "Hotel front desk API")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
