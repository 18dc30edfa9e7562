//! OpenAPI document assembly.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::routes;

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

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::root,
        routes::health,
        routes::auth::login,
        routes::auth::logout,
        routes::patients::get_patient,
        routes::patients::search,
        routes::patients::update_patient,
        routes::patients::list_encounters,
        routes::patients::create_encounter,
        routes::audit::list_logs,
        routes::audit::patient_history,
        routes::audit::user_activity,
        routes::audit::summary,
    ),
    components(schemas(
        routes::auth::LoginBody,
        routes::patients::SearchBody,
        routes::patients::EncounterBody,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;
