//! Documentation OpenAPI pour l'API des zones.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(crate::api::list_zones, crate::api::get_zone),
    components(schemas(crate::Zone, crate::LatLng, crate::api::ErrorResponse)),
    tags((name = "zones", description = "Répertoire des zones sonores")),
    info(
        title = "AmbientZones API",
        version = "0.1.0",
        description = r#"
# Répertoire des zones

Liste ordonnée des zones circulaires. Pour chaque zone :
- `id` : identifiant (nombre ou texte)
- `name` : nom affiché
- `center` : `{lat, lng}` en degrés décimaux
- `radius_m` : rayon en mètres (50 par défaut)
- `playlist` : URLs des morceaux, le premier est joué à l'entrée dans la zone
        "#,
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;
