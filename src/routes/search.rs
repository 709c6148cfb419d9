use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{nearest_city, Searcher};
use crate::models::{
    CompanySearchQuery, Coordinates, ErrorResponse, HealthResponse, NearestCityQuery,
    NearestCityResponse, SearchOutcome, SearchRequest, SearchResponse,
};
use crate::services::{CacheManager, CatalogClient};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogClient>,
    pub cache: Arc<CacheManager>,
    pub searcher: Searcher,
}

/// Configure all search-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/search", web::post().to(search))
        .route("/companies/search", web::get().to(search_catalog))
        .route("/cities/nearest", web::get().to(find_nearest_city));
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn search_response(outcome: SearchOutcome) -> SearchResponse {
    SearchResponse {
        search_id: uuid::Uuid::new_v4().to_string(),
        total_results: outcome.companies.len(),
        outcome,
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    tracing::trace!("Health check, cached catalog pages: {}", state.cache.stats().entries);

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Rank a caller-supplied company list
///
/// POST /api/v1/search
///
/// Request body:
/// ```json
/// {
///   "companies": [{ "_id": "string", "name": "string", "assured": true }],
///   "filters": { "search": "string", "priceRange": "5Lakh to 10Lakh", "size": "500-800" },
///   "context": { "suppressDistance": false, "userCoordinates": { "latitude": 12.97, "longitude": 77.59 } }
/// }
/// ```
async fn search(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search request: {}", errors);
        return validation_error(errors);
    }

    let req = req.into_inner();
    tracing::info!("Searching {} supplied companies", req.companies.len());

    let outcome = state.searcher.search(&req.companies, &req.filters, &req.context);

    tracing::info!("Search returned {} companies", outcome.companies.len());

    HttpResponse::Ok().json(search_response(outcome))
}

/// Search the company catalog
///
/// GET /api/v1/companies/search?search=&spaceType=&projectType=&size=&priceRange=&location=&latitude=&longitude=&hideDistance=
async fn search_catalog(
    state: web::Data<AppState>,
    query: web::Query<CompanySearchQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for catalog search: {}", errors);
        return validation_error(errors);
    }

    let filters = query.filters();
    let context = query.context();
    let catalog_query = state.catalog.query(
        filters.search_term(),
        context.user_city.as_deref(),
        filters.space_type_value(),
    );

    let companies = match state.cache.companies(&catalog_query).await {
        Some(companies) => {
            tracing::debug!("Serving {} companies from cache", companies.len());
            companies
        }
        None => match state.catalog.fetch_companies(&catalog_query).await {
            Ok(companies) => {
                state.cache.store_companies(&catalog_query, &companies).await;
                companies
            }
            Err(e) => {
                tracing::error!("Failed to fetch companies from catalog: {}", e);
                return HttpResponse::BadGateway().json(ErrorResponse {
                    error: "Failed to fetch companies".to_string(),
                    message: e.to_string(),
                    status_code: 502,
                });
            }
        },
    };

    let outcome = state.searcher.search(&companies, &filters, &context);

    tracing::info!(
        "Catalog search returned {} of {} companies",
        outcome.companies.len(),
        companies.len()
    );

    HttpResponse::Ok().json(search_response(outcome))
}

/// Nearest known city to a point
///
/// GET /api/v1/cities/nearest?latitude=&longitude=
async fn find_nearest_city(query: web::Query<NearestCityQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let Some(point) = Coordinates::new(query.latitude, query.longitude) else {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid coordinates".to_string(),
            message: "latitude and longitude must be finite".to_string(),
            status_code: 400,
        });
    };

    let (city, distance_km) = nearest_city(&point);

    HttpResponse::Ok().json(NearestCityResponse {
        city: city.name.to_string(),
        latitude: city.latitude,
        longitude: city.longitude,
        distance_km,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn state(catalog_url: String) -> AppState {
        AppState {
            catalog: Arc::new(CatalogClient::new(catalog_url, Duration::from_secs(5), 15).unwrap()),
            cache: Arc::new(CacheManager::new(100, 60)),
            searcher: Searcher::deterministic(),
        }
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state("http://localhost:1".into())))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "healthy");
    }

    #[actix_web::test]
    async fn test_search_with_supplied_companies() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state("http://localhost:1".into())))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/search")
            .set_json(json!({
                "companies": [
                    { "_id": "1", "name": "Plain", "googleRating": 5 },
                    { "_id": "2", "name": "Assured", "assured": "yes" }
                ],
                "filters": {}
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["totalResults"], 2);
        assert_eq!(body["companies"][0]["name"], "Assured");
        assert_eq!(body["companies"][0]["isFirstCard"], true);
        assert_eq!(body["message"], crate::core::search::REFINE_SEARCH_MESSAGE);
    }

    #[actix_web::test]
    async fn test_search_with_budget_filters() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state("http://localhost:1".into())))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/search")
            .set_json(json!({
                "companies": [{ "_id": "1", "name": "Fits", "basicPriceRange": 1200 }],
                "filters": { "priceRange": "5Lakh to 10Lakh", "size": "500-800" }
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["companies"][0]["priceMatch"]["matches"], true);
        assert_eq!(body["companies"][0]["priceMatch"]["tier"], "basic");
        assert_eq!(body["unreasonablePricing"], false);
    }

    #[actix_web::test]
    async fn test_catalog_search_uses_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/companies")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"companies":[{"_id":"1","name":"Nest","type":"Residential"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(server.url())))
                .configure(crate::routes::configure_routes),
        )
        .await;

        for _ in 0..2 {
            let req = test::TestRequest::get()
                .uri("/api/v1/companies/search?spaceType=Residential")
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["companies"][0]["name"], "Nest");
        }

        mock.assert_async().await;
    }

    #[actix_web::test]
    async fn test_catalog_failure_is_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/companies")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(server.url())))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/companies/search").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn test_nearest_city() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state("http://localhost:1".into())))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/cities/nearest?latitude=18.6&longitude=73.9")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["city"], "Pune");

        let req = test::TestRequest::get()
            .uri("/api/v1/cities/nearest?latitude=95&longitude=73.9")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
