use axum::{
    Router,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware::from_fn_with_state,
};
use certadm_common::views::ApiErrorResponse;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;
use utoipa::{
    ToSchema,
    openapi::{
        Components, Info, License, OpenApi, RefOr,
        path::Operation,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{context::ApiContext, guard, handlers};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Path of the health endpoint, which stays reachable while the
/// default-credential guard is blocking everything else.
pub const HEALTH_PATH: &str = "/healthz";

pub fn make(context: ApiContext) -> anyhow::Result<(Router, OpenApi)> {
    let allowed_origin = context
        .config
        .public_url
        .parse::<HeaderValue>()
        .map_err(|e| anyhow::anyhow!("invalid public URL for CORS: {e}"))?;

    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    // Log the request ID as generated
                    let request_id = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok());
                    let span = info_span!(
                        "http_request",
                        method = req.method().to_string(),
                        request_id = Option::<&str>::None,
                        path = Option::<&str>::None,
                    );

                    if let Some(request_id) = request_id {
                        span.record("request_id", request_id);
                    };

                    if let Some(path) = req.extensions().get::<MatchedPath>() {
                        span.record("path", path.as_str())
                    } else {
                        span.record("path", req.uri().path())
                    };

                    span
                }),
        )
        .layer(
            CorsLayer::new()
                .allow_credentials(true)
                .allow_origin(allowed_origin),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id));

    let mut components = Components::new();
    components.add_security_scheme(
        "bearer",
        SecurityScheme::Http(
            HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .build(),
        ),
    );

    let openapi = OpenApi::builder()
        .info(
            Info::builder()
                .title("certadm API Reference")
                .version(env!("CARGO_PKG_VERSION"))
                .license(Some(
                    License::builder()
                        .name("Apache 2.0 License")
                        .identifier(Some(env!("CARGO_PKG_LICENSE")))
                        .build(),
                )),
        )
        .components(Some(components))
        .build();

    let guard_layer = from_fn_with_state(context.clone(), guard::enforce);

    let (r, mut a) = OpenApiRouter::with_openapi(openapi)
        .routes(routes!(handlers::health_check))
        .routes(routes!(handlers::certificates::revoke_certificate))
        .routes(routes!(handlers::admin::get_certificate))
        .layer(guard_layer)
        .layer(middleware)
        .with_state(context)
        .split_for_parts();

    a.paths.paths.iter_mut().for_each(|(_path, item)| {
        apply_default_errors(&mut item.get);
        apply_default_errors(&mut item.post);
        apply_default_errors(&mut item.patch);
        apply_default_errors(&mut item.put);
        apply_default_errors(&mut item.delete);
        apply_default_errors(&mut item.trace);
        apply_default_errors(&mut item.head);
        apply_default_errors(&mut item.options);
    });

    Ok((r, a))
}

/// Guard configuration used by the server: everything but the health check
/// is gated.
pub fn guard_config() -> guard::GuardConfig {
    guard::GuardConfig::default().with_skipper(|req| req.uri().path() == HEALTH_PATH)
}

fn apply_default_errors(item: &mut Option<Operation>) {
    if let Some(item) = item {
        for (status, summary) in [
            ("401", "Unauthorized"),
            ("403", "Forbidden"),
            ("500", "Internal server error"),
        ] {
            item.responses
                .responses
                .entry(status.into())
                .or_insert_with(|| {
                    RefOr::Ref(
                        utoipa::openapi::Ref::builder()
                            .summary(summary)
                            .ref_location_from_schema_name(ApiErrorResponse::name())
                            .build(),
                    )
                });
        }
    }
}
