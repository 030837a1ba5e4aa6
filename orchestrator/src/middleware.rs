/// CORS for the page and its API. Any origin is accepted unless one is configured.
pub fn cors(origin: Option<&str>) -> warp::cors::Builder {
    let builder = warp::cors()
        .allow_headers(vec![
            "Origin",
            "Accept",
            "Content-Type",
            "Content-Length",
            "User-Agent",
            "Access-Control-Request-Method",
            "Access-Control-Request-Headers",
        ])
        .allow_methods(vec!["GET", "POST", "OPTIONS"]);

    match origin {
        Some(origin) => builder.allow_origin(origin),
        None => builder.allow_any_origin(),
    }
}
