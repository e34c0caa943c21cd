pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["Content-Type", "Accept", "Origin", "Content-Length"])
        .allow_methods(vec!["POST", "GET", "OPTIONS"])
}
