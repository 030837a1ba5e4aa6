use warp::{Filter, Rejection, Reply};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// The single-page form served at `/`.
pub fn index() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(INDEX_HTML))
}
