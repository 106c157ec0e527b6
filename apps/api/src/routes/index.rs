use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// GET /
/// Upload form for the `.bib` file and the output name.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
